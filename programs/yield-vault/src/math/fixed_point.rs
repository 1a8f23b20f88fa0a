use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, SCALE};
use crate::errors::VaultError;

mod wide {
    uint::construct_uint! {
        /// 256-bit intermediate for products of two 128-bit fixed-point values
        pub struct U256(4);
    }
}

pub use wide::U256;

/// Direction in which a division result is truncated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// (a * b) / denominator with a 256-bit intermediate
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    require!(denominator != 0, VaultError::DivisionByZero);

    let product = U256::from(a) * U256::from(b);
    let denominator = U256::from(denominator);
    let mut quotient = product / denominator;
    if rounding == Rounding::Up && !(product % denominator).is_zero() {
        quotient = quotient
            .checked_add(U256::one())
            .ok_or(VaultError::MathOverflow)?;
    }

    if quotient > U256::from(u128::MAX) {
        return err!(VaultError::MathOverflow);
    }
    Ok(quotient.low_u128())
}

/// Same as `mul_div` but for token amounts that must fit in a u64
pub fn mul_div_u64(a: u64, b: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    let result = mul_div(a as u128, b as u128, denominator as u128, rounding)?;
    to_u64(result)
}

/// Multiply two SCALE values: (a * b) / SCALE
pub fn scale_mul(a: u128, b: u128) -> Result<u128> {
    mul_div(a, b, SCALE, Rounding::Down)
}

/// Multiply a value by basis points: (value * bps) / 10_000
pub fn bps_mul(value: u64, bps: u16, rounding: Rounding) -> Result<u64> {
    mul_div_u64(value, bps as u64, BPS_DENOMINATOR, rounding)
}

/// Express `part` as basis points of `whole`, rounding up
pub fn to_bps(part: u64, whole: u64) -> Result<u64> {
    if whole == 0 {
        return Ok(if part == 0 { 0 } else { u64::MAX });
    }
    mul_div_u64(part, BPS_DENOMINATOR, whole, Rounding::Up)
}

/// Narrow a u128 intermediate back to a token amount
pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}

/// 10^decimals as a u128 scale
pub fn decimal_scale(decimals: u8) -> Result<u128> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or(error!(VaultError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(10, 10, 3, Rounding::Down).unwrap(), 33);
        assert_eq!(mul_div(10, 10, 3, Rounding::Up).unwrap(), 34);
        // Exact division never rounds up
        assert_eq!(mul_div(10, 9, 3, Rounding::Up).unwrap(), 30);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // u128::MAX * SCALE overflows 128 bits but the quotient fits
        let result = mul_div(u128::MAX, SCALE, SCALE, Rounding::Down).unwrap();
        assert_eq!(result, u128::MAX);
    }

    #[test]
    fn test_mul_div_overflow_and_zero() {
        assert!(mul_div(u128::MAX, 2, 1, Rounding::Down).is_err());
        assert!(mul_div(1, 1, 0, Rounding::Down).is_err());
    }

    #[test]
    fn test_bps_helpers() {
        assert_eq!(bps_mul(1000, 3000, Rounding::Down).unwrap(), 300);
        assert_eq!(to_bps(400, 1000).unwrap(), 4000);
        assert_eq!(to_bps(1, 3).unwrap(), 3334);
        assert_eq!(to_bps(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_to_u64_bounds() {
        assert_eq!(to_u64(u64::MAX as u128).unwrap(), u64::MAX);
        assert!(to_u64(u64::MAX as u128 + 1).is_err());
    }
}
