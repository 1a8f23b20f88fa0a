use anchor_lang::prelude::*;

use crate::constants::SCALE;
use crate::errors::VaultError;
use crate::math::fixed_point::{decimal_scale, mul_div, to_u64, Rounding};

/// Canonical price record handed to the engine.
///
/// `value` is the price of one whole token in SCALE precision. Consumers must
/// check `is_valid` before using `value`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceQuote {
    pub value: u128,
    pub is_valid: bool,
}

impl PriceQuote {
    pub fn valid(value: u128) -> Self {
        Self {
            value,
            is_valid: value > 0,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Normalize an exponent-encoded price (e.g. Pyth `price * 10^expo`) to SCALE
pub fn normalize_price(raw_price: i64, expo: i32) -> Result<u128> {
    require!(raw_price > 0, VaultError::StalePriceData);

    // SCALE = 10^18, so the target exponent is 18
    let shift = 18i32
        .checked_add(expo)
        .ok_or(VaultError::MathOverflow)?;
    let raw = raw_price as u128;

    if shift >= 0 {
        raw.checked_mul(decimal_scale(shift as u8)?)
            .ok_or(error!(VaultError::MathOverflow))
    } else {
        let divisor = decimal_scale(
            u8::try_from(-shift).map_err(|_| error!(VaultError::MathOverflow))?,
        )?;
        Ok(raw / divisor)
    }
}

/// Value of `amount` token units in SCALE-denominated quote units
pub fn token_value(amount: u128, price: u128, asset_scale: u128) -> Result<u128> {
    mul_div(amount, price, asset_scale, Rounding::Down)
}

/// Convert `amount_in` of one token into units of another at oracle prices
pub fn convert_at_prices(
    amount_in: u64,
    price_in: u128,
    scale_in: u128,
    price_out: u128,
    scale_out: u128,
) -> Result<u64> {
    require!(price_out > 0, VaultError::StalePriceData);
    let value = token_value(amount_in as u128, price_in, scale_in)?;
    to_u64(mul_div(value, scale_out, price_out, Rounding::Down)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_price() {
        // $1.00 with expo -8
        assert_eq!(normalize_price(100_000_000, -8).unwrap(), SCALE);
        // $2500 with expo 0
        assert_eq!(normalize_price(2500, 0).unwrap(), 2500 * SCALE);
        assert!(normalize_price(0, -8).is_err());
        assert!(normalize_price(-5, -8).is_err());
    }

    #[test]
    fn test_convert_at_prices() {
        // 10 reward tokens (9 decimals) at $2 into a $1 asset with 6 decimals
        let out = convert_at_prices(
            10_000_000_000,
            2 * SCALE,
            1_000_000_000,
            SCALE,
            1_000_000,
        )
        .unwrap();
        assert_eq!(out, 20_000_000);
    }
}
