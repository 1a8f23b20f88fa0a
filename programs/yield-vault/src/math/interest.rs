use anchor_lang::prelude::*;

use crate::constants::SCALE;
use crate::errors::VaultError;
use crate::math::fixed_point::{mul_div, scale_mul, Rounding};
use crate::state::InterestRateConfig;

/// Utilization of a market: debt / (reserve + debt), SCALE precision
pub fn utilization(reserve: u128, total_debt: u128) -> Result<u128> {
    let total = reserve
        .checked_add(total_debt)
        .ok_or(VaultError::MathOverflow)?;
    if total == 0 {
        return Ok(0);
    }
    mul_div(total_debt, SCALE, total, Rounding::Down)
}

/// Adapt the full-utilization rate towards the target band.
///
/// Below `min_target_utilization` the rate decays, above `max_target_utilization`
/// it grows; the speed is quadratic in the distance to the band and halves every
/// `rate_half_life` seconds. Result is clamped to the configured bounds.
pub fn full_utilization_rate(
    config: &InterestRateConfig,
    utilization: u128,
    elapsed: u64,
    last_full_utilization_rate: u128,
) -> Result<u128> {
    let half_life = SCALE
        .checked_mul(config.rate_half_life as u128)
        .ok_or(VaultError::MathOverflow)?;

    let adjusted = if utilization < config.min_target_utilization {
        let delta = mul_div(
            config.min_target_utilization - utilization,
            SCALE,
            config.min_target_utilization,
            Rounding::Down,
        )?;
        let decay = decay_growth(half_life, delta, elapsed)?;
        mul_div(last_full_utilization_rate, half_life, decay, Rounding::Down)?
    } else if utilization > config.max_target_utilization {
        let delta = mul_div(
            utilization - config.max_target_utilization,
            SCALE,
            SCALE
                .checked_sub(config.max_target_utilization)
                .ok_or(VaultError::MathOverflow)?,
            Rounding::Down,
        )?;
        let growth = decay_growth(half_life, delta, elapsed)?;
        mul_div(last_full_utilization_rate, growth, half_life, Rounding::Down)?
    } else {
        last_full_utilization_rate
    };

    Ok(adjusted.clamp(
        config.min_full_for_utilization_rate,
        config.max_full_for_utilization_rate,
    ))
}

fn decay_growth(half_life: u128, delta: u128, elapsed: u64) -> Result<u128> {
    scale_mul(delta, delta)?
        .checked_mul(elapsed as u128)
        .and_then(|v| v.checked_add(half_life))
        .ok_or(error!(VaultError::MathOverflow))
}

/// Per-second borrow rate at `utilization` for a given full-utilization rate.
///
/// Dual slope with the kink at `target_utilization`:
/// - below: zero_rate + utilization / target * (target_rate - zero_rate)
/// - above: target_rate + (utilization - target) / (1 - target) * (full_rate - target_rate)
pub fn borrow_rate(
    config: &InterestRateConfig,
    utilization: u128,
    full_rate: u128,
) -> Result<u128> {
    let zero_rate = config.zero_utilization_rate;
    let spread = full_rate
        .checked_sub(zero_rate)
        .ok_or(VaultError::MathOverflow)?;
    let target_rate = scale_mul(spread, config.target_rate_percent)?
        .checked_add(zero_rate)
        .ok_or(VaultError::MathOverflow)?;

    if utilization < config.target_utilization {
        let slope = mul_div(
            utilization,
            target_rate - zero_rate,
            config.target_utilization,
            Rounding::Down,
        )?;
        zero_rate
            .checked_add(slope)
            .ok_or(error!(VaultError::MathOverflow))
    } else {
        let excess = utilization - config.target_utilization;
        let remaining = SCALE
            .checked_sub(config.target_utilization)
            .ok_or(VaultError::MathOverflow)?;
        let slope = mul_div(
            excess,
            full_rate.saturating_sub(target_rate),
            remaining,
            Rounding::Down,
        )?;
        target_rate
            .checked_add(slope)
            .ok_or(error!(VaultError::MathOverflow))
    }
}

/// Growth factor of `rate_per_second` compounded over `elapsed` seconds,
/// using the first three terms of the exponential series.
pub fn compound_factor(rate_per_second: u128, elapsed: u64) -> Result<u128> {
    let x = rate_per_second
        .checked_mul(elapsed as u128)
        .ok_or(VaultError::MathOverflow)?;
    let x2 = scale_mul(x, x)?;
    let x3 = scale_mul(x2, x)?;

    SCALE
        .checked_add(x)
        .and_then(|v| v.checked_add(x2 / 2))
        .and_then(|v| v.checked_add(x3 / 6))
        .ok_or(error!(VaultError::MathOverflow))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    fn config() -> InterestRateConfig {
        InterestRateConfig::default()
    }

    #[test]
    fn test_utilization() {
        assert_eq!(utilization(0, 0).unwrap(), 0);
        assert_eq!(utilization(800, 200).unwrap(), SCALE / 5);
        assert_eq!(utilization(0, 100).unwrap(), SCALE);
    }

    #[test]
    fn test_full_rate_stays_inside_band() {
        let cfg = config();
        let rate = DEFAULT_MIN_FULL_UTILIZATION_RATE * 4;
        let util = DEFAULT_TARGET_UTILIZATION;
        assert_eq!(full_utilization_rate(&cfg, util, 3600, rate).unwrap(), rate);
    }

    #[test]
    fn test_full_rate_adapts_and_clamps() {
        let cfg = config();
        let start = DEFAULT_MIN_FULL_UTILIZATION_RATE * 4;

        let lower = full_utilization_rate(&cfg, 0, 3600, start).unwrap();
        assert!(lower < start);
        assert!(lower >= DEFAULT_MIN_FULL_UTILIZATION_RATE);

        let higher = full_utilization_rate(&cfg, SCALE, 3600, start).unwrap();
        assert!(higher > start);

        // A very long idle period bottoms out at the configured minimum
        let floor = full_utilization_rate(&cfg, 0, 10 * SECONDS_PER_YEAR, start).unwrap();
        assert_eq!(floor, DEFAULT_MIN_FULL_UTILIZATION_RATE);
    }

    #[test]
    fn test_borrow_rate_kink() {
        let cfg = config();
        let full = DEFAULT_MAX_FULL_UTILIZATION_RATE;
        let at_zero = borrow_rate(&cfg, 0, full).unwrap();
        let at_target = borrow_rate(&cfg, cfg.target_utilization, full).unwrap();
        let at_full = borrow_rate(&cfg, SCALE, full).unwrap();

        assert_eq!(at_zero, cfg.zero_utilization_rate);
        assert!(at_target > at_zero);
        assert_eq!(at_full, full);
    }

    #[test]
    fn test_compound_factor() {
        assert_eq!(compound_factor(0, 1000).unwrap(), SCALE);
        assert_eq!(compound_factor(1000, 0).unwrap(), SCALE);

        // ~10% over a year compounds slightly above simple interest
        let rate = SCALE / 10 / SECONDS_PER_YEAR as u128;
        let factor = compound_factor(rate, SECONDS_PER_YEAR).unwrap();
        assert!(factor > SCALE + SCALE / 10 - SCALE / 1000);
        assert!(factor < SCALE + SCALE / 9);
    }
}
