use anchor_lang::prelude::*;

use crate::constants::SCALE;
use crate::errors::VaultError;
use crate::math::*;
use crate::state::{AssetConfig, Position};

use super::collaborators::{LendingPool, PriceOracle};

/// Unit an `Amount` is expressed in
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denomination {
    /// Pool-internal units: collateral shares or nominal debt
    Native,
    /// Underlying asset units
    Assets,
}

/// Signed position delta; positive adds collateral or borrows, negative
/// removes collateral or repays
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Amount {
    pub denomination: Denomination,
    pub value: i128,
}

impl Amount {
    pub fn assets(value: i128) -> Self {
        Self {
            denomination: Denomination::Assets,
            value,
        }
    }

    pub fn native(value: i128) -> Self {
        Self {
            denomination: Denomination::Native,
            value,
        }
    }

    pub fn zero() -> Self {
        Self::assets(0)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifyPositionParams {
    pub collateral: Amount,
    pub debt: Amount,
}

/// Applied deltas, in both asset and pool-internal units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdatePositionResponse {
    pub collateral_delta: i128,
    pub collateral_shares_delta: i128,
    pub debt_delta: i128,
    pub nominal_debt_delta: i128,
}

/// debt = nominal_debt * rate_accumulator / scale
pub fn calculate_debt(
    nominal_debt: u128,
    rate_accumulator: u128,
    scale: u128,
    rounding: Rounding,
) -> Result<u128> {
    mul_div(nominal_debt, rate_accumulator, scale, rounding)
}

/// nominal_debt = debt * scale / rate_accumulator
pub fn calculate_nominal_debt(
    debt: u128,
    rate_accumulator: u128,
    scale: u128,
    rounding: Rounding,
) -> Result<u128> {
    mul_div(debt, scale, rate_accumulator, rounding)
}

/// Outstanding debt of the whole market at the stored accumulator
pub fn total_debt(config: &AssetConfig, rounding: Rounding) -> Result<u128> {
    calculate_debt(
        config.total_nominal_debt,
        config.last_rate_accumulator,
        SCALE,
        rounding,
    )
}

/// Assets backing the collateral shares: reserve plus lent-out debt
fn total_collateral_value(config: &AssetConfig) -> Result<u128> {
    config
        .reserve
        .checked_add(total_debt(config, Rounding::Down)?)
        .ok_or(error!(VaultError::MathOverflow))
}

/// Collateral shares worth `collateral` assets
pub fn calculate_collateral_shares(
    config: &AssetConfig,
    collateral: u128,
    rounding: Rounding,
) -> Result<u128> {
    let total_value = total_collateral_value(config)?;
    if config.total_collateral_shares == 0 || total_value == 0 {
        return mul_div(collateral, SCALE, config.scale, rounding);
    }
    mul_div(collateral, config.total_collateral_shares, total_value, rounding)
}

/// Assets backing `collateral_shares`
pub fn calculate_collateral(
    config: &AssetConfig,
    collateral_shares: u128,
    rounding: Rounding,
) -> Result<u128> {
    if config.total_collateral_shares == 0 {
        return mul_div(collateral_shares, config.scale, SCALE, rounding);
    }
    let total_value = total_collateral_value(config)?;
    mul_div(
        collateral_shares,
        total_value,
        config.total_collateral_shares,
        rounding,
    )
}

/// `config` advanced to `now`. Pure: the caller decides whether to persist it.
///
/// The borrow rate is evaluated at the utilization before the interval; the
/// accumulator never decreases and the protocol fee is booked as collateral
/// shares so suppliers' share price only reflects the net interest.
pub fn accrued(config: &AssetConfig, now: i64) -> Result<AssetConfig> {
    let mut next = config.clone();
    if now <= config.last_updated {
        return Ok(next);
    }
    let elapsed = (now - config.last_updated) as u64;

    let debt_before = total_debt(config, Rounding::Down)?;
    let util = utilization(config.reserve, debt_before)?;

    let full_rate = if config.is_legacy_mode {
        config.last_full_utilization_rate
    } else {
        full_utilization_rate(
            &config.interest_rate_config,
            util,
            elapsed,
            config.last_full_utilization_rate,
        )?
    };
    let rate = borrow_rate(&config.interest_rate_config, util, full_rate)?;
    let factor = compound_factor(rate, elapsed)?;
    let accumulator = scale_mul(config.last_rate_accumulator, factor)?
        .max(config.last_rate_accumulator);

    next.last_rate_accumulator = accumulator;
    next.last_full_utilization_rate = full_rate;
    next.last_updated = now;

    let debt_after = total_debt(&next, Rounding::Down)?;
    let interest = debt_after.saturating_sub(debt_before);
    let fee = scale_mul(interest, config.fee_rate)?;
    if fee > 0 && next.total_collateral_shares > 0 {
        let value_after = total_collateral_value(&next)?;
        let fee_shares = mul_div(
            fee,
            next.total_collateral_shares,
            value_after.saturating_sub(fee).max(1),
            Rounding::Down,
        )?;
        next.total_collateral_shares = next
            .total_collateral_shares
            .checked_add(fee_shares)
            .ok_or(VaultError::MathOverflow)?;
        next.fee_shares = next
            .fee_shares
            .checked_add(fee_shares)
            .ok_or(VaultError::MathOverflow)?;
    }

    Ok(next)
}

/// Accrue in place. Idempotent within one timestamp.
pub fn accrue(config: &mut AssetConfig, now: i64) -> Result<()> {
    if now > config.last_updated {
        *config = accrued(config, now)?;
    }
    Ok(())
}

fn checked_i128(value: u128) -> Result<i128> {
    i128::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}

/// Apply a collateral delta to an accrued market. Returns (assets, shares),
/// signed like the request.
pub fn apply_collateral(
    config: &mut AssetConfig,
    position: &mut Position,
    amount: Amount,
) -> Result<(i128, i128)> {
    if amount.value == 0 {
        return Ok((0, 0));
    }
    let magnitude = amount.value.unsigned_abs();

    if amount.value > 0 {
        let (assets, shares) = match amount.denomination {
            Denomination::Assets => (
                magnitude,
                calculate_collateral_shares(config, magnitude, Rounding::Down)?,
            ),
            Denomination::Native => (
                calculate_collateral(config, magnitude, Rounding::Up)?,
                magnitude,
            ),
        };
        require!(shares > 0, VaultError::InvalidAmount);

        config.reserve = config
            .reserve
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        config.total_collateral_shares = config
            .total_collateral_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        position.collateral_shares = position
            .collateral_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok((checked_i128(assets)?, checked_i128(shares)?))
    } else {
        let (assets, shares) = match amount.denomination {
            Denomination::Assets => (
                magnitude,
                calculate_collateral_shares(config, magnitude, Rounding::Up)?,
            ),
            Denomination::Native => (
                calculate_collateral(config, magnitude, Rounding::Down)?,
                magnitude,
            ),
        };
        if shares > position.collateral_shares {
            msg!(
                "collateral shares requested {}, held {}",
                shares,
                position.collateral_shares
            );
            return Err(error!(VaultError::InsufficientShares)
                .with_values((shares, position.collateral_shares)));
        }
        if assets > config.reserve {
            msg!("market reserve {} cannot cover {}", config.reserve, assets);
            return Err(error!(VaultError::InsufficientPoolLiquidity)
                .with_values((assets, config.reserve)));
        }

        config.reserve -= assets;
        config.total_collateral_shares = config
            .total_collateral_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;
        position.collateral_shares -= shares;
        Ok((-checked_i128(assets)?, -checked_i128(shares)?))
    }
}

/// Apply a debt delta to an accrued market. Returns (debt, nominal debt),
/// signed like the request.
pub fn apply_debt(
    config: &mut AssetConfig,
    position: &mut Position,
    amount: Amount,
) -> Result<(i128, i128)> {
    if amount.value == 0 {
        return Ok((0, 0));
    }
    let magnitude = amount.value.unsigned_abs();
    let accumulator = config.last_rate_accumulator;

    let signed = if amount.value > 0 {
        let (debt, nominal) = match amount.denomination {
            Denomination::Assets => (
                magnitude,
                calculate_nominal_debt(magnitude, accumulator, SCALE, Rounding::Up)?,
            ),
            Denomination::Native => (
                calculate_debt(magnitude, accumulator, SCALE, Rounding::Down)?,
                magnitude,
            ),
        };
        if debt > config.reserve {
            msg!("market reserve {} cannot cover borrow {}", config.reserve, debt);
            return Err(error!(VaultError::InsufficientPoolLiquidity)
                .with_values((debt, config.reserve)));
        }

        config.reserve -= debt;
        config.total_nominal_debt = config
            .total_nominal_debt
            .checked_add(nominal)
            .ok_or(VaultError::MathOverflow)?;
        position.nominal_debt = position
            .nominal_debt
            .checked_add(nominal)
            .ok_or(VaultError::MathOverflow)?;

        let util = utilization(config.reserve, total_debt(config, Rounding::Down)?)?;
        if util > config.max_utilization {
            msg!(
                "utilization {} above market maximum {}",
                util,
                config.max_utilization
            );
            return err!(VaultError::UtilizationExceeded);
        }
        (checked_i128(debt)?, checked_i128(nominal)?)
    } else {
        let (debt, nominal) = match amount.denomination {
            Denomination::Assets => {
                let nominal =
                    calculate_nominal_debt(magnitude, accumulator, SCALE, Rounding::Down)?
                        .min(position.nominal_debt);
                (magnitude, nominal)
            }
            Denomination::Native => (
                calculate_debt(magnitude, accumulator, SCALE, Rounding::Up)?,
                magnitude,
            ),
        };
        require!(nominal <= position.nominal_debt, VaultError::InvalidAmount);

        config.reserve = config
            .reserve
            .checked_add(debt)
            .ok_or(VaultError::MathOverflow)?;
        config.total_nominal_debt = config.total_nominal_debt.saturating_sub(nominal);
        position.nominal_debt -= nominal;
        (-checked_i128(debt)?, -checked_i128(nominal)?)
    };

    if position.nominal_debt > 0 {
        let remaining = calculate_debt(position.nominal_debt, accumulator, SCALE, Rounding::Up)?;
        if remaining < config.floor {
            msg!("position debt {} below floor {}", remaining, config.floor);
            return Err(error!(VaultError::DustPosition).with_values((remaining, config.floor)));
        }
    }

    Ok(signed)
}

/// Whether `position` stays within `max_ltv` (SCALE precision).
///
/// Returns `(false, 0, 0)` when either price is invalid so that a missing
/// feed can never make a position look healthy.
pub fn check_collateralization(
    collateral_config: &AssetConfig,
    debt_config: &AssetConfig,
    position: &Position,
    oracle: &impl PriceOracle,
    max_ltv: u128,
) -> Result<(bool, u128, u128)> {
    let collateral_price = oracle.get_price(&collateral_config.asset_mint);
    let debt_price = oracle.get_price(&debt_config.asset_mint);
    if !collateral_price.is_valid || !debt_price.is_valid {
        return Ok((false, 0, 0));
    }

    let collateral =
        calculate_collateral(collateral_config, position.collateral_shares, Rounding::Down)?;
    let debt = calculate_debt(
        position.nominal_debt,
        debt_config.last_rate_accumulator,
        SCALE,
        Rounding::Up,
    )?;

    let collateral_value = token_value(collateral, collateral_price.value, collateral_config.scale)?;
    let debt_value = token_value(debt, debt_price.value, debt_config.scale)?;

    let healthy = debt_value == 0 || debt_value <= scale_mul(collateral_value, max_ltv)?;
    Ok((healthy, collateral_value, debt_value))
}

/// Accrue both markets, then apply collateral and debt deltas to `position`.
///
/// A position that borrows more or removes collateral must remain
/// collateralized at valid prices.
pub fn modify_position(
    collateral_config: &mut AssetConfig,
    debt_config: &mut AssetConfig,
    position: &mut Position,
    params: ModifyPositionParams,
    oracle: &impl PriceOracle,
    max_ltv: u128,
    now: i64,
) -> Result<UpdatePositionResponse> {
    require_keys_eq!(
        position.collateral_asset,
        collateral_config.asset_mint,
        VaultError::PoolAccountMismatch
    );
    require_keys_eq!(
        position.debt_asset,
        debt_config.asset_mint,
        VaultError::PoolAccountMismatch
    );
    require!(
        collateral_config.pool_id == position.pool_id && debt_config.pool_id == position.pool_id,
        VaultError::PoolAccountMismatch
    );

    accrue(collateral_config, now)?;
    accrue(debt_config, now)?;

    let (collateral_delta, collateral_shares_delta) =
        apply_collateral(collateral_config, position, params.collateral)?;
    let (debt_delta, nominal_debt_delta) = apply_debt(debt_config, position, params.debt)?;

    if debt_delta > 0 || collateral_delta < 0 {
        let collateral_price = oracle.get_price(&collateral_config.asset_mint);
        let debt_price = oracle.get_price(&debt_config.asset_mint);
        if !collateral_price.is_valid || !debt_price.is_valid {
            msg!("cannot value position without valid prices");
            return err!(VaultError::StalePriceData);
        }
        let (healthy, collateral_value, debt_value) =
            check_collateralization(collateral_config, debt_config, position, oracle, max_ltv)?;
        if !healthy {
            msg!(
                "position not collateralized: debt value {}, collateral value {}",
                debt_value,
                collateral_value
            );
            return err!(VaultError::NotCollateralized);
        }
    }

    Ok(UpdatePositionResponse {
        collateral_delta,
        collateral_shares_delta,
        debt_delta,
        nominal_debt_delta,
    })
}

/// A lending market the vault supplies into: its asset configuration plus the
/// vault's own receipt position.
#[derive(Clone, Debug, PartialEq)]
pub struct MarketPool {
    pub config: AssetConfig,
    pub position: Position,
}

impl MarketPool {
    pub fn new(config: AssetConfig, position: Position) -> Self {
        Self { config, position }
    }
}

impl LendingPool for MarketPool {
    fn deposit(&mut self, assets: u64, now: i64) -> Result<u128> {
        accrue(&mut self.config, now)?;
        let (_, shares) = apply_collateral(
            &mut self.config,
            &mut self.position,
            Amount::assets(assets as i128),
        )?;
        Ok(shares.unsigned_abs())
    }

    fn withdraw(&mut self, shares: u128, now: i64) -> Result<u64> {
        accrue(&mut self.config, now)?;
        let (assets, _) = apply_collateral(
            &mut self.config,
            &mut self.position,
            Amount::native(-checked_i128(shares)?),
        )?;
        to_u64(assets.unsigned_abs())
    }

    fn balance_of(&self) -> u128 {
        self.position.collateral_shares
    }

    fn preview_redeem(&self, shares: u128, now: i64) -> Result<u64> {
        let config = accrued(&self.config, now)?;
        to_u64(calculate_collateral(&config, shares, Rounding::Down)?)
    }

    fn preview_withdraw(&self, assets: u64, now: i64) -> Result<u128> {
        let config = accrued(&self.config, now)?;
        calculate_collateral_shares(&config, assets as u128, Rounding::Up)
    }

    fn max_withdraw(&self, now: i64) -> Result<u64> {
        let config = accrued(&self.config, now)?;
        let owned = calculate_collateral(&config, self.position.collateral_shares, Rounding::Down)?;
        to_u64(owned.min(config.reserve))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_YEAR;
    use crate::math::PriceQuote;
    use std::collections::BTreeMap;

    const USDC_SCALE: u128 = 1_000_000;

    fn market(mint: Pubkey) -> AssetConfig {
        AssetConfig::new(Pubkey::new_unique(), 1, mint, USDC_SCALE, 0)
    }

    fn supplied(mint: Pubkey, reserve: u128) -> (AssetConfig, Position) {
        let mut config = market(mint);
        let mut position = Position::new(Pubkey::new_unique(), 1, mint, mint);
        apply_collateral(&mut config, &mut position, Amount::assets(reserve as i128)).unwrap();
        (config, position)
    }

    #[test]
    fn test_debt_conversion_truncates() {
        let acc = SCALE + SCALE / 3;
        let debt = calculate_debt(1_000, acc, SCALE, Rounding::Down).unwrap();
        assert_eq!(debt, 1_333);
        let nominal = calculate_nominal_debt(debt, acc, SCALE, Rounding::Down).unwrap();
        // Round trip loses at most one unit
        assert!(nominal <= 1_000 && 1_000 - nominal <= 1);
        assert_eq!(
            calculate_nominal_debt(debt, acc, SCALE, Rounding::Up).unwrap(),
            1_000
        );
    }

    #[test]
    fn test_bootstrap_collateral_shares() {
        let config = market(Pubkey::new_unique());
        assert_eq!(
            calculate_collateral_shares(&config, 5, Rounding::Down).unwrap(),
            5 * SCALE / USDC_SCALE
        );
        assert_eq!(
            calculate_collateral(&config, 5 * SCALE / USDC_SCALE, Rounding::Down).unwrap(),
            5
        );
    }

    #[test]
    fn test_accrue_is_monotonic_and_idempotent() {
        let mint = Pubkey::new_unique();
        let (mut config, _) = supplied(mint, 1_000_000_000);
        config.reserve = 200_000_000;
        config.total_nominal_debt = 800_000_000;

        let mut last_acc = config.last_rate_accumulator;
        let mut last_ts = config.last_updated;
        for now in [0, 3_600, 3_600, 86_400, 50, SECONDS_PER_YEAR as i64] {
            accrue(&mut config, now).unwrap();
            assert!(config.last_rate_accumulator >= last_acc);
            assert!(config.last_updated >= last_ts);
            last_acc = config.last_rate_accumulator;
            last_ts = config.last_updated;
        }
        assert!(config.last_rate_accumulator > SCALE);

        let snapshot = config.clone();
        accrue(&mut config, SECONDS_PER_YEAR as i64).unwrap();
        assert_eq!(config, snapshot);
    }

    #[test]
    fn test_legacy_mode_keeps_full_rate() {
        let mint = Pubkey::new_unique();
        let (mut config, _) = supplied(mint, 1_000_000_000);
        config.reserve = 100_000_000;
        config.total_nominal_debt = 900_000_000;
        config.is_legacy_mode = true;
        let full = config.last_full_utilization_rate;

        accrue(&mut config, 86_400).unwrap();
        assert_eq!(config.last_full_utilization_rate, full);
        assert!(config.last_rate_accumulator > SCALE);
    }

    #[test]
    fn test_fee_booked_as_shares() {
        let mint = Pubkey::new_unique();
        let (mut config, _) = supplied(mint, 1_000_000_000);
        config.reserve = 200_000_000;
        config.total_nominal_debt = 800_000_000;
        config.fee_rate = SCALE / 10;
        let shares_before = config.total_collateral_shares;

        accrue(&mut config, SECONDS_PER_YEAR as i64).unwrap();
        assert!(config.fee_shares > 0);
        assert_eq!(
            config.total_collateral_shares,
            shares_before + config.fee_shares
        );
    }

    #[test]
    fn test_borrow_respects_utilization_and_floor() {
        let mint = Pubkey::new_unique();
        let (mut config, _) = supplied(mint, 1_000);
        let mut borrower = Position::new(Pubkey::new_unique(), 1, mint, mint);

        let err = apply_debt(&mut config.clone(), &mut borrower.clone(), Amount::assets(990))
            .unwrap_err();
        assert!(VaultError::UtilizationExceeded.matches(&err));

        config.floor = 100;
        let err = apply_debt(&mut config.clone(), &mut borrower.clone(), Amount::assets(50))
            .unwrap_err();
        assert!(VaultError::DustPosition.matches(&err));

        let (debt, nominal) = apply_debt(&mut config, &mut borrower, Amount::assets(500)).unwrap();
        assert_eq!(debt, 500);
        assert_eq!(nominal, 500);
        assert_eq!(config.reserve, 500);

        // Full repayment in native units clears the position
        apply_debt(&mut config, &mut borrower, Amount::native(-500)).unwrap();
        assert_eq!(borrower.nominal_debt, 0);
        assert_eq!(config.reserve, 1_000);
    }

    #[test]
    fn test_collateralization_fails_closed() {
        let collateral_mint = Pubkey::new_unique();
        let debt_mint = Pubkey::new_unique();
        let (collateral_cfg, mut position) = supplied(collateral_mint, 1_000);
        let debt_cfg = market(debt_mint);
        position.debt_asset = debt_mint;
        position.nominal_debt = 100;

        let mut prices = BTreeMap::new();
        prices.insert(collateral_mint, PriceQuote::valid(SCALE));
        let result =
            check_collateralization(&collateral_cfg, &debt_cfg, &position, &prices, SCALE / 2)
                .unwrap();
        assert_eq!(result, (false, 0, 0));

        prices.insert(debt_mint, PriceQuote::valid(SCALE));
        let (healthy, cval, dval) =
            check_collateralization(&collateral_cfg, &debt_cfg, &position, &prices, SCALE / 2)
                .unwrap();
        assert!(healthy);
        assert_eq!(cval, 1_000 * SCALE / USDC_SCALE);
        assert_eq!(dval, 100 * SCALE / USDC_SCALE);
    }

    #[test]
    fn test_modify_position_requires_collateral() {
        let collateral_mint = Pubkey::new_unique();
        let debt_mint = Pubkey::new_unique();
        let mut collateral_cfg = market(collateral_mint);
        let (mut debt_cfg, _) = supplied(debt_mint, 10_000);
        let mut position = Position::new(Pubkey::new_unique(), 1, collateral_mint, debt_mint);

        let mut prices = BTreeMap::new();
        prices.insert(collateral_mint, PriceQuote::valid(SCALE));
        prices.insert(debt_mint, PriceQuote::valid(SCALE));

        let params = ModifyPositionParams {
            collateral: Amount::assets(1_000),
            debt: Amount::assets(700),
        };
        let err = modify_position(
            &mut collateral_cfg.clone(),
            &mut debt_cfg.clone(),
            &mut position.clone(),
            params,
            &prices,
            SCALE / 2,
            10,
        )
        .unwrap_err();
        assert!(VaultError::NotCollateralized.matches(&err));

        let params = ModifyPositionParams {
            collateral: Amount::assets(1_000),
            debt: Amount::assets(400),
        };
        let response = modify_position(
            &mut collateral_cfg,
            &mut debt_cfg,
            &mut position,
            params,
            &prices,
            SCALE / 2,
            10,
        )
        .unwrap();
        assert_eq!(response.collateral_delta, 1_000);
        assert_eq!(response.debt_delta, 400);
        assert_eq!(collateral_cfg.last_updated, 10);

        // Removing collateral without a debt price is refused outright
        prices.remove(&debt_mint);
        let params = ModifyPositionParams {
            collateral: Amount::assets(-10),
            debt: Amount::zero(),
        };
        let err = modify_position(
            &mut collateral_cfg,
            &mut debt_cfg,
            &mut position,
            params,
            &prices,
            SCALE / 2,
            20,
        )
        .unwrap_err();
        assert!(VaultError::StalePriceData.matches(&err));
    }

    #[test]
    fn test_market_pool_grows_with_interest() {
        let mint = Pubkey::new_unique();
        let config = market(mint);
        let position = Position::new(Pubkey::new_unique(), 1, mint, mint);
        let mut pool = MarketPool::new(config, position);

        let shares = pool.deposit(1_000_000_000, 0).unwrap();
        assert_eq!(pool.balance_of(), shares);
        assert_eq!(pool.preview_redeem(shares, 0).unwrap(), 1_000_000_000);

        // Outside borrowers take 80% of the reserve
        pool.config.reserve = 200_000_000;
        pool.config.total_nominal_debt = 800_000_000;

        let later = SECONDS_PER_YEAR as i64;
        let value = pool.preview_redeem(shares, later).unwrap();
        assert!(value > 1_000_000_000);
        assert_eq!(pool.max_withdraw(later).unwrap(), 200_000_000);

        let needed = pool.preview_withdraw(200_000_000, later).unwrap();
        let out = pool.withdraw(needed, later).unwrap();
        assert!(out >= 200_000_000);
        assert_eq!(pool.config.last_updated, later);
    }
}
