use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;

/// Adaptive interest rate curve parameters (SCALE precision, rates per second)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterestRateConfig {
    pub min_target_utilization: u128,
    pub max_target_utilization: u128,
    /// Kink of the dual-slope curve
    pub target_utilization: u128,
    pub min_full_for_utilization_rate: u128,
    pub max_full_for_utilization_rate: u128,
    pub zero_utilization_rate: u128,
    pub rate_half_life: u64,
    /// Rate at the kink as a fraction of the full-utilization rate
    pub target_rate_percent: u128,
}

impl Default for InterestRateConfig {
    fn default() -> Self {
        Self {
            min_target_utilization: DEFAULT_MIN_TARGET_UTILIZATION,
            max_target_utilization: DEFAULT_MAX_TARGET_UTILIZATION,
            target_utilization: DEFAULT_TARGET_UTILIZATION,
            min_full_for_utilization_rate: DEFAULT_MIN_FULL_UTILIZATION_RATE,
            max_full_for_utilization_rate: DEFAULT_MAX_FULL_UTILIZATION_RATE,
            zero_utilization_rate: DEFAULT_ZERO_UTILIZATION_RATE,
            rate_half_life: DEFAULT_RATE_HALF_LIFE,
            target_rate_percent: DEFAULT_TARGET_RATE_PERCENT,
        }
    }
}

impl InterestRateConfig {
    pub const SIZE: usize = 16 * 7 + 8;

    pub fn validate(&self) -> Result<()> {
        require!(
            self.min_target_utilization > 0
                && self.min_target_utilization <= self.target_utilization
                && self.target_utilization <= self.max_target_utilization
                && self.max_target_utilization < SCALE,
            VaultError::InvalidSettings
        );
        require!(
            self.zero_utilization_rate <= self.min_full_for_utilization_rate
                && self.min_full_for_utilization_rate <= self.max_full_for_utilization_rate,
            VaultError::InvalidSettings
        );
        require!(self.rate_half_life > 0, VaultError::InvalidSettings);
        require!(self.target_rate_percent <= SCALE, VaultError::InvalidSettings);
        Ok(())
    }
}

/// Interest-bearing configuration of one asset inside one lending pool
///
/// Only the position accounting engine mutates this record, and always
/// accrues to the current timestamp before applying a delta.
#[account]
#[derive(Debug, PartialEq)]
pub struct AssetConfig {
    pub vault: Pubkey,
    pub pool_id: u64,
    pub asset_mint: Pubkey,

    pub total_collateral_shares: u128,
    pub total_nominal_debt: u128,

    /// Assets held by the pool and not lent out
    pub reserve: u128,

    /// Highest debt / (reserve + debt) a borrow may leave behind
    pub max_utilization: u128,

    /// Smallest non-zero debt value a position may carry
    pub floor: u128,

    /// Highest debt value / collateral value when this asset backs a borrow
    pub max_ltv: u128,

    /// 10^decimals of the asset
    pub scale: u128,

    /// Legacy markets keep a fixed full-utilization rate
    pub is_legacy_mode: bool,

    pub last_updated: i64,
    pub last_rate_accumulator: u128,
    pub last_full_utilization_rate: u128,

    /// Share of accrued interest booked to the pool owner
    pub fee_rate: u128,

    /// Collateral shares accrued to the pool owner as fees
    pub fee_shares: u128,

    pub interest_rate_config: InterestRateConfig,

    pub bump: u8,
}

impl AssetConfig {
    pub const LEN: usize = 8  // discriminator
        + 32  // vault
        + 8   // pool_id
        + 32  // asset_mint
        + 16 * 7 // shares, debt, reserve, max_utilization, floor, max_ltv, scale
        + 1   // is_legacy_mode
        + 8   // last_updated
        + 16 * 4 // accumulator, full rate, fee_rate, fee_shares
        + InterestRateConfig::SIZE
        + 1   // bump
        + 64; // padding

    pub fn new(
        vault: Pubkey,
        pool_id: u64,
        asset_mint: Pubkey,
        scale: u128,
        now: i64,
    ) -> Self {
        let interest_rate_config = InterestRateConfig::default();
        Self {
            vault,
            pool_id,
            asset_mint,
            total_collateral_shares: 0,
            total_nominal_debt: 0,
            reserve: 0,
            max_utilization: DEFAULT_MAX_UTILIZATION,
            floor: 0,
            max_ltv: DEFAULT_MAX_LTV,
            scale,
            is_legacy_mode: false,
            last_updated: now,
            last_rate_accumulator: SCALE,
            last_full_utilization_rate: interest_rate_config.min_full_for_utilization_rate,
            fee_rate: 0,
            fee_shares: 0,
            interest_rate_config,
            bump: 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require!(self.scale > 0, VaultError::InvalidSettings);
        require!(self.max_utilization <= SCALE, VaultError::InvalidSettings);
        require!(self.max_ltv < SCALE, VaultError::InvalidSettings);
        require!(self.fee_rate <= MAX_FEE_RATE, VaultError::InvalidSettings);
        self.interest_rate_config.validate()
    }
}
