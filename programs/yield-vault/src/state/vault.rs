use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::VaultError;
use crate::math::{mul_div_u64, Rounding};

/// Immutable vault configuration, fixed at `initialize`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Receives performance-fee shares on harvest
    pub fee_receiver: Pubkey,

    /// Share of harvested gains taken as fee
    pub performance_fee_bps: u16,

    /// Registry index that absorbs the residual in `rebalance_weights`
    pub default_pool_index: u8,

    /// Longest custom lock a depositor may choose, in seconds
    pub max_lock_period: i64,

    /// Smallest accepted deposit in asset units
    pub min_deposit: u64,

    /// Oldest oracle publish time accepted, in seconds
    pub max_price_age: i64,
}

impl Settings {
    pub fn new(fee_receiver: Pubkey) -> Self {
        Self {
            fee_receiver,
            performance_fee_bps: 0,
            default_pool_index: 0,
            max_lock_period: DEFAULT_MAX_LOCK_PERIOD,
            min_deposit: 1,
            max_price_age: DEFAULT_MAX_PRICE_AGE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require!(
            self.performance_fee_bps <= MAX_PERFORMANCE_FEE_BPS,
            VaultError::InvalidSettings
        );
        require!(self.max_lock_period > 0, VaultError::InvalidSettings);
        require!(self.max_price_age > 0, VaultError::InvalidSettings);
        require!(
            (self.default_pool_index as usize) < MAX_POOLS,
            VaultError::InvalidSettings
        );
        Ok(())
    }
}

/// Global vault state tracking assets and shares
///
/// `total_assets` is the snapshot written at the end of the last operation;
/// conversions are always computed from a fresh snapshot taken by the engine.
#[account]
#[derive(Debug, PartialEq)]
pub struct VaultState {
    /// Authority that can rebalance, manage pools and trigger emergency paths
    pub authority: Pubkey,

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,

    /// Mint of the vault share token
    pub share_mint: Pubkey,

    pub asset_decimals: u8,

    /// Idle assets plus every pool allocation, as of the last operation
    pub total_assets: u64,

    /// Total shares issued to depositors
    pub total_shares: u64,

    /// Assets held in custody and not allocated to any pool
    pub idle_assets: u64,

    pub last_harvest: i64,

    pub settings: Settings,

    /// Bump seed for vault state PDA
    pub bump: u8,

    /// Bump seed for share mint PDA
    pub share_bump: u8,

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,

    // Padding for future upgrades
    pub _reserved: [u8; 64],
}

impl VaultState {
    pub fn new(
        authority: Pubkey,
        asset_mint: Pubkey,
        share_mint: Pubkey,
        asset_decimals: u8,
        settings: Settings,
    ) -> Self {
        Self {
            authority,
            asset_mint,
            share_mint,
            asset_decimals,
            total_assets: 0,
            total_shares: 0,
            idle_assets: 0,
            last_harvest: 0,
            settings,
            bump: 0,
            share_bump: 0,
            authority_bump: 0,
            _reserved: [0; 64],
        }
    }

    /// Calculate shares for a given asset amount
    ///
    /// ERC-4626 formula:
    /// - If first deposit: shares = assets
    /// - Otherwise: shares = assets * totalShares / totalAssets
    ///
    /// Deposits round down; the shares burned for a withdrawal round up.
    /// Outstanding shares backed by zero assets cannot be priced, so no new
    /// shares are issued against them.
    pub fn calculate_shares(&self, assets: u64, rounding: Rounding) -> Result<u64> {
        // First deposit: 1:1 ratio
        if self.total_shares == 0 {
            return Ok(assets);
        }
        if self.total_assets == 0 {
            msg!("{} shares outstanding with no backing assets", self.total_shares);
            return Err(error!(VaultError::InvalidAmount).with_values((self.total_shares, 0u64)));
        }

        mul_div_u64(assets, self.total_shares, self.total_assets, rounding)
    }

    /// Calculate asset value of shares
    ///
    /// ERC-4626 formula: assets = shares * totalAssets / totalShares
    pub fn calculate_assets(&self, shares: u64, rounding: Rounding) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }

        mul_div_u64(shares, self.total_assets, self.total_shares, rounding)
    }

    /// Shares to mint as performance fee so that the receiver owns
    /// `fee_assets` of the post-gain total
    pub fn calculate_fee_shares(&self, fee_assets: u64) -> Result<u64> {
        if fee_assets == 0 || self.total_shares == 0 {
            return Ok(0);
        }
        let remaining = self
            .total_assets
            .checked_sub(fee_assets)
            .ok_or(VaultError::MathOverflow)?;
        if remaining == 0 {
            return Ok(0);
        }
        mul_div_u64(fee_assets, self.total_shares, remaining, Rounding::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_vault(total_assets: u64, total_shares: u64) -> VaultState {
        let mut vault = VaultState::new(
            Pubkey::default(),
            Pubkey::default(),
            Pubkey::default(),
            6,
            Settings::new(Pubkey::default()),
        );
        vault.total_assets = total_assets;
        vault.total_shares = total_shares;
        vault
    }

    #[test]
    fn test_first_deposit() {
        let vault = mock_vault(0, 0);
        assert_eq!(vault.calculate_shares(1000, Rounding::Down).unwrap(), 1000);
    }

    #[test]
    fn test_wiped_out_vault_issues_no_shares() {
        // Shares outstanding, every asset lost
        let vault = mock_vault(0, 1000);
        let err = vault.calculate_shares(1000, Rounding::Down).unwrap_err();
        assert!(VaultError::InvalidAmount.matches(&err));
        assert_eq!(vault.calculate_assets(1000, Rounding::Down).unwrap(), 0);
    }

    #[test]
    fn test_subsequent_deposit_with_profit() {
        // Vault has 2000 assets but only 1000 shares (profit made)
        let vault = mock_vault(2000, 1000);
        assert_eq!(vault.calculate_shares(500, Rounding::Down).unwrap(), 250);
        assert_eq!(vault.calculate_assets(500, Rounding::Down).unwrap(), 1000);
    }

    #[test]
    fn test_rounding_favors_vault() {
        let vault = mock_vault(1000, 333);
        // 100 * 333 / 1000 = 33.3
        assert_eq!(vault.calculate_shares(100, Rounding::Down).unwrap(), 33);
        assert_eq!(vault.calculate_shares(100, Rounding::Up).unwrap(), 34);
    }

    #[test]
    fn test_fee_shares() {
        // 1100 assets after a 100 gain, 10% fee = 10 assets
        let vault = mock_vault(1100, 1000);
        let shares = vault.calculate_fee_shares(10).unwrap();
        // 10 * 1000 / 1090 = 9.17
        assert_eq!(shares, 9);
        assert_eq!(vault.calculate_fee_shares(0).unwrap(), 0);
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::new(Pubkey::new_unique());
        assert!(settings.validate().is_ok());

        settings.performance_fee_bps = MAX_PERFORMANCE_FEE_BPS + 1;
        assert!(settings.validate().is_err());

        settings.performance_fee_bps = 1_000;
        settings.max_lock_period = 0;
        assert!(settings.validate().is_err());
    }
}
