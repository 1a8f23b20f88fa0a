use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, MAX_POOLS, MAX_POOL_NAME_LEN};
use crate::errors::VaultError;

/// Ordered list of lending pools the vault may allocate to
///
/// - Authority can add/toggle pools and change weight caps via instructions
/// - Deposits are restricted to enabled pools inside their weight cap
/// - Tracks the principal allocated to each pool for yield accounting
#[account]
#[derive(Debug, PartialEq)]
pub struct PoolRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,

    /// Allowed pools, in allocation and withdrawal order
    pub pools: Vec<PoolProps>,

    /// Bump seed for PDA
    pub bump: u8,
}

/// Individual allowed pool entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct PoolProps {
    /// Lending market configuration account identifying the pool
    pub pool_id: Pubkey,

    /// The vault's share-bearing receipt position in that pool
    pub receipt: Pubkey,

    /// Hard ceiling on this pool's share of total assets
    pub max_weight_bps: u16,

    /// Whether this pool currently accepts deposits
    pub enabled: bool,

    /// Assets allocated and not yet recognised as yield
    pub principal: u64,

    /// Human-readable name (e.g., "Core USDC", "Prime")
    pub name: String,
}

impl PoolProps {
    /// 32 pool_id + 32 receipt + 2 max_weight_bps + 1 enabled + 8 principal + 4 + 32 name
    pub const SIZE: usize = 32 + 32 + 2 + 1 + 8 + 4 + MAX_POOL_NAME_LEN;
}

impl PoolRegistry {
    /// 8 (discriminator) + 32 (vault) + 4 (vec len) + pools + 1 (bump) + 64 (padding)
    pub const SPACE: usize = 8 + 32 + 4 + (MAX_POOLS * PoolProps::SIZE) + 1 + 64;

    pub fn new(vault: Pubkey) -> Self {
        Self {
            vault,
            pools: Vec::new(),
            bump: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Check if a pool index is registered and enabled
    pub fn is_pool_approved(&self, index: usize) -> bool {
        self.pools.get(index).map_or(false, |p| p.enabled)
    }

    pub fn position_of(&self, pool_id: &Pubkey) -> Option<usize> {
        self.pools.iter().position(|p| p.pool_id == *pool_id)
    }

    pub fn get_pool(&self, index: usize) -> Result<&PoolProps> {
        self.pools
            .get(index)
            .ok_or(error!(VaultError::PoolNotFound))
    }

    /// Get mutable pool by index
    pub fn get_pool_mut(&mut self, index: usize) -> Result<&mut PoolProps> {
        self.pools
            .get_mut(index)
            .ok_or(error!(VaultError::PoolNotFound))
    }

    pub fn add_pool(
        &mut self,
        pool_id: Pubkey,
        receipt: Pubkey,
        max_weight_bps: u16,
        name: String,
    ) -> Result<usize> {
        require!(name.len() <= MAX_POOL_NAME_LEN, VaultError::NameTooLong);
        require!(
            max_weight_bps as u64 <= BPS_DENOMINATOR,
            VaultError::InvalidWeights
        );
        require!(
            self.position_of(&pool_id).is_none(),
            VaultError::PoolAlreadyExists
        );
        require!(self.pools.len() < MAX_POOLS, VaultError::RegistryFull);

        self.pools.push(PoolProps {
            pool_id,
            receipt,
            max_weight_bps,
            enabled: true,
            principal: 0,
            name,
        });
        Ok(self.pools.len() - 1)
    }

    /// Returns the previous cap
    pub fn set_max_weight(&mut self, index: usize, max_weight_bps: u16) -> Result<u16> {
        require!(
            max_weight_bps as u64 <= BPS_DENOMINATOR,
            VaultError::InvalidWeights
        );
        let pool = self.get_pool_mut(index)?;
        let previous = pool.max_weight_bps;
        pool.max_weight_bps = max_weight_bps;
        Ok(previous)
    }

    /// Record assets moved into a pool
    pub fn track_deposit(&mut self, index: usize, amount: u64) -> Result<()> {
        let pool = self.get_pool_mut(index)?;
        pool.principal = pool
            .principal
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Record assets pulled out of a pool. Withdrawals above principal
    /// consume realised yield and leave the principal at zero.
    pub fn track_withdrawal(&mut self, index: usize, amount: u64) -> Result<()> {
        let pool = self.get_pool_mut(index)?;
        pool.principal = pool.principal.saturating_sub(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(n: usize) -> PoolRegistry {
        let mut registry = PoolRegistry::new(Pubkey::new_unique());
        for i in 0..n {
            registry
                .add_pool(
                    Pubkey::new_unique(),
                    Pubkey::new_unique(),
                    3_000,
                    format!("Pool{}", i),
                )
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_add_pool_rejects_duplicates_and_overflow() {
        let mut registry = registry_with(1);
        let existing = registry.pools[0].pool_id;
        assert!(registry
            .add_pool(existing, Pubkey::new_unique(), 1_000, "Dup".to_string())
            .is_err());

        let mut full = registry_with(MAX_POOLS);
        assert!(full
            .add_pool(Pubkey::new_unique(), Pubkey::new_unique(), 1_000, "X".to_string())
            .is_err());
    }

    #[test]
    fn test_add_pool_validates_name_and_weight() {
        let mut registry = registry_with(0);
        let long_name = "x".repeat(MAX_POOL_NAME_LEN + 1);
        assert!(registry
            .add_pool(Pubkey::new_unique(), Pubkey::new_unique(), 1_000, long_name)
            .is_err());
        assert!(registry
            .add_pool(Pubkey::new_unique(), Pubkey::new_unique(), 10_001, "W".to_string())
            .is_err());
    }

    #[test]
    fn test_approval_follows_enabled_flag() {
        let mut registry = registry_with(2);
        registry.pools[1].enabled = false;

        assert!(registry.is_pool_approved(0));
        assert!(!registry.is_pool_approved(1)); // Disabled
        assert!(!registry.is_pool_approved(2)); // Not in registry
    }

    #[test]
    fn test_principal_tracking() {
        let mut registry = registry_with(1);
        registry.track_deposit(0, 1000).unwrap();
        registry.track_deposit(0, 500).unwrap();
        assert_eq!(registry.pools[0].principal, 1500);

        registry.track_withdrawal(0, 2000).unwrap();
        assert_eq!(registry.pools[0].principal, 0);

        registry.pools[0].principal = u64::MAX - 100;
        assert!(registry.track_deposit(0, 200).is_err());
    }

    #[test]
    fn test_set_max_weight() {
        let mut registry = registry_with(1);
        assert_eq!(registry.set_max_weight(0, 5_000).unwrap(), 3_000);
        assert_eq!(registry.pools[0].max_weight_bps, 5_000);
        assert!(registry.set_max_weight(3, 5_000).is_err());
    }
}
