use anchor_lang::prelude::*;

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub fee_receiver: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when assets are deposited
#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub receiver: Pubkey,
    pub asset_amount: u64,
    pub shares_minted: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    /// Zero for unlocked deposits
    pub lock_until: i64,
    pub timestamp: i64,
}

/// Event emitted when assets are withdrawn
#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub receiver: Pubkey,
    pub asset_amount: u64,
    pub shares_burned: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a lending market is created for the vault
#[event]
pub struct MarketCreated {
    pub vault: Pubkey,
    pub asset_config: Pubkey,
    pub receipt: Pubkey,
    pub asset_mint: Pubkey,
    pub pool_id: u64,
    pub timestamp: i64,
}

/// Event emitted when a pool is added to the registry
#[event]
pub struct PoolAdded {
    pub vault: Pubkey,
    pub pool: Pubkey,
    pub name: String,
    pub max_weight_bps: u16,
    pub timestamp: i64,
}

/// Event emitted when a pool is toggled
#[event]
pub struct PoolToggled {
    pub vault: Pubkey,
    pub pool: Pubkey,
    pub enabled: bool,
    pub timestamp: i64,
}

/// Event emitted when a pool's weight cap changes
#[event]
pub struct PoolWeightUpdated {
    pub vault: Pubkey,
    pub pool: Pubkey,
    pub old_max_weight_bps: u16,
    pub new_max_weight_bps: u16,
    pub timestamp: i64,
}

/// Event emitted once per executed rebalance action
#[event]
pub struct Rebalanced {
    pub vault: Pubkey,
    pub pool: Pubkey,
    pub deposit: bool,
    pub amount: u64,
    pub pool_assets: u64,
    pub total_assets: u64,
    pub timestamp: i64,
}

/// Event emitted after a successful harvest
#[event]
pub struct Harvested {
    pub vault: Pubkey,
    pub pool_yield: u64,
    pub rewards_claimed: u64,
    pub swapped_amount: u64,
    pub fee_shares: u64,
    pub total_assets: u64,
    pub timestamp: i64,
}

/// Event emitted when pool funds are pulled back outside the rebalancer
#[event]
pub struct EmergencyWithdrawn {
    pub vault: Pubkey,
    pub pool: Pubkey,
    pub amount: u64,
    pub idle_assets: u64,
    pub timestamp: i64,
}

/// Event emitted when an oracle record is refreshed
#[event]
pub struct PriceUpdated {
    pub feed: Pubkey,
    pub mint: Pubkey,
    pub price: i64,
    pub expo: i32,
    pub publish_time: i64,
}

/// Event emitted when a new rewards root is published
#[event]
pub struct RewardsRootPublished {
    pub vault: Pubkey,
    pub distributor: Pubkey,
    pub merkle_root: [u8; 32],
    pub timestamp: i64,
}

/// Event emitted when a borrower position changes
#[event]
pub struct PositionModified {
    pub vault: Pubkey,
    pub owner: Pubkey,
    pub position: Pubkey,
    /// Signed asset amounts; positive moved into the market
    pub collateral_delta: i128,
    pub debt_delta: i128,
    pub collateral_shares: u128,
    pub nominal_debt: u128,
    pub timestamp: i64,
}
