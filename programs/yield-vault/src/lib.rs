// Yield Vault - multi-pool yield aggregator on Solana
// Architecture: Registry + Whitelist of in-program lending markets, weighted
// rebalancing, lock-to-earn bonds and merkle-claimed reward harvesting

use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

use engine::RebalanceAction;
use instructions::*;
use state::{FeedStatus, LockTerm, Settings};

declare_id!("VAULTvgMLuVNhWKYA2oYzH5gcz6XxsjXrqvnxTJbG8F");

#[program]
pub mod yield_vault {
    use super::*;

    /// Initialize a new vault for a given asset token
    ///
    /// Security considerations:
    /// - Validates authority is signer
    /// - Settings are validated once and never change
    /// - Creates share mint with the vault authority PDA as mint authority
    pub fn initialize(ctx: Context<Initialize>, settings: Settings) -> Result<()> {
        instructions::initialize::handler(ctx, settings)
    }

    /// Create an in-program lending market for the vault asset
    pub fn create_market(
        ctx: Context<CreateMarket>,
        pool_id: u64,
        params: MarketParams,
    ) -> Result<()> {
        instructions::create_market::handler(ctx, pool_id, params)
    }

    /// Add a market to the allowed-pools registry
    ///
    /// Security considerations:
    /// - Authority-only function
    /// - Rejects duplicates, full registry and weights above 100%
    pub fn add_pool(ctx: Context<AddPool>, max_weight_bps: u16, name: String) -> Result<()> {
        instructions::add_pool::handler(ctx, max_weight_bps, name)
    }

    /// Post or remove collateral and borrow or repay against a market
    ///
    /// Security considerations:
    /// - Markets accrue before any delta applies
    /// - Borrows and collateral removal are checked against fresh prices
    pub fn modify_position(
        ctx: Context<ModifyPosition>,
        collateral: i64,
        debt: i64,
    ) -> Result<()> {
        instructions::modify_position::handler(ctx, collateral, debt)
    }

    /// Enable or disable a pool; disabled pools can still be drained
    pub fn toggle_pool(ctx: Context<ManagePool>, pool: Pubkey, enabled: bool) -> Result<()> {
        instructions::manage_pool::toggle_handler(ctx, pool, enabled)
    }

    pub fn set_pool_weight(
        ctx: Context<ManagePool>,
        pool: Pubkey,
        max_weight_bps: u16,
    ) -> Result<()> {
        instructions::manage_pool::set_weight_handler(ctx, pool, max_weight_bps)
    }

    /// Deposit assets into the vault and mint shares to the receiver
    ///
    /// Security considerations:
    /// - Validates user token accounts (mint, owner)
    /// - Shares are priced at live total assets, rounded down
    /// - Follows checks-effects-interactions pattern
    pub fn deposit<'info>(
        ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, amount, DepositKind::Plain)
    }

    /// Deposit and open a bond maturing `lock_period` seconds from now.
    /// The receiver must be the signer; bonded shares go to its escrow.
    pub fn deposit_with_custom_lock<'info>(
        ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
        amount: u64,
        lock_period: i64,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, amount, DepositKind::CustomLock(lock_period))
    }

    pub fn deposit_with_preset_lock<'info>(
        ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
        amount: u64,
        term: LockTerm,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, amount, DepositKind::CustomLock(term.seconds()))
    }

    /// Add to an existing bond without moving its maturity
    pub fn deposit_locked<'info>(
        ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, amount, DepositKind::ExtendLock)
    }

    /// Withdraw an exact asset amount, burning shares rounded up
    ///
    /// Security considerations:
    /// - Bond holders are gated until maturity
    /// - Pools are drained in registry order when idle assets fall short
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        assets: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, WithdrawAmount::Assets(assets))
    }

    /// Burn an exact share amount, paying assets rounded down
    pub fn redeem<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        shares: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, WithdrawAmount::Shares(shares))
    }

    /// Execute explicit rebalance actions in order
    ///
    /// Architecture: Validates every target against the registry whitelist
    /// Security considerations:
    /// - Authority-only function (has_one constraint)
    /// - Deposits are capped at each pool's max weight
    /// - All actions succeed or the instruction fails
    pub fn rebalance<'info>(
        ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
        actions: Vec<RebalanceAction>,
    ) -> Result<()> {
        instructions::rebalance::handler(ctx, RebalanceTarget::Actions(actions))
    }

    /// Move allocations toward target weights (bps, one per registry pool)
    pub fn rebalance_weights<'info>(
        ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
        weights: Vec<u16>,
    ) -> Result<()> {
        instructions::rebalance::handler(ctx, RebalanceTarget::Weights(weights))
    }

    /// Redeem every pool back to idle assets, ignoring caps
    pub fn emergency_withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
    ) -> Result<()> {
        instructions::emergency_withdraw::handler(ctx, None)
    }

    pub fn emergency_withdraw_pool<'info>(
        ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
        pool_index: u8,
    ) -> Result<()> {
        instructions::emergency_withdraw::handler(ctx, Some(pool_index))
    }

    /// Claim vested rewards, swap to the asset and realize pool yield
    ///
    /// Security considerations:
    /// - Merkle proof is verified before any state change
    /// - Swap is priced by non-stale oracle records with a minimum output
    pub fn harvest<'info>(
        ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>,
        claim_amount: u64,
        proof: Vec<[u8; 32]>,
        min_amount_out: u64,
    ) -> Result<()> {
        instructions::harvest::handler(ctx, claim_amount, proof, min_amount_out)
    }

    pub fn update_price_feed(
        ctx: Context<UpdatePriceFeed>,
        price: i64,
        expo: i32,
        status: FeedStatus,
    ) -> Result<()> {
        instructions::update_price_feed::handler(ctx, price, expo, status)
    }

    pub fn publish_rewards_root(
        ctx: Context<PublishRewardsRoot>,
        merkle_root: [u8; 32],
    ) -> Result<()> {
        instructions::publish_rewards_root::handler(ctx, merkle_root)
    }
}
