use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Add a lending market to the allowed-pools registry
#[derive(Accounts)]
pub struct AddPool<'info> {
    /// Vault authority - only they can manage pools
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [POOL_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = pool_registry.bump,
    )]
    pub pool_registry: Account<'info, PoolRegistry>,

    /// Market configuration identifying the pool
    /// Security: Must belong to this vault and lend the vault asset
    #[account(
        constraint = asset_config.vault == vault_state.key() @ VaultError::PoolAccountMismatch,
        constraint = asset_config.asset_mint == vault_state.asset_mint @ VaultError::InvalidMint,
    )]
    pub asset_config: Account<'info, AssetConfig>,

    /// Vault's receipt position in that market
    #[account(
        seeds = [POSITION_SEED, asset_config.key().as_ref(), vault_state.key().as_ref()],
        bump = receipt.bump,
    )]
    pub receipt: Account<'info, Position>,
}

pub fn handler(ctx: Context<AddPool>, max_weight_bps: u16, name: String) -> Result<()> {
    let pool = ctx.accounts.asset_config.key();
    let receipt = ctx.accounts.receipt.key();
    let registry = &mut ctx.accounts.pool_registry;

    registry.add_pool(pool, receipt, max_weight_bps, name.clone())?;

    emit!(PoolAdded {
        vault: registry.vault,
        pool,
        name,
        max_weight_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
