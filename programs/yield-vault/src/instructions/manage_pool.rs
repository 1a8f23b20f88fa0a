use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Toggle a pool or change its weight cap
#[derive(Accounts)]
pub struct ManagePool<'info> {
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
}

/// Disabled pools take no new deposits but can still be drained
pub fn toggle_handler(ctx: Context<ManagePool>, pool: Pubkey, enabled: bool) -> Result<()> {
    let registry = &mut ctx.accounts.pool_registry;
    let index = registry
        .position_of(&pool)
        .ok_or(VaultError::PoolNotFound)?;
    registry.get_pool_mut(index)?.enabled = enabled;

    emit!(PoolToggled {
        vault: registry.vault,
        pool,
        enabled,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}

pub fn set_weight_handler(ctx: Context<ManagePool>, pool: Pubkey, max_weight_bps: u16) -> Result<()> {
    let registry = &mut ctx.accounts.pool_registry;
    let index = registry
        .position_of(&pool)
        .ok_or(VaultError::PoolNotFound)?;
    let old_max_weight_bps = registry.set_max_weight(index, max_weight_bps)?;

    emit!(PoolWeightUpdated {
        vault: registry.vault,
        pool,
        old_max_weight_bps,
        new_max_weight_bps: max_weight_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
