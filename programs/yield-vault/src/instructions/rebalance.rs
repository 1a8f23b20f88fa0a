use anchor_lang::prelude::*;

use crate::engine::{
    LendingPool, MarketPool, PoolFeature, RebalanceAction, SysvarClock, TimeSource, VaultBook,
    VaultEngine,
};
use crate::{constants::*, errors::*, events::*, state::*};

use super::pool_accounts::{load_book, store_book};

/// Move assets between custody and the registered lending markets
///
/// Architecture: Registry + Whitelist
/// - Only markets listed in the registry can receive assets
/// - Deposits are capped at each market's max weight of total assets
/// - All actions of one instruction commit together or not at all
#[derive(Accounts)]
pub struct Rebalance<'info> {
    /// Vault authority - only they can rebalance
    pub authority: Signer<'info>,

    #[account(
        mut,
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

/// Target for one rebalance instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RebalanceTarget {
    Actions(Vec<RebalanceAction>),
    Weights(Vec<u16>),
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
    target: RebalanceTarget,
) -> Result<()> {
    let clock = SysvarClock::get()?;
    let now = clock.now();

    let (book, mut pools) = load_book(
        &ctx.accounts.vault_state,
        &ctx.accounts.pool_registry,
        ctx.remaining_accounts,
    )?;

    let mut engine = VaultEngine::new(book, clock);
    let executed = match target {
        RebalanceTarget::Actions(actions) => {
            engine.rebalance(&actions)?;
            actions
        }
        RebalanceTarget::Weights(weights) => engine.rebalance_weights(&weights)?,
    };

    let book = engine.into_book();
    emit_actions(&book, &executed, ctx.accounts.vault_state.key(), now)?;
    store_book(
        book,
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.pool_registry,
        &mut pools,
    )?;

    Ok(())
}

fn emit_actions(
    book: &VaultBook<MarketPool>,
    actions: &[RebalanceAction],
    vault: Pubkey,
    now: i64,
) -> Result<()> {
    for action in actions {
        let index = action.pool_index as usize;
        let pool = book.registry.get_pool(index)?;
        let market = book
            .pools
            .get(index)
            .ok_or(VaultError::PoolNotFound)?;
        emit!(Rebalanced {
            vault,
            pool: pool.pool_id,
            deposit: action.feature == PoolFeature::Deposit,
            amount: action.amount,
            pool_assets: market.preview_redeem(market.balance_of(), now)?,
            total_assets: book.state.total_assets,
            timestamp: now,
        });
    }
    Ok(())
}
