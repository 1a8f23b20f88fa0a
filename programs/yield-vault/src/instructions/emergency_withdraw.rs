use anchor_lang::prelude::*;

use crate::engine::{SysvarClock, TimeSource, VaultEngine};
use crate::events::*;

use super::pool_accounts::{load_book, store_book};
use super::Rebalance;

/// Pull every market (or only `pool_index`) back to idle, bypassing weight
/// caps and the enabled flag. Takes the same accounts as `Rebalance`.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Rebalance<'info>>,
    pool_index: Option<u8>,
) -> Result<()> {
    let clock = SysvarClock::get()?;
    let now = clock.now();
    let vault = ctx.accounts.vault_state.key();

    let (book, mut pools) = load_book(
        &ctx.accounts.vault_state,
        &ctx.accounts.pool_registry,
        ctx.remaining_accounts,
    )?;
    let targets: Vec<usize> = match pool_index {
        Some(index) => vec![index as usize],
        None => (0..book.pools.len()).collect(),
    };

    let mut engine = VaultEngine::new(book, clock);
    let mut recovered = Vec::with_capacity(targets.len());
    for index in targets {
        let amount = engine.emergency_withdraw_pool(index)?;
        let pool = engine.book().registry.get_pool(index)?.pool_id;
        recovered.push((pool, amount));
    }

    store_book(
        engine.into_book(),
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.pool_registry,
        &mut pools,
    )?;

    let idle_assets = ctx.accounts.vault_state.idle_assets;
    for (pool, amount) in recovered {
        emit!(EmergencyWithdrawn {
            vault,
            pool,
            amount,
            idle_assets,
            timestamp: now,
        });
    }

    Ok(())
}
