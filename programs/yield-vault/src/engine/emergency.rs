use anchor_lang::prelude::*;

use crate::errors::VaultError;

use super::{pool_call, LendingPool, VaultBook};

impl<P: LendingPool> VaultBook<P> {
    /// Redeem as many receipt shares of pool `index` as the pool can pay out
    /// right now, ignoring weight caps and the enabled flag. Returns the assets
    /// recovered. A partially utilized pool gives back its liquid part and
    /// keeps the rest allocated.
    pub(crate) fn emergency_withdraw_pool(&mut self, index: usize, now: i64) -> Result<u64> {
        let pool = self.pool_mut(index)?;
        let held = pool.balance_of();
        let liquid = pool_call(index, pool.max_withdraw(now))?;
        let mut shares = if liquid == 0 {
            0
        } else {
            pool_call(index, pool.preview_withdraw(liquid, now))?.min(held)
        };
        // Rounding the shares up can price them a unit above what is liquid
        if shares > 0 && pool_call(index, pool.preview_redeem(shares, now))? > liquid {
            shares -= 1;
        }
        let recovered = if shares == 0 {
            0
        } else {
            pool_call(index, pool.withdraw(shares, now))?
        };
        let drained = pool.balance_of() == 0;

        self.state.idle_assets = self
            .state
            .idle_assets
            .checked_add(recovered)
            .ok_or(VaultError::MathOverflow)?;
        if drained {
            self.registry.get_pool_mut(index)?.principal = 0;
        } else {
            self.registry.track_withdrawal(index, recovered)?;
        }

        msg!(
            "emergency withdrew {} from pool {} ({} shares left)",
            recovered,
            index,
            held - shares
        );
        Ok(recovered)
    }

    pub(crate) fn emergency_withdraw(&mut self, now: i64) -> Result<u64> {
        let mut recovered = 0u64;
        for index in 0..self.pools.len() {
            recovered = recovered
                .checked_add(self.emergency_withdraw_pool(index, now)?)
                .ok_or(VaultError::MathOverflow)?;
        }
        Ok(recovered)
    }
}
