use anchor_lang::prelude::*;

use crate::constants::BPS_DENOMINATOR;
use crate::errors::VaultError;
use crate::math::{bps_mul, to_bps, Rounding};

use super::{pool_call, LendingPool, VaultBook};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolFeature {
    /// Move idle assets into the pool
    Deposit,
    /// Pull pool assets back to idle
    Withdraw,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebalanceAction {
    /// Registry index of the pool
    pub pool_index: u8,
    pub amount: u64,
    pub feature: PoolFeature,
}

impl RebalanceAction {
    pub fn deposit(pool_index: u8, amount: u64) -> Self {
        Self {
            pool_index,
            amount,
            feature: PoolFeature::Deposit,
        }
    }

    pub fn withdraw(pool_index: u8, amount: u64) -> Self {
        Self {
            pool_index,
            amount,
            feature: PoolFeature::Withdraw,
        }
    }
}

impl<P: LendingPool> VaultBook<P> {
    /// Supply `amount` idle assets to pool `index` within its weight cap
    pub(crate) fn deposit_into_pool(&mut self, index: usize, amount: u64, now: i64) -> Result<()> {
        require!(amount > 0, VaultError::InvalidAmount);
        if !self.registry.is_pool_approved(index) {
            msg!("pool {} is not registered or disabled", index);
            return err!(VaultError::PoolNotApproved);
        }
        if amount > self.state.idle_assets {
            msg!("deposit of {} exceeds idle assets {}", amount, self.state.idle_assets);
            return Err(error!(VaultError::ExceedsAvailableLiquidity)
                .with_values((amount, self.state.idle_assets)));
        }

        let total = self.live_total_assets(now)?;
        let after = self
            .pool_assets(index, now)?
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        let max_weight_bps = self.registry.get_pool(index)?.max_weight_bps;
        let cap = bps_mul(total, max_weight_bps, Rounding::Down)?;
        if after > cap {
            let requested_bps = to_bps(after, total)?;
            msg!(
                "pool cap exceeded: requested {} bps, max {} bps",
                requested_bps,
                max_weight_bps
            );
            return Err(
                error!(VaultError::PoolCapExceeded).with_values((requested_bps, max_weight_bps))
            );
        }

        pool_call(index, self.pool_mut(index)?.deposit(amount, now))?;
        self.state.idle_assets -= amount;
        self.registry.track_deposit(index, amount)
    }

    /// Pull roughly `amount` assets out of pool `index`; returns what arrived.
    /// Disabled pools can always be drained.
    pub(crate) fn withdraw_from_pool(&mut self, index: usize, amount: u64, now: i64) -> Result<u64> {
        require!(amount > 0, VaultError::InvalidAmount);
        let pool = self.pool_mut(index)?;
        let shares = pool_call(index, pool.preview_withdraw(amount, now))?.min(pool.balance_of());
        if shares == 0 {
            return Ok(0);
        }
        let received = pool_call(index, pool.withdraw(shares, now))?;

        self.state.idle_assets = self
            .state
            .idle_assets
            .checked_add(received)
            .ok_or(VaultError::MathOverflow)?;
        self.registry.track_withdrawal(index, received)?;
        Ok(received)
    }

    pub(crate) fn apply_action(&mut self, action: &RebalanceAction, now: i64) -> Result<()> {
        let index = action.pool_index as usize;
        require!(index < self.pools.len(), VaultError::PoolNotFound);
        match action.feature {
            PoolFeature::Deposit => self.deposit_into_pool(index, action.amount, now),
            PoolFeature::Withdraw => self.withdraw_from_pool(index, action.amount, now).map(|_| ()),
        }
    }

    /// Execute `actions` in the given order
    pub(crate) fn rebalance(&mut self, actions: &[RebalanceAction], now: i64) -> Result<()> {
        for action in actions {
            self.apply_action(action, now)?;
        }
        Ok(())
    }

    /// Withdraw-then-deposit actions that move every pool to `weights` (bps,
    /// one per registry entry). Unassigned weight goes to the default pool up
    /// to its cap; whatever is left stays idle.
    pub fn plan_rebalance_weights(&self, weights: &[u16], now: i64) -> Result<Vec<RebalanceAction>> {
        if weights.len() != self.registry.len() {
            msg!(
                "expected {} weights, got {}",
                self.registry.len(),
                weights.len()
            );
            return err!(VaultError::InvalidWeights);
        }
        let weight_sum: u64 = weights.iter().map(|w| *w as u64).sum();
        if weight_sum > BPS_DENOMINATOR {
            msg!("weights sum to {} bps", weight_sum);
            return Err(error!(VaultError::InvalidWeights).with_values((weight_sum, BPS_DENOMINATOR)));
        }

        for (index, weight) in weights.iter().enumerate() {
            let pool = self.registry.get_pool(index)?;
            if *weight > pool.max_weight_bps {
                msg!(
                    "pool cap exceeded: requested {} bps, max {} bps",
                    weight,
                    pool.max_weight_bps
                );
                return Err(
                    error!(VaultError::PoolCapExceeded).with_values((*weight, pool.max_weight_bps))
                );
            }
            if *weight > 0 && !pool.enabled {
                msg!("pool {} is disabled", index);
                return err!(VaultError::PoolNotApproved);
            }
        }

        let total = self.live_total_assets(now)?;
        let mut targets = weights
            .iter()
            .map(|w| bps_mul(total, *w, Rounding::Down))
            .collect::<Result<Vec<u64>>>()?;

        let default_index = self.state.settings.default_pool_index as usize;
        if let Some(pool) = self.registry.pools.get(default_index) {
            if pool.enabled {
                let assigned: u64 = targets.iter().sum();
                let residual = total.saturating_sub(assigned);
                let cap = bps_mul(total, pool.max_weight_bps, Rounding::Down)?;
                targets[default_index] = targets[default_index].saturating_add(residual).min(cap);
            }
        }

        let mut current = Vec::with_capacity(self.pools.len());
        for index in 0..self.pools.len() {
            current.push(self.pool_assets(index, now)?);
        }

        let mut actions = Vec::new();
        let mut idle = self.state.idle_assets;
        for (index, (have, want)) in current.iter().zip(&targets).enumerate() {
            if have > want {
                actions.push(RebalanceAction::withdraw(index as u8, have - want));
                idle = idle.saturating_add(have - want);
            }
        }
        for (index, (have, want)) in current.iter().zip(&targets).enumerate() {
            if want > have {
                let amount = (want - have).min(idle);
                if amount > 0 {
                    actions.push(RebalanceAction::deposit(index as u8, amount));
                    idle -= amount;
                }
            }
        }
        Ok(actions)
    }

    /// Plan and execute; deposits are clipped to the idle balance actually
    /// released by the preceding withdrawals. Returns the executed actions.
    pub(crate) fn rebalance_weights(&mut self, weights: &[u16], now: i64) -> Result<Vec<RebalanceAction>> {
        let plan = self.plan_rebalance_weights(weights, now)?;
        let mut executed = Vec::with_capacity(plan.len());
        for action in plan {
            let action = match action.feature {
                PoolFeature::Withdraw => action,
                PoolFeature::Deposit => {
                    RebalanceAction::deposit(action.pool_index, action.amount.min(self.state.idle_assets))
                }
            };
            if action.amount == 0 {
                continue;
            }
            self.apply_action(&action, now)?;
            executed.push(action);
        }
        Ok(executed)
    }
}
