use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::math::Rounding;

use super::{pool_call, LendingPool, VaultBook};

impl<P: LendingPool> VaultBook<P> {
    pub(crate) fn validate_deposit(&self, assets: u64) -> Result<()> {
        let min_deposit = self.state.settings.min_deposit.max(1);
        if assets < min_deposit {
            msg!("deposit of {} below minimum {}", assets, min_deposit);
            return Err(error!(VaultError::InvalidAmount).with_values((assets, min_deposit)));
        }
        Ok(())
    }

    /// Mint shares for `assets` at the live share price. The assets stay idle
    /// until the next rebalance.
    pub(crate) fn deposit_assets(&mut self, receiver: &Pubkey, assets: u64, now: i64) -> Result<u64> {
        self.validate_deposit(assets)?;
        self.refresh(now)?;

        let shares = self.state.calculate_shares(assets, Rounding::Down)?;
        require!(shares > 0, VaultError::InvalidAmount);

        self.state.idle_assets = self
            .state
            .idle_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.state.total_assets = self
            .state
            .total_assets
            .checked_add(assets)
            .ok_or(VaultError::MathOverflow)?;
        self.state.total_shares = self
            .state
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;

        let holder = self.holder_mut(receiver);
        holder.shares = holder
            .shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;

        Ok(shares)
    }

    /// 0 while locked, otherwise the lesser of the owner's share value and
    /// what the vault could pay out right now
    pub fn max_withdraw(&self, owner: &Pubkey, now: i64) -> Result<u64> {
        let holder = self.holder(owner);
        if !holder.lock.can_withdraw(now) {
            return Ok(0);
        }
        let owned = self
            .refreshed_state(now)?
            .calculate_assets(holder.shares, Rounding::Down)?;
        Ok(owned.min(self.available_liquidity(now)?))
    }

    pub(crate) fn withdraw_assets(&mut self, owner: &Pubkey, assets: u64, now: i64) -> Result<u64> {
        require!(assets > 0, VaultError::InvalidAmount);
        self.refresh(now)?;
        let shares = self.state.calculate_shares(assets, Rounding::Up)?;
        self.settle_withdrawal(owner, assets, shares, now)?;
        Ok(shares)
    }

    pub(crate) fn redeem_shares(&mut self, owner: &Pubkey, shares: u64, now: i64) -> Result<u64> {
        require!(shares > 0, VaultError::InvalidAmount);
        self.refresh(now)?;
        let assets = self.state.calculate_assets(shares, Rounding::Down)?;
        require!(assets > 0, VaultError::InvalidAmount);
        self.settle_withdrawal(owner, assets, shares, now)?;
        Ok(assets)
    }

    /// Checks run in order: bond gate, share balance, liquidity. Nothing is
    /// mutated until all of them pass.
    fn settle_withdrawal(&mut self, owner: &Pubkey, assets: u64, shares: u64, now: i64) -> Result<()> {
        let holder = self.holder(owner);

        if holder.lock.is_bond() {
            if !holder.lock.can_withdraw(now) {
                msg!(
                    "funds locked until {}, now {}",
                    holder.lock.lock_until,
                    now
                );
                return Err(error!(VaultError::FundsLocked)
                    .with_values((holder.lock.lock_until, now)));
            }
            let max = self.max_withdraw(owner, now)?;
            if assets > max {
                msg!("withdrawal of {} exceeds max withdraw {}", assets, max);
                return Err(error!(VaultError::ExceedsMaxWithdraw).with_values((assets, max)));
            }
        }

        if shares > holder.shares {
            msg!("requires {} shares, owner holds {}", shares, holder.shares);
            return Err(error!(VaultError::InsufficientShares).with_values((shares, holder.shares)));
        }

        let liquidity = self.available_liquidity(now)?;
        if assets > liquidity {
            msg!("withdrawal of {} exceeds available liquidity {}", assets, liquidity);
            return Err(
                error!(VaultError::ExceedsAvailableLiquidity).with_values((assets, liquidity))
            );
        }

        self.pull_liquidity(assets, now)?;

        self.state.idle_assets -= assets;
        self.state.total_assets = self.state.total_assets.saturating_sub(assets);
        self.state.total_shares = self
            .state
            .total_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;

        let holder = self.holder_mut(owner);
        holder.shares -= shares;
        holder.lock.release(shares);
        Ok(())
    }

    /// Top idle assets up to `assets`, draining pools in registry order
    pub(crate) fn pull_liquidity(&mut self, assets: u64, now: i64) -> Result<()> {
        for index in 0..self.pools.len() {
            let needed = assets.saturating_sub(self.state.idle_assets);
            if needed == 0 {
                break;
            }
            let available = pool_call(index, self.pools[index].max_withdraw(now))?;
            let take = needed.min(available);
            if take == 0 {
                continue;
            }
            self.withdraw_from_pool(index, take, now)?;
        }

        if self.state.idle_assets < assets {
            msg!(
                "pools released {} idle, {} required",
                self.state.idle_assets,
                assets
            );
            return Err(error!(VaultError::ExceedsAvailableLiquidity)
                .with_values((assets, self.state.idle_assets)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anchor_lang::prelude::*;

    use crate::engine::{LendingPool, VaultBook};
    use crate::errors::VaultError;
    use crate::state::{PoolRegistry, Settings, VaultState};

    /// Pool that holds assets 1:1 and can be told to refuse calls
    #[derive(Clone, Debug, Default)]
    struct FlatPool {
        assets: u64,
        liquid: Option<u64>,
    }

    impl LendingPool for FlatPool {
        fn deposit(&mut self, assets: u64, _now: i64) -> Result<u128> {
            self.assets += assets;
            Ok(assets as u128)
        }

        fn withdraw(&mut self, shares: u128, _now: i64) -> Result<u64> {
            let shares = shares as u64;
            require!(shares <= self.assets, VaultError::InsufficientPoolLiquidity);
            self.assets -= shares;
            Ok(shares)
        }

        fn balance_of(&self) -> u128 {
            self.assets as u128
        }

        fn preview_redeem(&self, shares: u128, _now: i64) -> Result<u64> {
            Ok(shares as u64)
        }

        fn preview_withdraw(&self, assets: u64, _now: i64) -> Result<u128> {
            Ok(assets as u128)
        }

        fn max_withdraw(&self, _now: i64) -> Result<u64> {
            Ok(self.liquid.unwrap_or(self.assets).min(self.assets))
        }
    }

    fn book(pools: usize) -> VaultBook<FlatPool> {
        let vault = Pubkey::new_unique();
        let state = VaultState::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            6,
            Settings::new(Pubkey::new_unique()),
        );
        let mut registry = PoolRegistry::new(vault);
        for i in 0..pools {
            registry
                .add_pool(Pubkey::new_unique(), Pubkey::new_unique(), 10_000, format!("P{}", i))
                .unwrap();
        }
        VaultBook::new(vault, state, registry, vec![FlatPool::default(); pools]).unwrap()
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut book = book(0);
        let err = book.deposit_assets(&Pubkey::new_unique(), 0, 0).unwrap_err();
        assert!(VaultError::InvalidAmount.matches(&err));
    }

    #[test]
    fn test_withdraw_drains_pools_in_order() {
        let mut book = book(2);
        let user = Pubkey::new_unique();
        book.deposit_assets(&user, 1_000, 0).unwrap();
        book.deposit_into_pool(0, 300, 0).unwrap();
        book.deposit_into_pool(1, 500, 0).unwrap();
        assert_eq!(book.state.idle_assets, 200);

        book.withdraw_assets(&user, 600, 0).unwrap();
        assert_eq!(book.pools[0].assets, 0);
        assert_eq!(book.pools[1].assets, 400);
        assert_eq!(book.state.idle_assets, 0);
        assert_eq!(book.holder(&user).shares, 400);
    }

    #[test]
    fn test_withdraw_limited_by_liquidity() {
        let mut book = book(1);
        let user = Pubkey::new_unique();
        book.deposit_assets(&user, 1_000, 0).unwrap();
        book.deposit_into_pool(0, 900, 0).unwrap();
        book.pools[0].liquid = Some(100);

        let err = book.withdraw_assets(&user, 500, 0).unwrap_err();
        assert!(VaultError::ExceedsAvailableLiquidity.matches(&err));
        assert_eq!(book.max_withdraw(&user, 0).unwrap(), 200);
    }

    #[test]
    fn test_withdraw_more_than_owned() {
        let mut book = book(0);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        book.deposit_assets(&alice, 100, 0).unwrap();
        book.deposit_assets(&bob, 100, 0).unwrap();

        let err = book.withdraw_assets(&alice, 150, 0).unwrap_err();
        assert!(VaultError::InsufficientShares.matches(&err));
    }

    #[test]
    fn test_redeem_rounds_down() {
        let mut book = book(0);
        let user = Pubkey::new_unique();
        book.deposit_assets(&user, 1_000, 0).unwrap();
        // 1000 shares now back 1500 assets
        book.state.idle_assets = 1_500;

        let assets = book.redeem_shares(&user, 333, 0).unwrap();
        assert_eq!(assets, 499);
        assert_eq!(book.holder(&user).shares, 667);
    }
}
