use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::state::{LockRecord, LockState};

use super::{LendingPool, VaultBook};

/// Read-only view of a depositor's bond
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockInfo {
    pub lock_until: i64,
    pub locked_shares: u64,
    pub state: LockState,
    pub can_withdraw: bool,
}

impl LockInfo {
    pub fn of(record: &LockRecord, now: i64) -> Self {
        Self {
            lock_until: record.lock_until,
            locked_shares: record.locked_shares,
            state: record.state(now),
            can_withdraw: record.can_withdraw(now),
        }
    }
}

impl<P: LendingPool> VaultBook<P> {
    /// Open a new bond maturing `lock_period` seconds from now
    pub(crate) fn deposit_with_custom_lock(
        &mut self,
        receiver: &Pubkey,
        assets: u64,
        lock_period: i64,
        now: i64,
    ) -> Result<u64> {
        self.validate_deposit(assets)?;

        let max_period = self.state.settings.max_lock_period;
        if lock_period <= 0 || lock_period > max_period {
            msg!("lock period {} outside (0, {}]", lock_period, max_period);
            return Err(error!(VaultError::InvalidLockPeriod).with_values((lock_period, max_period)));
        }

        let lock = self.holder(receiver).lock;
        if lock.state(now) != LockState::Unlocked {
            msg!("existing lock until {} must be extended with deposit_locked", lock.lock_until);
            return err!(VaultError::LockAlreadyActive);
        }

        let lock_until = now
            .checked_add(lock_period)
            .ok_or(VaultError::MathOverflow)?;
        let shares = self.deposit_assets(receiver, assets, now)?;

        let record = &mut self.holder_mut(receiver).lock;
        record.lock_until = lock_until;
        record.locked_shares = shares;
        Ok(shares)
    }

    /// Add to an existing bond at its original maturity
    pub(crate) fn deposit_locked(&mut self, receiver: &Pubkey, assets: u64, now: i64) -> Result<u64> {
        self.validate_deposit(assets)?;

        let lock = self.holder(receiver).lock;
        if lock.state(now) == LockState::Unlocked {
            return err!(VaultError::NoActiveLock);
        }

        let shares = self.deposit_assets(receiver, assets, now)?;
        let record = &mut self.holder_mut(receiver).lock;
        record.locked_shares = record
            .locked_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::engine::{ManualClock, VaultEngine};
    use crate::state::{PoolRegistry, Settings, VaultState};

    type Pool = crate::engine::MarketPool;

    fn engine(clock: &ManualClock) -> VaultEngine<Pool, ManualClock> {
        let vault = Pubkey::new_unique();
        let state = VaultState::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            6,
            Settings::new(Pubkey::new_unique()),
        );
        let book = VaultBook::new(vault, state, PoolRegistry::new(vault), Vec::new()).unwrap();
        VaultEngine::new(book, clock.clone())
    }

    #[test]
    fn test_lock_period_bounds() {
        let clock = ManualClock::new(0);
        let mut vault = engine(&clock);
        let user = Pubkey::new_unique();

        for period in [0, -5, DEFAULT_MAX_LOCK_PERIOD + 1] {
            let err = vault
                .deposit_with_custom_lock(100, user, period)
                .unwrap_err();
            assert!(VaultError::InvalidLockPeriod.matches(&err));
        }
        assert_eq!(vault.total_supply(), 0);
    }

    #[test]
    fn test_second_custom_lock_rejected_while_active() {
        let clock = ManualClock::new(0);
        let mut vault = engine(&clock);
        let user = Pubkey::new_unique();

        vault.deposit_with_custom_lock(100, user, LOCK_ONE_MONTH).unwrap();
        let err = vault
            .deposit_with_custom_lock(100, user, LOCK_ONE_YEAR)
            .unwrap_err();
        assert!(VaultError::LockAlreadyActive.matches(&err));

        // Still rejected once expired while funds remain
        clock.set(LOCK_ONE_MONTH + 1);
        let err = vault
            .deposit_with_custom_lock(100, user, LOCK_ONE_YEAR)
            .unwrap_err();
        assert!(VaultError::LockAlreadyActive.matches(&err));
    }

    #[test]
    fn test_deposit_locked_absorbs_into_existing_lock() {
        let clock = ManualClock::new(1_000);
        let mut vault = engine(&clock);
        let user = Pubkey::new_unique();

        let err = vault.deposit_locked(100, user).unwrap_err();
        assert!(VaultError::NoActiveLock.matches(&err));

        vault
            .deposit_with_preset_lock(100, user, crate::state::LockTerm::ThreeMonths)
            .unwrap();
        let first = vault.get_lock_info(&user);
        assert_eq!(first.lock_until, 1_000 + LOCK_THREE_MONTHS);
        assert_eq!(first.state, LockState::Locked);

        clock.advance(86_400);
        vault.deposit_locked(50, user).unwrap();
        let second = vault.get_lock_info(&user);
        assert_eq!(second.lock_until, first.lock_until);
        assert_eq!(second.locked_shares, 150);
    }

    #[test]
    fn test_full_withdrawal_returns_to_unlocked() {
        let clock = ManualClock::new(0);
        let mut vault = engine(&clock);
        let user = Pubkey::new_unique();

        vault.deposit_with_custom_lock(100, user, 10).unwrap();
        clock.set(10);
        assert_eq!(vault.get_lock_info(&user).state, LockState::Expired);

        vault.withdraw(40, user).unwrap();
        assert_eq!(vault.get_lock_info(&user).lock_until, 10);

        vault.withdraw(60, user).unwrap();
        let info = vault.get_lock_info(&user);
        assert_eq!(info.state, LockState::Unlocked);
        assert_eq!(info.locked_shares, 0);

        // A fresh bond can be opened again
        vault.deposit_with_custom_lock(100, user, 10).unwrap();
        assert_eq!(vault.get_lock_info(&user).lock_until, 20);
    }
}
