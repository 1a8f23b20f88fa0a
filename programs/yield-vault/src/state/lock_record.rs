use anchor_lang::prelude::*;

use crate::constants::*;

/// Per-depositor bond record for lock-to-earn deposits
#[account]
#[derive(Debug, Default, PartialEq)]
pub struct LockRecord {
    pub owner: Pubkey,
    pub vault: Pubkey,

    /// Unix timestamp the bond matures at, 0 when there is no lock
    pub lock_until: i64,

    /// Shares minted by locked deposits and not yet withdrawn
    pub locked_shares: u64,

    pub bump: u8,
}

/// Where a depositor sits in the bond lifecycle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockState {
    /// No record or `lock_until == 0`
    Unlocked,
    /// `lock_until > now`
    Locked,
    /// `lock_until <= now` with locked shares still present
    Expired,
}

/// Preset bond terms offered alongside custom lock periods
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockTerm {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl LockTerm {
    pub fn seconds(self) -> i64 {
        match self {
            LockTerm::OneMonth => LOCK_ONE_MONTH,
            LockTerm::ThreeMonths => LOCK_THREE_MONTHS,
            LockTerm::SixMonths => LOCK_SIX_MONTHS,
            LockTerm::OneYear => LOCK_ONE_YEAR,
        }
    }
}

impl LockRecord {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 8 + 1 + 32;

    pub fn state(&self, now: i64) -> LockState {
        if self.lock_until == 0 {
            LockState::Unlocked
        } else if self.lock_until > now {
            LockState::Locked
        } else {
            LockState::Expired
        }
    }

    pub fn can_withdraw(&self, now: i64) -> bool {
        self.lock_until == 0 || now >= self.lock_until
    }

    pub fn is_bond(&self) -> bool {
        self.lock_until != 0
    }

    /// `(bonded, free)` parts of a burn of `shares`, bonded shares first.
    /// Matches what `release` takes off the bond.
    pub fn split_burn(&self, shares: u64) -> (u64, u64) {
        let bonded = shares.min(self.locked_shares);
        (bonded, shares - bonded)
    }

    /// Release `shares` from the bond; clears the lock once nothing is left
    pub fn release(&mut self, shares: u64) {
        self.locked_shares = self.locked_shares.saturating_sub(shares);
        if self.locked_shares == 0 {
            self.lock_until = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_states() {
        let mut record = LockRecord::default();
        assert_eq!(record.state(100), LockState::Unlocked);
        assert!(record.can_withdraw(100));

        record.lock_until = 1_000;
        record.locked_shares = 50;
        assert_eq!(record.state(999), LockState::Locked);
        assert!(!record.can_withdraw(999));
        assert_eq!(record.state(1_000), LockState::Expired);
        assert!(record.can_withdraw(1_000));
    }

    #[test]
    fn test_release_clears_only_when_empty() {
        let mut record = LockRecord {
            lock_until: 1_000,
            locked_shares: 50,
            ..Default::default()
        };
        record.release(20);
        assert_eq!(record.locked_shares, 30);
        assert_eq!(record.lock_until, 1_000);

        record.release(30);
        assert_eq!(record.locked_shares, 0);
        assert_eq!(record.lock_until, 0);
    }

    #[test]
    fn test_split_burn_takes_bonded_shares_first() {
        let mut record = LockRecord {
            lock_until: 1_000,
            locked_shares: 50,
            ..Default::default()
        };
        assert_eq!(record.split_burn(30), (30, 0));
        assert_eq!(record.split_burn(80), (50, 30));

        record.release(80);
        assert_eq!(record.locked_shares, 0);
        assert_eq!(record.split_burn(10), (0, 10));
    }

    #[test]
    fn test_preset_terms() {
        assert_eq!(LockTerm::OneMonth.seconds(), 2_592_000);
        assert_eq!(LockTerm::OneYear.seconds(), 31_536_000);
    }
}
