use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::math::{convert_at_prices, decimal_scale, PriceQuote};
use crate::state::{PriceFeed, RewardsDistributor};

use super::harvest::{RewardClaim, SwapInfo};

/// Source of the current unix timestamp
pub trait TimeSource {
    fn now(&self) -> i64;
}

/// Timestamp read once from the Clock sysvar for the whole instruction
#[derive(Clone, Copy, Debug)]
pub struct SysvarClock {
    unix_timestamp: i64,
}

impl SysvarClock {
    pub fn get() -> Result<Self> {
        Ok(Self {
            unix_timestamp: Clock::get()?.unix_timestamp,
        })
    }
}

impl TimeSource for SysvarClock {
    fn now(&self) -> i64 {
        self.unix_timestamp
    }
}

/// Shared, manually advanced clock for simulations and tests
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<Cell<i64>>);

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn set(&self, timestamp: i64) {
        self.0.set(timestamp);
    }

    pub fn advance(&self, seconds: i64) {
        self.0.set(self.0.get().saturating_add(seconds));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> i64 {
        self.0.get()
    }
}

/// Contract every allowed pool must honour.
///
/// Amounts are in base-asset units, shares are the pool's receipt units held
/// by the vault. Any error returned here surfaces as `PoolUnavailable`.
pub trait LendingPool {
    /// Supply `assets` and return the receipt shares minted to the vault
    fn deposit(&mut self, assets: u64, now: i64) -> Result<u128>;

    /// Redeem `shares` and return the assets released to the vault
    fn withdraw(&mut self, shares: u128, now: i64) -> Result<u64>;

    /// Receipt shares held by the vault
    fn balance_of(&self) -> u128;

    /// Assets `shares` would redeem for at `now`, rounded down
    fn preview_redeem(&self, shares: u128, now: i64) -> Result<u64>;

    /// Shares needed to pull `assets` out at `now`, rounded up
    fn preview_withdraw(&self, assets: u64, now: i64) -> Result<u128>;

    /// Assets the vault could pull out right now
    fn max_withdraw(&self, now: i64) -> Result<u64>;
}

pub trait PriceOracle {
    fn get_price(&self, asset: &Pubkey) -> PriceQuote;
}

/// Fixed price table; unknown assets quote as invalid
impl PriceOracle for BTreeMap<Pubkey, PriceQuote> {
    fn get_price(&self, asset: &Pubkey) -> PriceQuote {
        self.get(asset).copied().unwrap_or_default()
    }
}

/// Oracle backed by on-chain `PriceFeed` records, normalized once at load
#[derive(Clone, Debug, Default)]
pub struct FeedOracle {
    quotes: BTreeMap<Pubkey, PriceQuote>,
}

impl FeedOracle {
    pub fn from_feeds<'a>(
        feeds: impl IntoIterator<Item = &'a PriceFeed>,
        now: i64,
        max_age: i64,
    ) -> Self {
        let quotes = feeds
            .into_iter()
            .map(|feed| (feed.mint, feed.quote(now, max_age)))
            .collect();
        Self { quotes }
    }
}

impl PriceOracle for FeedOracle {
    fn get_price(&self, asset: &Pubkey) -> PriceQuote {
        self.quotes.get_price(asset)
    }
}

/// Merkle-committed reward balances the harvester claims from
pub trait RewardsSource {
    fn merkle_root(&self) -> [u8; 32];

    /// Cumulative amount already claimed by `claimant`
    fn claimed(&self, claimant: &Pubkey) -> u64;

    /// Record `claim` as fully claimed and return the newly vested amount
    fn claim(&mut self, claim: &RewardClaim) -> Result<u64>;
}

/// In-memory rewards source keyed by claimant
#[derive(Clone, Debug, Default)]
pub struct MerkleRewards {
    pub root: [u8; 32],
    pub claimed: BTreeMap<Pubkey, u64>,
}

impl MerkleRewards {
    pub fn new(root: [u8; 32]) -> Self {
        Self {
            root,
            claimed: BTreeMap::new(),
        }
    }
}

impl RewardsSource for MerkleRewards {
    fn merkle_root(&self) -> [u8; 32] {
        self.root
    }

    fn claimed(&self, claimant: &Pubkey) -> u64 {
        self.claimed.get(claimant).copied().unwrap_or(0)
    }

    fn claim(&mut self, claim: &RewardClaim) -> Result<u64> {
        let already = self.claimed(&claim.claimant);
        let vested = claim.amount.saturating_sub(already);
        self.claimed
            .insert(claim.claimant, claim.amount.max(already));
        Ok(vested)
    }
}

/// The vault is the only claimant of its distributor
impl RewardsSource for RewardsDistributor {
    fn merkle_root(&self) -> [u8; 32] {
        self.merkle_root
    }

    fn claimed(&self, claimant: &Pubkey) -> u64 {
        if *claimant == self.vault {
            self.total_claimed
        } else {
            0
        }
    }

    fn claim(&mut self, claim: &RewardClaim) -> Result<u64> {
        require_keys_eq!(claim.claimant, self.vault, VaultError::InvalidProof);
        require_keys_eq!(claim.reward_mint, self.reward_mint, VaultError::InvalidMint);
        let vested = claim.amount.saturating_sub(self.total_claimed);
        self.total_claimed = self.total_claimed.max(claim.amount);
        Ok(vested)
    }
}

/// Converts claimed rewards into the base asset
pub trait Swapper {
    fn swap(&self, info: &SwapInfo, amount_in: u64) -> Result<u64>;
}

/// Settles swaps at oracle prices
pub struct OracleSwapper<'a, O: PriceOracle> {
    pub oracle: &'a O,
    pub asset_mint: Pubkey,
    pub asset_decimals: u8,
}

impl<O: PriceOracle> Swapper for OracleSwapper<'_, O> {
    fn swap(&self, info: &SwapInfo, amount_in: u64) -> Result<u64> {
        let price_in = self.oracle.get_price(&info.reward_mint);
        let price_out = self.oracle.get_price(&self.asset_mint);
        if !price_in.is_valid || !price_out.is_valid {
            msg!(
                "swap quote rejected: reward price valid={}, asset price valid={}",
                price_in.is_valid,
                price_out.is_valid
            );
            return err!(VaultError::StalePriceData);
        }
        convert_at_prices(
            amount_in,
            price_in.value,
            decimal_scale(info.reward_decimals)?,
            price_out.value,
            decimal_scale(self.asset_decimals)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SCALE;

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();
        handle.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(handle.now(), 10);
    }

    #[test]
    fn test_merkle_rewards_vesting() {
        let claimant = Pubkey::new_unique();
        let mut rewards = MerkleRewards::new([7; 32]);
        let mut claim = RewardClaim {
            claimant,
            reward_mint: Pubkey::new_unique(),
            amount: 100,
        };
        assert_eq!(rewards.claim(&claim).unwrap(), 100);
        assert_eq!(rewards.claim(&claim).unwrap(), 0);
        claim.amount = 150;
        assert_eq!(rewards.claim(&claim).unwrap(), 50);
        assert_eq!(rewards.claimed(&claimant), 150);
    }

    #[test]
    fn test_oracle_swapper_requires_valid_prices() {
        let reward = Pubkey::new_unique();
        let asset = Pubkey::new_unique();
        let mut prices = BTreeMap::new();
        prices.insert(reward, PriceQuote::valid(2 * SCALE));

        let info = SwapInfo {
            reward_mint: reward,
            reward_decimals: 6,
            min_amount_out: 0,
        };
        let swapper = OracleSwapper {
            oracle: &prices,
            asset_mint: asset,
            asset_decimals: 6,
        };
        let err = swapper.swap(&info, 10).unwrap_err();
        assert!(VaultError::StalePriceData.matches(&err));

        prices.insert(asset, PriceQuote::valid(SCALE));
        let swapper = OracleSwapper {
            oracle: &prices,
            asset_mint: asset,
            asset_decimals: 6,
        };
        assert_eq!(swapper.swap(&info, 10).unwrap(), 20);
    }
}
