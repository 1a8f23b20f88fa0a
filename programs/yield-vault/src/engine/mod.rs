//! Accounting core of the vault.
//!
//! Every mutating operation runs against a cloned `VaultBook` and is committed
//! only when it returns `Ok`, so a failing pool call or a violated bound leaves
//! the vault, the registry, every pool and every lock record untouched. The
//! on-chain instructions load a book from accounts, drive the same engine and
//! write the committed book back.

pub mod bond;
pub mod collaborators;
pub mod emergency;
pub mod harvest;
pub mod ledger;
pub mod market;
pub mod rebalance;

pub use bond::*;
pub use collaborators::*;
pub use harvest::*;
pub use market::*;
pub use rebalance::*;

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::math::Rounding;
use crate::state::{LockRecord, PoolProps, PoolRegistry, Settings, VaultState};

/// Share balance and bond record of one depositor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Holder {
    pub shares: u64,
    pub lock: LockRecord,
}

/// Everything a single vault operation reads or writes
#[derive(Clone, Debug)]
pub struct VaultBook<P> {
    pub vault: Pubkey,
    pub state: VaultState,
    pub registry: PoolRegistry,
    /// One pool per registry entry, same order
    pub pools: Vec<P>,
    pub holders: BTreeMap<Pubkey, Holder>,
}

/// Map any pool failure to `PoolUnavailable`, keeping the original in the log
pub(crate) fn pool_call<R>(index: usize, result: Result<R>) -> Result<R> {
    result.map_err(|e| {
        msg!("pool {} rejected the call: {}", index, e);
        error!(VaultError::PoolUnavailable)
    })
}

impl<P: LendingPool> VaultBook<P> {
    pub fn new(
        vault: Pubkey,
        state: VaultState,
        registry: PoolRegistry,
        pools: Vec<P>,
    ) -> Result<Self> {
        if pools.len() != registry.len() {
            msg!(
                "registry lists {} pools, {} supplied",
                registry.len(),
                pools.len()
            );
            return err!(VaultError::PoolAccountMismatch);
        }
        Ok(Self {
            vault,
            state,
            registry,
            pools,
            holders: BTreeMap::new(),
        })
    }

    pub fn holder(&self, owner: &Pubkey) -> Holder {
        self.holders.get(owner).cloned().unwrap_or_default()
    }

    pub(crate) fn holder_mut(&mut self, owner: &Pubkey) -> &mut Holder {
        let vault = self.vault;
        self.holders.entry(*owner).or_insert_with(|| Holder {
            shares: 0,
            lock: LockRecord {
                owner: *owner,
                vault,
                ..Default::default()
            },
        })
    }

    pub(crate) fn pool_mut(&mut self, index: usize) -> Result<&mut P> {
        self.pools
            .get_mut(index)
            .ok_or(error!(VaultError::PoolNotFound))
    }

    /// Current asset value of the vault's receipt shares in pool `index`
    pub fn pool_assets(&self, index: usize, now: i64) -> Result<u64> {
        let pool = self
            .pools
            .get(index)
            .ok_or(error!(VaultError::PoolNotFound))?;
        pool_call(index, pool.preview_redeem(pool.balance_of(), now))
    }

    /// Idle assets plus every pool allocation at `now`
    pub fn live_total_assets(&self, now: i64) -> Result<u64> {
        let mut total = self.state.idle_assets;
        for index in 0..self.pools.len() {
            total = total
                .checked_add(self.pool_assets(index, now)?)
                .ok_or(VaultError::MathOverflow)?;
        }
        Ok(total)
    }

    /// Assets that could be handed out right now
    pub fn available_liquidity(&self, now: i64) -> Result<u64> {
        let mut total = self.state.idle_assets;
        for (index, pool) in self.pools.iter().enumerate() {
            total = total
                .checked_add(pool_call(index, pool.max_withdraw(now))?)
                .ok_or(VaultError::MathOverflow)?;
        }
        Ok(total)
    }

    /// Write the live total into the state snapshot
    pub fn refresh(&mut self, now: i64) -> Result<()> {
        self.state.total_assets = self.live_total_assets(now)?;
        Ok(())
    }

    /// State copy carrying the live total, for conversions outside a transaction
    pub fn refreshed_state(&self, now: i64) -> Result<VaultState> {
        let mut state = self.state.clone();
        state.total_assets = self.live_total_assets(now)?;
        Ok(state)
    }
}

/// Serialized vault state machine over pools `P` and clock `T`
pub struct VaultEngine<P, T> {
    book: VaultBook<P>,
    clock: T,
}

impl<P: LendingPool + Clone, T: TimeSource> VaultEngine<P, T> {
    pub fn new(book: VaultBook<P>, clock: T) -> Self {
        Self { book, clock }
    }

    pub fn book(&self) -> &VaultBook<P> {
        &self.book
    }

    pub fn into_book(self) -> VaultBook<P> {
        self.book
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Seed a depositor's share balance and bond record
    pub fn insert_holder(&mut self, owner: Pubkey, holder: Holder) {
        self.book.holders.insert(owner, holder);
    }

    /// Run `op` on a draft and commit it only on success
    fn transact<R>(&mut self, op: impl FnOnce(&mut VaultBook<P>, i64) -> Result<R>) -> Result<R> {
        let now = self.clock.now();
        let mut draft = self.book.clone();
        let out = op(&mut draft, now)?;
        draft.refresh(now)?;
        self.book = draft;
        Ok(out)
    }

    // Share ledger

    pub fn deposit(&mut self, assets: u64, receiver: Pubkey) -> Result<u64> {
        self.transact(|book, now| book.deposit_assets(&receiver, assets, now))
    }

    /// Burn the shares worth `assets` from `owner`; returns shares burned
    pub fn withdraw(&mut self, assets: u64, owner: Pubkey) -> Result<u64> {
        self.transact(|book, now| book.withdraw_assets(&owner, assets, now))
    }

    /// Burn exactly `shares` from `owner`; returns assets released
    pub fn redeem(&mut self, shares: u64, owner: Pubkey) -> Result<u64> {
        self.transact(|book, now| book.redeem_shares(&owner, shares, now))
    }

    // Lock-to-earn

    pub fn deposit_with_custom_lock(
        &mut self,
        assets: u64,
        receiver: Pubkey,
        lock_period: i64,
    ) -> Result<u64> {
        self.transact(|book, now| book.deposit_with_custom_lock(&receiver, assets, lock_period, now))
    }

    pub fn deposit_with_preset_lock(
        &mut self,
        assets: u64,
        receiver: Pubkey,
        term: crate::state::LockTerm,
    ) -> Result<u64> {
        self.transact(|book, now| {
            book.deposit_with_custom_lock(&receiver, assets, term.seconds(), now)
        })
    }

    pub fn deposit_locked(&mut self, assets: u64, receiver: Pubkey) -> Result<u64> {
        self.transact(|book, now| book.deposit_locked(&receiver, assets, now))
    }

    // Pools

    pub fn add_pool(
        &mut self,
        pool: P,
        pool_id: Pubkey,
        receipt: Pubkey,
        max_weight_bps: u16,
        name: String,
    ) -> Result<usize> {
        self.transact(|book, _| {
            let index = book.registry.add_pool(pool_id, receipt, max_weight_bps, name)?;
            book.pools.push(pool);
            Ok(index)
        })
    }

    pub fn toggle_pool(&mut self, index: usize, enabled: bool) -> Result<()> {
        self.transact(|book, _| {
            book.registry.get_pool_mut(index)?.enabled = enabled;
            Ok(())
        })
    }

    pub fn set_pool_weight(&mut self, index: usize, max_weight_bps: u16) -> Result<u16> {
        self.transact(|book, _| book.registry.set_max_weight(index, max_weight_bps))
    }

    pub fn rebalance(&mut self, actions: &[RebalanceAction]) -> Result<()> {
        self.transact(|book, now| book.rebalance(actions, now))
    }

    pub fn rebalance_weights(&mut self, weights: &[u16]) -> Result<Vec<RebalanceAction>> {
        self.transact(|book, now| book.rebalance_weights(weights, now))
    }

    pub fn harvest<R: RewardsSource, S: Swapper>(
        &mut self,
        rewards: &mut R,
        claim: &RewardClaim,
        proof: &[[u8; 32]],
        swap_info: &SwapInfo,
        swapper: &S,
    ) -> Result<HarvestReport> {
        self.transact(|book, now| book.harvest(rewards, claim, proof, swap_info, swapper, now))
    }

    pub fn emergency_withdraw(&mut self) -> Result<u64> {
        self.transact(|book, now| book.emergency_withdraw(now))
    }

    pub fn emergency_withdraw_pool(&mut self, index: usize) -> Result<u64> {
        self.transact(|book, now| book.emergency_withdraw_pool(index, now))
    }

    // Read-only accessors, always on a fresh snapshot

    pub fn total_assets(&self) -> Result<u64> {
        self.book.live_total_assets(self.now())
    }

    pub fn total_supply(&self) -> u64 {
        self.book.state.total_shares
    }

    pub fn idle_assets(&self) -> u64 {
        self.book.state.idle_assets
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.book.holder(owner).shares
    }

    pub fn convert_to_shares(&self, assets: u64) -> Result<u64> {
        self.book
            .refreshed_state(self.now())?
            .calculate_shares(assets, Rounding::Down)
    }

    pub fn convert_to_assets(&self, shares: u64) -> Result<u64> {
        self.book
            .refreshed_state(self.now())?
            .calculate_assets(shares, Rounding::Down)
    }

    /// Shares a withdrawal of `assets` would burn, rounded up
    pub fn preview_withdraw(&self, assets: u64) -> Result<u64> {
        self.book
            .refreshed_state(self.now())?
            .calculate_shares(assets, Rounding::Up)
    }

    pub fn get_lock_info(&self, owner: &Pubkey) -> LockInfo {
        LockInfo::of(&self.book.holder(owner).lock, self.now())
    }

    pub fn can_withdraw(&self, owner: &Pubkey) -> bool {
        self.book.holder(owner).lock.can_withdraw(self.now())
    }

    pub fn get_max_withdraw(&self, owner: &Pubkey) -> Result<u64> {
        self.book.max_withdraw(owner, self.now())
    }

    /// `(yield, total_amount)` across all pools since the last harvest
    pub fn compute_yield(&self) -> Result<(u64, u64)> {
        self.book.compute_yield(self.now())
    }

    pub fn get_allowed_pools(&self) -> &[PoolProps] {
        &self.book.registry.pools
    }

    pub fn get_settings(&self) -> &Settings {
        &self.book.state.settings
    }

    pub fn pool(&self, index: usize) -> Option<&P> {
        self.book.pools.get(index)
    }
}
