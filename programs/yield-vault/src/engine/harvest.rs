use anchor_lang::prelude::*;
use solana_sha256_hasher::hashv;

use crate::errors::VaultError;
use crate::math::{bps_mul, Rounding};

use super::{LendingPool, RewardsSource, Swapper, VaultBook};

/// One leaf of a rewards merkle tree: the cumulative amount owed to `claimant`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RewardClaim {
    pub claimant: Pubkey,
    pub reward_mint: Pubkey,
    pub amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct SwapInfo {
    pub reward_mint: Pubkey,
    pub reward_decimals: u8,
    /// Least base asset the swap must return
    pub min_amount_out: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub pool_yield: u64,
    pub rewards_claimed: u64,
    pub swapped_amount: u64,
    pub fee_shares: u64,
}

pub fn leaf_hash(claim: &RewardClaim) -> [u8; 32] {
    hashv(&[
        claim.claimant.as_ref(),
        claim.reward_mint.as_ref(),
        &claim.amount.to_le_bytes()[..],
    ])
    .to_bytes()
}

/// Order-independent parent hash
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    hashv(&[&low[..], &high[..]]).to_bytes()
}

pub fn verify_proof(root: &[u8; 32], leaf: [u8; 32], proof: &[[u8; 32]]) -> bool {
    let computed = proof
        .iter()
        .fold(leaf, |node, sibling| hash_pair(&node, sibling));
    computed == *root
}

fn next_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    level
        .chunks(2)
        .map(|pair| match pair.get(1) {
            Some(right) => hash_pair(&pair[0], right),
            None => pair[0],
        })
        .collect()
}

/// Root of a tree over `leaves`; an odd node is promoted unchanged
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level.first().copied().unwrap_or([0; 32])
}

/// Sibling path for `leaves[index]` matching `merkle_root`
pub fn merkle_proof(leaves: &[[u8; 32]], mut index: usize) -> Vec<[u8; 32]> {
    let mut proof = Vec::new();
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        let sibling = index ^ 1;
        if sibling < level.len() {
            proof.push(level[sibling]);
        }
        level = next_level(&level);
        index /= 2;
    }
    proof
}

impl<P: LendingPool> VaultBook<P> {
    /// `(yield, total_amount)`: per-pool gains over principal, losses count as
    /// zero, and the current value of all allocations
    pub fn compute_yield(&self, now: i64) -> Result<(u64, u64)> {
        let mut gain = 0u64;
        let mut total = 0u64;
        for (index, pool) in self.registry.pools.iter().enumerate() {
            let current = self.pool_assets(index, now)?;
            gain = gain
                .checked_add(current.saturating_sub(pool.principal))
                .ok_or(VaultError::MathOverflow)?;
            total = total
                .checked_add(current)
                .ok_or(VaultError::MathOverflow)?;
        }
        Ok((gain, total))
    }

    /// Claim vested rewards, swap them into the base asset and realize pool
    /// yield. The proof is checked before anything else.
    pub(crate) fn harvest<R: RewardsSource, S: Swapper>(
        &mut self,
        rewards: &mut R,
        claim: &RewardClaim,
        proof: &[[u8; 32]],
        swap_info: &SwapInfo,
        swapper: &S,
        now: i64,
    ) -> Result<HarvestReport> {
        if !verify_proof(&rewards.merkle_root(), leaf_hash(claim), proof) {
            msg!("claim of {} for {} not in rewards root", claim.amount, claim.claimant);
            return err!(VaultError::InvalidProof);
        }
        require_keys_eq!(claim.reward_mint, swap_info.reward_mint, VaultError::InvalidMint);

        let vested = claim.amount.saturating_sub(rewards.claimed(&claim.claimant));
        let (pool_yield, _) = self.compute_yield(now)?;

        let swapped = if vested == 0 {
            0
        } else if claim.reward_mint == self.state.asset_mint {
            vested
        } else {
            swapper.swap(swap_info, vested)?
        };
        if vested > 0 && swapped < swap_info.min_amount_out {
            msg!(
                "swap returned {}, minimum {}",
                swapped,
                swap_info.min_amount_out
            );
            return Err(error!(VaultError::SlippageExceeded)
                .with_values((swapped, swap_info.min_amount_out)));
        }

        self.state.idle_assets = self
            .state
            .idle_assets
            .checked_add(swapped)
            .ok_or(VaultError::MathOverflow)?;
        self.refresh(now)?;

        let gain = pool_yield
            .checked_add(swapped)
            .ok_or(VaultError::MathOverflow)?;
        let fee_assets = bps_mul(gain, self.state.settings.performance_fee_bps, Rounding::Down)?;
        let fee_shares = self.state.calculate_fee_shares(fee_assets)?;
        if fee_shares > 0 {
            self.state.total_shares = self
                .state
                .total_shares
                .checked_add(fee_shares)
                .ok_or(VaultError::MathOverflow)?;
            let receiver = self.state.settings.fee_receiver;
            let holder = self.holder_mut(&receiver);
            holder.shares = holder
                .shares
                .checked_add(fee_shares)
                .ok_or(VaultError::MathOverflow)?;
        }

        for index in 0..self.pools.len() {
            let current = self.pool_assets(index, now)?;
            self.registry.get_pool_mut(index)?.principal = current;
        }
        self.state.last_harvest = now;

        if vested > 0 {
            rewards.claim(claim)?;
        }

        Ok(HarvestReport {
            pool_yield,
            rewards_claimed: vested,
            swapped_amount: swapped,
            fee_shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(amount: u64) -> RewardClaim {
        RewardClaim {
            claimant: Pubkey::new_unique(),
            reward_mint: Pubkey::new_unique(),
            amount,
        }
    }

    #[test]
    fn test_proof_for_every_leaf() {
        let leaves: Vec<[u8; 32]> = (1..=5).map(|i| leaf_hash(&claim(i * 100))).collect();
        let root = merkle_root(&leaves);
        for index in 0..leaves.len() {
            let proof = merkle_proof(&leaves, index);
            assert!(verify_proof(&root, leaves[index], &proof));
        }
    }

    #[test]
    fn test_tampered_claim_fails() {
        let mut claims: Vec<RewardClaim> = (1..=4).map(|i| claim(i * 100)).collect();
        let leaves: Vec<[u8; 32]> = claims.iter().map(leaf_hash).collect();
        let root = merkle_root(&leaves);
        let proof = merkle_proof(&leaves, 2);

        claims[2].amount += 1;
        assert!(!verify_proof(&root, leaf_hash(&claims[2]), &proof));
    }

    #[test]
    fn test_single_leaf_tree() {
        let leaf = leaf_hash(&claim(5));
        assert_eq!(merkle_root(&[leaf]), leaf);
        assert!(verify_proof(&leaf, leaf, &[]));
    }
}
