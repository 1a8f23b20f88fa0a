use anchor_lang::prelude::*;

/// Merkle-root rewards distributor for one vault.
///
/// Each published root commits to cumulative reward amounts per claimant;
/// `total_claimed` is what the vault has already pulled.
#[account]
#[derive(Debug, Default, PartialEq)]
pub struct RewardsDistributor {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub reward_mint: Pubkey,
    /// Token account holding undistributed rewards, owned by the vault authority PDA
    pub reward_account: Pubkey,
    pub merkle_root: [u8; 32],
    pub total_claimed: u64,
    pub bump: u8,
}

impl RewardsDistributor {
    pub const LEN: usize = 8 + 32 + 32 + 32 + 32 + 32 + 8 + 1 + 32;
}
