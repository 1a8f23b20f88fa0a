use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

/// Publish a new merkle root of cumulative reward amounts
///
/// The first call creates the distributor and its reward account; the reward
/// mint is fixed from then on.
#[derive(Accounts)]
pub struct PublishRewardsRoot<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        init_if_needed,
        payer = authority,
        space = RewardsDistributor::LEN,
        seeds = [REWARDS_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub rewards_distributor: Account<'info, RewardsDistributor>,

    pub reward_mint: Account<'info, Mint>,

    /// CHECK: PDA that owns the reward account, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = authority,
        associated_token::mint = reward_mint,
        associated_token::authority = vault_authority,
    )]
    pub reward_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<PublishRewardsRoot>, merkle_root: [u8; 32]) -> Result<()> {
    let vault = ctx.accounts.vault_state.key();
    let reward_mint = ctx.accounts.reward_mint.key();
    let distributor = &mut ctx.accounts.rewards_distributor;

    if distributor.vault == Pubkey::default() {
        distributor.vault = vault;
        distributor.reward_mint = reward_mint;
        distributor.reward_account = ctx.accounts.reward_account.key();
        distributor.bump = ctx.bumps.rewards_distributor;
    }
    require_keys_eq!(distributor.reward_mint, reward_mint, VaultError::InvalidMint);

    distributor.authority = ctx.accounts.authority.key();
    distributor.merkle_root = merkle_root;

    emit!(RewardsRootPublished {
        vault,
        distributor: distributor.key(),
        merkle_root,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
