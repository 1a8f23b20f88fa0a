use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::engine::{
    FeedOracle, OracleSwapper, RewardClaim, SwapInfo, SysvarClock, TimeSource, VaultEngine,
};
use crate::{constants::*, errors::*, events::*, state::*};

use super::pool_accounts::{load_book, store_book};

/// Claim vested rewards, swap them into the asset and realize pool yield
///
/// The swap is settled against the keeper at the oracle price: the keeper
/// pays the asset proceeds into custody and receives the claimed rewards.
/// When rewards are paid in the vault asset they go straight to custody.
#[derive(Accounts)]
pub struct Harvest<'info> {
    #[account(mut)]
    pub keeper: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [POOL_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = pool_registry.bump,
    )]
    pub pool_registry: Account<'info, PoolRegistry>,

    #[account(
        mut,
        address = vault_state.share_mint,
    )]
    pub share_mint: Account<'info, Mint>,

    /// CHECK: PDA used as custody and mint authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [REWARDS_SEED, vault_state.key().as_ref()],
        bump = rewards_distributor.bump,
        has_one = reward_mint @ VaultError::InvalidMint,
        constraint = rewards_distributor.vault == vault_state.key() @ VaultError::PoolAccountMismatch,
    )]
    pub rewards_distributor: Account<'info, RewardsDistributor>,

    pub reward_mint: Account<'info, Mint>,

    /// Undistributed rewards, owned by the vault authority PDA
    #[account(
        mut,
        address = rewards_distributor.reward_account,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = keeper_reward_account.mint == reward_mint.key() @ VaultError::InvalidMint,
        constraint = keeper_reward_account.owner == keeper.key() @ VaultError::InvalidOwner,
    )]
    pub keeper_reward_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = keeper_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = keeper_asset_account.owner == keeper.key() @ VaultError::InvalidOwner,
    )]
    pub keeper_asset_account: Account<'info, TokenAccount>,

    #[account(
        seeds = [PRICE_FEED_SEED, vault_state.key().as_ref(), reward_mint.key().as_ref()],
        bump = reward_price_feed.bump,
    )]
    pub reward_price_feed: Account<'info, PriceFeed>,

    #[account(
        seeds = [PRICE_FEED_SEED, vault_state.key().as_ref(), vault_state.asset_mint.as_ref()],
        bump = asset_price_feed.bump,
    )]
    pub asset_price_feed: Account<'info, PriceFeed>,

    #[account(
        mut,
        constraint = fee_receiver_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = fee_receiver_share_account.owner == vault_state.settings.fee_receiver @ VaultError::InvalidOwner,
    )]
    pub fee_receiver_share_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>,
    claim_amount: u64,
    proof: Vec<[u8; 32]>,
    min_amount_out: u64,
) -> Result<()> {
    let clock = SysvarClock::get()?;
    let now = clock.now();
    let vault = ctx.accounts.vault_state.key();
    let asset_mint = ctx.accounts.vault_state.asset_mint;
    let reward_mint = ctx.accounts.reward_mint.key();

    let (book, mut pools) = load_book(
        &ctx.accounts.vault_state,
        &ctx.accounts.pool_registry,
        ctx.remaining_accounts,
    )?;

    let oracle = FeedOracle::from_feeds(
        [&*ctx.accounts.reward_price_feed, &*ctx.accounts.asset_price_feed],
        now,
        ctx.accounts.vault_state.settings.max_price_age,
    );
    let swapper = OracleSwapper {
        oracle: &oracle,
        asset_mint,
        asset_decimals: ctx.accounts.vault_state.asset_decimals,
    };
    let claim = RewardClaim {
        claimant: vault,
        reward_mint,
        amount: claim_amount,
    };
    let swap_info = SwapInfo {
        reward_mint,
        reward_decimals: ctx.accounts.reward_mint.decimals,
        min_amount_out,
    };

    // EFFECTS: Proof, price and slippage checks all run before the book commits
    let mut rewards = ctx.accounts.rewards_distributor.clone().into_inner();
    let mut engine = VaultEngine::new(book, clock);
    let report = engine.harvest(&mut rewards, &claim, &proof, &swap_info, &swapper)?;

    store_book(
        engine.into_book(),
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.pool_registry,
        &mut pools,
    )?;
    ctx.accounts.rewards_distributor.set_inner(rewards);

    // INTERACTIONS: Settle the reward swap, then mint the fee shares
    let authority_bump = ctx.accounts.vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    if report.rewards_claimed > 0 {
        let reward_destination = if reward_mint == asset_mint {
            ctx.accounts.vault_token_account.to_account_info()
        } else {
            let pay_ctx = CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.keeper_asset_account.to_account_info(),
                    to: ctx.accounts.vault_token_account.to_account_info(),
                    authority: ctx.accounts.keeper.to_account_info(),
                },
            );
            token::transfer(pay_ctx, report.swapped_amount)?;
            ctx.accounts.keeper_reward_account.to_account_info()
        };

        let claim_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.reward_vault.to_account_info(),
                to: reward_destination,
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::transfer(claim_ctx, report.rewards_claimed)?;
    }

    if report.fee_shares > 0 {
        let mint_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.share_mint.to_account_info(),
                to: ctx.accounts.fee_receiver_share_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::mint_to(mint_ctx, report.fee_shares)?;
    }

    emit!(Harvested {
        vault,
        pool_yield: report.pool_yield,
        rewards_claimed: report.rewards_claimed,
        swapped_amount: report.swapped_amount,
        fee_shares: report.fee_shares,
        total_assets: ctx.accounts.vault_state.total_assets,
        timestamp: now,
    });

    Ok(())
}
