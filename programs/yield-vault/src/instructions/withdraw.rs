use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::engine::{Holder, SysvarClock, TimeSource, VaultEngine};
use crate::{constants::*, errors::*, events::*, state::*};

use super::pool_accounts::{load_book, store_book};

/// Burn shares and pay the underlying assets out of custody
///
/// Pools named in `remaining_accounts` are drained in registry order when the
/// idle balance cannot cover the withdrawal. Shares are burned from the
/// owner's bond escrow first, then from the owner's share account.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// Share owner
    #[account(mut)]
    pub owner: Signer<'info>,

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

    /// CHECK: PDA used as custody authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Owner's bond record; an empty record means no lock
    #[account(
        init_if_needed,
        payer = owner,
        space = LockRecord::LEN,
        seeds = [LOCK_RECORD_SEED, vault_state.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub lock_record: Account<'info, LockRecord>,

    /// Escrow for the owner's bonded shares
    #[account(
        init_if_needed,
        payer = owner,
        seeds = [LOCKED_SHARES_SEED, vault_state.key().as_ref(), owner.key().as_ref()],
        bump,
        token::mint = share_mint,
        token::authority = vault_authority,
    )]
    pub locked_share_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = owner_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = owner_share_account.owner == owner.key() @ VaultError::InvalidOwner,
    )]
    pub owner_share_account: Account<'info, TokenAccount>,

    /// Any asset account; receives the payout
    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Whether the caller names the asset amount or the share amount
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawAmount {
    Assets(u64),
    Shares(u64),
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    amount: WithdrawAmount,
) -> Result<()> {
    let clock = SysvarClock::get()?;
    let now = clock.now();
    let owner = ctx.accounts.owner.key();

    let (book, mut pools) = load_book(
        &ctx.accounts.vault_state,
        &ctx.accounts.pool_registry,
        ctx.remaining_accounts,
    )?;

    let mut lock = ctx.accounts.lock_record.clone().into_inner();
    if lock.owner == Pubkey::default() {
        lock.owner = owner;
        lock.vault = ctx.accounts.vault_state.key();
        lock.bump = ctx.bumps.lock_record;
    }

    let bond = lock.clone();
    let held = ctx
        .accounts
        .owner_share_account
        .amount
        .checked_add(ctx.accounts.locked_share_account.amount)
        .ok_or(VaultError::MathOverflow)?;
    let mut engine = VaultEngine::new(book, clock);
    engine.insert_holder(owner, Holder { shares: held, lock });

    // EFFECTS: Bond gate, share balance and liquidity are checked before any change
    let (assets, shares) = match amount {
        WithdrawAmount::Assets(assets) => (assets, engine.withdraw(assets, owner)?),
        WithdrawAmount::Shares(shares) => (engine.redeem(shares, owner)?, shares),
    };

    let mut holders = store_book(
        engine.into_book(),
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.pool_registry,
        &mut pools,
    )?;
    let holder = holders.remove(&owner).ok_or(VaultError::InvalidOwner)?;
    ctx.accounts.lock_record.set_inner(holder.lock);

    let vault_state = &ctx.accounts.vault_state;
    let asset_mint_key = vault_state.asset_mint;
    let authority_bump = vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    // INTERACTIONS: Burn shares, then release assets from custody
    let (bonded, free) = bond.split_burn(shares);
    if bonded > 0 {
        let burn_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.share_mint.to_account_info(),
                from: ctx.accounts.locked_share_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::burn(burn_ctx, bonded)?;
    }
    if free > 0 {
        let burn_ctx = CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.share_mint.to_account_info(),
                from: ctx.accounts.owner_share_account.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        );
        token::burn(burn_ctx, free)?;
    }

    let transfer_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.vault_token_account.to_account_info(),
            to: ctx.accounts.receiver_asset_account.to_account_info(),
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, assets)?;

    emit!(Withdrawn {
        vault: vault_state.key(),
        owner,
        receiver: ctx.accounts.receiver_asset_account.key(),
        asset_amount: assets,
        shares_burned: shares,
        total_assets: vault_state.total_assets,
        total_shares: vault_state.total_shares,
        timestamp: now,
    });

    Ok(())
}
