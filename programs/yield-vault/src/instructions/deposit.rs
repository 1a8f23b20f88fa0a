use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::engine::{Holder, SysvarClock, TimeSource, VaultEngine};
use crate::{constants::*, errors::*, events::*, state::*};

use super::pool_accounts::{load_book, store_book};

/// Deposit assets into the vault and mint shares to `receiver`
///
/// Shared by plain, custom-lock, preset-lock and lock-extending deposits.
/// Every registry pool must be passed in `remaining_accounts` as
/// `(asset_config, receipt)` pairs so shares are priced at live total assets.
///
/// Plain deposits mint into the receiver's share account. Locked deposits
/// mint into the receiver's share escrow, owned by the vault authority, so
/// bonded shares cannot leave the holder before maturity. Only the receiver
/// can open a new bond on itself; anyone can add to an existing one.
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// User depositing assets
    #[account(mut)]
    pub user: Signer<'info>,

    /// CHECK: Any wallet; owns the minted shares and the bond record
    pub receiver: UncheckedAccount<'info>,

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

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Bond record of the receiver, created on first deposit
    #[account(
        init_if_needed,
        payer = user,
        space = LockRecord::LEN,
        seeds = [LOCK_RECORD_SEED, vault_state.key().as_ref(), receiver.key().as_ref()],
        bump
    )]
    pub lock_record: Account<'info, LockRecord>,

    /// Escrow for the receiver's bonded shares
    /// Security: Only the vault authority can move or burn them
    #[account(
        init_if_needed,
        payer = user,
        seeds = [LOCKED_SHARES_SEED, vault_state.key().as_ref(), receiver.key().as_ref()],
        bump,
        token::mint = share_mint,
        token::authority = vault_authority,
    )]
    pub locked_share_account: Box<Account<'info, TokenAccount>>,

    /// User's asset token account (source)
    #[account(
        mut,
        constraint = user_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// Receiver's share token account, destination of unlocked shares
    #[account(
        mut,
        constraint = receiver_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = receiver_share_account.owner == receiver.key() @ VaultError::InvalidOwner,
    )]
    pub receiver_share_account: Account<'info, TokenAccount>,

    /// Vault custody account
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Which bond transition a deposit requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepositKind {
    Plain,
    CustomLock(i64),
    ExtendLock,
}

impl DepositKind {
    /// Whether the minted shares join the receiver's bond
    pub fn is_bonded(self) -> bool {
        !matches!(self, DepositKind::Plain)
    }
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
    amount: u64,
    kind: DepositKind,
) -> Result<()> {
    let clock = SysvarClock::get()?;
    let now = clock.now();
    let user = ctx.accounts.user.key();
    let receiver = ctx.accounts.receiver.key();

    // CHECKS: Nobody opens a bond on someone else's shares
    if matches!(kind, DepositKind::CustomLock(_)) {
        require_keys_eq!(receiver, user, VaultError::Unauthorized);
    }

    let (book, mut pools) = load_book(
        &ctx.accounts.vault_state,
        &ctx.accounts.pool_registry,
        ctx.remaining_accounts,
    )?;

    let mut lock = ctx.accounts.lock_record.clone().into_inner();
    if lock.owner == Pubkey::default() {
        lock.owner = receiver;
        lock.vault = ctx.accounts.vault_state.key();
        lock.bump = ctx.bumps.lock_record;
    }

    let mut engine = VaultEngine::new(book, clock);
    let held = ctx
        .accounts
        .receiver_share_account
        .amount
        .checked_add(ctx.accounts.locked_share_account.amount)
        .ok_or(VaultError::MathOverflow)?;
    engine.insert_holder(receiver, Holder { shares: held, lock });

    // EFFECTS: The engine validates and books the deposit atomically
    let shares_to_mint = match kind {
        DepositKind::Plain => engine.deposit(amount, receiver)?,
        DepositKind::CustomLock(period) => {
            engine.deposit_with_custom_lock(amount, receiver, period)?
        }
        DepositKind::ExtendLock => engine.deposit_locked(amount, receiver)?,
    };

    let mut holders = store_book(
        engine.into_book(),
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.pool_registry,
        &mut pools,
    )?;
    let holder = holders.remove(&receiver).ok_or(VaultError::InvalidOwner)?;
    let lock_until = holder.lock.lock_until;
    ctx.accounts.lock_record.set_inner(holder.lock);

    // INTERACTIONS: Pull assets into custody, then mint shares
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.user_asset_account.to_account_info(),
            to: ctx.accounts.vault_token_account.to_account_info(),
            authority: ctx.accounts.user.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)?;

    let vault_state = &ctx.accounts.vault_state;
    let asset_mint_key = vault_state.asset_mint;
    let authority_bump = vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    let destination = if kind.is_bonded() {
        ctx.accounts.locked_share_account.to_account_info()
    } else {
        ctx.accounts.receiver_share_account.to_account_info()
    };
    let mint_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        MintTo {
            mint: ctx.accounts.share_mint.to_account_info(),
            to: destination,
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::mint_to(mint_ctx, shares_to_mint)?;

    emit!(Deposited {
        vault: vault_state.key(),
        user,
        receiver,
        asset_amount: amount,
        shares_minted: shares_to_mint,
        total_assets: vault_state.total_assets,
        total_shares: vault_state.total_shares,
        lock_until,
        timestamp: now,
    });

    Ok(())
}
