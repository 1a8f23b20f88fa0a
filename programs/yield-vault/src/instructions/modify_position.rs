use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{self, Mint, Token, TokenAccount, Transfer},
};

use crate::engine::{
    modify_position, Amount, FeedOracle, ModifyPositionParams, SysvarClock, TimeSource,
};
use crate::{constants::*, errors::*, events::*, state::*};

/// Post or remove collateral and borrow or repay against a lending market
///
/// Both markets must belong to the same pool of this vault. Each market's
/// reserve sits in the vault authority's token account for its mint, so a
/// borrow pays out of custody and a repayment flows back into it.
///
/// Security considerations:
/// - Both markets are accrued before the deltas apply
/// - Borrowing or removing collateral requires fresh prices for both assets
///   and a debt value within the collateral market's max LTV
#[derive(Accounts)]
pub struct ModifyPosition<'info> {
    #[account(mut)]
    pub borrower: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        constraint = collateral_config.vault == vault_state.key() @ VaultError::PoolAccountMismatch,
        constraint = collateral_config.asset_mint == collateral_mint.key() @ VaultError::InvalidMint,
    )]
    pub collateral_config: Box<Account<'info, AssetConfig>>,

    #[account(
        mut,
        constraint = debt_config.vault == vault_state.key() @ VaultError::PoolAccountMismatch,
        constraint = debt_config.asset_mint == debt_mint.key() @ VaultError::InvalidMint,
        constraint = debt_config.pool_id == collateral_config.pool_id @ VaultError::PoolAccountMismatch,
        constraint = debt_config.key() != collateral_config.key() @ VaultError::PoolAccountMismatch,
    )]
    pub debt_config: Box<Account<'info, AssetConfig>>,

    pub collateral_mint: Box<Account<'info, Mint>>,

    pub debt_mint: Box<Account<'info, Mint>>,

    /// Borrower's position, keyed by (collateral market, debt market, owner)
    #[account(
        init_if_needed,
        payer = borrower,
        space = Position::LEN,
        seeds = [
            POSITION_SEED,
            collateral_config.key().as_ref(),
            debt_config.key().as_ref(),
            borrower.key().as_ref(),
        ],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        seeds = [PRICE_FEED_SEED, vault_state.key().as_ref(), collateral_mint.key().as_ref()],
        bump = collateral_price_feed.bump,
    )]
    pub collateral_price_feed: Box<Account<'info, PriceFeed>>,

    #[account(
        seeds = [PRICE_FEED_SEED, vault_state.key().as_ref(), debt_mint.key().as_ref()],
        bump = debt_price_feed.bump,
    )]
    pub debt_price_feed: Box<Account<'info, PriceFeed>>,

    /// CHECK: PDA used as custody authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = borrower,
        associated_token::mint = collateral_mint,
        associated_token::authority = vault_authority,
    )]
    pub collateral_custody: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        associated_token::mint = debt_mint,
        associated_token::authority = vault_authority,
    )]
    pub debt_custody: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = borrower_collateral_account.mint == collateral_mint.key() @ VaultError::InvalidMint,
        constraint = borrower_collateral_account.owner == borrower.key() @ VaultError::InvalidOwner,
    )]
    pub borrower_collateral_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = borrower_debt_account.mint == debt_mint.key() @ VaultError::InvalidMint,
        constraint = borrower_debt_account.owner == borrower.key() @ VaultError::InvalidOwner,
    )]
    pub borrower_debt_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

fn token_amount(delta: i128) -> Result<u64> {
    u64::try_from(delta.unsigned_abs()).map_err(|_| error!(VaultError::MathOverflow))
}

/// `collateral` and `debt` are signed asset amounts: positive posts collateral
/// or borrows, negative removes collateral or repays
pub fn handler(ctx: Context<ModifyPosition>, collateral: i64, debt: i64) -> Result<()> {
    require!(collateral != 0 || debt != 0, VaultError::InvalidAmount);

    let clock = SysvarClock::get()?;
    let now = clock.now();
    let borrower = ctx.accounts.borrower.key();

    let mut position = (**ctx.accounts.position).clone();
    if position.owner == Pubkey::default() {
        position = Position::new(
            borrower,
            ctx.accounts.collateral_config.pool_id,
            ctx.accounts.collateral_mint.key(),
            ctx.accounts.debt_mint.key(),
        );
        position.bump = ctx.bumps.position;
    }

    let oracle = FeedOracle::from_feeds(
        [&**ctx.accounts.collateral_price_feed, &**ctx.accounts.debt_price_feed],
        now,
        ctx.accounts.vault_state.settings.max_price_age,
    );
    let mut collateral_config = (**ctx.accounts.collateral_config).clone();
    let mut debt_config = (**ctx.accounts.debt_config).clone();
    let max_ltv = collateral_config.max_ltv;

    // EFFECTS: accrue both markets, apply the deltas, check health
    let response = modify_position(
        &mut collateral_config,
        &mut debt_config,
        &mut position,
        ModifyPositionParams {
            collateral: Amount::assets(collateral as i128),
            debt: Amount::assets(debt as i128),
        },
        &oracle,
        max_ltv,
        now,
    )?;

    ctx.accounts.collateral_config.set_inner(collateral_config);
    ctx.accounts.debt_config.set_inner(debt_config);
    ctx.accounts.position.set_inner(position);

    let asset_mint_key = ctx.accounts.vault_state.asset_mint;
    let authority_bump = ctx.accounts.vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    // INTERACTIONS: Move collateral, then debt
    let token_program = ctx.accounts.token_program.to_account_info();
    if response.collateral_delta > 0 {
        let transfer_ctx = CpiContext::new(
            token_program.clone(),
            Transfer {
                from: ctx.accounts.borrower_collateral_account.to_account_info(),
                to: ctx.accounts.collateral_custody.to_account_info(),
                authority: ctx.accounts.borrower.to_account_info(),
            },
        );
        token::transfer(transfer_ctx, token_amount(response.collateral_delta)?)?;
    } else if response.collateral_delta < 0 {
        let transfer_ctx = CpiContext::new_with_signer(
            token_program.clone(),
            Transfer {
                from: ctx.accounts.collateral_custody.to_account_info(),
                to: ctx.accounts.borrower_collateral_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::transfer(transfer_ctx, token_amount(response.collateral_delta)?)?;
    }

    if response.debt_delta > 0 {
        let transfer_ctx = CpiContext::new_with_signer(
            token_program.clone(),
            Transfer {
                from: ctx.accounts.debt_custody.to_account_info(),
                to: ctx.accounts.borrower_debt_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::transfer(transfer_ctx, token_amount(response.debt_delta)?)?;
    } else if response.debt_delta < 0 {
        let transfer_ctx = CpiContext::new(
            token_program,
            Transfer {
                from: ctx.accounts.borrower_debt_account.to_account_info(),
                to: ctx.accounts.debt_custody.to_account_info(),
                authority: ctx.accounts.borrower.to_account_info(),
            },
        );
        token::transfer(transfer_ctx, token_amount(response.debt_delta)?)?;
    }

    emit!(PositionModified {
        vault: ctx.accounts.vault_state.key(),
        owner: borrower,
        position: ctx.accounts.position.key(),
        collateral_delta: response.collateral_delta,
        debt_delta: response.debt_delta,
        collateral_shares: ctx.accounts.position.collateral_shares,
        nominal_debt: ctx.accounts.position.nominal_debt,
        timestamp: now,
    });

    Ok(())
}
