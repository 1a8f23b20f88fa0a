use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, events::*, state::*};

/// Initialize a new vault for a given asset token
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Vault authority - rebalances, manages pools and markets
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: Initialized with proper space and padding for upgrades
    #[account(
        init,
        payer = authority,
        space = VAULT_STATE_SIZE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Asset token mint (the underlying token users deposit)
    pub asset_mint: Account<'info, Mint>,

    /// Share token mint PDA (vault shares)
    /// Security: Mint authority is vault_authority PDA
    #[account(
        init,
        payer = authority,
        seeds = [SHARE_MINT_SEED, asset_mint.key().as_ref()],
        bump,
        mint::decimals = asset_mint.decimals,
        mint::authority = vault_authority,
    )]
    pub share_mint: Account<'info, Mint>,

    /// Allowed-pools registry, empty until `add_pool`
    #[account(
        init,
        payer = authority,
        space = PoolRegistry::SPACE,
        seeds = [POOL_REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub pool_registry: Account<'info, PoolRegistry>,

    /// CHECK: PDA used as mint and custody authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_mint.key().as_ref()],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Custody account holding idle assets and every market reserve
    /// Security: Owned by vault_authority PDA, correct mint
    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, settings: Settings) -> Result<()> {
    // CHECKS: Settings are fixed for the life of the vault
    settings.validate()?;

    let vault_key = ctx.accounts.vault_state.key();

    // EFFECTS: Initialize vault state and registry
    let mut vault_state = VaultState::new(
        ctx.accounts.authority.key(),
        ctx.accounts.asset_mint.key(),
        ctx.accounts.share_mint.key(),
        ctx.accounts.asset_mint.decimals,
        settings,
    );
    vault_state.bump = ctx.bumps.vault_state;
    vault_state.share_bump = ctx.bumps.share_mint;
    vault_state.authority_bump = ctx.bumps.vault_authority;
    ctx.accounts.vault_state.set_inner(vault_state);

    let mut registry = PoolRegistry::new(vault_key);
    registry.bump = ctx.bumps.pool_registry;
    ctx.accounts.pool_registry.set_inner(registry);

    let vault_state = &ctx.accounts.vault_state;
    emit!(VaultInitialized {
        vault: vault_key,
        authority: vault_state.authority,
        asset_mint: vault_state.asset_mint,
        share_mint: vault_state.share_mint,
        fee_receiver: vault_state.settings.fee_receiver,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
