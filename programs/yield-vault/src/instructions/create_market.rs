use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::{constants::*, errors::*, events::*, math::decimal_scale, state::*};

/// Risk and curve parameters of a new lending market
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct MarketParams {
    pub max_utilization: u128,
    pub floor: u128,
    pub max_ltv: u128,
    pub fee_rate: u128,
    pub is_legacy_mode: bool,
    pub interest_rate_config: InterestRateConfig,
}

/// Create an in-program lending market for one asset together with the
/// vault's receipt position in it
///
/// Markets of the vault asset can join the registry. Markets of other mints
/// share a `pool_id` with them and hold the collateral borrowers post.
#[derive(Accounts)]
#[instruction(pool_id: u64)]
pub struct CreateMarket<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    pub asset_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = AssetConfig::LEN,
        seeds = [
            ASSET_CONFIG_SEED,
            vault_state.key().as_ref(),
            &pool_id.to_le_bytes(),
            asset_mint.key().as_ref(),
        ],
        bump
    )]
    pub asset_config: Account<'info, AssetConfig>,

    /// Vault's receipt position in the new market
    #[account(
        init,
        payer = authority,
        space = Position::LEN,
        seeds = [POSITION_SEED, asset_config.key().as_ref(), vault_state.key().as_ref()],
        bump
    )]
    pub receipt: Account<'info, Position>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreateMarket>, pool_id: u64, params: MarketParams) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_key = ctx.accounts.vault_state.key();
    let asset_mint = ctx.accounts.asset_mint.key();

    let mut config = AssetConfig::new(
        vault_key,
        pool_id,
        asset_mint,
        decimal_scale(ctx.accounts.asset_mint.decimals)?,
        now,
    );
    config.max_utilization = params.max_utilization;
    config.floor = params.floor;
    config.max_ltv = params.max_ltv;
    config.fee_rate = params.fee_rate;
    config.is_legacy_mode = params.is_legacy_mode;
    config.last_full_utilization_rate = params.interest_rate_config.min_full_for_utilization_rate;
    config.interest_rate_config = params.interest_rate_config;
    config.bump = ctx.bumps.asset_config;
    config.validate()?;

    let mut receipt = Position::new(vault_key, pool_id, asset_mint, asset_mint);
    receipt.bump = ctx.bumps.receipt;

    ctx.accounts.asset_config.set_inner(config);
    ctx.accounts.receipt.set_inner(receipt);

    emit!(MarketCreated {
        vault: vault_key,
        asset_config: ctx.accounts.asset_config.key(),
        receipt: ctx.accounts.receipt.key(),
        asset_mint,
        pool_id,
        timestamp: now,
    });

    Ok(())
}
