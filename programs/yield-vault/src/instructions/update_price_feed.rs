use anchor_lang::prelude::*;
use anchor_spl::token::Mint;

use crate::{constants::*, errors::*, events::*, state::*};

/// Publish a raw price for `mint`; the record is created on first use
#[derive(Accounts)]
pub struct UpdatePriceFeed<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    pub mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = authority,
        space = PriceFeed::LEN,
        seeds = [PRICE_FEED_SEED, vault_state.key().as_ref(), mint.key().as_ref()],
        bump
    )]
    pub price_feed: Account<'info, PriceFeed>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<UpdatePriceFeed>,
    price: i64,
    expo: i32,
    status: FeedStatus,
) -> Result<()> {
    let publish_time = Clock::get()?.unix_timestamp;
    let mint = ctx.accounts.mint.key();

    if status == FeedStatus::Trading && price <= 0 {
        msg!("trading price must be positive, got {}", price);
        return Err(error!(VaultError::StalePriceData).with_values((price, 0i64)));
    }

    ctx.accounts.price_feed.set_inner(PriceFeed {
        authority: ctx.accounts.authority.key(),
        mint,
        decimals: ctx.accounts.mint.decimals,
        price,
        expo,
        publish_time,
        status,
        bump: ctx.bumps.price_feed,
    });

    emit!(PriceUpdated {
        feed: ctx.accounts.price_feed.key(),
        mint,
        price,
        expo,
        publish_time,
    });

    Ok(())
}
