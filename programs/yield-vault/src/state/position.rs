use anchor_lang::prelude::*;

/// A user's stake in one lending pool, keyed by
/// (pool, collateral asset, debt asset, owner).
///
/// Both sides are stored in pool-internal units: collateral as shares of the
/// collateral asset, debt as nominal debt that the rate accumulator converts
/// to an absolute amount at read time.
#[account]
#[derive(Debug, Default, PartialEq)]
pub struct Position {
    pub owner: Pubkey,
    pub pool_id: u64,
    pub collateral_asset: Pubkey,
    pub debt_asset: Pubkey,

    pub collateral_shares: u128,
    pub nominal_debt: u128,

    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 8   // pool_id
        + 32  // collateral_asset
        + 32  // debt_asset
        + 16  // collateral_shares
        + 16  // nominal_debt
        + 1   // bump
        + 32; // padding

    pub fn new(owner: Pubkey, pool_id: u64, collateral_asset: Pubkey, debt_asset: Pubkey) -> Self {
        Self {
            owner,
            pool_id,
            collateral_asset,
            debt_asset,
            ..Default::default()
        }
    }

    /// A position with neither collateral nor debt is logically deleted
    pub fn is_empty(&self) -> bool {
        self.collateral_shares == 0 && self.nominal_debt == 0
    }
}
