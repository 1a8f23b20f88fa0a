use anchor_lang::prelude::*;

/// Custom error codes for the Yield Vault program
///
/// Every rejection is raised before any state mutation; the bound that was
/// violated is logged next to the error by the caller.
#[error_code]
pub enum VaultError {
    // Share ledger
    #[msg("Amount must be greater than zero and at least the minimum deposit")]
    InvalidAmount,

    #[msg("Owner holds fewer shares than the withdrawal requires")]
    InsufficientShares,

    #[msg("Idle assets plus pool liquidity cannot cover the withdrawal")]
    ExceedsAvailableLiquidity,

    // Rebalancing
    #[msg("Pool cap exceeded - allocation would be above the pool's max weight")]
    PoolCapExceeded,

    #[msg("Pool rejected the call or returned a non-conforming response")]
    PoolUnavailable,

    #[msg("Target weights are malformed or sum above 100%")]
    InvalidWeights,

    // Lock-to-earn
    #[msg("Lock period must be positive and within the configured maximum")]
    InvalidLockPeriod,

    #[msg("Funds are locked until the bond matures")]
    FundsLocked,

    #[msg("Withdrawal exceeds the owner's maximum withdrawable amount")]
    ExceedsMaxWithdraw,

    #[msg("A lock already exists for this depositor - use deposit_locked")]
    LockAlreadyActive,

    #[msg("No lock exists for this depositor - use deposit_with_custom_lock")]
    NoActiveLock,

    // Harvest
    #[msg("Reward claim proof does not match the published merkle root")]
    InvalidProof,

    #[msg("Price data is stale or invalid")]
    StalePriceData,

    #[msg("Swap output is below the requested minimum")]
    SlippageExceeded,

    // Lending markets
    #[msg("Position is not sufficiently collateralized")]
    NotCollateralized,

    #[msg("Borrow would push utilization above the market maximum")]
    UtilizationExceeded,

    #[msg("Position debt is below the market floor")]
    DustPosition,

    #[msg("Market reserve cannot cover the requested amount")]
    InsufficientPoolLiquidity,

    // Arithmetic
    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero")]
    DivisionByZero,

    // Accounts and registry
    #[msg("Invalid token mint - does not match vault asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Unauthorized - only vault authority can perform this action")]
    Unauthorized,

    #[msg("Pool not approved - not in registry or disabled")]
    PoolNotApproved,

    #[msg("Pool already exists in registry")]
    PoolAlreadyExists,

    #[msg("Pool not found in registry")]
    PoolNotFound,

    #[msg("Pool registry is full - maximum pools reached")]
    RegistryFull,

    #[msg("Pool name too long - maximum 32 characters")]
    NameTooLong,

    #[msg("Pool accounts do not match the registry")]
    PoolAccountMismatch,

    #[msg("Vault settings are out of bounds")]
    InvalidSettings,
}

impl VaultError {
    /// Whether `err` carries this error code
    pub fn matches(self, err: &Error) -> bool {
        match err {
            Error::AnchorError(e) => {
                e.error_code_number == self as u32 + anchor_lang::error::ERROR_CODE_OFFSET
            }
            Error::ProgramError(_) => false,
        }
    }
}
