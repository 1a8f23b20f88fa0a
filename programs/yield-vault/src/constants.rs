// Constants for the Yield Vault program

use anchor_lang::prelude::*;

/// Seed for vault state PDA
#[constant]
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for share mint PDA
#[constant]
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for vault token account PDA
#[constant]
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for the allowed-pools registry PDA
#[constant]
pub const POOL_REGISTRY_SEED: &[u8] = b"pool_registry";

/// Seed for per-(pool, asset) lending market configuration
#[constant]
pub const ASSET_CONFIG_SEED: &[u8] = b"asset_config";

/// Seed for positions inside a lending market
#[constant]
pub const POSITION_SEED: &[u8] = b"position";

/// Seed for per-depositor lock records
#[constant]
pub const LOCK_RECORD_SEED: &[u8] = b"lock_record";

/// Seed for the share escrow holding a depositor's bonded shares
#[constant]
pub const LOCKED_SHARES_SEED: &[u8] = b"locked_shares";

/// Seed for oracle price records
#[constant]
pub const PRICE_FEED_SEED: &[u8] = b"price_feed";

/// Seed for the rewards distributor of a vault
#[constant]
pub const REWARDS_SEED: &[u8] = b"rewards";

/// Fixed-point base (1e18) for rates, accumulators and collateral shares
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis points denominator
pub const BPS_DENOMINATOR: u64 = 10_000;

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Maximum number of pools in the registry
pub const MAX_POOLS: usize = 10;

/// Maximum length of a pool name
pub const MAX_POOL_NAME_LEN: usize = 32;

/// Upper bound for the performance fee (50%)
pub const MAX_PERFORMANCE_FEE_BPS: u16 = 5_000;

/// Upper bound for the per-market protocol fee rate (50%, SCALE precision)
pub const MAX_FEE_RATE: u128 = SCALE / 2;

// Lock-to-earn preset terms
pub const LOCK_ONE_MONTH: i64 = 2_592_000;
pub const LOCK_THREE_MONTHS: i64 = 7_776_000;
pub const LOCK_SIX_MONTHS: i64 = 15_552_000;
pub const LOCK_ONE_YEAR: i64 = 31_536_000;

/// Default ceiling for custom lock periods (two years)
pub const DEFAULT_MAX_LOCK_PERIOD: i64 = 2 * LOCK_ONE_YEAR;

/// Default oracle staleness tolerance in seconds
pub const DEFAULT_MAX_PRICE_AGE: i64 = 60;

// Interest rate model defaults (SCALE precision, rates are per second)
pub const DEFAULT_TARGET_UTILIZATION: u128 = 800_000_000_000_000_000; // 80%
pub const DEFAULT_MIN_TARGET_UTILIZATION: u128 = 750_000_000_000_000_000; // 75%
pub const DEFAULT_MAX_TARGET_UTILIZATION: u128 = 850_000_000_000_000_000; // 85%
pub const DEFAULT_ZERO_UTILIZATION_RATE: u128 = 0;
pub const DEFAULT_MIN_FULL_UTILIZATION_RATE: u128 = 1_582_470_460; // ~5% APR
pub const DEFAULT_MAX_FULL_UTILIZATION_RATE: u128 = 31_649_409_200; // ~100% APR
pub const DEFAULT_TARGET_RATE_PERCENT: u128 = 200_000_000_000_000_000; // 20%
pub const DEFAULT_RATE_HALF_LIFE: u64 = 172_800; // 2 days
pub const DEFAULT_MAX_UTILIZATION: u128 = 950_000_000_000_000_000; // 95%

/// Default loan-to-value limit of collateral in a market
pub const DEFAULT_MAX_LTV: u128 = 750_000_000_000_000_000; // 75%

/// Space for VaultState account (8 discriminator + 32 authority + 32 asset_mint +
/// 32 share_mint + 1 asset_decimals + 8 total_assets + 8 total_shares +
/// 8 idle_assets + 8 last_harvest + settings + 3 bumps + 64 padding)
pub const VAULT_STATE_SIZE: usize =
    8 + 32 + 32 + 32 + 1 + 8 + 8 + 8 + 8 + SETTINGS_SIZE + 1 + 1 + 1 + 64;

/// 32 fee_receiver + 2 performance_fee_bps + 1 default_pool_index +
/// 8 max_lock_period + 8 min_deposit + 8 max_price_age
pub const SETTINGS_SIZE: usize = 32 + 2 + 1 + 8 + 8 + 8;
