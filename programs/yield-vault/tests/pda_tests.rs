/// Account-level tests for the Yield Vault
///
/// Security coverage:
///  PDA uniqueness per vault, mint, market and depositor
///  Account sizes cover the serialized state
///  Oracle records fail closed
///  Registry whitelist enforcement

use anchor_lang::prelude::*;
use yield_vault::{
    constants::*,
    errors::VaultError,
    state::{
        AssetConfig, FeedStatus, LockRecord, PoolRegistry, Position, PriceFeed,
        RewardsDistributor, Settings, VaultState,
    },
};

// =============================================================================
// PDA DERIVATION
// =============================================================================

#[test]
fn test_vault_pdas_unique_per_mint() {
    let program_id = yield_vault::id();
    let asset_mint_1 = Pubkey::new_unique();
    let asset_mint_2 = Pubkey::new_unique();

    let (vault_1, _) =
        Pubkey::find_program_address(&[VAULT_SEED, asset_mint_1.as_ref()], &program_id);
    let (vault_2, _) =
        Pubkey::find_program_address(&[VAULT_SEED, asset_mint_2.as_ref()], &program_id);
    assert_ne!(vault_1, vault_2, "PDAs should be unique per mint");

    let (share_mint, _) =
        Pubkey::find_program_address(&[SHARE_MINT_SEED, asset_mint_1.as_ref()], &program_id);
    let (authority, _) =
        Pubkey::find_program_address(&[VAULT_AUTHORITY_SEED, asset_mint_1.as_ref()], &program_id);
    assert_ne!(vault_1, share_mint);
    assert_ne!(vault_1, authority);
    assert_ne!(share_mint, authority);
}

#[test]
fn test_market_pdas_unique_per_pool_and_asset() {
    let program_id = yield_vault::id();
    let vault = Pubkey::new_unique();
    let asset = Pubkey::new_unique();
    let collateral = Pubkey::new_unique();

    let (config_1, _) = Pubkey::find_program_address(
        &[ASSET_CONFIG_SEED, vault.as_ref(), &1u64.to_le_bytes(), asset.as_ref()],
        &program_id,
    );
    let (config_2, _) = Pubkey::find_program_address(
        &[ASSET_CONFIG_SEED, vault.as_ref(), &2u64.to_le_bytes(), asset.as_ref()],
        &program_id,
    );
    let (collateral_1, _) = Pubkey::find_program_address(
        &[ASSET_CONFIG_SEED, vault.as_ref(), &1u64.to_le_bytes(), collateral.as_ref()],
        &program_id,
    );
    assert_ne!(config_1, config_2);
    assert_ne!(config_1, collateral_1, "Each asset of a pool has its own market");

    let (receipt, _) = Pubkey::find_program_address(
        &[POSITION_SEED, config_1.as_ref(), vault.as_ref()],
        &program_id,
    );
    assert_ne!(receipt, config_1);

    let borrower = Pubkey::new_unique();
    let (loan, _) = Pubkey::find_program_address(
        &[POSITION_SEED, collateral_1.as_ref(), config_1.as_ref(), borrower.as_ref()],
        &program_id,
    );
    let (reversed, _) = Pubkey::find_program_address(
        &[POSITION_SEED, config_1.as_ref(), collateral_1.as_ref(), borrower.as_ref()],
        &program_id,
    );
    assert_ne!(loan, receipt, "Borrower positions never alias the vault receipt");
    assert_ne!(loan, reversed);
}

#[test]
fn test_lock_record_pda_per_depositor() {
    let program_id = yield_vault::id();
    let vault = Pubkey::new_unique();
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();

    let (alice_lock, _) = Pubkey::find_program_address(
        &[LOCK_RECORD_SEED, vault.as_ref(), alice.as_ref()],
        &program_id,
    );
    let (bob_lock, _) = Pubkey::find_program_address(
        &[LOCK_RECORD_SEED, vault.as_ref(), bob.as_ref()],
        &program_id,
    );
    assert_ne!(alice_lock, bob_lock, "Each depositor has their own bond");

    let (other_vault_lock, _) = Pubkey::find_program_address(
        &[LOCK_RECORD_SEED, Pubkey::new_unique().as_ref(), alice.as_ref()],
        &program_id,
    );
    assert_ne!(alice_lock, other_vault_lock);

    let (alice_escrow, _) = Pubkey::find_program_address(
        &[LOCKED_SHARES_SEED, vault.as_ref(), alice.as_ref()],
        &program_id,
    );
    let (bob_escrow, _) = Pubkey::find_program_address(
        &[LOCKED_SHARES_SEED, vault.as_ref(), bob.as_ref()],
        &program_id,
    );
    assert_ne!(alice_escrow, bob_escrow, "Bonded shares are escrowed per depositor");
    assert_ne!(alice_escrow, alice_lock);
}

// =============================================================================
// ACCOUNT SIZES
// =============================================================================

fn serialized_len<T: AnchorSerialize>(value: &T) -> usize {
    let mut buf = Vec::new();
    value.serialize(&mut buf).unwrap();
    buf.len() + 8
}

#[test]
fn test_account_sizes_fit_state() {
    let vault_state = VaultState::new(
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        6,
        Settings::new(Pubkey::new_unique()),
    );
    assert!(serialized_len(&vault_state) <= VAULT_STATE_SIZE);

    let mut registry = PoolRegistry::new(Pubkey::new_unique());
    for i in 0..MAX_POOLS {
        registry
            .add_pool(
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                1_000,
                "x".repeat(MAX_POOL_NAME_LEN - i % 2),
            )
            .unwrap();
    }
    assert!(serialized_len(&registry) <= PoolRegistry::SPACE);

    let config = AssetConfig::new(Pubkey::new_unique(), 1, Pubkey::new_unique(), 1_000_000, 0);
    assert!(serialized_len(&config) <= AssetConfig::LEN);

    let position = Position::new(Pubkey::new_unique(), 1, Pubkey::new_unique(), Pubkey::new_unique());
    assert!(serialized_len(&position) <= Position::LEN);

    assert!(serialized_len(&LockRecord::default()) <= LockRecord::LEN);
    assert!(serialized_len(&PriceFeed::default()) <= PriceFeed::LEN);
    assert!(serialized_len(&RewardsDistributor::default()) <= RewardsDistributor::LEN);
}

#[test]
fn test_registry_full_and_duplicates_rejected() {
    let mut registry = PoolRegistry::new(Pubkey::new_unique());
    let first = Pubkey::new_unique();
    registry
        .add_pool(first, Pubkey::new_unique(), 5_000, "first".to_string())
        .unwrap();

    let err = registry
        .add_pool(first, Pubkey::new_unique(), 5_000, "again".to_string())
        .unwrap_err();
    assert!(VaultError::PoolAlreadyExists.matches(&err));

    for _ in 1..MAX_POOLS {
        registry
            .add_pool(Pubkey::new_unique(), Pubkey::new_unique(), 5_000, "p".to_string())
            .unwrap();
    }
    let err = registry
        .add_pool(Pubkey::new_unique(), Pubkey::new_unique(), 5_000, "late".to_string())
        .unwrap_err();
    assert!(VaultError::RegistryFull.matches(&err));
}

// =============================================================================
// ORACLE RECORDS
// =============================================================================

#[test]
fn test_price_feed_quote_window() {
    let feed = PriceFeed {
        mint: Pubkey::new_unique(),
        decimals: 6,
        price: 250_000_000,
        expo: -8,
        publish_time: 1_000,
        status: FeedStatus::Trading,
        ..Default::default()
    };

    let fresh = feed.quote(1_000 + DEFAULT_MAX_PRICE_AGE, DEFAULT_MAX_PRICE_AGE);
    assert!(fresh.is_valid);
    assert_eq!(fresh.value, SCALE * 5 / 2);

    let stale = feed.quote(1_001 + DEFAULT_MAX_PRICE_AGE, DEFAULT_MAX_PRICE_AGE);
    assert!(!stale.is_valid, "Stale prices are never used");
}
