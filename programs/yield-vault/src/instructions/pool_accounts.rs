use anchor_lang::prelude::*;

use crate::engine::{Holder, MarketPool, VaultBook};
use crate::errors::VaultError;
use crate::state::*;

/// Lending-market accounts passed through `remaining_accounts`, as
/// `(AssetConfig, Position)` pairs in registry order
pub struct PoolAccounts<'info> {
    configs: Vec<Account<'info, AssetConfig>>,
    receipts: Vec<Account<'info, Position>>,
}

impl<'info> PoolAccounts<'info> {
    pub fn load(
        vault: &Pubkey,
        registry: &PoolRegistry,
        remaining: &'info [AccountInfo<'info>],
    ) -> Result<Self> {
        if remaining.len() != registry.len() * 2 {
            msg!(
                "expected {} pool accounts, got {}",
                registry.len() * 2,
                remaining.len()
            );
            return err!(VaultError::PoolAccountMismatch);
        }

        let mut configs = Vec::with_capacity(registry.len());
        let mut receipts = Vec::with_capacity(registry.len());
        for (props, pair) in registry.pools.iter().zip(remaining.chunks(2)) {
            require_keys_eq!(pair[0].key(), props.pool_id, VaultError::PoolAccountMismatch);
            require_keys_eq!(pair[1].key(), props.receipt, VaultError::PoolAccountMismatch);

            let config = Account::<AssetConfig>::try_from(&pair[0])?;
            let receipt = Account::<Position>::try_from(&pair[1])?;
            require_keys_eq!(config.vault, *vault, VaultError::PoolAccountMismatch);
            require_keys_eq!(receipt.owner, *vault, VaultError::PoolAccountMismatch);

            configs.push(config);
            receipts.push(receipt);
        }
        Ok(Self { configs, receipts })
    }

    pub fn markets(&self) -> Vec<MarketPool> {
        self.configs
            .iter()
            .zip(&self.receipts)
            .map(|(config, receipt)| {
                MarketPool::new(config.clone().into_inner(), receipt.clone().into_inner())
            })
            .collect()
    }

    /// Persist markets that the committed book changed
    pub fn store(&mut self, markets: &[MarketPool]) -> Result<()> {
        require!(
            markets.len() == self.configs.len(),
            VaultError::PoolAccountMismatch
        );
        for ((config, receipt), market) in self
            .configs
            .iter_mut()
            .zip(self.receipts.iter_mut())
            .zip(markets)
        {
            if **config != market.config {
                require!(config.to_account_info().is_writable, VaultError::PoolAccountMismatch);
                config.set_inner(market.config.clone());
                config.exit(&crate::ID)?;
            }
            if **receipt != market.position {
                require!(receipt.to_account_info().is_writable, VaultError::PoolAccountMismatch);
                receipt.set_inner(market.position.clone());
                receipt.exit(&crate::ID)?;
            }
        }
        Ok(())
    }
}

/// Build a book from the vault accounts and the markets in `remaining`
pub fn load_book<'info>(
    vault_state: &Account<'info, VaultState>,
    registry: &Account<'info, PoolRegistry>,
    remaining: &'info [AccountInfo<'info>],
) -> Result<(VaultBook<MarketPool>, PoolAccounts<'info>)> {
    let vault = vault_state.key();
    let pools = PoolAccounts::load(&vault, registry, remaining)?;
    let book = VaultBook::new(
        vault,
        vault_state.clone().into_inner(),
        registry.clone().into_inner(),
        pools.markets(),
    )?;
    Ok((book, pools))
}

/// Write a committed book back; returns the holder entries for the caller
pub fn store_book<'info>(
    book: VaultBook<MarketPool>,
    vault_state: &mut Account<'info, VaultState>,
    registry: &mut Account<'info, PoolRegistry>,
    pools: &mut PoolAccounts<'info>,
) -> Result<std::collections::BTreeMap<Pubkey, Holder>> {
    pools.store(&book.pools)?;
    vault_state.set_inner(book.state);
    registry.set_inner(book.registry);
    Ok(book.holders)
}
