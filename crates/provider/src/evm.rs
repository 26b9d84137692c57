// This file is part of WalletKit.
//
// WalletKit is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// WalletKit is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with WalletKit.
// If not, see https://www.gnu.org/licenses/.

//! Read-only chain access and raw transaction broadcast.

use std::marker::PhantomData;

use alloy_primitives::{aliases::U192, Address, Bytes, B256, U256};
use alloy_provider::{network::TransactionBuilder, Provider as AlloyProvider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport::Transport;
use anyhow::Context;
#[cfg(feature = "test-utils")]
use mockall::automock;
use url::Url;
use walletkit_contracts::{account, entry_point};

use crate::ProviderResult;

/// Read-only access to chain state, plus raw transaction broadcast for the
/// legacy send path. All reads are idempotent and safe to retry; none are
/// retried automatically.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait EvmProvider: Send + Sync {
    /// True iff contract code is present at `address`.
    async fn is_deployed(&self, address: Address) -> ProviderResult<bool>;

    /// Reads `sender`'s next nonce for `key` from the entry point contract.
    async fn get_entry_point_nonce(
        &self,
        entry_point: Address,
        sender: Address,
        key: U192,
    ) -> ProviderResult<U256>;

    /// Asks the factory for the account address it would deploy for
    /// `(owners, nonce)`, the on-chain cross-check of the local CREATE2
    /// derivation.
    async fn get_factory_address(
        &self,
        factory: Address,
        owners: Vec<Bytes>,
        nonce: U256,
    ) -> ProviderResult<Address>;

    /// `eth_getTransactionCount` at the latest block.
    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64>;

    /// `eth_gasPrice`.
    async fn gas_price(&self) -> ProviderResult<u128>;

    /// Broadcasts a signed raw transaction, returning its hash.
    async fn send_raw_transaction(&self, raw: Bytes) -> ProviderResult<B256>;
}

/// [`EvmProvider`] implementation backed by an
/// [alloy-provider](https://github.com/alloy-rs/alloy).
pub struct AlloyEvmProvider<AP, T> {
    inner: AP,
    _marker: PhantomData<T>,
}

impl<AP, T> AlloyEvmProvider<AP, T> {
    /// Create a new `AlloyEvmProvider`.
    pub fn new(inner: AP) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

impl<AP: Clone, T> Clone for AlloyEvmProvider<AP, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<AP, T> EvmProvider for AlloyEvmProvider<AP, T>
where
    T: Transport + Clone,
    AP: AlloyProvider<T>,
{
    async fn is_deployed(&self, address: Address) -> ProviderResult<bool> {
        let code = self.inner.get_code_at(address).await?;
        Ok(!code.is_empty())
    }

    async fn get_entry_point_nonce(
        &self,
        entry_point: Address,
        sender: Address,
        key: U192,
    ) -> ProviderResult<U256> {
        let tx = TransactionRequest::default()
            .with_to(entry_point)
            .with_input(entry_point::get_nonce_calldata(sender, key));
        let ret = self.inner.call(&tx).await?;
        Ok(entry_point::decode_nonce(&ret)?)
    }

    async fn get_factory_address(
        &self,
        factory: Address,
        owners: Vec<Bytes>,
        nonce: U256,
    ) -> ProviderResult<Address> {
        let tx = TransactionRequest::default()
            .with_to(factory)
            .with_input(account::get_address_calldata(owners, nonce));
        let ret = self.inner.call(&tx).await?;
        Ok(account::decode_get_address(&ret)?)
    }

    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64> {
        Ok(self.inner.get_transaction_count(address).await?)
    }

    async fn gas_price(&self) -> ProviderResult<u128> {
        Ok(self.inner.get_gas_price().await?)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> ProviderResult<B256> {
        let pending = self.inner.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }
}

/// Create a new [`EvmProvider`] from a node RPC URL.
pub fn new_evm_provider(rpc_url: &str) -> anyhow::Result<impl EvmProvider + Clone> {
    let url = Url::parse(rpc_url).context("invalid rpc url")?;
    let provider = ProviderBuilder::new().on_http(url);
    Ok(AlloyEvmProvider::new(provider))
}
