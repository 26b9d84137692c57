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

use alloy_primitives::{Address, B256};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACCOUNT_INIT_CODE_HASH, DEFAULT_ENTRY_POINT_ADDRESS, DEFAULT_FACTORY_ADDRESS,
};

/// Everything chain-dependent the SDK needs for one chain.
///
/// A spec is captured once per pipeline run: operations snapshot the spec (and
/// the providers built from it) when they start, so a chain switch never
/// retargets an in-flight request.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainSpec {
    /// Chain id.
    pub id: u64,
    /// Node JSON-RPC endpoint.
    pub rpc_url: String,
    /// Bundler JSON-RPC endpoint.
    pub bundler_url: String,
    /// Entry point singleton address.
    pub entry_point_address: Address,
    /// Smart account factory address.
    pub factory_address: Address,
    /// keccak256 of the account creation bytecode the factory deploys.
    pub account_init_code_hash: B256,
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            id: 1,
            rpc_url: "https://rpc.ankr.com/eth".to_string(),
            bundler_url: "https://public.pimlico.io/v2/1/rpc".to_string(),
            entry_point_address: DEFAULT_ENTRY_POINT_ADDRESS,
            factory_address: DEFAULT_FACTORY_ADDRESS,
            account_init_code_hash: DEFAULT_ACCOUNT_INIT_CODE_HASH,
        }
    }
}

impl ChainSpec {
    /// Spec for `id` with the default contract deployment, pointing at the
    /// given endpoints.
    pub fn new(id: u64, rpc_url: impl Into<String>, bundler_url: impl Into<String>) -> Self {
        Self {
            id,
            rpc_url: rpc_url.into(),
            bundler_url: bundler_url.into(),
            ..Self::default()
        }
    }
}
