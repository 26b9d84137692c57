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

use alloy_primitives::{Address, Bytes, U128, U256};
use serde::{Deserialize, Serialize};

use crate::constants::DUMMY_SIGNATURE_LENGTH;

/// ERC-4337 v0.6 user operation in bundler wire form.
///
/// Integer fields serialize as `0x`-prefixed hex quantities and empty byte
/// fields as `"0x"`, matching the bundler JSON-RPC encoding, so the same type
/// is used in memory, for estimation, and on the wire.
///
/// An operation is built unsigned, signed exactly once by the signing
/// authority, and submitted exactly once: the entry point nonce it carries is
/// consumed on submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    /// The smart account the operation executes from.
    pub sender: Address,
    /// Anti-replay nonce read from the entry point.
    pub nonce: U256,
    /// Factory call deploying the sender, empty once deployed.
    pub init_code: Bytes,
    /// ABI-encoded `executeBatch` call.
    pub call_data: Bytes,
    /// Gas limit for the execution step.
    pub call_gas_limit: U128,
    /// Gas limit for the validation step.
    pub verification_gas_limit: U128,
    /// Gas paid up front for calldata and bundler overhead.
    pub pre_verification_gas: U128,
    /// Maximum total fee per gas unit.
    pub max_fee_per_gas: U128,
    /// Maximum priority fee per gas unit.
    pub max_priority_fee_per_gas: U128,
    /// Paymaster address and data. Always empty, paymasters are unsupported.
    pub paymaster_and_data: Bytes,
    /// Owner signature, empty until the authority signs.
    pub signature: Bytes,
}

impl UserOperation {
    /// Attaches the authority's signature, finalizing the operation.
    pub fn into_signed(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }
}

/// Placeholder signature used only to size an operation for gas estimation,
/// so the encoded length matches the eventual signed operation. Never valid
/// on chain and never submitted.
pub fn dummy_signature() -> Bytes {
    Bytes::from(vec![0xff; DUMMY_SIGNATURE_LENGTH])
}

/// A pre-4337 transaction signed by the authority itself and broadcast as a
/// raw transaction, for chains without a usable bundler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTransaction {
    /// Call target.
    pub to: Address,
    /// Value in wei.
    pub value: U256,
    /// Call data.
    pub data: Bytes,
    /// The authority account's transaction count.
    pub nonce: u64,
    /// Legacy gas price in wei.
    pub gas_price: u128,
    /// Gas limit.
    pub gas_limit: u64,
    /// Chain the transaction is bound to.
    pub chain_id: u64,
}
