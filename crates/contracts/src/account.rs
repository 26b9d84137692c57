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

//! Smart account factory and wallet bindings.
//!
//! The factory deploys accounts via CREATE2, salted with
//! `keccak256(abi.encode(owners, nonce))`, which lets the account address be
//! derived locally before the account exists on chain.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_macro::sol;
use alloy_sol_types::{SolCall, SolValue};

sol! {
    /// One target invocation inside a batch.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct Call {
        address target;
        uint256 value;
        bytes data;
    }

    /// Deterministic smart account factory.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IAccountFactory {
        function createAccount(bytes[] calldata owners, uint256 nonce) external payable returns (address account);
        function getAddress(bytes[] calldata owners, uint256 nonce) external view returns (address account);
    }

    /// The deployed smart account's execution surface.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface ISmartAccount {
        function executeBatch(Call[] calldata calls) external payable;
    }
}

/// Computes the CREATE2 salt for an account owned by `owners`.
///
/// Byte-for-byte equivalent to the factory's `keccak256(abi.encode(owners, nonce))`.
/// Owner ordering is significant: it is part of the encoded tuple.
pub fn account_salt(owners: &[Bytes], nonce: U256) -> B256 {
    keccak256((owners.to_vec(), nonce).abi_encode_params())
}

/// Derives the CREATE2 address for `salt` deployed by `factory` with the
/// given init code hash.
pub fn create2_address(factory: Address, salt: B256, init_code_hash: B256) -> Address {
    factory.create2(salt, init_code_hash)
}

/// Derives the counterfactual address of the account `factory` would deploy
/// for `(owners, nonce)`. Pure computation, no chain access.
pub fn counterfactual_address(
    factory: Address,
    owners: &[Bytes],
    nonce: U256,
    init_code_hash: B256,
) -> Address {
    create2_address(factory, account_salt(owners, nonce), init_code_hash)
}

/// Encodes an owner EOA address as the 32-byte owner credential the factory
/// expects (`abi.encode(address)`).
pub fn owner_from_address(owner: Address) -> Bytes {
    Bytes::copy_from_slice(owner.into_word().as_slice())
}

/// Builds the `initCode` field of a user operation: the factory address
/// followed by the `createAccount` call that deploys the sender.
pub fn account_init_code(factory: Address, owners: Vec<Bytes>, nonce: U256) -> Bytes {
    let call = IAccountFactory::createAccountCall { owners, nonce };
    let mut init_code = Vec::with_capacity(Address::len_bytes() + call.abi_encoded_size() + 4);
    init_code.extend_from_slice(factory.as_slice());
    init_code.extend_from_slice(&call.abi_encode());
    init_code.into()
}

/// Encodes a list of calls as `executeBatch` call data for the smart account.
pub fn execute_batch_calldata(calls: Vec<Call>) -> Bytes {
    ISmartAccount::executeBatchCall { calls }.abi_encode().into()
}

/// Encodes the factory's `getAddress` view call, the on-chain cross-check of
/// [`counterfactual_address`].
pub fn get_address_calldata(owners: Vec<Bytes>, nonce: U256) -> Bytes {
    IAccountFactory::getAddressCall { owners, nonce }
        .abi_encode()
        .into()
}

/// Decodes the return data of the factory's `getAddress` call.
pub fn decode_get_address(data: &[u8]) -> Result<Address, alloy_sol_types::Error> {
    Ok(IAccountFactory::getAddressCall::abi_decode_returns(data, true)?.account)
}
