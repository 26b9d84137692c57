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

//! Entry point contract bindings, limited to the read surface the SDK uses.

use alloy_primitives::{aliases::U192, Address, Bytes, U256};
use alloy_sol_macro::sol;
use alloy_sol_types::SolCall;

sol! {
    /// ERC-4337 v0.6 entry point, nonce accessor only.
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IEntryPoint {
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
    }
}

/// Encodes the entry point's `getNonce(address,uint192)` call.
pub fn get_nonce_calldata(sender: Address, key: U192) -> Bytes {
    IEntryPoint::getNonceCall { sender, key }.abi_encode().into()
}

/// Decodes the return data of a `getNonce` call.
pub fn decode_nonce(data: &[u8]) -> Result<U256, alloy_sol_types::Error> {
    Ok(IEntryPoint::getNonceCall::abi_decode_returns(data, true)?.nonce)
}
