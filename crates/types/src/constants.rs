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

//! Protocol constants and default deployment parameters.

use alloy_primitives::{address, b256, Address, B256};

/// Smart account factory deployed on all supported chains.
pub const DEFAULT_FACTORY_ADDRESS: Address = address!("0BA5ED0c6AA8c49038F819E587E2633c4A9F428a");

/// keccak256 of the account proxy creation bytecode deployed by the factory.
pub const DEFAULT_ACCOUNT_INIT_CODE_HASH: B256 =
    b256!("5153041b4b8e36c84ca233b2fb610f85b8831b5e56a365618f507f8784fe034e");

/// ERC-4337 v0.6 entry point singleton.
pub const DEFAULT_ENTRY_POINT_ADDRESS: Address =
    address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

/// Pre-verification gas used when the bundler cannot provide an estimate.
/// Subject to [`PRE_VERIFICATION_GAS_MULTIPLIER`] like any bundler estimate.
pub const DEFAULT_PRE_VERIFICATION_GAS: u128 = 70_000;

/// Call gas limit used when the bundler cannot provide an estimate.
pub const DEFAULT_CALL_GAS_LIMIT: u128 = 200_000;

/// Fixed verification gas limit. Generic bundlers systematically underestimate
/// WebAuthn-style owner verification, so the bundler's suggestion is ignored.
pub const VERIFICATION_GAS_LIMIT: u128 = 800_000;

/// Safety multiplier applied to the bundler's pre-verification gas estimate.
pub const PRE_VERIFICATION_GAS_MULTIPLIER: u128 = 2;

/// Gas limit used for legacy value transfers when the caller supplies none.
pub const DEFAULT_LEGACY_GAS_LIMIT: u64 = 21_000;

/// Sentinel returned by the signing authority when the user rejects a request.
pub const DECLINE_SENTINEL: &str = "decline";

/// Message signing scheme requested from the authority by default.
pub const PERSONAL_SIGN: &str = "personal_sign";

/// Length of [`crate::dummy_signature`], sized to the largest WebAuthn
/// signature wrapper the smart account accepts.
pub const DUMMY_SIGNATURE_LENGTH: usize = 512;
