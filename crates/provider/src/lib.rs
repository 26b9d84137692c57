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

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! WalletKit providers.
//!
//! Remote data access behind two traits: [`EvmProvider`] for read-only chain
//! state and raw transaction broadcast, and [`BundlerProvider`] for the
//! ERC-4337 bundler's JSON-RPC surface. Both are mockable with the
//! `test-utils` feature.

mod error;
pub use error::{ProviderError, ProviderResult};

mod evm;
#[cfg(feature = "test-utils")]
pub use evm::MockEvmProvider;
pub use evm::{new_evm_provider, AlloyEvmProvider, EvmProvider};

mod bundler;
#[cfg(feature = "test-utils")]
pub use bundler::MockBundlerProvider;
pub use bundler::{
    BundlerProvider, HttpBundlerClient, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
};
