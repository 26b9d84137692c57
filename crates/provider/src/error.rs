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

use alloy_transport::TransportError;

/// Error enumeration for the providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// JSON-RPC error response from the node or bundler.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the remote.
        message: String,
    },
    /// Transport failure talking to the node.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// HTTP failure talking to the bundler.
    #[error("bundler transport error: {0}")]
    BundlerTransport(#[from] reqwest::Error),
    /// Contract return data could not be decoded.
    #[error("failed to decode contract return data: {0}")]
    Decode(#[from] alloy_sol_types::Error),
    /// Internal errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
