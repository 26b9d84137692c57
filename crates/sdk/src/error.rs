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

use walletkit_provider::ProviderError;

/// Error type for the SDK.
///
/// A user decline is not represented here: it is an expected action and is
/// returned as a value (see [`crate::SendOutcome::Declined`]).
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// No platform wallet service exists on this system. Raised at
    /// construction time, never per call.
    #[error("no system wallet service available")]
    SystemUnavailable,
    /// Malformed configuration or caller input.
    #[error("encoding error: {0}")]
    Encoding(String),
    /// A chain read failed.
    #[error("chain call failed: {0}")]
    ChainCall(#[source] ProviderError),
    /// The bundler's gas price oracle was unreachable or malformed. Fatal:
    /// fee levels cannot be safely defaulted.
    #[error("bundler gas price unavailable: {0}")]
    GasPriceUnavailable(#[source] ProviderError),
    /// The signing authority failed to produce a usable result.
    #[error("signing failed: {0}")]
    Signing(#[from] walletkit_signer::Error),
    /// The bundler (or custom relay) rejected the signed operation.
    #[error("submission failed: {0}")]
    Submission(#[source] ProviderError),
    /// Internal errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SdkError {
    /// Maps gateway construction failures, folding a missing service into
    /// [`SdkError::SystemUnavailable`].
    pub(crate) fn from_gateway(err: walletkit_signer::Error) -> Self {
        match err {
            walletkit_signer::Error::ServiceUnavailable => SdkError::SystemUnavailable,
            err => SdkError::Signing(err),
        }
    }
}
