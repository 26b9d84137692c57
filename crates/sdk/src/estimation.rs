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

//! Gas limit resolution for user operations.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::warn;
use walletkit_provider::BundlerProvider;
use walletkit_types::{
    constants::{PRE_VERIFICATION_GAS_MULTIPLIER, VERIFICATION_GAS_LIMIT},
    GasEstimate, UserOperation,
};

/// Produces the gas limits for an unsigned operation.
///
/// A caller-supplied implementation replaces the bundler-backed estimator
/// entirely; its output is taken as authoritative and is not adjusted.
#[async_trait::async_trait]
pub trait UserOperationGasEstimator: Send + Sync {
    /// Estimate gas limits for `op` against `entry_point`. Infallible by
    /// contract: implementations degrade to safe defaults rather than fail.
    async fn estimate(&self, op: &UserOperation, entry_point: Address) -> GasEstimate;
}

/// Default estimator: asks the bundler, then applies the safety policy.
///
/// The bundler's pre-verification estimate is doubled and its verification
/// gas suggestion is discarded in favor of the fixed
/// [`VERIFICATION_GAS_LIMIT`] floor, since generic bundlers underestimate
/// WebAuthn-style owner verification. Any estimation failure degrades
/// silently to [`GasEstimate::static_default`]: a send must not abort because
/// estimation was unavailable.
pub struct BundlerGasEstimator {
    bundler: Arc<dyn BundlerProvider>,
}

impl BundlerGasEstimator {
    /// Create a new estimator on top of `bundler`.
    pub fn new(bundler: Arc<dyn BundlerProvider>) -> Self {
        Self { bundler }
    }
}

#[async_trait::async_trait]
impl UserOperationGasEstimator for BundlerGasEstimator {
    async fn estimate(&self, op: &UserOperation, entry_point: Address) -> GasEstimate {
        match self.bundler.estimate_user_operation_gas(op, entry_point).await {
            Ok(raw) => GasEstimate {
                pre_verification_gas: raw
                    .pre_verification_gas
                    .saturating_mul(PRE_VERIFICATION_GAS_MULTIPLIER),
                verification_gas_limit: VERIFICATION_GAS_LIMIT,
                call_gas_limit: raw.call_gas_limit,
            },
            Err(error) => {
                warn!(%error, "user operation gas estimation failed, using static defaults");
                GasEstimate::static_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use walletkit_provider::{MockBundlerProvider, ProviderError};

    use super::*;

    #[tokio::test]
    async fn test_doubles_pre_verification_and_pins_verification() {
        let mut bundler = MockBundlerProvider::new();
        bundler
            .expect_estimate_user_operation_gas()
            .returning(|_, _| {
                Ok(GasEstimate {
                    pre_verification_gas: 0x2710, // 10_000
                    verification_gas_limit: 50_000,
                    call_gas_limit: 123_456,
                })
            });

        let estimate = BundlerGasEstimator::new(Arc::new(bundler))
            .estimate(&UserOperation::default(), Address::ZERO)
            .await;

        assert_eq!(estimate.pre_verification_gas, 20_000);
        // The bundler's verification suggestion is ignored.
        assert_eq!(estimate.verification_gas_limit, 800_000);
        assert_eq!(estimate.call_gas_limit, 123_456);
    }

    #[tokio::test]
    async fn test_falls_back_to_static_defaults_on_error() {
        let mut bundler = MockBundlerProvider::new();
        bundler
            .expect_estimate_user_operation_gas()
            .returning(|_, _| {
                Err(ProviderError::JsonRpc {
                    code: -32602,
                    message: "invalid user operation".to_string(),
                })
            });

        let estimate = BundlerGasEstimator::new(Arc::new(bundler))
            .estimate(&UserOperation::default(), Address::ZERO)
            .await;

        assert_eq!(
            (
                estimate.pre_verification_gas,
                estimate.verification_gas_limit,
                estimate.call_gas_limit,
            ),
            (140_000, 800_000, 200_000)
        );
    }
}
