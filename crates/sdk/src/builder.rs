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
use walletkit_types::{dummy_signature, GasEstimate, GasFees, UserOperation};

/// Assembles the two drafts of a user operation from resolved inputs.
///
/// The estimation draft carries zeroed gas limits and the maximally sized
/// placeholder signature, so the encoded size seen by the bundler's estimator
/// matches the eventual signed operation. The final draft carries the
/// resolved gas limits and an empty signature; it is what goes to the signer.
#[derive(Clone, Debug)]
pub struct UserOperationBuilder {
    sender: Address,
    nonce: U256,
    init_code: Bytes,
    call_data: Bytes,
    fees: GasFees,
}

impl UserOperationBuilder {
    /// Starts a builder for a deployed sender (empty init code).
    pub fn new(sender: Address, nonce: U256, call_data: Bytes, fees: GasFees) -> Self {
        Self {
            sender,
            nonce,
            init_code: Bytes::new(),
            call_data,
            fees,
        }
    }

    /// Sets the init code deploying the sender on its first operation.
    pub fn init_code(mut self, init_code: Bytes) -> Self {
        self.init_code = init_code;
        self
    }

    /// The draft submitted to gas estimation. Its placeholder signature must
    /// never be submitted.
    pub fn estimation_draft(&self) -> UserOperation {
        UserOperation {
            sender: self.sender,
            nonce: self.nonce,
            init_code: self.init_code.clone(),
            call_data: self.call_data.clone(),
            call_gas_limit: U128::ZERO,
            verification_gas_limit: U128::ZERO,
            pre_verification_gas: U128::ZERO,
            max_fee_per_gas: U128::from(self.fees.max_fee_per_gas),
            max_priority_fee_per_gas: U128::from(self.fees.max_priority_fee_per_gas),
            paymaster_and_data: Bytes::new(),
            signature: dummy_signature(),
        }
    }

    /// The unsigned final draft. A caller-supplied `call_gas_limit` overrides
    /// the estimate; the verification and pre-verification limits are policy
    /// and never caller-overridable.
    pub fn build(self, estimate: GasEstimate, call_gas_limit: Option<u128>) -> UserOperation {
        UserOperation {
            sender: self.sender,
            nonce: self.nonce,
            init_code: self.init_code,
            call_data: self.call_data,
            call_gas_limit: U128::from(call_gas_limit.unwrap_or(estimate.call_gas_limit)),
            verification_gas_limit: U128::from(estimate.verification_gas_limit),
            pre_verification_gas: U128::from(estimate.pre_verification_gas),
            max_fee_per_gas: U128::from(self.fees.max_fee_per_gas),
            max_priority_fee_per_gas: U128::from(self.fees.max_priority_fee_per_gas),
            paymaster_and_data: Bytes::new(),
            signature: Bytes::new(),
        }
    }
}
