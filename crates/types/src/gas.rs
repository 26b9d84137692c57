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

//! Gas fee and gas limit types.

use crate::constants::{
    DEFAULT_CALL_GAS_LIMIT, DEFAULT_PRE_VERIFICATION_GAS, PRE_VERIFICATION_GAS_MULTIPLIER,
    VERIFICATION_GAS_LIMIT,
};

/// EIP-1559 fee pair for a user operation, in wei per gas unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasFees {
    /// Maximum total fee per gas unit.
    pub max_fee_per_gas: u128,
    /// Maximum priority fee per gas unit.
    pub max_priority_fee_per_gas: u128,
}

/// Gas limits for the three phases of a user operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasEstimate {
    /// Gas paid up front to compensate the bundler for calldata and overhead.
    pub pre_verification_gas: u128,
    /// Gas limit for the account (and paymaster) validation step.
    pub verification_gas_limit: u128,
    /// Gas limit for the account execution step.
    pub call_gas_limit: u128,
}

impl GasEstimate {
    /// The static limits used when the bundler cannot estimate. Estimation
    /// failure degrades gas headroom, it never aborts a send.
    pub fn static_default() -> Self {
        Self {
            pre_verification_gas: DEFAULT_PRE_VERIFICATION_GAS * PRE_VERIFICATION_GAS_MULTIPLIER,
            verification_gas_limit: VERIFICATION_GAS_LIMIT,
            call_gas_limit: DEFAULT_CALL_GAS_LIMIT,
        }
    }
}
