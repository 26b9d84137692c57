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

use tokio::sync::oneshot;
use tracing::instrument;
use walletkit_types::{constants::DECLINE_SENTINEL, LegacyTransaction, UserOperation};

use crate::{response_channel, Error, SignResult, WalletService};

/// Awaitable facade over the [`WalletService`].
///
/// One request maps to one [`crate::Responder`]; each awaiting method
/// resolves exactly once with `Fulfilled`, `Declined`, or an error. Dropping
/// the returned future cancels the wait, after which a late callback from the
/// authority is discarded by the responder's guard.
pub struct SigningGateway<S> {
    service: S,
    session: String,
}

impl<S: WalletService> SigningGateway<S> {
    /// Connects to the service and establishes a session. Fails with
    /// [`Error::ServiceUnavailable`] when the platform has no wallet service.
    pub fn connect(service: S) -> Result<Self, Error> {
        if !service.is_connected() {
            return Err(Error::ServiceUnavailable);
        }
        let session = service.create_session()?;
        Ok(Self { service, session })
    }

    /// The session identifier negotiated at construction.
    pub fn session(&self) -> &str {
        &self.session
    }

    /// True if the service is still reachable.
    pub fn is_connected(&self) -> bool {
        self.service.is_connected()
    }

    /// Resolve the authority's account address.
    pub async fn request_address(&self) -> Result<SignResult, Error> {
        let (responder, rx) = response_channel();
        self.service.request_address(&self.session, responder)?;
        Self::await_result(rx).await
    }

    /// Send `op` to the authority for signing on `chain_id` and await the
    /// signature.
    #[instrument(skip(self, op))]
    pub async fn sign_user_operation(
        &self,
        op: &UserOperation,
        chain_id: u64,
    ) -> Result<SignResult, Error> {
        let payload = serde_json::to_string(op)?;
        let (responder, rx) = response_channel();
        self.service
            .sign_user_operation(&self.session, &payload, chain_id, responder)?;
        Self::await_result(rx).await
    }

    /// Request a message signature.
    pub async fn sign_message(&self, message: &str, scheme: &str) -> Result<SignResult, Error> {
        let (responder, rx) = response_channel();
        self.service
            .sign_message(&self.session, message, scheme, responder)?;
        Self::await_result(rx).await
    }

    /// Request a signed raw transaction for the legacy send path.
    pub async fn sign_transaction(&self, tx: &LegacyTransaction) -> Result<SignResult, Error> {
        let (responder, rx) = response_channel();
        self.service
            .sign_transaction(&self.session, tx, responder)?;
        Self::await_result(rx).await
    }

    /// Ask the authority to switch its active chain.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<SignResult, Error> {
        let (responder, rx) = response_channel();
        self.service
            .switch_chain(&self.session, chain_id, responder)?;
        Self::await_result(rx).await
    }

    async fn await_result(rx: oneshot::Receiver<String>) -> Result<SignResult, Error> {
        match rx.await {
            Ok(value) if value == DECLINE_SENTINEL => Ok(SignResult::Declined),
            Ok(value) => Ok(SignResult::Fulfilled(value)),
            // The adapter dropped the responder without fulfilling it.
            Err(_) => Err(Error::NoResult),
        }
    }
}
