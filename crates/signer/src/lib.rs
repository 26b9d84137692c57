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

//! The boundary to the platform signing authority.
//!
//! The authority owns the private keys. This crate models it as a narrow
//! [`WalletService`] trait plus a [`SigningGateway`] that bridges its
//! callback-style result delivery into awaitable one-shot channels with
//! at-most-once semantics.

use std::sync::{Arc, Mutex};

#[cfg(feature = "test-utils")]
use mockall::automock;
use tokio::sync::oneshot;
use walletkit_types::LegacyTransaction;

mod gateway;
pub use gateway::SigningGateway;

/// Error type for the signer crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform wallet service is not present on this system.
    #[error("platform wallet service unavailable")]
    ServiceUnavailable,
    /// The service rejected a session or request dispatch.
    #[error("wallet service error: {0}")]
    Service(String),
    /// The authority finished without delivering a result.
    #[error("signing request completed without a result")]
    NoResult,
    /// The authority delivered a payload that could not be decoded.
    #[error("signer returned an unusable result: {0}")]
    InvalidResult(String),
    /// A request payload could not be serialized.
    #[error("failed to encode signing payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Outcome of one signing request.
///
/// A decline is a deliberate user action, not a fault: callers must branch on
/// it rather than treat it as an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignResult {
    /// The authority produced a result payload (an address, a signature, or a
    /// signed raw transaction, hex-encoded).
    Fulfilled(String),
    /// The user declined the request.
    Declined,
}

/// One-shot completion handle handed to the platform adapter with every
/// request.
///
/// The underlying platform callback is not contractually single-fire, so the
/// handle guards delivery explicitly: only the first [`Responder::fulfill`]
/// reaches the awaiting caller, and fulfilling after the caller cancelled is
/// a no-op.
#[derive(Clone, Debug)]
pub struct Responder {
    tx: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

impl Responder {
    /// Deliver the authority's result. Returns `false` if the result was
    /// already delivered or the caller is no longer waiting.
    pub fn fulfill(&self, result: impl Into<String>) -> bool {
        let mut slot = match self.tx.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        match slot.take() {
            Some(tx) => tx.send(result.into()).is_ok(),
            None => false,
        }
    }
}

/// Creates a responder and the receiver the gateway awaits.
pub fn response_channel() -> (Responder, oneshot::Receiver<String>) {
    let (tx, rx) = oneshot::channel();
    (
        Responder {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        rx,
    )
}

/// The platform wallet service.
///
/// Implemented by a platform-specific adapter; request dispatch is
/// synchronous, results arrive later through the [`Responder`].
#[cfg_attr(feature = "test-utils", automock)]
pub trait WalletService: Send + Sync {
    /// True if the service is reachable on this system.
    fn is_connected(&self) -> bool;

    /// Establish a session with the service.
    fn create_session(&self) -> Result<String, Error>;

    /// Request the authority's account address.
    fn request_address(&self, session: &str, responder: Responder) -> Result<(), Error>;

    /// Dispatch a serialized unsigned user operation for signing on
    /// `chain_id`.
    fn sign_user_operation(
        &self,
        session: &str,
        user_op_json: &str,
        chain_id: u64,
        responder: Responder,
    ) -> Result<(), Error>;

    /// Request a message signature under the given scheme.
    fn sign_message(
        &self,
        session: &str,
        message: &str,
        scheme: &str,
        responder: Responder,
    ) -> Result<(), Error>;

    /// Request a fully signed raw transaction for the legacy send path.
    fn sign_transaction(
        &self,
        session: &str,
        tx: &LegacyTransaction,
        responder: Responder,
    ) -> Result<(), Error>;

    /// Ask the authority to switch its active chain.
    fn switch_chain(&self, session: &str, chain_id: u64, responder: Responder)
        -> Result<(), Error>;
}
