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

//! Client SDK for smart accounts behind a platform signing authority.
//!
//! [`WalletKit`] derives the account's counterfactual address locally,
//! assembles ERC-4337 user operations for single or batched calls, resolves
//! nonce, fees, and gas limits, has them signed by the platform authority,
//! and submits them to a bundler.
//!
//! The send pipeline runs strictly in order: nonce resolution happens before
//! gas estimation, estimation before signing, signing before submission.
//! Address, nonce, and gas price failures abort a send before any signing
//! request reaches the user. A user decline is a result, not an error.

use std::sync::{Arc, RwLock};

use alloy_primitives::{aliases::U192, Address, Bytes, B256, U256};
use anyhow::anyhow;
use metrics::counter;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use walletkit_contracts::account;
use walletkit_provider::{
    new_evm_provider, BundlerProvider, EvmProvider, HttpBundlerClient, JsonRpcResponse,
    ProviderError,
};
use walletkit_signer::{self as signer, SigningGateway};
use walletkit_types::{
    constants::{DEFAULT_LEGACY_GAS_LIMIT, PERSONAL_SIGN},
    Call, ChainSpec, GasEstimate, LegacyTransaction, UserOperation,
};

mod builder;
pub use builder::UserOperationBuilder;

mod error;
pub use error::SdkError;

mod estimation;
pub use estimation::{BundlerGasEstimator, UserOperationGasEstimator};

pub use walletkit_signer::{Responder, SignResult, WalletService};
pub use walletkit_types as types;

/// Terminal result of a send pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The operation was accepted; carries the bundler's operation hash (or
    /// the transaction hash on the legacy path).
    Completed(B256),
    /// The user declined in the signer UI. Expected, not an error.
    Declined,
}

/// Replaces the bundler client for submission, e.g. to relay the signed
/// operation through a different service.
///
/// Implementations return the raw JSON-RPC response body; the pipeline
/// parses it with the same envelope handling as the built-in client.
#[async_trait::async_trait]
pub trait OperationSubmitter: Send + Sync {
    /// Submit the signed operation and return the raw JSON-RPC response.
    async fn submit(&self, op: &UserOperation, entry_point: Address) -> anyhow::Result<String>;
}

/// Providers and spec captured for one chain.
///
/// Every operation snapshots the current context when it starts, so a chain
/// switch never retargets an in-flight request.
struct ChainContext {
    spec: ChainSpec,
    evm: Arc<dyn EvmProvider>,
    bundler: Arc<dyn BundlerProvider>,
    // Factory call deploying the sender, computed once per chain.
    init_code: OnceCell<Bytes>,
}

impl ChainContext {
    fn connect(spec: ChainSpec) -> Result<Self, SdkError> {
        let evm: Arc<dyn EvmProvider> = Arc::new(
            new_evm_provider(&spec.rpc_url).map_err(|err| SdkError::Encoding(err.to_string()))?,
        );
        let bundler: Arc<dyn BundlerProvider> = Arc::new(
            HttpBundlerClient::new(&spec.bundler_url)
                .map_err(|err| SdkError::Encoding(err.to_string()))?,
        );
        Ok(Self::from_parts(spec, evm, bundler))
    }

    fn from_parts(
        spec: ChainSpec,
        evm: Arc<dyn EvmProvider>,
        bundler: Arc<dyn BundlerProvider>,
    ) -> Self {
        Self {
            spec,
            evm,
            bundler,
            init_code: OnceCell::new(),
        }
    }
}

/// The smart account client.
///
/// Owns a session with the platform signing authority and the providers for
/// the active chain. Concurrent sends are independent pipeline runs; the
/// only shared state is the resolved account address and the cached factory
/// call, both of which converge to the same value and are safe to race on.
pub struct WalletKit<S> {
    gateway: SigningGateway<S>,
    context: RwLock<Arc<ChainContext>>,
    // Authority account address, resolved once per session.
    owner: OnceCell<Address>,
    // Counterfactual smart account address, resolved once per session.
    sender: OnceCell<Address>,
    owners_override: Option<Vec<Bytes>>,
    account_nonce: U256,
    gas_estimator: Option<Arc<dyn UserOperationGasEstimator>>,
    submitter: Option<Arc<dyn OperationSubmitter>>,
}

impl<S: WalletService> WalletKit<S> {
    /// Connects to the platform wallet service and the endpoints in `spec`.
    ///
    /// Fails with [`SdkError::SystemUnavailable`] when the platform has no
    /// wallet service; per-call operations never re-check this.
    pub fn new(service: S, spec: ChainSpec) -> Result<Self, SdkError> {
        let context = ChainContext::connect(spec)?;
        Self::with_context(service, context)
    }

    /// Like [`WalletKit::new`] but with caller-supplied providers, for custom
    /// transports and tests.
    pub fn with_providers(
        service: S,
        spec: ChainSpec,
        evm: Arc<dyn EvmProvider>,
        bundler: Arc<dyn BundlerProvider>,
    ) -> Result<Self, SdkError> {
        Self::with_context(service, ChainContext::from_parts(spec, evm, bundler))
    }

    fn with_context(service: S, context: ChainContext) -> Result<Self, SdkError> {
        let gateway = SigningGateway::connect(service).map_err(SdkError::from_gateway)?;
        Ok(Self {
            gateway,
            context: RwLock::new(Arc::new(context)),
            owner: OnceCell::new(),
            sender: OnceCell::new(),
            owners_override: None,
            account_nonce: U256::ZERO,
            gas_estimator: None,
            submitter: None,
        })
    }

    /// Overrides the owner credentials of the smart account. Without this the
    /// single owner is derived from the authority's account address.
    pub fn with_owners(mut self, owners: Vec<Bytes>) -> Self {
        self.owners_override = Some(owners);
        self
    }

    /// Sets the account creation nonce used in the CREATE2 salt.
    pub fn with_account_nonce(mut self, nonce: U256) -> Self {
        self.account_nonce = nonce;
        self
    }

    /// Replaces the bundler-backed gas estimator. The custom estimator's
    /// output is used as-is, without the built-in safety policy.
    pub fn with_gas_estimator(mut self, estimator: Arc<dyn UserOperationGasEstimator>) -> Self {
        self.gas_estimator = Some(estimator);
        self
    }

    /// Replaces the bundler client for submission.
    pub fn with_submitter(mut self, submitter: Arc<dyn OperationSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    /// True if the platform wallet service is still reachable.
    pub fn is_connected(&self) -> bool {
        self.gateway.is_connected()
    }

    /// The session identifier negotiated with the authority.
    pub fn session(&self) -> &str {
        self.gateway.session()
    }

    /// The active chain id.
    pub fn chain_id(&self) -> u64 {
        self.context().spec.id
    }

    /// The smart account address, derived locally via CREATE2. Works before
    /// the account is deployed; cached for the session after the first call.
    #[instrument(skip_all)]
    pub async fn get_address(&self) -> Result<Address, SdkError> {
        if let Some(address) = self.sender.get() {
            return Ok(*address);
        }
        let ctx = self.context();
        let owners = self.owners().await?;
        let address = account::counterfactual_address(
            ctx.spec.factory_address,
            &owners,
            self.account_nonce,
            ctx.spec.account_init_code_hash,
        );
        Ok(*self.sender.get_or_init(|| async move { address }).await)
    }

    /// Asks the factory contract for the account address, as a cross-check
    /// of the local derivation.
    pub async fn on_chain_address(&self) -> Result<Address, SdkError> {
        let ctx = self.context();
        let owners = self.owners().await?;
        ctx.evm
            .get_factory_address(ctx.spec.factory_address, owners, self.account_nonce)
            .await
            .map_err(SdkError::ChainCall)
    }

    /// The account's next entry point nonce (key 0).
    pub async fn get_nonce(&self) -> Result<U256, SdkError> {
        let ctx = self.context();
        let sender = self.get_address().await?;
        ctx.evm
            .get_entry_point_nonce(ctx.spec.entry_point_address, sender, U192::ZERO)
            .await
            .map_err(SdkError::ChainCall)
    }

    /// Sends a single call as a user operation.
    pub async fn send_transaction(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> Result<SendOutcome, SdkError> {
        self.send_batch(
            vec![Call {
                target: to,
                value,
                data,
            }],
            None,
        )
        .await
    }

    /// Sends a batch of calls as one user operation. A caller-supplied
    /// `call_gas_limit` overrides the estimate.
    pub async fn send_batch(
        &self,
        calls: Vec<Call>,
        call_gas_limit: Option<u128>,
    ) -> Result<SendOutcome, SdkError> {
        let outcome = self.send_batch_inner(calls, call_gas_limit).await;
        match &outcome {
            Ok(SendOutcome::Completed(_)) => {
                counter!("walletkit_operations_submitted").increment(1)
            }
            Ok(SendOutcome::Declined) => counter!("walletkit_operations_declined").increment(1),
            Err(_) => counter!("walletkit_operations_failed").increment(1),
        }
        outcome
    }

    #[instrument(skip_all)]
    async fn send_batch_inner(
        &self,
        calls: Vec<Call>,
        call_gas_limit: Option<u128>,
    ) -> Result<SendOutcome, SdkError> {
        let ctx = self.context();
        debug!(chain_id = ctx.spec.id, calls = calls.len(), "building user operation");
        let builder = self.resolve(&ctx, calls).await?;

        debug!("estimating gas");
        let estimate = self
            .estimator(&ctx)
            .estimate(&builder.estimation_draft(), ctx.spec.entry_point_address)
            .await;
        let unsigned = builder.build(estimate, call_gas_limit);

        debug!(nonce = %unsigned.nonce, "awaiting signature");
        let signature = match self
            .gateway
            .sign_user_operation(&unsigned, ctx.spec.id)
            .await?
        {
            SignResult::Declined => return Ok(SendOutcome::Declined),
            SignResult::Fulfilled(signature) => signature.parse::<Bytes>().map_err(|err| {
                SdkError::Signing(signer::Error::InvalidResult(format!(
                    "bad signature encoding: {err}"
                )))
            })?,
        };
        let signed = unsigned.into_signed(signature);

        debug!("submitting user operation");
        let hash = self.submit(&ctx, &signed).await?;
        Ok(SendOutcome::Completed(hash))
    }

    /// Estimates the gas limits a batch would be sent with, without signing
    /// or submitting anything.
    pub async fn estimate_user_operation_gas(
        &self,
        calls: Vec<Call>,
    ) -> Result<GasEstimate, SdkError> {
        let ctx = self.context();
        let builder = self.resolve(&ctx, calls).await?;
        Ok(self
            .estimator(&ctx)
            .estimate(&builder.estimation_draft(), ctx.spec.entry_point_address)
            .await)
    }

    /// Requests a `personal_sign` signature over `message`.
    pub async fn sign_message(&self, message: &str) -> Result<SignResult, SdkError> {
        Ok(self.gateway.sign_message(message, PERSONAL_SIGN).await?)
    }

    /// Signs and broadcasts a pre-4337 transaction from the authority's own
    /// account, for chains without a usable bundler. Nonce and gas price are
    /// resolved from the chain when the caller supplies none.
    #[instrument(skip_all)]
    pub async fn send_legacy_transaction(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
        gas_price: Option<u128>,
        gas_limit: Option<u64>,
    ) -> Result<SendOutcome, SdkError> {
        let ctx = self.context();
        let owner = self.owner_address().await?;
        let nonce = ctx
            .evm
            .get_transaction_count(owner)
            .await
            .map_err(SdkError::ChainCall)?;
        let gas_price = match gas_price {
            Some(gas_price) => gas_price,
            None => ctx.evm.gas_price().await.map_err(SdkError::ChainCall)?,
        };
        let tx = LegacyTransaction {
            to,
            value,
            data,
            nonce,
            gas_price,
            gas_limit: gas_limit.unwrap_or(DEFAULT_LEGACY_GAS_LIMIT),
            chain_id: ctx.spec.id,
        };

        match self.gateway.sign_transaction(&tx).await? {
            SignResult::Declined => Ok(SendOutcome::Declined),
            SignResult::Fulfilled(raw) => {
                let raw = raw.parse::<Bytes>().map_err(|err| {
                    SdkError::Signing(signer::Error::InvalidResult(format!(
                        "bad raw transaction encoding: {err}"
                    )))
                })?;
                let hash = ctx
                    .evm
                    .send_raw_transaction(raw)
                    .await
                    .map_err(SdkError::ChainCall)?;
                Ok(SendOutcome::Completed(hash))
            }
        }
    }

    /// Switches the authority and the SDK to another chain.
    ///
    /// Takes effect for subsequent calls only; operations already in flight
    /// keep the endpoints they captured at start.
    pub async fn switch_chain(&self, spec: ChainSpec) -> Result<SignResult, SdkError> {
        let ack = self.gateway.switch_chain(spec.id).await?;
        if let SignResult::Fulfilled(_) = &ack {
            let context = Arc::new(ChainContext::connect(spec)?);
            let mut slot = match self.context.write() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            *slot = context;
        }
        Ok(ack)
    }

    fn context(&self) -> Arc<ChainContext> {
        match self.context.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn estimator(&self, ctx: &ChainContext) -> Arc<dyn UserOperationGasEstimator> {
        match &self.gas_estimator {
            Some(estimator) => estimator.clone(),
            None => Arc::new(BundlerGasEstimator::new(ctx.bundler.clone())),
        }
    }

    /// Resolves everything a user operation needs ahead of estimation:
    /// sender, nonce, init code, call data, and fees. Any failure here aborts
    /// the send before a signing request is dispatched.
    async fn resolve(
        &self,
        ctx: &ChainContext,
        calls: Vec<Call>,
    ) -> Result<UserOperationBuilder, SdkError> {
        let sender = self.get_address().await?;
        let nonce = ctx
            .evm
            .get_entry_point_nonce(ctx.spec.entry_point_address, sender, U192::ZERO)
            .await
            .map_err(SdkError::ChainCall)?;
        let init_code = self.resolve_init_code(ctx, sender).await?;
        let call_data = account::execute_batch_calldata(calls);
        let fees = ctx
            .bundler
            .get_user_operation_gas_price()
            .await
            .map_err(SdkError::GasPriceUnavailable)?;

        Ok(UserOperationBuilder::new(sender, nonce, call_data, fees).init_code(init_code))
    }

    /// Empty once the sender is deployed; otherwise the factory call, which
    /// is computed once per chain and cached.
    async fn resolve_init_code(
        &self,
        ctx: &ChainContext,
        sender: Address,
    ) -> Result<Bytes, SdkError> {
        if ctx
            .evm
            .is_deployed(sender)
            .await
            .map_err(SdkError::ChainCall)?
        {
            return Ok(Bytes::new());
        }
        let owners = self.owners().await?;
        let account_nonce = self.account_nonce;
        let factory = ctx.spec.factory_address;
        let init_code = ctx
            .init_code
            .get_or_init(|| async move { account::account_init_code(factory, owners, account_nonce) })
            .await;
        Ok(init_code.clone())
    }

    async fn submit(&self, ctx: &ChainContext, op: &UserOperation) -> Result<B256, SdkError> {
        match &self.submitter {
            Some(submitter) => {
                let raw = submitter
                    .submit(op, ctx.spec.entry_point_address)
                    .await
                    .map_err(SdkError::Other)?;
                let envelope: JsonRpcResponse<B256> = serde_json::from_str(&raw).map_err(|err| {
                    SdkError::Submission(ProviderError::Other(anyhow!(
                        "malformed submitter response: {err}"
                    )))
                })?;
                envelope.into_result().map_err(SdkError::Submission)
            }
            None => ctx
                .bundler
                .send_user_operation(op, ctx.spec.entry_point_address)
                .await
                .map_err(SdkError::Submission),
        }
    }

    async fn owners(&self) -> Result<Vec<Bytes>, SdkError> {
        if let Some(owners) = &self.owners_override {
            return Ok(owners.clone());
        }
        let owner = self.owner_address().await?;
        Ok(vec![account::owner_from_address(owner)])
    }

    /// The authority's own account address, resolved once per session.
    async fn owner_address(&self) -> Result<Address, SdkError> {
        self.owner
            .get_or_try_init(|| async {
                match self.gateway.request_address().await? {
                    SignResult::Declined => Err(SdkError::Signing(signer::Error::Service(
                        "address request declined".to_string(),
                    ))),
                    SignResult::Fulfilled(address) => {
                        address.trim().parse::<Address>().map_err(|err| {
                            SdkError::Signing(signer::Error::InvalidResult(format!(
                                "bad address from authority: {err}"
                            )))
                        })
                    }
                }
            })
            .await
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    };

    use alloy_primitives::{address, b256, bytes};
    use walletkit_provider::{MockBundlerProvider, MockEvmProvider};
    use walletkit_signer::MockWalletService;
    use walletkit_types::GasFees;

    use super::*;

    const OP_HASH: B256 =
        b256!("1111111111111111111111111111111111111111111111111111111111111111");

    fn test_spec() -> ChainSpec {
        ChainSpec::new(
            8453,
            "http://localhost:8545",
            "http://localhost:4337",
        )
    }

    fn connected_service() -> MockWalletService {
        let mut service = MockWalletService::new();
        service.expect_is_connected().return_const(true);
        service
            .expect_create_session()
            .returning(|| Ok("session-1".to_string()));
        service
            .expect_request_address()
            .returning(|_, responder| {
                responder.fulfill("0x1306b01bc3e4ad202612d3843387e94737673f53");
                Ok(())
            });
        service
    }

    fn signing_service(result: &'static str) -> MockWalletService {
        let mut service = connected_service();
        service
            .expect_sign_user_operation()
            .returning(move |_, _, _, responder| {
                responder.fulfill(result);
                Ok(())
            });
        service
    }

    fn ready_evm() -> MockEvmProvider {
        let mut evm = MockEvmProvider::new();
        evm.expect_is_deployed().returning(|_| Ok(true));
        evm.expect_get_entry_point_nonce()
            .returning(|_, _, _| Ok(U256::ZERO));
        evm
    }

    fn ready_bundler(submitted: Arc<Mutex<Vec<UserOperation>>>) -> MockBundlerProvider {
        let mut bundler = MockBundlerProvider::new();
        bundler.expect_get_user_operation_gas_price().returning(|| {
            Ok(GasFees {
                max_fee_per_gas: 1_000_000_000,
                max_priority_fee_per_gas: 100_000_000,
            })
        });
        bundler
            .expect_estimate_user_operation_gas()
            .returning(|_, _| {
                Ok(GasEstimate {
                    pre_verification_gas: 10_000,
                    verification_gas_limit: 50_000,
                    call_gas_limit: 42_000,
                })
            });
        bundler
            .expect_send_user_operation()
            .returning(move |op, _| {
                submitted.lock().unwrap().push(op.clone());
                Ok(OP_HASH)
            });
        bundler
    }

    fn kit(
        service: MockWalletService,
        evm: MockEvmProvider,
        bundler: MockBundlerProvider,
    ) -> WalletKit<MockWalletService> {
        WalletKit::with_providers(service, test_spec(), Arc::new(evm), Arc::new(bundler)).unwrap()
    }

    #[tokio::test]
    async fn test_send_transaction_completes() {
        let submitted = Arc::new(Mutex::new(Vec::new()));
        let kit = kit(
            signing_service("0xd00d"),
            ready_evm(),
            ready_bundler(submitted.clone()),
        );

        let outcome = kit
            .send_transaction(
                address!("00000000000000000000000000000000deadbeef"),
                U256::from(1),
                Bytes::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Completed(OP_HASH));

        let ops = submitted.lock().unwrap();
        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert_eq!(op.signature, bytes!("d00d"));
        assert!(op.init_code.is_empty());
        // Estimation policy applied: doubled pre-verification gas, pinned
        // verification limit, bundler call gas.
        assert_eq!(op.pre_verification_gas, alloy_primitives::U128::from(20_000));
        assert_eq!(
            op.verification_gas_limit,
            alloy_primitives::U128::from(800_000)
        );
        assert_eq!(op.call_gas_limit, alloy_primitives::U128::from(42_000));
    }

    #[tokio::test]
    async fn test_decline_short_circuits_submission() {
        let mut bundler = MockBundlerProvider::new();
        bundler.expect_get_user_operation_gas_price().returning(|| {
            Ok(GasFees {
                max_fee_per_gas: 1,
                max_priority_fee_per_gas: 1,
            })
        });
        bundler
            .expect_estimate_user_operation_gas()
            .returning(|_, _| Ok(GasEstimate::static_default()));
        bundler.expect_send_user_operation().times(0);

        let kit = kit(signing_service("decline"), ready_evm(), bundler);
        let outcome = kit
            .send_transaction(Address::ZERO, U256::ZERO, Bytes::new())
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Declined);
    }

    #[tokio::test]
    async fn test_gas_price_failure_aborts_before_signing() {
        let mut bundler = MockBundlerProvider::new();
        bundler
            .expect_get_user_operation_gas_price()
            .returning(|| {
                Err(ProviderError::JsonRpc {
                    code: -32603,
                    message: "oracle down".to_string(),
                })
            });
        // No sign_user_operation expectation: dispatching a signing request
        // here would fail the test.
        let kit = kit(connected_service(), ready_evm(), bundler);

        let err = kit
            .send_transaction(Address::ZERO, U256::ZERO, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::GasPriceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_sequential_sends_use_fresh_increasing_nonces() {
        let mut evm = MockEvmProvider::new();
        evm.expect_is_deployed().returning(|_| Ok(true));
        let next_nonce = AtomicU64::new(0);
        evm.expect_get_entry_point_nonce()
            .returning(move |_, _, _| Ok(U256::from(next_nonce.fetch_add(1, Ordering::SeqCst))));

        let submitted = Arc::new(Mutex::new(Vec::new()));
        let kit = kit(
            signing_service("0xd00d"),
            evm,
            ready_bundler(submitted.clone()),
        );

        for _ in 0..2 {
            kit.send_transaction(Address::ZERO, U256::ZERO, Bytes::new())
                .await
                .unwrap();
        }

        let ops = submitted.lock().unwrap();
        assert_eq!(ops[0].nonce, U256::ZERO);
        assert_eq!(ops[1].nonce, U256::from(1));
    }

    #[tokio::test]
    async fn test_undeployed_sender_carries_init_code() {
        let mut evm = MockEvmProvider::new();
        evm.expect_is_deployed().returning(|_| Ok(false));
        evm.expect_get_entry_point_nonce()
            .returning(|_, _, _| Ok(U256::ZERO));

        let submitted = Arc::new(Mutex::new(Vec::new()));
        let kit = kit(
            signing_service("0xd00d"),
            evm,
            ready_bundler(submitted.clone()),
        );

        kit.send_transaction(Address::ZERO, U256::ZERO, Bytes::new())
            .await
            .unwrap();

        let ops = submitted.lock().unwrap();
        let init_code = &ops[0].init_code;
        assert_eq!(&init_code[..20], test_spec().factory_address.as_slice());
    }

    #[tokio::test]
    async fn test_custom_submitter_response_parsed_uniformly() {
        struct CannedRelay(&'static str);

        #[async_trait::async_trait]
        impl OperationSubmitter for CannedRelay {
            async fn submit(&self, _: &UserOperation, _: Address) -> anyhow::Result<String> {
                Ok(self.0.to_string())
            }
        }

        let mut bundler = MockBundlerProvider::new();
        bundler.expect_get_user_operation_gas_price().returning(|| {
            Ok(GasFees {
                max_fee_per_gas: 1,
                max_priority_fee_per_gas: 1,
            })
        });
        bundler
            .expect_estimate_user_operation_gas()
            .returning(|_, _| Ok(GasEstimate::static_default()));
        bundler.expect_send_user_operation().times(0);

        let kit = kit(signing_service("0xd00d"), ready_evm(), bundler).with_submitter(Arc::new(
            CannedRelay(
                r#"{"jsonrpc":"2.0","id":1,"result":"0x1111111111111111111111111111111111111111111111111111111111111111"}"#,
            ),
        ));
        let outcome = kit
            .send_transaction(Address::ZERO, U256::ZERO, Bytes::new())
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Completed(OP_HASH));

        let kit = kit_with_relay_error();
        let err = kit
            .send_transaction(Address::ZERO, U256::ZERO, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Submission(_)));
    }

    fn kit_with_relay_error() -> WalletKit<MockWalletService> {
        struct FailingRelay;

        #[async_trait::async_trait]
        impl OperationSubmitter for FailingRelay {
            async fn submit(&self, _: &UserOperation, _: Address) -> anyhow::Result<String> {
                Ok(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32500,"message":"replacement underpriced"}}"#.to_string())
            }
        }

        let mut bundler = MockBundlerProvider::new();
        bundler.expect_get_user_operation_gas_price().returning(|| {
            Ok(GasFees {
                max_fee_per_gas: 1,
                max_priority_fee_per_gas: 1,
            })
        });
        bundler
            .expect_estimate_user_operation_gas()
            .returning(|_, _| Ok(GasEstimate::static_default()));

        kit(signing_service("0xd00d"), ready_evm(), bundler).with_submitter(Arc::new(FailingRelay))
    }

    #[tokio::test]
    async fn test_system_unavailable_at_construction() {
        let mut service = MockWalletService::new();
        service.expect_is_connected().return_const(false);

        let result = WalletKit::with_providers(
            service,
            test_spec(),
            Arc::new(MockEvmProvider::new()),
            Arc::new(MockBundlerProvider::new()),
        );
        assert!(matches!(result, Err(SdkError::SystemUnavailable)));
    }

    #[tokio::test]
    async fn test_get_address_is_deterministic_and_cached() {
        let kit = kit(
            connected_service(),
            MockEvmProvider::new(),
            MockBundlerProvider::new(),
        );
        let first = kit.get_address().await.unwrap();
        let second = kit.get_address().await.unwrap();
        assert_eq!(first, second);
        assert_ne!(first, Address::ZERO);
    }

    #[tokio::test]
    async fn test_sign_message_round_trip() {
        let mut service = connected_service();
        service
            .expect_sign_message()
            .withf(|_, message, scheme, _| message == "hello" && scheme == "personal_sign")
            .returning(|_, _, _, responder| {
                responder.fulfill("0xabcd");
                Ok(())
            });

        let kit = kit(service, MockEvmProvider::new(), MockBundlerProvider::new());
        assert_eq!(
            kit.sign_message("hello").await.unwrap(),
            SignResult::Fulfilled("0xabcd".to_string())
        );
    }

    #[tokio::test]
    async fn test_legacy_send_resolves_nonce_and_gas_price() {
        let mut evm = MockEvmProvider::new();
        evm.expect_get_transaction_count().returning(|_| Ok(7));
        evm.expect_gas_price().returning(|| Ok(1_000_000_000));
        evm.expect_send_raw_transaction()
            .returning(|_| Ok(OP_HASH));

        let mut service = connected_service();
        service
            .expect_sign_transaction()
            .withf(|_, tx, _| {
                tx.nonce == 7 && tx.gas_price == 1_000_000_000 && tx.chain_id == 8453
            })
            .returning(|_, _, responder| {
                responder.fulfill("0xf86b8085e8d4a51000");
                Ok(())
            });

        let kit = kit(service, evm, MockBundlerProvider::new());
        let outcome = kit
            .send_legacy_transaction(
                address!("00000000000000000000000000000000deadbeef"),
                U256::from(1_000_000_000_000_000_000u128),
                Bytes::new(),
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Completed(OP_HASH));
    }
}
