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

//! JSON-RPC client for the ERC-4337 bundler.

use alloy_primitives::{Address, B256, U128};
use anyhow::{anyhow, Context};
#[cfg(feature = "test-utils")]
use mockall::automock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;
use walletkit_types::{GasEstimate, GasFees, UserOperation};

use crate::{ProviderError, ProviderResult};

/// The bundler's JSON-RPC surface. Raw results only: gas safety policy is
/// applied by the caller.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait BundlerProvider: Send + Sync {
    /// Fetches the `"fast"` tier of `pimlico_getUserOperationGasPrice`.
    async fn get_user_operation_gas_price(&self) -> ProviderResult<GasFees>;

    /// `eth_estimateUserOperationGas` for `op` against `entry_point`.
    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> ProviderResult<GasEstimate>;

    /// `eth_sendUserOperation`, returning the operation hash.
    async fn send_user_operation(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> ProviderResult<B256>;
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<P> {
    jsonrpc: &'static str,
    method: String,
    params: P,
    id: u64,
}

impl<P> JsonRpcRequest<P> {
    /// Build a request for `method` with `params`.
    pub fn new(method: impl Into<String>, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id: 1,
        }
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<R> {
    result: Option<R>,
    error: Option<JsonRpcError>,
}

/// The `error` member of a JSON-RPC response.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    /// JSON-RPC error code.
    pub code: i64,
    /// Error message from the remote.
    pub message: String,
}

impl<R> JsonRpcResponse<R> {
    /// Unwraps the envelope into its result, mapping an `error` member to
    /// [`ProviderError::JsonRpc`].
    pub fn into_result(self) -> ProviderResult<R> {
        if let Some(error) = self.error {
            return Err(ProviderError::JsonRpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| anyhow!("JSON-RPC response carries neither result nor error").into())
    }
}

#[derive(Debug, Deserialize)]
struct GasPriceTiers {
    fast: FeeTier,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeeTier {
    max_fee_per_gas: U128,
    max_priority_fee_per_gas: U128,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcGasEstimate {
    pre_verification_gas: U128,
    verification_gas_limit: U128,
    call_gas_limit: U128,
}

/// HTTP [`BundlerProvider`].
#[derive(Clone, Debug)]
pub struct HttpBundlerClient {
    client: reqwest::Client,
    url: Url,
}

impl HttpBundlerClient {
    /// Create a new client for the bundler at `url`.
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url).context("invalid bundler url")?,
        })
    }

    async fn request<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> ProviderResult<R> {
        tracing::debug!(method, "bundler request");
        let response = self
            .client
            .post(self.url.clone())
            .json(&JsonRpcRequest::new(method, params))
            .send()
            .await?
            .error_for_status()?;
        let envelope: JsonRpcResponse<R> = response.json().await?;
        envelope.into_result()
    }
}

#[async_trait::async_trait]
impl BundlerProvider for HttpBundlerClient {
    async fn get_user_operation_gas_price(&self) -> ProviderResult<GasFees> {
        let tiers: GasPriceTiers = self
            .request("pimlico_getUserOperationGasPrice", [(); 0])
            .await?;
        Ok(GasFees {
            max_fee_per_gas: tiers.fast.max_fee_per_gas.to(),
            max_priority_fee_per_gas: tiers.fast.max_priority_fee_per_gas.to(),
        })
    }

    async fn estimate_user_operation_gas(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> ProviderResult<GasEstimate> {
        let estimate: RpcGasEstimate = self
            .request("eth_estimateUserOperationGas", (op, entry_point))
            .await?;
        Ok(GasEstimate {
            pre_verification_gas: estimate.pre_verification_gas.to(),
            verification_gas_limit: estimate.verification_gas_limit.to(),
            call_gas_limit: estimate.call_gas_limit.to(),
        })
    }

    async fn send_user_operation(
        &self,
        op: &UserOperation,
        entry_point: Address,
    ) -> ProviderResult<B256> {
        self.request("eth_sendUserOperation", (op, entry_point))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use alloy_primitives::b256;
    use tiny_http::{Response, Server};

    use super::*;

    fn serve_one(body: &'static str) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let url = format!("http://{}", server.server_addr().to_ip().unwrap());
        thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(Response::from_string(body).with_header(
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .unwrap(),
                ));
            }
        });
        url
    }

    #[tokio::test]
    async fn test_gas_price_fast_tier() {
        let url = serve_one(
            r#"{"jsonrpc":"2.0","id":1,"result":{
                "slow":{"maxFeePerGas":"0x1","maxPriorityFeePerGas":"0x1"},
                "standard":{"maxFeePerGas":"0x2","maxPriorityFeePerGas":"0x2"},
                "fast":{"maxFeePerGas":"0x3b9aca00","maxPriorityFeePerGas":"0x5f5e100"}
            }}"#,
        );
        let client = HttpBundlerClient::new(&url).unwrap();
        let fees = client.get_user_operation_gas_price().await.unwrap();
        assert_eq!(
            fees,
            GasFees {
                max_fee_per_gas: 1_000_000_000,
                max_priority_fee_per_gas: 100_000_000,
            }
        );
    }

    #[tokio::test]
    async fn test_send_user_operation_returns_hash() {
        let url = serve_one(
            r#"{"jsonrpc":"2.0","id":1,"result":
                "0x1111111111111111111111111111111111111111111111111111111111111111"}"#,
        );
        let client = HttpBundlerClient::new(&url).unwrap();
        let hash = client
            .send_user_operation(&UserOperation::default(), Address::ZERO)
            .await
            .unwrap();
        assert_eq!(
            hash,
            b256!("1111111111111111111111111111111111111111111111111111111111111111")
        );
    }

    #[tokio::test]
    async fn test_error_envelope_surfaces_bundler_message() {
        let url = serve_one(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32500,"message":"AA21 didn't pay prefund"}}"#,
        );
        let client = HttpBundlerClient::new(&url).unwrap();
        let err = client
            .send_user_operation(&UserOperation::default(), Address::ZERO)
            .await
            .unwrap_err();
        match err {
            ProviderError::JsonRpc { code, message } => {
                assert_eq!(code, -32500);
                assert!(message.contains("AA21"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_response_without_result_or_error_is_rejected() {
        let envelope: JsonRpcResponse<B256> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(envelope.into_result().is_err());
    }
}
