use crate::config::Config;
use crate::error::AnalysisError;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Executes one JSON-RPC method against the node and returns its `result`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait RpcGateway: Send + Sync {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, AnalysisError>;
}

/// USD price lookup keyed by the price API's coin identifier.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait PriceGateway: Send + Sync {
    async fn usd_price(&self, id: &str) -> Result<f64, AnalysisError>;
}

fn http_client(config: &Config) -> Result<Client, AnalysisError> {
    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| AnalysisError::Config(format!("failed to build HTTP client: {}", e)))
}

pub struct HttpRpcGateway {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcGateway {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: http_client(config)?,
            url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcGateway for HttpRpcGateway {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, AnalysisError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let start_time = Instant::now();
        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Transport(format!("{} returned HTTP {}", method, status)));
        }
        let body: Value = response.json().await?;
        debug!("{} (id {}) answered in {:?}", method, id, start_time.elapsed());

        unwrap_envelope(method, body)
    }
}

/// Splits a JSON-RPC envelope into its result or its error message.
fn unwrap_envelope(method: &str, mut body: Value) -> Result<Value, AnalysisError> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AnalysisError::Rpc(format!("{}: {}", method, message)));
    }
    match body.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(AnalysisError::Rpc(format!("{}: response carried no result", method))),
    }
}

pub struct CoinGeckoPriceGateway {
    client: Client,
    url: String,
}

impl CoinGeckoPriceGateway {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: http_client(config)?,
            url: config.price_api_url.clone(),
        })
    }
}

#[async_trait]
impl PriceGateway for CoinGeckoPriceGateway {
    async fn usd_price(&self, id: &str) -> Result<f64, AnalysisError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AnalysisError::Transport(format!(
                "price lookup for {} returned HTTP {}",
                id,
                response.status()
            )));
        }
        let body: Value = response.json().await?;
        body.get(id)
            .and_then(|entry| entry.get("usd"))
            .and_then(Value::as_f64)
            .ok_or_else(|| AnalysisError::NotFound(format!("no USD price for {}", id)))
    }
}
