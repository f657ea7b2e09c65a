use crate::error::AnalysisError;
use crate::gateway::RpcGateway;
use crate::json::page_data;
use serde_json::{json, Value};
use std::sync::Arc;

pub mod method {
    pub const GET_ALL_COINS: &str = "suix_getAllCoins";
    pub const GET_BALANCE: &str = "suix_getBalance";
    pub const GET_OWNED_OBJECTS: &str = "suix_getOwnedObjects";
    pub const QUERY_TRANSACTION_BLOCKS: &str = "suix_queryTransactionBlocks";
    pub const GET_OBJECT: &str = "sui_getObject";
    pub const GET_COIN_METADATA: &str = "suix_getCoinMetadata";
    pub const QUERY_EVENTS: &str = "suix_queryEvents";
    pub const GET_TRANSACTION_BLOCK: &str = "sui_getTransactionBlock";
}

#[derive(Debug, Clone, Copy)]
pub enum TxFilter<'a> {
    FromAddress(&'a str),
    ToAddress(&'a str),
    InputObject(&'a str),
}

impl TxFilter<'_> {
    fn to_json(self) -> Value {
        match self {
            TxFilter::FromAddress(address) => json!({ "FromAddress": address }),
            TxFilter::ToAddress(address) => json!({ "ToAddress": address }),
            TxFilter::InputObject(object) => json!({ "InputObject": object }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EventFilter {
    MoveEventModule { package: String, module: String },
    MoveEventType(String),
}

impl EventFilter {
    fn to_json(&self) -> Value {
        match self {
            EventFilter::MoveEventModule { package, module } => {
                json!({ "MoveEventModule": { "package": package, "module": module } })
            }
            EventFilter::MoveEventType(event_type) => json!({ "MoveEventType": event_type }),
        }
    }
}

/// Typed wrapper that builds the node's parameter shapes. Cheap to clone.
#[derive(Clone)]
pub struct SuiRpc {
    gateway: Arc<dyn RpcGateway>,
}

impl SuiRpc {
    pub fn new(gateway: Arc<dyn RpcGateway>) -> Self {
        Self { gateway }
    }

    async fn page(&self, method: &str, params: Vec<Value>) -> Result<Vec<Value>, AnalysisError> {
        let result = self.gateway.call(method, params).await?;
        page_data(&result)
            .cloned()
            .ok_or_else(|| AnalysisError::Rpc(format!("{}: result has no data page", method)))
    }

    pub async fn all_coins(&self, owner: &str, limit: u32) -> Result<Vec<Value>, AnalysisError> {
        self.page(method::GET_ALL_COINS, vec![json!(owner), Value::Null, json!(limit)])
            .await
    }

    pub async fn balance(&self, owner: &str, coin_type: &str) -> Result<u128, AnalysisError> {
        let result = self
            .gateway
            .call(method::GET_BALANCE, vec![json!(owner), json!(coin_type)])
            .await?;
        result
            .get("totalBalance")
            .and_then(crate::json::as_u128)
            .ok_or_else(|| AnalysisError::Rpc(format!("{}: missing totalBalance", method::GET_BALANCE)))
    }

    pub async fn owned_objects(&self, owner: &str, limit: u32) -> Result<Vec<Value>, AnalysisError> {
        let query = json!({ "options": { "showType": true } });
        self.page(
            method::GET_OWNED_OBJECTS,
            vec![json!(owner), Value::Null, query, json!(limit)],
        )
        .await
    }

    pub async fn transaction_blocks(
        &self,
        filter: TxFilter<'_>,
        limit: u32,
    ) -> Result<Vec<Value>, AnalysisError> {
        self.page(
            method::QUERY_TRANSACTION_BLOCKS,
            vec![
                filter.to_json(),
                json!({ "limit": limit, "descendingOrder": true }),
                Value::Null,
            ],
        )
        .await
    }

    /// Object `data` block with content, display, owner, type and previous transaction.
    pub async fn object(&self, object_id: &str) -> Result<Value, AnalysisError> {
        let options = json!({
            "showContent": true,
            "showDisplay": true,
            "showOwner": true,
            "showType": true,
            "showPreviousTransaction": true,
        });
        let mut result = self
            .gateway
            .call(method::GET_OBJECT, vec![json!(object_id), options])
            .await?;
        if let Some(error) = result.get("error") {
            return Err(AnalysisError::NotFound(format!("object {}: {}", object_id, error)));
        }
        match result.get_mut("data") {
            Some(data) if data.is_object() => Ok(data.take()),
            _ => Err(AnalysisError::NotFound(format!("object {} not found", object_id))),
        }
    }

    /// `None` when the node knows no metadata for the coin.
    pub async fn coin_metadata(&self, coin_type: &str) -> Result<Option<Value>, AnalysisError> {
        let result = self
            .gateway
            .call(method::GET_COIN_METADATA, vec![json!(coin_type)])
            .await?;
        Ok(if result.is_object() { Some(result) } else { None })
    }

    // descending, newest first
    pub async fn events(&self, filter: &EventFilter, limit: u32) -> Result<Vec<Value>, AnalysisError> {
        self.page(
            method::QUERY_EVENTS,
            vec![
                filter.to_json(),
                json!({ "limit": limit, "descendingOrder": true }),
                Value::Null,
            ],
        )
        .await
    }

    pub async fn transaction_block(&self, digest: &str) -> Result<Value, AnalysisError> {
        let options = json!({ "showEffects": true, "showInput": true, "showEvents": true });
        self.gateway
            .call(method::GET_TRANSACTION_BLOCK, vec![json!(digest), options])
            .await
    }
}
