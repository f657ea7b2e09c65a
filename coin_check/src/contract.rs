use abi::json::{as_u128, sender_of, str_field, timestamp_of};
use abi::{
    ActivityLevel, AnalysisError, EventFilter, OwnerDescriptor, SuiRpc, TokenProfile, TxFilter,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashSet;

pub const EVENT_PAGE_LIMIT: u32 = 10;
pub const INTERACTION_PAGE_LIMIT: u32 = 100;
pub const MAX_FIRST_INTERACTORS: usize = 3;
pub const DEFAULT_COIN_DECIMALS: u8 = 9;

/// Wrapper types whose generic parameter names the coin they hold.
const COIN_WRAPPERS: [&str; 3] = ["::coin::Coin", "::coin::CoinMetadata", "::coin::TreasuryCap"];

/// Enrichment stages run after the object is resolved, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Metadata,
    Events,
    Creation,
    Interactions,
}

impl Stage {
    pub const PIPELINE: [Stage; 4] = [
        Stage::Metadata,
        Stage::Events,
        Stage::Creation,
        Stage::Interactions,
    ];

    /// Resets the fields this stage owns after it failed.
    fn degrade(self, profile: &mut TokenProfile) {
        match self {
            Stage::Metadata => {}
            Stage::Events => profile.recent_events = 0,
            Stage::Creation => {
                profile.deployer = None;
                profile.deploy_date = None;
                profile.deploy_time = None;
            }
            Stage::Interactions => {
                profile.first_interactors.clear();
                profile.transaction_count = 0;
                profile.estimated_holders = None;
                profile.activity_level = None;
            }
        }
    }
}

/// What a successful stage contributes to the profile.
#[derive(Debug, PartialEq)]
enum Patch {
    Skipped,
    Metadata {
        name: Option<String>,
        symbol: Option<String>,
        decimals: u8,
        supply: Option<f64>,
    },
    Events(u64),
    Creation {
        deployer: Option<String>,
        deployed_at: Option<DateTime<Utc>>,
    },
    Interactions {
        transaction_count: u64,
        estimated_holders: u64,
        first_interactors: Vec<String>,
    },
}

impl Patch {
    fn apply(self, profile: &mut TokenProfile) {
        match self {
            Patch::Skipped => {}
            Patch::Metadata { name, symbol, decimals, supply } => {
                profile.name = name.or(profile.name.take());
                profile.symbol = symbol.or(profile.symbol.take());
                profile.decimals = Some(decimals);
                profile.supply = supply;
            }
            Patch::Events(count) => profile.recent_events = count,
            Patch::Creation { deployer, deployed_at } => {
                profile.deployer = deployer;
                profile.deploy_date = deployed_at.map(|at| at.format("%Y-%m-%d").to_string());
                profile.deploy_time = deployed_at.map(|at| at.format("%H:%M:%S UTC").to_string());
            }
            Patch::Interactions { transaction_count, estimated_holders, first_interactors } => {
                profile.transaction_count = transaction_count;
                profile.estimated_holders = Some(estimated_holders);
                profile.first_interactors = first_interactors;
                profile.activity_level = Some(ActivityLevel::from_count(transaction_count));
            }
        }
    }
}

/// Resolves a token object and enriches it stage by stage. Only the object
/// lookup is fatal; any later stage failing leaves its fields at their
/// sentinel values.
#[derive(Clone)]
pub struct TokenContractAnalyzer {
    rpc: SuiRpc,
}

impl TokenContractAnalyzer {
    pub fn new(rpc: SuiRpc) -> Self {
        Self { rpc }
    }

    pub async fn analyze(&self, token: &str) -> Result<TokenProfile, AnalysisError> {
        let mut profile = self.resolve(token).await?;
        for stage in Stage::PIPELINE {
            match self.run(stage, &profile).await {
                Ok(patch) => patch.apply(&mut profile),
                Err(e) => {
                    warn!("{:?} stage failed for {}: {}", stage, token, e);
                    stage.degrade(&mut profile);
                }
            }
        }
        info!(
            "analyzed {} ({}): {} txs, deployer {:?}",
            token, profile.object_type, profile.transaction_count, profile.deployer
        );
        Ok(profile)
    }

    /// Object lookup plus display extraction and type parsing.
    pub async fn resolve(&self, token: &str) -> Result<TokenProfile, AnalysisError> {
        let object = self.rpc.object(token).await.inspect_err(|e| {
            warn!("could not resolve {}: {}", token, e);
        })?;
        Ok(profile_from_object(token, &object))
    }

    async fn run(&self, stage: Stage, profile: &TokenProfile) -> Result<Patch, AnalysisError> {
        match stage {
            Stage::Metadata => self.metadata(profile).await,
            Stage::Events => self.events(profile).await,
            Stage::Creation => self.creation(profile).await,
            Stage::Interactions => self.interactions(profile).await,
        }
    }

    async fn metadata(&self, profile: &TokenProfile) -> Result<Patch, AnalysisError> {
        let type_lower = profile.object_type.to_lowercase();
        if !type_lower.contains("coin") && !type_lower.contains("token") {
            return Ok(Patch::Skipped);
        }
        let key = metadata_key(profile);
        let Some(metadata) = self.rpc.coin_metadata(&key).await? else {
            debug!("no coin metadata for {}", key);
            return Ok(Patch::Skipped);
        };

        let decimals = metadata
            .get("decimals")
            .and_then(as_u128)
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(DEFAULT_COIN_DECIMALS);
        let supply = metadata
            .get("supply")
            .and_then(as_u128)
            .map(|raw| raw as f64 / 10f64.powi(i32::from(decimals)));
        Ok(Patch::Metadata {
            name: str_field(&metadata, "name").map(str::to_string),
            symbol: str_field(&metadata, "symbol").map(str::to_string),
            decimals,
            supply,
        })
    }

    async fn events(&self, profile: &TokenProfile) -> Result<Patch, AnalysisError> {
        let (Some(package), Some(module)) = (&profile.package, &profile.module) else {
            return Err(AnalysisError::NotFound(format!(
                "no module to scope events for {}",
                profile.object_type
            )));
        };
        let filter = EventFilter::MoveEventModule {
            package: package.clone(),
            module: module.clone(),
        };
        let events = self.rpc.events(&filter, EVENT_PAGE_LIMIT).await?;
        Ok(Patch::Events(events.len() as u64))
    }

    async fn creation(&self, profile: &TokenProfile) -> Result<Patch, AnalysisError> {
        let Some(digest) = &profile.creation_tx else {
            return Ok(Patch::Skipped);
        };
        let tx = self.rpc.transaction_block(digest).await?;
        Ok(Patch::Creation {
            deployer: sender_of(&tx).map(str::to_string),
            deployed_at: timestamp_of(&tx),
        })
    }

    async fn interactions(&self, profile: &TokenProfile) -> Result<Patch, AnalysisError> {
        let txs = self
            .rpc
            .transaction_blocks(TxFilter::InputObject(&profile.address), INTERACTION_PAGE_LIMIT)
            .await?;
        let (estimated_holders, first_interactors) =
            tally_interactors(&txs, profile.deployer.as_deref());
        Ok(Patch::Interactions {
            transaction_count: txs.len() as u64,
            estimated_holders,
            first_interactors,
        })
    }
}

/// Builds the initial profile from a `sui_getObject` data block.
pub fn profile_from_object(token: &str, object: &Value) -> TokenProfile {
    let object_type = str_field(object, "type").unwrap_or("Unknown").to_string();
    let mut profile = TokenProfile {
        address: token.to_string(),
        owner: object
            .get("owner")
            .map(OwnerDescriptor::from_json)
            .unwrap_or_default(),
        creation_tx: str_field(object, "previousTransaction").map(str::to_string),
        ..TokenProfile::default()
    };

    if let Some(display) = object.pointer("/display/data").filter(|d| d.is_object()) {
        profile.name = str_field(display, "name").map(str::to_string);
        profile.description = str_field(display, "description").map(str::to_string);
        profile.symbol = str_field(display, "symbol")
            .map(str::to_string)
            .or_else(|| profile.name.clone());
    }

    let mut segments = object_type.split("::");
    if let (Some(package), Some(module)) = (segments.next(), segments.next()) {
        profile.package = Some(package.to_string());
        profile.module = Some(module.to_string());
    }
    profile.object_type = object_type;
    profile
}

/// Coin type for the metadata lookup: the wrapped type of `Coin<T>`,
/// `CoinMetadata<T>` or `TreasuryCap<T>`, otherwise the token address itself.
fn metadata_key(profile: &TokenProfile) -> String {
    let object_type = profile.object_type.as_str();
    if let (Some(open), Some(close)) = (object_type.find('<'), object_type.rfind('>')) {
        let wrapper = &object_type[..open];
        if open < close && COIN_WRAPPERS.iter().any(|w| wrapper.ends_with(w)) {
            return object_type[open + 1..close].to_string();
        }
    }
    profile.address.clone()
}

/// Distinct senders across the page, and the first few of them other than
/// the deployer in the order they appear.
fn tally_interactors(txs: &[Value], deployer: Option<&str>) -> (u64, Vec<String>) {
    let mut unique = HashSet::new();
    let mut first = Vec::new();
    for sender in txs.iter().filter_map(sender_of) {
        unique.insert(sender);
        if Some(sender) != deployer
            && first.len() < MAX_FIRST_INTERACTORS
            && !first.iter().any(|seen: &String| seen == sender)
        {
            first.push(sender.to_string());
        }
    }
    (unique.len() as u64, first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::rpc::method;
    use abi::MockRpcGateway;
    use serde_json::json;
    use std::sync::Arc;

    const TOKEN: &str = "0x00000000000000000000000000000000000000000000000000000000000f00d5";

    fn token_object() -> Value {
        json!({"data": {
            "objectId": TOKEN,
            "type": "0xfeed::meme::MemeToken",
            "owner": {"AddressOwner": "0xowner"},
            "previousTransaction": "Dg1",
            "display": {"data": {"name": "Meme", "description": "much wow"}}
        }})
    }

    fn interactions() -> Value {
        let senders = ["0xdeployer", "0xa", "0xa", "0xb", "0xdeployer", "0xc", "0xd"];
        let data: Vec<Value> = senders
            .iter()
            .enumerate()
            .map(|(i, s)| json!({"digest": format!("tx{}", i), "transaction": {"data": {"sender": s}}}))
            .collect();
        json!({ "data": data })
    }

    fn happy_rpc() -> MockRpcGateway {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|method, params| match method {
            method::GET_OBJECT => Ok(token_object()),
            method::GET_COIN_METADATA => {
                assert_eq!(params[0], json!(TOKEN));
                Ok(json!({"decimals": 6, "name": "Meme Coin", "symbol": "MEME", "supply": "1000000000000"}))
            }
            method::QUERY_EVENTS => {
                assert_eq!(params[0], json!({"MoveEventModule": {"package": "0xfeed", "module": "meme"}}));
                assert_eq!(params[1], json!({"limit": 10, "descendingOrder": true}));
                Ok(json!({"data": [{}, {}, {}, {}]}))
            }
            method::GET_TRANSACTION_BLOCK => {
                assert_eq!(params[0], json!("Dg1"));
                Ok(json!({
                    "digest": "Dg1",
                    "transaction": {"data": {"sender": "0xdeployer"}},
                    "timestampMs": "1700000000000"
                }))
            }
            method::QUERY_TRANSACTION_BLOCKS => {
                assert_eq!(params[0], json!({"InputObject": TOKEN}));
                assert_eq!(params[1], json!({"limit": 100, "descendingOrder": true}));
                Ok(interactions())
            }
            other => Err(AnalysisError::Rpc(format!("unexpected {}", other))),
        });
        rpc
    }

    fn analyzer(rpc: MockRpcGateway) -> TokenContractAnalyzer {
        TokenContractAnalyzer::new(SuiRpc::new(Arc::new(rpc)))
    }

    #[tokio::test]
    async fn full_pipeline_populates_profile() {
        let profile = analyzer(happy_rpc()).analyze(TOKEN).await.unwrap();

        assert_eq!(profile.object_type, "0xfeed::meme::MemeToken");
        assert_eq!(profile.owner, OwnerDescriptor::AddressOwner("0xowner".into()));
        assert_eq!(profile.package.as_deref(), Some("0xfeed"));
        assert_eq!(profile.module.as_deref(), Some("meme"));
        assert_eq!(profile.name.as_deref(), Some("Meme Coin"));
        assert_eq!(profile.symbol.as_deref(), Some("MEME"));
        assert_eq!(profile.description.as_deref(), Some("much wow"));
        assert_eq!(profile.decimals, Some(6));
        assert_eq!(profile.supply, Some(1_000_000.0));
        assert_eq!(profile.recent_events, 4);
        assert_eq!(profile.deployer.as_deref(), Some("0xdeployer"));
        assert_eq!(profile.deploy_date.as_deref(), Some("2023-11-14"));
        assert_eq!(profile.deploy_time.as_deref(), Some("22:13:20 UTC"));
        assert_eq!(profile.first_interactors, vec!["0xa", "0xb", "0xc"]);
        assert_eq!(profile.transaction_count, 7);
        assert_eq!(profile.estimated_holders, Some(5));
        assert_eq!(profile.activity_level, Some(ActivityLevel::Low));
    }

    #[tokio::test]
    async fn missing_object_is_terminal() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call()
            .times(1)
            .returning(|_, _| Ok(json!({"error": {"code": "notExists", "object_id": TOKEN}})));
        let err = analyzer(rpc).analyze(TOKEN).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[tokio::test]
    async fn rpc_error_on_lookup_is_terminal() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call()
            .times(1)
            .returning(|_, _| Err(AnalysisError::Rpc("Invalid params".into())));
        assert!(analyzer(rpc).analyze(TOKEN).await.is_err());
    }

    #[tokio::test]
    async fn later_stage_failures_degrade_to_sentinels() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|method, _| match method {
            method::GET_OBJECT => Ok(token_object()),
            method::GET_COIN_METADATA => Ok(Value::Null),
            method::GET_TRANSACTION_BLOCK => Ok(json!({"transaction": {"data": {"sender": "0xdeployer"}}})),
            _ => Err(AnalysisError::Transport("timeout".into())),
        });

        let profile = analyzer(rpc).analyze(TOKEN).await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Meme"));
        assert_eq!(profile.symbol.as_deref(), Some("Meme"));
        assert_eq!(profile.decimals, None);
        assert_eq!(profile.recent_events, 0);
        assert_eq!(profile.deployer.as_deref(), Some("0xdeployer"));
        assert_eq!(profile.deploy_date, None);
        assert_eq!(profile.transaction_count, 0);
        assert_eq!(profile.estimated_holders, None);
        assert_eq!(profile.activity_level, None);
        assert!(profile.first_interactors.is_empty());
    }

    #[tokio::test]
    async fn metadata_is_skipped_for_non_token_types() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|method, _| match method {
            method::GET_OBJECT => Ok(json!({"data": {"type": "0xfab::punks::Punk"}})),
            method::GET_COIN_METADATA => panic!("metadata must not be requested"),
            _ => Ok(json!({"data": []})),
        });

        let profile = analyzer(rpc).analyze(TOKEN).await.unwrap();
        assert_eq!(profile.name, None);
        assert_eq!(profile.creation_tx, None);
        assert_eq!(profile.activity_level, Some(ActivityLevel::Inactive));
    }

    #[tokio::test]
    async fn wrapped_coin_metadata_is_keyed_by_inner_type() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|method, params| match method {
            method::GET_OBJECT => Ok(json!({"data": {"type": "0x2::coin::TreasuryCap<0xfeed::meme::MEME>"}})),
            method::GET_COIN_METADATA => {
                assert_eq!(params[0], json!("0xfeed::meme::MEME"));
                Ok(json!({"symbol": "MEME", "supply": 5000000000u64}))
            }
            _ => Ok(json!({"data": []})),
        });

        let profile = analyzer(rpc).analyze(TOKEN).await.unwrap();
        assert_eq!(profile.decimals, Some(DEFAULT_COIN_DECIMALS));
        assert_eq!(profile.supply, Some(5.0));
        assert_eq!(profile.symbol.as_deref(), Some("MEME"));
    }

    #[test]
    fn untyped_objects_fall_back_to_unknown() {
        let profile = profile_from_object(TOKEN, &json!({"objectId": TOKEN}));
        assert_eq!(profile.object_type, "Unknown");
        assert_eq!(profile.package, None);
        assert_eq!(profile.module, None);
        assert_eq!(profile.owner, OwnerDescriptor::Unknown);
    }

    #[test]
    fn first_interactors_skip_deployer_and_duplicates() {
        let txs: Vec<Value> = ["0xd", "0xd", "0xe", "0xf"]
            .iter()
            .map(|s| json!({"sender": s}))
            .collect();
        let (holders, first) = tally_interactors(&txs, Some("0xd"));
        assert_eq!(holders, 3);
        assert_eq!(first, vec!["0xe", "0xf"]);
    }
}
