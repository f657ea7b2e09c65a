use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod activity;
pub mod address;
pub mod config;
pub mod error;
pub mod gateway;
pub mod json;
pub mod rpc;

pub use activity::{combined_activity, ActivityLevel, WalletActivity};
pub use config::{Config, ExplorerLinks};
pub use error::AnalysisError;
pub use gateway::{CoinGeckoPriceGateway, HttpRpcGateway, PriceGateway, RpcGateway};
pub use rpc::{EventFilter, SuiRpc, TxFilter};

#[cfg(any(test, feature = "mock"))]
pub use gateway::{MockPriceGateway, MockRpcGateway};

/// Fully-qualified type of the native coin.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
pub const SUI_SYMBOL: &str = "SUI";
pub const SUI_DECIMALS: u32 = 9;
/// Owned objects whose type contains this marker are coins and are counted elsewhere.
pub const COIN_WRAPPER_MARKER: &str = "::coin::Coin<";

/// Converts a raw MIST amount into SUI.
pub fn mist_to_sui(raw: u128) -> f64 {
    raw as f64 / 10f64.powi(SUI_DECIMALS as i32)
}

/// Last `::` segment, cut at its first `<`. Generic arguments are split too,
/// so `0x5::pass::Pass<0x2::sui::SUI>` names `SUI>`.
pub fn short_type_name(type_tag: &str) -> &str {
    let last = type_tag.rsplit("::").next().unwrap_or(type_tag);
    last.split('<').next().unwrap_or(last)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BalanceReport {
    pub coin: String,
    pub balance: f64,
    pub value_usd: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CoinHolding {
    pub coin_type: String,
    pub name: String,
    /// Smallest-unit balance summed over every coin object of this type.
    pub balance: u128,
    pub balance_formatted: f64,
    pub value_usd: f64,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ObjectHolding {
    pub object_type: String,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Holding {
    Coin(CoinHolding),
    Object(ObjectHolding),
}

impl Holding {
    pub fn name(&self) -> &str {
        match self {
            Holding::Coin(coin) => &coin.name,
            Holding::Object(object) => &object.name,
        }
    }

    pub fn count(&self) -> u64 {
        match self {
            Holding::Coin(coin) => coin.count,
            Holding::Object(object) => object.count,
        }
    }

    /// Objects carry no balance.
    pub fn balance(&self) -> Option<f64> {
        match self {
            Holding::Coin(coin) => Some(coin.balance_formatted),
            Holding::Object(_) => None,
        }
    }

    pub fn value_usd(&self) -> f64 {
        match self {
            Holding::Coin(coin) => coin.value_usd,
            Holding::Object(_) => 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TokenHoldings {
    pub tokens: BTreeMap<String, Holding>,
    pub count: u64,
    pub total_value_usd: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActivitySummary {
    pub incoming_txs: u64,
    pub outgoing_txs: u64,
    pub total: u64,
    pub level: ActivityLevel,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WalletReport {
    pub address: String,
    pub explorer: ExplorerLinks,
    pub balance: Result<BalanceReport, AnalysisError>,
    pub tokens: Result<TokenHoldings, AnalysisError>,
    pub activity: Result<ActivitySummary, AnalysisError>,
    pub activity_level: WalletActivity,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub enum OwnerDescriptor {
    AddressOwner(String),
    ObjectOwner(String),
    Shared { initial_shared_version: u64 },
    Immutable,
    #[default]
    Unknown,
}

impl OwnerDescriptor {
    pub fn from_json(owner: &serde_json::Value) -> Self {
        if owner.as_str() == Some("Immutable") {
            return OwnerDescriptor::Immutable;
        }
        if let Some(address) = owner.get("AddressOwner").and_then(|v| v.as_str()) {
            return OwnerDescriptor::AddressOwner(address.to_string());
        }
        if let Some(object) = owner.get("ObjectOwner").and_then(|v| v.as_str()) {
            return OwnerDescriptor::ObjectOwner(object.to_string());
        }
        if let Some(shared) = owner.get("Shared") {
            let initial_shared_version = shared
                .get("initial_shared_version")
                .and_then(json::as_u128)
                .unwrap_or(0) as u64;
            return OwnerDescriptor::Shared { initial_shared_version };
        }
        OwnerDescriptor::Unknown
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TokenProfile {
    pub address: String,
    /// `"Unknown"` when the object carries no type.
    pub object_type: String,
    pub owner: OwnerDescriptor,
    pub package: Option<String>,
    pub module: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub supply: Option<f64>,
    pub description: Option<String>,
    pub creation_tx: Option<String>,
    pub deployer: Option<String>,
    pub deploy_date: Option<String>,
    pub deploy_time: Option<String>,
    pub recent_events: u64,
    pub first_interactors: Vec<String>,
    /// `None` when the interaction query failed.
    pub activity_level: Option<ActivityLevel>,
    pub transaction_count: u64,
    pub estimated_holders: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TradingSignals {
    pub liquidity_events: u64,
    pub transfer_events: u64,
    pub mint_events: u64,
    pub first_liquidity_provider: Option<String>,
    pub first_liquidity_amount: Option<String>,
    pub first_liquidity_time: Option<String>,
    pub early_traders: Vec<String>,
    pub early_minters: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RelationshipVerdict {
    pub related: bool,
    pub shared_transactions: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub factors: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenReport {
    pub profile: TokenProfile,
    pub explorer: ExplorerLinks,
    pub deployer_link: Option<String>,
    pub trading: Result<TradingSignals, AnalysisError>,
    pub relationship: Option<RelationshipVerdict>,
    pub risk: RiskAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_type_name_takes_last_segment_then_cuts_generics() {
        assert_eq!(short_type_name("0x2::sui::SUI"), "SUI");
        assert_eq!(short_type_name("0xcafe::kiosk::Pass<0x2::sui::SUI>"), "SUI>");
        assert_eq!(short_type_name("0x5::nft::Ape<u64>"), "Ape");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn mist_conversion_uses_nine_decimals() {
        assert_eq!(mist_to_sui(5_000_000_000), 5.0);
        assert_eq!(mist_to_sui(0), 0.0);
    }

    #[test]
    fn object_holdings_have_no_balance() {
        let object = Holding::Object(ObjectHolding {
            object_type: "0x5::nft::Ape".into(),
            name: "Ape".into(),
            count: 2,
        });
        assert_eq!(object.balance(), None);
        assert_eq!(object.value_usd(), 0.0);
        assert_eq!(object.count(), 2);
    }

    #[test]
    fn owner_descriptor_decodes_rpc_shapes() {
        assert_eq!(
            OwnerDescriptor::from_json(&json!({"AddressOwner": "0xabc"})),
            OwnerDescriptor::AddressOwner("0xabc".into())
        );
        assert_eq!(
            OwnerDescriptor::from_json(&json!({"Shared": {"initial_shared_version": "42"}})),
            OwnerDescriptor::Shared { initial_shared_version: 42 }
        );
        assert_eq!(OwnerDescriptor::from_json(&json!("Immutable")), OwnerDescriptor::Immutable);
        assert_eq!(OwnerDescriptor::from_json(&json!(null)), OwnerDescriptor::Unknown);
    }

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }
}
