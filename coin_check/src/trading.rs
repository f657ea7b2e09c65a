use crate::contract::TokenContractAnalyzer;
use abi::json::{scalar_to_string, sender_of, timestamp_of};
use abi::{AnalysisError, EventFilter, SuiRpc, TokenProfile, TradingSignals};
use log::{debug, info};
use serde_json::Value;

pub const SIGNAL_PAGE_LIMIT: u32 = 20;
pub const EARLY_SENDER_LIMIT: usize = 5;

/// Guessed event names; a DEX that names its events differently yields no signal.
pub const LIQUIDITY_EVENT: &str = "LiquidityAdded";
pub const TRANSFER_EVENT: &str = "TransferEvent";
pub const MINT_EVENT: &str = "MintEvent";

/// Probes a token's module for liquidity, transfer and mint events.
pub struct TradingSignalAnalyzer {
    rpc: SuiRpc,
    contracts: TokenContractAnalyzer,
}

impl TradingSignalAnalyzer {
    pub fn new(rpc: SuiRpc) -> Self {
        Self {
            contracts: TokenContractAnalyzer::new(rpc.clone()),
            rpc,
        }
    }

    pub async fn analyze(&self, token: &str) -> Result<TradingSignals, AnalysisError> {
        let profile = self.contracts.resolve(token).await?;
        self.analyze_profile(&profile).await
    }

    /// Same as [`analyze`](Self::analyze) for an already resolved profile.
    pub async fn analyze_profile(&self, profile: &TokenProfile) -> Result<TradingSignals, AnalysisError> {
        let (Some(package), Some(module)) = (&profile.package, &profile.module) else {
            return Err(AnalysisError::NotFound(format!(
                "could not extract package or module from {}",
                profile.object_type
            )));
        };

        let (liquidity, transfers, mints) = futures::join!(
            self.probe(package, module, LIQUIDITY_EVENT),
            self.probe(package, module, TRANSFER_EVENT),
            self.probe(package, module, MINT_EVENT),
        );

        let mut signals = TradingSignals {
            liquidity_events: liquidity.len() as u64,
            transfer_events: transfers.len() as u64,
            mint_events: mints.len() as u64,
            early_traders: early_senders(&transfers, EARLY_SENDER_LIMIT),
            early_minters: early_senders(&mints, EARLY_SENDER_LIMIT),
            ..TradingSignals::default()
        };
        if let Some(first) = earliest_in_page(&liquidity) {
            signals.first_liquidity_provider = sender_of(first).map(str::to_string);
            signals.first_liquidity_time =
                timestamp_of(first).map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
            signals.first_liquidity_amount = first
                .pointer("/parsedJson/amount")
                .and_then(scalar_to_string);
        }

        info!(
            "{}::{} signals: {} liquidity / {} transfer / {} mint events",
            package, module, signals.liquidity_events, signals.transfer_events, signals.mint_events
        );
        Ok(signals)
    }

    /// Events of `package::module::suffix`, newest first. A failed query is "no signal".
    async fn probe(&self, package: &str, module: &str, suffix: &str) -> Vec<Value> {
        let filter = EventFilter::MoveEventType(format!("{}::{}::{}", package, module, suffix));
        match self.rpc.events(&filter, SIGNAL_PAGE_LIMIT).await {
            Ok(events) => events,
            Err(e) => {
                debug!("no {} events for {}::{}: {}", suffix, package, module, e);
                Vec::new()
            }
        }
    }
}

/// Pages are newest first, so the last entry is the earliest one seen. This is
/// bounded by the page size and is not the true first event.
pub fn earliest_in_page(events: &[Value]) -> Option<&Value> {
    events.last()
}

/// Distinct senders among the first `limit` entries of the page, in page order.
pub fn early_senders(events: &[Value], limit: usize) -> Vec<String> {
    let mut senders: Vec<String> = Vec::new();
    for sender in events.iter().take(limit).filter_map(sender_of) {
        if !senders.iter().any(|seen| seen == sender) {
            senders.push(sender.to_string());
        }
    }
    senders
}
