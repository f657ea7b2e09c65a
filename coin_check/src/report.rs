use crate::contract::TokenContractAnalyzer;
use crate::relationship::RelationshipDetector;
use crate::risk::RiskScorer;
use crate::trading::TradingSignalAnalyzer;
use abi::{AnalysisError, Config, HttpRpcGateway, RiskLevel, SuiRpc, TokenReport};
use log::{info, warn};
use std::sync::Arc;

/// Full token analysis: profile, trading signals, deployer/early-interactor
/// relationship check and risk assessment.
pub struct TokenInspector {
    contracts: TokenContractAnalyzer,
    trading: TradingSignalAnalyzer,
    relationships: RelationshipDetector,
    config: Arc<Config>,
}

impl TokenInspector {
    pub fn new(rpc: SuiRpc, config: Arc<Config>) -> Self {
        Self {
            contracts: TokenContractAnalyzer::new(rpc.clone()),
            trading: TradingSignalAnalyzer::new(rpc.clone()),
            relationships: RelationshipDetector::new(rpc),
            config,
        }
    }

    pub fn connect(config: Arc<Config>) -> Result<Self, AnalysisError> {
        let rpc = SuiRpc::new(Arc::new(HttpRpcGateway::new(&config)?));
        Ok(Self::new(rpc, config))
    }

    /// Fails only when the token object cannot be resolved.
    pub async fn inspect(&self, token: &str) -> Result<TokenReport, AnalysisError> {
        self.inspect_with(token, RiskScorer::today()).await
    }

    pub async fn inspect_with(&self, token: &str, scorer: RiskScorer) -> Result<TokenReport, AnalysisError> {
        let profile = self.contracts.analyze(token).await?;

        let addresses: Vec<String> = profile
            .deployer
            .iter()
            .chain(profile.first_interactors.iter())
            .cloned()
            .collect();
        let relationship_check = async {
            if addresses.len() < 2 {
                return None;
            }
            self.relationships
                .check(&addresses)
                .await
                .inspect_err(|e| warn!("relationship check for {} failed: {}", token, e))
                .ok()
        };
        let (trading, relationship) = futures::join!(
            self.trading.analyze_profile(&profile),
            relationship_check,
        );

        let risk = scorer.score(&profile, relationship.as_ref(), profile.deploy_date.as_deref());
        info!("token {} risk {:?} ({} factors)", token, risk.level, risk.factors.len());

        Ok(TokenReport {
            explorer: self.config.object_links(token),
            deployer_link: profile
                .deployer
                .as_deref()
                .map(|deployer| self.config.account_links(deployer).suiscan),
            trading,
            relationship,
            risk,
            profile,
        })
    }
}

/// A token is considered healthy unless its risk level is `High`.
pub fn is_healthy(report: &TokenReport) -> bool {
    report.risk.level != RiskLevel::High
}
