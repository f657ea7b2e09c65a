use crate::activity::ActivityAggregator;
use crate::balance::BalanceAggregator;
use crate::tokens::TokenAggregator;
use abi::{
    combined_activity, AnalysisError, CoinGeckoPriceGateway, Config, HttpRpcGateway,
    PriceGateway, SuiRpc, WalletReport,
};
use log::info;
use std::sync::Arc;

/// Fans a wallet address out to the three aggregators and composes the report.
pub struct WalletInspector {
    balance: BalanceAggregator,
    tokens: TokenAggregator,
    activity: ActivityAggregator,
    config: Arc<Config>,
}

impl WalletInspector {
    pub fn new(rpc: SuiRpc, prices: Arc<dyn PriceGateway>, config: Arc<Config>) -> Self {
        Self {
            balance: BalanceAggregator::new(rpc.clone(), prices.clone(), config.clone()),
            tokens: TokenAggregator::new(rpc.clone(), prices, config.clone()),
            activity: ActivityAggregator::new(rpc),
            config,
        }
    }

    /// Wires the HTTP gateways described by `config`.
    pub fn connect(config: Arc<Config>) -> Result<Self, AnalysisError> {
        let rpc = SuiRpc::new(Arc::new(HttpRpcGateway::new(&config)?));
        let prices = Arc::new(CoinGeckoPriceGateway::new(&config)?);
        Ok(Self::new(rpc, prices, config))
    }

    pub fn tokens(&self) -> &TokenAggregator {
        &self.tokens
    }

    /// The address is expected to be validated by the caller.
    pub async fn inspect(&self, address: &str) -> WalletReport {
        let (balance, tokens, activity) = futures::join!(
            self.balance.fetch(address),
            self.tokens.fetch(address),
            self.activity.fetch(address),
        );

        let token_count = tokens.as_ref().map(|t| t.count).unwrap_or(0);
        let transaction_count = activity.as_ref().map(|a| a.total).unwrap_or(0);
        let activity_level = combined_activity(transaction_count, token_count);
        info!(
            "wallet {}: {} txs, {} items -> {}",
            address, transaction_count, token_count, activity_level
        );

        WalletReport {
            address: address.to_string(),
            explorer: self.config.account_links(address),
            balance,
            tokens,
            activity,
            activity_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::rpc::method;
    use abi::{MockPriceGateway, MockRpcGateway, WalletActivity};
    use serde_json::json;

    fn inspector(rpc: MockRpcGateway) -> WalletInspector {
        let mut prices = MockPriceGateway::new();
        prices.expect_usd_price().returning(|_| Ok(2.0));
        WalletInspector::new(
            SuiRpc::new(Arc::new(rpc)),
            Arc::new(prices),
            Arc::new(Config::default()),
        )
    }

    #[tokio::test]
    async fn empty_wallet_is_inactive() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|_, _| Ok(json!({"data": []})));

        let report = inspector(rpc).inspect("0xabc0000001").await;
        assert_eq!(report.activity_level, WalletActivity::Inactive);
        assert_eq!(report.balance.unwrap().balance, 0.0);
        assert_eq!(report.tokens.unwrap().count, 0);
        assert_eq!(report.activity.unwrap().total, 0);
        assert_eq!(
            report.explorer.suiscan,
            "https://suiscan.xyz/mainnet/account/0xabc0000001"
        );
    }

    #[tokio::test]
    async fn holdings_can_lift_the_combined_label() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|method, _| match method {
            method::GET_OWNED_OBJECTS => {
                let data: Vec<_> = (0..6)
                    .map(|i| json!({"data": {"type": format!("0xfab::art::Piece{}", i)}}))
                    .collect();
                Ok(json!({ "data": data }))
            }
            _ => Ok(json!({"data": []})),
        });

        let report = inspector(rpc).inspect("0xabc0000001").await;
        assert_eq!(report.tokens.as_ref().unwrap().count, 6);
        assert_eq!(report.activity_level, WalletActivity::Normal);
    }

    #[tokio::test]
    async fn failed_sections_do_not_hide_the_rest() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|method, _| match method {
            method::QUERY_TRANSACTION_BLOCKS => Ok(json!({"data": [{"digest": "a"}, {"digest": "b"}]})),
            _ => Err(AnalysisError::Transport("unreachable".into())),
        });

        let report = inspector(rpc).inspect("0xabc0000001").await;
        assert!(report.balance.is_err());
        assert!(report.tokens.is_err());
        assert_eq!(report.activity.as_ref().unwrap().total, 4);
        assert_eq!(report.activity_level, WalletActivity::Low);
    }
}
