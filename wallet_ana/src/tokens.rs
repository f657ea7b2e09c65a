use crate::balance::native_price;
use abi::json::{as_u128, str_field};
use abi::{
    mist_to_sui, short_type_name, AnalysisError, CoinHolding, Config, Holding, ObjectHolding,
    PriceGateway, SuiRpc, TokenHoldings, COIN_WRAPPER_MARKER, SUI_COIN_TYPE,
};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

pub const COIN_PAGE_LIMIT: u32 = 100;
pub const OBJECT_PAGE_LIMIT: u32 = 50;

/// Per-type holdings table built from the coin and owned-object listings.
pub struct TokenAggregator {
    rpc: SuiRpc,
    prices: Arc<dyn PriceGateway>,
    config: Arc<Config>,
}

impl TokenAggregator {
    pub fn new(rpc: SuiRpc, prices: Arc<dyn PriceGateway>, config: Arc<Config>) -> Self {
        Self { rpc, prices, config }
    }

    /// Fails only when both listings fail; one failed listing is logged and skipped.
    pub async fn fetch(&self, address: &str) -> Result<TokenHoldings, AnalysisError> {
        let (coins, objects) = futures::join!(
            self.rpc.all_coins(address, COIN_PAGE_LIMIT),
            self.rpc.owned_objects(address, OBJECT_PAGE_LIMIT),
        );

        let (coins, objects) = match (coins, objects) {
            (Err(coin_err), Err(object_err)) => {
                warn!("both listings failed for {}: {} / {}", address, coin_err, object_err);
                return Err(coin_err);
            }
            (coins, objects) => (
                coins.inspect_err(|e| warn!("coin listing for {} failed: {}", address, e)).ok(),
                objects.inspect_err(|e| warn!("object listing for {} failed: {}", address, e)).ok(),
            ),
        };

        let coins = coins.unwrap_or_default();
        let holds_native = coins
            .iter()
            .any(|coin| str_field(coin, "coinType") == Some(SUI_COIN_TYPE));
        let price = if holds_native {
            native_price(self.prices.as_ref(), &self.config.native_price_id).await
        } else {
            0.0
        };

        let mut holdings = TokenHoldings::default();
        add_coins(&mut holdings, &coins, price);
        add_objects(&mut holdings, objects.as_deref().unwrap_or_default());
        holdings.total_value_usd = holdings.tokens.values().map(Holding::value_usd).sum();

        debug!(
            "{} holds {} items across {} types",
            address,
            holdings.count,
            holdings.tokens.len()
        );
        Ok(holdings)
    }
}

/// Groups coin objects by full type. Only the native coin is decimal-adjusted
/// and priced; other coins pass their raw balance through and value at 0.
pub fn add_coins(holdings: &mut TokenHoldings, coins: &[Value], native_price: f64) {
    for coin in coins {
        let Some(coin_type) = str_field(coin, "coinType") else {
            continue;
        };
        let raw = coin.get("balance").and_then(as_u128).unwrap_or(0);
        let (formatted, value_usd) = if coin_type == SUI_COIN_TYPE {
            let sui = mist_to_sui(raw);
            (sui, sui * native_price)
        } else {
            (raw as f64, 0.0)
        };

        let entry = holdings
            .tokens
            .entry(coin_type.to_string())
            .or_insert_with(|| {
                Holding::Coin(CoinHolding {
                    coin_type: coin_type.to_string(),
                    name: short_type_name(coin_type).to_string(),
                    balance: 0,
                    balance_formatted: 0.0,
                    value_usd: 0.0,
                    count: 0,
                })
            });
        if let Holding::Coin(holding) = entry {
            holding.balance += raw;
            holding.balance_formatted += formatted;
            holding.value_usd += value_usd;
            holding.count += 1;
        }
        holdings.count += 1;
    }
}

/// Counts non-coin objects per type.
pub fn add_objects(holdings: &mut TokenHoldings, objects: &[Value]) {
    for object in objects {
        let Some(object_type) = object.pointer("/data/type").and_then(Value::as_str) else {
            continue;
        };
        if object_type.contains(COIN_WRAPPER_MARKER) || !object_type.contains("::") {
            continue;
        }

        let entry = holdings
            .tokens
            .entry(object_type.to_string())
            .or_insert_with(|| {
                Holding::Object(ObjectHolding {
                    object_type: object_type.to_string(),
                    name: short_type_name(object_type).to_string(),
                    count: 0,
                })
            });
        if let Holding::Object(holding) = entry {
            holding.count += 1;
        }
        holdings.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi::rpc::method;
    use abi::{MockPriceGateway, MockRpcGateway};
    use serde_json::json;

    fn aggregator(rpc: MockRpcGateway, price: f64) -> TokenAggregator {
        let mut prices = MockPriceGateway::new();
        prices.expect_usd_price().returning(move |_| Ok(price));
        TokenAggregator::new(
            SuiRpc::new(Arc::new(rpc)),
            Arc::new(prices),
            Arc::new(Config::default()),
        )
    }

    fn wallet_rpc() -> MockRpcGateway {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().times(2).returning(|method, params| match method {
            method::GET_ALL_COINS => {
                assert_eq!(params[2], json!(100));
                Ok(json!({"data": [
                    {"coinType": "0x2::sui::SUI", "balance": "1000000000"},
                    {"coinType": "0x2::sui::SUI", "balance": "3000000000"},
                    {"coinType": "0xbeef::usdc::USDC", "balance": "250"},
                ]}))
            }
            method::GET_OWNED_OBJECTS => {
                assert_eq!(params[3], json!(50));
                Ok(json!({"data": [
                    {"data": {"objectId": "0x1", "type": "0x2::coin::Coin<0x2::sui::SUI>"}},
                    {"data": {"objectId": "0x2", "type": "0xfab::punks::Punk"}},
                    {"data": {"objectId": "0x3", "type": "0xfab::punks::Punk"}},
                    {"data": {"objectId": "0x4", "type": "0xcafe::kiosk::Pass<0x2::sui::SUI>"}},
                    {"data": {"objectId": "0x5"}},
                ]}))
            }
            other => Err(AnalysisError::Rpc(format!("unexpected {}", other))),
        });
        rpc
    }

    #[tokio::test]
    async fn coins_and_objects_are_grouped_by_type() {
        let holdings = aggregator(wallet_rpc(), 2.0).fetch("0xabc0000001").await.unwrap();

        assert_eq!(holdings.count, 6);
        assert_eq!(holdings.tokens.len(), 4);

        let Holding::Coin(sui) = &holdings.tokens["0x2::sui::SUI"] else {
            panic!("SUI should be a coin holding");
        };
        assert_eq!(sui.balance, 4_000_000_000);
        assert_eq!(sui.balance_formatted, 4.0);
        assert_eq!(sui.value_usd, 8.0);
        assert_eq!(sui.count, 2);

        let Holding::Coin(usdc) = &holdings.tokens["0xbeef::usdc::USDC"] else {
            panic!("USDC should be a coin holding");
        };
        assert_eq!(usdc.name, "USDC");
        assert_eq!(usdc.balance_formatted, 250.0);
        assert_eq!(usdc.value_usd, 0.0);

        let punks = &holdings.tokens["0xfab::punks::Punk"];
        assert_eq!(punks.name(), "Punk");
        assert_eq!(punks.count(), 2);
        assert_eq!(punks.balance(), None);
        assert_eq!(holdings.tokens["0xcafe::kiosk::Pass<0x2::sui::SUI>"].name(), "SUI>");
        assert!(!holdings.tokens.contains_key("0x2::coin::Coin<0x2::sui::SUI>"));
    }

    #[tokio::test]
    async fn total_value_is_sum_of_holdings() {
        let holdings = aggregator(wallet_rpc(), 1.37).fetch("0xabc0000001").await.unwrap();
        let summed: f64 = holdings.tokens.values().map(Holding::value_usd).sum();
        assert_eq!(holdings.total_value_usd, summed);
    }

    #[test]
    fn synthetic_totals_match_for_many_types() {
        let mut holdings = TokenHoldings::default();
        let coins: Vec<Value> = (0..40)
            .map(|i| {
                let coin_type = if i % 3 == 0 {
                    SUI_COIN_TYPE.to_string()
                } else {
                    format!("0x{:x}::meme::M{}", i, i % 7)
                };
                json!({"coinType": coin_type, "balance": (i as u64 * 123_456_789).to_string()})
            })
            .collect();
        let objects: Vec<Value> = (0..10)
            .map(|i| json!({"data": {"type": format!("0x9::art::Piece{}", i % 4)}}))
            .collect();
        add_coins(&mut holdings, &coins, 0.73);
        add_objects(&mut holdings, &objects);
        holdings.total_value_usd = holdings.tokens.values().map(Holding::value_usd).sum();

        assert_eq!(holdings.count, 50);
        let object_value: f64 = holdings
            .tokens
            .values()
            .filter(|h| matches!(h, Holding::Object(_)))
            .map(Holding::value_usd)
            .sum();
        assert_eq!(object_value, 0.0);
    }

    #[tokio::test]
    async fn one_failed_listing_still_reports_the_other() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call().returning(|method, _| match method {
            method::GET_ALL_COINS => Err(AnalysisError::Transport("reset".into())),
            _ => Ok(json!({"data": [{"data": {"type": "0xfab::punks::Punk"}}]})),
        });
        let holdings = aggregator(rpc, 2.0).fetch("0xabc0000001").await.unwrap();
        assert_eq!(holdings.count, 1);
        assert_eq!(holdings.total_value_usd, 0.0);
    }

    #[tokio::test]
    async fn both_listings_failing_is_an_error() {
        let mut rpc = MockRpcGateway::new();
        rpc.expect_call()
            .returning(|_, _| Err(AnalysisError::Rpc("overloaded".into())));
        let err = aggregator(rpc, 2.0).fetch("0xabc0000001").await.unwrap_err();
        assert_eq!(err, AnalysisError::Rpc("overloaded".into()));
    }
}
