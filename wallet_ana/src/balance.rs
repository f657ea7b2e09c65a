use abi::json::{as_u128, str_field};
use abi::{
    mist_to_sui, AnalysisError, BalanceReport, Config, PriceGateway, SuiRpc, SUI_COIN_TYPE,
    SUI_SYMBOL,
};
use log::{debug, error, warn};
use serde_json::Value;
use std::sync::Arc;

pub const COIN_PAGE_LIMIT: u32 = 50;

/// Native SUI balance with its USD valuation.
pub struct BalanceAggregator {
    rpc: SuiRpc,
    prices: Arc<dyn PriceGateway>,
    config: Arc<Config>,
}

impl BalanceAggregator {
    pub fn new(rpc: SuiRpc, prices: Arc<dyn PriceGateway>, config: Arc<Config>) -> Self {
        Self { rpc, prices, config }
    }

    pub async fn fetch(&self, address: &str) -> Result<BalanceReport, AnalysisError> {
        let raw = match self.rpc.all_coins(address, COIN_PAGE_LIMIT).await {
            Ok(coins) => sum_native_balance(&coins),
            Err(e) => {
                warn!("coin listing for {} failed ({}), falling back to getBalance", address, e);
                self.rpc
                    .balance(address, SUI_COIN_TYPE)
                    .await
                    .inspect_err(|e| error!("balance lookup for {} failed: {}", address, e))?
            }
        };

        let balance = mist_to_sui(raw);
        let price = native_price(self.prices.as_ref(), &self.config.native_price_id).await;
        debug!("{} holds {} MIST at ${} per SUI", address, raw, price);

        Ok(BalanceReport {
            coin: SUI_SYMBOL.to_string(),
            balance,
            value_usd: balance * price,
        })
    }
}

/// Sums raw balances of entries whose `coinType` is exactly the native type.
pub fn sum_native_balance(coins: &[Value]) -> u128 {
    coins
        .iter()
        .filter(|coin| str_field(coin, "coinType") == Some(SUI_COIN_TYPE))
        .filter_map(|coin| coin.get("balance").and_then(as_u128))
        .sum()
}

/// Price lookup that degrades to zero.
pub(crate) async fn native_price(prices: &dyn PriceGateway, id: &str) -> f64 {
    match prices.usd_price(id).await {
        Ok(price) => price,
        Err(e) => {
            warn!("price lookup for {} failed, valuing at 0: {}", id, e);
            0.0
        }
    }
}
