use crate::error::AnalysisError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://fullnode.mainnet.sui.io:443";
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
pub const DEFAULT_NATIVE_PRICE_ID: &str = "sui";
pub const DEFAULT_EXPLORER_URL: &str = "https://suiscan.xyz/mainnet/";
pub const DEFAULT_ALT_EXPLORER_URL: &str = "https://suivision.xyz/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Endpoints and limits shared by every component. Built once, then passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rpc_url: String,
    pub price_api_url: String,
    /// Price-API identifier of the native coin.
    pub native_price_id: String,
    pub explorer_url: String,
    pub alt_explorer_url: String,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            native_price_id: DEFAULT_NATIVE_PRICE_ID.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            alt_explorer_url: DEFAULT_ALT_EXPLORER_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Reads overrides from the environment (call `dotenv` first).
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AnalysisError> {
        let defaults = Config::default();
        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AnalysisError::Config(format!("REQUEST_TIMEOUT_SECS must be a number of seconds, got `{}`", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(AnalysisError::Config("REQUEST_TIMEOUT_SECS must be positive".to_string()));
        }

        let config = Config {
            rpc_url: lookup("SUI_RPC_URL").unwrap_or(defaults.rpc_url),
            price_api_url: lookup("PRICE_API_URL").unwrap_or(defaults.price_api_url),
            native_price_id: lookup("NATIVE_PRICE_ID").unwrap_or(defaults.native_price_id),
            explorer_url: with_trailing_slash(lookup("EXPLORER_URL").unwrap_or(defaults.explorer_url)),
            alt_explorer_url: with_trailing_slash(lookup("ALT_EXPLORER_URL").unwrap_or(defaults.alt_explorer_url)),
            request_timeout: Duration::from_secs(timeout_secs),
        };
        debug!("loaded config: {:?}", config);
        Ok(config)
    }

    pub fn account_links(&self, address: &str) -> ExplorerLinks {
        ExplorerLinks {
            suiscan: format!("{}account/{}", self.explorer_url, address),
            suivision: format!("{}account/{}", self.alt_explorer_url, address),
        }
    }

    pub fn object_links(&self, object_id: &str) -> ExplorerLinks {
        ExplorerLinks {
            suiscan: format!("{}object/{}", self.explorer_url, object_id),
            suivision: format!("{}object/{}", self.alt_explorer_url, object_id),
        }
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExplorerLinks {
    pub suiscan: String,
    pub suivision: String,
}
