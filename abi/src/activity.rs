use serde::{Deserialize, Serialize};
use std::fmt;

fn bucket(count: u64, low: u64, high: u64) -> u8 {
    match count {
        0 => 0,
        n if n < low => 1,
        n if n < high => 2,
        _ => 3,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActivityLevel {
    Inactive,
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    // thresholds 0/10/50
    pub fn from_count(count: u64) -> Self {
        Self::from_ordinal(bucket(count, 10, 50))
    }

    fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            0 => ActivityLevel::Inactive,
            1 => ActivityLevel::Low,
            2 => ActivityLevel::Moderate,
            _ => ActivityLevel::High,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLevel::Inactive => "Inactive",
            ActivityLevel::Low => "Low",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// Wallet-level label. The names deliberately follow the upstream table where
/// ordinal 2 is "Normal" and ordinal 3 is "Moderate".
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum WalletActivity {
    Inactive,
    Low,
    Normal,
    Moderate,
}

impl WalletActivity {
    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            0 => WalletActivity::Inactive,
            1 => WalletActivity::Low,
            2 => WalletActivity::Normal,
            _ => WalletActivity::Moderate,
        }
    }
}

impl fmt::Display for WalletActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WalletActivity::Inactive => "Inactive",
            WalletActivity::Low => "Low",
            WalletActivity::Normal => "Normal",
            WalletActivity::Moderate => "Moderate",
        };
        f.write_str(label)
    }
}

/// Combines transaction volume (0/10/50) and holdings count (0/5/20),
/// keeping whichever bucket is higher.
pub fn combined_activity(transaction_count: u64, token_count: u64) -> WalletActivity {
    let tx_level = bucket(transaction_count, 10, 50);
    let token_level = bucket(token_count, 5, 20);
    WalletActivity::from_ordinal(tx_level.max(token_level))
}
