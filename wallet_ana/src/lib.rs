pub mod activity;
pub mod balance;
pub mod report;
pub mod tokens;

pub use activity::ActivityAggregator;
pub use balance::BalanceAggregator;
pub use report::WalletInspector;
pub use tokens::TokenAggregator;
