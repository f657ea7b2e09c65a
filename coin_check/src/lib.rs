pub mod contract;
pub mod relationship;
pub mod report;
pub mod risk;
pub mod trading;

pub use contract::TokenContractAnalyzer;
pub use relationship::RelationshipDetector;
pub use report::{is_healthy, TokenInspector};
pub use risk::RiskScorer;
pub use trading::TradingSignalAnalyzer;
