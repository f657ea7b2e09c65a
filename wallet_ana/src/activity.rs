use abi::{ActivityLevel, ActivitySummary, AnalysisError, SuiRpc, TxFilter};
use log::{debug, warn};

pub const ACTIVITY_PAGE_LIMIT: u32 = 30;

/// Directional transaction counts. Counts are page lengths, so anything past
/// `ACTIVITY_PAGE_LIMIT` per direction is not seen.
pub struct ActivityAggregator {
    rpc: SuiRpc,
}

impl ActivityAggregator {
    pub fn new(rpc: SuiRpc) -> Self {
        Self { rpc }
    }

    pub async fn fetch(&self, address: &str) -> Result<ActivitySummary, AnalysisError> {
        let (outgoing, incoming) = futures::join!(
            self.rpc
                .transaction_blocks(TxFilter::FromAddress(address), ACTIVITY_PAGE_LIMIT),
            self.rpc
                .transaction_blocks(TxFilter::ToAddress(address), ACTIVITY_PAGE_LIMIT),
        );

        let (outgoing_txs, incoming_txs) = match (outgoing, incoming) {
            (Err(e), Err(_)) => return Err(e),
            (outgoing, incoming) => (
                page_len(address, "outgoing", outgoing),
                page_len(address, "incoming", incoming),
            ),
        };

        let total = outgoing_txs + incoming_txs;
        debug!("{}: {} out / {} in", address, outgoing_txs, incoming_txs);
        Ok(ActivitySummary {
            incoming_txs,
            outgoing_txs,
            total,
            level: ActivityLevel::from_count(total),
        })
    }
}

fn page_len(
    address: &str,
    direction: &str,
    page: Result<Vec<serde_json::Value>, AnalysisError>,
) -> u64 {
    match page {
        Ok(page) => page.len() as u64,
        Err(e) => {
            warn!("{} transaction query for {} failed, counting 0: {}", direction, address, e);
            0
        }
    }
}
