use abi::{AnalysisError, RelationshipVerdict, SuiRpc, TxFilter};
use futures::future::join_all;
use log::{info, warn};
use std::collections::BTreeSet;

pub const OUTGOING_PAGE_LIMIT: u32 = 20;

/// Flags addresses that share outgoing transactions.
///
/// A transaction has a single sender, so distinct addresses rarely share an
/// outgoing digest; this mostly yields false negatives.
pub struct RelationshipDetector {
    rpc: SuiRpc,
}

impl RelationshipDetector {
    pub fn new(rpc: SuiRpc) -> Self {
        Self { rpc }
    }

    /// Duplicate addresses are compared once. Fails only if every lookup failed.
    pub async fn check(&self, addresses: &[String]) -> Result<RelationshipVerdict, AnalysisError> {
        let mut seen = BTreeSet::new();
        let addresses: Vec<&str> = addresses
            .iter()
            .map(String::as_str)
            .filter(|address| seen.insert(*address))
            .collect();
        if addresses.len() < 2 {
            return Ok(RelationshipVerdict {
                related: false,
                shared_transactions: Vec::new(),
                reason: "Not enough addresses to compare".to_string(),
            });
        }

        let lookups = join_all(addresses.iter().map(|address| self.outgoing(address))).await;
        let mut digests = Vec::with_capacity(lookups.len());
        let mut first_error = None;
        for (address, lookup) in addresses.iter().zip(lookups) {
            match lookup {
                Ok(set) => digests.push(set),
                Err(e) => {
                    warn!("outgoing transactions for {} unavailable: {}", address, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if digests.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        let verdict = verdict_from(shared_transactions(&digests));
        info!("relationship check over {} addresses: {}", addresses.len(), verdict.reason);
        Ok(verdict)
    }

    async fn outgoing(&self, address: &str) -> Result<BTreeSet<String>, AnalysisError> {
        let txs = self
            .rpc
            .transaction_blocks(TxFilter::FromAddress(address), OUTGOING_PAGE_LIMIT)
            .await?;
        Ok(txs
            .iter()
            .filter_map(|tx| tx.get("digest").and_then(|d| d.as_str()))
            .map(str::to_string)
            .collect())
    }
}

/// Union of every pairwise intersection.
pub fn shared_transactions(sets: &[BTreeSet<String>]) -> BTreeSet<String> {
    let mut shared = BTreeSet::new();
    for (i, left) in sets.iter().enumerate() {
        for right in &sets[i + 1..] {
            shared.extend(left.intersection(right).cloned());
        }
    }
    shared
}

pub fn verdict_from(shared: BTreeSet<String>) -> RelationshipVerdict {
    if shared.is_empty() {
        RelationshipVerdict {
            related: false,
            shared_transactions: Vec::new(),
            reason: "No relationship detected".to_string(),
        }
    } else {
        RelationshipVerdict {
            related: true,
            reason: format!("Found {} common transactions", shared.len()),
            shared_transactions: shared.into_iter().collect(),
        }
    }
}
