use std::{collections::HashMap, time::Duration};
use tracing::{debug, info, warn};

use crate::{
    batch::{Batch, BatchId},
    fetcher::{FetchError, StatusFetcher},
    types::DomainRecord,
};

/// Records after pending resolution, plus how many rounds it took.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub records: Vec<DomainRecord>,
    pub attempts: u32,
}

impl Resolution {
    pub fn unresolved(&self) -> usize {
        self.records.iter().filter(|r| r.is_pending()).count()
    }
}

/// Re-queries domains the registrar has not settled yet.
///
/// Each round sends only the names still pending, in requests of at most
/// `max_domains_per_request` names, and writes the answers back over the
/// matching entries. Whatever is still pending after `max_attempts` rounds is
/// returned as is.
pub struct PendingResolver<'a> {
    fetcher: &'a StatusFetcher,
    max_attempts: u32,
    delay: Duration,
    max_domains_per_request: usize,
}

impl<'a> PendingResolver<'a> {
    pub fn new(fetcher: &'a StatusFetcher, max_attempts: u32, max_domains_per_request: usize) -> Self {
        Self {
            fetcher,
            max_attempts,
            delay: Duration::ZERO,
            max_domains_per_request: max_domains_per_request.max(1),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn resolve(&self, mut records: Vec<DomainRecord>) -> Result<Resolution, FetchError> {
        let mut attempts = 0;

        while attempts < self.max_attempts {
            let pending = pending_names(&records);
            if pending.is_empty() {
                break;
            }

            attempts += 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            debug!(attempt = attempts, pending = pending.len(), "Re-querying pending domains");

            for (index, chunk) in pending.chunks(self.max_domains_per_request).enumerate() {
                let batch = Batch::from_names(
                    BatchId::Pending {
                        attempt: attempts,
                        index,
                    },
                    chunk.to_vec(),
                );
                let updates = self.fetcher.fetch(&batch).await?;
                merge(&mut records, updates);
            }
        }

        let resolution = Resolution { records, attempts };
        let unresolved = resolution.unresolved();
        if unresolved > 0 {
            warn!(unresolved, attempts, "Domains still pending after retry budget");
        } else if attempts > 0 {
            info!(attempts, "All pending domains resolved");
        }
        Ok(resolution)
    }
}

/// Distinct pending names, in result order.
fn pending_names(records: &[DomainRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records.iter().filter(|r| r.is_pending()) {
        if !names.iter().any(|n| n == record.name()) {
            names.push(record.name().to_string());
        }
    }
    names
}

/// Replace every pending entry whose name has a fresh answer.
fn merge(records: &mut [DomainRecord], updates: Vec<DomainRecord>) {
    let updates: HashMap<String, DomainRecord> = updates
        .into_iter()
        .map(|record| (record.name().to_ascii_lowercase(), record))
        .collect();

    for record in records.iter_mut().filter(|r| r.is_pending()) {
        if let Some(update) = updates.get(&record.name().to_ascii_lowercase()) {
            *record = update.clone();
        }
    }
}
