use serde::Deserialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    batch::{Batch, BatchId},
    sink::{ErrorContext, ErrorSink},
    transport::{Transport, TransportError},
    types::{AvailableRecord, DomainRecord, PendingRecord, UnavailableRecord},
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Batch {batch}: {source}")]
    Transport {
        batch: BatchId,
        #[source]
        source: TransportError,
    },
    #[error("Batch {batch}: malformed response body: {source}")]
    Malformed {
        batch: BatchId,
        #[source]
        source: serde_json::Error,
    },
    #[error("Batch {batch}: response has no data list")]
    MissingData { batch: BatchId },
}

impl FetchError {
    pub fn batch(&self) -> BatchId {
        match self {
            FetchError::Transport { batch, .. }
            | FetchError::Malformed { batch, .. }
            | FetchError::MissingData { batch } => *batch,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MultiCheckResponse {
    #[serde(default)]
    data: Option<Vec<WireRecord>>,
}

/// One entry of `data`. Which fields are present depends on status.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    idn: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    premium: Option<Value>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    registry_id: Option<Value>,
    #[serde(default)]
    renew: Option<Value>,
    #[serde(default)]
    unit_price: Option<Value>,
}

impl WireRecord {
    /// `None` for entries without a name; they can't be matched to a domain.
    fn into_record(self) -> Option<DomainRecord> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                warn!(status = ?self.status, "Response entry has no name, ignoring");
                return None;
            }
        };
        let status = self.status.as_deref().map(str::to_ascii_lowercase);
        let record = match status.as_deref() {
            Some("available") => DomainRecord::Available(AvailableRecord {
                premium: self.premium.as_ref().is_some_and(truthy),
                price: self.price.as_ref().and_then(decimal),
                registry_id: self.registry_id.as_ref().and_then(integer),
                renew: self.renew.as_ref().and_then(decimal),
                unit_price: self.unit_price.as_ref().and_then(decimal),
                code: self.code,
                idn: self.idn,
                name,
            }),
            Some("not_available") => DomainRecord::NotAvailable(UnavailableRecord { name, idn: self.idn }),
            Some("pending") => DomainRecord::Pending(PendingRecord { name, idn: self.idn }),
            other => {
                warn!(domain = %name, status = ?other, "Unrecognized domain status, treating as pending");
                DomainRecord::Pending(PendingRecord { name, idn: self.idn })
            }
        };
        Some(record)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    }
}

fn decimal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a `check-multi` body and line its records up with the batch.
///
/// Names the registrar left out come back as pending so they get re-queried.
pub fn parse_response(batch: &Batch, body: &str) -> Result<Vec<DomainRecord>, FetchError> {
    let response: MultiCheckResponse =
        serde_json::from_str(body).map_err(|source| FetchError::Malformed {
            batch: batch.id,
            source,
        })?;
    let data = response
        .data
        .ok_or(FetchError::MissingData { batch: batch.id })?;

    let by_name: HashMap<String, DomainRecord> = data
        .into_iter()
        .filter_map(WireRecord::into_record)
        .map(|record| (record.name().to_ascii_lowercase(), record))
        .collect();

    let records = batch
        .domains
        .iter()
        .map(|domain| {
            by_name
                .get(&domain.to_ascii_lowercase())
                .cloned()
                .unwrap_or_else(|| {
                    warn!(batch = %batch.id, domain = %domain, "Domain missing from response");
                    DomainRecord::pending(domain.clone())
                })
        })
        .collect();
    Ok(records)
}

/// Runs one request per batch and normalizes what comes back.
pub struct StatusFetcher {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ErrorSink>,
}

impl StatusFetcher {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn ErrorSink>) -> Self {
        Self { transport, sink }
    }

    pub async fn fetch(&self, batch: &Batch) -> Result<Vec<DomainRecord>, FetchError> {
        let result = match self.transport.send(batch).await {
            Ok(body) => parse_response(batch, &body),
            Err(source) => Err(FetchError::Transport {
                batch: batch.id,
                source,
            }),
        };

        match result {
            Ok(records) => {
                debug!(batch = %batch.id, records = records.len(), "Batch fetched");
                Ok(records)
            }
            Err(error) => {
                self.sink.record(&error, &ErrorContext::now(batch.id, batch.len()));
                Err(error)
            }
        }
    }
}
