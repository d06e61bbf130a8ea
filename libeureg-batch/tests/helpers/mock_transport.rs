use async_trait::async_trait;
use libeureg_batch::{Batch, ErrorContext, ErrorSink, FetchError, Transport, TransportError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

// ============================================================================
// Mock Transport
// ============================================================================

/// Answers from a per-domain script of statuses.
///
/// Each time a domain is queried the next status in its script is used; the
/// last one repeats. Unscripted domains get the default status.
pub struct MockTransport {
    scripts: RwLock<HashMap<String, Vec<&'static str>>>,
    queried: RwLock<HashMap<String, usize>>,
    default_status: &'static str,
    sent: RwLock<Vec<Batch>>,
    call_count: Arc<AtomicUsize>,
    fail_on_call: RwLock<Option<usize>>,
    raw_body: RwLock<Option<String>>,
}

impl MockTransport {
    pub fn new(default_status: &'static str) -> Self {
        Self {
            scripts: RwLock::new(HashMap::new()),
            queried: RwLock::new(HashMap::new()),
            default_status,
            sent: RwLock::new(Vec::new()),
            call_count: Arc::new(AtomicUsize::new(0)),
            fail_on_call: RwLock::new(None),
            raw_body: RwLock::new(None),
        }
    }

    pub async fn script(&self, domain: &str, statuses: Vec<&'static str>) {
        self.scripts.write().await.insert(domain.to_string(), statuses);
    }

    /// Fail the n-th call (1-based) with an HTTP 503.
    pub async fn fail_on_call(&self, call: usize) {
        *self.fail_on_call.write().await = Some(call);
    }

    /// Return this body verbatim instead of building one.
    pub async fn respond_with(&self, body: &str) {
        *self.raw_body.write().await = Some(body.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<Batch> {
        self.sent.read().await.clone()
    }

    /// How many requests included `domain`.
    pub async fn queries_for(&self, domain: &str) -> usize {
        self.queried.read().await.get(domain).copied().unwrap_or(0)
    }

    async fn status_for(&self, domain: &str) -> &'static str {
        let mut queried = self.queried.write().await;
        let seen = queried.entry(domain.to_string()).or_insert(0);
        let index = *seen;
        *seen += 1;

        match self.scripts.read().await.get(domain) {
            Some(script) if !script.is_empty() => script[index.min(script.len() - 1)],
            _ => self.default_status,
        }
    }
}

fn wire_record(domain: &str, status: &str) -> Value {
    if status == "AVAILABLE" {
        json!({
            "code": "DOM12M", "idn": domain, "name": domain, "premium": 0,
            "price": "14.00", "registry_id": 17, "renew": "14.00",
            "status": status, "unit_price": "14.00"
        })
    } else {
        json!({"idn": domain, "name": domain, "status": status})
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, batch: &Batch) -> Result<String, TransportError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.write().await.push(batch.clone());

        if *self.fail_on_call.read().await == Some(call) {
            return Err(TransportError::Status(503));
        }
        if let Some(body) = self.raw_body.read().await.clone() {
            return Ok(body);
        }

        let mut data = Vec::with_capacity(batch.len());
        for domain in &batch.domains {
            let status = self.status_for(domain).await;
            data.push(wire_record(domain, status));
        }
        Ok(json!({ "data": data }).to_string())
    }
}

// ============================================================================
// Recording ErrorSink
// ============================================================================

#[derive(Default)]
pub struct RecordingErrorSink {
    entries: Mutex<Vec<(String, ErrorContext)>>,
}

impl RecordingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, ErrorContext)> {
        self.entries.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingErrorSink {
    fn record(&self, error: &FetchError, context: &ErrorContext) {
        self.entries
            .lock()
            .unwrap()
            .push((error.to_string(), context.clone()));
    }
}
