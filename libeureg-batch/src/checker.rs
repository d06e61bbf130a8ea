use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    batch::RequestBuilder,
    fetcher::{FetchError, StatusFetcher},
    resolver::PendingResolver,
    sink::{ErrorSink, TracingErrorSink},
    tlds::{resolve_tlds, ConfigurationError},
    transport::{EuregConfig, EuregTransport, Transport, TransportError},
    types::{CheckConfig, CheckReport, DomainRecord},
};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Failed to set up registrar transport: {0}")]
    Setup(#[from] TransportError),
}

/// Bulk availability checks: batching, fetching and pending resolution.
///
/// Batches and pending rounds run one after another. A failed request aborts
/// the whole check once it has been handed to the error sink; no partial
/// results are returned.
pub struct BatchAvailabilityChecker {
    builder: RequestBuilder,
    fetcher: StatusFetcher,
    config: CheckConfig,
}

impl BatchAvailabilityChecker {
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn ErrorSink>,
        config: CheckConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            builder: RequestBuilder::new(config.max_keywords, config.keywords_per_batch)?,
            fetcher: StatusFetcher::new(transport, sink),
            config,
        })
    }

    /// Checker over the live registrar API, reporting failures through `tracing`.
    pub fn eureg(config: CheckConfig) -> Result<Self, CheckError> {
        let transport = EuregTransport::with_config(EuregConfig {
            timeout: config.request_timeout,
            ..EuregConfig::default()
        })?;
        Ok(Self::new(Arc::new(transport), Arc::new(TracingErrorSink), config)?)
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check every keyword against every selected TLD.
    ///
    /// `preferred_tlds` of `None` means all six supported suffixes. With
    /// `return_available_only` set, only available domains are returned.
    pub async fn check<S, T>(
        &self,
        domain_names: &[S],
        preferred_tlds: Option<&[T]>,
        return_available_only: bool,
    ) -> Result<Vec<DomainRecord>, CheckError>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let report = self
            .check_with_report(domain_names, preferred_tlds, return_available_only)
            .await?;
        Ok(report.records)
    }

    pub async fn check_with_report<S, T>(
        &self,
        domain_names: &[S],
        preferred_tlds: Option<&[T]>,
        return_available_only: bool,
    ) -> Result<CheckReport, CheckError>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let tlds = resolve_tlds(preferred_tlds)?;
        let batches = self.builder.build(domain_names, &tlds)?;

        let mut records = Vec::with_capacity(batches.iter().map(|b| b.len()).sum());
        for batch in &batches {
            records.extend(self.fetcher.fetch(batch).await?);
        }

        let resolution = PendingResolver::new(
            &self.fetcher,
            self.config.max_pending_attempts,
            self.builder.max_domains_per_request(),
        )
        .with_delay(self.config.pending_delay)
        .resolve(records)
        .await?;

        let unresolved = resolution.unresolved();
        let pending_rounds = resolution.attempts;
        let mut records = resolution.records;
        let total = records.len();
        if return_available_only {
            records.retain(DomainRecord::is_available);
        }

        info!(
            batches = batches.len(),
            checked = total,
            returned = records.len(),
            pending_rounds,
            unresolved,
            "Availability check finished"
        );
        debug!(tlds = ?tlds, "TLDs checked");

        Ok(CheckReport {
            records,
            pending_rounds,
            unresolved,
        })
    }
}

