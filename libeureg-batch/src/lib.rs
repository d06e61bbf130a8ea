mod batch;
mod checker;
mod fetcher;
mod http;
mod ratelimit;
mod resolver;
pub mod sink;
pub mod slug;
pub mod tlds;
mod transport;
mod types;

pub use batch::{Batch, BatchId, DomainQuery, RequestBuilder};
pub use checker::{BatchAvailabilityChecker, CheckError};
pub use fetcher::{parse_response, FetchError, StatusFetcher};
pub use resolver::{PendingResolver, Resolution};
pub use sink::{ErrorContext, ErrorSink, FileErrorSink, TracingErrorSink};
pub use tlds::{resolve_tlds, ConfigurationError, Tld};
pub use transport::{EuregConfig, EuregTransport, Transport, TransportError};
pub use types::{
    AvailableRecord, CheckConfig, CheckReport, DomainRecord, DomainStatus, PendingRecord,
    UnavailableRecord, MAX_KEYWORDS_PER_BATCH, MAX_KEYWORDS_PER_CHECK, MAX_PENDING_ATTEMPTS,
};

/// Check keyword ideas against the live registrar with default limits.
pub async fn check<S, T>(
    domain_names: &[S],
    preferred_tlds: Option<&[T]>,
    return_available_only: bool,
) -> Result<Vec<DomainRecord>, CheckError>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let checker = BatchAvailabilityChecker::eureg(CheckConfig::default())?;
    checker
        .check(domain_names, preferred_tlds, return_available_only)
        .await
}
