use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::tlds::ConfigurationError;

/// Keywords kept from one `check` call; the rest are discarded.
pub const MAX_KEYWORDS_PER_CHECK: usize = 70;
/// Keywords the registrar accepts in a single multi-check request.
pub const MAX_KEYWORDS_PER_BATCH: usize = 70;
/// Re-queries issued for domains still reported as pending.
pub const MAX_PENDING_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainStatus {
    Available,
    NotAvailable,
    Pending,
}

/// A domain the registrar will sell, with its pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableRecord {
    pub name: String,
    pub idn: Option<String>,
    pub code: Option<String>,
    #[serde(with = "premium_flag")]
    pub premium: bool,
    pub price: Option<String>,
    pub registry_id: Option<u64>,
    pub renew: Option<String>,
    pub unit_price: Option<String>,
}

/// The registrar writes `premium` as `0`/`1`; booleans are read too.
mod premium_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u64),
    }

    pub fn serialize<S: Serializer>(premium: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*premium))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableRecord {
    pub name: String,
    pub idn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    pub name: String,
    pub idn: Option<String>,
}

/// Result for one fully-qualified domain name.
///
/// Serializes in the registrar's own shape, with `status` as the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainRecord {
    Available(AvailableRecord),
    NotAvailable(UnavailableRecord),
    Pending(PendingRecord),
}

impl DomainRecord {
    pub fn pending(name: impl Into<String>) -> Self {
        DomainRecord::Pending(PendingRecord {
            name: name.into(),
            idn: None,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            DomainRecord::Available(r) => &r.name,
            DomainRecord::NotAvailable(r) => &r.name,
            DomainRecord::Pending(r) => &r.name,
        }
    }

    pub fn status(&self) -> DomainStatus {
        match self {
            DomainRecord::Available(_) => DomainStatus::Available,
            DomainRecord::NotAvailable(_) => DomainStatus::NotAvailable,
            DomainRecord::Pending(_) => DomainStatus::Pending,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DomainRecord::Available(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DomainRecord::Pending(_))
    }
}

#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub max_keywords: usize,
    pub keywords_per_batch: usize,
    pub max_pending_attempts: u32,
    /// Pause before each pending round, giving the registry time to settle.
    pub pending_delay: Duration,
    pub request_timeout: Duration,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_keywords == 0 {
            return Err(ConfigurationError::InvalidLimit { name: "max_keywords" });
        }
        if self.keywords_per_batch == 0 {
            return Err(ConfigurationError::InvalidLimit {
                name: "keywords_per_batch",
            });
        }
        Ok(())
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_keywords: MAX_KEYWORDS_PER_CHECK,
            keywords_per_batch: MAX_KEYWORDS_PER_BATCH,
            max_pending_attempts: MAX_PENDING_ATTEMPTS,
            pending_delay: Duration::ZERO,
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Outcome of a check, with the bookkeeping `check` itself discards.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub records: Vec<DomainRecord>,
    /// Pending rounds issued after the initial batches.
    pub pending_rounds: u32,
    /// Domains still pending when the retry budget ran out.
    pub unresolved: usize,
}
