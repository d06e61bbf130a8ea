use std::fmt;
use tracing::{debug, warn};

use crate::{
    slug::slugify,
    tlds::{ConfigurationError, Tld},
};

/// One keyword paired with one suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainQuery {
    slug: String,
    tld: Tld,
}

impl DomainQuery {
    pub fn new(keyword: &str, tld: Tld) -> Self {
        Self {
            slug: slugify(keyword),
            tld,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn tld(&self) -> Tld {
        self.tld
    }

    pub fn domain_name(&self) -> String {
        format!("{}.{}", self.slug, self.tld)
    }
}

/// Where a batch sits within one `check` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchId {
    Initial { index: usize },
    Pending { attempt: u32, index: usize },
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchId::Initial { index } => write!(f, "initial#{}", index),
            BatchId::Pending { attempt, index } => write!(f, "pending-{}#{}", attempt, index),
        }
    }
}

/// Fully-qualified names sent together in one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub id: BatchId,
    pub domains: Vec<String>,
}

impl Batch {
    pub fn from_queries(id: BatchId, queries: &[DomainQuery]) -> Self {
        Self {
            id,
            domains: queries.iter().map(DomainQuery::domain_name).collect(),
        }
    }

    /// Build a batch from names that already carry their suffix.
    pub fn from_names(id: BatchId, domains: Vec<String>) -> Self {
        Self { id, domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// The value of the `names` query parameter.
    pub fn names_param(&self) -> String {
        self.domains.join(",")
    }
}

/// Splits keyword ideas into request-sized batches.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    max_keywords: usize,
    keywords_per_batch: usize,
}

impl RequestBuilder {
    pub fn new(max_keywords: usize, keywords_per_batch: usize) -> Result<Self, ConfigurationError> {
        if max_keywords == 0 {
            return Err(ConfigurationError::InvalidLimit { name: "max_keywords" });
        }
        if keywords_per_batch == 0 {
            return Err(ConfigurationError::InvalidLimit {
                name: "keywords_per_batch",
            });
        }
        Ok(Self {
            max_keywords,
            keywords_per_batch,
        })
    }

    /// Most domain names a single request built here can carry.
    pub fn max_domains_per_request(&self) -> usize {
        self.keywords_per_batch * Tld::ALL.len()
    }

    /// Slugs of the keywords a check keeps, in input order.
    ///
    /// Keywords past `max_keywords` are dropped. A kept keyword that
    /// normalizes to an empty slug cannot form a domain name and is rejected.
    pub fn slugs<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<String>, ConfigurationError> {
        if keywords.len() > self.max_keywords {
            warn!(
                requested = keywords.len(),
                kept = self.max_keywords,
                "Keyword list truncated"
            );
        }

        keywords
            .iter()
            .take(self.max_keywords)
            .map(|keyword| {
                let slug = slugify(keyword.as_ref());
                if slug.is_empty() {
                    return Err(ConfigurationError::EmptyKeyword(keyword.as_ref().to_string()));
                }
                Ok(slug)
            })
            .collect()
    }

    /// Pair every kept keyword with every TLD, keyword-major.
    pub fn queries<S: AsRef<str>>(
        &self,
        keywords: &[S],
        tlds: &[Tld],
    ) -> Result<Vec<Vec<DomainQuery>>, ConfigurationError> {
        Ok(self
            .slugs(keywords)?
            .into_iter()
            .map(|slug| {
                tlds.iter()
                    .map(|&tld| DomainQuery {
                        slug: slug.clone(),
                        tld,
                    })
                    .collect()
            })
            .collect())
    }

    pub fn build<S: AsRef<str>>(&self, keywords: &[S], tlds: &[Tld]) -> Result<Vec<Batch>, ConfigurationError> {
        let groups = self.queries(keywords, tlds)?;
        if tlds.is_empty() {
            return Ok(Vec::new());
        }

        let batches: Vec<Batch> = groups
            .chunks(self.keywords_per_batch)
            .enumerate()
            .map(|(index, chunk)| {
                let queries: Vec<DomainQuery> = chunk.iter().flatten().cloned().collect();
                Batch::from_queries(BatchId::Initial { index }, &queries)
            })
            .collect();

        debug!(
            keywords = groups.len(),
            tlds = tlds.len(),
            batches = batches.len(),
            "Built request batches"
        );
        Ok(batches)
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            max_keywords: crate::types::MAX_KEYWORDS_PER_CHECK,
            keywords_per_batch: crate::types::MAX_KEYWORDS_PER_BATCH,
        }
    }
}
