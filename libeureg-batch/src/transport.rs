use async_trait::async_trait;
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client, Request,
};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;

use crate::{batch::Batch, http::create_http_client, ratelimit::RequestPacer};

const MULTI_CHECK_URL: &str = "https://www.eureg.ro/ro/web-api/check-multi";
const REGISTRATION_URL: &str = "https://www.eureg.ro/ro/inregistreaza/verifica-domeniu";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/113.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (Linux; Android 11; SM-G975F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.159 Mobile Safari/537.36",
];

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

/// Sends one batch to the registrar and hands back the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, batch: &Batch) -> Result<String, TransportError>;
}

#[derive(Debug, Clone)]
pub struct EuregConfig {
    pub multi_check_url: String,
    pub registration_url: String,
    pub timeout: Duration,
    /// Zero disables pacing.
    pub max_requests_per_second: u32,
}

impl Default for EuregConfig {
    fn default() -> Self {
        Self {
            multi_check_url: MULTI_CHECK_URL.to_string(),
            registration_url: REGISTRATION_URL.to_string(),
            timeout: Duration::from_secs(15),
            max_requests_per_second: 2,
        }
    }
}

/// [`Transport`] over the EuReg `check-multi` web API.
pub struct EuregTransport {
    client: Client,
    pacer: RequestPacer,
    session_ready: AtomicBool,
    config: EuregConfig,
}

impl EuregTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(EuregConfig::default())
    }

    pub fn with_config(config: EuregConfig) -> Result<Self, TransportError> {
        let user_agent = USER_AGENTS[fastrand::usize(..USER_AGENTS.len())];
        let client = create_http_client(config.timeout, user_agent).map_err(TransportError::Client)?;
        Ok(Self {
            client,
            pacer: RequestPacer::new(config.max_requests_per_second),
            session_ready: AtomicBool::new(false),
            config,
        })
    }

    /// Visit the registration page once so the server hands out its session cookies.
    async fn ensure_session(&self) -> Result<(), TransportError> {
        if self.session_ready.load(Ordering::Relaxed) {
            return Ok(());
        }

        self.pacer.acquire().await;
        let response = self
            .client
            .get(&self.config.registration_url)
            .headers(browser_headers())
            .send()
            .await?;
        debug!(status = response.status().as_u16(), "Registrar session opened");

        self.session_ready.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub fn build_request(&self, batch: &Batch) -> Result<Request, TransportError> {
        let request = self
            .client
            .get(&self.config.multi_check_url)
            .query(&[("names", batch.names_param())])
            .headers(browser_headers())
            .header(header::REFERER, self.config.registration_url.as_str())
            .build()?;
        Ok(request)
    }
}

#[async_trait]
impl Transport for EuregTransport {
    async fn send(&self, batch: &Batch) -> Result<String, TransportError> {
        self.ensure_session().await?;
        let request = self.build_request(batch)?;

        self.pacer.acquire().await;
        debug!(batch = %batch.id, domains = batch.len(), "Sending multi-check request");

        let timeout = self.config.timeout;
        let response = match tokio::time::timeout(timeout, self.client.execute(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(TransportError::Timeout(timeout)),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
    headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("same-origin"));
    headers
}
