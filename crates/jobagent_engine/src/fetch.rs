//! Page fetching with browser-like headers, hand-followed redirects and a
//! body size cap.

use std::time::Duration;

use agent_logging::agent_debug;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use url::Url;

use crate::{FailureKind, FetchError};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_redirects: usize,
    pub max_bytes: u64,
    /// Media types accepted without parameters, compared case-insensitively.
    pub accepted_media_types: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            max_redirects: 5,
            max_bytes: 5 * 1024 * 1024,
            accepted_media_types: vec!["text/html".into(), "application/xhtml+xml".into()],
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// Raw body of a fetched page plus where it finally came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub requested_url: String,
    pub final_url: String,
    pub redirects: usize,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            // Redirects are followed in `fetch` so hops can be counted.
            .redirect(Policy::none())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { client, settings })
    }

    fn accepts(&self, content_type: &str) -> bool {
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        self.settings
            .accepted_media_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(media_type))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut current = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let mut redirects = 0;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(transport_error)?;
            let status = response.status();

            if status.is_redirection() {
                if redirects >= self.settings.max_redirects {
                    return Err(FetchError::new(
                        FailureKind::TooManyRedirects(self.settings.max_redirects),
                        current.to_string(),
                    ));
                }
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| {
                        FetchError::new(
                            FailureKind::HttpStatus(status.as_u16()),
                            "redirect without location",
                        )
                    })?;
                let next = current
                    .join(location)
                    .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
                agent_debug!("redirect {} -> {}", current, next);
                current = next;
                redirects += 1;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::new(
                    FailureKind::HttpStatus(status.as_u16()),
                    current.to_string(),
                ));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            if let Some(ct) = content_type.as_deref().filter(|ct| !self.accepts(ct)) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType(ct.to_string()),
                    current.to_string(),
                ));
            }

            let body = read_capped(response, self.settings.max_bytes).await?;
            return Ok(FetchedPage {
                requested_url: url.to_string(),
                final_url: current.to_string(),
                redirects,
                content_type,
                body,
            });
        }
    }
}

async fn read_capped(response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    let url = response.url().to_string();
    if response.content_length().is_some_and(|len| len > max_bytes) {
        return Err(FetchError::new(FailureKind::TooLarge { max_bytes }, url));
    }

    let mut body = Vec::new();
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(transport_error)?;
        if (body.len() + chunk.len()) as u64 > max_bytes {
            return Err(FetchError::new(FailureKind::TooLarge { max_bytes }, url));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn transport_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.to_string())
}
