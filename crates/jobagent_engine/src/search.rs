use std::sync::Arc;
use std::time::Duration;

use agent_logging::{agent_debug, agent_info, agent_warn};
use jobagent_core::{
    dedupe_postings, is_job_relevant, source_from_link, synthesize_postings, JobPosting,
    ResultTier, SearchResults,
};
use rand::Rng;
use url::Url;

use crate::decode::decode_page;
use crate::extract::RankedExtractor;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::{FailureKind, FetchError};

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// One search strategy in the fallback chain.
#[async_trait::async_trait]
pub trait SearchTier: Send + Sync {
    fn tier(&self) -> ResultTier;

    /// Whether the postings produced by this tier are placeholders.
    fn synthetic(&self) -> bool {
        false
    }

    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<JobPosting>, FetchError>;
}

/// Source-specific lookups. No board integrations exist yet, so in demo mode
/// this tier answers with synthetic postings and otherwise stays empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSourceTier {
    demo: bool,
}

impl DirectSourceTier {
    pub fn new(demo: bool) -> Self {
        Self { demo }
    }
}

#[async_trait::async_trait]
impl SearchTier for DirectSourceTier {
    fn tier(&self) -> ResultTier {
        ResultTier::DirectSource
    }

    fn synthetic(&self) -> bool {
        self.demo
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        if !self.demo {
            return Ok(Vec::new());
        }
        let mut postings = synthesize_postings(query);
        postings.truncate(max_results);
        Ok(postings)
    }
}

/// Last resort: always synthesizes, so a search never ends empty without a reason.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticFallbackTier;

#[async_trait::async_trait]
impl SearchTier for SyntheticFallbackTier {
    fn tier(&self) -> ResultTier {
        ResultTier::SyntheticFallback
    }

    fn synthetic(&self) -> bool {
        true
    }

    async fn search(
        &self,
        query: &str,
        _max_results: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        Ok(synthesize_postings(query))
    }
}

/// Randomized pause between external search attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub min: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(2),
            max: Duration::from_secs(4),
        }
    }
}

impl Backoff {
    pub fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    pub fn next_delay(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

#[derive(Debug, Clone)]
pub struct WebSearchSettings {
    pub base_url: String,
    pub backoff: Backoff,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com".to_string(),
            backoff: Backoff::default(),
        }
    }
}

/// Scrapes a web search engine with a few query variants, stopping at the
/// first variant that yields a relevant hit.
pub struct WebSearchTier {
    fetcher: Arc<dyn Fetcher>,
    extractor: RankedExtractor,
    settings: WebSearchSettings,
}

impl WebSearchTier {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: RankedExtractor,
        settings: WebSearchSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
        }
    }

    pub fn query_variants(query: &str) -> Vec<String> {
        vec![
            format!("{query} jobs"),
            format!("{query} site:linkedin.com OR site:indeed.com OR site:glassdoor.com"),
            format!("\"{query}\" hiring"),
        ]
    }

    fn search_url(&self, variant: &str, max_results: usize) -> Result<Url, FetchError> {
        let base = self.settings.base_url.trim_end_matches('/');
        let num = max_results.to_string();
        Url::parse_with_params(
            &format!("{base}/search"),
            &[("q", variant), ("num", num.as_str())],
        )
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn attempt(
        &self,
        variant: &str,
        max_results: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.search_url(variant, max_results)?;
        let fetched = self.fetcher.fetch(url.as_str()).await?;
        let page = decode_page(&fetched)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
        let hits = self
            .extractor
            .extract(&page.html, max_results)
            .ok_or_else(|| FetchError::new(FailureKind::NoResultContainers, url.to_string()))?;

        let postings = hits
            .into_iter()
            .filter(|hit| is_job_relevant(&hit.title, &hit.link))
            .map(|hit| {
                let source = source_from_link(&hit.link);
                JobPosting::new(hit.title, hit.link, source)
            })
            .take(max_results)
            .collect();
        Ok(postings)
    }
}

#[async_trait::async_trait]
impl SearchTier for WebSearchTier {
    fn tier(&self) -> ResultTier {
        ResultTier::WebSearch
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<JobPosting>, FetchError> {
        let mut last_error = None;
        let mut any_succeeded = false;

        for (idx, variant) in Self::query_variants(query).iter().enumerate() {
            if idx > 0 {
                let delay = self.settings.backoff.next_delay();
                agent_debug!("web search backoff {:?} before variant {}", delay, idx + 1);
                tokio::time::sleep(delay).await;
            }

            match self.attempt(variant, max_results).await {
                Ok(postings) if !postings.is_empty() => return Ok(postings),
                Ok(_) => {
                    any_succeeded = true;
                    agent_debug!("web search variant {:?} had no relevant hits", variant);
                }
                Err(err) => {
                    agent_warn!("web search variant {:?} failed: {}", variant, err);
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if !any_succeeded => Err(err),
            _ => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub demo_mode: bool,
    pub fetch: FetchSettings,
    pub web: WebSearchSettings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            demo_mode: true,
            fetch: FetchSettings::default(),
            web: WebSearchSettings::default(),
        }
    }
}

/// Runs tiers in order until one yields postings, then dedupes by link.
pub struct SearchEngine {
    tiers: Vec<Box<dyn SearchTier>>,
}

impl SearchEngine {
    pub fn new(tiers: Vec<Box<dyn SearchTier>>) -> Self {
        Self { tiers }
    }

    /// Direct-source, web-search and synthetic fallback tiers.
    pub fn from_settings(settings: SearchSettings) -> Result<Self, FetchError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(settings.fetch)?);
        Ok(Self::new(vec![
            Box::new(DirectSourceTier::new(settings.demo_mode)),
            Box::new(WebSearchTier::new(
                fetcher,
                RankedExtractor::search_results(),
                settings.web,
            )),
            Box::new(SyntheticFallbackTier),
        ]))
    }

    pub async fn search(&self, query: &str, max_results: usize) -> SearchResults {
        for tier in &self.tiers {
            let kind = tier.tier();
            match tier.search(query, max_results).await {
                Ok(postings) => {
                    let postings = dedupe_postings(postings, max_results);
                    if postings.is_empty() {
                        agent_debug!("tier {} returned nothing for {:?}", kind, query);
                        continue;
                    }
                    let degraded = tier.synthetic();
                    if degraded {
                        agent_warn!(
                            "tier {} produced {} synthetic postings for {:?}",
                            kind,
                            postings.len(),
                            query
                        );
                    } else {
                        agent_info!(
                            "tier {} found {} postings for {:?}",
                            kind,
                            postings.len(),
                            query
                        );
                    }
                    return SearchResults {
                        postings,
                        tier: kind,
                        degraded,
                    };
                }
                Err(err) => {
                    agent_warn!("tier {} failed for {:?}: {}", kind, query, err);
                }
            }
        }

        agent_warn!("all search tiers came back empty for {:?}", query);
        SearchResults::empty()
    }
}
