use agent_logging::agent_debug;
use scraper::{ElementRef, Html, Selector};
use url::form_urlencoded;

/// One search hit before relevance filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub title: String,
    pub link: String,
}

/// A way of locating result containers in a search page.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;
}

/// Containers matched by a single CSS selector.
#[derive(Debug, Clone)]
pub struct SelectorStrategy {
    css: String,
}

impl SelectorStrategy {
    /// Returns `None` when `css` is not a valid selector.
    pub fn new(css: impl Into<String>) -> Option<Self> {
        let css = css.into();
        Selector::parse(&css).ok()?;
        Some(Self { css })
    }
}

impl ExtractionStrategy for SelectorStrategy {
    fn name(&self) -> &str {
        &self.css
    }

    fn containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        match Selector::parse(&self.css) {
            Ok(selector) => document.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }
}

const SEARCH_RESULT_SELECTORS: &[&str] = &[
    "div.g",
    "div.tF2Cxc",
    "div.MjjYud",
    "div[data-ved]",
    "div.ZINbbc",
];

/// Strategies tried in rank order; the first one that finds any container
/// decides the hits for the whole page.
pub struct RankedExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for RankedExtractor {
    fn default() -> Self {
        Self::search_results()
    }
}

impl RankedExtractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Container selectors for the web-search result page layouts seen so far.
    pub fn search_results() -> Self {
        let strategies = SEARCH_RESULT_SELECTORS
            .iter()
            .filter_map(|css| SelectorStrategy::new(*css))
            .map(|s| Box::new(s) as Box<dyn ExtractionStrategy>)
            .collect();
        Self::new(strategies)
    }

    /// Extract up to `limit` hits, or `None` if no strategy matched a container.
    ///
    /// Containers without an `h3` title or an `a[href]` are skipped.
    pub fn extract(&self, html: &str, limit: usize) -> Option<Vec<RawHit>> {
        let document = Html::parse_document(html);
        let (strategy, containers) = self.strategies.iter().find_map(|strategy| {
            let containers = strategy.containers(&document);
            (!containers.is_empty()).then_some((strategy, containers))
        })?;
        agent_debug!(
            "strategy {} matched {} containers",
            strategy.name(),
            containers.len()
        );

        let title_sel = Selector::parse("h3").ok()?;
        let link_sel = Selector::parse("a[href]").ok()?;

        let hits = containers
            .into_iter()
            .take(limit)
            .filter_map(|container| {
                let title = container
                    .select(&title_sel)
                    .next()
                    .map(|t| t.text().collect::<String>().trim().to_string())
                    .filter(|t| !t.is_empty())?;
                let href = container
                    .select(&link_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))?;
                Some(RawHit {
                    title,
                    link: unwrap_redirect(href),
                })
            })
            .collect();
        Some(hits)
    }
}

/// Unwrap `/url?q=<target>&...` redirect links to their target.
pub fn unwrap_redirect(href: &str) -> String {
    match href.strip_prefix("/url?") {
        Some(query) => form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_else(|| href.to_string()),
        None => href.to_string(),
    }
}
