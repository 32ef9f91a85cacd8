use crate::canonical::{Seed, UrlFilter, normalize};
use crate::depth::depth;
use crate::error::{FailureReason, Result};
use crate::fetcher::{FetchedPage, Fetcher, HttpFetcher};
use crate::parser::extract_links;
use crate::result::{CrawlEvent, PageRecord, ParentKey, SiteCrawl};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

pub const DEFAULT_DELAY_MS: u64 = 500;

/// Depth-first, single-threaded site crawler.
///
/// Every canonical URL is fetched at most once per crawl. The visited and
/// failed sets are checked when an entry leaves the work stack, which is the
/// only place a URL can be claimed.
pub struct Crawler<F: Fetcher = HttpFetcher> {
    fetcher: F,
    filter: UrlFilter,
    delay: Duration,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler<HttpFetcher> {
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        Ok(Self::with_fetcher(HttpFetcher::with_timeout(timeout_secs)?))
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            filter: UrlFilter::default(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            progress_callback: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_filter(mut self, filter: UrlFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn crawl(&self, seed: &Seed) -> SiteCrawl {
        info!("Starting crawl of {}", seed.url());

        let mut state = CrawlState::new(seed.clone());
        let mut stack: Vec<(Url, ParentKey)> = vec![(seed.url().clone(), ParentKey::Root)];
        let mut fetched_any = false;

        while let Some((url, parent)) = stack.pop() {
            let url = normalize(&url);
            if state.is_seen(url.as_str()) {
                continue;
            }

            if fetched_any && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            fetched_any = true;

            let Some(links) = self.visit(&mut state, &url, parent).await else {
                continue;
            };

            // Reverse so the first link on the page is crawled first.
            let parent_key = ParentKey::Page(url.to_string());
            for link in links.into_iter().rev() {
                if !state.visited.contains(link.as_str()) {
                    stack.push((link, parent_key.clone()));
                }
            }
        }

        info!(
            "Crawl complete. Visited {} pages, {} failed",
            state.pages.len(),
            state.failed.len()
        );
        state.finish()
    }

    /// Fetch one URL and record its outcome. Returns the crawlable links of
    /// the page, or `None` when the fetch failed.
    async fn visit(&self, state: &mut CrawlState, url: &Url, parent: ParentKey) -> Option<Vec<Url>> {
        let page_depth = depth(url, state.seed.base_path());
        self.report(CrawlEvent::Fetching {
            url: url.to_string(),
            depth: page_depth,
        });
        debug!("Crawling (depth {}): {}", page_depth, url);

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(reason) => {
                warn!("Failed to fetch {} ({}): {}", url, reason.category(), reason);
                state.failed.insert(url.to_string(), reason.clone());
                self.report(CrawlEvent::Failed {
                    url: url.to_string(),
                    reason,
                });
                return None;
            }
        };

        let FetchedPage {
            html,
            title,
            final_url,
        } = page;

        let record = PageRecord::new(url.as_str(), title.clone(), page_depth);
        state.visit(record.clone());
        self.report(CrawlEvent::Visited {
            url: url.to_string(),
            title: title.clone(),
        });

        let final_url = normalize(&final_url);
        if final_url != *url && !state.is_seen(final_url.as_str()) {
            let final_depth = depth(&final_url, state.seed.base_path());
            debug!("{} redirected to {}", url, final_url);
            state.visit(PageRecord::new(final_url.as_str(), title, final_depth));
            self.report(CrawlEvent::Redirected {
                from: url.to_string(),
                to: final_url.to_string(),
            });
        }

        state.edges.entry(parent).or_default().push(record);

        Some(self.crawlable_links(&html, url, state.seed.authority()))
    }

    /// Links on the page that pass the filter, canonical and de-duplicated in
    /// document order.
    fn crawlable_links(&self, html: &str, page_url: &Url, authority: &str) -> Vec<Url> {
        let mut seen = HashSet::new();
        extract_links(html, page_url)
            .into_iter()
            .filter(|link| self.filter.is_crawlable(link, authority))
            .map(|link| normalize(&link))
            .filter(|link| seen.insert(link.to_string()))
            .collect()
    }

    fn report(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}

/// Mutable bookkeeping owned by a single `crawl` call.
struct CrawlState {
    seed: Seed,
    visited: HashSet<String>,
    pages: Vec<PageRecord>,
    failed: BTreeMap<String, FailureReason>,
    edges: HashMap<ParentKey, Vec<PageRecord>>,
}

impl CrawlState {
    fn new(seed: Seed) -> Self {
        Self {
            seed,
            visited: HashSet::new(),
            pages: Vec::new(),
            failed: BTreeMap::new(),
            edges: HashMap::new(),
        }
    }

    fn is_seen(&self, url: &str) -> bool {
        self.visited.contains(url) || self.failed.contains_key(url)
    }

    fn visit(&mut self, record: PageRecord) {
        if self.visited.insert(record.url.clone()) {
            self.pages.push(record);
        }
    }

    fn finish(self) -> SiteCrawl {
        SiteCrawl {
            seed: self.seed,
            pages: self.pages,
            failed: self.failed,
            edges: self.edges,
        }
    }
}
