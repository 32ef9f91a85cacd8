use crate::canonical::Seed;
use crate::error::FailureReason;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A page that was fetched successfully (or shares content with one through
/// a redirect).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub depth: usize,
}

impl PageRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            depth,
        }
    }
}

/// Key of the discovery-edge log. The seed has no parent page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentKey {
    Root,
    Page(String),
}

/// Progress notifications emitted by the crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Fetching { url: String, depth: usize },
    Visited { url: String, title: String },
    Redirected { from: String, to: String },
    Failed { url: String, reason: FailureReason },
}

/// Everything a finished crawl produced. Read-only once returned.
#[derive(Debug, Clone, Serialize)]
pub struct SiteCrawl {
    pub seed: Seed,
    /// Visited pages in the order they entered the visited set.
    pub pages: Vec<PageRecord>,
    pub failed: BTreeMap<String, FailureReason>,
    #[serde(skip)]
    pub edges: HashMap<ParentKey, Vec<PageRecord>>,
}

impl SiteCrawl {
    /// Visited pages sorted by URL string.
    pub fn sorted_pages(&self) -> Vec<PageRecord> {
        let mut pages = self.pages.clone();
        pages.sort_by(|a, b| a.url.cmp(&b.url));
        pages
    }

    pub fn page(&self, url: &str) -> Option<&PageRecord> {
        self.pages.iter().find(|p| p.url == url)
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.page(url).is_some()
    }

    pub fn failure(&self, url: &str) -> Option<&FailureReason> {
        self.failed.get(url)
    }

    /// Children discovered from `parent`, in discovery order.
    pub fn children_of(&self, parent: &ParentKey) -> &[PageRecord] {
        self.edges.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }
}
