use indicatif::{ProgressBar, ProgressStyle};
use sitemapper_scanner::crawler::DEFAULT_DELAY_MS;
use sitemapper_scanner::fetcher::DEFAULT_TIMEOUT_SECS;
use sitemapper_scanner::{CrawlEvent, Crawler, ScanError, Seed, SiteCrawl};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub delay_ms: u64,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            delay_ms: DEFAULT_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            show_progress_bars: true,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the finished crawl
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<SiteCrawl, ScanError> {
    let CrawlOptions {
        url,
        delay_ms,
        timeout_secs,
        show_progress_bars,
    } = options;

    let seed = Seed::parse(&url)?;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let callback_clone = progress_callback.clone();
    let event_callback = Arc::new(move |event: CrawlEvent| {
        let message = match event {
            CrawlEvent::Fetching { url, depth } => {
                let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref pb) = pb_clone {
                    pb.set_message(format!(
                        "Crawling... {} URLs processed (depth {}) {}",
                        count,
                        depth,
                        extract_url_path(&url)
                    ));
                }
                None
            }
            CrawlEvent::Failed { url, reason } => Some(format!("✗ {} - {}", url, reason)),
            CrawlEvent::Redirected { from, to } => Some(format!("↪ {} -> {}", from, to)),
            CrawlEvent::Visited { .. } => None,
        };

        if let Some(message) = message {
            match (&pb_clone, &callback_clone) {
                (Some(pb), Some(callback)) => pb.suspend(|| callback(message)),
                (None, Some(callback)) => callback(message),
                (Some(pb), None) => pb.println(message),
                (None, None) => {}
            }
        }
    });

    let crawler = Crawler::with_timeout(timeout_secs)?
        .with_delay(Duration::from_millis(delay_ms))
        .with_progress_callback(event_callback);

    let site = crawler.crawl(&seed).await;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    info!(
        "Crawl of {} finished: {} pages, {} failed",
        site.seed.url(),
        site.pages.len(),
        site.failed.len()
    );
    Ok(site)
}

/// One-paragraph summary printed after a crawl.
pub fn generate_crawl_summary(site: &SiteCrawl) -> String {
    let mut summary = String::new();
    summary.push_str(&format!("Seed:          {}\n", site.seed.url()));
    summary.push_str(&format!("Pages crawled: {}\n", site.pages.len()));
    summary.push_str(&format!("Failed URLs:   {}\n", site.failed.len()));
    if let Some(max_depth) = site.pages.iter().map(|p| p.depth).max() {
        summary.push_str(&format!("Deepest level: {}\n", max_depth));
    }
    summary
}
