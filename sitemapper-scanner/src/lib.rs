pub mod canonical;
pub mod crawler;
pub mod depth;
pub mod error;
pub mod fetcher;
pub mod parser;
pub mod result;

pub use canonical::{Seed, UrlFilter};
pub use crawler::{Crawler, ProgressCallback};
pub use error::{FailureReason, ScanError};
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use result::{CrawlEvent, PageRecord, ParentKey, SiteCrawl};
