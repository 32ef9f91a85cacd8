pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{output_paths, parse_url_line, prompt_seed_url, sanitize_filename};

// Re-export crawl functionality from sitemapper-core
pub use sitemapper_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
