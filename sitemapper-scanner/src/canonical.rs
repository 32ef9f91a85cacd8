use crate::error::{Result, ScanError};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Extensions that never lead to an HTML page.
pub const EXCLUDED_EXTENSIONS: &[&str] = &[
    // images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".ico",
    // documents and archives
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".csv", ".zip", ".rar",
    ".7z",
    // binaries
    ".exe", ".dmg", ".pkg", ".deb", ".rpm",
    // media
    ".mp4", ".avi", ".mov", ".mp3", ".wav",
    // structured data and assets
    ".xml", ".json", ".css", ".js",
];

/// Path endings accepted when the last segment has an extension.
pub const ALLOWED_ENDINGS: &[&str] = &["/", ".html", ".htm", ".php"];

/// Canonical form of a URL used as the dedup key.
///
/// Drops the fragment, turns an empty path into `/` and appends a trailing
/// slash when the last segment has no `.` in it. A non-empty query is kept.
pub fn normalize(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);

    if normalized.query() == Some("") {
        normalized.set_query(None);
    }

    let path = normalized.path();
    if path.is_empty() {
        normalized.set_path("/");
    } else if !path.ends_with('/') && !last_segment(path).contains('.') {
        let with_slash = format!("{}/", path);
        normalized.set_path(&with_slash);
    }

    normalized
}

/// Parse a string and return its canonical form.
pub fn canonicalize(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    Ok(normalize(&parsed))
}

/// `host[:port]` of a URL; default ports are already elided by `Url`.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Cheap pre-fetch gate deciding whether a link is worth fetching.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    pub excluded_extensions: Vec<String>,
    pub allowed_endings: Vec<String>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self {
            excluded_extensions: EXCLUDED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            allowed_endings: ALLOWED_ENDINGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UrlFilter {
    pub fn new(excluded_extensions: Vec<String>, allowed_endings: Vec<String>) -> Self {
        Self {
            excluded_extensions,
            allowed_endings,
        }
    }

    /// Same host only, no query strings, no asset extensions.
    ///
    /// Extensionless paths pass unconditionally; the content type decides
    /// later whether they are pages.
    pub fn is_crawlable(&self, url: &Url, seed_authority: &str) -> bool {
        let mut url = url.clone();
        url.set_fragment(None);

        if url.as_str().is_empty() {
            return false;
        }

        if authority(&url).as_deref() != Some(seed_authority) {
            debug!("  -> Other host, skipping {}", url);
            return false;
        }

        if url.query().is_some() {
            debug!("  -> Query string, skipping {}", url);
            return false;
        }

        let path_lower = url.path().to_lowercase();
        if self
            .excluded_extensions
            .iter()
            .any(|ext| path_lower.ends_with(ext.as_str()))
        {
            debug!("  -> Excluded extension, skipping {}", url);
            return false;
        }

        if !last_segment(url.path()).contains('.') {
            return true;
        }

        self.allowed_endings
            .iter()
            .any(|ending| path_lower.ends_with(ending.as_str()))
    }
}

/// Where a crawl starts from. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seed {
    url: Url,
    authority: String,
    base_path: String,
}

impl Seed {
    pub fn parse(input: &str) -> Result<Self> {
        Self::from_url(&canonicalize(input)?)
    }

    pub fn from_url(url: &Url) -> Result<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ScanError::InvalidUrl(format!(
                "{}: only http and https are supported",
                url
            )));
        }

        let authority = authority(url)
            .ok_or_else(|| ScanError::InvalidUrl(format!("{}: missing host", url)))?;

        let mut normalized = normalize(url);
        // A seed is scheme, authority and path only.
        normalized.set_query(None);
        let base_path = normalized.path().trim_end_matches('/').to_string();

        Ok(Self {
            url: normalized,
            authority,
            base_path,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Normalized seed path without trailing slashes; depth origin.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}
