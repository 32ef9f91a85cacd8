use crate::error::{FailureReason, Result};
use crate::parser::extract_title;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A page body that passed the status and content-type checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    pub title: String,
    /// Where the request ended up after redirects.
    pub final_url: Url,
}

pub trait Fetcher {
    fn fetch(
        &self,
        url: &Url,
    ) -> impl Future<Output = std::result::Result<FetchedPage, FailureReason>> + Send;
}

/// reqwest-backed fetcher. Only `200` responses with a `text/html` content
/// type count as pages.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sitemapper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> std::result::Result<FetchedPage, FailureReason> {
        debug!("Fetching {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(FailureReason::NonHtmlContentType(content_type));
        }

        let status = response.status().as_u16();
        if status != 200 {
            return Err(FailureReason::HttpStatus(status));
        }

        let final_url = response.url().clone();
        let html = response.text().await?;
        let title = extract_title(&html);

        Ok(FetchedPage {
            html,
            title,
            final_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn page_url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string("<html><head><title>Docs</title></head></html>"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();
        let page = fetcher.fetch(&page_url(&mock_server, "/docs/")).await.unwrap();

        assert_eq!(page.title, "Docs");
        assert_eq!(page.final_url, page_url(&mock_server, "/docs/"));
        assert!(page.html.contains("<title>Docs</title>"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string("{}"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();
        let err = fetcher.fetch(&page_url(&mock_server, "/data")).await.unwrap_err();

        assert_eq!(
            err,
            FailureReason::NonHtmlContentType("application/json".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_reports_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing/"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<html>Not found</html>"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();
        let err = fetcher
            .fetch(&page_url(&mock_server, "/missing/"))
            .await
            .unwrap_err();

        assert_eq!(err, FailureReason::HttpStatus(404));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/old/"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/docs/new/", mock_server.uri()).as_str()),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/docs/new/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<title>New</title>"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_timeout(DEFAULT_TIMEOUT_SECS).unwrap();
        let page = fetcher
            .fetch(&page_url(&mock_server, "/docs/old/"))
            .await
            .unwrap();

        assert_eq!(page.final_url, page_url(&mock_server, "/docs/new/"));
        assert_eq!(page.title, "New");
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string("<title>Slow</title>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::with_timeout(1).unwrap();
        let err = fetcher.fetch(&page_url(&mock_server, "/slow/")).await.unwrap_err();

        assert_eq!(err, FailureReason::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_connection_error() {
        // Nothing listens on port 9 of localhost in the test environment.
        let fetcher = HttpFetcher::with_timeout(2).unwrap();
        let err = fetcher
            .fetch(&Url::parse("http://127.0.0.1:9/").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.category(), "transport");
    }
}
