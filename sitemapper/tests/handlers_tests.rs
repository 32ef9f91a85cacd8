use sitemapper::commands::command_argument_builder;
use sitemapper::handlers::*;
use sitemapper_core::report::ReportFormat;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::Level;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

#[test]
fn test_parse_url_line_with_scheme() {
    let result = parse_url_line("https://example.com/docs");
    assert_eq!(result, Some("https://example.com/docs".to_string()));
}

#[test]
fn test_parse_url_line_without_scheme() {
    assert_eq!(
        parse_url_line("example.com"),
        Some("http://example.com".to_string())
    );
    assert_eq!(
        parse_url_line("localhost:8080/docs"),
        Some("http://localhost:8080/docs".to_string())
    );
}

#[test]
fn test_parse_url_line_invalid() {
    assert_eq!(parse_url_line("not a valid url!!!"), None);
    assert_eq!(parse_url_line("   "), None);
}

#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("https://example.com/docs"), "examplecomdocs");
    assert_eq!(sanitize_filename("http://my-site.org/a b"), "my-siteorga_b");
    assert_eq!(sanitize_filename("example.com"), "examplecom");
}

#[test]
fn test_sanitize_filename_collapses_whitespace_and_trims_underscores() {
    assert_eq!(sanitize_filename("_a   b\tc_"), "a_b_c");
    assert_eq!(sanitize_filename("https://"), "sitemap");
}

#[test]
fn test_output_paths() {
    let paths = output_paths(
        Path::new("out"),
        "examplecomdocs",
        &[ReportFormat::Csv, ReportFormat::Html],
    );

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].0, ReportFormat::Csv);
    assert_eq!(paths[0].1, Path::new("out").join("examplecomdocs.csv"));
    assert_eq!(paths[1].1, Path::new("out").join("examplecomdocs.html"));
}

#[test]
fn test_prompt_seed_url() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = Cursor::new("  https://example.com/docs \n");
    let mut output = Vec::new();

    let url = prompt_seed_url(&mut input, &mut output, "URL:")?;

    assert_eq!(url, "https://example.com/docs");
    assert_eq!(String::from_utf8(output)?, "URL: ");
    Ok(())
}

#[test]
fn test_prompt_seed_url_empty_answer() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = Cursor::new("\n");
    let mut output = Vec::new();

    assert_eq!(prompt_seed_url(&mut input, &mut output, "URL:")?, "");
    Ok(())
}

#[test]
fn test_log_level() {
    assert_eq!(log_level(false), Level::WARN);
    assert_eq!(log_level(true), Level::DEBUG);
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str]) {
    let body: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
        .collect();
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!("<html><head><title>{}</title></head><body>{}</body></html>", title, body),
            "text/html",
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_handle_crawl_writes_exports_to_output_dir() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/docs/", "Docs", &["guide/"]).await;
    mount_page(&mock_server, "/docs/guide/", "Guide", &[]).await;

    let dir = tempfile::tempdir()?;
    let out = dir.path().join("exports");
    let url = format!("{}/docs", mock_server.uri());

    let matches = command_argument_builder().try_get_matches_from([
        "sitemapper",
        "--url",
        url.as_str(),
        "--output-dir",
        out.to_str().ok_or("non-utf8 temp path")?,
        "--delay-ms",
        "0",
        "--quiet",
    ])?;
    handle_crawl(&matches).await?;

    let stem = sanitize_filename(&url);
    assert!(stem.ends_with("docs"));

    let csv = fs::read_to_string(out.join(format!("{}.csv", stem)))?;
    assert!(csv.contains(&format!("{}/docs/guide/", mock_server.uri())));
    assert!(csv.contains("Guide"));

    let html = fs::read_to_string(out.join(format!("{}.html", stem)))?;
    assert!(html.contains(">Docs</a>"));
    assert!(html.contains(">Guide</a>"));

    assert!(!out.join(format!("{}.json", stem)).exists());
    Ok(())
}

#[tokio::test]
async fn test_handle_crawl_json_flag() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "Home", &[]).await;

    let dir = tempfile::tempdir()?;
    let url = mock_server.uri();

    let matches = command_argument_builder().try_get_matches_from([
        "sitemapper",
        "-u",
        url.as_str(),
        "-o",
        dir.path().to_str().ok_or("non-utf8 temp path")?,
        "--delay-ms",
        "0",
        "--json",
        "-q",
    ])?;
    handle_crawl(&matches).await?;

    let stem = sanitize_filename(&url);
    let json = fs::read_to_string(dir.path().join(format!("{}.json", stem)))?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["sitemap"]["total_pages"], 1);
    Ok(())
}
