// Site map exports: CSV, collapsible HTML tree and JSON

use crate::tree::{SiteTree, TreeNode, build_sitemap_tree};
use sitemapper_scanner::SiteCrawl;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Byte order mark so spreadsheet tools pick UTF-8.
pub const UTF8_BOM: &str = "\u{feff}";

pub const FAILED_SECTION_HEADER: &str = "[Failed URLs]";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Html,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

pub fn generate_report(site: &SiteCrawl, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Csv => generate_csv_report(site),
        ReportFormat::Html => Ok(generate_html_report(site)),
        ReportFormat::Json => generate_json_report(site),
    }
}

/// Flat export: one row per page sorted by URL, shifted right by its depth,
/// followed by the failed URLs.
pub fn generate_csv_report(site: &SiteCrawl) -> Result<String> {
    let mut writer = csv_writer(Vec::new());
    for page in site.sorted_pages() {
        let mut row: Vec<&str> = vec![""; page.depth];
        row.push(&page.url);
        row.push(&page.title);
        writer.write_record(&row)?;
    }
    let mut buffer = writer
        .into_inner()
        .map_err(|e| ReportError::Encoding(e.to_string()))?;

    if !site.failed.is_empty() {
        buffer.extend_from_slice(b"\r\n\r\n");

        let mut writer = csv_writer(buffer);
        writer.write_record([FAILED_SECTION_HEADER])?;
        writer.write_record(["URL", "Reason"])?;
        for (url, reason) in &site.failed {
            writer.write_record([url.as_str(), reason.to_string().as_str()])?;
        }
        buffer = writer
            .into_inner()
            .map_err(|e| ReportError::Encoding(e.to_string()))?;
    }

    let body = String::from_utf8(buffer).map_err(|e| ReportError::Encoding(e.to_string()))?;
    Ok(format!("{}{}", UTF8_BOM, body))
}

fn csv_writer(buffer: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_writer(buffer)
}

/// Static document with a collapsible page tree and a failure table.
pub fn generate_html_report(site: &SiteCrawl) -> String {
    let tree = build_sitemap_tree(&site.pages, &site.seed);
    let seed_url = escape_html(site.seed.url().as_str());
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>Site map - {}</title>\n", seed_url));
    html.push_str(HTML_STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Site map</h1>\n");
    html.push_str(&format!("<p><strong>Base URL:</strong> {}</p>\n", seed_url));
    html.push_str(&format!(
        "<p><strong>Total pages:</strong> {}</p>\n",
        site.pages.len()
    ));
    html.push_str(&format!(
        "<p><strong>Generated:</strong> {}</p>\n",
        generated_at
    ));
    html.push_str("<div class=\"tree\">\n");
    html.push_str(&generate_tree_html(&tree));
    html.push_str("</div>\n");
    html.push_str(&generate_failed_urls_html(site));
    html.push_str(HTML_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

fn generate_tree_html(tree: &SiteTree) -> String {
    let mut html = String::new();
    for node in &tree.children {
        push_node_html(node, &mut html);
    }
    html
}

fn push_node_html(node: &TreeNode, html: &mut String) {
    let url = escape_html(&node.url);
    let title = escape_html(&node.title);

    if node.has_children() {
        html.push_str("<div class=\"tree-item\">\n<div class=\"toggle\">\n");
        html.push_str(&format!(
            "<a href=\"{}\" class=\"link\" target=\"_blank\">{}</a>\n<div class=\"url\">{}</div>\n",
            url, title, url
        ));
        html.push_str("</div>\n<div class=\"children tree-content\">\n");
        for child in &node.children {
            push_node_html(child, html);
        }
        html.push_str("</div>\n</div>\n");
    } else {
        html.push_str("<div class=\"tree-item no-children\">\n");
        html.push_str(&format!(
            "<a href=\"{}\" class=\"link\" target=\"_blank\">{}</a>\n<div class=\"url\">{}</div>\n",
            url, title, url
        ));
        html.push_str("</div>\n");
    }
}

fn generate_failed_urls_html(site: &SiteCrawl) -> String {
    if site.failed.is_empty() {
        return String::new();
    }

    let mut html = String::new();
    html.push_str("<div class=\"failed-section\">\n");
    html.push_str(&format!(
        "<h2>Failed URLs ({})</h2>\n",
        site.failed.len()
    ));
    html.push_str("<table class=\"failed-table\">\n<thead>\n<tr>\n");
    html.push_str("<th style=\"width: 60%;\">URL</th>\n<th style=\"width: 40%;\">Reason</th>\n");
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for (url, reason) in &site.failed {
        let url = escape_html(url);
        html.push_str(&format!(
            "<tr>\n<td><a href=\"{}\" target=\"_blank\">{}</a></td>\n<td class=\"error-msg\">{}</td>\n</tr>\n",
            url,
            url,
            escape_html(&reason.to_string())
        ));
    }
    html.push_str("</tbody>\n</table>\n</div>\n");
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn generate_json_report(site: &SiteCrawl) -> Result<String> {
    let tree = build_sitemap_tree(&site.pages, &site.seed);
    let failed: Vec<_> = site
        .failed
        .iter()
        .map(|(url, reason)| {
            serde_json::json!({
                "url": url,
                "reason": reason.to_string(),
                "detail": reason,
            })
        })
        .collect();

    let json_report = serde_json::json!({
        "sitemap": {
            "metadata": {
                "generator": "sitemapper",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
            },
            "seed": site.seed.url().as_str(),
            "total_pages": site.pages.len(),
            "tree": tree.children,
            "failed": failed,
        }
    });

    Ok(serde_json::to_string_pretty(&json_report)?)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    debug!("Writing {} bytes to {}", content.len(), path.display());
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

const HTML_STYLE: &str = r#"<style>
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 1200px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }
h1 { color: #333; border-bottom: 3px solid #4CAF50; padding-bottom: 10px; }
.tree { background-color: white; border-radius: 8px; padding: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
.tree-item { margin: 10px 0; }
.tree-content { padding-left: 20px; border-left: 2px solid #e0e0e0; margin-left: 10px; }
.toggle { cursor: pointer; user-select: none; padding: 8px; background-color: #f8f8f8; border-radius: 4px; display: inline-block; margin: 5px 0; }
.toggle:hover { background-color: #e8e8e8; }
.toggle::before { content: '\25B6  '; display: inline-block; transition: transform 0.3s; }
.toggle.open::before { transform: rotate(90deg); }
.link { color: #1976D2; text-decoration: none; font-weight: bold; font-size: 16px; }
.link:hover { text-decoration: underline; color: #1565C0; }
.url { color: #666; font-size: 12px; margin-top: 3px; word-break: break-all; }
.children { display: none; margin-top: 5px; }
.children.show { display: block; }
.no-children { padding: 8px; margin: 5px 0; }
.failed-section { margin-top: 40px; background-color: white; border-radius: 8px; padding: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
.failed-section h2 { color: #d32f2f; border-bottom: 2px solid #d32f2f; padding-bottom: 10px; margin-top: 0; }
.failed-table { width: 100%; border-collapse: collapse; margin-top: 15px; }
.failed-table th { background-color: #f5f5f5; padding: 10px; text-align: left; border-bottom: 2px solid #ddd; }
.failed-table td { padding: 10px; border-bottom: 1px solid #eee; word-break: break-all; }
.error-msg { color: #d32f2f; font-size: 14px; }
</style>
"#;

const HTML_SCRIPT: &str = r#"<script>
document.querySelectorAll('.toggle').forEach(toggle => {
    toggle.addEventListener('click', function(e) {
        e.stopPropagation();
        this.classList.toggle('open');
        const children = this.parentElement.querySelector('.children');
        if (children) {
            children.classList.toggle('show');
        }
    });
});
</script>
"#;
