use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Absolute URLs of every `<a href>` in the document, in document order.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(absolute_url) = resolve_url(base_url, href)
        {
            debug!("Found link: {}", absolute_url);
            links.push(absolute_url);
        }
    }

    links
}

/// Trimmed text of the first `<title>`, or an empty string.
pub fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    // Skip javascript:, mailto:, tel: and in-page anchors
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_resolves_relative_hrefs() {
        let base = Url::parse("https://example.com/docs/").unwrap();
        let html = r#"<html><body>
            <a href="guide/">Guide</a>
            <a href="/docs/api">API</a>
            <a href="https://other.com/">Other</a>
            <a href="intro.html#setup">Intro</a>
        </body></html>"#;

        let links: Vec<String> = extract_links(html, &base)
            .into_iter()
            .map(|u| u.to_string())
            .collect();

        assert_eq!(
            links,
            vec![
                "https://example.com/docs/guide/",
                "https://example.com/docs/api",
                "https://other.com/",
                "https://example.com/docs/intro.html",
            ]
        );
    }

    #[test]
    fn test_extract_links_skips_pseudo_links() {
        let base = Url::parse("https://example.com/").unwrap();
        let html = r##"<a href="#top">Top</a>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:a@example.com">Mail</a>
            <a href="tel:123">Call</a>
            <a>No href</a>"##;

        assert!(extract_links(html, &base).is_empty());
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><title>  Docs Home \n</title></head></html>"),
            "Docs Home"
        );
        assert_eq!(extract_title("<html><body>No title</body></html>"), "");
    }
}
