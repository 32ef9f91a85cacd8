//! Structural depth of a URL below the seed path.
//!
//! Depth counts path segments, not link hops: a page reached through a long
//! chain of links but living at `/docs/api/` is still depth 1 under `/docs`.

use url::Url;

/// Path segments of `url` relative to the seed base path.
///
/// When the base path is a segment prefix of the URL path it is removed,
/// otherwise the whole path is used. Empty segments are dropped.
pub fn lineage(url: &Url, seed_base_path: &str) -> Vec<String> {
    relative_path(url.path(), seed_base_path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of segments between `url` and the seed base path.
pub fn depth(url: &Url, seed_base_path: &str) -> usize {
    lineage(url, seed_base_path).len()
}

fn relative_path<'a>(url_path: &'a str, seed_base_path: &str) -> &'a str {
    let url_path = url_path.trim_end_matches('/');
    let base = seed_base_path.trim_end_matches('/');

    if url_path == base {
        return "";
    }

    if !base.is_empty()
        && let Some(rest) = url_path.strip_prefix(base)
        && rest.starts_with('/')
    {
        return rest.trim_matches('/');
    }

    url_path.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_depth_of_seed_is_zero() {
        assert_eq!(depth(&url("https://example.com/docs/"), "/docs"), 0);
        assert_eq!(depth(&url("https://example.com/docs"), "/docs"), 0);
        assert_eq!(depth(&url("https://example.com/"), ""), 0);
    }

    #[test]
    fn test_depth_below_seed() {
        assert_eq!(depth(&url("https://example.com/docs/guide/"), "/docs"), 1);
        assert_eq!(depth(&url("https://example.com/docs/guide/intro.html"), "/docs"), 2);
        assert_eq!(depth(&url("https://example.com/docs/api/"), "/docs"), 1);
    }

    #[test]
    fn test_depth_from_root_seed() {
        assert_eq!(depth(&url("https://example.com/a/b/c/"), ""), 3);
        assert_eq!(depth(&url("https://example.com/a/b/c/"), "/"), 3);
    }

    #[test]
    fn test_depth_outside_seed_path_uses_full_path() {
        assert_eq!(depth(&url("https://example.com/about/"), "/docs"), 1);
        assert_eq!(depth(&url("https://example.com/blog/2024/post.html"), "/docs"), 3);
    }

    #[test]
    fn test_prefix_must_end_at_segment_boundary() {
        // "/docsearch" is not below "/docs"
        assert_eq!(depth(&url("https://example.com/docsearch/"), "/docs"), 1);
        assert_eq!(
            lineage(&url("https://example.com/docsearch/"), "/docs"),
            vec!["docsearch".to_string()]
        );
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        assert_eq!(depth(&url("https://example.com/docs//guide/"), "/docs"), 1);
    }

    #[test]
    fn test_lineage_matches_depth() {
        let u = url("https://example.com/docs/guide/intro.html");
        let segments = lineage(&u, "/docs");
        assert_eq!(segments, vec!["guide".to_string(), "intro.html".to_string()]);
        assert_eq!(segments.len(), depth(&u, "/docs"));
    }
}
