//! Rebuilds the site hierarchy from flat `(url, title, depth)` records.
//!
//! Nodes are placed with a "most recent node per depth" table, seeded with a
//! sentinel root at depth -1. A depth-only table misplaces a later sibling's
//! descendants whenever the input is not a strict pre-order, and sorting by
//! URL string does not guarantee pre-order. Two rules close that gap:
//!
//! * [`build_sitemap_tree`] orders records by scope (the seed page, then pages
//!   under the seed path, then everything else) and within a scope by their
//!   absolute path segments. That is a pre-order of the path hierarchy.
//! * A table slot only qualifies as a parent when its path is an ancestor of
//!   the record's path, or when it holds the seed page. Placing a node at
//!   depth D clears every deeper slot, so a page whose directory page was
//!   never fetched hangs off its nearest fetched ancestor instead of an
//!   unrelated cousin.
//!
//! Depth stays relative to the seed; ancestry uses the absolute path, so
//! `/about/` and `/docs/about/` never stand in for each other.

use serde::Serialize;
use sitemapper_scanner::canonical::authority;
use sitemapper_scanner::{PageRecord, Seed};
use std::collections::BTreeMap;
use url::Url;

/// Depth of the sentinel root.
pub const ROOT_DEPTH: isize = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub url: String,
    /// Page title, or the URL when the page had none.
    pub title: String,
    pub depth: usize,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}

/// The sentinel root and its top-level pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteTree {
    pub children: Vec<TreeNode>,
}

impl SiteTree {
    pub fn len(&self) -> usize {
        self.children.iter().map(TreeNode::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

struct ArenaNode {
    record: PageRecord,
    path: Vec<String>,
    children: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Scope {
    SeedPage,
    UnderSeed,
    Elsewhere,
}

fn scope(path: &[String], seed_path: &[String]) -> Scope {
    if path == seed_path {
        Scope::SeedPage
    } else if path.starts_with(seed_path) {
        Scope::UnderSeed
    } else {
        Scope::Elsewhere
    }
}

/// Sort records into path pre-order, then build the tree.
pub fn build_sitemap_tree(records: &[PageRecord], seed: &Seed) -> SiteTree {
    let seed_path = url_path_key(seed.url().as_str());
    let mut keyed: Vec<(Scope, Vec<String>, &PageRecord)> = records
        .iter()
        .map(|r| {
            let path = url_path_key(&r.url);
            (scope(&path, &seed_path), path, r)
        })
        .collect();
    keyed.sort_by(|(sa, pa, ra), (sb, pb, rb)| {
        sa.cmp(sb)
            .then_with(|| pa.cmp(pb))
            .then_with(|| ra.url.cmp(&rb.url))
    });

    let ordered: Vec<PageRecord> = keyed.into_iter().map(|(_, _, r)| r.clone()).collect();
    build_tree(&ordered, seed)
}

/// Build the tree from records that are already in pre-order.
pub fn build_tree(records: &[PageRecord], seed: &Seed) -> SiteTree {
    // Index 0 is the sentinel root.
    let seed_path = url_path_key(seed.url().as_str());
    let mut arena = vec![ArenaNode {
        record: PageRecord::new("", "", 0),
        path: Vec::new(),
        children: Vec::new(),
    }];
    let mut latest_at_depth: BTreeMap<isize, usize> = BTreeMap::new();
    latest_at_depth.insert(ROOT_DEPTH, 0);

    for record in records {
        let depth = record.depth as isize;
        let path = url_path_key(&record.url);

        let parent = (ROOT_DEPTH..depth)
            .rev()
            .filter_map(|d| latest_at_depth.get(&d).map(|&idx| (d, idx)))
            .find(|&(d, idx)| {
                d == ROOT_DEPTH
                    || arena[idx].path == seed_path
                    || path.starts_with(&arena[idx].path)
            })
            .map(|(_, idx)| idx)
            .unwrap_or(0);

        let idx = arena.len();
        arena.push(ArenaNode {
            record: record.clone(),
            path,
            children: Vec::new(),
        });
        arena[parent].children.push(idx);

        latest_at_depth.retain(|&d, _| d < depth);
        latest_at_depth.insert(depth, idx);
    }

    SiteTree {
        children: arena[0]
            .children
            .iter()
            .map(|&idx| materialize(&arena, idx))
            .collect(),
    }
}

/// Pre-order traversal of the tree as flat records.
pub fn flatten(tree: &SiteTree) -> Vec<PageRecord> {
    fn walk(node: &TreeNode, out: &mut Vec<PageRecord>) {
        out.push(PageRecord::new(node.url.clone(), node.title.clone(), node.depth));
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for node in &tree.children {
        walk(node, &mut out);
    }
    out
}

fn materialize(arena: &[ArenaNode], idx: usize) -> TreeNode {
    let node = &arena[idx];
    let title = if node.record.title.is_empty() {
        node.record.url.clone()
    } else {
        node.record.title.clone()
    };

    TreeNode {
        url: node.record.url.clone(),
        title,
        depth: node.record.depth,
        children: node.children.iter().map(|&c| materialize(arena, c)).collect(),
    }
}

/// Authority followed by the non-empty path segments.
fn url_path_key(url: &str) -> Vec<String> {
    let Ok(parsed) = Url::parse(url) else {
        return vec![url.to_string()];
    };

    let mut key = vec![authority(&parsed).unwrap_or_default()];
    key.extend(
        parsed
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
    );
    key
}
