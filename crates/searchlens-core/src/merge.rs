//! Graph merge engine
//!
//! Takes the accumulated node and link lists (previous state plus the new
//! batch appended by the session controller) and normalizes them into a
//! deduplicated, depth-consistent graph.

use crate::identity::{IdSource, UuidIds, ensure_unique_node_id_with};
use crate::types::{Link, Node};
use std::collections::{HashMap, HashSet};

/// Merge a node/link batch into a consistent graph at `target_depth`,
/// using UUID-backed fresh ids.
///
/// Node pass: each input node's id is resolved (empty ids get a fresh
/// depth-qualified one); the first occurrence of an id wins for content,
/// with `depth` and `visible` overwritten to the merge pass's values.
/// Later occurrences are dropped. Input order is preserved.
///
/// Link pass: at most one link survives per unordered endpoint pair, the
/// first one encountered, keeping its original orientation.
///
/// This is a total function: links referencing ids absent from the node
/// set pass through untouched. Referential consistency is the caller's
/// responsibility.
pub fn merge_graph(
    nodes: Vec<Node>,
    links: Vec<Link>,
    anchor_node_id: Option<&str>,
    target_depth: u32,
) -> (Vec<Node>, Vec<Link>) {
    merge_graph_with(nodes, links, anchor_node_id, target_depth, &mut UuidIds)
}

/// [`merge_graph`] with an injected [`IdSource`] for fresh ids.
pub fn merge_graph_with(
    nodes: Vec<Node>,
    links: Vec<Link>,
    anchor_node_id: Option<&str>,
    target_depth: u32,
    ids: &mut impl IdSource,
) -> (Vec<Node>, Vec<Link>) {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut merged_nodes: Vec<Node> = Vec::with_capacity(nodes.len());

    for mut node in nodes {
        let node_id = ensure_unique_node_id_with(&node.id, target_depth, ids);
        if seen_ids.insert(node_id.clone()) {
            node.id = node_id;
            node.depth = target_depth;
            node.visible = true;
            merged_nodes.push(node);
        }
    }

    // Links are undirected: key on the canonicalized endpoint pair, never
    // on a delimited string (ids themselves may contain the delimiter).
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    let mut merged_links: Vec<Link> = Vec::with_capacity(links.len());

    for link in links {
        if seen_pairs.insert(canonical_pair(&link.source, &link.target)) {
            merged_links.push(link);
        }
    }

    log::debug!(
        "merged {} nodes / {} links at depth {} (anchor {})",
        merged_nodes.len(),
        merged_links.len(),
        target_depth,
        anchor_node_id.unwrap_or("-"),
    );

    (merged_nodes, merged_links)
}

/// Order-insensitive key for an undirected endpoint pair.
fn canonical_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic id source: `{depth}-{counter}`.
    struct SequentialIds(u32);

    impl IdSource for SequentialIds {
        fn fresh_id(&mut self, depth: u32) -> String {
            self.0 += 1;
            format!("{depth}-{}", self.0)
        }
    }

    fn node(id: &str, link: &str) -> Node {
        Node::new(id, link)
    }

    #[test]
    fn stamps_depth_and_visibility_on_every_node() {
        let nodes = vec![
            Node {
                depth: 0,
                visible: false,
                ..node("a", "http://a.com")
            },
            node("b", "http://b.com"),
        ];
        let (merged, _) = merge_graph(nodes, vec![], Some("a"), 3);
        assert!(merged.iter().all(|n| n.depth == 3 && n.visible));
    }

    #[test]
    fn first_occurrence_wins_for_content() {
        let mut first = node("a", "http://a.com");
        first.title = "kept".into();
        let mut second = node("a", "http://other.com");
        second.title = "dropped".into();

        let (merged, _) = merge_graph(vec![first, second], vec![], None, 0);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "kept");
        assert_eq!(merged[0].link, "http://a.com");
    }

    #[test]
    fn preserves_node_insertion_order() {
        let nodes = vec![node("c", "1"), node("a", "2"), node("b", "3")];
        let (merged, _) = merge_graph(nodes, vec![], None, 0);
        let order: Vec<&str> = merged.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn reversed_links_collapse_to_one() {
        let links = vec![
            Link::new("a", "b"),
            Link::new("b", "a"),
            Link::new("a", "b"),
        ];
        let (_, merged) = merge_graph(vec![], links, None, 0);
        assert_eq!(merged, vec![Link::new("a", "b")]);
    }

    #[test]
    fn never_returns_both_orientations() {
        let links = vec![
            Link::new("a", "b"),
            Link::new("b", "c"),
            Link::new("c", "a"),
            Link::new("b", "a"),
            Link::new("c", "b"),
        ];
        let (_, merged) = merge_graph(vec![], links, None, 0);
        for link in &merged {
            let reversed = merged
                .iter()
                .any(|l| l.source == link.target && l.target == link.source);
            assert!(!reversed, "both orientations stored for {link:?}");
        }
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn hyphenated_ids_keep_their_endpoints() {
        // Synthesized ids contain hyphens; the dedup key must not be a
        // delimited string that re-splits ambiguously.
        let links = vec![
            Link::new("1-abc-def", "2-ghi"),
            Link::new("2-ghi", "1-abc-def"),
        ];
        let (_, merged) = merge_graph(vec![], links, None, 1);
        assert_eq!(merged, vec![Link::new("1-abc-def", "2-ghi")]);
    }

    #[test]
    fn empty_ids_get_fresh_depth_qualified_ids() {
        let mut ids = SequentialIds(0);
        let nodes = vec![node("", "http://a.com"), node("", "http://b.com")];
        let (merged, _) = merge_graph_with(nodes, vec![], None, 2, &mut ids);
        assert_eq!(merged[0].id, "2-1");
        assert_eq!(merged[1].id, "2-2");
    }

    #[test]
    fn idempotent_for_explicit_ids() {
        let nodes = vec![node("a", "http://a.com"), node("b", "http://b.com")];
        let links = vec![Link::new("a", "b")];

        let (nodes_once, links_once) =
            merge_graph(nodes.clone(), links.clone(), Some("a"), 1);
        let (nodes_twice, links_twice) =
            merge_graph(nodes_once.clone(), links_once.clone(), Some("a"), 1);

        assert_eq!(nodes_once, nodes_twice);
        assert_eq!(links_once, links_twice);

        // And re-running from the raw input reproduces the same output.
        let (nodes_again, links_again) = merge_graph(nodes, links, Some("a"), 1);
        assert_eq!(nodes_once, nodes_again);
        assert_eq!(links_once, links_again);
    }

    #[test]
    fn links_to_unknown_ids_pass_through() {
        let (merged_nodes, merged_links) = merge_graph(
            vec![node("a", "http://a.com")],
            vec![Link::new("a", "ghost")],
            None,
            0,
        );
        assert_eq!(merged_nodes.len(), 1);
        assert_eq!(merged_links, vec![Link::new("a", "ghost")]);
    }

    #[test]
    fn merge_pass_over_existing_and_fresh_candidates() {
        // Existing graph holds node "0" at depth 0; a merge anchored at it
        // brings one duplicate of "0" and one fresh candidate.
        let mut ids = SequentialIds(0);
        let existing = Node {
            depth: 0,
            ..node("0", "http://a.com")
        };
        let nodes = vec![existing, node("0", "http://a.com"), node("", "http://b.com")];
        let links = vec![Link::new("0", "1-1")];

        let (merged, merged_links) = merge_graph_with(nodes, links, Some("0"), 1, &mut ids);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "0");
        assert_eq!(merged[0].depth, 1);
        assert!(merged[0].visible);
        assert_eq!(merged[1].id, "1-1");
        assert_eq!(merged[1].link, "http://b.com");
        assert_eq!(merged[1].depth, 1);
        assert_eq!(merged_links, vec![Link::new("0", "1-1")]);
    }
}
