//! Node identity resolution and stable id assignment

use crate::types::Node;
use uuid::Uuid;

/// Source of fresh node identifiers.
///
/// Injected into the merge engine so tests can substitute a deterministic
/// generator for the default UUID-backed one.
pub trait IdSource {
    fn fresh_id(&mut self, depth: u32) -> String;
}

/// Default id source: `{depth}-{uuid-v4}`.
///
/// The depth prefix makes synthesized ids visually traceable to their tier;
/// the UUID component makes collisions negligible across merges.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn fresh_id(&mut self, depth: u32) -> String {
        format!("{depth}-{}", Uuid::new_v4())
    }
}

/// Two nodes refer to the same resource when their links or ids match.
fn are_similar_nodes(a: &Node, b: &Node) -> bool {
    a.link == b.link || a.id == b.id
}

/// Find the first existing node representing the same resource as the
/// candidate, in sequence order.
pub fn find_existing_node<'a>(candidate: &Node, existing_nodes: &'a [Node]) -> Option<&'a Node> {
    let existing = existing_nodes
        .iter()
        .find(|node| are_similar_nodes(node, candidate));
    if let Some(node) = existing {
        log::debug!("candidate {} matches existing node {}", candidate.link, node.id);
    }
    existing
}

/// Return a provider-assigned id unchanged, or synthesize a fresh
/// depth-qualified one when the candidate carries none.
pub fn ensure_unique_node_id(node_id: &str, depth: u32) -> String {
    ensure_unique_node_id_with(node_id, depth, &mut UuidIds)
}

pub(crate) fn ensure_unique_node_id_with(
    node_id: &str,
    depth: u32,
    ids: &mut impl IdSource,
) -> String {
    if node_id.is_empty() {
        ids.fresh_id(depth)
    } else {
        node_id.to_string()
    }
}
