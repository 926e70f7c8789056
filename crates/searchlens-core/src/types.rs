//! Common types used across searchlens

use serde::{Deserialize, Serialize};

/// A graph vertex representing one deduplicated search result.
///
/// Within a graph no two nodes share an `id`, and nodes pointing at the
/// same `link` are merged into a single entity by the merge engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Canonical URL of the underlying resource.
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// At most two derived keywords, used to seed re-queries.
    pub keywords: Vec<String>,
    /// Distance from the graph's initial query results.
    pub depth: u32,
    pub visible: bool,
}

/// An undirected edge between two nodes.
///
/// `(a, b)` and `(b, a)` are the same link; the merge engine stores at
/// most one of the two orientations.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Link {
    pub source: String,
    pub target: String,
}

/// A complete graph snapshot: nodes in insertion order plus deduplicated
/// links. Each search or expansion derives a new snapshot from the prior
/// one; snapshots are never mutated in place.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct GraphState {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Node {
    pub fn new(id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            link: link.into(),
            image: None,
            keywords: Vec::new(),
            depth: 0,
            visible: true,
        }
    }
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl GraphState {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
