//! # searchlens-core
//!
//! Core library for incremental search-result graph construction.
//!
//! This library provides:
//! - Keyword extraction from result titles and links
//! - Node identity resolution across repeated merges
//! - A graph merge engine that deduplicates nodes and undirected links
//!
//! It is a pure in-memory transformation library: no HTTP, no persistence,
//! no rendering. The session layer feeds it candidate nodes derived from a
//! search provider and receives the next consistent graph snapshot.
//!
//! ## Example
//!
//! ```
//! use searchlens_core::{Link, Node, extract_keywords, merge_graph};
//!
//! let mut node = Node::new("0", "http://example.com/rust");
//! node.title = "Rust by Example".to_string();
//! node.keywords = extract_keywords(&node.title, &node.link);
//!
//! let (nodes, links) = merge_graph(vec![node], Vec::<Link>::new(), None, 0);
//! assert_eq!(nodes[0].depth, 0);
//! assert!(links.is_empty());
//! ```

pub mod identity;
pub mod keywords;
pub mod merge;
pub mod types;

// Re-export commonly used items
pub use identity::{IdSource, UuidIds, ensure_unique_node_id, find_existing_node};
pub use keywords::extract_keywords;
pub use merge::{merge_graph, merge_graph_with};
pub use types::{GraphState, Link, Node};
