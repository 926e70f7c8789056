//! Search session controller
//!
//! Orchestrates one exploration session: maps user actions to provider
//! queries, stages candidate nodes and links around the chosen anchor, and
//! publishes the next graph snapshot via the merge engine. Provider
//! failures leave the current snapshot untouched.

use crate::debounce::Debouncer;
use crate::provider::{SearchProvider, candidate_nodes};
use anyhow::{Context, Result, anyhow, bail};
use searchlens_core::{
    GraphState, Link, Node, ensure_unique_node_id, find_existing_node, merge_graph,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// How long a hover must persist before it takes effect.
pub const HOVER_DELAY: Duration = Duration::from_millis(500);

pub struct SearchSession<P> {
    provider: P,
    graph: GraphState,
    focused: Option<String>,
    hovered: Option<String>,
    hover_debounce: Debouncer,
    hover_tx: mpsc::UnboundedSender<String>,
    hover_rx: mpsc::UnboundedReceiver<String>,
}

impl<P: SearchProvider> SearchSession<P> {
    pub fn new(provider: P) -> Self {
        let (hover_tx, hover_rx) = mpsc::unbounded_channel();
        Self {
            provider,
            graph: GraphState::default(),
            focused: None,
            hovered: None,
            hover_debounce: Debouncer::new(),
            hover_tx,
            hover_rx,
        }
    }

    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Run a query and merge its results into the graph.
    ///
    /// Without hover context the results form a depth-0 star around the
    /// first result. With a hovered node, results attach to it at its
    /// existing depth.
    pub async fn submit_query(&mut self, query: &str) -> Result<&GraphState> {
        let query = query.trim();
        if query.is_empty() {
            bail!("query must not be empty");
        }

        let items = self
            .provider
            .search(query)
            .await
            .with_context(|| format!("search for {query:?} failed"))?;
        if items.is_empty() {
            bail!("no results for {query:?}");
        }
        let candidates = candidate_nodes(items);

        let hovered = self.apply_pending_hover().cloned();

        let mut new_nodes: Vec<Node> = Vec::new();
        let mut new_links: Vec<Link> = Vec::new();
        let mut anchor_id: Option<String> = None;
        let mut hub: Option<String> = None;
        let mut target_depth = 0u32;

        for candidate in candidates {
            let existing = find_existing_node(&candidate, &self.graph.nodes)
                .or_else(|| find_existing_node(&candidate, &new_nodes))
                .cloned();

            match (&hovered, existing) {
                (Some(hovered), Some(existing)) => {
                    // Known resource reached from a hovered node: link only.
                    target_depth = existing.depth;
                    push_link(&mut new_links, &hovered.id, &existing.id);
                    anchor_id = Some(existing.id);
                }
                (Some(hovered), None) => {
                    target_depth = hovered.depth;
                    let node = resolve_candidate(candidate, target_depth);
                    push_link(&mut new_links, &hovered.id, &node.id);
                    anchor_id = Some(node.id.clone());
                    new_nodes.push(node);
                }
                (None, Some(existing)) => {
                    target_depth = 0;
                    match &hub {
                        Some(hub) => push_link(&mut new_links, hub, &existing.id),
                        None => hub = Some(existing.id),
                    }
                }
                (None, None) => {
                    target_depth = 0;
                    let node = resolve_candidate(candidate, 0);
                    match &hub {
                        Some(hub) => push_link(&mut new_links, hub, &node.id),
                        None => hub = Some(node.id.clone()),
                    }
                    new_nodes.push(node);
                }
            }
        }

        let anchor = if hovered.is_some() { anchor_id } else { hub };
        self.publish(new_nodes, new_links, anchor, target_depth);
        Ok(&self.graph)
    }

    /// Expand the graph from an activated node, re-querying with its
    /// keywords. New resources land one depth tier below the anchor.
    pub async fn expand_node(&mut self, node_id: &str) -> Result<&GraphState> {
        let anchor = self
            .graph
            .nodes
            .iter()
            .find(|node| node.id == node_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown node id: {node_id}"))?;

        let query = anchor.keywords.join(" ");
        if query.is_empty() {
            bail!("node {node_id} has no keywords to re-query");
        }

        let items = self
            .provider
            .search(&query)
            .await
            .with_context(|| format!("expanding {node_id} via {query:?} failed"))?;
        if items.is_empty() {
            bail!("no results for {query:?}");
        }

        let target_depth = anchor.depth + 1;
        let mut new_nodes: Vec<Node> = Vec::new();
        let mut new_links: Vec<Link> = Vec::new();

        for candidate in candidate_nodes(items) {
            let existing = find_existing_node(&candidate, &self.graph.nodes)
                .or_else(|| find_existing_node(&candidate, &new_nodes))
                .cloned();

            match existing {
                Some(existing) => push_link(&mut new_links, &anchor.id, &existing.id),
                None => {
                    let node = resolve_candidate(candidate, target_depth);
                    push_link(&mut new_links, &anchor.id, &node.id);
                    new_nodes.push(node);
                }
            }
        }

        self.publish(new_nodes, new_links, Some(anchor.id), target_depth);
        Ok(&self.graph)
    }

    /// Record a hover; it only takes effect if it persists for
    /// [`HOVER_DELAY`] without being superseded or cancelled.
    pub fn hover_node(&mut self, node_id: &str) {
        let tx = self.hover_tx.clone();
        let id = node_id.to_string();
        self.hover_debounce.schedule(HOVER_DELAY, move || {
            let _ = tx.send(id);
        });
    }

    /// Cancel a hover that has not fired yet.
    pub fn leave_node(&mut self) {
        self.hover_debounce.cancel();
    }

    /// Drop hover context entirely.
    pub fn clear_hover(&mut self) {
        self.hover_debounce.cancel();
        self.hovered = None;
    }

    /// Drain fired hovers and resolve the current one against the graph.
    fn apply_pending_hover(&mut self) -> Option<&Node> {
        while let Ok(id) = self.hover_rx.try_recv() {
            self.hovered = Some(id);
        }
        let hovered_id = self.hovered.as_deref()?;
        self.graph.nodes.iter().find(|node| node.id == hovered_id)
    }

    fn publish(
        &mut self,
        new_nodes: Vec<Node>,
        new_links: Vec<Link>,
        anchor: Option<String>,
        target_depth: u32,
    ) {
        let all_nodes: Vec<Node> = self.graph.nodes.iter().cloned().chain(new_nodes).collect();
        let all_links: Vec<Link> = self.graph.links.iter().cloned().chain(new_links).collect();

        let (nodes, links) = merge_graph(all_nodes, all_links, anchor.as_deref(), target_depth);
        self.graph = GraphState { nodes, links };
        self.focused = anchor;
    }
}

/// Assign the candidate its final id and depth before links reference it.
fn resolve_candidate(mut candidate: Node, depth: u32) -> Node {
    candidate.id = ensure_unique_node_id(&candidate.id, depth);
    candidate.depth = depth;
    candidate.visible = true;
    candidate
}

fn push_link(links: &mut Vec<Link>, source: &str, target: &str) {
    // No self-loops.
    if source != target {
        links.push(Link::new(source, target));
    }
}
