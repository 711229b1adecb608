//! Conversation graph model and resolution
//!
//! A [`Graph`] owns the node collections (one per kind), the directed link
//! table, and the Start/End markers. The link table is the authoritative
//! topology: node records never point at each other directly (the legacy
//! `next_node_id` on choices is honored only by the format layer).
//!
//! # Overview
//!
//! - Ids live in one flat namespace across all node kinds.
//! - Links are keyed by `(from_id, from_port)`; setting a link for an
//!   occupied port replaces the prior link.
//! - Authoring mutates the graph; playback treats it as a read-only
//!   snapshot for the duration of a conversation.
//!
//! # Usage
//!
//! ```
//! use dialograph::graph::{DialogNode, Graph, Marker};
//!
//! let mut graph = Graph::new();
//! graph.set_start(Marker::new("start"));
//! graph.add_dialog(DialogNode::new("d1", "Hello there."))?;
//! graph.set_link("start", 0, "d1");
//! assert_eq!(dialograph::graph::resolve::entry(&graph), Some("d1"));
//! # Ok::<(), dialograph::Error>(())
//! ```

mod link;
mod node;
pub mod resolve;
mod validate;

use indexmap::IndexMap;

pub use link::Link;
pub use node::{ActionNode, Choice, ChoiceHook, ChoiceNode, DialogNode, Marker, NodeKind, Position};
pub use validate::{GraphIssue, validate};

use crate::error::{Error, Result};

/// A complete conversation graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    dialogs: IndexMap<String, DialogNode>,
    choices: IndexMap<String, ChoiceNode>,
    actions: IndexMap<String, ActionNode>,
    links: Vec<Link>,
    start: Option<Marker>,
    end: Option<Marker>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh node id (hyphen-less UUID v4).
    #[must_use]
    pub fn mint_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    // ==================== Node insertion ====================

    /// Add a dialog node.
    ///
    /// # Errors
    /// Returns an error if the id is empty or already taken by any node.
    pub fn add_dialog(&mut self, node: DialogNode) -> Result<()> {
        self.check_new_id(&node.id)?;
        self.dialogs.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add a choice node.
    ///
    /// # Errors
    /// Returns an error if the id is empty or already taken by any node.
    pub fn add_choice(&mut self, node: ChoiceNode) -> Result<()> {
        self.check_new_id(&node.id)?;
        self.choices.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add an action node.
    ///
    /// # Errors
    /// Returns an error if the id is empty or already taken by any node.
    pub fn add_action(&mut self, node: ActionNode) -> Result<()> {
        self.check_new_id(&node.id)?;
        self.actions.insert(node.id.clone(), node);
        Ok(())
    }

    /// Set the Start marker, replacing any existing one.
    pub fn set_start(&mut self, marker: Marker) {
        self.start = Some(marker);
    }

    /// Set the End marker, replacing any existing one.
    pub fn set_end(&mut self, marker: Marker) {
        self.end = Some(marker);
    }

    fn check_new_id(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::EmptyNodeId);
        }
        if self.contains(id) {
            return Err(Error::DuplicateNodeId { id: id.to_string() });
        }
        Ok(())
    }

    // ==================== Links ====================

    /// Create a link from `(from, port)` to `to`.
    ///
    /// Replaces any existing link from the same source port - at most one
    /// link per `(from_id, from_port)` pair survives.
    pub fn set_link(&mut self, from: impl Into<String>, port: usize, to: impl Into<String>) {
        let from = from.into();
        self.links
            .retain(|l| !(l.from_id == from && l.from_port == port));
        self.links.push(Link::new(from, port, to));
    }

    /// Remove the link from `(from, port)`, returning whether one existed.
    pub fn remove_link(&mut self, from: &str, port: usize) -> bool {
        let before = self.links.len();
        self.links
            .retain(|l| !(l.from_id == from && l.from_port == port));
        self.links.len() != before
    }

    /// All links, in insertion order.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    // ==================== Lookups ====================

    /// Get a dialog node by id.
    #[must_use]
    pub fn dialog(&self, id: &str) -> Option<&DialogNode> {
        self.dialogs.get(id)
    }

    /// Get a choice node by id.
    #[must_use]
    pub fn choice(&self, id: &str) -> Option<&ChoiceNode> {
        self.choices.get(id)
    }

    /// Get an action node by id.
    #[must_use]
    pub fn action(&self, id: &str) -> Option<&ActionNode> {
        self.actions.get(id)
    }

    /// The Start marker, if set.
    #[must_use]
    pub fn start(&self) -> Option<&Marker> {
        self.start.as_ref()
    }

    /// The End marker, if set.
    #[must_use]
    pub fn end(&self) -> Option<&Marker> {
        self.end.as_ref()
    }

    /// Whether any node (of any kind, markers included) has this id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.kind_of(id).is_some()
    }

    /// The kind of the node with this id, if present.
    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<NodeKind> {
        if self.dialogs.contains_key(id) {
            Some(NodeKind::Dialog)
        } else if self.choices.contains_key(id) {
            Some(NodeKind::Choice)
        } else if self.actions.contains_key(id) {
            Some(NodeKind::Action)
        } else if self.start.as_ref().is_some_and(|m| m.id == id) {
            Some(NodeKind::Start)
        } else if self.end.as_ref().is_some_and(|m| m.id == id) {
            Some(NodeKind::End)
        } else {
            None
        }
    }

    /// Count all nodes, markers included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.dialogs.len()
            + self.choices.len()
            + self.actions.len()
            + usize::from(self.start.is_some())
            + usize::from(self.end.is_some())
    }

    /// Iterate dialog nodes in insertion order.
    pub fn dialogs(&self) -> impl Iterator<Item = &DialogNode> {
        self.dialogs.values()
    }

    /// Iterate choice nodes in insertion order.
    pub fn choices(&self) -> impl Iterator<Item = &ChoiceNode> {
        self.choices.values()
    }

    /// Iterate action nodes in insertion order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionNode> {
        self.actions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_id_namespace() {
        let mut graph = Graph::new();
        graph.add_dialog(DialogNode::new("shared", "hi")).unwrap();
        let err = graph
            .add_choice(ChoiceNode::new("shared", "pick"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNodeId { .. }));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut graph = Graph::new();
        let err = graph.add_dialog(DialogNode::new("", "hi")).unwrap_err();
        assert!(matches!(err, Error::EmptyNodeId));
    }

    #[test]
    fn test_set_link_replaces_same_port() {
        let mut graph = Graph::new();
        graph.set_link("x", 0, "a");
        graph.set_link("x", 1, "b");
        graph.set_link("x", 0, "c");

        let from_x: Vec<_> = graph.links().iter().filter(|l| l.from_id == "x").collect();
        assert_eq!(from_x.len(), 2);
        let port0 = from_x.iter().find(|l| l.from_port == 0).unwrap();
        assert_eq!(port0.to_id, "c");
    }

    #[test]
    fn test_remove_link() {
        let mut graph = Graph::new();
        graph.set_link("x", 0, "a");
        assert!(graph.remove_link("x", 0));
        assert!(!graph.remove_link("x", 0));
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_kind_of_covers_markers() {
        let mut graph = Graph::new();
        graph.set_start(Marker::new("s"));
        graph.set_end(Marker::new("e"));
        graph.add_action(ActionNode::new("a", "Noop")).unwrap();

        assert_eq!(graph.kind_of("s"), Some(NodeKind::Start));
        assert_eq!(graph.kind_of("e"), Some(NodeKind::End));
        assert_eq!(graph.kind_of("a"), Some(NodeKind::Action));
        assert_eq!(graph.kind_of("missing"), None);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_mint_id_unique() {
        assert_ne!(Graph::mint_id(), Graph::mint_id());
        assert!(!Graph::mint_id().contains('-'));
    }
}
