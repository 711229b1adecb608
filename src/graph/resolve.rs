//! Pure resolution queries over a conversation graph
//!
//! All lookups degrade gracefully: an id that names no node, a dangling
//! link, or a missing Start marker resolves to "no next node" rather than
//! an error. Playback turns "no next node" into conversation end.

use super::{ActionNode, Graph};

/// Resolve the first playable node: the target of the Start marker's
/// smallest-port outgoing link.
///
/// Returns `None` (with a configuration warning logged) when the Start
/// marker is unset or has no outgoing link.
#[must_use]
pub fn entry(graph: &Graph) -> Option<&str> {
    let Some(start) = graph.start() else {
        tracing::warn!("start marker is unset; conversation cannot begin");
        return None;
    };

    // If multiple links leave Start, prefer the smallest port index.
    let next = graph
        .links()
        .iter()
        .filter(|l| l.from_id == start.id)
        .min_by_key(|l| l.from_port)
        .map(|l| l.to_id.as_str());

    if next.is_none() {
        tracing::warn!("start marker has no outgoing link; connect Start to the first node");
    }
    next
}

/// Single-hop lookup: the target linked from `(from, port)`, if any.
#[must_use]
pub fn next_from<'g>(graph: &'g Graph, from: &str, port: usize) -> Option<&'g str> {
    graph
        .links()
        .iter()
        .find(|l| l.from_id == from && l.from_port == port)
        .map(|l| l.to_id.as_str())
}

/// The node following a dialog node (its port-0 link).
#[must_use]
pub fn next_from_dialog<'g>(graph: &'g Graph, dialog_id: &str) -> Option<&'g str> {
    next_from(graph, dialog_id, 0)
}

/// The node following an action node (its port-0 link).
#[must_use]
pub fn next_from_action<'g>(graph: &'g Graph, action_id: &str) -> Option<&'g str> {
    next_from(graph, action_id, 0)
}

/// The node a given answer of a choice node leads to.
#[must_use]
pub fn next_from_choice<'g>(graph: &'g Graph, choice_id: &str, choice_index: usize) -> Option<&'g str> {
    next_from(graph, choice_id, choice_index)
}

/// Outcome of following a chain of consecutive action nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainResolution {
    /// The chain ended at a non-action node with this id.
    Reached(String),
    /// The chain ran off the graph (dangling link or no link at all).
    End,
    /// The chain revisited action nodes past the iteration cap.
    CycleDetected,
}

impl ChainResolution {
    /// The reached node id, if the chain landed on one.
    #[must_use]
    pub fn node_id(&self) -> Option<&str> {
        match self {
            ChainResolution::Reached(id) => Some(id),
            ChainResolution::End | ChainResolution::CycleDetected => None,
        }
    }
}

/// Follow consecutive action nodes from `start`, invoking `invoke` for each,
/// until a non-action node or the end of the graph.
///
/// If `start` is not an action node the chain resolves immediately without
/// invoking anything. Iteration is capped at the graph's total node count so
/// a cyclic action chain terminates with [`ChainResolution::CycleDetected`]
/// instead of hanging.
///
/// This synchronous walk is for chains whose actions need no suspension;
/// the playback runtime drives the same traversal incrementally when
/// pre-delays or waitable handlers are involved.
pub fn resolve_action_chain(
    graph: &Graph,
    start: &str,
    mut invoke: impl FnMut(&ActionNode),
) -> ChainResolution {
    let cap = graph.node_count();
    let mut cursor = start.to_string();
    let mut steps = 0usize;

    loop {
        let Some(action) = graph.action(&cursor) else {
            return if graph.contains(&cursor) {
                ChainResolution::Reached(cursor)
            } else {
                ChainResolution::End
            };
        };

        if steps >= cap {
            tracing::warn!(action = %cursor, "action chain exceeded {cap} steps; assuming a cycle");
            return ChainResolution::CycleDetected;
        }
        steps += 1;

        invoke(action);

        match next_from_action(graph, &cursor) {
            Some(next) => cursor = next.to_string(),
            None => return ChainResolution::End,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ChoiceNode, DialogNode, Marker};

    fn graph_with_start() -> Graph {
        let mut graph = Graph::new();
        graph.set_start(Marker::new("start"));
        graph
    }

    #[test]
    fn test_entry_prefers_smallest_port() {
        let mut graph = graph_with_start();
        graph.add_dialog(DialogNode::new("a", "A")).unwrap();
        graph.add_dialog(DialogNode::new("b", "B")).unwrap();
        graph.set_link("start", 1, "b");
        graph.set_link("start", 0, "a");

        assert_eq!(entry(&graph), Some("a"));
    }

    #[test]
    fn test_entry_missing_start_or_link() {
        let graph = Graph::new();
        assert_eq!(entry(&graph), None);

        let graph = graph_with_start();
        assert_eq!(entry(&graph), None);
    }

    #[test]
    fn test_next_from_missing_link() {
        let graph = Graph::new();
        assert_eq!(next_from(&graph, "nowhere", 0), None);
    }

    #[test]
    fn test_action_chain_invokes_in_link_order() {
        let mut graph = Graph::new();
        graph.add_action(ActionNode::new("a1", "First")).unwrap();
        graph.add_action(ActionNode::new("a2", "Second")).unwrap();
        graph.add_dialog(DialogNode::new("d", "done")).unwrap();
        graph.set_link("a1", 0, "a2");
        graph.set_link("a2", 0, "d");

        let mut seen = Vec::new();
        let resolved = resolve_action_chain(&graph, "a1", |a| seen.push(a.action_id.clone()));

        assert_eq!(seen, vec!["First", "Second"]);
        assert_eq!(resolved, ChainResolution::Reached("d".to_string()));
    }

    #[test]
    fn test_action_chain_non_action_start() {
        let mut graph = Graph::new();
        graph.add_choice(ChoiceNode::new("c", "pick")).unwrap();

        let mut invoked = 0;
        let resolved = resolve_action_chain(&graph, "c", |_| invoked += 1);

        assert_eq!(invoked, 0);
        assert_eq!(resolved, ChainResolution::Reached("c".to_string()));
    }

    #[test]
    fn test_action_chain_dangles_to_end() {
        let mut graph = Graph::new();
        graph.add_action(ActionNode::new("a", "Only")).unwrap();
        graph.set_link("a", 0, "ghost");

        let resolved = resolve_action_chain(&graph, "a", |_| {});
        assert_eq!(resolved, ChainResolution::End);
    }

    #[test]
    fn test_action_chain_cycle_terminates() {
        let mut graph = Graph::new();
        graph.add_action(ActionNode::new("a1", "Loop")).unwrap();
        graph.add_action(ActionNode::new("a2", "Loop")).unwrap();
        graph.set_link("a1", 0, "a2");
        graph.set_link("a2", 0, "a1");

        let mut invoked = 0;
        let resolved = resolve_action_chain(&graph, "a1", |_| invoked += 1);

        assert_eq!(resolved, ChainResolution::CycleDetected);
        assert!(invoked <= graph.node_count());
    }
}
