//! Authoring-time graph validation
//!
//! Surfaces the configuration problems playback would otherwise degrade
//! around: missing entry, dangling links, unlinked choice answers. None of
//! these are fatal - playback tolerates all of them - but an author wants
//! to see them before shipping a graph.

use std::fmt;

use super::Graph;

/// A non-fatal problem found in a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    /// No Start marker is set; the conversation can never begin.
    StartUnset,
    /// The Start marker has no outgoing link.
    StartUnlinked,
    /// A link points at an id that names no node.
    DanglingLink {
        from_id: String,
        from_port: usize,
        to_id: String,
    },
    /// A choice answer has no link for its port; picking it ends the
    /// conversation.
    UnlinkedChoice { choice_id: String, index: usize },
    /// An action node has an empty action id; it can never match a handler.
    EmptyActionId { node_id: String },
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphIssue::StartUnset => write!(f, "start marker is unset"),
            GraphIssue::StartUnlinked => write!(f, "start marker has no outgoing link"),
            GraphIssue::DanglingLink {
                from_id,
                from_port,
                to_id,
            } => write!(f, "link {from_id}:{from_port} -> {to_id} targets a missing node"),
            GraphIssue::UnlinkedChoice { choice_id, index } => {
                write!(f, "choice {choice_id} answer {index} has no outgoing link")
            }
            GraphIssue::EmptyActionId { node_id } => {
                write!(f, "action node {node_id} has an empty action id")
            }
        }
    }
}

/// Check a graph for configuration problems.
///
/// Returns issues in a stable order: start, links, choices, actions.
#[must_use]
pub fn validate(graph: &Graph) -> Vec<GraphIssue> {
    let mut issues = Vec::new();

    match graph.start() {
        None => issues.push(GraphIssue::StartUnset),
        Some(start) => {
            if !graph.links().iter().any(|l| l.from_id == start.id) {
                issues.push(GraphIssue::StartUnlinked);
            }
        }
    }

    for link in graph.links() {
        if !graph.contains(&link.to_id) {
            issues.push(GraphIssue::DanglingLink {
                from_id: link.from_id.clone(),
                from_port: link.from_port,
                to_id: link.to_id.clone(),
            });
        }
    }

    for choice in graph.choices() {
        for index in 0..choice.choices.len() {
            if super::resolve::next_from_choice(graph, &choice.id, index).is_none() {
                issues.push(GraphIssue::UnlinkedChoice {
                    choice_id: choice.id.clone(),
                    index,
                });
            }
        }
    }

    for action in graph.actions() {
        if action.action_id.is_empty() {
            issues.push(GraphIssue::EmptyActionId {
                node_id: action.id.clone(),
            });
        }
    }

    issues
}
