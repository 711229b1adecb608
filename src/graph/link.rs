//! Directed links between graph nodes

/// Directed edge between two nodes.
///
/// At most one link may exist per `(from_id, from_port)` pair; the graph
/// enforces this by replacing the prior link when a new one is set. The
/// target may dangle (name no node) - the resolver treats a dangling link
/// as "no next node".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Source node id.
    pub from_id: String,
    /// Destination node id.
    pub to_id: String,
    /// Output port index on the source node (0 for dialog/action flow,
    /// the answer index for choices).
    pub from_port: usize,
}

impl Link {
    /// Create a link from `from_id` port `from_port` to `to_id`.
    #[must_use]
    pub fn new(from_id: impl Into<String>, from_port: usize, to_id: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            from_port,
        }
    }
}
