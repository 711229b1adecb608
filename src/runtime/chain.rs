//! Incremental action-chain traversal
//!
//! The tick-driven counterpart of [`crate::graph::resolve::resolve_action_chain`]:
//! follows consecutive action nodes while honoring each node's pre-delay and
//! wait-for-completion flag. The walk suspends whenever an invocation needs
//! wall-clock time and picks up on the next tick.

use crate::actions::{ActionRunner, Invocation};
use crate::graph::{Graph, resolve};

/// Why a chain walk was started; decides what happens with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainPurpose {
    /// Entering a node: the resolved target becomes the current node.
    Enter,
    /// Post-reveal resolution of a dialog line: the resolved target becomes
    /// the pending next node (or a choice overlay).
    Sequel,
}

/// One step's outcome.
#[derive(Debug)]
pub(crate) enum ChainStep {
    /// An invocation is still waiting on a delay or handler.
    Pending,
    /// The chain finished; the contained id (if any) names the first
    /// non-action node reached. `None` means the chain ran off the graph
    /// or was cut short by the cycle cap.
    Resolved(Option<String>),
}

/// In-flight walk over consecutive action nodes.
#[derive(Debug)]
pub(crate) struct ChainWalk {
    cursor: Option<String>,
    purpose: ChainPurpose,
    invocation: Option<Invocation>,
    steps: usize,
}

impl ChainWalk {
    pub(crate) fn new(target: Option<String>, purpose: ChainPurpose) -> Self {
        Self {
            cursor: target,
            purpose,
            invocation: None,
            steps: 0,
        }
    }

    pub(crate) fn purpose(&self) -> ChainPurpose {
        self.purpose
    }

    /// Advance the walk by `dt` seconds, running as far as possible without
    /// suspending.
    pub(crate) fn step(
        &mut self,
        graph: &Graph,
        runner: &mut ActionRunner,
        conversation_key: Option<&str>,
        dt: f32,
    ) -> ChainStep {
        let cap = graph.node_count();
        let mut dt = dt;

        loop {
            let Some(current) = self.cursor.clone() else {
                return ChainStep::Resolved(None);
            };

            if let Some(invocation) = &mut self.invocation {
                if !invocation.tick(runner, dt) {
                    return ChainStep::Pending;
                }
                self.invocation = None;
                self.cursor = resolve::next_from_action(graph, &current).map(String::from);
                // Time was consumed by the invocation; continue instantly.
                dt = 0.0;
                continue;
            }

            let Some(action) = graph.action(&current) else {
                return ChainStep::Resolved(Some(current));
            };

            if self.steps >= cap {
                tracing::warn!(
                    action = %current,
                    "action chain exceeded {cap} steps; assuming a cycle and ending"
                );
                return ChainStep::Resolved(None);
            }
            self.steps += 1;

            tracing::debug!(
                action = %action.action_id,
                wait = action.wait_for_completion,
                delay = action.wait_seconds,
                "running action node"
            );
            self.invocation = Some(runner.run_node(action, conversation_key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ActionNode, DialogNode};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn chain_graph() -> Graph {
        let mut graph = Graph::new();
        graph
            .add_action(ActionNode::new("a1", "Step").with_wait(false, 0.5))
            .unwrap();
        graph.add_action(ActionNode::new("a2", "Step")).unwrap();
        graph.add_dialog(DialogNode::new("d", "after")).unwrap();
        graph.set_link("a1", 0, "a2");
        graph.set_link("a2", 0, "d");
        graph
    }

    #[test]
    fn test_walk_suspends_on_pre_delay() {
        let graph = chain_graph();
        let hits = Arc::new(AtomicUsize::new(0));
        let mut runner = ActionRunner::new();
        {
            let hits = Arc::clone(&hits);
            runner.global_mut().bind("Step", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let mut walk = ChainWalk::new(Some("a1".to_string()), ChainPurpose::Enter);

        // First tick lands inside a1's pre-delay.
        assert!(matches!(walk.step(&graph, &mut runner, None, 0.0), ChainStep::Pending));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        // Delay elapses; both actions fire and the chain resolves.
        match walk.step(&graph, &mut runner, None, 0.6) {
            ChainStep::Resolved(Some(id)) => assert_eq!(id, "d"),
            other => panic!("unexpected step: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_walk_resolves_immediately_for_non_action() {
        let graph = chain_graph();
        let mut runner = ActionRunner::new();
        let mut walk = ChainWalk::new(Some("d".to_string()), ChainPurpose::Sequel);

        match walk.step(&graph, &mut runner, None, 0.0) {
            ChainStep::Resolved(Some(id)) => assert_eq!(id, "d"),
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn test_walk_cycle_resolves_to_none() {
        let mut graph = Graph::new();
        graph.add_action(ActionNode::new("a1", "Loop")).unwrap();
        graph.add_action(ActionNode::new("a2", "Loop")).unwrap();
        graph.set_link("a1", 0, "a2");
        graph.set_link("a2", 0, "a1");

        let mut runner = ActionRunner::new();
        let mut walk = ChainWalk::new(Some("a1".to_string()), ChainPurpose::Enter);

        match walk.step(&graph, &mut runner, None, 0.0) {
            ChainStep::Resolved(None) => {}
            other => panic!("unexpected step: {other:?}"),
        }
    }
}
