//! Node types for conversation graphs
//!
//! Plain data records - traversal behavior lives in [`crate::graph::resolve`]
//! and the playback runtime. Positions are authoring-layout metadata kept
//! only for round-trip fidelity.

use std::fmt;
use std::sync::Arc;

/// Classification of graph node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    Start,
    End,
    Dialog,
    Choice,
    Action,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::End => "End",
            NodeKind::Dialog => "Dialog",
            NodeKind::Choice => "Choice",
            NodeKind::Action => "Action",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authoring-layout position of a node in the graph editor.
///
/// Has no effect on traversal; carried so a graph survives an
/// export/import round trip unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single spoken line with optional speaker metadata.
#[derive(Debug, Clone, Default)]
pub struct DialogNode {
    /// Unique identifier, stable across edits.
    pub id: String,
    /// Authoring label for this node.
    pub title: String,
    /// Name shown as the speaker of this line (may be empty).
    pub speaker: String,
    /// The text shown to the player.
    pub text: String,
    /// Opaque portrait asset handle for the presentation layer.
    pub portrait: Option<String>,
    /// Opaque voice/SFX asset handle for the presentation layer.
    pub audio: Option<String>,
    /// Seconds to show this node before auto-advancing. 0 = wait for input.
    pub display_time: f32,
    /// Editor layout position.
    pub position: Position,
}

impl DialogNode {
    /// Create a dialog node with the given id and text.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the speaker name.
    #[must_use]
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = speaker.into();
        self
    }

    /// Set the auto-advance display time in seconds.
    #[must_use]
    pub fn with_display_time(mut self, seconds: f32) -> Self {
        self.display_time = seconds.max(0.0);
        self
    }
}

/// Hook fired when a choice is selected.
///
/// Shared so the graph stays read-only during traversal.
pub type ChoiceHook = Arc<dyn Fn() + Send + Sync>;

/// A single selectable answer within a [`ChoiceNode`].
///
/// The answer at index `i` corresponds to output port `i` of its node;
/// runtime linkage lives in the graph's link table. `next_node_id` is a
/// legacy field honored by the format layer only when no link table is
/// present.
#[derive(Clone, Default)]
pub struct Choice {
    /// Text shown for this answer.
    pub answer_text: String,
    /// Legacy embedded target id; the link table is authoritative.
    pub next_node_id: Option<String>,
    /// Optional hook fired when this answer is picked.
    pub on_selected: Option<ChoiceHook>,
}

impl Choice {
    /// Create a choice with the given answer text.
    #[must_use]
    pub fn new(answer_text: impl Into<String>) -> Self {
        Self {
            answer_text: answer_text.into(),
            ..Self::default()
        }
    }

    /// Attach a selection hook.
    #[must_use]
    pub fn with_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_selected = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choice")
            .field("answer_text", &self.answer_text)
            .field("next_node_id", &self.next_node_id)
            .field("on_selected", &self.on_selected.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// Presents an optional prompt line and an ordered list of answers.
#[derive(Debug, Clone, Default)]
pub struct ChoiceNode {
    /// Unique identifier, stable across edits.
    pub id: String,
    /// Prompt text shown above the answers (may be empty).
    pub text: String,
    /// Ordered answers; index = output port index.
    pub choices: Vec<Choice>,
    /// Editor layout position.
    pub position: Position,
}

impl ChoiceNode {
    /// Create a choice node with the given id and prompt text.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Append an answer (taking the next output port index).
    #[must_use]
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// Triggers a runner action by id, optionally waiting for completion.
#[derive(Debug, Clone, Default)]
pub struct ActionNode {
    /// Unique identifier, stable across edits.
    pub id: String,
    /// Handler key, e.g. `"PlaySFX"`, `"SetVar"`, `"CallEvent"`.
    pub action_id: String,
    /// Arbitrary payload (typically JSON) parsed by the matching handler.
    pub payload: String,
    /// If true, playback suspends until the action's handler completes.
    pub wait_for_completion: bool,
    /// Delay in seconds before the action is invoked. 0 = none.
    pub wait_seconds: f32,
    /// Editor layout position.
    pub position: Position,
}

impl ActionNode {
    /// Create an action node with the given id and action key.
    #[must_use]
    pub fn new(id: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action_id: action_id.into(),
            ..Self::default()
        }
    }

    /// Set the handler payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Mark the action as waitable and set its pre-delay.
    #[must_use]
    pub fn with_wait(mut self, wait_for_completion: bool, wait_seconds: f32) -> Self {
        self.wait_for_completion = wait_for_completion;
        self.wait_seconds = wait_seconds.max(0.0);
        self
    }
}

/// Start/End marker: identity and layout only.
///
/// The Start marker's port-0 link is authoritative for the first playable
/// node; the End marker is an editor affordance with no runtime role.
#[derive(Debug, Clone, Default)]
pub struct Marker {
    /// Unique identifier, stable across edits.
    pub id: String,
    /// Editor layout position.
    pub position: Position,
    /// Editor bookkeeping flag for marker placement.
    pub initialized: bool,
}

impl Marker {
    /// Create an initialized marker with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: Position::default(),
            initialized: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_as_str() {
        assert_eq!(NodeKind::Dialog.as_str(), "Dialog");
        assert_eq!(NodeKind::Choice.as_str(), "Choice");
        assert_eq!(NodeKind::Action.as_str(), "Action");
    }

    #[test]
    fn test_choice_debug_hides_hook() {
        let choice = Choice::new("Yes").with_hook(|| {});
        let rendered = format!("{choice:?}");
        assert!(rendered.contains("<hook>"));
    }

    #[test]
    fn test_display_time_clamped() {
        let node = DialogNode::new("a", "hi").with_display_time(-3.0);
        assert_eq!(node.display_time, 0.0);
    }
}
