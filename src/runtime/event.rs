//! Playback event feed
//!
//! Events fire on state transitions (never polled) and are delivered to
//! every registered sink in subscription order. A history recorder or
//! presentation layer subscribes and reacts; the player itself renders
//! nothing.

/// A state-transition notification from the playback runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// A conversation started or ended; listeners should clear transcripts.
    ConversationReset,
    /// A conversation began playing.
    ConversationEntered,
    /// A conversation finished. Fires exactly once per conversation.
    ConversationExited,
    /// A line became visible (typewriter may still be revealing it).
    LineShown {
        /// Id of the node whose line is shown.
        node_id: String,
        /// Speaker name; empty for choice prompts.
        speaker: String,
        /// The full line text.
        text: String,
    },
    /// The player picked an answer on a choice node.
    ChoicePicked {
        /// Id of the choice node.
        node_id: String,
        /// Text of the picked answer.
        answer: String,
    },
}

/// Callback receiving playback events.
pub type EventSink = Box<dyn FnMut(&PlaybackEvent) + Send>;

/// Callback fired once when a conversation ends.
pub type EndCallback = Box<dyn FnOnce() + Send>;
