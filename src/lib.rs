//! # dialograph
//!
//! A pure-Rust runtime for directed dialogue graphs: plain node records, a
//! port-indexed link table, graceful resolution, a tick-driven playback
//! state machine, and a pluggable action dispatch bridge.
//!
//! ## What's Here
//!
//! - **Graph model** - dialog, choice, and action nodes plus Start/End
//!   markers, keyed by stable string ids in one flat namespace
//! - **Link table** - `(from, port)`-keyed directed edges; the single
//!   authoritative topology
//! - **Resolver** - entry lookup, single-hop next, and action-chain
//!   unwinding with cycle protection
//! - **Playback** - typewriter reveal, autoplay timers, choice branching,
//!   pause/resume, all driven by a host-owned `tick(dt)` loop
//! - **Action bridge** - global and per-conversation scopes of synchronous
//!   bindings and waitable handlers
//! - **JSON layout** - the authoring tool's serialized graph format, both
//!   directions
//!
//! ## Quick Start
//!
//! ```
//! use dialograph::graph::{Choice, ChoiceNode, DialogNode, Graph, Marker};
//! use dialograph::runtime::{DialogPlayer, PlaybackEvent, PlayerConfig};
//!
//! let mut graph = Graph::new();
//! graph.set_start(Marker::new("start"));
//! graph.add_dialog(DialogNode::new("hello", "Nice day, isn't it?").with_speaker("Ann"))?;
//! graph.add_choice(
//!     ChoiceNode::new("reply", "")
//!         .with_choice(Choice::new("Lovely."))
//!         .with_choice(Choice::new("Hardly.")),
//! )?;
//! graph.set_link("start", 0, "hello");
//! graph.set_link("hello", 0, "reply");
//!
//! let mut player = DialogPlayer::new(PlayerConfig::default());
//! player.subscribe(|event| {
//!     if let PlaybackEvent::LineShown { speaker, text, .. } = event {
//!         println!("{speaker}: {text}");
//!     }
//! });
//! player.start(graph);
//!
//! // Host loop: feed elapsed time, forward input.
//! player.tick(0.5);
//! player.advance();
//! # Ok::<(), dialograph::Error>(())
//! ```
//!
//! ## Loading Authored Graphs
//!
//! ```no_run
//! let graph = dialograph::formats::read_graph_file("intro.json")?;
//! # Ok::<(), dialograph::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `dialograph` command-line binary

pub mod actions;
pub mod error;
pub mod formats;
pub mod graph;
pub mod runtime;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::actions::{ActionHandler, ActionRunner, Completion};
    pub use crate::error::{Error, Result};
    pub use crate::formats::{GraphExport, parse_graph_json, read_graph_file, write_graph_file};
    pub use crate::graph::{
        ActionNode, Choice, ChoiceNode, DialogNode, Graph, Link, Marker, NodeKind, Position,
    };
    pub use crate::graph::resolve::{ChainResolution, entry, resolve_action_chain};
    pub use crate::graph::{GraphIssue, validate};
    pub use crate::runtime::{DialogPlayer, PlaybackEvent, PlayerConfig};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
