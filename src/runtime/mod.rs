//! Tick-driven conversation playback
//!
//! The runtime is cooperative and single-threaded: the host calls
//! [`DialogPlayer::tick`] once per frame with the elapsed seconds, and every
//! timer - typewriter reveal, auto-advance, action pre-delays, waitable
//! handler completions - advances inside that call. Input arrives through
//! explicit methods ([`DialogPlayer::advance`],
//! [`DialogPlayer::select_choice`]) rather than polling.
//!
//! # Usage
//!
//! ```
//! use dialograph::graph::{DialogNode, Graph, Marker};
//! use dialograph::runtime::{DialogPlayer, PlayerConfig};
//!
//! let mut graph = Graph::new();
//! graph.set_start(Marker::new("start"));
//! graph.add_dialog(DialogNode::new("d1", "Hi.").with_speaker("Ann"))?;
//! graph.set_link("start", 0, "d1");
//!
//! let mut player = DialogPlayer::new(PlayerConfig::default());
//! player.subscribe(|event| println!("{event:?}"));
//! player.start(graph);
//! player.tick(0.1); // host loop feeds elapsed time
//! # Ok::<(), dialograph::Error>(())
//! ```

mod chain;
mod config;
mod event;
mod player;

pub use config::PlayerConfig;
pub use event::{EndCallback, EventSink, PlaybackEvent};
pub use player::DialogPlayer;
