//! Playback flow settings

/// Typing and flow settings for a [`crate::runtime::DialogPlayer`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Per-character delay for the typewriter effect, in seconds.
    /// Values at or below `1e-4` render lines instantly.
    pub typing_speed: f32,
    /// Delay in seconds before auto-advancing when autoplay is enabled and
    /// the node's `display_time` is below one second.
    pub delay_before_auto_next: f32,
    /// Allow user input to reveal the current line instantly.
    pub allow_skip_line: bool,
    /// Allow skipping and ending the entire conversation.
    pub allow_skip_all: bool,
    /// If enabled, nodes advance automatically after their display time.
    pub autoplay: bool,
    /// If enabled, resuming from an external view reschedules autoplay
    /// timers that the pause cancelled. Off by default: resuming leaves the
    /// conversation waiting for input.
    pub resume_restores_autoplay: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            typing_speed: 0.02,
            delay_before_auto_next: 1.0,
            allow_skip_line: true,
            allow_skip_all: true,
            autoplay: false,
            resume_restores_autoplay: false,
        }
    }
}

impl PlayerConfig {
    /// Whether `typing_speed` is low enough to render lines instantly.
    #[must_use]
    pub fn types_instantly(&self) -> bool {
        self.typing_speed <= 1e-4
    }
}
