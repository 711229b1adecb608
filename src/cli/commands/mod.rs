use clap::Subcommand;
use std::path::PathBuf;

pub mod info;
pub mod play;
pub mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Print a summary of a graph file
    Info {
        /// Graph JSON file
        source: PathBuf,
    },

    /// Check a graph file for configuration problems
    Validate {
        /// Graph JSON file
        source: PathBuf,
    },

    /// Play a conversation interactively in the terminal
    Play {
        /// Graph JSON file
        source: PathBuf,

        /// Auto-advance lines after their display time
        #[arg(long)]
        autoplay: bool,

        /// Seconds per revealed character (0 renders lines instantly)
        #[arg(long, default_value_t = 0.02)]
        typing_speed: f32,
    },
}

impl Commands {
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Commands::Info { source } => info::execute(&source),
            Commands::Validate { source } => validate::execute(&source),
            Commands::Play {
                source,
                autoplay,
                typing_speed,
            } => play::execute(&source, autoplay, typing_speed),
        }
    }
}
