//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// podium - speech-practice recordings with AI coaching feedback
#[derive(Parser, Debug)]
#[command(name = "podium")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a captured practice video into the library
    Import {
        /// Path to the video file
        video: PathBuf,

        /// Practice prompt shown during capture
        #[arg(short, long)]
        prompt: Option<String>,

        /// Free-text observations about the take
        #[arg(short, long)]
        notes: Option<String>,

        /// Camera facing direction (front, back)
        #[arg(long, default_value = "front")]
        facing: String,

        /// Duration in seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Run AI analysis on a recording
    Analyze {
        /// Recording ID or partial ID
        id: String,

        /// Coaching focus (general, interview, sales, pitch)
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// Retry a failed analysis
    Retry {
        /// Recording ID or partial ID
        id: String,
    },

    /// List recordings in the library
    List {
        /// Maximum number of recordings to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show a recording and its coaching report
    Show {
        /// Recording ID or partial ID
        id: String,

        /// Print the raw analysis result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a recording from the library
    Delete {
        /// Recording ID or partial ID
        id: String,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
