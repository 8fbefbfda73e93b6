//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Seed and maintain the Security Knowledge Framework database
#[derive(Parser, Debug)]
#[command(name = "skf-seed", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.skf/data/skf.db)
    #[arg(long, global = true, env = "SKF_DB")]
    pub db: Option<PathBuf>,

    /// Resource root containing markdown/ (default: current directory)
    #[arg(long, global = true, env = "SKF_ROOT")]
    pub root: Option<PathBuf>,

    /// Corpus layout JSON file (default: <root>/seed.json if present)
    #[arg(long, global = true, env = "SKF_LAYOUT")]
    pub layout: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop every table in the database
    Clear,

    /// Create and seed the database (no-op if already seeded)
    Init {
        /// Use the isolated test database (~/.skf/test/skf.db)
        #[arg(long)]
        testing: bool,
    },

    /// Drop, recreate and reseed the database
    Clean {
        /// Use the isolated test database (~/.skf/test/skf.db)
        #[arg(long)]
        testing: bool,
    },

    /// Reload knowledge-base and code examples from markdown
    Update,

    /// Show row counts for the seeded tables
    Status,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
