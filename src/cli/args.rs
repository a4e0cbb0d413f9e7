//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Collapsible decision-tree layout: build split trees from node records and compute frames
#[derive(Parser, Debug)]
#[command(name = "dectree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (replaces the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Input selection shared by the tree commands.
#[derive(Args, Debug, Clone, Default)]
pub struct TreeArgs {
    /// Node records as JSON array (default: settings data_file, `-` for stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// nodeNumber of the root
    #[arg(short, long)]
    pub root: Option<i64>,

    /// Toggle these nodes (by nodeNumber) after the initial render, in order
    #[arg(long = "toggle", value_name = "NODE")]
    pub toggle: Vec<i64>,

    /// Start with every internal node collapsed
    #[arg(long)]
    pub collapsed: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the visible tree after applying toggles
    Show {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Stream layout frames as JSON (initial render plus one per toggle)
    Layout {
        #[command(flatten)]
        tree: TreeArgs,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Show node counts, height and label width
    Stats {
        /// Node records as JSON array
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// nodeNumber of the root
        #[arg(short, long)]
        root: Option<i64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}
