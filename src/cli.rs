//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// folio portfolio site CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Root directory path
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Built site directory (relative to project root)
    #[arg(short, long)]
    pub dist: Option<PathBuf>,

    /// Saved post captures directory (relative to project root)
    #[arg(short, long)]
    pub posts: Option<PathBuf>,

    /// Project folders directory (relative to project root)
    #[arg(long)]
    pub projects: Option<PathBuf>,

    /// Config file name (default: folio.toml)
    #[arg(short = 'C', long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the built site together with the posts/projects api
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(long)]
        port: Option<u16>,
    },

    /// Parse the saved post captures and print the result
    Posts {
        /// Print the posts as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Viewport width used to print the carousel page layout
        #[arg(short, long)]
        width: Option<u32>,
    },

    /// Load the project folders and print the gallery
    Projects {
        /// Print the projects as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Gallery category to show (problem, ui, frontend)
        #[arg(long)]
        category: Vec<String>,

        /// Tag that every listed project must carry
        #[arg(short, long)]
        tag: Vec<String>,

        /// Sort oldest first
        #[arg(long)]
        oldest: bool,
    },

    /// Print and validate the video frame table and the page's section markup
    Frames {
        /// Frame rate used for the time column (default: `[video].fallback_fps`)
        #[arg(long)]
        fps: Option<f64>,

        /// Page to audit (default: `<dist>/index.html`)
        #[arg(long)]
        page: Option<PathBuf>,
    },
}
