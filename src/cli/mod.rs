pub mod build;
pub mod completions;
pub mod inline;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{Context, CONFIG_FILENAME};
use crate::error::Result;

/// spritemap - Sprite sheets and CSS positions from image globs
#[derive(Parser, Debug)]
#[command(name = "spritemap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show debug output (cache hits, sheet builds)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a sprite sheet and print CSS for each image
    Build(build::BuildArgs),

    /// Print an image as a base64 data URI
    Inline(inline::InlineArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Load the context from `path`, or from `spritemap.yaml` in the current
/// directory when present, or fall back to defaults.
pub fn load_context(path: Option<&Path>) -> Result<Context> {
    match path {
        Some(path) => Context::load(path),
        None => {
            let default = PathBuf::from(CONFIG_FILENAME);
            if default.exists() {
                Context::load(&default)
            } else {
                Ok(Context::default())
            }
        }
    }
}
