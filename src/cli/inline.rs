//! Inline command implementation.
//!
//! Prints the first image matched by a glob as a CSS data URI.

use std::path::PathBuf;

use clap::Args;

use crate::error::Result;
use crate::functions::Registry;
use crate::session::Session;
use crate::value::Value;

/// Print an image as a base64 data URI
#[derive(Args, Debug)]
pub struct InlineArgs {
    /// Image path or glob; the first match is used
    #[arg(required = true)]
    pub path: String,

    /// Config file (default: spritemap.yaml if present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

pub fn run(args: InlineArgs) -> Result<()> {
    let ctx = super::load_context(args.config.as_deref())?;
    let session = Session::new(ctx);
    let registry = Registry::with_builtins()?;

    let uri = registry.call(&session, "inline-image", &[Value::string(args.path)])?;
    println!("{}", uri);
    Ok(())
}
