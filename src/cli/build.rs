//! Build command implementation.
//!
//! Packs the images matched by one or more globs into one sheet and prints a
//! CSS rule (or JSON frame metadata) for every image in it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use serde::Serialize;

use crate::error::{Result, SpriteError};
use crate::functions::{build_sheet, Registry};
use crate::output::{display_path, plural, Printer};
use crate::render::{Direction, ImageList, RasterCodec};
use crate::session::{Session, SpriteProvider};
use crate::store::cache_key;
use crate::value::Value;

/// Build a sprite sheet and print CSS for each image
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Globs of source images (e.g. "icons/*.png"), packed in the order given
    #[arg(required = true)]
    pub globs: Vec<String>,

    /// Gap in pixels between images
    #[arg(long, default_value = "0")]
    pub spacing: u32,

    /// Lay images out left to right instead of top to bottom
    #[arg(long)]
    pub horizontal: bool,

    /// Config file (default: spritemap.yaml if present)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// File to write the sheet to; the extension picks the format
    /// (default: generated name in gen_img_dir)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Print frame metadata as JSON instead of CSS
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let mut ctx = super::load_context(args.config.as_deref())?;
    if args.horizontal {
        ctx.layout = Direction::Horizontal;
    }

    let out_dir = match args.out.as_deref().and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => ctx.output_dir().to_path_buf(),
    };
    if !out_dir.exists() {
        fs::create_dir_all(&out_dir).map_err(|e| SpriteError::Io {
            path: out_dir.clone(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let session = Session::new(ctx);
    let registry = Registry::with_builtins()?;

    let globs = args.globs.join(" ");
    printer.status("Building", &globs);

    let sheet = Arc::new(build_sheet(&session, &args.globs, args.spacing, args.out.as_deref())?);
    let key = cache_key(&globs, i64::from(args.spacing));
    session.sprites().insert(&key, Arc::clone(&sheet));
    let key = Value::String(key);

    let Some(out) = sheet.output_path() else {
        printer.warning("Warning", &format!("No images matched {}", globs));
        return Ok(());
    };

    if args.json {
        let json = SheetJson::from_sheet(&sheet, session.context().sheet_url(out)?);
        let text = serde_json::to_string_pretty(&json).map_err(|e| SpriteError::Io {
            path: out.to_path_buf(),
            message: format!("Failed to serialize sheet metadata: {}", e),
        })?;
        println!("{}", text);
    } else {
        for name in sheet.names() {
            let background = registry.call(&session, "sprite", &[key.clone(), Value::string(name.as_str())])?;
            let dims = registry.call(
                &session,
                "sprite-dimensions",
                &[key.clone(), Value::string(name.as_str())],
            )?;
            println!("{}", css_rule(&name, &background.to_string(), &dims.to_string()));
        }
    }

    printer.status(
        "Finished",
        &format!(
            "{} ({}x{}) -> {}",
            plural(sheet.len(), "image", "images"),
            sheet.width(),
            sheet.height(),
            display_path(out)
        ),
    );
    Ok(())
}

fn css_rule(name: &str, background: &str, dimensions: &str) -> String {
    let dims: Vec<String> = dimensions.lines().map(|l| format!("  {};", l.trim_end_matches(';'))).collect();
    format!(".{} {{\n  background: {};\n{}\n}}", name, background, dims.join("\n"))
}

// --- JSON frame metadata ---

#[derive(Serialize)]
struct SheetJson {
    frames: BTreeMap<String, FrameJson>,
    meta: MetaJson,
}

#[derive(Serialize)]
struct FrameJson {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct MetaJson {
    app: String,
    version: String,
    image: String,
    size: SizeJson,
    layout: Direction,
    spacing: u32,
}

#[derive(Serialize)]
struct SizeJson {
    w: u32,
    h: u32,
}

impl SheetJson {
    /// Frames are keyed by file name so images sharing a stem stay apart.
    fn from_sheet(sheet: &ImageList<RasterCodec>, image: String) -> Self {
        let mut frames = BTreeMap::new();
        for (i, file) in sheet.files().iter().enumerate() {
            let Some((w, h)) = sheet.image_size(i) else {
                continue;
            };
            let at = sheet.placement(i);
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            frames.insert(name, FrameJson { x: at.x, y: at.y, w, h });
        }

        SheetJson {
            frames,
            meta: MetaJson {
                app: "spritemap".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                image,
                size: SizeJson {
                    w: sheet.width(),
                    h: sheet.height(),
                },
                layout: sheet.direction(),
                spacing: sheet.padding(),
            },
        }
    }
}
