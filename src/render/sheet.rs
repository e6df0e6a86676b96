//! Sprite sheet assembly.
//!
//! An [`ImageList`] holds a fixed, ordered set of decoded images and lays them
//! out in a single row or column. Positions are prefix sums over that order,
//! so the list is never reordered after decoding.

use std::fmt;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use log::warn;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpriteError};

use super::codec::{ImageSource, Raster, RasterCodec};

/// Length of the random suffix in generated sheet names.
const SUFFIX_LEN: usize = 6;

/// Largest sheet width or height accepted.
pub const MAX_SHEET_SIDE: u32 = 1 << 16;

/// Layout direction of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Images placed left to right.
    Horizontal,
    /// Images stacked top to bottom.
    #[default]
    Vertical,
}

/// Top-left corner of an image inside a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

impl Placement {
    /// CSS `background-position` for this placement: the sheet is shifted
    /// left/up so the image lands at 0,0.
    pub fn css(&self) -> String {
        format!("{}px {}px", -i64::from(self.x), -i64::from(self.y))
    }
}

/// An ordered list of decoded images that make up one sprite sheet.
pub struct ImageList<S: ImageSource = RasterCodec> {
    source: Arc<S>,
    images: Vec<S::Image>,
    files: Vec<PathBuf>,
    direction: Direction,
    padding: u32,
    output_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    canvas: Option<S::Image>,
    combined: bool,
}

impl<S: ImageSource> ImageList<S> {
    /// Create an empty list laid out in `direction`.
    pub fn new(source: Arc<S>, direction: Direction) -> Self {
        Self {
            source,
            images: Vec::new(),
            files: Vec::new(),
            direction,
            padding: 0,
            output_dir: None,
            output_path: None,
            canvas: None,
            combined: false,
        }
    }

    /// Gap in pixels inserted between neighbouring images along the layout axis.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Directory that generated sheet names are written into.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Expand each pattern as a glob and decode every match in order.
    ///
    /// Any glob or decode failure aborts the call, as does a layout wider or
    /// taller than [`MAX_SHEET_SIDE`]. The list should be discarded
    /// afterwards; no partially decoded list is ever cached.
    pub fn decode<P: AsRef<str>>(&mut self, patterns: &[P]) -> Result<()> {
        self.canvas = None;
        self.combined = false;

        let mut paths = Vec::new();
        for pattern in patterns {
            paths.extend(expand_glob(pattern.as_ref())?);
        }

        if let Some(first) = paths.first() {
            self.output_path = Some(self.generated_path(first));
        }

        for path in paths {
            let img = self.source.decode(&path)?;
            self.images.push(img);
            self.files.push(path);
        }

        self.check_extents()
    }

    fn generated_path(&self, first: &Path) -> PathBuf {
        let dir = first.parent().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
        let dir = if dir.is_empty() { ".".to_string() } else { dir };
        let ext = first
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let name = sanitize_file_name(&format!("{}-{}{}", dir, random_suffix(SUFFIX_LEN), ext));

        match &self.output_dir {
            Some(out) => out.join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Source paths in layout order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Where the sheet is (or will be) written. `None` for an empty list.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// True once a composite canvas has been produced.
    pub fn is_combined(&self) -> bool {
        self.combined
    }

    /// The composite canvas, if built.
    pub fn canvas(&self) -> Option<&S::Image> {
        self.canvas.as_ref()
    }

    /// Image names (file stems) in layout order.
    pub fn names(&self) -> Vec<String> {
        self.files.iter().map(|f| file_stem(f)).collect()
    }

    /// Find an image by its exact path, its file name or its file stem.
    /// First match wins.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| {
            f.to_string_lossy() == name
                || f.file_name().is_some_and(|n| n.to_string_lossy() == name)
                || file_stem(f) == name
        })
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.lookup(name).ok_or_else(|| {
            let known = self.names();
            warn!("File not found: {} Try one of: {}", name, known.join(" "));
            SpriteError::ImageNotFound {
                name: name.to_string(),
                known,
            }
        })
    }

    /// Horizontal offset of the image at `index`.
    pub fn x(&self, index: usize) -> u32 {
        match self.direction {
            Direction::Vertical => 0,
            Direction::Horizontal => self.offset_along(index, |img| img.width()),
        }
    }

    /// Vertical offset of the image at `index`.
    pub fn y(&self, index: usize) -> u32 {
        match self.direction {
            Direction::Horizontal => 0,
            Direction::Vertical => self.offset_along(index, |img| img.height()),
        }
    }

    fn offset_along(&self, index: usize, extent: impl Fn(&S::Image) -> u32) -> u32 {
        let offset: u64 = self
            .images
            .iter()
            .take(index)
            .map(|img| u64::from(extent(img)) + u64::from(self.padding))
            .sum();
        clamp_u32(offset)
    }

    /// Top-left corner of the image at `index`.
    pub fn placement(&self, index: usize) -> Placement {
        Placement {
            x: self.x(index),
            y: self.y(index),
        }
    }

    /// Top-left corner of the named image.
    pub fn position(&self, name: &str) -> Result<Placement> {
        self.require(name).map(|i| self.placement(i))
    }

    /// `background-position` value for the named image, e.g. `0px -20px`.
    pub fn css_position(&self, name: &str) -> Result<String> {
        self.position(name).map(|p| p.css())
    }

    /// Width of the whole sheet.
    pub fn width(&self) -> u32 {
        clamp_u32(self.extents().0)
    }

    /// Height of the whole sheet.
    pub fn height(&self) -> u32 {
        clamp_u32(self.extents().1)
    }

    /// Sheet size before it is narrowed to `u32`.
    fn extents(&self) -> (u64, u64) {
        let widths = self.images.iter().map(|img| u64::from(img.width()));
        let heights = self.images.iter().map(|img| u64::from(img.height()));
        let gaps = u64::from(self.padding) * (self.images.len().saturating_sub(1) as u64);
        match self.direction {
            Direction::Horizontal => (widths.sum::<u64>() + gaps, heights.max().unwrap_or(0)),
            Direction::Vertical => (widths.max().unwrap_or(0), heights.sum::<u64>() + gaps),
        }
    }

    fn check_extents(&self) -> Result<()> {
        let (width, height) = self.extents();
        let limit = u64::from(MAX_SHEET_SIDE);
        if width > limit || height > limit {
            return Err(SpriteError::SheetTooLarge {
                width,
                height,
                limit: MAX_SHEET_SIDE,
            });
        }
        Ok(())
    }

    /// Width and height of the image at `index`.
    pub fn image_size(&self, index: usize) -> Option<(u32, u32)> {
        self.images.get(index).map(|img| (img.width(), img.height()))
    }

    /// Width of the named image.
    pub fn image_width(&self, name: &str) -> Result<u32> {
        let i = self.require(name)?;
        Ok(self.images[i].width())
    }

    /// Height of the named image.
    pub fn image_height(&self, name: &str) -> Result<u32> {
        let i = self.require(name)?;
        Ok(self.images[i].height())
    }

    /// CSS `width`/`height` declarations for the named image.
    pub fn dimensions(&self, name: &str) -> Result<String> {
        let i = self.require(name)?;
        let img = &self.images[i];
        Ok(format!("width: {}px;\nheight: {}px", img.width(), img.height()))
    }

    /// Composite every image onto one canvas. Does nothing if the canvas
    /// already exists.
    ///
    /// A failed combine leaves the canvas unset; the list should not be
    /// reused afterwards.
    pub fn combine(&mut self) -> Result<()> {
        if self.canvas.is_some() {
            return Ok(());
        }
        if self.images.is_empty() {
            return Err(SpriteError::EmptySheet);
        }

        self.check_extents()?;

        let mut canvas = self.source.new_canvas(self.width(), self.height());
        for (i, img) in self.images.iter().enumerate() {
            let at = self.placement(i);
            self.source.composite(&mut canvas, img, at.x, at.y)?;
        }

        self.canvas = Some(canvas);
        self.combined = true;
        Ok(())
    }

    /// Write the composite sheet to `path`, or to the generated output path
    /// when `path` is `None`. The format comes from the file extension.
    ///
    /// Returns the path written. An empty list writes nothing.
    pub fn export(&mut self, path: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = path {
            self.output_path = Some(sanitize_path(path));
        }
        let Some(out) = self.output_path.clone() else {
            return Ok(None);
        };
        if self.images.is_empty() {
            return Ok(None);
        }

        let format = out
            .extension()
            .map(|e| e.to_string_lossy().to_uppercase())
            .ok_or_else(|| SpriteError::UnsupportedFormat {
                format: out.display().to_string(),
            })?;

        let mut file = File::create(&out).map_err(|e| SpriteError::Io {
            path: out.clone(),
            message: format!("Failed to create sprite sheet: {}", e),
        })?;

        self.combine()?;
        let canvas = self.canvas.as_ref().ok_or(SpriteError::EmptySheet)?;
        self.source
            .encode(canvas, &format, &mut file)
            .map_err(|e| with_path(e, &out))?;

        Ok(Some(out))
    }

    /// Encode the first image as PNG and return it as a CSS data URI.
    pub fn inline(&self) -> Result<String> {
        let first = self.images.first().ok_or(SpriteError::EmptySheet)?;
        let mut buf = Cursor::new(Vec::new());
        self.source.encode(first, "PNG", &mut buf).map_err(|e| {
            let path = self.files.first().cloned().unwrap_or_default();
            with_path(e, &path)
        })?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(buf.get_ref());
        Ok(format!("url('data:image/png;base64,{}')", encoded))
    }
}

impl<S: ImageSource> fmt::Display for ImageList<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(" "))
    }
}

impl<S: ImageSource> fmt::Debug for ImageList<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageList")
            .field("files", &self.files)
            .field("direction", &self.direction)
            .field("padding", &self.padding)
            .field("output_path", &self.output_path)
            .field("combined", &self.combined)
            .finish()
    }
}

/// Expand a glob into the matching paths, in match order.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| SpriteError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    entries
        .map(|entry| {
            entry.map_err(|e| SpriteError::Io {
                path: e.path().to_path_buf(),
                message: e.error().to_string(),
            })
        })
        .collect()
}

fn clamp_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Strip `/` and `*` so glob fragments can't leak into a file name.
fn sanitize_file_name(name: &str) -> String {
    name.chars().filter(|c| *c != '/' && *c != '*').collect()
}

fn sanitize_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| sanitize_file_name(&n.to_string_lossy()))
        .unwrap_or_default();
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn with_path(err: SpriteError, path: &Path) -> SpriteError {
    match err {
        SpriteError::Encode { message, .. } => SpriteError::Encode {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    }
}
