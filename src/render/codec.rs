//! Image codec boundary.
//!
//! The sheet builder only needs four capabilities from an image library:
//! decode a file, allocate a blank canvas, composite one image onto another,
//! and encode a canvas in a named format. `ImageSource` captures exactly that,
//! and `RasterCodec` implements it on top of the `image` crate.

use std::io::{Cursor, Write};
use std::path::Path;

use image::{imageops, DynamicImage, ImageFormat, RgbaImage};

use crate::error::{SpriteError, Result};

/// Pixel dimensions of a decoded image.
pub trait Raster {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

impl Raster for RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }
}

/// Decode/composite/encode capability consumed by [`ImageList`](super::ImageList).
pub trait ImageSource: Send + Sync {
    /// Decoded image type. Canvases use the same type.
    type Image: Raster + Send + Sync;

    /// Decode the image stored at `path`.
    fn decode(&self, path: &Path) -> Result<Self::Image>;

    /// Allocate a fully transparent canvas.
    fn new_canvas(&self, width: u32, height: u32) -> Self::Image;

    /// Copy `image` onto `canvas` with its top-left corner at (`x`, `y`).
    fn composite(&self, canvas: &mut Self::Image, image: &Self::Image, x: u32, y: u32) -> Result<()>;

    /// Encode `canvas` into `writer`. `format` is a case-insensitive format
    /// name such as `PNG` or `gif`, usually taken from a file extension.
    fn encode(&self, canvas: &Self::Image, format: &str, writer: &mut dyn Write) -> Result<()>;
}

/// [`ImageSource`] backed by the `image` crate. Every image is held as RGBA8.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Map a format name (`PNG`, `jpg`, ...) to an `image` format.
pub fn format_from_name(name: &str) -> Result<ImageFormat> {
    ImageFormat::from_extension(name.to_ascii_lowercase()).ok_or_else(|| {
        SpriteError::UnsupportedFormat {
            format: name.to_string(),
        }
    })
}

impl ImageSource for RasterCodec {
    type Image = RgbaImage;

    fn decode(&self, path: &Path) -> Result<RgbaImage> {
        let img = image::open(path).map_err(|e| SpriteError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(img.to_rgba8())
    }

    fn new_canvas(&self, width: u32, height: u32) -> RgbaImage {
        RgbaImage::new(width, height)
    }

    fn composite(&self, canvas: &mut RgbaImage, image: &RgbaImage, x: u32, y: u32) -> Result<()> {
        let fits = |at: u32, extent: u32, limit: u32| {
            at.checked_add(extent).is_some_and(|end| end <= limit)
        };
        if !fits(x, image.width(), canvas.width()) || !fits(y, image.height(), canvas.height()) {
            return Err(SpriteError::Composite {
                message: format!(
                    "{}x{} image at ({}, {}) does not fit a {}x{} canvas",
                    image.width(),
                    image.height(),
                    x,
                    y,
                    canvas.width(),
                    canvas.height()
                ),
            });
        }
        imageops::replace(canvas, image, i64::from(x), i64::from(y));
        Ok(())
    }

    fn encode(&self, canvas: &RgbaImage, format: &str, writer: &mut dyn Write) -> Result<()> {
        let format = format_from_name(format)?;

        // Encoders need Seek, so go through a buffer
        let mut buf = Cursor::new(Vec::new());
        let encoded = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg => DynamicImage::ImageRgba8(canvas.clone())
                .to_rgb8()
                .write_to(&mut buf, format),
            _ => canvas.write_to(&mut buf, format),
        };
        encoded.map_err(|e| SpriteError::Encode {
            path: Default::default(),
            message: e.to_string(),
        })?;

        writer.write_all(buf.get_ref()).map_err(|e| SpriteError::Encode {
            path: Default::default(),
            message: e.to_string(),
        })
    }
}
