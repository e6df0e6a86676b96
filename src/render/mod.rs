//! Rendering module for spritemap.
//!
//! This module decodes source images, lays them out on a shared canvas and
//! encodes the finished sprite sheet.

mod codec;
mod sheet;

pub use codec::{format_from_name, ImageSource, Raster, RasterCodec};
pub use sheet::{expand_glob, Direction, ImageList, Placement, MAX_SHEET_SIDE};
