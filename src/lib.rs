//! spritemap - Sprite sheets for stylesheet preprocessors
//!
//! Packs the images matched by a glob into a single row or column, writes
//! the composite sheet once per compilation run, and answers CSS position
//! queries for the individual images from a per-run cache.

pub mod cli;
pub mod config;
pub mod error;
pub mod functions;
pub mod output;
pub mod render;
pub mod session;
pub mod store;
pub mod value;

pub use config::{Context, CONFIG_FILENAME};
pub use error::{Result, SpriteError};
pub use functions::{Handler, Registry, Signature};
pub use render::{Direction, ImageList, ImageSource, Placement, Raster, RasterCodec};
pub use session::{Session, SpriteProvider};
pub use store::{cache_key, SpriteStore};
pub use value::{Number, Value};
