//! One compilation run.
//!
//! Stylesheet functions never reach for global state. They receive a
//! [`SpriteProvider`], which hands out the run's context, its sprite cache
//! and the codec used to build sheets. [`Session`] is the owner of those for
//! the lifetime of a single compile; dropping it drops the cache.

use std::sync::Arc;

use crate::config::Context;
use crate::render::{ImageSource, RasterCodec};
use crate::store::SpriteStore;

/// Capability handed to stylesheet functions.
pub trait SpriteProvider: Sync {
    type Source: ImageSource;

    fn context(&self) -> &Context;

    fn sprites(&self) -> &SpriteStore<Self::Source>;

    fn image_source(&self) -> Arc<Self::Source>;
}

/// State owned by a single compilation run.
pub struct Session<S: ImageSource = RasterCodec> {
    context: Context,
    sprites: SpriteStore<S>,
    source: Arc<S>,
}

impl Session<RasterCodec> {
    pub fn new(context: Context) -> Self {
        Self::with_source(context, RasterCodec)
    }
}

impl<S: ImageSource> Session<S> {
    /// Create a session that decodes and encodes through `source`.
    pub fn with_source(context: Context, source: S) -> Self {
        Self {
            context,
            sprites: SpriteStore::new(),
            source: Arc::new(source),
        }
    }
}

impl<S: ImageSource> SpriteProvider for Session<S> {
    type Source = S;

    fn context(&self) -> &Context {
        &self.context
    }

    fn sprites(&self) -> &SpriteStore<S> {
        &self.sprites
    }

    fn image_source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }
}
