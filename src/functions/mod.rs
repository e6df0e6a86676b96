//! Stylesheet functions for sprite sheets.
//!
//! A [`Registry`] maps function names to handlers. Each handler is declared
//! with a signature string; arguments are bound against it (filling in
//! defaults) before the handler runs.
//!
//! # Example
//!
//! ```ignore
//! use spritemap::{Context, Registry, Session, Value};
//!
//! let session = Session::new(Context::default());
//! let registry = Registry::with_builtins()?;
//!
//! let map = registry.call(&session, "sprite-map", &[Value::string("img/*.png")])?;
//! let css = registry.call(&session, "sprite", &[map, Value::string("logo")])?;
//! ```

mod handlers;
mod signature;

use crate::error::{Result, SpriteError};
use crate::session::SpriteProvider;
use crate::value::Value;

pub use handlers::build_sheet;
pub use signature::{Param, Signature};

/// A function callable from a stylesheet.
pub type Handler<P> = fn(&P, &[Value]) -> Result<Value>;

/// Builtin sprite functions and their signatures.
pub fn builtins<P: SpriteProvider>() -> Vec<(&'static str, Handler<P>)> {
    vec![
        ("sprite-map($glob, $spacing: 0px)", handlers::sprite_map::<P> as Handler<P>),
        ("sprite($map, $name, $offsetX: 0px, $offsetY: 0px)", handlers::sprite::<P> as Handler<P>),
        ("sprite-position($map, $file)", handlers::sprite_position::<P> as Handler<P>),
        ("sprite-file($map, $name)", handlers::sprite_file::<P> as Handler<P>),
        ("sprite-dimensions($map, $name)", handlers::sprite_dimensions::<P> as Handler<P>),
        ("image-width($map, $name)", handlers::image_width::<P> as Handler<P>),
        ("image-height($map, $name)", handlers::image_height::<P> as Handler<P>),
        ("inline-image($path)", handlers::inline_image::<P> as Handler<P>),
    ]
}

/// Function table for one provider type.
pub struct Registry<P: SpriteProvider> {
    functions: Vec<(Signature, Handler<P>)>,
}

impl<P: SpriteProvider> Registry<P> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    /// A registry holding every builtin sprite function.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for (signature, handler) in builtins::<P>() {
            registry.register(signature, handler)?;
        }
        Ok(registry)
    }

    /// Register `handler` under `signature`, replacing a function of the same name.
    pub fn register(&mut self, signature: &str, handler: Handler<P>) -> Result<()> {
        let signature = Signature::parse(signature)?;
        self.functions.retain(|(s, _)| s.name != signature.name);
        self.functions.push((signature, handler));
        Ok(())
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.functions.iter().find(|(s, _)| s.name == name).map(|(s, _)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(|(s, _)| s.name.as_str())
    }

    /// Call the function `name` with positional `args`.
    pub fn call(&self, provider: &P, name: &str, args: &[Value]) -> Result<Value> {
        let (signature, handler) = self
            .functions
            .iter()
            .find(|(s, _)| s.name == name)
            .ok_or_else(|| SpriteError::UnknownFunction(name.to_string()))?;

        let bound = signature.bind(args)?;
        handler(provider, &bound)
    }
}

impl<P: SpriteProvider> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Context;
    use crate::render::Direction;
    use crate::session::Session;
    use crate::value::Number;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn write_image(dir: &Path, name: &str, w: u32, h: u32) {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
            .save(dir.join(name))
            .unwrap();
    }

    fn setup(layout: Direction) -> (TempDir, Session, Registry<Session>) {
        let dir = tempdir().unwrap();
        let img = dir.path().join("img");
        let build = dir.path().join("build");
        std::fs::create_dir_all(&img).unwrap();
        std::fs::create_dir_all(build.join("img")).unwrap();
        write_image(&img, "a.png", 10, 20);
        write_image(&img, "b.png", 30, 5);

        let ctx = Context {
            image_dir: img,
            build_dir: build.clone(),
            gen_img_dir: build.join("img"),
            http_path: None,
            layout,
        };
        (dir, Session::new(ctx), Registry::with_builtins().unwrap())
    }

    fn map(session: &Session, registry: &Registry<Session>) -> Value {
        registry
            .call(session, "sprite-map", &[Value::string("\"*.png\"")])
            .unwrap()
    }

    #[test]
    fn test_builtins_registered() {
        let (_dir, _session, registry) = setup(Direction::Vertical);
        let names: Vec<&str> = registry.names().collect();
        assert!(names.contains(&"sprite-map"));
        assert!(names.contains(&"inline-image"));
        assert_eq!(registry.signature("sprite").unwrap().params.len(), 4);
    }

    #[test]
    fn test_sprite_map_returns_key_and_writes_sheet() {
        let (dir, session, registry) = setup(Direction::Vertical);
        let key = map(&session, &registry);

        assert_eq!(key, Value::string("*.png0"));
        let sheet = session.sprites().get("*.png0").unwrap();
        let out = sheet.output_path().unwrap();
        assert!(out.exists());
        assert_eq!(out.parent().unwrap(), dir.path().join("build").join("img"));
    }

    #[test]
    fn test_sprite_map_spacing_is_part_of_key() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let spaced = registry
            .call(
                &session,
                "sprite-map",
                &[Value::string("*.png"), Number::px(4.0).into()],
            )
            .unwrap();
        map(&session, &registry);

        assert_eq!(spaced, Value::string("*.png4"));
        assert_eq!(session.sprites().len(), 2);
        assert_eq!(session.sprites().get("*.png4").unwrap().height(), 29);
    }

    #[test]
    fn test_sprite_url_and_position() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let key = map(&session, &registry);
        let out = session.sprites().get("*.png0").unwrap();
        let name = out.output_path().unwrap().file_name().unwrap().to_string_lossy().into_owned();

        let css = registry
            .call(&session, "sprite", &[key.clone(), Value::string("b")])
            .unwrap();
        assert_eq!(css.to_string(), format!("url(\"img/{}\") 0px -20px", name));

        let shifted = registry
            .call(
                &session,
                "sprite",
                &[key, Value::string("b"), Number::px(2.0).into(), Number::px(3.0).into()],
            )
            .unwrap();
        assert_eq!(shifted.to_string(), format!("url(\"img/{}\") 2px -17px", name));
    }

    #[test]
    fn test_sprite_with_http_path() {
        let (_dir, mut session, registry) = setup(Direction::Horizontal);
        let mut ctx = session.context().clone();
        ctx.http_path = Some("http://cdn.example.com/sprites".to_string());
        session = Session::new(ctx);

        let key = map(&session, &registry);
        let css = registry.call(&session, "sprite", &[key, Value::string("b")]).unwrap();
        let css = css.to_string();
        assert!(css.starts_with("url(\"http://cdn.example.com/sprites/"), "{}", css);
        assert!(css.ends_with("\") -10px 0px"), "{}", css);
    }

    #[test]
    fn test_sprite_offset_without_unit() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let key = map(&session, &registry);
        let err = registry
            .call(
                &session,
                "sprite",
                &[key, Value::string("a"), Number::unitless(2.0).into()],
            )
            .unwrap_err();
        assert!(matches!(err, SpriteError::MissingUnit));
        assert_eq!(err.to_string(), "Please specify unit for offset ie. (2px)");
    }

    #[test]
    fn test_sprite_position_list() {
        let (_dir, session, registry) = setup(Direction::Horizontal);
        let key = map(&session, &registry);
        let pos = registry
            .call(&session, "sprite-position", &[key, Value::string("b")])
            .unwrap();
        assert_eq!(
            pos,
            Value::List(vec![Number::px(-10.0).into(), Number::px(0.0).into()])
        );
        assert_eq!(pos.to_string(), "-10px 0px");
    }

    #[test]
    fn test_unknown_sheet() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let err = registry
            .call(&session, "sprite-position", &[Value::string("nope0"), Value::string("a")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Variable not found matching glob: nope0 sprite:a");
    }

    #[test]
    fn test_unknown_image_lists_alternatives() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let key = map(&session, &registry);
        for function in ["sprite", "sprite-position"] {
            let err = registry
                .call(&session, function, &[key.clone(), Value::string("c")])
                .unwrap_err();
            match err {
                SpriteError::ImageNotFound { known, .. } => assert_eq!(known, vec!["a", "b"]),
                other => panic!("expected ImageNotFound, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_sprite_file_passes_through() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let out = registry
            .call(&session, "sprite-file", &[Value::string("any*.png"), Value::string("x")])
            .unwrap();
        assert_eq!(
            out,
            Value::List(vec![Value::string("any*.png"), Value::string("x")])
        );
        assert!(session.sprites().is_empty());
    }

    #[test]
    fn test_dimensions_and_sizes() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let key = map(&session, &registry);

        let dims = registry
            .call(&session, "sprite-dimensions", &[key.clone(), Value::string("a")])
            .unwrap();
        assert_eq!(dims.to_string(), "width: 10px;\nheight: 20px");

        let w = registry.call(&session, "image-width", &[key.clone(), Value::string("b")]).unwrap();
        let h = registry.call(&session, "image-height", &[key, Value::string("b")]).unwrap();
        assert_eq!(w.to_string(), "30px");
        assert_eq!(h.to_string(), "5px");
    }

    #[test]
    fn test_inline_image() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let uri = registry
            .call(&session, "inline-image", &[Value::string("a.png")])
            .unwrap();
        assert!(uri.to_string().starts_with("url('data:image/png;base64,"));
        assert!(session.sprites().is_empty());
    }

    #[test]
    fn test_wrong_argument_type() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let err = registry
            .call(&session, "sprite-map", &[Number::px(5.0).into()])
            .unwrap_err();
        assert!(matches!(err, SpriteError::InvalidType { expected: "string", .. }));
    }

    #[test]
    fn test_unknown_function() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        let err = registry.call(&session, "font-url", &[]).unwrap_err();
        assert!(matches!(err, SpriteError::UnknownFunction(_)));
    }

    #[test]
    fn test_oversized_spacing_is_an_error() {
        let (_dir, session, registry) = setup(Direction::Vertical);
        for spacing in [5e9, 70_000.0] {
            let err = registry
                .call(
                    &session,
                    "sprite-map",
                    &[Value::string("*.png"), Number::px(spacing).into()],
                )
                .unwrap_err();
            assert!(matches!(err, SpriteError::SheetTooLarge { .. }), "{:?}", err);
        }
        assert!(session.sprites().is_empty());
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let (dir, session, registry) = setup(Direction::Vertical);
        std::fs::write(dir.path().join("img").join("broken.png"), b"garbage").unwrap();

        let err = registry
            .call(&session, "sprite-map", &[Value::string("*.png")])
            .unwrap_err();
        assert!(matches!(err, SpriteError::Decode { .. }));
        assert!(session.sprites().is_empty());
    }
}
