//! Sprite function implementations.
//!
//! Every handler receives arguments already bound against its signature, so
//! `args` always has one entry per declared parameter.

use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::error::{Result, SpriteError};
use crate::render::ImageList;
use crate::session::SpriteProvider;
use crate::store::cache_key;
use crate::value::{unquote, FromValue, Number, Value};

fn arg<T: FromValue>(args: &[Value], index: usize) -> Result<T> {
    match args.get(index) {
        Some(value) => T::from_value(value),
        None => T::from_value(&Value::Null),
    }
}

/// Offsets must carry a unit so they can be added to pixel positions.
fn offset_arg(args: &[Value], index: usize) -> Result<Number> {
    let n: Number = arg(args, index)?;
    if n.unit.is_none() {
        return Err(SpriteError::MissingUnit);
    }
    Ok(n)
}

fn cached_sheet<P: SpriteProvider>(
    provider: &P,
    map: &str,
    name: &str,
) -> Result<Arc<ImageList<P::Source>>> {
    provider
        .sprites()
        .get(map)
        .ok_or_else(|| SpriteError::SheetNotFound {
            glob: map.to_string(),
            name: name.to_string(),
        })
}

/// Decode `globs` in order and write the sheet to `out`, or to a generated
/// name in the context's output directory.
pub fn build_sheet<P: SpriteProvider, G: AsRef<str>>(
    provider: &P,
    globs: &[G],
    padding: u32,
    out: Option<&Path>,
) -> Result<ImageList<P::Source>> {
    let ctx = provider.context();
    let mut list = ImageList::new(provider.image_source(), ctx.layout)
        .with_padding(padding)
        .with_output_dir(ctx.output_dir());
    let patterns: Vec<String> = globs.iter().map(|g| ctx.resolve_glob(g.as_ref())).collect();
    list.decode(&patterns)?;

    if let Some(path) = list.export(out)? {
        info!(
            "Built sprite sheet {} ({}x{}, {} images)",
            path.display(),
            list.width(),
            list.height(),
            list.len()
        );
    }
    Ok(list)
}

/// `sprite-map($glob, $spacing: 0px)`
///
/// Builds the sheet on first use and returns its cache key, which the other
/// sprite functions take as `$map`.
pub fn sprite_map<P: SpriteProvider>(provider: &P, args: &[Value]) -> Result<Value> {
    let glob: String = arg(args, 0)?;
    let spacing: Number = arg(args, 1)?;
    let glob = unquote(&glob).to_string();

    let spacing = spacing.value as i64;
    let key = cache_key(&glob, spacing);
    let padding = u32::try_from(spacing.max(0)).unwrap_or(u32::MAX);

    provider
        .sprites()
        .get_or_build(&key, || build_sheet(provider, &[glob.as_str()], padding, None))?;

    Ok(Value::String(key))
}

/// `sprite($map, $name, $offsetX: 0px, $offsetY: 0px)`
///
/// Returns `url("...") X Y` for use as a `background` value.
pub fn sprite<P: SpriteProvider>(provider: &P, args: &[Value]) -> Result<Value> {
    let map: String = arg(args, 0)?;
    let name: String = arg(args, 1)?;
    let offset_x = offset_arg(args, 2)?;
    let offset_y = offset_arg(args, 3)?;

    let sheet = cached_sheet(provider, &map, &name)?;
    let placement = sheet.position(&name)?;
    let Some(path) = sheet.output_path() else {
        return Ok(Value::string("transparent"));
    };
    let url = provider.context().sheet_url(path)?;

    let x = Number::px(-f64::from(placement.x)).checked_add(&offset_x)?;
    let y = Number::px(-f64::from(placement.y)).checked_add(&offset_y)?;

    Ok(Value::String(format!("url(\"{}\") {} {}", url, x, y)))
}

/// `sprite-position($map, $file)`
pub fn sprite_position<P: SpriteProvider>(provider: &P, args: &[Value]) -> Result<Value> {
    let map: String = arg(args, 0)?;
    let name: String = arg(args, 1)?;

    let placement = cached_sheet(provider, &map, &name)?.position(&name)?;
    Ok(Value::List(vec![
        Number::px(-f64::from(placement.x)).into(),
        Number::px(-f64::from(placement.y)).into(),
    ]))
}

/// `sprite-file($map, $name)` passes both arguments straight through.
pub fn sprite_file<P: SpriteProvider>(_provider: &P, args: &[Value]) -> Result<Value> {
    let map: String = arg(args, 0)?;
    let name: String = arg(args, 1)?;
    Ok(Value::List(vec![Value::String(map), Value::String(name)]))
}

/// `sprite-dimensions($map, $name)`
pub fn sprite_dimensions<P: SpriteProvider>(provider: &P, args: &[Value]) -> Result<Value> {
    let map: String = arg(args, 0)?;
    let name: String = arg(args, 1)?;
    let dims = cached_sheet(provider, &map, &name)?.dimensions(&name)?;
    Ok(Value::String(dims))
}

/// `image-width($map, $name)`
pub fn image_width<P: SpriteProvider>(provider: &P, args: &[Value]) -> Result<Value> {
    let map: String = arg(args, 0)?;
    let name: String = arg(args, 1)?;
    let w = cached_sheet(provider, &map, &name)?.image_width(&name)?;
    Ok(Number::px(f64::from(w)).into())
}

/// `image-height($map, $name)`
pub fn image_height<P: SpriteProvider>(provider: &P, args: &[Value]) -> Result<Value> {
    let map: String = arg(args, 0)?;
    let name: String = arg(args, 1)?;
    let h = cached_sheet(provider, &map, &name)?.image_height(&name)?;
    Ok(Number::px(f64::from(h)).into())
}

/// `inline-image($path)`
///
/// Not cached: the file is decoded on every call.
pub fn inline_image<P: SpriteProvider>(provider: &P, args: &[Value]) -> Result<Value> {
    let path: String = arg(args, 0)?;
    let ctx = provider.context();
    let mut list = ImageList::new(provider.image_source(), ctx.layout);
    list.decode(&[ctx.resolve_glob(unquote(&path))])?;
    Ok(Value::String(list.inline()?))
}
