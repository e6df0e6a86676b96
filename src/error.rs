use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for spritemap operations
#[derive(Error, Diagnostic, Debug)]
pub enum SpriteError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(spritemap::io))]
    Io { path: PathBuf, message: String },

    #[error("Invalid glob '{pattern}': {message}")]
    #[diagnostic(code(spritemap::glob))]
    InvalidGlob { pattern: String, message: String },

    #[error("Failed to decode {path}: {message}")]
    #[diagnostic(code(spritemap::decode))]
    Decode { path: PathBuf, message: String },

    #[error("Failed to encode {path}: {message}")]
    #[diagnostic(code(spritemap::encode))]
    Encode { path: PathBuf, message: String },

    #[error("Failed to composite: {message}")]
    #[diagnostic(code(spritemap::composite))]
    Composite { message: String },

    #[error("Sprite sheet would be {width}x{height}, larger than {limit}px per side")]
    #[diagnostic(
        code(spritemap::too_large),
        help("Reduce the spacing or split the images across several sheets")
    )]
    SheetTooLarge { width: u64, height: u64, limit: u32 },

    #[error("Unsupported image format: {format}")]
    #[diagnostic(
        code(spritemap::format),
        help("Use an output file extension such as .png, .gif or .jpg")
    )]
    UnsupportedFormat { format: String },

    #[error("Sprite sheet has no images")]
    #[diagnostic(code(spritemap::empty), help("Check that the glob matches at least one file"))]
    EmptySheet,

    #[error("Variable not found matching glob: {glob} sprite:{name}")]
    #[diagnostic(
        code(spritemap::sheet_not_found),
        help("Pass the value returned by sprite-map() as the first argument")
    )]
    SheetNotFound { glob: String, name: String },

    #[error("image {name} not found\n   try one of these: {}", known.join(" "))]
    #[diagnostic(code(spritemap::image_not_found))]
    ImageNotFound { name: String, known: Vec<String> },

    #[error("Please specify unit for offset ie. (2px)")]
    #[diagnostic(code(spritemap::missing_unit))]
    MissingUnit,

    #[error("Incompatible units: {left} and {right}")]
    #[diagnostic(code(spritemap::units))]
    IncompatibleUnits { left: String, right: String },

    #[error("Invalid type expected: {expected} got: {found}")]
    #[diagnostic(code(spritemap::invalid_type))]
    InvalidType { expected: &'static str, found: String },

    #[error("{function}: {message}")]
    #[diagnostic(code(spritemap::arguments))]
    Arguments { function: String, message: String },

    #[error("Unknown function: {0}")]
    #[diagnostic(code(spritemap::unknown_function))]
    UnknownFunction(String),

    #[error("Configuration error: {message}")]
    #[diagnostic(code(spritemap::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl SpriteError {
    /// True for conditions caused by stylesheet input rather than I/O.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SpriteError::InvalidGlob { .. }
                | SpriteError::SheetTooLarge { .. }
                | SpriteError::SheetNotFound { .. }
                | SpriteError::ImageNotFound { .. }
                | SpriteError::MissingUnit
                | SpriteError::IncompatibleUnits { .. }
                | SpriteError::InvalidType { .. }
                | SpriteError::Arguments { .. }
                | SpriteError::UnknownFunction(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SpriteError>;
