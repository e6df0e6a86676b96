//! Compilation context (spritemap.yaml).
//!
//! The context says where source images live, where sheets are written and
//! how a written sheet is referenced from the generated CSS.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SpriteError};
use crate::render::Direction;

/// Default name of the context file.
pub const CONFIG_FILENAME: &str = "spritemap.yaml";

/// Directories and URL settings for one compilation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    /// Directory source images are resolved against.
    pub image_dir: PathBuf,

    /// Directory the compiled stylesheet is written to.
    pub build_dir: PathBuf,

    /// Directory generated sprite sheets are written to.
    pub gen_img_dir: PathBuf,

    /// Base URL or path for sheets. When unset, sheet URLs lead from
    /// `build_dir` to the output directory.
    pub http_path: Option<String>,

    /// Layout used for new sheets.
    pub layout: Direction,
}

impl Context {
    /// Load a context from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SpriteError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse a context from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| SpriteError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Directory new sheets are written into.
    pub fn output_dir(&self) -> &Path {
        if !self.gen_img_dir.as_os_str().is_empty() {
            &self.gen_img_dir
        } else if !self.build_dir.as_os_str().is_empty() {
            &self.build_dir
        } else {
            Path::new(".")
        }
    }

    /// Resolve a glob against `image_dir` unless it is already absolute.
    pub fn resolve_glob(&self, glob: &str) -> String {
        if self.image_dir.as_os_str().is_empty() || Path::new(glob).is_absolute() {
            glob.to_string()
        } else {
            self.image_dir.join(glob).to_string_lossy().into_owned()
        }
    }

    /// URL used in CSS for a sheet written to `sheet`.
    ///
    /// Without `http_path` the URL leads from `build_dir` to the directory
    /// holding `sheet`; a bare file name is taken to live in [`output_dir`].
    ///
    /// [`output_dir`]: Context::output_dir
    pub fn sheet_url(&self, sheet: &Path) -> Result<String> {
        let name = sheet
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.http_path.as_deref().filter(|p| !p.is_empty()) {
            None => {
                let dir = sheet
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| self.output_dir());
                let rel = relative_path(&self.build_dir, dir);
                if rel.as_os_str().is_empty() {
                    Ok(name)
                } else {
                    Ok(format!("{}/{}", to_slash(&rel), name))
                }
            }
            Some(base) => match Url::parse(base) {
                Ok(mut url) => {
                    let path = join_url_path(url.path(), &name);
                    url.set_path(&path);
                    Ok(url.to_string())
                }
                Err(url::ParseError::RelativeUrlWithoutBase) => Ok(join_url_path(base, &name)),
                Err(e) => Err(SpriteError::Config {
                    message: format!("Invalid http_path '{}': {}", base, e),
                    help: None,
                }),
            },
        }
    }
}

fn join_url_path(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Path that leads from directory `from` to `to`, using `..` where needed.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from.components().filter(|c| *c != Component::CurDir).collect();
    let to: Vec<Component<'_>> = to.components().filter(|c| *c != Component::CurDir).collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for c in &to[common..] {
        rel.push(c.as_os_str());
    }
    rel
}
