//! Asset lookup across an ordered list of resource roots.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Extensions probed when the exact file is not present under a root.
///
/// Effect variants name their textures after the compressed originals
/// (`paperBG.dds`); ordinary raster files with the same stem are accepted.
const FALLBACK_EXTENSIONS: &[&str] = &["png", "tga", "webp", "dds"];

/// Ordered, de-duplicated list of asset roots. First match wins.
#[derive(Debug, Clone, Default)]
pub struct AssetRoots {
    roots: Vec<PathBuf>,
}

impl AssetRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root unless it is already registered.
    pub fn add_root(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve a relative asset path to an existing file.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        let relative = normalize_asset_path(relative.as_ref());
        for root in &self.roots {
            let candidate = root.join(&relative);
            if candidate.is_file() {
                return Some(candidate);
            }
            for ext in FALLBACK_EXTENSIONS {
                let candidate = candidate.with_extension(ext);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

/// Turn backslash-separated asset names into platform paths.
fn normalize_asset_path(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if text.contains('\\') {
        PathBuf::from(text.replace('\\', "/"))
    } else {
        path.to_path_buf()
    }
}

/// Read a whole text file.
pub fn slurp_text_file(path: impl AsRef<Path>) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}
