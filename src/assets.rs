use std::path::{Path, PathBuf};

/// Subdirectory of the store root where rendered figures live. Lookup is by
/// exact filename; there is no fuzzy or recursive matching.
pub const VISUALIZATIONS_DIR: &str = "visualizations";

/// A figure resolved against the store: its on-disk location and pixel
/// dimensions, probed at render time and never cached.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Filesystem-backed figure lookup. The store is read-only at runtime;
/// existence of any given asset is never guaranteed.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset_path(&self, name: &str) -> PathBuf {
        self.root.join(VISUALIZATIONS_DIR).join(name)
    }

    /// Resolve a figure by exact filename. Returns `None` for anything that
    /// is missing or not a decodable raster image; callers degrade to an
    /// in-document warning rather than failing.
    pub fn resolve(&self, name: &str) -> Option<ImageAsset> {
        let path = self.asset_path(name);
        let (width, height) = image::image_dimensions(&path).ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(ImageAsset {
            path,
            width,
            height,
        })
    }
}
