//! Asset lookup context.
//!
//! Textures, fonts and sounds are resolved by path through an [`Assets`]
//! value that the host owns and passes to whatever needs it. Each
//! [`AssetStore`] loads on first use and caches the handle under the
//! normalized path; components never manage the cache themselves.
//!
//! Loading is pluggable through [`AssetLoader`]: [`Assets::from_root`] reads
//! from disk (texture sizes are probed with the `image` crate), while
//! [`Assets::in_memory`] never loads anything and expects handles to be
//! inserted up front, which is what tests do.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::primitives::Vector2u;

/// Texture handle: enough to size sprites and to hand to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub path: String,
    pub size: Vector2u,
}

/// Font handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub path: String,
}

/// Sound handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub path: String,
}

/// Produces an asset from a normalized path, or `None` when it cannot.
pub trait AssetLoader<T> {
    fn load(&self, path: &str) -> Option<T>;
}

impl<T, F> AssetLoader<T> for F
where
    F: Fn(&str) -> Option<T>,
{
    fn load(&self, path: &str) -> Option<T> {
        self(path)
    }
}

/// Backslashes become slashes, surrounding whitespace and a leading `./` are
/// dropped.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let mut path = path.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.to_string()
}

/// Load-on-first-use cache keyed by normalized path.
pub struct AssetStore<T> {
    loader: Box<dyn AssetLoader<T>>,
    cache: FxHashMap<String, Arc<T>>,
}

impl<T> fmt::Debug for AssetStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStore")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<T> AssetStore<T> {
    pub fn new(loader: impl AssetLoader<T> + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cache: FxHashMap::default(),
        }
    }

    /// Store that never loads; handles must be [`insert`](Self::insert)ed.
    pub fn manual() -> Self
    where
        T: 'static,
    {
        Self::new(|_: &str| None::<T>)
    }

    /// Cached handle for `path`, loading it on first use.
    pub fn get(&mut self, path: &str) -> Option<Arc<T>> {
        let key = normalize_path(path);
        if key.is_empty() {
            return None;
        }
        if let Some(handle) = self.cache.get(&key) {
            return Some(Arc::clone(handle));
        }
        let handle = Arc::new(self.loader.load(&key)?);
        debug!("Loaded asset '{key}'");
        self.cache.insert(key, Arc::clone(&handle));
        Some(handle)
    }

    /// Cached handle without loading.
    pub fn peek(&self, path: &str) -> Option<Arc<T>> {
        self.cache.get(&normalize_path(path)).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.cache.contains_key(&normalize_path(path))
    }

    /// Put an already-built handle in the cache, replacing any previous one.
    pub fn insert(&mut self, path: &str, asset: T) -> Arc<T> {
        let handle = Arc::new(asset);
        self.cache.insert(normalize_path(path), Arc::clone(&handle));
        handle
    }

    /// Drop the cached handle for `path`. Returns whether one was cached.
    pub fn unload(&mut self, path: &str) -> bool {
        self.cache.remove(&normalize_path(path)).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Reads texture dimensions from image files under a root directory.
pub struct FileTextureLoader {
    root: PathBuf,
}

impl FileTextureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader<Texture> for FileTextureLoader {
    fn load(&self, path: &str) -> Option<Texture> {
        let full = self.root.join(path);
        match image::image_dimensions(&full) {
            Ok((width, height)) => Some(Texture {
                path: path.to_string(),
                size: Vector2u::new(width, height),
            }),
            Err(e) => {
                warn!("Failed to load texture {:?}: {e}", full);
                None
            }
        }
    }
}

/// Accepts any existing file under a root directory.
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn exists(&self, path: &str) -> bool {
        let full = self.root.join(path);
        if full.is_file() {
            true
        } else {
            warn!("Asset file {:?} not found", full);
            false
        }
    }
}

impl AssetLoader<Font> for FileLoader {
    fn load(&self, path: &str) -> Option<Font> {
        self.exists(path).then(|| Font {
            path: path.to_string(),
        })
    }
}

impl AssetLoader<Sound> for FileLoader {
    fn load(&self, path: &str) -> Option<Sound> {
        self.exists(path).then(|| Sound {
            path: path.to_string(),
        })
    }
}

/// Asset context passed to draw calls and asset-aware component setters.
///
/// Constructed once by the host and torn down when dropped; [`reset`](Self::reset)
/// is the explicit way to start over mid-run.
#[derive(Debug)]
pub struct Assets {
    pub textures: AssetStore<Texture>,
    pub fonts: AssetStore<Font>,
    pub sounds: AssetStore<Sound>,
}

impl Default for Assets {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Assets {
    /// Context whose stores only hold what is inserted into them.
    pub fn in_memory() -> Self {
        Self {
            textures: AssetStore::manual(),
            fonts: AssetStore::manual(),
            sounds: AssetStore::manual(),
        }
    }

    /// Context loading from files below `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("Assets root: {:?}", root);
        Self {
            textures: AssetStore::new(FileTextureLoader::new(root.clone())),
            fonts: AssetStore::new(FileLoader::new(root.clone())),
            sounds: AssetStore::new(FileLoader::new(root)),
        }
    }

    /// Register a texture of known size without touching the disk.
    pub fn insert_texture(&mut self, path: &str, size: Vector2u) -> Arc<Texture> {
        let path = normalize_path(path);
        self.textures.insert(&path, Texture { path: path.clone(), size })
    }

    /// Register a font without touching the disk.
    pub fn insert_font(&mut self, path: &str) -> Arc<Font> {
        let path = normalize_path(path);
        self.fonts.insert(&path, Font { path: path.clone() })
    }

    /// Pixel size of a texture, loading it if needed.
    pub fn texture_size(&mut self, path: &str) -> Option<Vector2u> {
        self.textures.get(path).map(|t| t.size)
    }

    /// Drop every cached handle.
    pub fn reset(&mut self) {
        self.textures.clear();
        self.fonts.clear();
        self.sounds.clear();
        info!("Assets reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./art\\hero.png"), "art/hero.png");
        assert_eq!(normalize_path("  ././a.png "), "a.png");
        assert_eq!(normalize_path("a/b.png"), "a/b.png");
    }

    #[test]
    fn test_loads_once_and_caches() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut store = AssetStore::new(move |path: &str| {
            counter.set(counter.get() + 1);
            Some(Texture {
                path: path.to_string(),
                size: Vector2u::new(4, 4),
            })
        });
        let a = store.get("./hero.png").unwrap();
        let b = store.get("hero.png").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_miss_is_none_and_not_cached() {
        let mut store: AssetStore<Font> = AssetStore::manual();
        assert!(store.get("missing.ttf").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unload_and_clear() {
        let mut assets = Assets::in_memory();
        assets.insert_texture("a.png", Vector2u::new(2, 2));
        assets.insert_texture("b.png", Vector2u::new(2, 2));
        assert!(assets.textures.unload("./a.png"));
        assert!(!assets.textures.unload("a.png"));
        assert_eq!(assets.textures.len(), 1);
        assets.reset();
        assert!(assets.textures.is_empty());
    }

    #[test]
    fn test_texture_size_lookup() {
        let mut assets = Assets::in_memory();
        assets.insert_texture("sheet.png", Vector2u::new(128, 64));
        assert_eq!(assets.texture_size("sheet.png"), Some(Vector2u::new(128, 64)));
        assert_eq!(assets.texture_size("other.png"), None);
    }

    #[test]
    fn test_file_texture_loader_missing_file() {
        let loader = FileTextureLoader::new("/nonexistent-root");
        assert!(loader.load("nothing.png").is_none());
    }
}
