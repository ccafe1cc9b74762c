//! Sprite asset catalog
//!
//! Sprites are listed in a JSON manifest and addressed by name (characters,
//! cursors, effects) or by position (the two terrain variants).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ClientError;
use crate::scene::Visual;

/// Index of a sprite in the [`AssetCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(pub usize);

fn default_sprite_size() -> u32 {
    32
}

/// One named sprite image
#[derive(Debug, Clone, Deserialize)]
pub struct AssetEntry {
    pub name: String,
    pub path: String,
    #[serde(default = "default_sprite_size")]
    pub width: u32,
    #[serde(default = "default_sprite_size")]
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    sprites: Vec<AssetEntry>,
}

/// Ordered, name-addressable list of sprite assets
///
/// Order matters: the first two entries are the terrain variants, picked
/// by a cell's 0/1 terrain kind.
///
/// # Manifest format
///
/// ```json
/// { "sprites": [ { "name": "grass", "path": "sprites/grass.png" } ] }
/// ```
///
/// Paths are relative to the manifest file. `width`/`height` default to 32.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    entries: Vec<AssetEntry>,
    base_dir: PathBuf,
}

impl AssetCatalog {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_json::from_str(&content)?;

        Ok(AssetCatalog {
            entries: manifest.sprites,
            base_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        })
    }

    /// Looks up a sprite by name; `None` is the "not found" case
    pub fn find(&self, name: &str) -> Option<AssetId> {
        self.entries
            .iter()
            .position(|entry| entry.name == name)
            .map(AssetId)
    }

    pub fn by_index(&self, index: usize) -> Option<AssetId> {
        (index < self.entries.len()).then_some(AssetId(index))
    }

    pub fn get(&self, id: AssetId) -> Option<&AssetEntry> {
        self.entries.get(id.0)
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    /// File path of an entry, resolved against the manifest's directory
    pub fn resolve_path(&self, entry: &AssetEntry) -> PathBuf {
        self.base_dir.join(&entry.path)
    }

    /// Builds a sprite visual for `id`, sized from its catalog entry
    pub fn visual(&self, id: AssetId) -> Option<Visual> {
        self.get(id)
            .map(|entry| Visual::sprite(id, entry.width, entry.height))
    }

    /// Builds a sprite visual for the named asset
    pub fn sprite(&self, name: &str) -> Option<Visual> {
        self.find(name).and_then(|id| self.visual(id))
    }
}

#[cfg(test)]
impl AssetEntry {
    /// Creates a single-tile (32x32) entry
    pub fn new(name: &str, path: &str) -> Self {
        AssetEntry {
            name: name.to_string(),
            path: path.to_string(),
            width: default_sprite_size(),
            height: default_sprite_size(),
        }
    }
}

#[cfg(test)]
impl AssetCatalog {
    /// In-memory catalog with paths relative to the working directory
    pub fn new(entries: Vec<AssetEntry>) -> Self {
        AssetCatalog {
            entries,
            base_dir: PathBuf::new(),
        }
    }
}
