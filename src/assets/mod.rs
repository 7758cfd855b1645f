//! # Asset Catalog
//!
//! Maps logical texture names (`"bricks/color"`, `"grass/normal"`) to image
//! files on disk together with their sampling setup (wrap mode, repeat count,
//! color space). The catalog is pure bookkeeping; decoding happens in the
//! [`loader`] on a background thread and uploading happens in the renderer.

pub mod loader;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use loader::{DecodedTexture, TextureLoader};

/// Opaque handle to a texture registered in an [`AssetCatalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

impl TextureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How texture coordinates outside `0..1` are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

impl WrapMode {
    pub fn address_mode(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// A registered texture and its sampling configuration
#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub name: String,
    pub path: PathBuf,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// UV repeat count along u and v
    pub repeat: [f32; 2],
    /// Color maps are stored sRGB, data maps (normal, roughness, ...) linear
    pub srgb: bool,
}

/// Registry of every texture the scene references
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    root: PathBuf,
    textures: Vec<TextureAsset>,
    by_name: HashMap<String, TextureId>,
}

/// Texture groups and map names used by the diorama
const HOUSE_TEXTURES: &[(&str, &[&str])] = &[
    ("bricks", &["color", "normal", "ambientOcclusion", "roughness"]),
    (
        "door",
        &[
            "color",
            "alpha",
            "ambientOcclusion",
            "height",
            "normal",
            "metalness",
            "roughness",
        ],
    ),
    ("grass", &["color", "ambientOcclusion", "normal", "roughness"]),
];

/// Tiling applied to every grass map
pub const GRASS_REPEAT: f32 = 8.0;

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Catalog with every brick, door and grass map of the diorama
    ///
    /// Files are expected at `<root>/textures/<group>/<map>.jpg`. The grass maps
    /// repeat 8×8 across the floor.
    pub fn haunted_house(root: impl Into<PathBuf>) -> Self {
        let mut catalog = Self::new(root);

        for (group, maps) in HOUSE_TEXTURES {
            for map in maps.iter() {
                let name = format!("{}/{}", group, map);
                let id = catalog.register(&name, format!("textures/{}.jpg", name));
                if *map == "color" {
                    catalog.set_srgb(id, true);
                }
                if *group == "grass" {
                    catalog.set_wrap(id, WrapMode::Repeat, WrapMode::Repeat);
                    catalog.set_repeat(id, GRASS_REPEAT, GRASS_REPEAT);
                }
            }
        }

        log::debug!(
            "Registered {} textures under {:?}",
            catalog.len(),
            catalog.root
        );
        catalog
    }

    /// Registers a texture relative to the catalog root
    ///
    /// Registering an existing name returns the existing handle unchanged.
    pub fn register(&mut self, name: &str, relative_path: impl AsRef<Path>) -> TextureId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }

        let id = TextureId(self.textures.len() as u32);
        self.textures.push(TextureAsset {
            name: name.to_string(),
            path: self.root.join(relative_path),
            wrap_s: WrapMode::ClampToEdge,
            wrap_t: WrapMode::ClampToEdge,
            repeat: [1.0, 1.0],
            srgb: false,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn set_wrap(&mut self, id: TextureId, wrap_s: WrapMode, wrap_t: WrapMode) {
        if let Some(asset) = self.textures.get_mut(id.index()) {
            asset.wrap_s = wrap_s;
            asset.wrap_t = wrap_t;
        }
    }

    pub fn set_repeat(&mut self, id: TextureId, u: f32, v: f32) {
        if let Some(asset) = self.textures.get_mut(id.index()) {
            asset.repeat = [u, v];
        }
    }

    pub fn set_srgb(&mut self, id: TextureId, srgb: bool) {
        if let Some(asset) = self.textures.get_mut(id.index()) {
            asset.srgb = srgb;
        }
    }

    /// Looks up a texture handle by logical name
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureAsset> {
        self.textures.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &TextureAsset)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, asset)| (TextureId(i as u32), asset))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haunted_house_catalog_contents() {
        let catalog = AssetCatalog::haunted_house("assets");
        assert_eq!(catalog.len(), 15);

        let grass = catalog.get(catalog.id("grass/normal").unwrap()).unwrap();
        assert_eq!(grass.repeat, [8.0, 8.0]);
        assert_eq!(grass.wrap_s, WrapMode::Repeat);
        assert_eq!(grass.wrap_t, WrapMode::Repeat);
        assert!(!grass.srgb);

        let bricks = catalog.get(catalog.id("bricks/color").unwrap()).unwrap();
        assert_eq!(bricks.repeat, [1.0, 1.0]);
        assert_eq!(bricks.wrap_s, WrapMode::ClampToEdge);
        assert!(bricks.srgb);
        assert_eq!(bricks.path, Path::new("assets").join("textures/bricks/color.jpg"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut catalog = AssetCatalog::new("root");
        let first = catalog.register("moss", "moss.png");
        let second = catalog.register("moss", "other.png");
        assert_eq!(first, second);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(first).unwrap().path, Path::new("root").join("moss.png"));
        assert!(catalog.id("lichen").is_none());
    }
}
