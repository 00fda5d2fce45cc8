use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use engine::{read_json_if_exists, write_json_atomic, PersistError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::items::ItemKind;

pub(crate) const SPRITE_SIZE: usize = 32;

pub(crate) type Rgb = [u8; 3];

/// Fixed-size pixel grid; `None` cells are transparent. Stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PixelSprite {
    width: usize,
    height: usize,
    pixels: Vec<Option<Rgb>>,
}

impl PixelSprite {
    #[cfg(test)]
    pub(crate) fn transparent(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width * height],
        }
    }

    pub(crate) fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![Some(color); width * height],
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Transparent and out-of-range cells both read as `None`.
    pub(crate) fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        self.index(x, y).and_then(|index| self.pixels[index])
    }

    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, color: Option<Rgb>) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.pixels[index] = color;
                true
            }
            None => false,
        }
    }

    pub(crate) fn fill(&mut self, color: Rgb) {
        self.pixels.iter_mut().for_each(|cell| *cell = Some(color));
    }

    #[cfg(test)]
    pub(crate) fn painted_count(&self) -> usize {
        self.pixels.iter().filter(|cell| cell.is_some()).count()
    }
}

/// On-disk form of one sprite: nested rows, each cell `[r, g, b]` or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SpriteRecord {
    width: usize,
    height: usize,
    pixels: Vec<Vec<Option<Rgb>>>,
}

impl From<&PixelSprite> for SpriteRecord {
    fn from(sprite: &PixelSprite) -> Self {
        let pixels = if sprite.width == 0 {
            vec![Vec::new(); sprite.height]
        } else {
            sprite
                .pixels
                .chunks(sprite.width)
                .map(<[Option<Rgb>]>::to_vec)
                .collect()
        };
        Self {
            width: sprite.width,
            height: sprite.height,
            pixels,
        }
    }
}

impl SpriteRecord {
    fn into_sprite(self, key: &str) -> Result<PixelSprite, SpriteFileError> {
        // The designer only edits the fixed grid.
        if self.width != SPRITE_SIZE || self.height != SPRITE_SIZE {
            return Err(SpriteFileError::Shape {
                key: key.to_string(),
                reason: format!(
                    "size {}x{} is not {SPRITE_SIZE}x{SPRITE_SIZE}",
                    self.width, self.height
                ),
            });
        }
        if self.pixels.len() != self.height {
            return Err(SpriteFileError::Shape {
                key: key.to_string(),
                reason: format!("{} rows for height {}", self.pixels.len(), self.height),
            });
        }
        if let Some((row, cells)) = self
            .pixels
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != self.width)
        {
            return Err(SpriteFileError::Shape {
                key: key.to_string(),
                reason: format!("row {row} has {} cells for width {}", cells.len(), self.width),
            });
        }

        Ok(PixelSprite {
            width: self.width,
            height: self.height,
            pixels: self.pixels.into_iter().flatten().collect(),
        })
    }
}

type SpriteFile = BTreeMap<String, SpriteRecord>;

#[derive(Debug, Error)]
pub(crate) enum SpriteFileError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("sprite '{key}' is malformed: {reason}")]
    Shape { key: String, reason: String },
}

/// Custom sprites per item kind, backed by one JSON file.
///
/// `revision` changes on every mutation or reload so derived data (the render
/// cache) can tell when to rebuild.
#[derive(Debug)]
pub(crate) struct SpriteStore {
    path: PathBuf,
    sprites: BTreeMap<ItemKind, PixelSprite>,
    revision: u64,
}

impl SpriteStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            sprites: BTreeMap::new(),
            revision: 0,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn len(&self) -> usize {
        self.sprites.len()
    }

    pub(crate) fn get(&self, kind: ItemKind) -> Option<&PixelSprite> {
        self.sprites.get(&kind)
    }

    pub(crate) fn set(&mut self, kind: ItemKind, sprite: PixelSprite) {
        self.sprites.insert(kind, sprite);
        self.bump_revision();
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn save(&self) -> Result<(), SpriteFileError> {
        let file: SpriteFile = self
            .sprites
            .iter()
            .map(|(kind, sprite)| (kind.as_key().to_string(), SpriteRecord::from(sprite)))
            .collect();
        write_json_atomic(&self.path, &file)?;
        info!(path = %self.path.display(), sprite_count = file.len(), "sprites_saved");
        Ok(())
    }

    /// Replaces the in-memory sprites with the file's. A missing file empties
    /// the store. On error nothing changes.
    pub(crate) fn load(&mut self) -> Result<usize, SpriteFileError> {
        let loaded = match read_json_if_exists::<SpriteFile>(&self.path)? {
            Some(file) => decode_sprite_file(file)?,
            None => BTreeMap::new(),
        };
        self.sprites = loaded;
        self.bump_revision();
        info!(
            path = %self.path.display(),
            sprite_count = self.sprites.len(),
            "sprites_loaded"
        );
        Ok(self.sprites.len())
    }
}

fn decode_sprite_file(
    file: SpriteFile,
) -> Result<BTreeMap<ItemKind, PixelSprite>, SpriteFileError> {
    let mut sprites = BTreeMap::new();
    for (key, record) in file {
        let Some(kind) = ItemKind::from_key(&key) else {
            warn!(key = key.as_str(), "sprite_key_unknown_skipped");
            continue;
        };
        let sprite = record.into_sprite(&key)?;
        sprites.insert(kind, sprite);
    }
    Ok(sprites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> SpriteStore {
        SpriteStore::new(temp.path().join("sprites.json"))
    }

    #[test]
    fn sprite_pixels_are_bounds_checked() {
        let mut sprite = PixelSprite::transparent(4, 2);
        assert!(sprite.set_pixel(3, 1, Some([1, 2, 3])));
        assert!(!sprite.set_pixel(4, 0, Some([1, 2, 3])));
        assert_eq!(sprite.pixel(3, 1), Some([1, 2, 3]));
        assert_eq!(sprite.pixel(9, 9), None);
        assert_eq!(sprite.painted_count(), 1);
    }

    #[test]
    fn load_without_file_yields_empty_store() {
        let temp = TempDir::new().expect("temp");
        let mut store = store_in(&temp);
        store.set(ItemKind::Bush, PixelSprite::filled(2, 2, [0, 255, 0]));

        assert_eq!(store.load().expect("load"), 0);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn save_then_load_reproduces_sprites() {
        let temp = TempDir::new().expect("temp");
        let mut store = store_in(&temp);
        let mut bush = PixelSprite::transparent(SPRITE_SIZE, SPRITE_SIZE);
        bush.set_pixel(0, 0, Some([34, 139, 34]));
        bush.set_pixel(31, 5, Some([255, 255, 255]));
        store.set(ItemKind::Bush, bush.clone());
        let stone = PixelSprite::filled(SPRITE_SIZE, SPRITE_SIZE, [128, 128, 128]);
        store.set(ItemKind::Stone, stone.clone());
        store.save().expect("save");

        let mut reloaded = store_in(&temp);
        assert_eq!(reloaded.load().expect("load"), 2);
        assert_eq!(reloaded.get(ItemKind::Bush), Some(&bush));
        assert_eq!(reloaded.get(ItemKind::Stone), Some(&stone));
        assert_eq!(reloaded.get(ItemKind::PlayerStart), None);
    }

    #[test]
    fn file_layout_is_keyed_rows_of_cells() {
        let temp = TempDir::new().expect("temp");
        let mut store = store_in(&temp);
        let mut sprite = PixelSprite::transparent(2, 1);
        sprite.set_pixel(1, 0, Some([9, 8, 7]));
        store.set(ItemKind::PlayerStart, sprite);
        store.save().expect("save");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).expect("read")).expect("json");
        assert_eq!(
            raw["player_start"],
            serde_json::json!({"width": 2, "height": 1, "pixels": [[null, [9, 8, 7]]]})
        );
    }

    #[test]
    fn unknown_kind_keys_are_skipped() {
        let temp = TempDir::new().expect("temp");
        let mut store = store_in(&temp);
        store.set(
            ItemKind::Bush,
            PixelSprite::filled(SPRITE_SIZE, SPRITE_SIZE, [1, 2, 3]),
        );
        store.save().expect("save");
        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).expect("read")).expect("json");
        raw["tree"] = raw["bush"].clone();
        fs::write(store.path(), raw.to_string()).expect("write");

        let mut store = store_in(&temp);
        assert_eq!(store.load().expect("load"), 1);
        assert_eq!(
            store.get(ItemKind::Bush).and_then(|sprite| sprite.pixel(0, 0)),
            Some([1, 2, 3])
        );
    }

    #[test]
    fn malformed_sprite_fails_and_keeps_previous_state() {
        let temp = TempDir::new().expect("temp");
        let mut store = store_in(&temp);
        store.set(ItemKind::Stone, PixelSprite::filled(1, 1, [5, 5, 5]));
        let revision = store.revision();
        fs::write(
            store.path(),
            r#"{"bush": {"width": 32, "height": 32, "pixels": [[null]]}}"#,
        )
        .expect("write");

        let error = store.load().expect_err("bad row");
        assert!(matches!(error, SpriteFileError::Shape { .. }));
        assert!(store.get(ItemKind::Stone).is_some());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn sprite_larger_than_design_grid_is_rejected() {
        let temp = TempDir::new().expect("temp");
        let mut store = store_in(&temp);
        let rows = vec![vec![serde_json::Value::Null; 64]; 64];
        let file = serde_json::json!({"bush": {"width": 64, "height": 64, "pixels": rows}});
        fs::write(store.path(), file.to_string()).expect("write");

        let error = store.load().expect_err("oversized");
        assert!(error.to_string().contains("64x64"), "{error}");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn every_mutation_bumps_revision() {
        let temp = TempDir::new().expect("temp");
        let mut store = store_in(&temp);
        let start = store.revision();
        store.set(ItemKind::Bush, PixelSprite::transparent(1, 1));
        assert_eq!(store.revision(), start + 1);
        store.load().expect("load");
        assert_eq!(store.revision(), start + 2);
    }
}
