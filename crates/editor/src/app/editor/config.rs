use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_MAP_WIDTH: i32 = 50;
pub(crate) const DEFAULT_MAP_HEIGHT: i32 = 50;
pub(crate) const DEFAULT_TILE_SIZE: i32 = 32;
/// Largest map side, in tiles, accepted from the environment or a map file.
pub(crate) const MAX_MAP_SIDE: i32 = 1000;
pub(crate) const MAX_TILE_SIZE: i32 = 256;
pub(crate) const MAP_FILE_NAME: &str = "map_save.json";
pub(crate) const SPRITE_FILE_NAME: &str = "sprites.json";

/// Everything the editor shell needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EditorConfig {
    pub(crate) map_width: i32,
    pub(crate) map_height: i32,
    pub(crate) tile_size: i32,
    pub(crate) map_path: PathBuf,
    pub(crate) sprite_path: PathBuf,
    pub(crate) window_size: (u32, u32),
}

impl EditorConfig {
    pub(crate) fn in_data_dir(data_dir: &Path, window_size: (u32, u32)) -> Self {
        Self {
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
            tile_size: DEFAULT_TILE_SIZE,
            map_path: data_dir.join(MAP_FILE_NAME),
            sprite_path: data_dir.join(SPRITE_FILE_NAME),
            window_size,
        }
    }

    pub(crate) fn with_map_size(mut self, (width, height): (i32, i32)) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    /// File name shown in status messages.
    pub(crate) fn map_file_label(&self) -> String {
        self.map_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.map_path.display().to_string())
    }
}
