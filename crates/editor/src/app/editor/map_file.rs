use std::path::Path;

use engine::{read_json_if_exists, write_json_atomic, PersistError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::config::{MAX_MAP_SIDE, MAX_TILE_SIZE};
use super::items::ItemKind;
use super::tile_grid::TileGrid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MapFile {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) tile_size: i32,
    pub(crate) tiles: Vec<MapTileEntry>,
    pub(crate) player_start: Option<[i32; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct MapTileEntry {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) item_type: ItemKind,
}

#[derive(Debug, Error)]
pub(crate) enum MapFileError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("invalid map dimensions {width}x{height} with tile size {tile_size}")]
    InvalidDimensions {
        width: i32,
        height: i32,
        tile_size: i32,
    },
    #[error("tile ({x}, {y}) lies outside the {width}x{height} map")]
    TileOutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

impl MapFile {
    pub(crate) fn from_grid(grid: &TileGrid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            tile_size: grid.tile_size(),
            tiles: grid
                .tiles()
                .map(|tile| MapTileEntry {
                    x: tile.x,
                    y: tile.y,
                    item_type: tile.kind,
                })
                .collect(),
            player_start: grid.player_start().map(|(x, y)| [x, y]),
        }
    }

    /// Rebuilds a grid through `TileGrid::set`, so a file can never produce a
    /// grid that breaks the bounds or unique-kind rules. Dimensions are capped
    /// so pixel extents stay well inside `i32`. The stored
    /// `player_start` is only cross-checked: the tiles are authoritative.
    pub(crate) fn into_grid(self) -> Result<TileGrid, MapFileError> {
        let sides = 1..=MAX_MAP_SIDE;
        if !sides.contains(&self.width)
            || !sides.contains(&self.height)
            || !(1..=MAX_TILE_SIZE).contains(&self.tile_size)
        {
            return Err(MapFileError::InvalidDimensions {
                width: self.width,
                height: self.height,
                tile_size: self.tile_size,
            });
        }

        let mut grid = TileGrid::new(self.width, self.height, self.tile_size);
        for entry in &self.tiles {
            if !grid.set(entry.x, entry.y, Some(entry.item_type)) {
                return Err(MapFileError::TileOutOfBounds {
                    x: entry.x,
                    y: entry.y,
                    width: self.width,
                    height: self.height,
                });
            }
        }

        let derived = grid.player_start().map(|(x, y)| [x, y]);
        if self.player_start != derived {
            warn!(
                stored = ?self.player_start,
                derived = ?derived,
                "map_player_start_mismatch"
            );
        }
        Ok(grid)
    }
}

pub(crate) fn save_map(path: &Path, grid: &TileGrid) -> Result<(), MapFileError> {
    write_json_atomic(path, &MapFile::from_grid(grid))?;
    info!(
        path = %path.display(),
        tile_count = grid.occupied_count(),
        "map_saved"
    );
    Ok(())
}

/// `Ok(None)` when no map has been saved yet.
pub(crate) fn load_map(path: &Path) -> Result<Option<TileGrid>, MapFileError> {
    let Some(file) = read_json_if_exists::<MapFile>(path)? else {
        return Ok(None);
    };
    let grid = file.into_grid()?;
    info!(
        path = %path.display(),
        tile_count = grid.occupied_count(),
        "map_loaded"
    );
    Ok(Some(grid))
}
