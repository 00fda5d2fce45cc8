use std::collections::BTreeMap;

use super::items::{definition_of, ItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tile {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) kind: ItemKind,
}

/// Sparse map state. Only occupied cells are stored; every stored coordinate
/// is inside `[0, width) x [0, height)` and each unique kind occupies at most
/// one cell, tracked by its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TileGrid {
    width: i32,
    height: i32,
    tile_size: i32,
    tiles: BTreeMap<(i32, i32), ItemKind>,
    unique_slots: BTreeMap<ItemKind, (i32, i32)>,
}

impl TileGrid {
    pub(crate) fn new(width: i32, height: i32, tile_size: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            tile_size: tile_size.max(1),
            tiles: BTreeMap::new(),
            unique_slots: BTreeMap::new(),
        }
    }

    pub(crate) fn width(&self) -> i32 {
        self.width
    }

    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub(crate) fn pixel_width(&self) -> i32 {
        self.width * self.tile_size
    }

    pub(crate) fn pixel_height(&self) -> i32 {
        self.height * self.tile_size
    }

    pub(crate) fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// Places `kind` at `(x, y)`, or erases the cell when `kind` is `None`.
    /// Returns `false` without touching anything when out of bounds.
    pub(crate) fn set(&mut self, x: i32, y: i32, kind: Option<ItemKind>) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }

        let cell = (x, y);
        if let Some(previous) = self.tiles.get(&cell).copied() {
            if Some(previous) != kind && definition_of(previous).unique {
                self.unique_slots.remove(&previous);
            }
        }

        match kind {
            Some(kind) => {
                if definition_of(kind).unique {
                    if let Some(evicted) = self.unique_slots.insert(kind, cell) {
                        if evicted != cell {
                            self.tiles.remove(&evicted);
                        }
                    }
                }
                self.tiles.insert(cell, kind);
            }
            None => {
                self.tiles.remove(&cell);
            }
        }
        true
    }

    pub(crate) fn get(&self, x: i32, y: i32) -> Option<Tile> {
        self.tiles
            .get(&(x, y))
            .map(|&kind| Tile { x, y, kind })
    }

    pub(crate) fn is_walkable(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.tiles
            .get(&(x, y))
            .map_or(true, |&kind| definition_of(kind).walkable)
    }

    pub(crate) fn player_start(&self) -> Option<(i32, i32)> {
        self.unique_slots.get(&ItemKind::PlayerStart).copied()
    }

    /// Occupied cells in row-major `(x, y)` key order.
    pub(crate) fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles
            .iter()
            .map(|(&(x, y), &kind)| Tile { x, y, kind })
    }

    pub(crate) fn occupied_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tile containing a world pixel, if that tile is on the map.
    pub(crate) fn tile_at_pixel(&self, world_px: (i32, i32)) -> Option<(i32, i32)> {
        let x = world_px.0.div_euclid(self.tile_size);
        let y = world_px.1.div_euclid(self.tile_size);
        self.in_bounds(x, y).then_some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::new(10, 8, 32)
    }

    #[test]
    fn out_of_bounds_set_is_rejected_without_mutation() {
        let mut grid = grid();
        grid.set(1, 1, Some(ItemKind::Bush));
        let before = grid.clone();

        for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 8), (i32::MAX, i32::MIN)] {
            assert!(!grid.set(x, y, Some(ItemKind::Stone)), "({x}, {y})");
            assert!(!grid.set(x, y, None));
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn placing_unique_kind_evicts_previous_cell() {
        let mut grid = grid();
        assert!(grid.set(1, 1, Some(ItemKind::PlayerStart)));
        assert!(grid.set(4, 5, Some(ItemKind::PlayerStart)));

        assert_eq!(grid.get(1, 1), None);
        assert_eq!(grid.player_start(), Some((4, 5)));
        let starts = grid
            .tiles()
            .filter(|tile| tile.kind == ItemKind::PlayerStart)
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn replacing_unique_in_place_keeps_slot() {
        let mut grid = grid();
        grid.set(2, 2, Some(ItemKind::PlayerStart));
        grid.set(2, 2, Some(ItemKind::PlayerStart));
        assert_eq!(grid.player_start(), Some((2, 2)));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn erasing_or_overwriting_unique_cell_clears_slot() {
        let mut grid = grid();
        grid.set(3, 3, Some(ItemKind::PlayerStart));
        grid.set(3, 3, None);
        assert_eq!(grid.player_start(), None);

        grid.set(3, 3, Some(ItemKind::PlayerStart));
        grid.set(3, 3, Some(ItemKind::Stone));
        assert_eq!(grid.player_start(), None);
        assert_eq!(grid.get(3, 3).map(|tile| tile.kind), Some(ItemKind::Stone));
    }

    #[test]
    fn walkability_follows_catalog_and_bounds() {
        let mut grid = grid();
        grid.set(0, 0, Some(ItemKind::Stone));
        grid.set(1, 0, Some(ItemKind::Bush));
        grid.set(2, 0, Some(ItemKind::PlayerStart));

        assert!(!grid.is_walkable(0, 0));
        assert!(grid.is_walkable(1, 0));
        assert!(grid.is_walkable(2, 0));
        assert!(grid.is_walkable(3, 0));
        assert!(!grid.is_walkable(-1, 0));
        assert!(!grid.is_walkable(10, 7));
    }

    #[test]
    fn tile_at_pixel_floors_and_bounds_checks() {
        let grid = grid();
        assert_eq!(grid.tile_at_pixel((0, 0)), Some((0, 0)));
        assert_eq!(grid.tile_at_pixel((63, 95)), Some((1, 2)));
        assert_eq!(grid.tile_at_pixel((-1, 5)), None);
        assert_eq!(grid.tile_at_pixel((grid.pixel_width(), 0)), None);
    }
}
