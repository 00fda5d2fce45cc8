mod config;
mod items;
mod layout;
mod map_file;
mod messages;
mod pixel_canvas;
mod pixel_panel;
mod player;
mod shell;
mod sprite_cache;
mod sprites;
mod tile_grid;

pub(crate) use config::{EditorConfig, MAX_MAP_SIDE};
pub(crate) use shell::EditorShell;
