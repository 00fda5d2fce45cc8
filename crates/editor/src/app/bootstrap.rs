use engine::{resolve_app_paths, LoopConfig, Scene, StartupError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::editor::{EditorConfig, EditorShell, MAX_MAP_SIDE};

const MAP_SIZE_ENV_VAR: &str = "BUSHED_MAP_SIZE";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== BushAdvencher Editor Startup ===");

    let paths = resolve_app_paths()?;
    let config = LoopConfig::default();
    let mut editor_config = EditorConfig::in_data_dir(
        &paths.data_dir,
        (config.window_width, config.window_height),
    );
    if let Some(size) = map_size_from_env() {
        editor_config = editor_config.with_map_size(size);
    }
    info!(
        root = %paths.root.display(),
        data_dir = %paths.data_dir.display(),
        map_width = editor_config.map_width,
        map_height = editor_config.map_height,
        tile_size = editor_config.tile_size,
        "editor_config_resolved"
    );

    Ok(AppWiring {
        config,
        scene: Box::new(EditorShell::new(editor_config)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn map_size_from_env() -> Option<(i32, i32)> {
    let raw = std::env::var(MAP_SIZE_ENV_VAR).ok()?;
    let parsed = parse_map_size(&raw);
    if parsed.is_none() {
        warn!(var = MAP_SIZE_ENV_VAR, value = raw.as_str(), "map_size_env_ignored");
    }
    parsed
}

/// Accepts `WxH` (case-insensitive `x`, surrounding whitespace allowed).
fn parse_map_size(raw: &str) -> Option<(i32, i32)> {
    let (width, height) = raw.trim().split_once(['x', 'X'])?;
    let width = width.trim().parse::<i32>().ok()?;
    let height = height.trim().parse::<i32>().ok()?;
    let valid = 1..=MAX_MAP_SIDE;
    (valid.contains(&width) && valid.contains(&height)).then_some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_width_by_height() {
        assert_eq!(parse_map_size("80x40"), Some((80, 40)));
        assert_eq!(parse_map_size(" 12 X 9 "), Some((12, 9)));
    }

    #[test]
    fn rejects_malformed_or_out_of_range_sizes() {
        assert_eq!(parse_map_size(""), None);
        assert_eq!(parse_map_size("50"), None);
        assert_eq!(parse_map_size("0x10"), None);
        assert_eq!(parse_map_size("10x-3"), None);
        assert_eq!(parse_map_size("2000x10"), None);
        assert_eq!(parse_map_size("ax b"), None);
    }
}
