use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod persist;

pub use app::{
    rgb, run_app, screen_to_world_px, with_alpha, world_to_screen_px, AppError, Camera2D,
    DrawSurface, FrameCanvas, InputAction, InputSnapshot, KeyCommand, LoopConfig, Rect, Renderer,
    Rgba, RgbaImage, Scene, SceneCommand, Vec2, Viewport, GLYPH_ADVANCE_PX, LINE_HEIGHT_PX,
};
pub use persist::{read_json_if_exists, write_json_atomic, PersistError};

pub const ROOT_ENV_VAR: &str = "BUSHED_ROOT";
const DATA_DIR_NAME: &str = "saves";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to create data directory at {path}: {source}")]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "BUSHED_ROOT is set but does not point to an existing directory: {path}\n\
Unset it to fall back to the project root or the current directory."
    )]
    InvalidEnvRoot { path: PathBuf },
}

/// Resolves where map and sprite files live.
///
/// Order: `$BUSHED_ROOT`, then the nearest ancestor of the executable that
/// looks like this workspace, then the current directory. The data directory
/// is created if missing.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    app_paths_for_root(root)
}

pub fn app_paths_for_root(root: PathBuf) -> Result<AppPaths, StartupError> {
    let data_dir = root.join(DATA_DIR_NAME);
    fs::create_dir_all(&data_dir).map_err(|source| StartupError::CreateDataDir {
        path: data_dir.clone(),
        source,
    })?;
    Ok(AppPaths { root, data_dir })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if normalized.is_dir() {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            if let Some(root) = env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().and_then(find_repo_root))
            {
                return Ok(root);
            }
            let cwd = env::current_dir().map_err(StartupError::CurrentDir)?;
            Ok(normalize_path(&cwd))
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file() && path.join("crates").is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
