//! Where the gallery keeps its settings, logs and rendered frames.
//!
//! Everything lives under one `.mlgallery` folder inside the OS config
//! directory. `MLGALLERY_CONFIG_HOME` replaces the OS config directory, which
//! keeps tests and portable installs self-contained.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

use directories::BaseDirs;
use thiserror::Error;

pub const APP_DIR_NAME: &str = ".mlgallery";
pub const CONFIG_HOME_ENV: &str = "MLGALLERY_CONFIG_HOME";

static CONFIG_BASE_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.mlgallery` directory, created on demand.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    ensure_dir(base.join(APP_DIR_NAME))
}

pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join("logs"))
}

/// Default destination for rendered frames when the settings name none.
pub fn frames_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join("frames"))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn config_base_dir() -> Option<PathBuf> {
    if let Some(path) = CONFIG_BASE_OVERRIDE
        .lock()
        .ok()
        .and_then(|guard| guard.clone())
    {
        return Some(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_HOME_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Route every directory helper to `base` for the rest of the process.
pub fn set_config_base_override(path: impl AsRef<Path>) {
    if let Ok(mut guard) = CONFIG_BASE_OVERRIDE.lock() {
        *guard = Some(path.as_ref().to_path_buf());
    }
}

pub fn clear_config_base_override() {
    if let Ok(mut guard) = CONFIG_BASE_OVERRIDE.lock() {
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct OverrideGuard;

    impl OverrideGuard {
        fn set(path: &Path) -> Self {
            set_config_base_override(path);
            Self
        }
    }

    impl Drop for OverrideGuard {
        fn drop(&mut self) {
            clear_config_base_override();
        }
    }

    #[test]
    fn override_anchors_all_directories() {
        let base = tempdir().unwrap();
        let _guard = OverrideGuard::set(base.path());
        let root = app_root_dir().unwrap();
        assert_eq!(root, base.path().join(APP_DIR_NAME));
        assert_eq!(logs_dir().unwrap(), root.join("logs"));
        assert!(frames_dir().unwrap().is_dir());
    }
}
