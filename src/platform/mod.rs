// CloudNav platform paths
// Resolves where the config file and the SQLite cache live on each OS.
//
// Uses `cfg(target_os)` to pick the implementation at compile time.

use std::env;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Overrides the data directory when set.
pub const DATA_DIR_ENV: &str = "CLOUDNAV_DATA_DIR";
/// Overrides the config file path when set.
pub const CONFIG_PATH_ENV: &str = "CLOUDNAV_CONFIG";

/// Returns the platform-specific configuration directory for CloudNav.
///
/// - **Linux**: `~/.config/cloudnav` (or `$XDG_CONFIG_HOME/cloudnav`)
/// - **macOS**: `~/Library/Application Support/CloudNav`
/// - **Windows**: `%APPDATA%/CloudNav`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the data directory, honoring `CLOUDNAV_DATA_DIR`.
///
/// - **Linux**: `~/.local/share/cloudnav` (or `$XDG_DATA_HOME/cloudnav`)
/// - **macOS**: `~/Library/Application Support/CloudNav`
/// - **Windows**: `%APPDATA%/CloudNav`
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}

/// Path of the SQLite database holding the cache and sealed secrets.
pub fn get_database_path() -> PathBuf {
    get_data_dir().join("cloudnav.db")
}
