// CloudNav platform paths for Linux
// Config: ~/.config/cloudnav
// Data:   ~/.local/share/cloudnav

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Uses `$XDG_CONFIG_HOME/cloudnav` if set, otherwise `~/.config/cloudnav`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("cloudnav"),
        Err(_) => home_dir().join(".config").join("cloudnav"),
    }
}

/// Uses `$XDG_DATA_HOME/cloudnav` if set, otherwise `~/.local/share/cloudnav`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) => PathBuf::from(xdg).join("cloudnav"),
        Err(_) => home_dir().join(".local").join("share").join("cloudnav"),
    }
}
