// CloudNav platform paths for Windows
// Config and data: %APPDATA%/CloudNav

use std::env;
use std::path::PathBuf;

fn roaming_dir() -> PathBuf {
    match env::var("APPDATA") {
        Ok(appdata) => PathBuf::from(appdata).join("CloudNav"),
        Err(_) => {
            let profile = env::var("USERPROFILE").unwrap_or_else(|_| String::from("C:\\Users\\Default"));
            PathBuf::from(profile)
                .join("AppData")
                .join("Roaming")
                .join("CloudNav")
        }
    }
}

pub fn get_config_dir() -> PathBuf {
    roaming_dir()
}

pub fn get_data_dir() -> PathBuf {
    roaming_dir()
}
