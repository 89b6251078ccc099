use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".trip_core";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const STORE_FILE: &str = "store.json";

/// Returns the application-specific data directory, defaulting to `~/.trip_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("TRIP_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Location of the key-value store that holds the expense list.
pub fn store_file_in(base: &Path) -> PathBuf {
    base.join(STORE_FILE)
}
