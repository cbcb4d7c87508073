use std::path::PathBuf;

const APP_DIR: &str = "mpv-remote";

/// Log file lives here.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(temp_dir)
        .join(APP_DIR)
}

/// `config.toml` lives here.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(temp_dir)
        .join(APP_DIR)
}

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}
