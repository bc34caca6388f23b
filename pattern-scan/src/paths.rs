//! Config path resolution.
//!
//! | Platform | Config file |
//! |----------|-------------|
//! | Linux | `~/.config/pattern-scan/config.json5` |
//! | macOS | `~/Library/Application Support/pattern-scan/config.json5` |
//! | Windows | `%APPDATA%\pattern-scan\config.json5` |

use std::path::PathBuf;

/// Application name used in directory paths
const APP_NAME: &str = "pattern-scan";

const CONFIG_FILE_NAME: &str = "config.json5";

/// Get the configuration directory.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .unwrap_or_else(fallback_base_dir)
}

/// Path of the settings file used when `--config` is not given.
pub fn get_default_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE_NAME)
}

/// Fallback base directory when platform dirs are unavailable.
///
/// Tries in order:
/// 1. `~/.pattern-scan/` (home directory)
/// 2. `./.pattern-scan/` (current working directory)
fn fallback_base_dir() -> PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".pattern-scan"))
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".pattern-scan")
        })
}
