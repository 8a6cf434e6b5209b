// Content path utilities.
// Resolves where a user-supplied content file lives when none is configured.

use std::path::PathBuf;

use directories::ProjectDirs;

/// File name of the content document.
pub const CONTENT_FILE: &str = "learning_content.json";

/// Get the base data directory (~/.local/share/zoomdocs on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "zoomdocs").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Default path of the content document.
pub fn default_content_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join(CONTENT_FILE))
}

/// Default content path, only if the file is present.
pub fn existing_content_path() -> Option<PathBuf> {
    default_content_path().filter(|path| path.is_file())
}
