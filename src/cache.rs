//! Simple cache to remember the last opened transcript file per backend.
//!
//! Files are stored under `.cache/` using a hash of the server URL as the
//! directory name to avoid filesystem issues. The format is a tiny TOML file
//! with a single `filename` field.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_DIR: &str = ".cache";

#[derive(serde::Serialize, serde::Deserialize)]
struct RecentEntry {
    filename: String,
}

/// Load the last opened output filename for a given backend, if present.
pub fn load_recent_file(server_url: &str) -> Option<String> {
    let path = recent_path(server_url);
    let data = fs::read_to_string(path).ok()?;
    let entry: RecentEntry = toml::from_str(&data).ok()?;
    Some(entry.filename)
}

/// Persist the last opened output filename. Errors are ignored to keep the
/// UI responsive.
pub fn save_recent_file(server_url: &str, filename: &str) {
    let path = recent_path(server_url);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let entry = RecentEntry {
        filename: filename.to_string(),
    };
    if let Ok(contents) = toml::to_string(&entry) {
        let _ = fs::write(path, contents);
    }
}

fn hash_dir(server_url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(server_url.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Path::new(CACHE_DIR).join(hash)
}

fn recent_path(server_url: &str) -> PathBuf {
    hash_dir(server_url).join("recent.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_dir_is_stable_per_server() {
        assert_eq!(hash_dir("http://a:5000"), hash_dir("http://a:5000"));
        assert_ne!(hash_dir("http://a:5000"), hash_dir("http://b:5000"));
    }
}
