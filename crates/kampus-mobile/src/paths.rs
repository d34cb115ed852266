//! Mobile filesystem path helpers.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const SHELL_STORE_FILE: &str = "kampus-shell.json";

static KAMPUS_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Writable app data directory for the shell.
#[must_use]
pub fn kampus_data_dir() -> PathBuf {
    KAMPUS_DATA_DIR.get_or_init(resolve_kampus_data_dir).clone()
}

/// File backing the shell's key-value store (first-launch flag).
#[must_use]
pub fn shell_store_path() -> PathBuf {
    kampus_data_dir().join(SHELL_STORE_FILE)
}

/// Prefer `base` (the app's private files directory) for the data directory.
///
/// No effect once the directory has been resolved or when `base` is not
/// writable.
pub fn seed_data_dir(base: &Path) {
    if let Some(selected) = first_writable(vec![base.to_path_buf()]) {
        let _ = KAMPUS_DATA_DIR.set(selected);
    }
}

fn resolve_kampus_data_dir() -> PathBuf {
    let selected = first_writable(candidate_base_dirs())
        .unwrap_or_else(|| std::env::temp_dir().join("kampus"));

    tracing::info!("Resolved mobile data directory: {}", selected.display());
    selected
}

fn first_writable(bases: Vec<PathBuf>) -> Option<PathBuf> {
    bases
        .into_iter()
        .map(|base| base.join("kampus"))
        .find(|candidate| ensure_writable_dir(candidate))
}

fn candidate_base_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = std::env::var_os("KAMPUS_DATA_DIR").map(PathBuf::from) {
        candidates.push(path);
    }
    if let Some(path) = dirs::data_local_dir() {
        candidates.push(path);
    }
    if let Some(path) = dirs::data_dir() {
        candidates.push(path);
    }
    if let Some(path) = std::env::var_os("HOME").map(PathBuf::from) {
        candidates.push(path);
    }
    if let Some(path) = std::env::var_os("TMPDIR").map(PathBuf::from) {
        candidates.push(path);
    }
    candidates.push(std::env::temp_dir());
    candidates
}

fn ensure_writable_dir(path: &Path) -> bool {
    if std::fs::create_dir_all(path).is_err() {
        return false;
    }

    let test_file = path.join(".kampus-write-test");
    let Ok(mut file) = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&test_file)
    else {
        return false;
    };

    if file.write_all(b"ok").is_err() {
        let _ = std::fs::remove_file(&test_file);
        return false;
    }

    let _ = std::fs::remove_file(test_file);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_writable_skips_unusable_bases() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let selected = first_writable(vec![blocker, dir.path().to_path_buf()]).unwrap();
        assert_eq!(selected, dir.path().join("kampus"));
        assert!(selected.is_dir());
    }

    #[test]
    fn seeded_base_becomes_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        seed_data_dir(dir.path());

        assert_eq!(kampus_data_dir(), dir.path().join("kampus"));
        assert_eq!(
            shell_store_path(),
            dir.path().join("kampus").join("kampus-shell.json")
        );
    }

    #[test]
    fn first_writable_leaves_no_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let selected = first_writable(vec![dir.path().to_path_buf()]).unwrap();

        assert!(!selected.join(".kampus-write-test").exists());
    }
}
