//! Session state persistence for resume support.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};

/// Hex SHA-1 of the source URL; keys the session file name.
fn session_key(source_url: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(source_url.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in &digest {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

/// On-disk list of page links that still need downloading.
///
/// One store per source URL. The file sits in the download directory as
/// `.download_state_<sha1>.json` and holds a JSON array of page links; it
/// is rewritten after every successful download so an interrupted run
/// resumes with exactly the remaining work. Saves go through a temp file
/// and rename, so a crash never leaves a half-written state file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates the store for `source_url`, placing the file in `download_dir`.
    #[must_use]
    pub fn for_url(download_dir: &Path, source_url: &str) -> Self {
        let file_name = format!(".download_state_{}.json", session_key(source_url));
        Self {
            path: download_dir.join(file_name),
        }
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a session file exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the pending links from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse as a
    /// JSON array of strings. Callers treat both the same way: discard the
    /// session and start a fresh scrape.
    pub fn load(&self) -> crate::Result<Vec<String>> {
        let contents = std::fs::read_to_string(&self.path)?;
        let links = serde_json::from_str(&contents)?;
        Ok(links)
    }

    /// Writes the pending links to disk atomically (write tmp + rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the download directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self, links: &[String]) -> crate::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(links)?;
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Removes the session file. Missing files are fine.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn delete(&self) -> crate::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn session_key_is_sha1_hex() {
        assert_eq!(
            session_key("https://example.com/page"),
            "bf705e83e05bb9736592cc7742ef98c6f0afd988",
        );
    }

    #[test]
    fn file_name_embeds_key() {
        let store = SessionStore::for_url(Path::new("/dl"), "https://example.com/page");
        assert_eq!(
            store.path(),
            Path::new("/dl/.download_state_bf705e83e05bb9736592cc7742ef98c6f0afd988.json"),
        );
    }

    #[test]
    fn distinct_urls_get_distinct_files() {
        let dir = Path::new("/dl");
        let a = SessionStore::for_url(dir, "https://example.com/a");
        let b = SessionStore::for_url(dir, "https://example.com/b");
        assert_ne!(a.path(), b.path());

        let a_again = SessionStore::for_url(dir, "https://example.com/a");
        assert_eq!(a.path(), a_again.path());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");

        let pending = links(&["https://host/a", "https://host/b", "https://host/c"]);
        store.save(&pending).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), pending);
    }

    #[test]
    fn save_writes_pretty_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");
        store.save(&links(&["https://host/a"])).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with('['));
        assert!(contents.contains("\n  \"https://host/a\""));
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");

        store.save(&links(&["https://host/a", "https://host/b"])).unwrap();
        store.save(&links(&["https://host/b"])).unwrap();
        assert_eq!(store.load().unwrap(), links(&["https://host/b"]));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");
        store.save(&links(&["https://host/a"])).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("down");
        let store = SessionStore::for_url(&nested, "https://example.com/page");

        store.save(&links(&["https://host/a"])).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");
        assert!(!store.exists());
        assert!(store.load().is_err());
    }

    #[test]
    fn load_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn load_empty_array_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");
        std::fs::write(store.path(), "[]").unwrap();
        assert_eq!(store.load().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::for_url(dir.path(), "https://example.com/page");

        store.save(&links(&["https://host/a"])).unwrap();
        store.delete().unwrap();
        assert!(!store.exists());
        store.delete().unwrap();
    }
}
