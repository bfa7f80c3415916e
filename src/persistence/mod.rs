//! Saved progress and hi score
//!
//! Features:
//! - `SessionStore` trait so the session never touches a storage medium
//! - JSON file store with tmp-then-rename writes
//! - In-memory store for tests and headless runs
//! - Missing or unreadable data loads as defaults

use std::fmt;
use std::path::{Path, PathBuf};

use crate::sim::Progress;

/// Storage failure at the I/O edge
#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage i/o failed: {err}"),
            Self::Json(err) => write!(f, "save data is not valid json: {err}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Persistence collaborator
pub trait SessionStore {
    /// Read saved progress (implementations return defaults for never-written data)
    fn load(&self) -> Result<Progress, PersistenceError>;

    /// Write progress
    fn save(&mut self, progress: &Progress) -> Result<(), PersistenceError>;

    /// Load, falling back to defaults on any failure
    fn load_or_default(&self) -> Progress {
        match self.load() {
            Ok(progress) => progress,
            Err(err) => {
                log::warn!("Could not load saved progress ({err}); starting fresh");
                Progress::default()
            }
        }
    }
}

/// Progress kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Option<Progress>,
    /// Number of successful writes
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with progress
    pub fn with_progress(progress: Progress) -> Self {
        Self {
            saved: Some(progress),
            writes: 0,
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Progress, PersistenceError> {
        Ok(self.saved.unwrap_or_default())
    }

    fn save(&mut self, progress: &Progress) -> Result<(), PersistenceError> {
        self.saved = Some(*progress);
        self.writes += 1;
        Ok(())
    }
}

/// Progress stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Progress, PersistenceError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No save file at {}, using defaults", self.path.display());
                return Ok(Progress::default());
            }
            Err(err) => return Err(err.into()),
        };
        let progress = serde_json::from_str(&json)?;
        log::info!("Loaded progress from {}", self.path.display());
        Ok(progress)
    }

    fn save(&mut self, progress: &Progress) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(progress)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Progress saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("asteroids-sim-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_memory_store_defaults_then_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), Progress::default());

        let progress = Progress {
            score: 1200,
            level: 3,
            lives: 1,
            hi_score: 5000,
        };
        store.save(&progress).unwrap();
        assert_eq!(store.load().unwrap(), progress);
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let store = JsonFileStore::new(temp_file("missing.json"));
        let progress = store.load().unwrap();
        assert_eq!(progress.level, 1);
        assert_eq!(progress.lives, 3);
        assert_eq!(progress.score, 0);
    }

    #[test]
    fn test_file_store_persists() {
        let path = temp_file("persist.json");
        let mut store = JsonFileStore::new(&path);
        let progress = Progress {
            score: 40,
            level: 2,
            lives: 2,
            hi_score: 9000,
        };
        store.save(&progress).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), progress);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_file("partial.json");
        std::fs::write(&path, r#"{ "hi_score": 777 }"#).unwrap();
        let progress = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(progress.hi_score, 777);
        assert_eq!(progress.lives, 3);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let path = temp_file("corrupt.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(PersistenceError::Json(_))));
        assert_eq!(store.load_or_default(), Progress::default());
        std::fs::remove_file(path).unwrap();
    }
}
