//! Persist the best score (XDG config or ~/.config/bagtris).

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

const FILENAME: &str = "highscore";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid high score {0:?}")]
    Parse(String),
    #[error("no config directory (HOME and XDG_CONFIG_HOME unset)")]
    NoConfigDir,
}

/// Single-value key/value store for the best score.
pub trait HighScoreStore {
    /// Stored value; `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<u32>, HighScoreError>;
    fn save(&mut self, score: u32) -> Result<(), HighScoreError>;
}

/// Returns the default path to the high score file (config dir / bagtris / highscore).
pub fn default_path() -> Result<PathBuf, HighScoreError> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .map_err(|_| HighScoreError::NoConfigDir)?,
    };
    Ok(base.join("bagtris").join(FILENAME))
}

/// Plain text file holding one integer.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> Result<Option<u32>, HighScoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let line = content.lines().next().unwrap_or("").trim();
        if line.is_empty() {
            return Ok(None);
        }
        line.parse::<u32>()
            .map(Some)
            .map_err(|_| HighScoreError::Parse(line.to_string()))
    }

    /// Creates the parent directory if needed.
    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{score}\n"))?;
        Ok(())
    }
}

/// In-memory store, used when no file location is available.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<u32>,
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<Option<u32>, HighScoreError> {
        Ok(self.value)
    }

    fn save(&mut self, score: u32) -> Result<(), HighScoreError> {
        self.value = Some(score);
        Ok(())
    }
}

/// Best score across sessions: read once at startup, written whenever beaten.
/// Storage faults are logged and play goes on with the in-memory value.
pub struct HighScore {
    best: u32,
    store: Box<dyn HighScoreStore>,
    write_failed: bool,
}

impl HighScore {
    pub fn load(store: Box<dyn HighScoreStore>) -> Self {
        let best = match store.load() {
            Ok(v) => v.unwrap_or(0),
            Err(e) => {
                log::warn!("could not read high score: {e}");
                0
            }
        };
        Self {
            best,
            store,
            write_failed: false,
        }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record `score`; returns true if it set a new best.
    pub fn observe(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = self.store.save(score) {
            if !self.write_failed {
                log::warn!("could not save high score: {e}");
            }
            self.write_failed = true;
        }
        true
    }
}

impl std::fmt::Debug for HighScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighScore")
            .field("best", &self.best)
            .field("write_failed", &self.write_failed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn load(&self) -> Result<Option<u32>, HighScoreError> {
            Err(HighScoreError::Parse("garbage".into()))
        }

        fn save(&mut self, _score: u32) -> Result<(), HighScoreError> {
            Err(std::io::Error::other("read-only").into())
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("bagtris-test-{}-{name}", std::process::id()))
            .join(FILENAME)
    }

    #[test]
    fn file_store_round_trip() {
        let path = temp_file("roundtrip");
        let mut store = FileStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
        store.save(1234).unwrap();
        assert_eq!(store.load().unwrap(), Some(1234));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1234\n");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_store_rejects_garbage() {
        let path = temp_file("garbage");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "lots\n").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.load(), Err(HighScoreError::Parse(_))));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn observe_only_writes_new_bests() {
        let mut hs = HighScore::load(Box::new(MemoryStore { value: Some(500) }));
        assert_eq!(hs.best(), 500);
        assert!(!hs.observe(400));
        assert!(!hs.observe(500));
        assert!(hs.observe(501));
        assert_eq!(hs.best(), 501);
    }

    #[test]
    fn broken_store_degrades_gracefully() {
        let mut hs = HighScore::load(Box::new(BrokenStore));
        assert_eq!(hs.best(), 0);
        assert!(hs.observe(10));
        assert!(hs.observe(20));
        assert_eq!(hs.best(), 20);
        assert!(hs.write_failed);
    }
}
