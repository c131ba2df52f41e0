//! Data directory layout
//!
//! Everything DevDiary writes lives under one data directory:
//! `diaries/` for exported diaries, `logs/` for log files, and the local
//! snippet database at the root.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::error::ConfigError;

const DIARIES_DIR: &str = "diaries";
const LOGS_DIR: &str = "logs";
const SUBDIRECTORIES: &[&str] = &[DIARIES_DIR, LOGS_DIR];

/// Owner read/write/execute only
#[cfg(unix)]
const DIR_PERMISSION_MODE: u32 = 0o700;

#[derive(Debug, Clone)]
pub struct DirectoryManager {
    data_dir: PathBuf,
}

impl DirectoryManager {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// `~/.devdiary`
    pub fn with_default_dir() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".devdiary");
        Self::new(data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn diaries_dir(&self) -> PathBuf {
        self.data_dir.join(DIARIES_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join(LOGS_DIR)
    }

    /// Local snippet database
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("snippets.db")
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    /// Creates the data directory and its subdirectories. Idempotent; existing
    /// directories get their permissions tightened on Unix.
    pub fn initialize(&self) -> Result<(), ConfigError> {
        Self::ensure_dir(&self.data_dir)?;
        for subdir in SUBDIRECTORIES {
            Self::ensure_dir(&self.data_dir.join(subdir))?;
        }

        tracing::info!(data_dir = %self.data_dir.display(), "Initialized data directory");
        Ok(())
    }

    fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            fs::create_dir_all(path)?;
            tracing::debug!(path = %path.display(), "Created directory");
        }

        #[cfg(unix)]
        fs::set_permissions(path, fs::Permissions::from_mode(DIR_PERMISSION_MODE))?;

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir.exists()
            && SUBDIRECTORIES
                .iter()
                .all(|subdir| self.data_dir.join(subdir).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let manager = DirectoryManager::new(PathBuf::from("/tmp/test-diary"));
        assert_eq!(manager.data_dir(), Path::new("/tmp/test-diary"));
        assert_eq!(manager.diaries_dir(), PathBuf::from("/tmp/test-diary/diaries"));
        assert_eq!(manager.logs_dir(), PathBuf::from("/tmp/test-diary/logs"));
        assert_eq!(
            manager.database_path(),
            PathBuf::from("/tmp/test-diary/snippets.db")
        );
        assert_eq!(
            manager.config_path(),
            PathBuf::from("/tmp/test-diary/config.toml")
        );
    }

    #[test]
    fn test_with_default_dir() {
        let manager = DirectoryManager::with_default_dir();
        assert!(manager.data_dir().ends_with(".devdiary"));
    }

    #[test]
    fn test_initialize_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join(".devdiary");
        let manager = DirectoryManager::new(data_dir.clone());

        assert!(!manager.is_initialized());
        manager.initialize().expect("initialize");

        assert!(data_dir.join("diaries").is_dir());
        assert!(data_dir.join("logs").is_dir());
        assert!(manager.is_initialized());
    }

    #[test]
    fn test_initialize_idempotent_with_partial_tree() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join(".devdiary");
        fs::create_dir_all(data_dir.join("diaries")).unwrap();

        let manager = DirectoryManager::new(data_dir.clone());
        assert!(!manager.is_initialized());

        manager.initialize().expect("first");
        manager.initialize().expect("second");
        assert!(manager.is_initialized());
    }

    #[cfg(unix)]
    #[test]
    fn test_initialize_sets_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join(".devdiary");
        let manager = DirectoryManager::new(data_dir.clone());
        manager.initialize().unwrap();

        for path in [data_dir.clone(), data_dir.join("diaries"), data_dir.join("logs")] {
            let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700, "{} should be 700", path.display());
        }
    }
}
