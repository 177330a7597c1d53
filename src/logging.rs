//! File logging.
//!
//! The terminal belongs to the viewer, so log output goes to a file named
//! `seqring-<random>.log`. `RUST_LOG` overrides the level given on the
//! command line.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// A fresh log file name.
pub fn log_file_name() -> String {
    format!("seqring-{:08x}.log", rand::random::<u32>())
}

/// Creates a new log file in `dir`.
pub fn open_log_file(dir: &Path) -> io::Result<(PathBuf, File)> {
    let path = dir.join(log_file_name());
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Installs the global subscriber writing to a new file in `dir`.
///
/// Returns the path of the log file.
pub fn init(dir: &Path, level: &str) -> Result<PathBuf> {
    let (path, file) = open_log_file(dir)
        .with_context(|| format!("cannot create log file in {}", dir.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("cannot install logger: {e}"))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name_shape() {
        let name = log_file_name();
        assert!(name.starts_with("seqring-"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "seqring-".len() + 8 + ".log".len());
    }

    #[test]
    fn test_open_log_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _file) = open_log_file(dir.path()).unwrap();
        assert!(path.exists());
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn test_open_log_file_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(open_log_file(&missing).is_err());
    }
}
