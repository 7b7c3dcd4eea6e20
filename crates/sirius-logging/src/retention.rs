use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};

use crate::config::LoggingConfig;
use crate::fs::log_dir;

const MAX_LOG_BYTES: u64 = 200 * 1024 * 1024;

struct LogFile {
    path: PathBuf,
    modified: SystemTime,
    size: u64,
}

/// Delete log files older than `keep_days`, then the oldest files until
/// the directory fits the size cap.
pub fn run_retention(root: &Path, cfg: &LoggingConfig) -> Result<()> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(
            cfg.keep_days.saturating_mul(24 * 60 * 60),
        ))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    prune(&log_dir(root), cutoff, MAX_LOG_BYTES)
}

fn prune(dir: &Path, cutoff: SystemTime, max_bytes: u64) -> Result<()> {
    let mut entries = collect_log_files(dir)?;

    entries.retain(|entry| {
        if entry.modified >= cutoff {
            return true;
        }
        match fs::remove_file(&entry.path) {
            Ok(()) => false,
            Err(err) => {
                tracing::warn!("Failed to remove old log {}: {}", entry.path.display(), err);
                true
            }
        }
    });

    let mut total_size: u64 = entries.iter().map(|e| e.size).sum();
    if total_size <= max_bytes {
        return Ok(());
    }
    entries.sort_by_key(|e| e.modified);
    for entry in entries {
        if total_size <= max_bytes {
            break;
        }
        if let Err(err) = fs::remove_file(&entry.path) {
            tracing::warn!(
                "Failed to remove log {} during size cap cleanup: {}",
                entry.path.display(),
                err
            );
            continue;
        }
        total_size = total_size.saturating_sub(entry.size);
    }
    Ok(())
}

fn collect_log_files(dir: &Path) -> Result<Vec<LogFile>> {
    let mut files = Vec::new();
    if !dir.exists() {
        return Ok(files);
    }

    let entries = fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("iterating {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_log_name(name) {
            continue;
        }

        let metadata = fs::metadata(&path).with_context(|| format!("stat {}", path.display()))?;
        files.push(LogFile {
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            size: metadata.len(),
            path,
        });
    }
    Ok(files)
}

/// Daily rolling appenders name files `<name>.log.<date>`
fn is_log_name(name: &str) -> bool {
    name.ends_with(".log") || name.contains(".log.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_logs_removed_other_files_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sap.log.2026-01-01"), b"old").unwrap();
        fs::write(dir.path().join("dfs.log"), b"old").unwrap();
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        let future = SystemTime::now() + Duration::from_secs(3600);
        prune(dir.path(), future, MAX_LOG_BYTES).unwrap();

        assert!(!dir.path().join("sap.log.2026-01-01").exists());
        assert!(!dir.path().join("dfs.log").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_size_cap_trims_until_under_limit() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.log", "b.log", "c.log"] {
            fs::write(dir.path().join(name), vec![0u8; 100]).unwrap();
        }

        prune(dir.path(), SystemTime::UNIX_EPOCH, 150).unwrap();

        let left = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(left, 1);
    }

    #[test]
    fn test_missing_dir_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_retention(&dir.path().join("nope"), &LoggingConfig::default()).is_ok());
    }
}
