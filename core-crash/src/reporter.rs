//! Durable crash record storage
//!
//! Records are written synchronously: the reporter runs inside a panic hook
//! where no executor can be relied on.

use crate::error::{CrashError, Result};
use crate::record::CrashRecord;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Upper bound on collision suffixes tried for one timestamp
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Writes one file per crash into an append-only directory.
#[derive(Debug, Clone)]
pub struct CrashReporter {
    crash_dir: PathBuf,
}

impl CrashReporter {
    pub fn new(crash_dir: impl Into<PathBuf>) -> Self {
        Self {
            crash_dir: crash_dir.into(),
        }
    }

    pub fn crash_dir(&self) -> &Path {
        &self.crash_dir
    }

    /// Persist `record`, returning the new file's path.
    ///
    /// Never overwrites: when a file with the same timestamp exists, a
    /// numeric suffix is appended so every crash gets a distinct name.
    pub fn write(&self, record: &CrashRecord) -> Result<PathBuf> {
        fs::create_dir_all(&self.crash_dir).map_err(|e| {
            CrashError::Directory(format!("{}: {}", self.crash_dir.display(), e))
        })?;

        let stem = record.file_stem();
        let body = record.render();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}.log", stem)
            } else {
                format!("{}_{}.log", stem, attempt)
            };
            let path = self.crash_dir.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Crash file name taken");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            file.write_all(body.as_bytes())?;
            file.sync_all()?;

            info!(path = %path.display(), "Crash log saved");
            return Ok(path);
        }

        Err(CrashError::Directory(format!(
            "no free crash file name for {} in {}",
            stem,
            self.crash_dir.display()
        )))
    }

    /// Crash files currently on disk, oldest first by name
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.crash_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("crash_") && n.ends_with(".log"))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}
