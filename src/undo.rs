/// Undo functionality for reverting a cleanup.
///
/// Records are replayed in the order they were written, each one moving a
/// file from its bucket back to where it was. Bucket directories left empty
/// afterwards are removed and the log is deleted.
use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::history::{MoveRecord, TransactionLog};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Represents the result of an undo operation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Records that could not be restored, keyed by their recorded new path.
    pub skipped_files: Vec<(PathBuf, String)>,
    /// Log lines that were not valid records.
    pub malformed_lines: usize,
    /// Bucket directories removed because they ended up empty.
    pub removed_dirs: Vec<PathBuf>,
}

impl UndoReport {
    /// Returns the total number of records processed.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.skipped_files.len()
    }

    /// Returns true if every line of the log was restored.
    pub fn is_complete_success(&self) -> bool {
        self.skipped_files.is_empty() && self.malformed_lines == 0
    }
}

/// What `undo` found and did.
#[derive(Debug)]
pub enum UndoOutcome {
    /// There was no log to replay.
    NothingToUndo,
    Completed(UndoReport),
}

impl UndoOutcome {
    pub fn restored_files(&self) -> usize {
        match self {
            Self::NothingToUndo => 0,
            Self::Completed(report) => report.restored_files,
        }
    }
}

/// Manages undo operations for cleanups.
pub struct UndoManager;

impl UndoManager {
    /// Reverts the most recent cleanup of `base_path`.
    ///
    /// A missing or unreadable log is not an error; it is reported as
    /// nothing to undo and left untouched. Records that cannot be restored (file
    /// gone, original location occupied, I/O failure) are skipped and listed
    /// in the report. The log is deleted whether or not every record was
    /// restored.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidy::undo::{UndoManager, UndoOutcome};
    /// use std::path::Path;
    ///
    /// match UndoManager::undo(Path::new("/path/to/directory"), ".tidy_history") {
    ///     Ok(UndoOutcome::NothingToUndo) => println!("Nothing to undo"),
    ///     Ok(UndoOutcome::Completed(report)) => println!("Restored {}", report.restored_files),
    ///     Err(e) => eprintln!("Undo failed: {}", e),
    /// }
    /// ```
    pub fn undo(base_path: &Path, history_file: &str) -> OrganizeResult<UndoOutcome> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "not an existing directory"),
            });
        }

        let history_path = base_path.join(history_file);
        let log = match TransactionLog::load(&history_path) {
            Ok(Some(log)) => log,
            Ok(None) => {
                info!(log = %history_path.display(), "no history found");
                return Ok(UndoOutcome::NothingToUndo);
            }
            // An unreadable log is left in place and treated as no history.
            Err(e) => {
                warn!(log = %history_path.display(), error = %e, "history is not readable");
                return Ok(UndoOutcome::NothingToUndo);
            }
        };

        let mut report = UndoReport {
            malformed_lines: log.malformed,
            ..Default::default()
        };
        let mut touched_dirs = BTreeSet::new();

        for record in &log.records {
            match Self::restore_file(base_path, record) {
                Ok(()) => {
                    report.restored_files += 1;
                    if let Some(parent) = record.new_path.parent()
                        && !parent.as_os_str().is_empty()
                    {
                        touched_dirs.insert(base_path.join(parent));
                    }
                }
                Err(reason) => {
                    debug!(file = %record.new_path.display(), %reason, "skipping record");
                    report.skipped_files.push((record.new_path.clone(), reason));
                }
            }
        }

        // Single level only: nested directories inside a bucket are left alone.
        for dir in touched_dirs {
            if Self::remove_if_empty(&dir) {
                report.removed_dirs.push(dir);
            }
        }

        if let Err(e) = TransactionLog::delete(&history_path) {
            warn!(error = %e, "could not delete history file");
        }

        info!(
            restored = report.restored_files,
            skipped = report.skipped_files.len(),
            malformed = report.malformed_lines,
            "undo finished"
        );
        Ok(UndoOutcome::Completed(report))
    }

    /// Moves one file back to its original location.
    fn restore_file(base_path: &Path, record: &MoveRecord) -> Result<(), String> {
        if !is_contained(&record.original_path) || !is_contained(&record.new_path) {
            return Err("Path leaves the organized directory".to_string());
        }

        let current = base_path.join(&record.new_path);
        let original = base_path.join(&record.original_path);

        if current.symlink_metadata().is_err() {
            return Err("File not found at expected location".to_string());
        }
        if original.symlink_metadata().is_ok() {
            return Err("Original location is already taken".to_string());
        }

        fs::rename(&current, &original).map_err(|e| format!("Failed to restore file: {}", e))
    }

    fn remove_if_empty(dir: &Path) -> bool {
        match fs::read_dir(dir) {
            Ok(mut entries) => entries.next().is_none() && fs::remove_dir(dir).is_ok(),
            Err(_) => false,
        }
    }
}

/// True for non-empty relative paths made only of plain components.
fn is_contained(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}
