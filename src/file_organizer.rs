/// Moving files into bucket directories.
///
/// A cleanup run is split in two steps: planning scans the directory and
/// decides which files go where, and execution performs the moves, appending
/// one log record per successful move.
use crate::config::{ConfigError, ProtectedArtifacts, TidyConfig};
use crate::file_category::{BucketMapper, ExtensionFilter};
use crate::history::{DEFAULT_HISTORY_FILE, HistoryWriter, MoveRecord};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during file organization operations.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The base directory path is invalid or doesn't exist.
    #[error("Invalid base path {}: {source}", .path.display())]
    InvalidBasePath { path: PathBuf, source: io::Error },
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirFailed { path: PathBuf, source: io::Error },
    /// Failed to create a bucket directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Something is already sitting where the file would be moved.
    #[error("Destination already exists: {}", .path.display())]
    DestinationExists { path: PathBuf },
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    FileMoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The log could not be created; nothing was moved.
    #[error("Error recording history at {}: {source}", .path.display())]
    HistoryCreateFailed { path: PathBuf, source: io::Error },
    #[error("Failed to write history file: {source}")]
    HistoryWriteFailed { source: io::Error },
    #[error("Failed to read history file: {source}")]
    HistoryReadFailed { source: io::Error },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Everything a cleanup run needs to know besides the directory itself.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    pub mapper: BucketMapper,
    pub filter: ExtensionFilter,
    pub protected: ProtectedArtifacts,
    /// Name of the log file inside the base directory.
    pub history_file: String,
}

impl CleanupOptions {
    /// Combines loaded configuration with the filter given on the command line.
    ///
    /// Skip extensions from the configuration are added to the filter, and the
    /// running executable is protected when it lives in `base_path`.
    pub fn from_config(
        config: &TidyConfig,
        filter: ExtensionFilter,
        base_path: &Path,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            mapper: BucketMapper::new(config.buckets.fallback.clone()),
            filter: filter.with_skips(&config.filters.skip),
            protected: config.protected_artifacts()?.with_current_exe(base_path),
            history_file: config.history.file_name.clone(),
        })
    }

    pub fn with_filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn history_path(&self, base_path: &Path) -> PathBuf {
        base_path.join(&self.history_file)
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            mapper: BucketMapper::default(),
            filter: ExtensionFilter::default(),
            protected: ProtectedArtifacts::default(),
            history_file: DEFAULT_HISTORY_FILE.to_string(),
        }
    }
}

/// A file selected for moving, and the bucket it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub file_name: String,
    pub bucket: String,
}

impl PlannedMove {
    /// Destination relative to the base directory.
    pub fn destination(&self) -> PathBuf {
        Path::new(&self.bucket).join(&self.file_name)
    }
}

/// Outcome of a cleanup run.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Moves that succeeded, in log order.
    pub moved: Vec<MoveRecord>,
    /// Files that could not be moved, with the reason.
    pub failed: Vec<(String, String)>,
    /// Number of moved files per bucket.
    pub by_bucket: BTreeMap<String, usize>,
}

impl CleanupReport {
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }
}

/// Organizes files by moving them into bucket subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Scans `base_path` and returns the moves a cleanup would perform,
    /// sorted by file name.
    ///
    /// Directories, protected artifacts, the log file itself and names that
    /// are not valid UTF-8 are left out, as are files rejected by the
    /// extension filter.
    pub fn plan(base_path: &Path, options: &CleanupOptions) -> OrganizeResult<Vec<PlannedMove>> {
        let entries = fs::read_dir(base_path).map_err(|source| OrganizeError::ReadDirFailed {
            path: base_path.to_path_buf(),
            source,
        })?;

        let mut planned = Vec::new();
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                continue;
            }

            let file_name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    debug!(name = ?raw, "skipping file with non UTF-8 name");
                    continue;
                }
            };

            if file_name == options.history_file || options.protected.is_protected(&file_name) {
                debug!(file = %file_name, "skipping protected file");
                continue;
            }

            let bucket = options.mapper.bucket_for(&file_name).to_string();
            if !options.filter.allows(&bucket) {
                debug!(file = %file_name, bucket = %bucket, "filtered out");
                continue;
            }

            planned.push(PlannedMove { file_name, bucket });
        }

        planned.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(planned)
    }

    /// Performs a cleanup with a previously computed plan.
    ///
    /// The log is created (truncating any old one) before the first move; if
    /// that fails nothing is moved. Files that cannot be moved are recorded in
    /// the report and skipped. `on_progress` is called once per planned move,
    /// after it was attempted.
    pub fn execute<F>(
        base_path: &Path,
        options: &CleanupOptions,
        plan: &[PlannedMove],
        mut on_progress: F,
    ) -> OrganizeResult<CleanupReport>
    where
        F: FnMut(&PlannedMove),
    {
        let mut history = HistoryWriter::create(&options.history_path(base_path))?;
        info!(base = %base_path.display(), candidates = plan.len(), "starting cleanup");

        let mut report = CleanupReport::default();
        for planned in plan {
            match Self::move_to_bucket(base_path, &planned.file_name, &planned.bucket) {
                Ok(record) => {
                    if let Err(e) = history.append(&record) {
                        // Every move left on disk must have a log line.
                        Self::revert(base_path, &record);
                        return Err(e);
                    }
                    *report.by_bucket.entry(planned.bucket.clone()).or_insert(0) += 1;
                    report.moved.push(record);
                }
                Err(e) => {
                    debug!(file = %planned.file_name, error = %e, "move failed, skipping");
                    report.failed.push((planned.file_name.clone(), e.to_string()));
                }
            }
            on_progress(planned);
        }

        info!(
            moved = report.moved_count(),
            failed = report.failed.len(),
            log = %history.path().display(),
            "cleanup finished"
        );
        Ok(report)
    }

    /// Plans and executes a cleanup in one go.
    pub fn cleanup(base_path: &Path, options: &CleanupOptions) -> OrganizeResult<CleanupReport> {
        let plan = Self::plan(base_path, options)?;
        Self::execute(base_path, options, &plan, |_| {})
    }

    /// Moves `file_name` from `base_path` into the `bucket` subdirectory.
    ///
    /// The bucket directory is created if needed. An existing file at the
    /// destination is never overwritten. If the move fails, a bucket directory
    /// created by this call is removed again.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidy::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// match FileOrganizer::move_to_bucket(Path::new("/path/to/base"), "image.png", "png") {
    ///     Ok(record) => println!("Moved to {}", record.new_path.display()),
    ///     Err(e) => eprintln!("Move failed: {}", e),
    /// }
    /// ```
    pub fn move_to_bucket(
        base_path: &Path,
        file_name: &str,
        bucket: &str,
    ) -> OrganizeResult<MoveRecord> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "not an existing directory"),
            });
        }

        let bucket_path = base_path.join(bucket);
        let created = !bucket_path.exists();
        fs::create_dir_all(&bucket_path).map_err(|source| OrganizeError::DirectoryCreationFailed {
            path: bucket_path.clone(),
            source,
        })?;

        let source_path = base_path.join(file_name);
        let destination = bucket_path.join(file_name);
        let result = if destination.symlink_metadata().is_ok() {
            Err(OrganizeError::DestinationExists {
                path: destination.clone(),
            })
        } else {
            fs::rename(&source_path, &destination).map_err(|source| {
                OrganizeError::FileMoveFailed {
                    from: source_path.clone(),
                    to: destination.clone(),
                    source,
                }
            })
        };

        if let Err(e) = result {
            if created {
                let _ = fs::remove_dir(&bucket_path);
            }
            return Err(e);
        }

        Ok(MoveRecord::new(file_name, Path::new(bucket).join(file_name)))
    }

    fn revert(base_path: &Path, record: &MoveRecord) {
        let current = base_path.join(&record.new_path);
        let original = base_path.join(&record.original_path);
        if let Err(e) = fs::rename(&current, &original) {
            warn!(
                file = %current.display(),
                error = %e,
                "could not move unlogged file back"
            );
        }
    }
}
