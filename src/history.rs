//! Transaction log of the moves performed by a cleanup run.
//!
//! The log is a flat text file with one record per line:
//!
//! ```text
//! <original-name>|<new-relative-path>
//! ```
//!
//! Both paths are relative to the organized directory. A backslash escapes
//! the next character, so names containing `|` or `\` survive a round trip;
//! `\n` and `\r` stand for line breaks inside a name. Lines that do not
//! split into exactly two non-empty fields are reported as malformed.
//!
//! ```
//! use tidy::history::MoveRecord;
//!
//! let record = MoveRecord::new("a|b.txt", "txt/a|b.txt");
//! let line = record.to_line();
//! assert_eq!(line, "a\\|b.txt|txt/a\\|b.txt\n");
//! assert_eq!(MoveRecord::parse_line(line.trim_end()), Some(record));
//! ```

use crate::file_organizer::{OrganizeError, OrganizeResult};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default name of the log file inside the organized directory.
pub const DEFAULT_HISTORY_FILE: &str = ".tidy_history";

const DELIMITER: char = '|';
const ESCAPE: char = '\\';

/// A single move, as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Where the file was before the cleanup, relative to the base directory.
    pub original_path: PathBuf,
    /// Where the cleanup put it, relative to the base directory.
    pub new_path: PathBuf,
}

impl MoveRecord {
    pub fn new(original_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Self {
        Self {
            original_path: original_path.into(),
            new_path: new_path.into(),
        }
    }

    /// Serializes the record as one newline-terminated log line.
    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}\n",
            escape_field(&self.original_path.to_string_lossy()),
            DELIMITER,
            escape_field(&self.new_path.to_string_lossy())
        )
    }

    /// Parses one log line (without its line terminator).
    ///
    /// Returns `None` for anything other than exactly two non-empty fields,
    /// including a dangling escape at the end of the line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields = split_fields(line)?;
        let [original, new_path]: [String; 2] = fields.try_into().ok()?;
        if original.is_empty() || new_path.is_empty() {
            return None;
        }
        Some(Self::new(original, new_path))
    }
}

fn escape_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            ESCAPE => escaped.push_str("\\\\"),
            DELIMITER => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn split_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next()? {
                'n' => current.push('\n'),
                'r' => current.push('\r'),
                other => current.push(other),
            },
            DELIMITER => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);

    Some(fields)
}

/// Append-only writer for a fresh transaction log.
///
/// Each record is handed to the OS as soon as it is appended, so the file
/// always matches the moves performed so far.
#[derive(Debug)]
pub struct HistoryWriter {
    file: File,
    path: PathBuf,
    records: usize,
}

impl HistoryWriter {
    /// Creates the log file, truncating any previous log at `path`.
    pub fn create(path: &Path) -> OrganizeResult<Self> {
        let file = File::create(path).map_err(|source| OrganizeError::HistoryCreateFailed {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            records: 0,
        })
    }

    /// Appends one record.
    pub fn append(&mut self, record: &MoveRecord) -> OrganizeResult<()> {
        self.file
            .write_all(record.to_line().as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|source| OrganizeError::HistoryWriteFailed { source })?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

/// The parsed contents of a log file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionLog {
    /// Well-formed records, in the order they were written.
    pub records: Vec<MoveRecord>,
    /// Number of non-blank lines that could not be parsed.
    pub malformed: usize,
}

impl TransactionLog {
    /// Reads the log at `path`. Returns `Ok(None)` if there is no log.
    pub fn load(path: &Path) -> OrganizeResult<Option<Self>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(OrganizeError::HistoryReadFailed { source }),
        };

        Ok(Some(Self::parse(&String::from_utf8_lossy(&bytes))))
    }

    /// Parses log contents. Blank lines are ignored.
    pub fn parse(content: &str) -> Self {
        let mut log = Self::default();
        for line in content.lines().filter(|line| !line.is_empty()) {
            match MoveRecord::parse_line(line) {
                Some(record) => log.records.push(record),
                None => {
                    debug!(line, "ignoring malformed history line");
                    log.malformed += 1;
                }
            }
        }
        log
    }

    /// Removes the log file. Returns whether a file was actually removed.
    pub fn delete(path: &Path) -> OrganizeResult<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(OrganizeError::HistoryWriteFailed { source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_record_line_format() {
        let record = MoveRecord::new("photo.png", Path::new("png").join("photo.png"));
        let expected = format!("photo.png|{}\n", Path::new("png").join("photo.png").display());
        assert_eq!(record.to_line(), expected);
    }

    #[test]
    fn test_escaped_names_parse_back() {
        let record = MoveRecord::new("odd|name\\x.txt", "txt/odd|name\\x.txt");
        let line = record.to_line();
        assert_eq!(line, "odd\\|name\\\\x.txt|txt/odd\\|name\\\\x.txt\n");
        assert_eq!(MoveRecord::parse_line(line.trim_end_matches('\n')), Some(record));
    }

    #[test]
    fn test_newline_in_name_stays_on_one_line() {
        let record = MoveRecord::new("two\nlines", "misc/two\nlines");
        let line = record.to_line();
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(MoveRecord::parse_line(line.trim_end_matches('\n')), Some(record));
    }

    #[test]
    fn test_malformed_lines_rejected() {
        assert_eq!(MoveRecord::parse_line("only-one-field"), None);
        assert_eq!(MoveRecord::parse_line("a|b|c"), None);
        assert_eq!(MoveRecord::parse_line("a|"), None);
        assert_eq!(MoveRecord::parse_line("|b"), None);
        assert_eq!(MoveRecord::parse_line("a|b\\"), None);
    }

    #[test]
    fn test_parse_counts_malformed_and_skips_blank() {
        let log = TransactionLog::parse("a.txt|txt/a.txt\n\ngarbage\nb.png|png/b.png\n");
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.malformed, 1);
        assert_eq!(log.records[0].original_path, PathBuf::from("a.txt"));
        assert_eq!(log.records[1].new_path, PathBuf::from("png/b.png"));
    }

    #[test]
    fn test_load_missing_log_is_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let loaded = TransactionLog::load(&temp_dir.path().join(DEFAULT_HISTORY_FILE))
            .expect("Loading a missing log should not fail");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_writer_truncates_and_appends() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DEFAULT_HISTORY_FILE);
        fs::write(&path, "stale|stale/entry\n").expect("Failed to seed log");

        let mut writer = HistoryWriter::create(&path).expect("Failed to create log");
        assert!(writer.is_empty());
        writer
            .append(&MoveRecord::new("a.txt", "txt/a.txt"))
            .expect("Failed to append");
        writer
            .append(&MoveRecord::new("b.md", "md/b.md"))
            .expect("Failed to append");
        assert_eq!(writer.len(), 2);
        assert_eq!(writer.path(), path.as_path());

        let content = fs::read_to_string(&path).expect("Failed to read log");
        assert_eq!(content, "a.txt|txt/a.txt\nb.md|md/b.md\n");
    }

    #[test]
    fn test_delete_reports_presence() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DEFAULT_HISTORY_FILE);
        fs::write(&path, "").expect("Failed to create log");

        assert!(TransactionLog::delete(&path).expect("delete failed"));
        assert!(!path.exists());
        assert!(!TransactionLog::delete(&path).expect("delete failed"));
    }
}
