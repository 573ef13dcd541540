//! tidy - sorts the files of a directory into folders by extension
//!
//! This library provides extension-to-bucket mapping and filtering, the
//! cleanup that moves files into their buckets while writing a transaction
//! log, the undo that replays that log, an interactive read-only listing,
//! and TOML configuration for the log name, fallback bucket and protected
//! files.

pub mod cli;
pub mod config;
pub mod explorer;
pub mod file_category;
pub mod file_organizer;
pub mod history;
pub mod logging;
pub mod output;
pub mod undo;

pub use config::{ConfigError, ProtectedArtifacts, TidyConfig};
pub use file_category::{BucketMapper, ExtensionFilter};
pub use file_organizer::{CleanupOptions, CleanupReport, FileOrganizer, OrganizeError};
pub use history::{MoveRecord, TransactionLog};
pub use undo::{UndoManager, UndoOutcome, UndoReport};

pub use cli::{Commands, TidyError, run_cli, run_cli_with_config};
