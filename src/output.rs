//! Output formatting and styling module.
//!
//! All user-facing terminal output goes through [`OutputFormatter`]. Colors
//! come from a [`Theme`] value handed to the formatter (and to the `ls`
//! view), so there is no global style state.

use colored::{Color, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<Rgb> for Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Color::TrueColor { r, g, b }
    }
}

/// Colors used for terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Headings and the `ls` title.
    pub title: Rgb,
    /// Completion marks.
    pub done: Rgb,
    pub warning: Rgb,
    pub error: Rgb,
    /// Directory names in listings.
    pub directory: Rgb,
    /// Secondary text such as hints and examples.
    pub help: Rgb,
}

/// The default color theme.
pub const DEFAULT_THEME: Theme = Theme {
    title: Rgb(0x00, 0xAD, 0xD8),
    done: Rgb(0x02, 0xBA, 0x59),
    warning: Rgb(0xFF, 0xA5, 0x00),
    error: Rgb(0xE0, 0x40, 0x40),
    directory: Rgb(0x7D, 0x56, 0xF4),
    help: Rgb(0xAA, 0xAA, 0xAA),
};

impl Default for Theme {
    fn default() -> Self {
        DEFAULT_THEME
    }
}

/// Manages all CLI output with consistent styling and formatting.
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    theme: Theme,
}

impl OutputFormatter {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Prints a completion line led by `mark`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidy::output::OutputFormatter;
    /// OutputFormatter::default().success("✔", "Tidied up 3 files.");
    /// ```
    pub fn success(&self, mark: &str, message: &str) {
        println!("{} {}", mark.color(self.theme.done).bold(), message);
    }

    /// Prints a warning in bold.
    pub fn warning(&self, message: &str) {
        println!("  {}", message.color(self.theme.warning).bold());
    }

    /// Prints an error message to stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".color(self.theme.error), message);
    }

    /// Prints a dimmed informational line.
    pub fn info(&self, message: &str) {
        println!("{}", message.color(self.theme.help));
    }

    /// Prints a regular message without styling.
    pub fn plain(&self, message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(&self, header: &str) {
        println!("\n{}", header.color(self.theme.title).bold());
    }

    /// Prints a dry-run notice.
    pub fn dry_run_notice(&self, message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).color(self.theme.warning));
    }

    /// Creates a progress bar for the move loop.
    ///
    /// The bar draws to stderr and stays invisible when stderr is not a
    /// terminal.
    pub fn create_progress_bar(&self, total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Prints a table of file counts per bucket.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidy::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("pdf".to_string(), 15);
    /// counts.insert("png".to_string(), 8);
    /// OutputFormatter::default().summary_table(&counts, 23);
    /// ```
    pub fn summary_table(&self, bucket_counts: &BTreeMap<String, usize>, total_files: usize) {
        self.header("SUMMARY");

        let width = bucket_counts
            .keys()
            .map(|name| name.chars().count() + 1)
            .max()
            .unwrap_or(0)
            .max("Folder".len());

        println!("{:<width$} | {}", "Folder".bold(), "Files".bold());
        println!("{}", "-".repeat(width + 10));

        for (bucket, count) in bucket_counts {
            println!(
                "{:<width$} | {} {}",
                format!("{}/", bucket).color(self.theme.directory),
                count.to_string().color(self.theme.done),
                plural(*count)
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().color(self.theme.done).bold(),
            plural(total_files)
        );
    }
}

/// "file" or "files".
pub fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
