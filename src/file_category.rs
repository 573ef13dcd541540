//! File classification by extension.
//!
//! Every file is assigned a *bucket*: the directory it will be moved into.
//! The bucket is the text after the last `.` of the file name, taken exactly
//! as written (no case folding). Names without such text go to a fallback
//! bucket, `misc` unless configured otherwise.
//!
//! # Examples
//!
//! ```
//! use tidy::file_category::{BucketMapper, ExtensionFilter};
//!
//! let mapper = BucketMapper::default();
//! assert_eq!(mapper.bucket_for("photo.png"), "png");
//! assert_eq!(mapper.bucket_for("archive.tar.gz"), "gz");
//! assert_eq!(mapper.bucket_for("README"), "misc");
//!
//! let filter = ExtensionFilter::parse("png .jpg", "");
//! assert!(filter.allows("png"));
//! assert!(filter.allows("jpg"));
//! assert!(!filter.allows("pdf"));
//! ```

use std::collections::HashSet;

/// Bucket used for files without an extension when nothing else is configured.
pub const DEFAULT_FALLBACK_BUCKET: &str = "misc";

/// Returns the extension of a file name: everything after the last `.`.
///
/// A name starting with a dot (`.bashrc`) has the extension `bashrc`, and a
/// name ending with a dot has an empty one.
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[idx + 1..],
        None => "",
    }
}

/// Normalizes a user-supplied extension token by dropping one leading dot.
pub fn normalize_extension(token: &str) -> &str {
    token.strip_prefix('.').unwrap_or(token)
}

/// Maps file names to bucket directory names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketMapper {
    fallback: String,
}

impl BucketMapper {
    /// Creates a mapper that sends extensionless files to `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
        }
    }

    /// Returns the bucket name for a file.
    pub fn bucket_for<'a>(&'a self, file_name: &'a str) -> &'a str {
        let ext = extension_of(file_name);
        if ext.is_empty() {
            self.fallback.as_str()
        } else {
            ext
        }
    }

    /// The bucket used for files without an extension.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for BucketMapper {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_BUCKET)
    }
}

/// Inclusion and exclusion rules over bucket names.
///
/// The target set restricts which buckets are moved at all (an empty target
/// set means no restriction). The skip set always wins, so a bucket present
/// in both sets is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    targets: HashSet<String>,
    skips: HashSet<String>,
}

impl ExtensionFilter {
    /// Builds a filter from two whitespace-separated extension lists, as
    /// given to `cup --ext` and `cup --skip`.
    pub fn parse(targets: &str, skips: &str) -> Self {
        Self::new(targets.split_whitespace(), skips.split_whitespace())
    }

    /// Builds a filter from already split extension tokens.
    pub fn new<T, S>(targets: T, skips: S) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            targets: collect_extensions(targets),
            skips: collect_extensions(skips),
        }
    }

    /// Adds more extensions to the skip set.
    pub fn with_skips<S>(mut self, skips: S) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        self.skips.extend(collect_extensions(skips));
        self
    }

    /// Returns true if files in `bucket` should be moved.
    pub fn allows(&self, bucket: &str) -> bool {
        if !self.targets.is_empty() && !self.targets.contains(bucket) {
            return false;
        }
        !self.skips.contains(bucket)
    }

    /// Returns true if no target restriction is in place.
    pub fn is_unrestricted(&self) -> bool {
        self.targets.is_empty()
    }
}

fn collect_extensions<I>(tokens: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| normalize_extension(token.as_ref().trim()).to_string())
        .collect()
}
