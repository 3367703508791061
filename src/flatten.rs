//! Tree flattening.
//!
//! This module walks a source tree and feeds every matching file through the
//! consolidating [`copy_file`], placing all of them directly in one
//! destination folder.

use crate::copy::{CopyDecision, copy_file};
use crate::error::{Error, Result};
use crate::options::{FlattenOptions, OnFailure};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::{DirEntry, WalkDir};

/// Statistics from a flatten run.
///
/// # Example
///
/// ```no_run
/// use flatcopy::{FlattenOptions, flatten};
/// use std::path::Path;
///
/// let stats = flatten(Path::new("card"), Path::new("photos"), &FlattenOptions::images())?;
/// println!(
///     "{} created, {} identical, {} renamed",
///     stats.files_created, stats.files_skipped, stats.files_renamed
/// );
/// # Ok::<(), flatcopy::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlattenStats {
    /// Number of files whose extension matched
    pub files_matched: u64,
    /// Number of files copied to a free name
    pub files_created: u64,
    /// Number of files skipped because identical content was already there
    pub files_skipped: u64,
    /// Number of files copied under a content-derived name
    pub files_renamed: u64,
    /// Number of files that failed (only with [`OnFailure::Continue`])
    pub files_failed: u64,
    /// Total bytes written
    pub bytes_copied: u64,
    /// Duration of the run
    pub duration: Duration,
}

/// Copy every matching file under `source` into `dest`, flattening the tree.
///
/// `dest` is created if needed. Files are visited in file-name order, so
/// repeated runs over the same tree make the same decisions. Symlinks are
/// not followed into directories; a symlink to a regular file is copied as
/// that file's contents. If `dest` lies inside `source`, it is not walked.
///
/// # Errors
///
/// - [`Error::SourceNotFound`] / [`Error::NotADirectory`] for a bad `source`
/// - [`Error::Io`] if `dest` cannot be created
/// - [`Error::WalkFailure`] if traversal fails (always fatal)
/// - the copy error of the first failed file under [`OnFailure::Abort`]
pub fn flatten(source: &Path, dest: &Path, options: &FlattenOptions) -> Result<FlattenStats> {
    let start_time = Instant::now();

    if !source.exists() {
        return Err(Error::SourceNotFound(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }

    fs::create_dir_all(dest)?;
    let dest_key = dest.canonicalize()?;

    let mut stats = FlattenStats::default();

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_same_dir(entry, &dest_key));

    for entry in walker {
        let entry = entry.map_err(|e| Error::WalkFailure {
            path: source.to_path_buf(),
            source: e,
        })?;

        if !is_regular_file(&entry, options) {
            continue;
        }

        let ext = lowercase_extension(entry.path());
        if !options.matches_extension(&ext) {
            continue;
        }
        stats.files_matched += 1;

        let dst_file = dest.join(destination_name(&entry, options.lowercase_names));
        match copy_file(entry.path(), &dst_file) {
            Ok(outcome) => {
                match outcome.decision {
                    CopyDecision::Create => stats.files_created += 1,
                    CopyDecision::SkipIdentical => stats.files_skipped += 1,
                    CopyDecision::RenameAndCopy => stats.files_renamed += 1,
                }
                stats.bytes_copied += outcome.bytes;
            }
            Err(e) => match options.on_failure {
                OnFailure::Abort => return Err(e),
                OnFailure::Continue => {
                    options.warn(&format!(
                        "Failed to copy file: {} to dest {}: {}",
                        entry.path().display(),
                        dst_file.display(),
                        e
                    ));
                    stats.files_failed += 1;
                }
            },
        }
    }

    stats.duration = start_time.elapsed();
    Ok(stats)
}

/// Lower-cased extension including the leading dot, or `""` if there is none.
pub(crate) fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn is_same_dir(entry: &DirEntry, dest_key: &Path) -> bool {
    entry.file_type().is_dir()
        && entry
            .path()
            .canonicalize()
            .is_ok_and(|canonical| canonical == dest_key)
}

fn is_regular_file(entry: &DirEntry, options: &FlattenOptions) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if file_type.is_symlink() {
        if entry.path().is_file() {
            return true;
        }
        options.warn(&format!(
            "Skipping symlink that does not point to a file: {}",
            entry.path().display()
        ));
        return false;
    }
    if !file_type.is_dir() {
        options.warn(&format!("Skipping special file: {}", entry.path().display()));
    }
    false
}

fn destination_name(entry: &DirEntry, lowercase: bool) -> PathBuf {
    let name = entry.file_name();
    if !lowercase {
        return PathBuf::from(name);
    }
    match name.to_str() {
        Some(utf8) => PathBuf::from(utf8.to_lowercase()),
        // Not valid UTF-8: keep the bytes as they are
        None => PathBuf::from(OsString::from(name)),
    }
}

// =============================================================================
// Tests
// =============================================================================
