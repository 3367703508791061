//! Zip archive expansion.
//!
//! Extracts every `.zip` found under a source tree into a staging directory,
//! so that a following [`flatten`](crate::flatten) run picks up the archived
//! files as well. Existing files in the staging area are never replaced.

use crate::copy::{CopyDecision, copy_file};
use crate::error::{Error, Result};
use crate::flatten::lowercase_extension;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Statistics from [`expand_archives`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArchiveStats {
    /// Number of archives fully expanded
    pub archives_expanded: u64,
    /// Number of archives that failed (logged and skipped)
    pub archives_failed: u64,
    /// Number of files written into the staging directory
    pub entries_written: u64,
    /// Number of entries already present with identical content
    pub entries_skipped: u64,
}

/// Expand every zip archive under `source` into `staging`.
///
/// Each archive is expanded into its own folder, `staging/<archive stem>/`.
/// The staging directory is created if needed and is never scanned for
/// archives itself. A failing archive is logged and counted; the remaining
/// archives are still expanded.
///
/// Files already present in the staging area are never overwritten: an entry
/// whose name is taken is resolved like [`copy_file`], so identical content
/// is skipped and different content lands under a content-derived name.
///
/// # Errors
///
/// - [`Error::SourceNotFound`] / [`Error::NotADirectory`] for a bad `source`
/// - [`Error::Io`] if `staging` cannot be created
/// - [`Error::WalkFailure`] if traversal fails
pub fn expand_archives(source: &Path, staging: &Path) -> Result<ArchiveStats> {
    if !source.exists() {
        return Err(Error::SourceNotFound(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }

    fs::create_dir_all(staging)?;
    let staging_key = staging.canonicalize()?;

    let mut stats = ArchiveStats::default();
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry
                    .path()
                    .canonicalize()
                    .is_ok_and(|canonical| canonical == staging_key))
        });

    for entry in walker {
        let entry = entry.map_err(|e| Error::WalkFailure {
            path: source.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() || lowercase_extension(entry.path()) != ".zip" {
            continue;
        }

        let archive_dir = staging.join(entry.path().file_stem().unwrap_or_default());
        match expand_archive(entry.path(), &archive_dir) {
            Ok(expanded) => {
                tracing::info!(
                    "Expanded archive: {} ({} written, {} already present)",
                    entry.path().display(),
                    expanded.written,
                    expanded.skipped
                );
                stats.archives_expanded += 1;
                stats.entries_written += expanded.written;
                stats.entries_skipped += expanded.skipped;
            }
            Err(e) => {
                tracing::error!("{}", e);
                stats.archives_failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Entry counts for one archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandedArchive {
    /// Files written (created or stored under a derived name)
    pub written: u64,
    /// Entries whose content was already present under the same name
    pub skipped: u64,
}

/// Expand one archive into `dest`.
///
/// Entries never replace an existing file; see [`expand_archives`].
pub fn expand_archive(archive: &Path, dest: &Path) -> Result<ExpandedArchive> {
    let archive_error = |source: zip::result::ZipError| Error::ArchiveFailure {
        path: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(|e| Error::source_unreadable(archive, e))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(archive_error)?;

    let mut expanded = ExpandedArchive::default();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(archive_error)?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!(
                "Skipping archive entry escaping the staging directory: {} in {}",
                entry.name(),
                archive.display()
            );
            continue;
        };
        let out_path: PathBuf = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| Error::dest_unwritable(&out_path, e))?;
            continue;
        }

        let parent = out_path.parent().unwrap_or(dest);
        fs::create_dir_all(parent).map_err(|e| Error::dest_unwritable(parent, e))?;

        // Unpacked beside the target, then placed by content
        let mut unpacked = tempfile::Builder::new()
            .prefix(".flatcopy-")
            .tempfile_in(parent)
            .map_err(|e| Error::dest_unwritable(parent, e))?;
        io::copy(&mut entry, unpacked.as_file_mut())
            .map_err(|e| Error::dest_unwritable(unpacked.path(), e))?;

        let outcome = copy_file(unpacked.path(), &out_path)?;
        if outcome.decision == CopyDecision::SkipIdentical {
            expanded.skipped += 1;
            continue;
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            apply_entry_mode(&outcome.target, mode);
        }

        expanded.written += 1;
    }

    Ok(expanded)
}

/// Apply an archived Unix mode, limited to `0o755` and always owner
/// readable and writable.
#[cfg(unix)]
fn apply_entry_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    let mode = (mode & 0o755) | 0o600;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
        tracing::warn!(
            "Failed to set permissions {:o} on {}: {}",
            mode,
            path.display(),
            e
        );
    }
}

// =============================================================================
// Tests
// =============================================================================
