//! Consolidating single-file copy.
//!
//! Copies a source file to a destination path without ever losing data on a
//! name collision: identical content is skipped, different content is written
//! next to the existing file under a content-derived name.

use crate::digest::{Digest, digest};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::utils::{collision_path, copy_file_contents};

/// Action taken by [`copy_file`] for one request.
///
/// Derived at copy time from whether the destination exists and, if it
/// does, whether its digest equals the source's. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CopyDecision {
    /// Destination did not exist and was created
    Create,
    /// Destination already holds identical content; nothing was written
    SkipIdentical,
    /// Destination holds different content; the source was written under a
    /// derived name and the existing file was left untouched
    RenameAndCopy,
}

impl CopyDecision {
    /// Short lowercase label for reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::SkipIdentical => "skipped",
            Self::RenameAndCopy => "renamed",
        }
    }
}

/// Result of a successful [`copy_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CopyOutcome {
    /// What was done
    pub decision: CopyDecision,
    /// Path that was written, or the existing identical file for a skip
    pub target: PathBuf,
    /// Number of bytes written (0 for a skip)
    pub bytes: u64,
}

impl CopyOutcome {
    fn skipped(target: &Path) -> Self {
        Self {
            decision: CopyDecision::SkipIdentical,
            target: target.to_path_buf(),
            bytes: 0,
        }
    }
}

/// Copy `src` to `dst`, resolving a name collision by content.
///
/// - `dst` missing: `src` is copied to `dst` ([`CopyDecision::Create`]).
/// - `dst` present with the same digest: nothing is written
///   ([`CopyDecision::SkipIdentical`]).
/// - `dst` present with a different digest: `src` is copied to
///   `<stem>-<first 5 hex of dst digest><ext>` next to `dst`, which is left
///   untouched ([`CopyDecision::RenameAndCopy`]).
///
/// Both digests are computed concurrently and both are known before anything
/// is written. The destination directory must already exist.
///
/// If the derived name is itself taken, it is never overwritten: identical
/// content there counts as a skip, anything else is an error.
///
/// # Errors
///
/// - [`Error::SourceUnreadable`] if `src` cannot be opened or is a directory
/// - [`Error::HashFailure`] if either digest cannot be computed, or `dst`
///   cannot be inspected
/// - [`Error::DestUnwritable`] if the target cannot be created or written;
///   a partially written target may remain
///
/// # Example
///
/// ```no_run
/// use flatcopy::{CopyDecision, copy_file};
/// use std::path::Path;
///
/// let outcome = copy_file(Path::new("a.txt"), Path::new("dest/a.txt"))?;
/// if outcome.decision == CopyDecision::RenameAndCopy {
///     println!("kept both, new copy at {}", outcome.target.display());
/// }
/// # Ok::<(), flatcopy::Error>(())
/// ```
pub fn copy_file(src: &Path, dst: &Path) -> Result<CopyOutcome> {
    let src_file = File::open(src).map_err(|e| Error::source_unreadable(src, e))?;
    let src_meta = src_file
        .metadata()
        .map_err(|e| Error::source_unreadable(src, e))?;
    if src_meta.is_dir() {
        return Err(Error::source_unreadable(
            src,
            io::Error::new(io::ErrorKind::IsADirectory, "source is a directory"),
        ));
    }
    let src_len = src_meta.len();

    let dst_exists = dst
        .try_exists()
        .map_err(|e| Error::hash_failure(dst, e))?;

    if !dst_exists {
        let bytes = write_target(&src_file, src_len, dst, false)?;
        tracing::info!("Copied file: {} -> {}", src.display(), dst.display());
        return Ok(CopyOutcome {
            decision: CopyDecision::Create,
            target: dst.to_path_buf(),
            bytes,
        });
    }

    let (src_digest, dst_digest) = rayon::join(|| digest(src), || digest(dst));
    let src_digest = src_digest?;
    let dst_digest = dst_digest?;

    if src_digest == dst_digest {
        tracing::info!("Exact match found: {}, skipping", dst.display());
        return Ok(CopyOutcome::skipped(dst));
    }

    tracing::info!(
        "Similar file found: {}, diff hash: {}",
        dst.display(),
        dst_digest
    );
    let target = collision_path(dst, &dst_digest);
    rename_and_copy(&src_file, src_len, src, &src_digest, &target)
}

fn rename_and_copy(
    src_file: &File,
    src_len: u64,
    src: &Path,
    src_digest: &Digest,
    target: &Path,
) -> Result<CopyOutcome> {
    match write_target(src_file, src_len, target, true) {
        Ok(bytes) => {
            tracing::info!("Copied file: {} -> {}", src.display(), target.display());
            Ok(CopyOutcome {
                decision: CopyDecision::RenameAndCopy,
                target: target.to_path_buf(),
                bytes,
            })
        }
        Err(Error::DestUnwritable { source, .. })
            if source.kind() == io::ErrorKind::AlreadyExists =>
        {
            // Derived name already taken: never overwrite it
            if digest(target)? == *src_digest {
                tracing::info!("Exact match found: {}, skipping", target.display());
                Ok(CopyOutcome::skipped(target))
            } else {
                Err(Error::dest_unwritable(target, source))
            }
        }
        Err(e) => Err(e),
    }
}

/// Create `target` and stream the rest of `src_file` into it.
///
/// With `create_new`, an existing `target` is reported as an
/// `AlreadyExists` error instead of being truncated.
fn write_target(src_file: &File, src_len: u64, target: &Path, create_new: bool) -> Result<u64> {
    let mut open = OpenOptions::new();
    open.write(true);
    if create_new {
        open.create_new(true);
    } else {
        open.create(true).truncate(true);
    }

    let out = open
        .open(target)
        .map_err(|e| Error::dest_unwritable(target, e))?;
    copy_file_contents(src_file, &out, src_len).map_err(|e| Error::dest_unwritable(target, e))
}

// =============================================================================
// Tests
// =============================================================================
