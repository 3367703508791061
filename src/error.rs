//! Error types for flatcopy.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur while hashing, copying, flattening, or expanding archives,
//! and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Copy | [`Error::SourceUnreadable`], [`Error::DestUnwritable`] |
//! | Digest | [`Error::HashFailure`], [`Error::Spawn`] |
//! | Collaborators | [`Error::WalkFailure`], [`Error::ArchiveFailure`], [`Error::Io`] |
//! | Validation | [`Error::SourceNotFound`], [`Error::NotADirectory`] |

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for flatcopy operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` (errno 28) |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
///
/// # Example
///
/// ```no_run
/// use std::io;
/// use flatcopy::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        // The raw OS error might be available even if kind() isn't StorageFull
        if let Some(raw_error) = error.raw_os_error() {
            const ENOSPC: i32 = 28;
            return raw_error == ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// Errors that can occur during flatcopy operations.
///
/// Every variant that originates from the filesystem carries the path that
/// failed together with the underlying cause.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The source file could not be opened for reading
    #[error("Source unreadable: {path}: {source}")]
    SourceUnreadable {
        /// Source path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// The destination could not be created or written
    ///
    /// A write that fails part-way through leaves the partially written
    /// file at `path`. Once streaming has started, a read failure on the
    /// source is reported here too: the kernel copy does not tell the two
    /// sides apart. Failures to open or inspect the source are
    /// [`Error::SourceUnreadable`].
    #[error("Destination unwritable: {path}: {source}")]
    DestUnwritable {
        /// Path that was being written
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// A digest could not be computed because the file could not be read
    #[error("Failed to hash {path}: {source}")]
    HashFailure {
        /// Path that was being hashed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Directory traversal failed
    #[error("Failed to walk {path}: {source}")]
    WalkFailure {
        /// Root of the walk
        path: PathBuf,
        /// Underlying error
        source: walkdir::Error,
    },

    /// A zip archive could not be read or expanded
    #[error("Failed to expand archive {path}: {source}")]
    ArchiveFailure {
        /// Archive path
        path: PathBuf,
        /// Underlying error
        source: zip::result::ZipError,
    },

    /// A hashing worker thread could not be started
    #[error("Failed to spawn hashing worker: {source}")]
    Spawn {
        /// Underlying error
        source: io::Error,
    },

    /// IO error outside of a single copy (e.g. creating the destination folder)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    SourceNotFound(PathBuf),

    /// Source is not a directory
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl Error {
    pub(crate) fn source_unreadable(path: &Path, source: io::Error) -> Self {
        Self::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn dest_unwritable(path: &Path, source: io::Error) -> Self {
        Self::DestUnwritable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn hash_failure(path: &Path, source: io::Error) -> Self {
        Self::HashFailure {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The path this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceUnreadable { path, .. }
            | Self::DestUnwritable { path, .. }
            | Self::HashFailure { path, .. }
            | Self::WalkFailure { path, .. }
            | Self::ArchiveFailure { path, .. }
            | Self::SourceNotFound(path)
            | Self::NotADirectory(path) => Some(path),
            Self::Spawn { .. } | Self::Io(_) => None,
        }
    }

    /// Stable machine-readable classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DestUnwritable { source, .. } if is_no_space_error(source) => ErrorCode::NoSpace,
            Self::Io(source) if is_no_space_error(source) => ErrorCode::NoSpace,
            Self::Io(source) if source.kind() == io::ErrorKind::PermissionDenied => {
                ErrorCode::PermissionDenied
            }
            Self::SourceUnreadable { .. } => ErrorCode::SourceUnreadable,
            Self::DestUnwritable { .. } => ErrorCode::DestUnwritable,
            Self::HashFailure { .. } => ErrorCode::HashFailure,
            Self::WalkFailure { .. } => ErrorCode::WalkFailure,
            Self::ArchiveFailure { .. } => ErrorCode::ArchiveFailure,
            Self::Spawn { .. } => ErrorCode::Internal,
            Self::Io(_) => ErrorCode::IoError,
            Self::SourceNotFound(_) | Self::NotADirectory(_) => ErrorCode::InvalidInput,
        }
    }
}

/// Machine-readable error classification.
///
/// The string forms returned by [`ErrorCode::as_str`] are stable and used in
/// JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum ErrorCode {
    /// Source could not be opened or read
    SourceUnreadable,
    /// Destination could not be created or written
    DestUnwritable,
    /// A digest computation failed
    HashFailure,
    /// Directory traversal failed
    WalkFailure,
    /// Archive could not be expanded
    ArchiveFailure,
    /// Destination storage is full
    NoSpace,
    /// Permission denied
    PermissionDenied,
    /// Any other IO error
    IoError,
    /// Invalid arguments or paths
    InvalidInput,
    /// Internal failure (e.g. a thread could not be spawned)
    Internal,
}

impl ErrorCode {
    /// Snake-case name of this code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceUnreadable => "source_unreadable",
            Self::DestUnwritable => "dest_unwritable",
            Self::HashFailure => "hash_failure",
            Self::WalkFailure => "walk_failure",
            Self::ArchiveFailure => "archive_failure",
            Self::NoSpace => "no_space",
            Self::PermissionDenied => "permission_denied",
            Self::IoError => "io_error",
            Self::InvalidInput => "invalid_input",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
