//! Configuration options for hashing and flattening.
//!
//! This module provides [`PipelineOptions`] for the batch digest pipeline,
//! [`FlattenOptions`] for tree flattening, and [`OnFailure`] for deciding
//! what a flatten run does when a single copy fails.
//!
//! The consolidating copy itself ([`copy_file`](crate::copy_file)) takes no
//! options: its behavior is fully determined by the two paths.
//!
//! # Example
//!
//! ```
//! use flatcopy::{FlattenOptions, OnFailure, PipelineOptions};
//!
//! let pipeline = PipelineOptions::default().with_workers(8);
//! let flatten = FlattenOptions::images()
//!     .with_extension("heic")
//!     .with_on_failure(OnFailure::Continue);
//! ```

use std::collections::BTreeSet;

/// File extensions treated as images by [`FlattenOptions::images`].
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".psd", ".pdf", ".png", ".gif", ".jpg", ".jpeg", ".tiff", ".nef", ".raw",
];

/// File extensions treated as videos by [`FlattenOptions::videos`].
pub const VIDEO_EXTENSIONS: &[&str] = &[".mov", ".avi"];

/// Options for the batch digest pipeline.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `workers` | 0 | Resolved to hardware parallelism when started |
/// | `warn_handler` | `None` | Per-file failures go to `tracing` |
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineOptions {
    /// Number of hashing workers (0 = number of available CPUs)
    ///
    /// Also the capacity of both the input and the output channel.
    pub workers: usize,

    /// Callback for per-file failures (optional)
    ///
    /// If not set, failures are logged as `tracing` error events.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,
}

impl PipelineOptions {
    /// Set the number of workers (0 = hardware parallelism)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Worker count to actually use, resolved against the running machine.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            tracing::error!("{}", msg);
        }
    }
}

/// What a flatten run does when copying a single file fails.
///
/// Walk failures are always fatal; this only governs per-file copy errors.
///
/// # Default
///
/// The default is [`OnFailure::Abort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OnFailure {
    /// Stop at the first failed copy and return its error.
    #[default]
    Abort,
    /// Warn, count the failure, and continue with the remaining files.
    Continue,
}

/// Options for [`flatten`](crate::flatten).
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `extensions` | empty | Empty set matches every file |
/// | `on_failure` | `Abort` | Stop at the first failed copy |
/// | `lowercase_names` | `true` | Lower-case destination file names |
/// | `warn_handler` | `None` | Warnings go to `tracing` |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlattenOptions {
    /// Lower-cased extensions including the leading dot (e.g. `.jpg`)
    pub extensions: BTreeSet<String>,

    /// Behavior when a single copy fails
    pub on_failure: OnFailure,

    /// Whether destination names are lower-cased (default: true)
    ///
    /// The source is always read from its real path; only the name in the
    /// destination folder is affected.
    pub lowercase_names: bool,

    /// Callback for warnings (optional)
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            extensions: BTreeSet::new(),
            on_failure: OnFailure::Abort,
            lowercase_names: true,
            warn_handler: None,
        }
    }
}

impl FlattenOptions {
    /// Options matching common image and document formats.
    pub fn images() -> Self {
        Self::default().with_extensions(IMAGE_EXTENSIONS.iter().copied())
    }

    /// Options matching common video formats.
    pub fn videos() -> Self {
        Self::default().with_extensions(VIDEO_EXTENSIONS.iter().copied())
    }

    /// Options matching both images and videos.
    pub fn media() -> Self {
        Self::images().with_extensions(VIDEO_EXTENSIONS.iter().copied())
    }

    /// Add one extension to match.
    ///
    /// The leading dot is optional and matching is case-insensitive, so
    /// `"JPG"`, `"jpg"` and `".jpg"` are equivalent.
    #[must_use]
    pub fn with_extension(mut self, ext: &str) -> Self {
        if let Some(normalized) = normalize_extension(ext) {
            self.extensions.insert(normalized);
        }
        self
    }

    /// Add several extensions to match.
    #[must_use]
    pub fn with_extensions<'a, I>(self, exts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        exts.into_iter().fold(self, Self::with_extension)
    }

    /// Set the per-file failure behavior
    #[must_use]
    pub fn with_on_failure(mut self, on_failure: OnFailure) -> Self {
        self.on_failure = on_failure;
        self
    }

    /// Keep destination names in their original case
    #[must_use]
    pub fn keep_case(mut self) -> Self {
        self.lowercase_names = false;
        self
    }

    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Whether a lower-cased extension (with leading dot, or empty) is selected.
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.is_empty() || self.extensions.contains(ext)
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            tracing::warn!("{}", msg);
        }
    }
}

fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}
