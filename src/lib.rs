//! # flatcopy
//!
//! Flatten files from a source tree into one destination folder without
//! losing data when names collide.
//!
//! ## Core Features
//!
//! - **Content-addressed copy**: a same-name collision is resolved by comparing
//!   MD5 digests. Identical content is skipped, different content is written
//!   next to the existing file as `<stem>-<5 hex of existing digest><ext>`
//! - **No silent overwrite**: an existing destination file is never modified
//! - **Concurrent digests**: both sides of a collision are hashed in parallel
//!   and joined before any decision is made
//! - **Batch hashing pipeline**: a bounded worker pool with backpressure that
//!   hashes any number of files
//! - **Tree flattening**: recursive walk with case-insensitive extension
//!   filtering
//! - **Archive expansion**: zip archives under the source can be unpacked into
//!   a staging folder first
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatcopy::{CopyDecision, copy_file};
//! use std::path::Path;
//!
//! let outcome = copy_file(Path::new("card/a.jpg"), Path::new("photos/a.jpg"))?;
//! match outcome.decision {
//!     CopyDecision::Create => println!("copied"),
//!     CopyDecision::SkipIdentical => println!("already there"),
//!     CopyDecision::RenameAndCopy => println!("kept both: {}", outcome.target.display()),
//! }
//! # Ok::<(), flatcopy::Error>(())
//! ```
//!
//! ### Flatten a Memory Card
//!
//! ```no_run
//! use flatcopy::{FlattenOptions, OnFailure, flatten};
//! use std::path::Path;
//!
//! let options = FlattenOptions::media().with_on_failure(OnFailure::Continue);
//! let stats = flatten(Path::new("/mnt/card"), Path::new("/photos/inbox"), &options)?;
//! println!("{} new, {} renamed", stats.files_created, stats.files_renamed);
//! # Ok::<(), flatcopy::Error>(())
//! ```
//!
//! ### Hash Many Files
//!
//! ```no_run
//! use flatcopy::{PipelineOptions, digest_all};
//!
//! let results = digest_all(["a.jpg", "b.jpg"], &PipelineOptions::default())?;
//! for r in results {
//!     println!("{}  {}", r.digest, r.path.display());
//! }
//! # Ok::<(), flatcopy::Error>(())
//! ```
//!
//! ## Logging
//!
//! Decisions and per-file failures are emitted as [`tracing`] events. Install
//! any subscriber to see them.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Progress bar support with indicatif |
//! | `serde` | Serialize options and results |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod archive;
mod copy;
mod digest;
mod error;
mod flatten;
mod options;
mod pipeline;

#[cfg(feature = "progress")]
mod progress;

pub use archive::{ArchiveStats, ExpandedArchive, expand_archive, expand_archives};
pub use copy::{CopyDecision, CopyOutcome, copy_file};
pub use digest::{Digest, digest};
pub use error::{Error, ErrorCode, Result, is_no_space_error};
pub use flatten::{FlattenStats, flatten};
pub use options::{FlattenOptions, IMAGE_EXTENSIONS, OnFailure, PipelineOptions, VIDEO_EXTENSIONS};
pub use pipeline::{
    HashResult, PathSink, ResultSource, digest_all, start_pipeline, start_pipeline_with,
};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::create_progress_bar;
