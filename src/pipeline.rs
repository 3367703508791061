//! Batch digest pipeline.
//!
//! A fixed-size pool of worker threads hashes files pushed onto a bounded
//! input channel and publishes [`HashResult`]s on a bounded output channel.
//! Both channels hold at most `workers` items, so a fast producer blocks while
//! the workers are saturated and a slow consumer never forces unbounded
//! buffering.
//!
//! ```text
//!  PathSink ──► [ input (cap = workers) ] ──► worker 0..N ──► [ output (cap = workers) ] ──► ResultSource
//!                                                 │
//!                                            supervisor: joins all workers, then releases the output
//! ```
//!
//! Results arrive in completion order, not submission order. A file that
//! cannot be read is reported through [`PipelineOptions::warn_handler`] (or a
//! `tracing` error event) and produces no result; its worker moves on.
//!
//! Because both ends are bounded, the producer and the consumer must run on
//! different threads once more than `2 * workers` paths are involved.
//! [`digest_all`] does that for you.

use crate::digest::{Digest, digest};
use crate::error::{Error, Result};
use crate::options::PipelineOptions;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Digest of one successfully hashed file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HashResult {
    /// Path as it was pushed onto the pipeline
    pub path: PathBuf,
    /// Digest of the file's contents
    pub digest: Digest,
}

/// Input side of a running pipeline.
///
/// Dropping the sink (or calling [`PathSink::close`]) signals end of input.
/// Once the workers have drained the remaining paths, the paired
/// [`ResultSource`] terminates.
#[derive(Debug)]
pub struct PathSink {
    inner: Sender<PathBuf>,
}

impl PathSink {
    /// Push a path to be hashed, blocking while the input queue is full.
    ///
    /// # Errors
    ///
    /// Returns the path back if every worker has already stopped, which only
    /// happens after the [`ResultSource`] was dropped.
    pub fn send(&self, path: impl Into<PathBuf>) -> std::result::Result<(), PathBuf> {
        self.inner.send(path.into()).map_err(|e| e.into_inner())
    }

    /// Signal that no more paths will be pushed.
    pub fn close(self) {
        drop(self);
    }
}

/// Output side of a running pipeline.
///
/// Iterating yields results until all workers have finished and the output
/// has been closed. The source is not reusable afterwards.
#[derive(Debug)]
pub struct ResultSource {
    inner: Receiver<HashResult>,
}

impl ResultSource {
    /// Block until the next result arrives, or return `None` once the
    /// pipeline has finished.
    pub fn recv(&self) -> Option<HashResult> {
        self.inner.recv().ok()
    }
}

impl Iterator for ResultSource {
    type Item = HashResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Start a pipeline with `workers` hashing threads.
///
/// A `workers` value of 0 is resolved to the number of available CPUs at
/// call time.
///
/// # Errors
///
/// Returns [`Error::Spawn`] if a worker or supervisor thread cannot be
/// started. Threads that were already started exit on their own.
///
/// # Example
///
/// ```no_run
/// use flatcopy::start_pipeline;
/// use std::thread;
///
/// let (sink, results) = start_pipeline(0)?;
/// thread::spawn(move || {
///     for path in ["a.jpg", "b.jpg"] {
///         let _ = sink.send(path);
///     }
/// });
/// for result in results {
///     println!("{}  {}", result.digest, result.path.display());
/// }
/// # Ok::<(), flatcopy::Error>(())
/// ```
pub fn start_pipeline(workers: usize) -> Result<(PathSink, ResultSource)> {
    start_pipeline_with(&PipelineOptions::default().with_workers(workers))
}

/// Start a pipeline configured by `options`.
///
/// See [`start_pipeline`].
pub fn start_pipeline_with(options: &PipelineOptions) -> Result<(PathSink, ResultSource)> {
    let workers = options.resolved_workers();
    tracing::debug!(workers, "starting digest pipeline");

    let (path_tx, path_rx) = bounded::<PathBuf>(workers);
    let (result_tx, result_rx) = bounded::<HashResult>(workers);

    let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers);
    for index in 0..workers {
        let paths = path_rx.clone();
        let results = result_tx.clone();
        let worker_options = options.clone();
        let handle = thread::Builder::new()
            .name(format!("flatcopy-digest-{index}"))
            .spawn(move || run_worker(&paths, &results, &worker_options))
            .map_err(|source| Error::Spawn { source })?;
        handles.push(handle);
    }
    drop(path_rx);

    let supervisor_options = options.clone();
    thread::Builder::new()
        .name("flatcopy-digest-supervisor".to_owned())
        .spawn(move || supervise(handles, result_tx, &supervisor_options))
        .map_err(|source| Error::Spawn { source })?;

    Ok((
        PathSink { inner: path_tx },
        ResultSource { inner: result_rx },
    ))
}

/// Hash every path in `paths` through a pipeline and collect the results.
///
/// Paths are fed from a scoped producer thread while the calling thread
/// drains the output. Files that fail are reported and left out, so the
/// returned vector may be shorter than the input.
pub fn digest_all<I, P>(paths: I, options: &PipelineOptions) -> Result<Vec<HashResult>>
where
    I: IntoIterator<Item = P> + Send,
    P: AsRef<Path>,
{
    let (sink, results) = start_pipeline_with(options)?;

    let collected = thread::scope(|scope| {
        scope.spawn(move || {
            for path in paths {
                if sink.send(path.as_ref()).is_err() {
                    break;
                }
            }
            sink.close();
        });
        results.collect::<Vec<_>>()
    });

    Ok(collected)
}

fn run_worker(paths: &Receiver<PathBuf>, results: &Sender<HashResult>, options: &PipelineOptions) {
    for path in paths {
        match digest(&path) {
            Ok(digest) => {
                if results.send(HashResult { path, digest }).is_err() {
                    // Consumer is gone, nobody will read further results
                    return;
                }
            }
            Err(e) => options.warn(&format!("Error calculating md5 sum: {e}")),
        }
    }
}

fn supervise(handles: Vec<JoinHandle<()>>, results: Sender<HashResult>, options: &PipelineOptions) {
    for handle in handles {
        if handle.join().is_err() {
            options.warn("Digest worker panicked");
        }
    }
    // Last sender: the output closes here, after every worker has drained the input.
    drop(results);
}
