//! fcp - Flatten Copy
//!
//! Gather files from nested folders into one place without losing any of
//! them to name collisions. Powered by flatcopy.

mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use flatcopy::{
    ArchiveStats, CopyDecision, CopyOutcome, Error as FlatcopyError, ErrorCode, FlattenOptions,
    FlattenStats, HashResult, OnFailure, PipelineOptions, copy_file, create_progress_bar,
    expand_archives, flatten, start_pipeline_with,
};
use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;

use logging::LogConfig;

/// Default staging folder (inside SOURCE) for expanded archives
const DEFAULT_STAGING_DIR: &str = "extracted";

/// fcp - Flatten folders without losing files
///
/// Same-name files are compared by MD5: identical ones are skipped, different
/// ones are kept side by side as NAME-<hash>.EXT.
#[derive(Parser, Debug)]
#[command(name = "fcp", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Turn on debug logs
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Append logs to FILE instead of stderr
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    output: OutputMode,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate MD5 hashes of one or more files in parallel
    Md5 {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of hashing workers (0 = number of CPUs)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,

        /// Disable progress bar
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Copy one file, keeping both files if the destination name is taken
    Copy {
        /// Source file
        source: PathBuf,
        /// Destination file, or an existing directory to copy into
        dest: PathBuf,
    },

    /// Copy every matching file under SOURCE directly into DEST
    Flatten {
        /// Source directory
        source: PathBuf,
        /// Destination directory (created if missing)
        dest: PathBuf,

        /// Extension to include (repeatable, e.g. -e jpg -e .png)
        #[arg(short = 'e', long = "ext", value_name = "EXT")]
        extensions: Vec<String>,

        /// Predefined extension set (default: images, unless --ext is given)
        #[arg(short = 'p', long, value_enum)]
        preset: Option<Preset>,

        /// Continue with remaining files when one fails
        #[arg(short = 'k', long)]
        keep_going: bool,

        /// Expand zip archives under SOURCE before flattening
        #[arg(long)]
        unzip: bool,

        /// Folder for expanded archives (default: SOURCE/extracted)
        #[arg(long, value_name = "DIR")]
        staging: Option<PathBuf>,

        /// Keep the original case of file names
        #[arg(long)]
        keep_case: bool,
    },

    /// Expand all zip archives under SOURCE into a staging folder
    Unzip {
        /// Source directory
        source: PathBuf,

        /// Folder for expanded archives (default: SOURCE/extracted)
        #[arg(long, value_name = "DIR")]
        staging: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Images and documents (psd, pdf, png, gif, jpg, jpeg, tiff, nef, raw)
    Images,
    /// Videos (mov, avi)
    Videos,
    /// Images and videos
    Media,
    /// Every file
    All,
}

impl Preset {
    fn options(self) -> FlattenOptions {
        match self {
            Self::Images => FlattenOptions::images(),
            Self::Videos => FlattenOptions::videos(),
            Self::Media => FlattenOptions::media(),
            Self::All => FlattenOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to open log file: {path}: {source}")]
    LogFile { path: PathBuf, source: io::Error },

    #[error("Source has no filename: {path}")]
    SourceHasNoFilename { path: PathBuf },

    #[error("Failed to hash {failed} of {total} files")]
    PartialHash { failed: usize, total: usize },

    #[error("Failed to copy {failed} of {total} files")]
    PartialFlatten { failed: u64, total: u64 },

    #[error("{source}")]
    Flatcopy {
        #[from]
        source: FlatcopyError,
    },

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::SourceHasNoFilename { .. } => ErrorCode::InvalidInput,
            Self::LogFile { .. } => ErrorCode::IoError,
            Self::PartialHash { .. } => ErrorCode::HashFailure,
            Self::PartialFlatten { .. } => ErrorCode::IoError,
            Self::Flatcopy { source } => source.code(),
            Self::JsonSerialize { .. } => ErrorCode::Internal,
        }
    }
}

fn exit_code_for(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::InvalidInput => 2,
        _ => 1,
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error[{}]: {}", error.code(), error);
        std::process::exit(exit_code_for(error.code()));
    }
}

fn run() -> CliResult<()> {
    let args = Args::parse();

    let log_config = LogConfig::new(args.debug, args.log_file.clone());
    logging::init(&log_config).map_err(|source| CliError::LogFile {
        path: args.log_file.clone().unwrap_or_default(),
        source,
    })?;

    match args.command {
        Command::Md5 { files, jobs, quiet } => run_md5(&files, jobs, quiet, args.output),
        Command::Copy { source, dest } => run_copy(&source, &dest, args.output),
        Command::Flatten {
            source,
            dest,
            extensions,
            preset,
            keep_going,
            unzip,
            staging,
            keep_case,
        } => {
            let options = build_flatten_options(&extensions, preset, keep_going, keep_case);
            let archives = if unzip {
                let staging = staging.unwrap_or_else(|| source.join(DEFAULT_STAGING_DIR));
                Some(expand_archives(&source, &staging)?)
            } else {
                None
            };
            run_flatten(&source, &dest, &options, archives.as_ref(), args.output)
        }
        Command::Unzip { source, staging } => {
            let staging = staging.unwrap_or_else(|| source.join(DEFAULT_STAGING_DIR));
            let stats = expand_archives(&source, &staging)?;
            emit_archive_stats(&stats, &staging, args.output)
        }
    }
}

// =============================================================================
// md5
// =============================================================================

fn run_md5(files: &[PathBuf], jobs: usize, quiet: bool, output: OutputMode) -> CliResult<()> {
    let options = PipelineOptions::default().with_workers(jobs);
    let (sink, results) = start_pipeline_with(&options)?;

    let pb = (output == OutputMode::Human && !quiet)
        .then(|| create_progress_bar(files.len() as u64));

    let collected: Vec<HashResult> = thread::scope(|scope| {
        scope.spawn(move || {
            for file in files {
                if sink.send(file.as_path()).is_err() {
                    break;
                }
            }
            sink.close();
        });

        let mut collected = Vec::with_capacity(files.len());
        for result in results {
            match (&pb, output) {
                (Some(pb), OutputMode::Human) => {
                    pb.suspend(|| print_hash_line(&result));
                    pb.inc(1);
                }
                (None, OutputMode::Human) => print_hash_line(&result),
                _ => {}
            }
            collected.push(result);
        }
        collected
    });

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let failed = files.len().saturating_sub(collected.len());

    if output == OutputMode::Json {
        let payload = json!({
            "schema_version": "1.0",
            "mode": "md5",
            "items": to_json(&collected)?,
            "failed": failed,
        });
        print_json_value(&payload)?;
    }

    if failed > 0 {
        return Err(CliError::PartialHash {
            failed,
            total: files.len(),
        });
    }
    Ok(())
}

fn print_hash_line(result: &HashResult) {
    println!("{}  {}", result.digest, result.path.display());
}

// =============================================================================
// copy
// =============================================================================

fn run_copy(source: &Path, dest: &Path, output: OutputMode) -> CliResult<()> {
    let actual_dest = resolve_actual_destination_path(source, dest)?;
    let outcome = copy_file(source, &actual_dest)?;

    match output {
        OutputMode::Human => print_copy_outcome(source, &outcome),
        OutputMode::Json => {
            let payload = json!({
                "schema_version": "1.0",
                "mode": "copy",
                "source": display_path(source),
                "outcome": to_json(&outcome)?,
            });
            print_json_value(&payload)?;
        }
    }
    Ok(())
}

/// Copying into an existing directory keeps the source's file name.
fn resolve_actual_destination_path(src: &Path, dest: &Path) -> CliResult<PathBuf> {
    if dest.is_dir() {
        let filename = src
            .file_name()
            .ok_or_else(|| CliError::SourceHasNoFilename {
                path: src.to_path_buf(),
            })?;
        Ok(dest.join(filename))
    } else {
        Ok(dest.to_path_buf())
    }
}

fn print_copy_outcome(source: &Path, outcome: &CopyOutcome) {
    match outcome.decision {
        CopyDecision::Create => println!(
            "Copied {} -> {} ({})",
            source.display(),
            outcome.target.display(),
            format_bytes(outcome.bytes)
        ),
        CopyDecision::SkipIdentical => println!(
            "Identical file already at {}, nothing copied",
            outcome.target.display()
        ),
        CopyDecision::RenameAndCopy => println!(
            "Name taken by a different file, copied {} -> {} ({})",
            source.display(),
            outcome.target.display(),
            format_bytes(outcome.bytes)
        ),
    }
}

// =============================================================================
// flatten / unzip
// =============================================================================

fn build_flatten_options(
    extensions: &[String],
    preset: Option<Preset>,
    keep_going: bool,
    keep_case: bool,
) -> FlattenOptions {
    let base = match preset {
        Some(preset) => preset.options(),
        None if extensions.is_empty() => FlattenOptions::images(),
        None => FlattenOptions::default(),
    };
    // --preset all combined with --ext means "only these extensions"
    let mut options = base.with_extensions(extensions.iter().map(String::as_str));

    if keep_going {
        options = options.with_on_failure(OnFailure::Continue);
    }
    if keep_case {
        options = options.keep_case();
    }
    options
}

fn run_flatten(
    source: &Path,
    dest: &Path,
    options: &FlattenOptions,
    archives: Option<&ArchiveStats>,
    output: OutputMode,
) -> CliResult<()> {
    let stats = flatten(source, dest, options)?;

    match output {
        OutputMode::Human => {
            if let Some(archives) = archives {
                print_archive_stats(archives);
            }
            print_flatten_stats(&stats);
        }
        OutputMode::Json => {
            let payload = json!({
                "schema_version": "1.0",
                "mode": "flatten",
                "source": display_path(source),
                "destination": display_path(dest),
                "extensions": options.extensions.iter().collect::<Vec<_>>(),
                "archives": archives.map(|a| to_json(a)).transpose()?,
                "stats": flatten_stats_json(&stats),
            });
            print_json_value(&payload)?;
        }
    }

    if stats.files_failed > 0 {
        return Err(CliError::PartialFlatten {
            failed: stats.files_failed,
            total: stats.files_matched,
        });
    }
    Ok(())
}

fn flatten_stats_json(stats: &FlattenStats) -> Value {
    json!({
        "files_matched": stats.files_matched,
        "files_created": stats.files_created,
        "files_skipped": stats.files_skipped,
        "files_renamed": stats.files_renamed,
        "files_failed": stats.files_failed,
        "bytes_copied": stats.bytes_copied,
        "duration_ms": stats.duration.as_millis() as u64,
    })
}

fn print_flatten_stats(stats: &FlattenStats) {
    if stats.files_matched == 0 {
        println!("Nothing to copy");
        return;
    }
    if stats.files_created == 0 && stats.files_renamed == 0 && stats.files_failed == 0 {
        println!(
            "Nothing to copy ({} files already present)",
            stats.files_skipped
        );
        return;
    }

    println!("Flatten completed in {:?}", stats.duration);
    println!("  Files matched:  {}", stats.files_matched);
    println!("  Copied:         {}", stats.files_created);
    println!("  Renamed:        {}", stats.files_renamed);
    println!("  Identical:      {}", stats.files_skipped);
    if stats.files_failed > 0 {
        println!("  Failed:         {}", stats.files_failed);
    }
    println!("  Total size:     {}", format_bytes(stats.bytes_copied));
}

fn print_archive_stats(stats: &ArchiveStats) {
    println!(
        "Expanded {} archives ({} files, {} already present){}",
        stats.archives_expanded,
        stats.entries_written,
        stats.entries_skipped,
        if stats.archives_failed > 0 {
            format!(", {} failed", stats.archives_failed)
        } else {
            String::new()
        }
    );
}

fn emit_archive_stats(stats: &ArchiveStats, staging: &Path, output: OutputMode) -> CliResult<()> {
    match output {
        OutputMode::Human => {
            print_archive_stats(stats);
            Ok(())
        }
        OutputMode::Json => {
            let payload = json!({
                "schema_version": "1.0",
                "mode": "unzip",
                "staging": display_path(staging),
                "stats": to_json(stats)?,
            });
            print_json_value(&payload)
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value).map_err(|source| CliError::JsonSerialize { source })
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
