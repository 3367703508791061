//! Utility functions for the consolidating copy.
//!
//! This module contains the byte-copy primitive and the content-derived
//! naming used when a destination name is already taken.

use crate::digest::Digest;
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Number of destination digest hex characters appended to a renamed copy.
pub(crate) const COLLISION_SUFFIX_LEN: usize = 5;

// =============================================================================
// File content copying
// =============================================================================

/// Copy file contents from the current position of `src` into `dst`.
///
/// On Linux 4.5+, uses `copy_file_range` for zero-copy kernel-to-kernel transfer.
/// Falls back to `std::io::copy` on other platforms or on error.
pub(crate) fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        copy_file_range_all(src, dst, len)
    }
    #[cfg(not(target_os = "linux"))]
    {
        use std::io::BufReader;
        let _ = len; // unused on non-Linux
        io::copy(&mut BufReader::new(src), &mut &*dst)
    }
}

/// Linux-specific: copy using copy_file_range(2) syscall.
///
/// Data never enters userspace. Falls back to io::copy if the kernel or
/// filesystem refuses before any byte was transferred.
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    let src_fd = src.as_raw_fd();
    let dst_fd = dst.as_raw_fd();
    let mut remaining = len;
    let mut copied: u64 = 0;

    while remaining > 0 {
        // 128MB chunks
        let chunk_size = remaining.min(128 * 1024 * 1024) as usize;

        // SAFETY: both descriptors are valid for the lifetime of the borrows,
        // and null offsets make the kernel use and advance the file positions
        let result = unsafe {
            libc::copy_file_range(
                src_fd,
                std::ptr::null_mut(),
                dst_fd,
                std::ptr::null_mut(),
                chunk_size,
                0,
            )
        };

        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            // EXDEV: cross-device, ENOSYS: not supported, EINVAL: fs doesn't support it
            if copied == 0
                && matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV)
                        | Some(libc::ENOSYS)
                        | Some(libc::EINVAL)
                        | Some(libc::EOPNOTSUPP)
                )
            {
                use std::io::BufReader;
                return io::copy(&mut BufReader::new(src), &mut &*dst);
            }
            return Err(err);
        }

        if result == 0 {
            // EOF reached (file may have been truncated)
            break;
        }

        let bytes_copied = result as u64;
        copied += bytes_copied;
        remaining = remaining.saturating_sub(bytes_copied);
    }

    Ok(copied)
}

// =============================================================================
// Collision naming
// =============================================================================

/// Derive the path used when `dst` exists with different content.
///
/// `<dir>/<stem>.<ext>` becomes `<dir>/<stem>-<first 5 hex of digest>.<ext>`.
/// A name without an extension (including dotfiles such as `.bashrc`) gets
/// the suffix appended to the whole name.
pub(crate) fn collision_path(dst: &Path, dst_digest: &Digest) -> PathBuf {
    let suffix = dst_digest.hex_prefix(COLLISION_SUFFIX_LEN);

    let mut name: OsString = dst.file_stem().map(OsString::from).unwrap_or_default();
    name.push("-");
    name.push(&suffix);
    if let Some(ext) = dst.extension() {
        name.push(".");
        name.push(ext);
    }

    dst.with_file_name(name)
}

// =============================================================================
// Tests
// =============================================================================
