//! Content digests.
//!
//! A [`Digest`] is the 128-bit MD5 hash of a file's full contents. It is only
//! meaningful for the bytes the file held when it was computed; callers must
//! recompute it after the file changes.

use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Size of the read buffer used while streaming a file through the hasher.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// 128-bit content hash of a file.
///
/// Rendered as 32 lowercase hexadecimal characters. Two digests are equal
/// iff their hex forms are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 16]);

impl Digest {
    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 32;

    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        format!("{self:x}")
    }

    /// First `len` hex characters (clamped to [`Digest::HEX_LEN`]).
    pub fn hex_prefix(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.min(Self::HEX_LEN));
        hex
    }
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self:x})")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Compute the digest of the file at `path`.
///
/// The file is streamed through an incremental MD5 context, so memory use is
/// constant regardless of file size. The file is only read.
///
/// # Errors
///
/// Returns [`Error::HashFailure`] carrying `path` if the file cannot be
/// opened or a read fails part-way through.
///
/// # Example
///
/// ```no_run
/// use flatcopy::digest;
/// use std::path::Path;
///
/// let digest = digest(Path::new("photo.jpg"))?;
/// println!("{digest}");
/// # Ok::<(), flatcopy::Error>(())
/// ```
pub fn digest(path: &Path) -> Result<Digest> {
    let file = File::open(path).map_err(|e| Error::hash_failure(path, e))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

    let mut context = md5::Context::new();
    // md5::Context never fails as a writer, so any error here is a read error
    io::copy(&mut reader, &mut context).map_err(|e| Error::hash_failure(path, e))?;

    Ok(Digest(context.compute().0))
}
