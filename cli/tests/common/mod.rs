//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";
pub const WORLD_MD5: &str = "7d793037a0760186574b0282f2f435e7";
pub const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

/// A test fixture that provides source and destination directories.
pub struct TestFixture {
    pub src: TempDir,
    pub dst: TempDir,
}

impl TestFixture {
    /// Create a new test fixture with fresh source and destination directories.
    pub fn new() -> Self {
        Self {
            src: TempDir::new().expect("Failed to create temp source dir"),
            dst: TempDir::new().expect("Failed to create temp dest dir"),
        }
    }

    /// Write `content` to `relative` under the source directory, creating
    /// parent folders as needed.
    pub fn write_src(&self, relative: &str, content: &str) -> PathBuf {
        write_file(self.src.path(), relative, content)
    }

    /// Write `content` to `relative` under the destination directory.
    pub fn write_dst(&self, relative: &str, content: &str) -> PathBuf {
        write_file(self.dst.path(), relative, content)
    }

    /// Sorted file names directly inside the destination directory.
    pub fn dst_names(&self) -> Vec<String> {
        file_names(self.dst.path())
    }

    /// Check if a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &str) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read_to_string(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// Sorted names of the regular files directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
