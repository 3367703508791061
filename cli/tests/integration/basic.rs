//! Basic functionality integration tests for the fcp CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{EMPTY_MD5, HELLO_MD5, TestFixture, WORLD_MD5};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_md5_single_file() {
    let fx = TestFixture::new();
    let file = fx.write_src("hello.txt", "hello");

    cargo_bin_cmd!("fcp")
        .arg("md5")
        .arg("-q")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "{HELLO_MD5}  {}",
            file.display()
        )));
}

#[test]
fn test_md5_many_files_with_jobs() {
    let fx = TestFixture::new();
    let mut files = Vec::new();
    for i in 0..20 {
        files.push(fx.write_src(&format!("f{i}.txt"), if i % 2 == 0 { "hello" } else { "world" }));
    }

    let output = cargo_bin_cmd!("fcp")
        .args(["md5", "-q", "-j", "3"])
        .args(&files)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 20);
    assert_eq!(stdout.matches(HELLO_MD5).count(), 10);
    assert_eq!(stdout.matches(WORLD_MD5).count(), 10);
}

#[test]
fn test_md5_with_progress_bar() {
    let fx = TestFixture::new();
    let files: Vec<_> = (0..5)
        .map(|i| fx.write_src(&format!("p{i}.txt"), "hello"))
        .collect();

    let output = cargo_bin_cmd!("fcp").arg("md5").args(&files).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 5);
    assert!(stdout.lines().all(|line| line.starts_with(HELLO_MD5)));
}

#[test]
fn test_md5_empty_file() {
    let fx = TestFixture::new();
    let file = fx.write_src("empty.bin", "");

    cargo_bin_cmd!("fcp")
        .args(["md5", "-q"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(EMPTY_MD5));
}

#[test]
fn test_copy_to_missing_destination() {
    let fx = TestFixture::new();
    let src = fx.write_src("a.txt", "hello");
    let dst = fx.dst.path().join("a.txt");

    cargo_bin_cmd!("fcp")
        .arg("copy")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied"));

    fx.assert_file_content(&dst, "hello");
}

#[test]
fn test_copy_into_existing_directory() {
    let fx = TestFixture::new();
    let src = fx.write_src("photo.jpg", "pixels");

    cargo_bin_cmd!("fcp")
        .arg("copy")
        .arg(&src)
        .arg(fx.dst.path())
        .assert()
        .success();

    fx.assert_file_content(&fx.dst.path().join("photo.jpg"), "pixels");
}

#[test]
fn test_flatten_nested_tree() {
    let fx = TestFixture::new();
    fx.write_src("2019/jan/a.jpg", "a");
    fx.write_src("2019/feb/b.png", "b");
    fx.write_src("2020/c.gif", "c");
    fx.write_src("2020/notes.txt", "not an image");

    cargo_bin_cmd!("fcp")
        .arg("flatten")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Flatten completed"));

    assert_eq!(fx.dst_names(), vec!["a.jpg", "b.png", "c.gif"]);
}

#[test]
fn test_flatten_creates_destination() {
    let fx = TestFixture::new();
    fx.write_src("deep/x.jpg", "x");
    let dest = fx.dst.path().join("new").join("inbox");

    cargo_bin_cmd!("fcp")
        .arg("flatten")
        .arg(fx.src.path())
        .arg(&dest)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(dest.join("x.jpg")).unwrap(), "x");
}

#[test]
fn test_help() {
    cargo_bin_cmd!("fcp")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("flatten"))
        .stdout(predicate::str::contains("md5"));
}

#[test]
fn test_version() {
    cargo_bin_cmd!("fcp")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fcp"));
}
