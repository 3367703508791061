//! Name collision handling: identical files are skipped, different files are
//! kept side by side under a content-derived name.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use rstest::rstest;

#[test]
fn test_copy_identical_is_skipped() {
    let fx = TestFixture::new();
    let src = fx.write_src("a.txt", "hello");
    let dst = fx.write_dst("a.txt", "hello");

    cargo_bin_cmd!("fcp")
        .arg("copy")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Identical"));

    assert_eq!(fx.dst_names(), vec!["a.txt"]);
    fx.assert_file_content(&dst, "hello");
}

#[test]
fn test_copy_different_is_renamed() {
    let fx = TestFixture::new();
    let src = fx.write_src("a.txt", "hello");
    let dst = fx.write_dst("a.txt", "world");

    cargo_bin_cmd!("fcp")
        .arg("copy")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("a-7d793.txt"));

    // Existing file untouched, source content lands under the derived name
    fx.assert_file_content(&dst, "world");
    fx.assert_file_content(&fx.dst.path().join("a-7d793.txt"), "hello");
}

#[test]
fn test_copy_repeated_is_idempotent() {
    let fx = TestFixture::new();
    let src = fx.write_src("a.txt", "hello");
    fx.write_dst("a.txt", "world");

    for _ in 0..3 {
        cargo_bin_cmd!("fcp")
            .arg("copy")
            .arg(&src)
            .arg(fx.dst.path())
            .assert()
            .success();
    }

    assert_eq!(fx.dst_names(), vec!["a-7d793.txt", "a.txt"]);
}

#[rstest]
#[case("photo.jpg", "photo-7d793.jpg")]
#[case("README", "README-7d793")]
#[case("archive.tar.gz", "archive.tar-7d793.gz")]
fn test_derived_name_shape(#[case] name: &str, #[case] expected: &str) {
    let fx = TestFixture::new();
    let src = fx.write_src(name, "hello");
    fx.write_dst(name, "world");

    cargo_bin_cmd!("fcp")
        .arg("copy")
        .arg(&src)
        .arg(fx.dst.path())
        .assert()
        .success();

    fx.assert_file_content(&fx.dst.path().join(expected), "hello");
}

#[test]
fn test_flatten_same_name_in_different_folders() {
    let fx = TestFixture::new();
    fx.write_src("one/a.jpg", "hello");
    fx.write_src("two/a.jpg", "world");
    fx.write_src("three/a.jpg", "hello");

    cargo_bin_cmd!("fcp")
        .arg("flatten")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .assert()
        .success();

    // Sorted walk: one/ is copied, three/ matches it, two/ is renamed
    let names = fx.dst_names();
    assert_eq!(names, vec!["a-5d414.jpg", "a.jpg"]);
    fx.assert_file_content(&fx.dst.path().join("a.jpg"), "hello");
    fx.assert_file_content(&fx.dst.path().join("a-5d414.jpg"), "world");
}

#[test]
fn test_flatten_twice_copies_nothing_new() {
    let fx = TestFixture::new();
    fx.write_src("x/a.jpg", "hello");
    fx.write_src("y/a.jpg", "world");

    cargo_bin_cmd!("fcp")
        .arg("flatten")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .assert()
        .success();
    let first = fx.dst_names();

    cargo_bin_cmd!("fcp")
        .arg("flatten")
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already present"));

    assert_eq!(fx.dst_names(), first);
}
