//! JSON output mode.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{HELLO_MD5, TestFixture, WORLD_MD5};
use serde_json::Value;

fn parse_stdout(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).unwrap()
}

#[test]
fn test_md5_json() {
    let fx = TestFixture::new();
    let a = fx.write_src("a.txt", "hello");
    let b = fx.write_src("b.txt", "world");

    let output = cargo_bin_cmd!("fcp")
        .args(["--output", "json", "md5"])
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert_eq!(json["schema_version"], "1.0");
    assert_eq!(json["mode"], "md5");
    assert_eq!(json["failed"], 0);

    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let mut digests: Vec<&str> = items
        .iter()
        .map(|item| item["digest"].as_str().unwrap())
        .collect();
    digests.sort();
    assert_eq!(digests, vec![HELLO_MD5, WORLD_MD5]);
}

#[test]
fn test_md5_json_reports_failures() {
    let fx = TestFixture::new();
    let a = fx.write_src("a.txt", "hello");

    let output = cargo_bin_cmd!("fcp")
        .args(["md5", "--output", "json"])
        .arg(&a)
        .arg(fx.src.path().join("gone.txt"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json = parse_stdout(&output);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[test]
fn test_copy_json_decisions() {
    let fx = TestFixture::new();
    let src = fx.write_src("a.txt", "hello");
    let dst = fx.dst.path().join("a.txt");

    let run = || {
        let output = cargo_bin_cmd!("fcp")
            .args(["--output", "json", "copy"])
            .arg(&src)
            .arg(&dst)
            .output()
            .unwrap();
        assert!(output.status.success());
        parse_stdout(&output)
    };

    let first = run();
    assert_eq!(first["mode"], "copy");
    assert_eq!(first["outcome"]["decision"], "create");
    assert_eq!(first["outcome"]["bytes"], 5);

    let second = run();
    assert_eq!(second["outcome"]["decision"], "skip_identical");
    assert_eq!(second["outcome"]["bytes"], 0);
}

#[test]
fn test_copy_json_rename_target() {
    let fx = TestFixture::new();
    let src = fx.write_src("a.txt", "hello");
    let dst = fx.write_dst("a.txt", "world");

    let output = cargo_bin_cmd!("fcp")
        .args(["--output", "json", "copy"])
        .arg(&src)
        .arg(&dst)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert_eq!(json["outcome"]["decision"], "rename_and_copy");
    assert!(
        json["outcome"]["target"]
            .as_str()
            .unwrap()
            .ends_with("a-7d793.txt")
    );
}

#[test]
fn test_flatten_json_stats() {
    let fx = TestFixture::new();
    fx.write_src("x/a.jpg", "hello");
    fx.write_src("y/a.jpg", "world");
    fx.write_src("z/a.jpg", "hello");
    fx.write_src("z/skip.txt", "nope");

    let output = cargo_bin_cmd!("fcp")
        .args(["--output", "json", "flatten"])
        .arg(fx.src.path())
        .arg(fx.dst.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert_eq!(json["mode"], "flatten");
    assert!(json["archives"].is_null());

    let stats = &json["stats"];
    assert_eq!(stats["files_matched"], 3);
    assert_eq!(stats["files_created"], 1);
    assert_eq!(stats["files_renamed"], 1);
    assert_eq!(stats["files_skipped"], 1);
    assert_eq!(stats["files_failed"], 0);
    assert_eq!(stats["bytes_copied"], 10);
    assert!(stats["duration_ms"].is_u64());
}
