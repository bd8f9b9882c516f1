//! End-to-end runs of the `sproxy` binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn sproxy(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sproxy"))
        .args(args)
        .output()
        .expect("failed to run sproxy")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_emit_writes_package_layout() {
    let out = tempfile::tempdir().unwrap();
    let basic = fixture("basic.toml");
    let args = ["emit", path_str(&basic), "--out-dir", path_str(out.path())];

    let first = sproxy(&args);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert!(stdout(&first).contains("Emitted 2 class(es), 0 unchanged"));

    let adder = out.path().join("chaquopy/test/static_proxy/basic/BasicAdder.class");
    let bytes = std::fs::read(&adder).unwrap();
    assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
    assert!(out.path().join("demo/Greeter.class").is_file());

    let second = sproxy(&args);
    assert!(second.status.success());
    assert!(stdout(&second).contains("Emitted 0 class(es), 2 unchanged"));
    assert_eq!(std::fs::read(&adder).unwrap(), bytes);
}

#[test]
fn test_emit_reports_each_failure() {
    let out = tempfile::tempdir().unwrap();
    let broken = fixture("broken.toml");
    let output = sproxy(&["emit", path_str(&broken), "-o", path_str(out.path())]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Broken"), "{}", stderr);
    assert!(stderr.contains("1 declaration(s) failed"), "{}", stderr);
    assert!(out
        .path()
        .join("chaquopy/test/static_proxy/broken/Fine.class")
        .is_file());
}

#[test]
fn test_json_summary() {
    let output = sproxy(&["json", path_str(&fixture("basic.toml"))]);
    assert!(output.status.success());

    let summaries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let classes = summaries.as_array().unwrap();
    assert_eq!(classes.len(), 2);
    assert_eq!(classes[0]["name"], "BasicAdder");
    assert_eq!(classes[0]["package"], "chaquopy.test.static_proxy.basic");
    assert_eq!(classes[1]["package"], "demo");
}

#[test]
fn test_java_stubs() {
    let output = sproxy(&["java", path_str(&fixture("basic.toml"))]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("package chaquopy.test.static_proxy.basic;"));
    assert!(text.contains("public class BasicAdder"));

    let out = tempfile::tempdir().unwrap();
    let output = sproxy(&["java", path_str(&fixture("basic.toml")), "-o", path_str(out.path())]);
    assert!(output.status.success());
    assert!(out.path().join("demo/Greeter.java").is_file());
}

#[test]
fn test_inspect_emitted_class() {
    let out = tempfile::tempdir().unwrap();
    let basic = fixture("basic.toml");
    assert!(sproxy(&["emit", path_str(&basic), "-o", path_str(out.path())])
        .status
        .success());

    let class = out.path().join("chaquopy/test/static_proxy/basic/BasicAdder.class");
    let output = sproxy(&["inspect", path_str(&class)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("class chaquopy/test/static_proxy/basic/BasicAdder (version 52.0)"));
    assert!(text.contains("implements sproxy/runtime/StaticProxy"));
    assert!(text.contains("source basic.py"));
    assert!(text.contains("add(I)I [public]"));
    assert!(text.contains("\"add(I)I\""));
    assert!(text.contains("sha256 "));

    let garbage = out.path().join("garbage.class");
    std::fs::write(&garbage, b"not a class").unwrap();
    let output = sproxy(&["inspect", path_str(&garbage)]);
    assert!(!output.status.success());
}
