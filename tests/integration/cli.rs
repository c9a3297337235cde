use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use crate::vndr_cmd;

#[test]
fn test_help_lists_flags() {
    let temp = TempDir::new().unwrap();
    vndr_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--whitelist"))
        .stdout(predicate::str::contains("--gomod"))
        .stdout(predicate::str::contains("--import-path"));
}

#[test]
fn test_too_many_arguments() {
    let temp = TempDir::new().unwrap();
    vndr_cmd(temp.path())
        .args(["github.com/a/b", "v1", "https://example.com/b.git", "extra"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("expected at most 3 arguments, got 4"));
}

#[test]
fn test_init_takes_no_arguments() {
    let temp = TempDir::new().unwrap();
    vndr_cmd(temp.path())
        .args(["init", "github.com/a/b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("init takes no arguments"));
}

#[test]
fn test_init_unsupported_with_gomod_env() {
    let temp = TempDir::new().unwrap();
    vndr_cmd(temp.path())
        .env("VNDR_GOMOD", "1")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("init unsupported with --gomod"));
}

#[test]
fn test_gomod_env_false_still_enables_gomod() {
    let temp = TempDir::new().unwrap();
    vndr_cmd(temp.path())
        .env("VNDR_GOMOD", "false")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("init unsupported with --gomod"));
}

#[test]
fn test_gomod_env_zero_disables_gomod() {
    let temp = TempDir::new().unwrap();
    vndr_cmd(temp.path())
        .env("VNDR_GOMOD", "0")
        .args(["--import-path", "example.com/me/proj", "init"])
        .assert()
        .stderr(predicate::str::contains("init unsupported with --gomod").not());
}

#[test]
fn test_init_refuses_existing_config() {
    if !vndr::git::is_git_installed() {
        return;
    }
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("vendor.conf"), "github.com/pkg/errors v0.8.0\n").unwrap();

    vndr_cmd(temp.path())
        .args(["--import-path", "example.com/me/proj", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("There must not be vendor dir and vendor.conf file for initialization"));
    assert_eq!(fs::read_to_string(temp.path().join("vendor.conf")).unwrap(), "github.com/pkg/errors v0.8.0\n");
}

#[test]
fn test_invalid_whitelist_is_reported() {
    if !vndr::git::is_git_installed() {
        return;
    }
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("vendor.conf"), "github.com/pkg/errors v0.8.0\n").unwrap();

    vndr_cmd(temp.path())
        .args(["--import-path", "example.com/me/proj", "--whitelist", "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid whitelist pattern \"(unclosed\""));
    assert!(!temp.path().join("vendor").exists());
}
