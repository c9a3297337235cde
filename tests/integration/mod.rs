//! Integration test suite for vndr
//!
//! End-to-end tests that run the `vndr` binary against temporary projects.
//! None of them reach the network: failures are triggered before any fetch,
//! and root validation only involves hosts with a fixed root layout.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: argument handling, exit status and error reporting
//! - **validation**: `vendor.conf` parsing and root validation

use assert_cmd::Command;
use std::path::Path;

mod cli;
mod validation;

/// `vndr` command running in `project_dir` with a predictable environment.
pub fn vndr_cmd(project_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vndr").unwrap();
    cmd.current_dir(project_dir)
        .env("NO_COLOR", "1")
        .env_remove("VNDR_GOMOD")
        .env_remove("RUST_LOG");
    cmd
}
