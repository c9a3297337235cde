//! vndr - vendoring for Go import paths
//!
//! vndr pins the external dependencies of a Go project in a plain-text
//! `vendor.conf`, fetches each of them into `vendor/` at the pinned revision
//! and then prunes `vendor/` down to the packages the project actually
//! imports.
//!
//! # Architecture Overview
//!
//! A full run goes through these stages:
//!
//! 1. [`manifest`] parses `vendor.conf` into [`manifest::DependencyEntry`] values
//! 2. [`resolver`] checks that every entry names a repository root and writes
//!    a corrected `vendor.conf.tmp` when it does not
//! 3. [`installer`] fetches all entries through a [`source::Fetcher`] under a
//!    concurrency ceiling, retrying each one independently
//! 4. [`collector`] walks the import graph from the project's own packages
//!    into `vendor/` and returns the package closure
//! 5. [`cleaner`] removes everything outside the closure, keeping license
//!    files and whitelisted paths, and reports unused or unlicensed entries
//!
//! `vndr init` replaces stages 1 to 3 with on-demand fetching during the
//! graph walk and writes the discovered roots to a fresh `vendor.conf`.
//! `--gomod` hands the fetched set to `go mod vendor` instead ([`manifest::gomod`]).
//!
//! # Config Format (vendor.conf)
//!
//! ```text
//! # comment
//! github.com/pkg/errors           v0.8.0
//! golang.org/x/net                a6577fac   https://github.com/golang/net.git
//! ```
//!
//! Each line holds an import path, a revision and an optional repository
//! location overriding the one derived from the import path.
//!
//! # Core Modules
//!
//! - [`cli`] - argument parsing and the vendoring pipeline
//! - [`core`] - error types and the warning collector
//! - [`constants`] - file names, limits and timeouts
//!
//! ## Dependency Handling
//! - [`manifest`] - `vendor.conf` parsing, writing and `go.mod` rendering
//! - [`resolver`] - repository root lookup and config validation
//! - [`installer`] - concurrent fetching with retries
//! - [`source`] - the [`source::Fetcher`] abstraction
//! - [`git`] - git-backed fetcher using the system git command
//!
//! ## Vendor Tree
//! - [`collector`] - Go package loading and import closure
//! - [`cleaner`] - pruning and license checks
//! - [`utils`] - filesystem helpers

// Core functionality modules
pub mod cli;
pub mod constants;
pub mod core;

// Dependency handling
pub mod git;
pub mod installer;
pub mod manifest;
pub mod resolver;
pub mod source;

// Vendor tree
pub mod cleaner;
pub mod collector;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
