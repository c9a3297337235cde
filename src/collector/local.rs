//! Scan of the project's own packages, the starting set of the import graph.

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::constants::VENDOR_DIR;
use crate::utils::slash_relative;

use super::package::{GoPackage, PackageLoadError, is_go_source, is_go_test_source, load_package, load_test_header};

/// Load every Go package of the project rooted at `project_dir`.
///
/// Each package's import path is `project_import_path` joined with its
/// directory relative to the project root. `vendor/`, `testdata` and
/// directories starting with `_` or `.` are not descended into. Directories
/// whose files disagree on the package name still contribute their imports.
/// Imports of `_test.go` files are recorded as test imports, so dependencies
/// used only by the project's tests are vendored too.
pub fn collect_local_packages(project_dir: &Path, project_import_path: &str) -> Result<Vec<GoPackage>> {
    let vendor = project_dir.join(VENDOR_DIR);
    let mut packages = Vec::new();

    let walker = WalkDir::new(project_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry, &vendor));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", project_dir.display()))?;
        if !entry.file_type().is_dir() || !has_go_sources(entry.path()) {
            continue;
        }

        let rel = slash_relative(project_dir, entry.path()).unwrap_or_default();
        let import_path = if rel.is_empty() {
            project_import_path.to_string()
        } else if project_import_path.is_empty() {
            rel
        } else {
            format!("{project_import_path}/{rel}")
        };

        let tests = load_test_header(entry.path())
            .with_context(|| format!("Failed to load tests of package {import_path}"))?;
        let test_imports = tests.as_ref().map(|t| t.imports.clone()).unwrap_or_default();

        let package = match load_package(&import_path, entry.path()) {
            Ok(package) => package,
            Err(PackageLoadError::MultiplePackages {
                package,
                names,
            }) => {
                tracing::debug!("{} holds packages {}, using all imports", import_path, names.join(", "));
                package
            }
            Err(PackageLoadError::NoGoFiles {
                ..
            }) => match tests {
                // test-only directory
                Some(tests) => GoPackage {
                    import_path: import_path.clone(),
                    dir: entry.path().to_path_buf(),
                    name: tests.name,
                    ..GoPackage::default()
                },
                None => continue,
            },
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to load package {import_path}"));
            }
        };
        packages.push(GoPackage {
            test_imports,
            ..package
        });
    }

    tracing::debug!("Collected {} local packages", packages.len());
    Ok(packages)
}

fn is_skipped_dir(entry: &DirEntry, vendor: &Path) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    if entry.path() == vendor {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    name == "testdata" || name.starts_with('_') || name.starts_with('.')
}

fn has_go_sources(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_str().is_some_and(|n| is_go_source(n) || is_go_test_source(n)))
    })
}
