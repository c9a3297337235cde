//! Recognizing license files by name.

use std::path::Path;

const LICENSE_PREFIXES: &[&str] =
    &["licence", "license", "copying", "notice", "patents", "unlicense", "copyright", "legal"];

/// Whether `file_name` looks like licensing information.
///
/// Case-insensitive prefix match, so `LICENSE`, `License.md`, `COPYING.LESSER`
/// and `NOTICE.txt` all qualify.
pub fn is_license_file(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    LICENSE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Whether `dir` directly contains at least one license file.
pub fn has_license_file(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|t| !t.is_dir()))
            .any(|e| e.file_name().to_str().is_some_and(is_license_file))
    })
}
