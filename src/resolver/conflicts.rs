//! Detection and merging of misrooted or conflicting dependency entries.

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

use crate::core::{VndrError, Warnings};
use crate::manifest::{DependencyEntry, write_config};
use crate::resolver::RootResolver;

/// Outcome of grouping entries by repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootCheck {
    /// Rewritten entries, one per root, in first-seen root order.
    pub entries: Vec<DependencyEntry>,
    /// Whether any entry had to be rewritten or merged.
    pub invalid: bool,
}

impl RootResolver {
    /// Group `entries` by repository root and rewrite every group that breaks
    /// the one-entry-per-root rule.
    ///
    /// - A single entry that is not its own root is rewritten to the root,
    ///   keeping revision and override.
    /// - Several entries sharing a root become one merged entry (see
    ///   [`merge_group`]).
    ///
    /// A warning is recorded for each rewritten group.
    pub async fn check_roots(
        &mut self,
        entries: &[DependencyEntry],
        warnings: &Warnings,
    ) -> Result<RootCheck> {
        let mut groups: HashMap<String, Vec<DependencyEntry>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for entry in entries {
            let root = self.resolve_root(&entry.import_path).await?;
            if !groups.contains_key(&root) {
                order.push(root.clone());
            }
            groups.entry(root).or_default().push(entry.clone());
        }

        let mut rewritten = Vec::with_capacity(order.len());
        let mut invalid = false;
        for root in order {
            let group = &groups[&root];
            if let [single] = group.as_slice() {
                if single.import_path == root {
                    rewritten.push(single.clone());
                } else {
                    warnings.warn(format!(
                        "package {} is not root import, should be {}",
                        single.import_path, root
                    ));
                    invalid = true;
                    rewritten.push(DependencyEntry {
                        import_path: root,
                        ..single.clone()
                    });
                }
                continue;
            }

            invalid = true;
            let paths: Vec<&str> = group.iter().map(|d| d.import_path.as_str()).collect();
            warnings.warn(format!("packages '{}' has same root import {}", paths.join(", "), root));
            rewritten.push(merge_group(&root, group));
        }

        Ok(RootCheck {
            entries: rewritten,
            invalid,
        })
    }
}

/// Merge entries sharing `root` into one entry.
///
/// The revision comes from the first entry; the override is the first
/// non-empty override in group order.
pub fn merge_group(root: &str, group: &[DependencyEntry]) -> DependencyEntry {
    DependencyEntry {
        import_path: root.to_string(),
        revision: group.first().map(|d| d.revision.clone()).unwrap_or_default(),
        repo_override: group
            .iter()
            .find(|d| !d.repo_override.is_empty())
            .map(|d| d.repo_override.clone())
            .unwrap_or_default(),
    }
}

/// Validate declared entries against their repository roots.
///
/// A clean configuration returns `Ok(())` and the caller keeps using its
/// entries unchanged. Otherwise the rewritten list is written to `suggestion`
/// (never applied) and [`VndrError::ValidationFailed`] is returned.
pub async fn validate_deps(
    resolver: &mut RootResolver,
    entries: &[DependencyEntry],
    suggestion: &Path,
    warnings: &Warnings,
) -> Result<()> {
    let check = resolver.check_roots(entries, warnings).await?;
    if !check.invalid {
        return Ok(());
    }

    write_config(suggestion, &check.entries)?;
    warnings.warn(format!(
        "suggested vendor.conf is written to {}, use diff and common sense before using it",
        suggestion.display()
    ));
    Err(VndrError::ValidationFailed {
        suggestion: suggestion.display().to_string(),
    }
    .into())
}
