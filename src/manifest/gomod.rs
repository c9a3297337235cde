//! `go.mod` emission for `--gomod` runs.
//!
//! Instead of fetching dependencies itself, a `--gomod` run renders a
//! temporary `go.mod` whose `replace` block pins every declared dependency,
//! lets `go mod vendor` populate `vendor/`, and removes the generated
//! `go.mod`/`go.sum` again.

use anyhow::{Context, Result};
use std::path::Path;
use tera::{Context as TeraContext, Tera};
use tokio::process::Command;

use crate::core::VndrError;
use crate::manifest::DependencyEntry;

const GOMOD_TEMPLATE: &str = "module {{ module_path }}
{% if deps %}
replace (
{%- for dep in deps %}
\t{{ dep.import_path }} => {{ dep.target }} {{ dep.revision }}
{%- endfor %}
)
{% endif %}
";

/// Render the temporary module manifest.
///
/// Each dependency is replaced by its override location when one is set and
/// by itself otherwise, at the pinned revision.
pub fn render_gomod(module_path: &str, deps: &[DependencyEntry]) -> Result<String> {
    let rows: Vec<_> = deps
        .iter()
        .map(|d| {
            let mut row = std::collections::BTreeMap::new();
            row.insert("import_path", d.import_path.clone());
            row.insert("target", d.repo_override().unwrap_or(&d.import_path).to_string());
            row.insert("revision", d.revision.clone());
            row
        })
        .collect();

    let mut ctx = TeraContext::new();
    ctx.insert("module_path", module_path);
    ctx.insert("deps", &rows);

    Tera::one_off(GOMOD_TEMPLATE, &ctx, false).context("Failed to render go.mod template")
}

/// Check that the installed Go toolchain understands modules.
pub async fn ensure_gomod_available() -> Result<()> {
    if which::which("go").is_err() {
        return Err(VndrError::GoModUnavailable.into());
    }
    let status = Command::new("go")
        .args(["help", "mod"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .context("Failed to run 'go help mod'")?;
    if !status.success() {
        return Err(VndrError::GoModUnavailable.into());
    }
    Ok(())
}

/// Vendor through `go mod vendor` using a generated `go.mod`.
pub async fn gomod_vendor(
    project_dir: &Path,
    module_path: &str,
    deps: &[DependencyEntry],
    verbose: bool,
) -> Result<()> {
    let gomod_path = project_dir.join("go.mod");
    let manifest = render_gomod(module_path, deps)?;
    std::fs::write(&gomod_path, &manifest)
        .with_context(|| format!("Failed to write {}", gomod_path.display()))?;

    let mut args = vec!["mod", "vendor"];
    if verbose {
        args.push("-v");
    }
    tracing::info!("Running go {}", args.join(" "));
    let status = Command::new("go")
        .args(&args)
        .current_dir(project_dir)
        .status()
        .await
        .context("Failed to run 'go mod vendor'")?;
    if !status.success() {
        return Err(anyhow::anyhow!("'go mod vendor' exited with {status}"));
    }

    if verbose {
        print!("{manifest}");
    }
    let _ = std::fs::remove_file(&gomod_path);
    let _ = std::fs::remove_file(project_dir.join("go.sum"));
    Ok(())
}
