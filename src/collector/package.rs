//! Loading Go packages from disk.
//!
//! Only the file header is read: the `package` clause and the `import`
//! declarations that follow it. Parsing stops at the first other declaration,
//! which keeps loading cheap even for large vendored repositories.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// A Go package: one directory of non-test `.go` files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoPackage {
    /// Import path the package was loaded as.
    pub import_path: String,
    /// Directory holding the package sources.
    pub dir: PathBuf,
    /// Package name from the `package` clause.
    pub name: String,
    /// Direct imports, sorted and de-duplicated; `C` is omitted.
    pub imports: Vec<String>,
    /// Imports of the `_test.go` files. Only filled for the project's own
    /// packages; vendored tests are never built.
    pub test_imports: Vec<String>,
}

impl GoPackage {
    /// Imports and test imports together.
    pub fn all_imports(&self) -> impl Iterator<Item = &String> {
        self.imports.iter().chain(&self.test_imports)
    }
}

/// Why a directory could not be loaded as a single package.
#[derive(Debug)]
pub enum PackageLoadError {
    /// The directory has no buildable `.go` files (or does not exist).
    NoGoFiles { dir: PathBuf },
    /// Files disagree on the package name. `package` holds the union of all
    /// imports under the first name seen, usable as a best-effort result.
    MultiplePackages { package: GoPackage, names: Vec<String> },
    /// A file could not be read or its header is malformed.
    Io { path: PathBuf, reason: String },
}

impl fmt::Display for PackageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGoFiles {
                dir,
            } => write!(f, "no buildable Go source files in {}", dir.display()),
            Self::MultiplePackages {
                package,
                names,
            } => write!(f, "found packages {} in {}", names.join(", "), package.dir.display()),
            Self::Io {
                path,
                reason,
            } => write!(f, "{}: {}", path.display(), reason),
        }
    }
}

impl std::error::Error for PackageLoadError {}

/// Whether `import_path` belongs to the Go standard library.
///
/// Standard library paths have no dot in their first element (`fmt`,
/// `net/http`); everything hosted somewhere starts with a domain.
pub fn is_std_lib(import_path: &str) -> bool {
    let first = import_path.split('/').next().unwrap_or(import_path);
    !first.contains('.')
}

/// Whether `file_name` is a source file `go build` would consider.
pub fn is_go_source(file_name: &str) -> bool {
    file_name.ends_with(".go")
        && !file_name.ends_with("_test.go")
        && !file_name.starts_with('_')
        && !file_name.starts_with('.')
}

/// Whether `file_name` is a test file `go test` would consider.
pub fn is_go_test_source(file_name: &str) -> bool {
    file_name.ends_with("_test.go") && !file_name.starts_with('_') && !file_name.starts_with('.')
}

/// Load the package in `dir` under `import_path`. Test files are ignored.
pub fn load_package(import_path: &str, dir: &Path) -> Result<GoPackage, PackageLoadError> {
    let (names, imports) = scan_headers(dir, is_go_source)?;

    let Some(name) = names.first().cloned() else {
        return Err(PackageLoadError::NoGoFiles {
            dir: dir.to_path_buf(),
        });
    };

    let package = GoPackage {
        import_path: import_path.to_string(),
        dir: dir.to_path_buf(),
        name,
        imports,
        test_imports: Vec::new(),
    };
    if names.len() > 1 {
        return Err(PackageLoadError::MultiplePackages {
            package,
            names,
        });
    }
    Ok(package)
}

/// Package name and imports of the `_test.go` files in `dir`, or `None`
/// when there are none. Internal and external test packages are merged.
pub fn load_test_header(dir: &Path) -> Result<Option<FileHeader>, PackageLoadError> {
    let (names, imports) = scan_headers(dir, is_go_test_source)?;
    Ok(names.into_iter().next().map(|name| FileHeader {
        name,
        imports,
    }))
}

/// Package names in first-seen order and the sorted union of imports of the
/// files in `dir` accepted by `include`.
fn scan_headers(dir: &Path, include: fn(&str) -> bool) -> Result<(Vec<String>, Vec<String>), PackageLoadError> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), Vec::new())),
        Err(e) => {
            return Err(PackageLoadError::Io {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| entry.file_name().to_str().is_some_and(include))
        .map(|entry| entry.path())
        .collect();
    files.sort();

    let mut names: Vec<String> = Vec::new();
    let mut imports = BTreeSet::new();
    for file in &files {
        let src = std::fs::read_to_string(file).map_err(|e| PackageLoadError::Io {
            path: file.clone(),
            reason: e.to_string(),
        })?;
        let Some(header) = parse_header(&src).map_err(|reason| PackageLoadError::Io {
            path: file.clone(),
            reason,
        })?
        else {
            continue;
        };
        if !names.contains(&header.name) {
            names.push(header.name);
        }
        imports.extend(header.imports.into_iter().filter(|i| i != "C"));
    }
    Ok((names, imports.into_iter().collect()))
}

/// Package clause and imports of one file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileHeader {
    pub name: String,
    pub imports: Vec<String>,
}

/// Parse the header of a Go source file.
///
/// Returns `Ok(None)` for files excluded by an `ignore` build constraint.
pub fn parse_header(src: &str) -> Result<Option<FileHeader>, String> {
    let mut scanner = Scanner::new(src);
    let leading = scanner.skip_trivia();
    if leading.into_iter().any(is_ignore_constraint) {
        return Ok(None);
    }

    if scanner.ident() != Some("package") {
        return Err("expected package clause".to_string());
    }
    scanner.skip_trivia();
    let name = scanner.ident().ok_or("expected package name")?.to_string();

    let mut header = FileHeader {
        name,
        imports: Vec::new(),
    };
    loop {
        scanner.skip_trivia();
        scanner.eat(';');
        scanner.skip_trivia();
        if scanner.ident() != Some("import") {
            break;
        }
        scanner.skip_trivia();
        if scanner.eat('(') {
            loop {
                scanner.skip_trivia();
                if scanner.eat(')') {
                    break;
                }
                if scanner.eat(';') {
                    continue;
                }
                header.imports.push(scanner.import_spec()?);
            }
        } else {
            header.imports.push(scanner.import_spec()?);
        }
    }
    Ok(Some(header))
}

fn is_ignore_constraint(comment: &str) -> bool {
    let body = comment.trim_start_matches("//").trim();
    let expr = body.strip_prefix("go:build").or_else(|| body.strip_prefix("+build"));
    expr.is_some_and(|expr| expr.trim() == "ignore")
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
        }
    }

    fn rest(&self) -> &'a str {
        let src: &'a str = self.src;
        &src[self.pos..]
    }

    /// Skip whitespace and comments, returning the line comments seen.
    fn skip_trivia(&mut self) -> Vec<&'a str> {
        let mut comments = Vec::new();
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with("//") {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                comments.push(&trimmed[..end]);
                self.pos += end;
            } else if let Some(body) = trimmed.strip_prefix("/*") {
                let end = body.find("*/").map_or(trimmed.len(), |i| i + 4);
                self.pos += end;
            } else {
                return comments;
            }
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn string_lit(&mut self) -> Result<String, String> {
        let rest = self.rest();
        let quote = rest.chars().next().ok_or("unexpected end of file")?;
        if quote != '"' && quote != '`' {
            return Err(format!("expected import path, found {:?}", rest.lines().next().unwrap_or("")));
        }
        let body = &rest[1..];
        let end = body.find(quote).ok_or("unterminated import path")?;
        self.pos += end + 2;
        Ok(body[..end].to_string())
    }

    /// `[name | . | _] "path"`
    fn import_spec(&mut self) -> Result<String, String> {
        if !self.eat('.') {
            self.ident();
        }
        self.skip_trivia();
        self.string_lit()
    }
}
