//! Source file collection for repository scans

use crate::rules::Language;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// Files larger than this are skipped
    pub max_file_bytes: u64,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { max_file_bytes: 512 * 1024, include_hidden: false, respect_gitignore: true }
    }
}

/// A source file with its path relative to the scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self { path: path.into(), content: content.into() }
    }

    pub fn language(&self) -> Option<Language> {
        Language::from_path(&self.path)
    }
}

/// Collect every supported source file under `root`, sorted by path.
///
/// Unreadable and non UTF-8 files are skipped with a warning.
pub fn collect_sources(root: &Path, config: &ScanConfig) -> anyhow::Result<Vec<SourceFile>> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    let walker = WalkBuilder::new(root)
        .hidden(!config.include_hidden)
        .git_ignore(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = relative_path(root, path);
        if Language::from_path(&relative).is_none() {
            continue;
        }

        match entry.metadata() {
            Ok(meta) if meta.len() > config.max_file_bytes => {
                debug!("Skipping {} ({} bytes)", relative, meta.len());
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Skipping {}: {}", relative, e);
                continue;
            }
        }

        match std::fs::read_to_string(path) {
            Ok(content) => files.push(SourceFile { path: relative, content }),
            Err(e) => warn!("Skipping {}: {}", relative, e),
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Collected {} source files under {}", files.len(), root.display());
    Ok(files)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, path: &str, content: &str) {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_collects_supported_files_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/main.rs", "fn main() {}");
        write(dir.path(), "app/views.py", "print('x')");
        write(dir.path(), "web/index.ts", "let x = 1;");
        write(dir.path(), "README.md", "# readme");
        write(dir.path(), "data.json", "{}");

        let files = collect_sources(dir.path(), &ScanConfig::default()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["app/views.py", "src/main.rs", "web/index.ts"]);
        assert_eq!(files[0].language(), Some(Language::Python));
    }

    #[test]
    fn test_respects_gitignore_and_size_limit() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".gitignore", "build/\n");
        write(dir.path(), "build/gen.py", "eval(x)");
        write(dir.path(), "big.py", &"x = 1\n".repeat(100));
        write(dir.path(), "small.py", "x = 1\n");

        let config = ScanConfig { max_file_bytes: 64, ..ScanConfig::default() };
        let files = collect_sources(dir.path(), &config).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["small.py"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(collect_sources(&dir.path().join("nope"), &ScanConfig::default()).is_err());
    }
}
