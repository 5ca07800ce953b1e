// Command implementations

pub mod analyze;
pub mod chat;
pub mod extract;
pub mod rules;
pub mod runs;
pub mod suggestions;

use anyhow::{Context, Result};
use code_suggest_core::{CodeSuggestion, JsonFileStore, SuggestConfig};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// File store at the configured data directory
pub fn open_store(config: &SuggestConfig) -> Arc<JsonFileStore> {
    Arc::new(JsonFileStore::new(config.storage.resolve_data_dir()))
}

/// Explicit repository id, or one derived from the canonical path of `root`
pub fn repository_id(explicit: Option<Uuid>, root: &Path) -> Result<Uuid> {
    if let Some(id) = explicit {
        return Ok(id);
    }
    let canonical = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))?;
    Ok(Uuid::new_v5(&Uuid::NAMESPACE_URL, canonical.to_string_lossy().as_bytes()))
}

pub fn print_suggestion(suggestion: &CodeSuggestion) {
    let location = match suggestion.line_number {
        Some(line) => format!("{}:{}", suggestion.file_path, line),
        None => suggestion.file_path.clone(),
    };
    println!(
        "  [{:<8}] {:<12} {}  {}",
        suggestion.priority, suggestion.suggestion_type, location, suggestion.title
    );
    if let Some(snippet) = &suggestion.code_snippet {
        println!("             > {}", snippet);
    }
    if let Some(fix) = &suggestion.suggested_fix {
        println!("             fix: {}", fix);
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_repository_id_is_stable_per_path() {
        let dir = TempDir::new().unwrap();
        let first = repository_id(None, dir.path()).unwrap();
        let second = repository_id(None, dir.path()).unwrap();
        assert_eq!(first, second);

        let other = TempDir::new().unwrap();
        assert_ne!(first, repository_id(None, other.path()).unwrap());

        let explicit = Uuid::new_v4();
        assert_eq!(repository_id(Some(explicit), dir.path()).unwrap(), explicit);
    }
}
