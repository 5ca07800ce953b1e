//! Suggestions command - review stored suggestions

use super::{open_store, print_json, print_suggestion};
use anyhow::Result;
use clap::Subcommand;
use code_suggest_core::{SuggestConfig, SuggestionFilter, SuggestionStatus, SuggestionStore};
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum SuggestionsCommand {
    /// List stored suggestions
    List {
        /// Only suggestions for this repository
        #[arg(short, long)]
        repository: Option<Uuid>,

        /// Only suggestions for this file path
        #[arg(short, long)]
        file: Option<String>,

        /// Only suggestions with this status (pending, applied, dismissed)
        #[arg(short, long)]
        status: Option<SuggestionStatus>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a pending suggestion as applied
    Apply {
        id: Uuid,
    },

    /// Mark a pending suggestion as dismissed
    Dismiss {
        id: Uuid,
    },
}

pub async fn execute(command: SuggestionsCommand, config: &SuggestConfig) -> Result<()> {
    let store = open_store(config);

    match command {
        SuggestionsCommand::List { repository, file, status, json } => {
            let mut filter = SuggestionFilter::default();
            if let Some(repository) = repository {
                filter = filter.repository(repository);
            }
            if let Some(file) = file {
                filter = filter.file(file);
            }
            if let Some(status) = status {
                filter = filter.status(status);
            }

            let suggestions = store.list(&filter).await?;
            if json {
                return print_json(&suggestions);
            }

            if suggestions.is_empty() {
                println!("No suggestions found");
                return Ok(());
            }
            println!("{} suggestions:", suggestions.len());
            for suggestion in &suggestions {
                println!("{} ({})", suggestion.id, suggestion.status);
                print_suggestion(suggestion);
            }
        }
        SuggestionsCommand::Apply { id } => {
            let suggestion = store.update_status(id, SuggestionStatus::Applied).await?;
            println!("Applied: {}", suggestion.title);
            if let Some(fix) = &suggestion.suggested_fix {
                println!("  {}:{} -> {}", suggestion.file_path, line(suggestion.line_number), fix);
            }
        }
        SuggestionsCommand::Dismiss { id } => {
            let suggestion = store.update_status(id, SuggestionStatus::Dismissed).await?;
            println!("Dismissed: {}", suggestion.title);
        }
    }

    Ok(())
}

fn line(line_number: Option<usize>) -> String {
    line_number.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string())
}
