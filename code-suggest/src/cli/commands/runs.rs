//! Runs command - inspect analysis runs

use super::{open_store, print_json};
use anyhow::Result;
use chrono::Local;
use clap::Subcommand;
use code_suggest_core::{AnalysisRunStore, CodeAnalysisRun, SuggestConfig};
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum RunsCommand {
    /// List analysis runs, newest first
    List {
        /// Only runs for this repository
        #[arg(short, long)]
        repository: Option<Uuid>,

        /// Show at most this many runs
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show a single run with its results
    Show {
        id: Uuid,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn execute(command: RunsCommand, config: &SuggestConfig) -> Result<()> {
    let store = open_store(config);

    match command {
        RunsCommand::List { repository, limit } => {
            let runs = store.list_runs(repository).await?;
            if runs.is_empty() {
                println!("No analysis runs found");
                return Ok(());
            }
            for run in runs.iter().take(limit) {
                println!(
                    "{}  {}  {:<11} {:<9} {:>4} suggestions {:>4} issues",
                    run.id,
                    run.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    run.analysis_type,
                    run.status,
                    run.suggestions_count,
                    run.issues_found
                );
            }
        }
        RunsCommand::Show { id, json } => {
            let run = store.get_run(id).await?;
            if json {
                return print_json(&run);
            }
            print_run(&run)?;
        }
    }

    Ok(())
}

fn print_run(run: &CodeAnalysisRun) -> Result<()> {
    println!("Analysis run {}", run.id);
    println!("  Repository:  {}", run.repository_id);
    println!("  Type:        {}", run.analysis_type);
    println!("  Status:      {}", run.status);
    println!("  Started:     {}", run.started_at.with_timezone(&Local));
    if let Some(completed) = run.completed_at {
        println!("  Completed:   {}", completed.with_timezone(&Local));
    }
    println!("  Suggestions: {}", run.suggestions_count);
    println!("  Issues:      {}", run.issues_found);
    if let Some(error) = &run.error {
        println!("  Error:       {}", error);
    }
    if !run.results.is_null() {
        println!("\nResults:\n{}", serde_json::to_string_pretty(&run.results)?);
    }
    Ok(())
}
