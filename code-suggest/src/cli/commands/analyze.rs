//! Analyze command - scan a directory and record an analysis run

use super::{open_store, print_json, print_suggestion, repository_id};
use anyhow::{Context, Result};
use clap::Args;
use code_suggest_core::analysis::collect_sources;
use code_suggest_core::{AnalysisRunner, AnalysisType, SuggestConfig};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Directory to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Analysis type: full, security, quality or performance
    #[arg(short = 't', long = "type", default_value = "full")]
    pub analysis_type: AnalysisType,

    /// Repository id (derived from the path when omitted)
    #[arg(short, long)]
    pub repository: Option<Uuid>,

    /// Framework hint such as django, flask or react
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Print suggestions without storing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: AnalyzeArgs, config: &SuggestConfig) -> Result<()> {
    let repository_id = repository_id(args.repository, &args.path)?;
    let framework = args.framework.as_deref().or(config.extractor.framework_hint.as_deref());

    let files = collect_sources(&args.path, &config.scan)?;
    let store = open_store(config);
    let runner = AnalysisRunner::new(config.extractor()?, store.clone(), store);

    if args.dry_run {
        let (suggestions, summary) =
            runner.analyze(repository_id, args.analysis_type, &files, framework);
        if args.json {
            return print_json(&suggestions);
        }
        println!(
            "Analyzed {} files ({} skipped), {} suggestions, {} issues",
            summary.files_analyzed,
            summary.files_skipped,
            summary.suggestions_count(),
            summary.issues_found()
        );
        for suggestion in &suggestions {
            print_suggestion(suggestion);
        }
        return Ok(());
    }

    let run = runner
        .run(repository_id, args.analysis_type, &files, framework)
        .await
        .context("Analysis failed")?;

    if args.json {
        return print_json(&run);
    }

    println!("Analysis {} ({}) {}", run.id, run.analysis_type, run.status);
    println!("  Repository:  {}", run.repository_id);
    println!("  Files:       {}", files.len());
    println!("  Suggestions: {}", run.suggestions_count);
    println!("  Issues:      {}", run.issues_found);
    if run.suggestions_count > 0 {
        println!("\nReview with: code-suggest suggestions list --repository {}", run.repository_id);
    }

    Ok(())
}
