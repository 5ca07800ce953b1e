//! Extract command - run the extractor without touching any store

use super::print_json;
use anyhow::{Context, Result};
use clap::Args;
use code_suggest_core::{SuggestConfig, SuggestionDraft, SuggestionExtractor};
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// File to read, stdin when omitted or `-`
    pub file: Option<PathBuf>,

    /// Language hint (inferred from the file extension when omitted)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Framework hint such as django, flask or react
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Read a `{ text, language, frameworkHint }` JSON request instead of raw text
    #[arg(long, conflicts_with_all = ["language", "code_blocks"])]
    pub request: bool,

    /// Treat the input as a chat reply and scan its fenced code blocks
    #[arg(long)]
    pub code_blocks: bool,

    /// Print drafts as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ExtractArgs, config: &SuggestConfig) -> Result<()> {
    let extractor = config.extractor()?;
    let input = read_input(args.file.as_ref())?;
    let drafts = run(&extractor, &args, config, &input)?;

    if args.json {
        return print_json(&drafts);
    }

    if drafts.is_empty() {
        println!("No suggestions");
        return Ok(());
    }
    for draft in &drafts {
        let line = draft.line_number.map(|l| l.to_string()).unwrap_or_else(|| "-".into());
        println!(
            "{:>5}  [{:<8}] {:<12} {} ({})",
            line, draft.priority, draft.suggestion_type, draft.title, draft.rule_id
        );
        if let Some(fix) = &draft.suggested_fix {
            println!("       fix: {}", fix);
        }
    }

    Ok(())
}

fn run(
    extractor: &SuggestionExtractor,
    args: &ExtractArgs,
    config: &SuggestConfig,
    input: &str,
) -> Result<Vec<SuggestionDraft>> {
    if args.request {
        let value: serde_json::Value =
            serde_json::from_str(input).context("Request is not valid JSON")?;
        return Ok(extractor.extract_json(&value)?);
    }

    let framework = args.framework.as_deref().or(config.extractor.framework_hint.as_deref());

    if args.code_blocks {
        return Ok(extractor.extract_code_blocks(input, framework));
    }

    match (&args.language, &args.file) {
        (Some(language), _) => Ok(extractor.extract(input, Some(language), framework)),
        (None, Some(path)) if path.as_os_str() != "-" => {
            Ok(extractor.extract_file(&path.to_string_lossy(), input, framework))
        }
        _ => anyhow::bail!("--language is required when reading from stdin"),
    }
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}
