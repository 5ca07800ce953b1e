//! Chat command - relay messages to the configured provider

use super::{open_store, print_json, print_suggestion};
use anyhow::{Context, Result};
use clap::Args;
use code_suggest_core::config::ProviderKind;
use code_suggest_core::relay::OpenFile;
use code_suggest_core::{ChatRelay, RelayRequest, RelayResponse, SuggestConfig};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Message to send; starts an interactive session when omitted
    pub message: Option<String>,

    /// Provider override: deepseek, azure, claude or mock
    #[arg(short, long)]
    pub provider: Option<ProviderKind>,

    /// Continue an existing conversation
    #[arg(long)]
    pub conversation: Option<Uuid>,

    /// Repository the open files belong to
    #[arg(short, long)]
    pub repository: Option<Uuid>,

    /// Open file to analyze when the reply asks for it (repeatable, first one is analyzed)
    #[arg(short = 'o', long = "open")]
    pub open_files: Vec<PathBuf>,

    /// Framework hint such as django, flask or react
    #[arg(short, long)]
    pub framework: Option<String>,

    /// Print responses as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: ChatArgs, config: &SuggestConfig) -> Result<()> {
    let store = open_store(config);
    let kind = args.provider.unwrap_or(config.relay.provider);
    let relay = ChatRelay::new(config.provider(kind)?, store.clone(), store)
        .with_extractor(config.extractor()?)
        .with_trigger(config.trigger())
        .with_options(config.relay_options());

    let open_files = read_open_files(&args.open_files).await?;
    let conversation_id = args.conversation.unwrap_or_else(Uuid::new_v4);
    let framework = args.framework.clone().or_else(|| config.extractor.framework_hint.clone());
    info!("Conversation {} via {}", conversation_id, relay.provider_name());

    let request = |message: String| RelayRequest {
        conversation_id,
        message,
        repository_id: args.repository,
        open_files: open_files.clone(),
        framework_hint: framework.clone(),
    };

    if let Some(message) = &args.message {
        let response = relay.handle(request(message.clone())).await?;
        return print_response(&response, args.json);
    }

    println!("Conversation {} ({}). Empty line or Ctrl-D to quit.", conversation_id, relay.provider_name());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            break;
        }
        match relay.handle(request(message.to_string())).await {
            Ok(response) => print_response(&response, args.json)?,
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

async fn read_open_files(paths: &[PathBuf]) -> Result<Vec<OpenFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(OpenFile { path: path.to_string_lossy().into_owned(), content });
    }
    Ok(files)
}

fn print_response(response: &RelayResponse, json: bool) -> Result<()> {
    if json {
        return print_json(response);
    }

    println!("\n{}\n", response.reply);
    if let Some(file) = &response.analyzed_file {
        println!("{} suggestions stored for {}", response.suggestions.len(), file);
        for suggestion in &response.suggestions {
            print_suggestion(suggestion);
        }
    }
    Ok(())
}
