use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{
    analyze::AnalyzeArgs, chat::ChatArgs, extract::ExtractArgs, rules::RulesArgs,
    runs::RunsCommand, suggestions::SuggestionsCommand,
};

#[derive(Parser, Debug)]
#[command(
    name = "code-suggest",
    version,
    about = "Code Suggest - pattern-based code suggestions for AI-assisted development",
    long_about = "Code Suggest scans source files and AI chat replies with language-specific rule tables and records structured suggestions (security, bug fixes, optimizations, improvements) that you can review, apply or dismiss."
)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a repository and record an analysis run
    #[command(about = "Scan a directory, store suggestions and record an analysis run")]
    Analyze(AnalyzeArgs),

    /// Extract suggestions from a file or stdin without storing them
    #[command(about = "Run the extractor on a file, stdin or a JSON request")]
    Extract(ExtractArgs),

    /// Review stored suggestions
    #[command(subcommand, about = "List, apply or dismiss stored suggestions")]
    Suggestions(SuggestionsCommand),

    /// Inspect analysis runs
    #[command(subcommand, about = "List and show analysis runs")]
    Runs(RunsCommand),

    /// List the active rules
    #[command(about = "List built-in and custom rules")]
    Rules(RulesArgs),

    /// Send a chat message through the relay
    #[command(about = "Relay a message to the configured chat provider")]
    Chat(ChatArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_verbosity_and_config() {
        let cli = Cli::parse_from(["code-suggest", "-vv", "-c", "cfg.toml", "rules"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
        assert!(matches!(cli.command, Commands::Rules(_)));
    }
}
