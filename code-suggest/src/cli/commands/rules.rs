//! Rules command - list the active rule tables

use anyhow::Result;
use clap::Args;
use code_suggest_core::{Language, SuggestConfig};

#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Only rules for this language
    #[arg(short, long)]
    pub language: Option<String>,
}

pub fn execute(args: RulesArgs, config: &SuggestConfig) -> Result<()> {
    let registry = config.rule_registry()?;

    let languages = match &args.language {
        Some(hint) => match Language::from_hint(hint) {
            Some(language) => vec![language],
            None => anyhow::bail!("No rules for language: {}", hint),
        },
        None => Language::ALL.to_vec(),
    };

    for language in languages {
        let Some(set) = registry.rules_for(language) else {
            continue;
        };
        println!("{} ({} rules)", language.as_str(), set.len());
        for rule in set.rules() {
            let def = rule.def();
            let framework = def.framework.as_deref().map(|f| format!(" [{}]", f)).unwrap_or_default();
            println!(
                "  {:<28} {:<12} {:<8} {}{}",
                def.id, def.category, def.priority, def.title, framework
            );
        }
    }

    Ok(())
}
