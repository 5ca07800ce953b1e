//! Configuration for extraction, scanning, storage and the chat relay
//!
//! Loaded from TOML. API keys are never stored here, only the names of the
//! environment variables that hold them.

use crate::analysis::ScanConfig;
use crate::extractor::{ExtractOptions, MatchMode, SuggestionExtractor};
use crate::relay::{
    ChatProvider, ClaudeConfig, ClaudeProvider, KeywordTrigger, MockProvider, OpenAiCompatConfig,
    OpenAiCompatProvider, RelayOptions, DEFAULT_SYSTEM_PROMPT,
};
use crate::relay::trigger::DEFAULT_TRIGGER_PHRASES;
use crate::rules::RuleRegistry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "code-suggest.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggestConfig {
    pub extractor: ExtractorConfig,
    pub scan: ScanConfig,
    pub storage: StorageConfig,
    pub relay: RelayConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractorConfig {
    pub match_mode: MatchMode,
    /// TOML file with additional rules
    pub custom_rules: Option<PathBuf>,
    /// Used when a command does not pass its own framework hint
    pub framework_hint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured directory, else the user data dir, else `./.code-suggest`
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("code-suggest")))
            .unwrap_or_else(|| PathBuf::from(".code-suggest"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    DeepSeek,
    Azure,
    Claude,
    /// Offline echo provider
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "azure" | "azure-openai" => Ok(Self::Azure),
            "claude" | "anthropic" => Ok(Self::Claude),
            "mock" => Ok(Self::Mock),
            other => anyhow::bail!("Unknown provider: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    pub provider: ProviderKind,
    pub system_prompt: String,
    pub trigger_phrases: Vec<String>,
    pub scan_code_blocks: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            trigger_phrases: DEFAULT_TRIGGER_PHRASES.iter().map(|p| p.to_string()).collect(),
            scan_code_blocks: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub deepseek: OpenAiCompatConfig,
    pub azure: OpenAiCompatConfig,
    pub claude: ClaudeConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            deepseek: OpenAiCompatConfig::deepseek(),
            azure: OpenAiCompatConfig::azure("https://YOUR-RESOURCE.openai.azure.com", "gpt-4o"),
            claude: ClaudeConfig::default(),
        }
    }
}

impl SuggestConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Load `path` if given, else the first config file found, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                debug!("Using config file {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// `./code-suggest.toml`, then `<config dir>/code-suggest/config.toml`
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("code-suggest").join("config.toml"));
        }
        paths
    }

    /// Built-in rules plus the configured custom rule file
    pub fn rule_registry(&self) -> Result<Arc<RuleRegistry>> {
        match &self.extractor.custom_rules {
            Some(path) => {
                let registry = RuleRegistry::load_with_custom(path)
                    .with_context(|| format!("Failed to load custom rules from {}", path.display()))?;
                Ok(Arc::new(registry))
            }
            None => Ok(RuleRegistry::builtin()),
        }
    }

    pub fn extractor(&self) -> Result<SuggestionExtractor> {
        let options = ExtractOptions { match_mode: self.extractor.match_mode };
        Ok(SuggestionExtractor::with_registry(self.rule_registry()?, options))
    }

    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            system_prompt: self.relay.system_prompt.clone(),
            scan_code_blocks: self.relay.scan_code_blocks,
        }
    }

    pub fn trigger(&self) -> KeywordTrigger {
        KeywordTrigger::new(&self.relay.trigger_phrases)
    }

    pub fn provider(&self, kind: ProviderKind) -> Result<Arc<dyn ChatProvider>> {
        let provider: Arc<dyn ChatProvider> = match kind {
            ProviderKind::DeepSeek => Arc::new(
                OpenAiCompatProvider::new(self.providers.deepseek.clone())
                    .context("Failed to create DeepSeek provider")?,
            ),
            ProviderKind::Azure => Arc::new(
                OpenAiCompatProvider::new(self.providers.azure.clone())
                    .context("Failed to create Azure OpenAI provider")?,
            ),
            ProviderKind::Claude => Arc::new(
                ClaudeProvider::new(self.providers.claude.clone())
                    .context("Failed to create Claude provider")?,
            ),
            ProviderKind::Mock => Arc::new(MockProvider::new()),
        };
        Ok(provider)
    }
}
