//! Core functionality for code-suggest
//!
//! This crate contains the pattern-based suggestion extractor, the suggestion
//! and analysis-run records, their stores, and the chat relay that feeds AI
//! replies back into the extractor.

pub mod analysis;
pub mod config;
pub mod extractor;
pub mod relay;
pub mod rules;
pub mod store;
pub mod suggestion;

pub use analysis::{AnalysisRunner, AnalysisStatus, AnalysisType, CodeAnalysisRun};
pub use config::SuggestConfig;
pub use extractor::{ExtractError, ExtractOptions, ExtractRequest, MatchMode, SuggestionExtractor};
pub use relay::{ChatProvider, ChatRelay, RelayRequest, RelayResponse};
pub use rules::{Language, RuleRegistry};
pub use store::{
    AnalysisRunStore, ConversationStore, JsonFileStore, MemoryStore, StoreError, SuggestionFilter,
    SuggestionStore,
};
pub use suggestion::{
    CodeSuggestion, Priority, Provenance, SuggestionDraft, SuggestionStatus, SuggestionType,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_level_exports() {
        let drafts = SuggestionExtractor::new().extract("print('hi')", Some("python"), None);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].suggestion_type, SuggestionType::Improvement);
        assert_eq!(SuggestConfig::default().extractor.match_mode, MatchMode::First);
    }
}
