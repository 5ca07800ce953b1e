//! Analysis runner
//!
//! Records a `running` analysis run, extracts suggestions from every source
//! file, keeps the ones the analysis type asks for, persists them as
//! AI-authored and finishes the run.

use super::{AnalysisType, CodeAnalysisRun, SourceFile};
use crate::extractor::SuggestionExtractor;
use crate::store::{AnalysisRunStore, StoreError, SuggestionStore};
use crate::suggestion::{CodeSuggestion, Priority, Provenance, SuggestionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Aggregated results stored on a completed run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub files_analyzed: usize,
    /// Files without a rule table for their language
    pub files_skipped: usize,
    pub by_type: BTreeMap<SuggestionType, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    /// Suggestion count per file path, files without findings omitted
    pub files: BTreeMap<String, usize>,
}

impl AnalysisSummary {
    /// Suggestions at high priority or above
    pub fn issues_found(&self) -> usize {
        self.by_priority.iter().filter(|(p, _)| **p >= Priority::High).map(|(_, n)| n).sum()
    }

    pub fn suggestions_count(&self) -> usize {
        self.by_type.values().sum()
    }

    fn record(&mut self, suggestion: &CodeSuggestion) {
        *self.by_type.entry(suggestion.suggestion_type).or_default() += 1;
        *self.by_priority.entry(suggestion.priority).or_default() += 1;
        *self.files.entry(suggestion.file_path.clone()).or_default() += 1;
    }
}

pub struct AnalysisRunner {
    extractor: SuggestionExtractor,
    suggestions: Arc<dyn SuggestionStore>,
    runs: Arc<dyn AnalysisRunStore>,
}

impl AnalysisRunner {
    pub fn new(
        extractor: SuggestionExtractor,
        suggestions: Arc<dyn SuggestionStore>,
        runs: Arc<dyn AnalysisRunStore>,
    ) -> Self {
        Self { extractor, suggestions, runs }
    }

    /// Run an analysis to completion.
    ///
    /// When persisting suggestions fails the run is stored as `failed` and the
    /// store error is returned.
    pub async fn run(
        &self,
        repository_id: Uuid,
        analysis_type: AnalysisType,
        files: &[SourceFile],
        framework_hint: Option<&str>,
    ) -> Result<CodeAnalysisRun, StoreError> {
        let run = self.begin(repository_id, analysis_type).await?;
        self.finish(run, files, framework_hint).await
    }

    /// Record the run and finish it on a background task.
    ///
    /// Returns the `running` record right away.
    pub async fn spawn(
        self: &Arc<Self>,
        repository_id: Uuid,
        analysis_type: AnalysisType,
        files: Vec<SourceFile>,
        framework_hint: Option<String>,
    ) -> Result<(CodeAnalysisRun, JoinHandle<Result<CodeAnalysisRun, StoreError>>), StoreError> {
        let run = self.begin(repository_id, analysis_type).await?;

        let runner = Arc::clone(self);
        let pending = run.clone();
        let handle = tokio::spawn(async move {
            runner.finish(pending, &files, framework_hint.as_deref()).await
        });

        Ok((run, handle))
    }

    /// Extract and filter without touching any store
    pub fn analyze(
        &self,
        repository_id: Uuid,
        analysis_type: AnalysisType,
        files: &[SourceFile],
        framework_hint: Option<&str>,
    ) -> (Vec<CodeSuggestion>, AnalysisSummary) {
        let mut summary = AnalysisSummary::default();
        let mut suggestions = Vec::new();

        for file in files {
            if file.language().is_none() {
                summary.files_skipped += 1;
                continue;
            }
            summary.files_analyzed += 1;

            let drafts = self.extractor.extract_file(&file.path, &file.content, framework_hint);
            debug!("{}: {} raw suggestions", file.path, drafts.len());

            for draft in drafts.into_iter().filter(|d| analysis_type.keeps(d.suggestion_type)) {
                let suggestion =
                    CodeSuggestion::from_draft(draft, repository_id, &file.path, Provenance::Ai);
                summary.record(&suggestion);
                suggestions.push(suggestion);
            }
        }

        (suggestions, summary)
    }

    async fn begin(
        &self,
        repository_id: Uuid,
        analysis_type: AnalysisType,
    ) -> Result<CodeAnalysisRun, StoreError> {
        let run = CodeAnalysisRun::start(repository_id, analysis_type);
        self.runs.insert_run(&run).await?;
        info!("Started {} analysis {} for repository {}", analysis_type, run.id, repository_id);
        Ok(run)
    }

    async fn finish(
        &self,
        mut run: CodeAnalysisRun,
        files: &[SourceFile],
        framework_hint: Option<&str>,
    ) -> Result<CodeAnalysisRun, StoreError> {
        let (suggestions, summary) =
            self.analyze(run.repository_id, run.analysis_type, files, framework_hint);

        if let Err(e) = self.suggestions.insert(suggestions).await {
            warn!("Analysis {} failed: {}", run.id, e);
            run.fail(e.to_string())?;
            if let Err(update_err) = self.runs.update_run(&run).await {
                warn!("Could not record failure of analysis {}: {}", run.id, update_err);
            }
            return Err(e);
        }

        let issues_found = summary.issues_found();
        let suggestions_count = summary.suggestions_count();
        run.complete(serde_json::to_value(&summary)?, issues_found, suggestions_count)?;
        self.runs.update_run(&run).await?;

        info!(
            "Analysis {} completed: {} files, {} suggestions, {} issues",
            run.id, summary.files_analyzed, suggestions_count, issues_found
        );
        Ok(run)
    }
}
