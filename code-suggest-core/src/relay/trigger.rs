//! Decides whether an assistant reply should trigger code analysis

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Trigger policy consulted after every assistant reply
pub trait ShouldAnalyze: Send + Sync {
    fn should_analyze(&self, reply: &str) -> bool;
}

impl<F> ShouldAnalyze for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn should_analyze(&self, reply: &str) -> bool {
        self(reply)
    }
}

pub const DEFAULT_TRIGGER_PHRASES: &[&str] = &[
    "analyze",
    "analyse",
    "review",
    "improve",
    "refactor",
    "optimize",
    "bug",
    "security",
    "vulnerab",
    "best practice",
    "suggestion",
];

/// Fires when a phrase starts a word of the reply, ignoring case.
///
/// Phrases may be word prefixes: `vulnerab` matches "vulnerability" while
/// `bug` does not match "debug".
#[derive(Debug, Clone)]
pub struct KeywordTrigger {
    phrases: Vec<String>,
    matcher: Option<Regex>,
}

impl Default for KeywordTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_PHRASES.iter().copied())
    }
}

impl KeywordTrigger {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        let matcher = if phrases.is_empty() {
            None
        } else {
            let alternation =
                phrases.iter().map(|p| regex::escape(p)).collect::<Vec<_>>().join("|");
            match RegexBuilder::new(&format!(r"\b(?:{})", alternation))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Trigger phrases disabled: {}", e);
                    None
                }
            }
        };

        Self { phrases, matcher }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl ShouldAnalyze for KeywordTrigger {
    fn should_analyze(&self, reply: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(reply))
    }
}

/// Never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAnalyze;

impl ShouldAnalyze for NeverAnalyze {
    fn should_analyze(&self, _reply: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phrases() {
        let trigger = KeywordTrigger::default();
        assert!(trigger.should_analyze("Let me REVIEW that function."));
        assert!(trigger.should_analyze("This has a security vulnerability"));
        assert!(!trigger.should_analyze("Hello! How can I help you today?"));
    }

    #[test]
    fn test_custom_phrases_ignore_blank_entries() {
        let trigger = KeywordTrigger::new(["  Lint ", ""]);
        assert_eq!(trigger.phrases(), ["lint"]);
        assert!(trigger.should_analyze("run the linter"));
        assert!(!trigger.should_analyze(""));
    }

    #[test]
    fn test_phrases_match_at_word_start() {
        let trigger = KeywordTrigger::default();
        assert!(!trigger.should_analyze("Enable debug output with RUST_LOG=debug."));
        assert!(!trigger.should_analyze("Attach the debugger and step through."));
        assert!(trigger.should_analyze("That looks like a bug."));
        assert!(trigger.should_analyze("Two bugs here; also a few best practices."));
        assert!(trigger.should_analyze("Known Vulnerabilities: none"));
    }

    #[test]
    fn test_phrases_are_literal() {
        let trigger = KeywordTrigger::new(["c++", "a.b"]);
        assert!(trigger.should_analyze("modern C++ style"));
        assert!(!trigger.should_analyze("axb"));
        assert!(!KeywordTrigger::new(Vec::<String>::new()).should_analyze("review"));
    }

    #[test]
    fn test_closures_are_triggers() {
        let trigger = |reply: &str| reply.contains("```");
        assert!(trigger.should_analyze("```python\nx = 1\n```"));
        assert!(!NeverAnalyze.should_analyze("please review"));
    }
}
