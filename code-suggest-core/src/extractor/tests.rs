use super::*;
use crate::suggestion::{Priority, SuggestionType};
use proptest::prelude::*;
use serde_json::json;

fn ids(drafts: &[SuggestionDraft]) -> Vec<&str> {
    drafts.iter().map(|d| d.rule_id.as_str()).collect()
}

#[test]
fn test_eval_in_function_without_docstring() {
    let extractor = SuggestionExtractor::new();
    let drafts = extractor.extract("def foo():\n  eval(x)", Some("python"), None);

    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].suggestion_type, SuggestionType::Security);
    assert!(drafts[0].title.contains("eval"));
    assert_eq!(drafts[0].line_number, Some(2));
    assert_eq!(drafts[0].code_snippet.as_deref(), Some("eval(x)"));

    assert_eq!(drafts[1].suggestion_type, SuggestionType::Improvement);
    assert!(drafts[1].title.to_lowercase().contains("docstring"));
    assert_eq!(drafts[1].line_number, Some(1));
}

#[test]
fn test_print_suggests_logging() {
    let drafts = SuggestionExtractor::new().extract("print('hi')", Some("python"), None);

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].suggestion_type, SuggestionType::Improvement);
    assert!(drafts[0].title.to_lowercase().contains("logging"));
}

#[test]
fn test_empty_input_is_empty_for_every_hint() {
    let extractor = SuggestionExtractor::new();
    for hint in [None, Some("python"), Some("js"), Some("ts"), Some("rust"), Some("cobol")] {
        assert!(extractor.extract("", hint, None).is_empty());
        assert!(extractor.extract("  \n\t", hint, Some("react")).is_empty());
    }
}

#[test]
fn test_unknown_or_missing_language_is_empty() {
    let extractor = SuggestionExtractor::new();
    assert!(extractor.extract("eval(x)", Some("haskell"), None).is_empty());
    assert!(extractor.extract("eval(x)", None, None).is_empty());
}

#[test]
fn test_no_match_is_empty() {
    let drafts =
        SuggestionExtractor::new().extract("import os\n\nvalue = os.getcwd()\n", Some("py"), None);
    assert!(drafts.is_empty());
}

#[test]
fn test_line_number_and_snippet() {
    let drafts =
        SuggestionExtractor::new().extract("import os\n\nx = eval(data)\n", Some("python"), None);

    assert_eq!(ids(&drafts), ["py-eval"]);
    assert_eq!(drafts[0].line_number, Some(3));
    assert_eq!(drafts[0].code_snippet.as_deref(), Some("x = eval(data)"));
    assert_eq!(drafts[0].priority, Priority::High);
}

#[test]
fn test_output_follows_rule_order() {
    // print appears first in the text, eval first in the table
    let drafts = SuggestionExtractor::new().extract("print(x)\neval(y)", Some("python"), None);
    assert_eq!(ids(&drafts), ["py-eval", "py-print"]);
}

#[test]
fn test_match_modes() {
    let text = "eval(a)\neval(b)";

    let first = SuggestionExtractor::new();
    let drafts = first.extract(text, Some("python"), None);
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].line_number, Some(1));

    let all = SuggestionExtractor::new().with_options(ExtractOptions { match_mode: MatchMode::All });
    let drafts = all.extract(text, Some("python"), None);
    assert_eq!(ids(&drafts), ["py-eval", "py-eval"]);
    assert_eq!(drafts[0].line_number, Some(1));
    assert_eq!(drafts[1].line_number, Some(2));
}

#[test]
fn test_fix_template_uses_match() {
    let drafts =
        SuggestionExtractor::new().extract("if x == None:\n    pass\n", Some("python"), None);

    assert_eq!(ids(&drafts), ["py-none-comparison"]);
    assert_eq!(
        drafts[0].suggested_fix.as_deref(),
        Some("Use `is None` / `is not None` instead of `== None`")
    );
}

#[test]
fn test_rule_without_fix() {
    let drafts = SuggestionExtractor::new().extract("x = 1  # TODO tidy", Some("python"), None);
    assert_eq!(ids(&drafts), ["py-todo-comment"]);
    assert_eq!(drafts[0].suggested_fix, None);
}

#[test]
fn test_framework_rules_need_hint() {
    let extractor = SuggestionExtractor::new();

    assert!(extractor.extract("DEBUG = True\n", Some("python"), None).is_empty());
    assert!(extractor.extract("DEBUG = True\n", Some("python"), Some("flask")).is_empty());

    let drafts = extractor.extract("DEBUG = True\n", Some("python"), Some("Django"));
    assert_eq!(ids(&drafts), ["django-debug-enabled"]);
    assert_eq!(drafts[0].suggestion_type, SuggestionType::Security);
}

#[test]
fn test_react_hint_aliases() {
    let extractor = SuggestionExtractor::new();
    let jsx = "<div dangerouslySetInnerHTML={{__html: html}} />";

    assert!(extractor.extract(jsx, Some("jsx"), None).is_empty());
    for hint in ["react", "React.js", "next"] {
        let drafts = extractor.extract(jsx, Some("jsx"), Some(hint));
        assert_eq!(ids(&drafts), ["react-dangerous-html"], "hint {}", hint);
    }
}

#[test]
fn test_typescript_runs_javascript_rules_first() {
    let drafts =
        SuggestionExtractor::new().extract("const x: any = eval(y)", Some("typescript"), None);
    assert_eq!(ids(&drafts), ["js-eval", "ts-explicit-any"]);
}

#[test]
fn test_rust_rules() {
    let drafts = SuggestionExtractor::new().extract(
        "fn main() { let v = x.unwrap(); }",
        Some("rs"),
        None,
    );
    assert_eq!(ids(&drafts), ["rs-unwrap"]);
    assert_eq!(drafts[0].suggestion_type, SuggestionType::BugFix);
}

#[test]
fn test_extract_file_uses_extension() {
    let extractor = SuggestionExtractor::new();
    let drafts = extractor.extract_file("src/app/views.py", "print('x')", None);
    assert_eq!(ids(&drafts), ["py-print"]);

    assert!(extractor.extract_file("README.md", "print('x')", None).is_empty());
}

#[test]
fn test_extract_request_from_json_contract() {
    let request: ExtractRequest = serde_json::from_value(json!({
        "text": "DEBUG = True",
        "language": "python",
        "frameworkHint": "django"
    }))
    .unwrap();

    assert_eq!(request.framework_hint.as_deref(), Some("django"));
    let drafts = SuggestionExtractor::new().extract_request(&request);
    assert_eq!(ids(&drafts), ["django-debug-enabled"]);
}

#[test]
fn test_extract_json_validates_input() {
    let extractor = SuggestionExtractor::new();

    let drafts = extractor
        .extract_json(&json!({ "text": "eval(x)", "language": "python", "frameworkHint": null }))
        .unwrap();
    assert_eq!(ids(&drafts), ["py-eval"]);

    assert!(matches!(
        extractor.extract_json(&json!({ "text": 42, "language": "python" })),
        Err(ExtractError::InvalidInput(_))
    ));
    assert!(matches!(
        extractor.extract_json(&json!({ "language": "python" })),
        Err(ExtractError::InvalidInput(_))
    ));
    assert!(matches!(
        extractor.extract_json(&json!({ "text": "eval(x)", "language": 3 })),
        Err(ExtractError::InvalidInput(_))
    ));
    assert!(matches!(
        extractor.extract_json(&json!(["eval(x)"])),
        Err(ExtractError::InvalidInput(_))
    ));
}

#[test]
fn test_code_blocks_in_reply() {
    let reply = "Here is a fix:\n\n```python\ndef run():\n    eval(cmd)\n```\n\nAnd some shell:\n```\nrm -rf /\n```\n";
    let drafts = SuggestionExtractor::new().extract_code_blocks(reply, None);

    assert_eq!(ids(&drafts), ["py-eval", "py-missing-docstring"]);
    assert_eq!(drafts[0].line_number, Some(5));
    assert_eq!(drafts[1].line_number, Some(4));
}

#[test]
fn test_drafts_serialize_to_json() {
    let drafts = SuggestionExtractor::new().extract("eval(x)", Some("python"), None);
    let value = serde_json::to_value(&drafts).unwrap();

    assert_eq!(value[0]["suggestion_type"], "security");
    assert_eq!(value[0]["priority"], "high");
}

#[test]
fn test_custom_registry() {
    use crate::rules::{CustomRule, PatternKind, RuleDef};

    let registry = RuleRegistry::with_custom(vec![CustomRule {
        language: "python".to_string(),
        rule: RuleDef {
            id: "py-assert".to_string(),
            kind: PatternKind::Regex,
            pattern: r"(?m)^\s*assert\s".to_string(),
            title: "assert is stripped with -O".to_string(),
            description: "Assertions disappear under optimization.".to_string(),
            category: SuggestionType::BugFix,
            priority: Priority::Medium,
            fix: None,
            framework: None,
        },
    }])
    .unwrap();

    let extractor = SuggestionExtractor::with_registry(Arc::new(registry), ExtractOptions::default());
    let drafts = extractor.extract("assert ok\n", Some("python"), None);
    assert_eq!(ids(&drafts), ["py-assert"]);
}

const LANGUAGES: [&str; 6] = ["python", "javascript", "typescript", "rust", "go", ""];

proptest! {
    #[test]
    fn prop_python_eval_is_security(prefix in ".{0,64}", suffix in ".{0,64}") {
        let text = format!("{}eval({}", prefix, suffix);
        let drafts = SuggestionExtractor::new().extract(&text, Some("python"), None);
        prop_assert!(drafts.iter().any(|d| d.suggestion_type == SuggestionType::Security));
    }

    #[test]
    fn prop_extraction_is_idempotent(
        text in "(?s).{0,256}",
        language in prop::sample::select(LANGUAGES.to_vec()),
        framework in prop::option::of(prop::sample::select(vec!["react", "django", "express"])),
    ) {
        let extractor = SuggestionExtractor::new();
        let first = extractor.extract(&text, Some(language), framework);
        let second = extractor.extract(&text, Some(language), framework);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_line_numbers_are_in_range(text in "[a-z=() \n]{0,200}") {
        let extractor = SuggestionExtractor::new()
            .with_options(ExtractOptions { match_mode: MatchMode::All });
        let lines = text.matches('\n').count() + 1;
        for draft in extractor.extract(&text, Some("python"), None) {
            let line = draft.line_number.unwrap();
            prop_assert!(line >= 1 && line <= lines);
        }
    }
}
