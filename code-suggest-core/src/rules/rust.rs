//! Rust rule table

use super::{PatternKind, RuleSpec};
use crate::suggestion::{Priority, SuggestionType};

pub static RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "rs-unsafe-block",
        kind: PatternKind::Regex,
        pattern: r"\bunsafe\s*\{",
        title: "Unsafe block",
        description: "The compiler cannot check memory safety inside an unsafe block.",
        category: SuggestionType::Security,
        priority: Priority::Medium,
        fix: "Document the invariants with a // SAFETY: comment or use a safe alternative",
        framework: None,
    },
    RuleSpec {
        id: "rs-transmute",
        kind: PatternKind::Regex,
        pattern: r"\bmem::transmute\b",
        title: "Avoid mem::transmute",
        description: "transmute reinterprets bits without any validity check.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Use from_ne_bytes/to_ne_bytes, From impls or pointer casts instead",
        framework: None,
    },
    RuleSpec {
        id: "rs-shell-command",
        kind: PatternKind::Regex,
        pattern: r#"Command::new\s*\(\s*"(?:sh|bash|cmd|powershell)""#,
        title: "Command runs through a shell",
        description: "Passing arguments through a shell allows command injection.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Invoke the program directly with Command::new(program).args([...])",
        framework: None,
    },
    RuleSpec {
        id: "rs-hardcoded-secret",
        kind: PatternKind::Regex,
        pattern: r#"(?i)\b(?:password|passwd|secret|api_?key|access_?token|auth_?token)\w*\s*(?::\s*&(?:'static\s+)?str\s*)?=\s*"[^"\s]{4,}""#,
        title: "Hardcoded credential",
        description: "A credential appears to be committed in source code.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Read the value with std::env::var or from a secret store",
        framework: None,
    },
    RuleSpec {
        id: "axum-permissive-cors",
        kind: PatternKind::Regex,
        pattern: r"CorsLayer::(?:permissive|very_permissive)\s*\(",
        title: "Permissive CORS layer",
        description: "The layer allows any origin, method and header.",
        category: SuggestionType::Security,
        priority: Priority::Medium,
        fix: "CorsLayer::new().allow_origin(...) with an explicit origin list",
        framework: Some("axum"),
    },
    RuleSpec {
        id: "rs-unwrap",
        kind: PatternKind::Regex,
        pattern: r"\.unwrap\(\)",
        title: "unwrap() can panic",
        description: "unwrap() aborts the thread on None or Err.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Propagate with ? or handle the error case explicitly",
        framework: None,
    },
    RuleSpec {
        id: "rs-panic",
        kind: PatternKind::Regex,
        pattern: r"\bpanic!\s*\(",
        title: "Explicit panic",
        description: "Library code that panics takes the decision away from the caller.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Return a Result<T, E> instead of panicking",
        framework: None,
    },
    RuleSpec {
        id: "rs-unfinished-macro",
        kind: PatternKind::Regex,
        pattern: r"\b(?:todo|unimplemented)!\s*\(",
        title: "Unfinished code path",
        description: "todo!() and unimplemented!() panic when reached.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Implement the code path or return an error",
        framework: None,
    },
    RuleSpec {
        id: "rs-blocking-io-in-async",
        kind: PatternKind::Regex,
        pattern: r"async\s+fn[^{]*\{[^}]*\bstd::fs::",
        title: "Blocking I/O in async function",
        description: "std::fs blocks the executor thread while the file operation runs.",
        category: SuggestionType::Optimization,
        priority: Priority::Medium,
        fix: "Use tokio::fs or move the work to spawn_blocking",
        framework: None,
    },
    RuleSpec {
        id: "rs-clone-in-loop",
        kind: PatternKind::Regex,
        pattern: r"\bfor\b[^{]*\{[^}]*\.clone\(\)",
        title: "Clone inside a loop",
        description: "Cloning on every iteration allocates repeatedly.",
        category: SuggestionType::Optimization,
        priority: Priority::Low,
        fix: "Borrow the value, or clone once before the loop",
        framework: None,
    },
    RuleSpec {
        id: "rs-collect-len",
        kind: PatternKind::Regex,
        pattern: r"\.collect::<Vec<[^>]*>>\(\)\.len\(\)",
        title: "Collecting only to count",
        description: "The vector is allocated only to read its length.",
        category: SuggestionType::Optimization,
        priority: Priority::Low,
        fix: "Use .count() on the iterator",
        framework: None,
    },
    RuleSpec {
        id: "rs-expect",
        kind: PatternKind::Regex,
        pattern: r#"\.expect\(\s*""#,
        title: "expect() can panic",
        description: "expect() panics with a message instead of returning an error.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Propagate the error with context, e.g. .context(\"...\")?",
        framework: None,
    },
    RuleSpec {
        id: "rs-print-debugging",
        kind: PatternKind::Regex,
        pattern: r"\b(?:println|eprintln|dbg)!\s*\(",
        title: "Use tracing instead of print macros",
        description: "Print macros bypass log levels and structured fields.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Replace with tracing::info!/debug!",
        framework: None,
    },
    RuleSpec {
        id: "rs-todo-comment",
        kind: PatternKind::Regex,
        pattern: r"//\s*(?:TODO|FIXME|XXX)\b",
        title: "Unresolved TODO",
        description: "A TODO or FIXME marker is left in the code.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "",
        framework: None,
    },
];
