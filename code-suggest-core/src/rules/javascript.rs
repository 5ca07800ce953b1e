//! JavaScript rule table, plus the TypeScript-only rows evaluated after it

use super::{PatternKind, RuleSpec};
use crate::suggestion::{Priority, SuggestionType};

pub static RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "js-eval",
        kind: PatternKind::Regex,
        pattern: r"\beval\s*\(",
        title: "Avoid eval()",
        description: "eval() executes arbitrary strings as code in the current scope.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Parse the input explicitly, e.g. JSON.parse() for data",
        framework: None,
    },
    RuleSpec {
        id: "js-new-function",
        kind: PatternKind::Regex,
        pattern: r"\bnew\s+Function\s*\(",
        title: "Avoid the Function constructor",
        description: "new Function() compiles strings into code exactly like eval().",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Replace the generated function with a regular function",
        framework: None,
    },
    RuleSpec {
        id: "js-inner-html",
        kind: PatternKind::Regex,
        pattern: r"\.(?:innerHTML|outerHTML)\s*=[^=]",
        title: "Assignment to innerHTML",
        description: "Writing markup through innerHTML enables cross-site scripting when the value contains user input.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Use textContent, or sanitize the markup before inserting it",
        framework: None,
    },
    RuleSpec {
        id: "js-document-write",
        kind: PatternKind::Regex,
        pattern: r"\bdocument\.write(?:ln)?\s*\(",
        title: "Avoid document.write()",
        description: "document.write() injects unescaped markup and blocks parsing.",
        category: SuggestionType::Security,
        priority: Priority::Medium,
        fix: "Build DOM nodes with createElement() and textContent",
        framework: None,
    },
    RuleSpec {
        id: "js-sql-injection",
        kind: PatternKind::Regex,
        pattern: r#"(?i)(?:["'](?:select|insert|update|delete)\s[^"'\n]*["']\s*\+)|(?:`(?:select|insert|update|delete)\s[^`]*\$\{)"#,
        title: "Possible SQL injection",
        description: "The query is built by concatenating or interpolating values into SQL text.",
        category: SuggestionType::Security,
        priority: Priority::Critical,
        fix: "Use placeholders and pass values separately, e.g. db.query('SELECT * FROM users WHERE id = $1', [id])",
        framework: None,
    },
    RuleSpec {
        id: "js-shell-interpolation",
        kind: PatternKind::Regex,
        pattern: r"\bexec(?:Sync)?\s*\(\s*`[^`]*\$\{",
        title: "Shell command built from a template",
        description: "Interpolating values into a shell command allows command injection.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Use execFile()/spawn() with an argument array",
        framework: None,
    },
    RuleSpec {
        id: "js-hardcoded-secret",
        kind: PatternKind::Regex,
        pattern: r#"(?i)\b(?:password|passwd|secret|api_?key|access_?token|auth_?token)\s*[:=]\s*["'`][^"'`\s]{4,}["'`]"#,
        title: "Hardcoded credential",
        description: "A credential appears to be committed in source code.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Load the value from process.env or a secret manager",
        framework: None,
    },
    RuleSpec {
        id: "js-token-in-local-storage",
        kind: PatternKind::Regex,
        pattern: r#"(?i)localStorage\.setItem\s*\(\s*["'][^"']*(?:token|jwt|password)"#,
        title: "Sensitive value in localStorage",
        description: "localStorage is readable by any script on the page, including injected ones.",
        category: SuggestionType::Security,
        priority: Priority::Medium,
        fix: "Keep session tokens in httpOnly cookies",
        framework: None,
    },
    RuleSpec {
        id: "react-dangerous-html",
        kind: PatternKind::Substring,
        pattern: "dangerouslySetInnerHTML",
        title: "dangerouslySetInnerHTML in use",
        description: "React skips escaping for this prop, so unsanitized content becomes executable markup.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Render the content as children, or sanitize it with DOMPurify first",
        framework: Some("react"),
    },
    RuleSpec {
        id: "express-open-cors",
        kind: PatternKind::Regex,
        pattern: r"\bcors\s*\(\s*\)",
        title: "CORS open to every origin",
        description: "cors() without options allows requests from any origin.",
        category: SuggestionType::Security,
        priority: Priority::Medium,
        fix: "cors({ origin: ['https://your.app'] })",
        framework: Some("express"),
    },
    RuleSpec {
        id: "js-debugger",
        kind: PatternKind::Regex,
        pattern: r"(?m)^\s*debugger\s*;?\s*$",
        title: "Leftover debugger statement",
        description: "A debugger statement pauses execution whenever developer tools are open.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Remove the debugger statement",
        framework: None,
    },
    RuleSpec {
        id: "js-empty-catch",
        kind: PatternKind::Regex,
        pattern: r"catch\s*(?:\([^)]*\))?\s*\{\s*\}",
        title: "Empty catch block",
        description: "Errors caught here are silently discarded.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Log or rethrow the error, or handle the expected failure explicitly",
        framework: None,
    },
    RuleSpec {
        id: "react-async-effect",
        kind: PatternKind::Regex,
        pattern: r"useEffect\s*\(\s*async\b",
        title: "Async function passed to useEffect",
        description: "useEffect expects a cleanup function, but an async callback returns a Promise.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Define an async function inside the effect and call it",
        framework: Some("react"),
    },
    RuleSpec {
        id: "js-sync-fs",
        kind: PatternKind::Regex,
        pattern: r"\bfs\.\w+Sync\s*\(",
        title: "Synchronous file system call",
        description: "Sync fs calls block the event loop for the duration of the I/O.",
        category: SuggestionType::Optimization,
        priority: Priority::Medium,
        fix: "Use the fs/promises API: await fs.promises.readFile(...)",
        framework: None,
    },
    RuleSpec {
        id: "js-await-in-loop",
        kind: PatternKind::Regex,
        pattern: r"\bfor\s*\([^)]*\)\s*\{[^}]*\bawait\b",
        title: "Sequential await inside a loop",
        description: "Each iteration waits for the previous one even when the operations are independent.",
        category: SuggestionType::Optimization,
        priority: Priority::Low,
        fix: "Collect the promises and await Promise.all(...)",
        framework: None,
    },
    RuleSpec {
        id: "js-loose-equality",
        kind: PatternKind::Regex,
        pattern: r"[^=!<>]==[^=]",
        title: "Use strict equality",
        description: "== applies type coercion, which produces surprising results.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Use === and !==",
        framework: None,
    },
    RuleSpec {
        id: "react-index-key",
        kind: PatternKind::Regex,
        pattern: r"key=\{\s*(?:index|idx|i)\s*\}",
        title: "Array index used as key",
        description: "Index keys break component state when the list is reordered.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Use a stable identifier from the item as key",
        framework: Some("react"),
    },
    RuleSpec {
        id: "js-var",
        kind: PatternKind::Regex,
        pattern: r"(?m)^\s*var\s+\w",
        title: "Prefer let/const over var",
        description: "var is function scoped and hoisted, which hides bugs.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Declare with const, or let when the binding is reassigned",
        framework: None,
    },
    RuleSpec {
        id: "js-console-log",
        kind: PatternKind::Regex,
        pattern: r"\bconsole\.log\s*\(",
        title: "Leftover console.log",
        description: "Debug output should go through a logger with levels.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Remove the call or use the application logger",
        framework: None,
    },
    RuleSpec {
        id: "js-todo-comment",
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

pub static TYPESCRIPT_RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "ts-non-null-assertion",
        kind: PatternKind::Regex,
        pattern: r"\w!\.",
        title: "Non-null assertion",
        description: "The ! operator silences the compiler without checking the value at runtime.",
        category: SuggestionType::BugFix,
        priority: Priority::Low,
        fix: "Narrow the type with a check or use optional chaining (?.)",
        framework: None,
    },
    RuleSpec {
        id: "ts-explicit-any",
        kind: PatternKind::Regex,
        pattern: r":\s*any\b|\bas\s+any\b",
        title: "Avoid `any`",
        description: "`any` disables type checking for everything the value touches.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Use a concrete type, a generic, or `unknown` with narrowing",
        framework: None,
    },
    RuleSpec {
        id: "ts-ignore",
        kind: PatternKind::Substring,
        pattern: "@ts-ignore",
        title: "Suppressed type error",
        description: "@ts-ignore hides the next line's type errors, including future ones.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Fix the type error, or use @ts-expect-error with a reason",
        framework: None,
    },
];
