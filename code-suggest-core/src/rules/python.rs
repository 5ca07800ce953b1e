//! Python rule table

use super::{PatternKind, RuleSpec};
use crate::suggestion::{Priority, SuggestionType};

pub static RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "py-eval",
        kind: PatternKind::Substring,
        pattern: "eval(",
        title: "Avoid eval()",
        description: "eval() executes arbitrary expressions and becomes a code injection vector as soon as its input can be influenced by a user.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Replace eval() with ast.literal_eval() or explicit parsing of the expected input",
        framework: None,
    },
    RuleSpec {
        id: "py-exec",
        kind: PatternKind::Regex,
        pattern: r"\bexec\s*\(",
        title: "Avoid exec()",
        description: "exec() runs arbitrary statements with the caller's privileges.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Dispatch to explicit functions instead of executing generated code",
        framework: None,
    },
    RuleSpec {
        id: "py-sql-injection",
        kind: PatternKind::Regex,
        pattern: r#"(?i)(?:execute\s*\(\s*f["'])|(?:["'](?:select|insert|update|delete)\s[^"'\n]*["']\s*(?:\+|%\s*[\w(]|\.format\())"#,
        title: "Possible SQL injection",
        description: "The query is assembled from strings at runtime. Values interpolated this way can change the meaning of the statement.",
        category: SuggestionType::Security,
        priority: Priority::Critical,
        fix: "Use a parameterized query, e.g. cursor.execute(\"SELECT * FROM users WHERE id = %s\", (user_id,))",
        framework: None,
    },
    RuleSpec {
        id: "py-shell-true",
        kind: PatternKind::Regex,
        pattern: r"subprocess\.\w+\([^)]*shell\s*=\s*True",
        title: "Subprocess invoked through the shell",
        description: "shell=True passes the command to /bin/sh, so any interpolated value can inject extra commands.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Pass the command as an argument list and drop shell=True",
        framework: None,
    },
    RuleSpec {
        id: "py-os-system",
        kind: PatternKind::Regex,
        pattern: r"\bos\.system\s*\(",
        title: "Avoid os.system()",
        description: "os.system() runs its argument through the shell and discards structured error information.",
        category: SuggestionType::Security,
        priority: Priority::Medium,
        fix: "Use subprocess.run([...], check=True) with an argument list",
        framework: None,
    },
    RuleSpec {
        id: "py-pickle-load",
        kind: PatternKind::Regex,
        pattern: r"\bpickle\.loads?\s*\(",
        title: "Unpickling untrusted data",
        description: "Unpickling can execute arbitrary code embedded in the payload.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Exchange data as JSON or another format without code execution",
        framework: None,
    },
    RuleSpec {
        id: "py-hardcoded-secret",
        kind: PatternKind::Regex,
        pattern: r#"(?i)\b(?:password|passwd|pwd|secret|api_?key|access_?token|auth_?token)\s*=\s*["'][^"'\s]{4,}["']"#,
        title: "Hardcoded credential",
        description: "A credential appears to be committed in source code.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Read the value from an environment variable or a secret manager",
        framework: None,
    },
    RuleSpec {
        id: "django-debug-enabled",
        kind: PatternKind::Regex,
        pattern: r"(?m)^\s*DEBUG\s*=\s*True\b",
        title: "Django DEBUG enabled",
        description: "DEBUG = True exposes stack traces and settings to anyone who triggers an error.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "DEBUG = os.environ.get(\"DJANGO_DEBUG\") == \"1\"",
        framework: Some("django"),
    },
    RuleSpec {
        id: "django-csrf-exempt",
        kind: PatternKind::Substring,
        pattern: "@csrf_exempt",
        title: "CSRF protection disabled",
        description: "The view opts out of Django's CSRF middleware.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Remove @csrf_exempt and send the CSRF token from the client",
        framework: Some("django"),
    },
    RuleSpec {
        id: "django-raw-sql",
        kind: PatternKind::Regex,
        pattern: r"\.(?:raw|extra)\s*\(",
        title: "Raw SQL through the ORM",
        description: "raw() and extra() bypass the ORM's query escaping.",
        category: SuggestionType::Security,
        priority: Priority::Medium,
        fix: "Express the query with the ORM, or pass values through the params argument",
        framework: Some("django"),
    },
    RuleSpec {
        id: "flask-debug-run",
        kind: PatternKind::Regex,
        pattern: r"\.run\s*\([^)]*debug\s*=\s*True",
        title: "Flask debugger enabled",
        description: "The Werkzeug debugger allows arbitrary code execution from the browser.",
        category: SuggestionType::Security,
        priority: Priority::High,
        fix: "Enable debug mode through FLASK_DEBUG in development only",
        framework: Some("flask"),
    },
    RuleSpec {
        id: "py-bare-except",
        kind: PatternKind::Regex,
        pattern: r"(?m)^\s*except\s*:",
        title: "Bare except clause",
        description: "A bare except also swallows KeyboardInterrupt and SystemExit and hides real failures.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Catch the specific exception, or at least `except Exception:`",
        framework: None,
    },
    RuleSpec {
        id: "py-mutable-default",
        kind: PatternKind::Regex,
        pattern: r"def\s+\w+\s*\([^)]*=\s*(?:\[\]|\{\}|list\(\)|dict\(\))",
        title: "Mutable default argument",
        description: "Default values are evaluated once, so the same list or dict is shared between calls.",
        category: SuggestionType::BugFix,
        priority: Priority::Medium,
        fix: "Default to None and create the container inside the function",
        framework: None,
    },
    RuleSpec {
        id: "py-open-without-with",
        kind: PatternKind::Regex,
        pattern: r"(?m)^\s*\w+\s*=\s*open\s*\(",
        title: "File opened without a context manager",
        description: "The file handle is not closed if an exception is raised before close().",
        category: SuggestionType::BugFix,
        priority: Priority::Low,
        fix: "with open(...) as handle:",
        framework: None,
    },
    RuleSpec {
        id: "py-range-len",
        kind: PatternKind::Regex,
        pattern: r"\bfor\s+\w+\s+in\s+range\s*\(\s*len\s*\(",
        title: "Iterate directly instead of range(len())",
        description: "Indexing through range(len(seq)) is slower and less readable than iterating the sequence.",
        category: SuggestionType::Optimization,
        priority: Priority::Low,
        fix: "for index, item in enumerate(seq):",
        framework: None,
    },
    RuleSpec {
        id: "py-none-comparison",
        kind: PatternKind::Regex,
        pattern: r"[=!]=\s*None\b",
        title: "Compare to None with `is`",
        description: "Equality against None can be overridden by __eq__; identity cannot.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Use `is None` / `is not None` instead of `{match}`",
        framework: None,
    },
    RuleSpec {
        id: "py-missing-docstring",
        kind: PatternKind::Regex,
        pattern: r#"(?m)^[ \t]*(?:async[ \t]+)?def[ \t]+\w+[ \t]*\([^)]*\)[^:\n]*:[ \t]*\r?\n[ \t]*[^"'\s]"#,
        title: "Add a docstring",
        description: "The function has no docstring describing its purpose, arguments and return value.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Add a \"\"\"docstring\"\"\" as the first statement of the function",
        framework: None,
    },
    RuleSpec {
        id: "py-print",
        kind: PatternKind::Regex,
        pattern: r"(?m)^\s*print\s*\(",
        title: "Use logging instead of print",
        description: "print() output has no level, timestamp or destination control. Use the logging module instead.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "logger = logging.getLogger(__name__); logger.info(...)",
        framework: None,
    },
    RuleSpec {
        id: "py-wildcard-import",
        kind: PatternKind::Regex,
        pattern: r"(?m)^\s*from\s+\S+\s+import\s+\*",
        title: "Avoid wildcard imports",
        description: "Wildcard imports hide where names come from and can shadow local definitions.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "Import the names you use explicitly",
        framework: None,
    },
    RuleSpec {
        id: "py-todo-comment",
        kind: PatternKind::Regex,
        pattern: r"#\s*(?:TODO|FIXME|XXX)\b",
        title: "Unresolved TODO",
        description: "A TODO or FIXME marker is left in the code.",
        category: SuggestionType::Improvement,
        priority: Priority::Low,
        fix: "",
        framework: None,
    },
];
