//! Regex utilities for code-suggest
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Language hint normalisation
pub mod language {
    /// Canonical names of the languages the rule tables cover
    pub const SUPPORTED: [&str; 4] = ["python", "javascript", "typescript", "rust"];

    /// Map a language name, alias, extension or file path to a canonical name.
    ///
    /// Accepts `"Python"`, `"py"`, `".py"` and `"src/app/main.py"` alike.
    pub fn normalize(hint: &str) -> Option<&'static str> {
        let hint = hint.trim();
        if hint.is_empty() {
            return None;
        }

        if let Some(lang) = from_name(hint) {
            return Some(lang);
        }

        // Treat anything else as a path or bare extension
        from_path(hint)
    }

    /// Language of a file path, judged by its extension
    pub fn from_path(path: &str) -> Option<&'static str> {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        from_extension(ext)
    }

    /// Language for a bare extension, with or without the leading dot
    pub fn from_extension(ext: &str) -> Option<&'static str> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "py" | "pyw" | "pyi" => Some("python"),
            "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
            "ts" | "tsx" | "mts" | "cts" => Some("typescript"),
            "rs" => Some("rust"),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<&'static str> {
        match name.to_ascii_lowercase().as_str() {
            "python" | "python3" | "py" => Some("python"),
            "javascript" | "js" | "jsx" | "node" | "nodejs" | "ecmascript" => Some("javascript"),
            "typescript" | "ts" | "tsx" => Some("typescript"),
            "rust" | "rs" => Some("rust"),
            _ => None,
        }
    }
}

/// Framework hint detection and normalisation
pub mod framework {
    const FRAMEWORKS: [(&str, &str); 10] = [
        ("django", "django"),
        ("flask", "flask"),
        ("fastapi", "fastapi"),
        ("express", "express"),
        ("next", "react"),
        ("react", "react"),
        ("vue", "vue"),
        ("angular", "angular"),
        ("axum", "axum"),
        ("actix", "actix"),
    ];

    /// Detect a framework mentioned in free text (manifests, READMEs)
    pub fn detect(text: &str) -> Option<&'static str> {
        let text_lower = text.to_lowercase();

        for &(keyword, name) in FRAMEWORKS.iter() {
            if text_lower.contains(keyword) {
                return Some(name);
            }
        }

        None
    }

    /// Normalise a user supplied framework hint so rule tables can compare it.
    ///
    /// `"React.js"`, `"reactjs"` and `"Next.js"` all become `"react"`.
    pub fn normalize(hint: &str) -> String {
        let cleaned: String = hint
            .trim()
            .to_lowercase()
            .trim_end_matches(".js")
            .trim_end_matches("js")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();

        match cleaned.as_str() {
            "next" => "react".to_string(),
            "actix-web" | "actix_web" => "actix".to_string(),
            _ => cleaned,
        }
    }
}

/// Fenced code block extraction from markdown-ish text such as chat replies
pub mod code_blocks {
    use super::*;

    pub static FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?ms)^[ \t]*```[ \t]*([\w+#.-]*)[^\n]*\n(.*?)^[ \t]*```")
            .expect("Invalid regex pattern")
    });

    /// A fenced block borrowed from the source text
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CodeBlock<'a> {
        /// Info string after the opening fence, if any
        pub language: Option<&'a str>,
        pub code: &'a str,
        /// Byte offset of the code within the source text
        pub offset: usize,
    }

    /// Extract every fenced block in order of appearance
    pub fn extract(text: &str) -> Vec<CodeBlock<'_>> {
        FENCE_PATTERN
            .captures_iter(text)
            .filter_map(|caps| {
                let code = caps.get(2)?;
                let language = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty());
                Some(CodeBlock { language, code: code.as_str(), offset: code.start() })
            })
            .collect()
    }
}

/// Byte offset to human readable position helpers
pub mod location {
    /// 1-based line and column (in chars) of a byte offset
    pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(text.len());
        let before = &text[..floor_char_boundary(text, offset)];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    /// The full line containing a byte offset, without its line terminator
    pub fn line_at(text: &str, offset: usize) -> &str {
        let offset = floor_char_boundary(text, offset.min(text.len()));
        let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[offset..].find('\n').map(|i| offset + i).unwrap_or(text.len());
        text[start..end].trim_end_matches('\r')
    }

    fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
        while offset > 0 && !text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_normalization() {
        assert_eq!(language::normalize("Python"), Some("python"));
        assert_eq!(language::normalize("py"), Some("python"));
        assert_eq!(language::normalize(".tsx"), Some("typescript"));
        assert_eq!(language::normalize("src/components/App.jsx"), Some("javascript"));
        assert_eq!(language::normalize("C:\\work\\lib.rs"), Some("rust"));
        assert_eq!(language::normalize("cobol"), None);
        assert_eq!(language::normalize("Makefile"), None);
        assert_eq!(language::normalize("   "), None);
    }

    #[test]
    fn test_framework_detection() {
        assert_eq!(framework::detect("django==4.2\npsycopg2"), Some("django"));
        assert_eq!(framework::detect("\"next\": \"14.0.0\""), Some("react"));
        assert_eq!(framework::detect("plain text"), None);
    }

    #[test]
    fn test_framework_normalization() {
        assert_eq!(framework::normalize("React.js"), "react");
        assert_eq!(framework::normalize("ReactJS"), "react");
        assert_eq!(framework::normalize("Next.js"), "react");
        assert_eq!(framework::normalize(" Django "), "django");
        assert_eq!(framework::normalize("actix-web"), "actix");
    }

    #[test]
    fn test_code_block_extraction() {
        let reply = "Try this:\n```python\nimport os\nos.system(cmd)\n```\nand\n```\nplain\n```\n";
        let blocks = code_blocks::extract(reply);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, Some("python"));
        assert_eq!(blocks[0].code, "import os\nos.system(cmd)\n");
        assert_eq!(&reply[blocks[0].offset..blocks[0].offset + 9], "import os");
        assert_eq!(blocks[1].language, None);
        assert_eq!(blocks[1].code, "plain\n");
    }

    #[test]
    fn test_line_col() {
        let text = "first\nsecond line\nthird";
        assert_eq!(location::line_col(text, 0), (1, 1));
        assert_eq!(location::line_col(text, 6), (2, 1));
        assert_eq!(location::line_col(text, 13), (2, 8));
        assert_eq!(location::line_col(text, 999), (3, 6));
        assert_eq!(location::line_at(text, 13), "second line");
        assert_eq!(location::line_at(text, 0), "first");
    }
}
