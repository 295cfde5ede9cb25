//! Locating the source documents of a collection.
//!
//! A loader is a glob pattern relative to a base directory. Alternations written as `{md,mdx}`
//! or `(md|mdx)` are expanded into one compiled pattern per alternative.

use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::{
    error::{ContextExt, LogErr},
    fs::get_files_deep,
};

pub const DEFAULT_PATTERN: &str = "**/*.(md|mdx)";
pub const DEFAULT_BASE: &str = "./src/data/logs";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

#[derive(Debug, Clone)]
pub struct GlobLoader {
    pattern: Arc<str>,
    base: PathBuf,
    matchers: Vec<Pattern>,
}

impl GlobLoader {
    pub fn new(pattern: &str, base: impl Into<PathBuf>) -> Result<Self, LogErr> {
        let matchers = expand_alternatives(pattern)
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("compile glob pattern: {pattern}"))?;
        Ok(Self {
            pattern: Arc::from(pattern),
            base: base.into(),
            matchers,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `relative` is a path below the base directory.
    pub fn matches(&self, relative: &Path) -> bool {
        let Some(normalized) = to_slash(relative) else {
            return false;
        };
        self.matchers
            .iter()
            .any(|m| m.matches_with(&normalized, MATCH_OPTIONS))
    }

    /// Matching files below `root/base`, sorted by path.
    pub async fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, LogErr> {
        let base = root.join(&self.base);
        let files = get_files_deep(&base)
            .await
            .with_context(|| format!("collection base: {}", base.display()))?;
        Ok(files
            .into_iter()
            .filter(|path| {
                let matched = path
                    .strip_prefix(&base)
                    .is_ok_and(|relative| self.matches(relative));
                if matched {
                    debug!("found document: {}", path.display());
                }
                matched
            })
            .collect())
    }

    /// Relative path without its extension, `/` separated.
    pub fn entry_id(&self, root: &Path, path: &Path) -> Option<Arc<str>> {
        let relative = path.strip_prefix(root.join(&self.base)).ok()?;
        to_slash(&relative.with_extension("")).map(Arc::from)
    }
}

impl Default for GlobLoader {
    fn default() -> Self {
        Self {
            pattern: Arc::from(DEFAULT_PATTERN),
            base: PathBuf::from(DEFAULT_BASE),
            matchers: expand_alternatives(DEFAULT_PATTERN)
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

fn to_slash(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Expands `{a,b}` and `(a|b)` groups, left to right, nested groups included.
pub fn expand_alternatives(pattern: &str) -> Vec<String> {
    let Some((start, end, close)) = find_group(pattern) else {
        return vec![pattern.to_string()];
    };
    let separator = if close == '}' { ',' } else { '|' };
    let prefix = &pattern[..start];
    let inner = &pattern[start + 1..end];
    let suffix = &pattern[end + 1..];

    if !inner.contains(separator) && close == ')' {
        // a plain parenthesis, not an alternation
        return expand_alternatives(suffix)
            .into_iter()
            .map(|rest| format!("{prefix}({inner}){rest}"))
            .collect();
    }

    split_top_level(inner, separator)
        .into_iter()
        .flat_map(|alternative| expand_alternatives(&format!("{prefix}{alternative}{suffix}")))
        .collect()
}

fn find_group(pattern: &str) -> Option<(usize, usize, char)> {
    let (start, open) = pattern
        .char_indices()
        .find(|(_, c)| *c == '{' || *c == '(')?;
    let close = if open == '{' { '}' } else { ')' };
    let mut depth = 0usize;
    for (i, c) in pattern[start..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((start, start + i, close));
            }
        }
    }
    None
}

fn split_top_level(inner: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&inner[last..i]);
                last = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&inner[last..]);
    parts
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fs::write_file;

    #[test]
    fn expands_both_alternation_styles() {
        assert_eq!(
            expand_alternatives("**/*.(md|mdx)"),
            vec!["**/*.md", "**/*.mdx"]
        );
        assert_eq!(
            expand_alternatives("**/*.{md,mdx}"),
            vec!["**/*.md", "**/*.mdx"]
        );
        assert_eq!(
            expand_alternatives("{a,b{c,d}}/*.md"),
            vec!["a/*.md", "bc/*.md", "bd/*.md"]
        );
        assert_eq!(expand_alternatives("plain/*.md"), vec!["plain/*.md"]);
        assert_eq!(expand_alternatives("unclosed{a,b"), vec!["unclosed{a,b"]);
    }

    #[test]
    fn default_pattern_matches_markdown_and_mdx() {
        let loader = GlobLoader::default();
        assert!(loader.matches(Path::new("first.md")));
        assert!(loader.matches(Path::new("2024/01/second.mdx")));
        assert!(!loader.matches(Path::new("notes.txt")));
        assert!(!loader.matches(Path::new("first.md.bak")));
        assert!(!loader.matches(Path::new(".hidden.md")));
        assert!(!loader.matches(Path::new("../outside.md")));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(GlobLoader::new("***.md", DEFAULT_BASE).is_err());
    }

    #[test]
    fn entry_ids_use_forward_slashes() {
        let loader = GlobLoader::new("**/*.md", "logs").unwrap();
        let root = Path::new("/site");
        assert_eq!(
            loader
                .entry_id(root, &root.join("logs").join("2024").join("hello.md"))
                .as_deref(),
            Some("2024/hello")
        );
        assert_eq!(loader.entry_id(root, Path::new("/elsewhere/a.md")), None);
    }

    #[tokio::test]
    async fn discovers_matching_files_only() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("content");
        for name in ["b.md", "a.mdx", "nested/c.md", "skip.txt", ".draft.md"] {
            write_file(&base.join(name), b"---\n---\n", false)
                .await
                .unwrap();
        }
        write_file(&root.path().join("outside.md"), b"", false)
            .await
            .unwrap();

        let loader = GlobLoader::new(DEFAULT_PATTERN, "content").unwrap();
        let found = loader.discover(root.path()).await.unwrap();
        assert_eq!(
            found,
            vec![base.join("a.mdx"), base.join("b.md"), base.join("nested/c.md")]
        );
    }

    #[tokio::test]
    async fn missing_base_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let loader = GlobLoader::new(DEFAULT_PATTERN, "missing").unwrap();
        let err = loader.discover(root.path()).await.unwrap_err();
        assert!(err.to_string().starts_with("collection base: "));
    }
}
