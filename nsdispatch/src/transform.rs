//! Line-level configuration transforms.
//!
//! Raw device output passes through two rule sets before persistence:
//! removal rules drop whole lines (volatile counters, timestamps,
//! sensitive values), then substitution rules rewrite what remains.
//! Removal runs first so a substitution can never resurrect a line a
//! removal rule just deleted.
//!
//! Transforms are deterministic and stateless apart from the artifact
//! write, so any number of dispatcher invocations may call them
//! concurrently.

use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;

use crate::artifact;
use crate::error::{Result, TransformError};

/// A single substitution rule: every match of `pattern` within a line is
/// replaced with `replacement`.
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: Regex,
    replacement: String,
}

/// Compiled remove/substitute rule set.
///
/// Rules arrive from the caller as regex strings and are compiled once
/// per invocation.
#[derive(Debug, Clone, Default)]
pub struct TransformRules {
    remove: Vec<Regex>,
    substitute: Vec<Substitution>,
}

impl TransformRules {
    /// Compile caller-supplied rule strings.
    ///
    /// `substitute_lines` pairs are `(pattern, replacement)`.
    pub fn new(
        remove_lines: &[String],
        substitute_lines: &[(String, String)],
    ) -> std::result::Result<Self, TransformError> {
        let remove = remove_lines
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let substitute = substitute_lines
            .iter()
            .map(|(pattern, replacement)| {
                Ok(Substitution {
                    pattern: Regex::new(pattern)?,
                    replacement: replacement.clone(),
                })
            })
            .collect::<std::result::Result<Vec<_>, regex::Error>>()?;

        Ok(Self { remove, substitute })
    }

    /// An empty rule set (pass-through transform).
    pub fn empty() -> Self {
        Self::default()
    }

    fn is_removed(&self, line: &str) -> bool {
        self.remove.iter().any(|r| r.is_match(line))
    }

    fn substitute(&self, line: &str) -> String {
        let mut out = line.to_string();
        for sub in &self.substitute {
            out = sub
                .pattern
                .replace_all(&out, sub.replacement.as_str())
                .into_owned();
        }
        out
    }
}

/// A processed configuration paired with the artifact it was written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedConfig {
    /// The transformed text.
    pub text: String,

    /// Where the artifact was persisted.
    pub artifact: PathBuf,
}

/// Apply the rule set to raw device output and persist the result.
///
/// Operates line by line: removal first, then substitution. Writes the
/// processed text to `artifact_path` as a side effect and returns it.
pub fn process_config(
    text: &str,
    rules: &TransformRules,
    artifact_path: &Path,
) -> Result<ProcessedConfig> {
    let processed: Vec<String> = text
        .lines()
        .filter(|line| !rules.is_removed(line))
        .map(|line| rules.substitute(line))
        .collect();
    let processed = processed.join("\n");

    debug!(
        "writing {} processed lines to {}",
        processed.lines().count(),
        artifact_path.display()
    );
    artifact::write(artifact_path, &processed)?;

    Ok(ProcessedConfig {
        text: processed,
        artifact: artifact_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(remove: &[&str], substitute: &[(&str, &str)]) -> TransformRules {
        let remove: Vec<String> = remove.iter().map(|s| s.to_string()).collect();
        let substitute: Vec<(String, String)> = substitute
            .iter()
            .map(|(p, r)| (p.to_string(), r.to_string()))
            .collect();
        TransformRules::new(&remove, &substitute).unwrap()
    }

    #[test]
    fn test_removal_drops_matching_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let rules = rules(&["^set ns encryptionParams"], &[]);

        let text = "set ns hostname NS1\nset ns encryptionParams -method AES256\nset ns timezone UTC";
        let processed = process_config(text, &rules, &path).unwrap();

        assert_eq!(
            processed.text,
            "set ns hostname NS1\nset ns timezone UTC"
        );
    }

    #[test]
    fn test_substitution_rewrites_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let rules = rules(&[], &[(r"-encrypted \S+", "-encrypted <redacted>")]);

        let text = "add system user admin -encrypted a1b2c3";
        let processed = process_config(text, &rules, &path).unwrap();

        assert_eq!(processed.text, "add system user admin -encrypted <redacted>");
    }

    #[test]
    fn test_removal_runs_before_substitution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        // The substitution would rewrite the removed line into an innocuous
        // one; removal must win.
        let rules = rules(&["^secret"], &[("^secret", "public")]);

        let processed = process_config("secret value\nkept line", &rules, &path).unwrap();

        assert_eq!(processed.text, "kept line");
    }

    #[test]
    fn test_deterministic_output_and_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let rules = rules(&["^# generated"], &[("NS1", "netscaler-1")]);
        let text = "# generated 2024-01-01\nset ns hostname NS1\n";

        let first = process_config(text, &rules, &path).unwrap();
        let second = process_config(text, &rules, &path).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first.text);
    }

    #[test]
    fn test_noop_removal_is_identity_modulo_substitution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let rules = rules(&["^never matches anything$"], &[]);
        let text = "line one\nline two\nline three";

        let processed = process_config(text, &rules, &path).unwrap();

        assert_eq!(processed.text, text);
    }

    #[test]
    fn test_empty_rules_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let text = "set ns hostname NS1";

        let processed = process_config(text, &TransformRules::empty(), &path).unwrap();

        assert_eq!(processed.text, text);
        assert_eq!(processed.artifact, path);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = TransformRules::new(&["[unclosed".to_string()], &[]);
        assert!(result.is_err());
    }
}
