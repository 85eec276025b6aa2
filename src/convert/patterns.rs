//! Cross-job command pattern discovery.
//!
//! One pass over every step of every job and reusable command counts
//! normalized plain-command occurrences; anything seen twice or more is
//! hoisted into a shared task that converted tasks depend on instead of
//! repeating the command inline.

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

use crate::config::CircleConfig;
use crate::convert::all_steps;
use crate::convert::normalize::normalize_command;
use crate::convert::params::rewrite_markers;
use crate::convert::steps::{classify, StepKind};
use crate::taskfile::Task;

/// Minimum occurrences before a command is hoisted into a shared task.
const PATTERN_THRESHOLD: usize = 2;

/// Fallback when every token of a command is filtered out of the name.
const GENERIC_NAME: &str = "common-task";

/// Words too generic to contribute to a derived task name.
const STOPWORDS: &[&str] = &[
    "and", "or", "the", "a", "an", "with", "for", "to", "of", "in",
];

/// A command hoisted into a shared task because it recurs across the config.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternTask {
    /// Derived, collision-free task name.
    pub name: String,
    /// Original command text (parameter-rewritten, un-normalized).
    pub command: String,
    /// How many steps across the config carry this command. Always >= 2.
    pub count: usize,
}

/// Discovered patterns, keyed by normalized command text.
#[derive(Debug, Default)]
pub struct PatternSet {
    patterns: BTreeMap<String, PatternTask>,
}

impl PatternSet {
    /// Look up the pattern matching a normalized command.
    #[must_use]
    pub fn find(&self, normalized: &str) -> Option<&PatternTask> {
        self.patterns.get(normalized)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The synthesized shared tasks, ready for assembly.
    #[must_use]
    pub fn tasks(&self) -> Vec<(String, Task)> {
        self.patterns
            .values()
            .map(|pattern| {
                let task = Task {
                    desc: format!("Common task - used in {} places", pattern.count),
                    cmds: vec![pattern.command.clone()],
                    ..Task::default()
                };
                (pattern.name.clone(), task)
            })
            .collect()
    }
}

/// Scan the whole config and hoist every command at or above the threshold.
///
/// `reserved` carries names the derived pattern names must not collide with
/// (job names, command names, the fixed local-development tasks). Collisions
/// are disambiguated with a content suffix, never silently dropped.
#[must_use]
pub fn analyze_patterns(config: &CircleConfig, reserved: &BTreeSet<String>) -> PatternSet {
    let command_names = config.command_names();

    // normalized text -> (first-seen original text, count). BTreeMap keeps
    // the synthesis order independent of hash iteration.
    let mut counts: BTreeMap<String, (String, usize)> = BTreeMap::new();
    for step in all_steps(config) {
        if let StepKind::Command(text) = classify(step, &command_names) {
            let rewritten = rewrite_markers(&text);
            let normalized = normalize_command(&rewritten);
            if normalized.is_empty() {
                continue;
            }
            let entry = counts.entry(normalized).or_insert((rewritten, 0));
            entry.1 += 1;
        }
    }

    let mut used = reserved.clone();
    let mut patterns = BTreeMap::new();
    for (normalized, (command, count)) in counts {
        if count < PATTERN_THRESHOLD {
            continue;
        }
        let name = unique_name(&derive_name(&normalized), &normalized, &used);
        used.insert(name.clone());
        patterns.insert(
            normalized,
            PatternTask {
                name,
                command,
                count,
            },
        );
    }

    PatternSet { patterns }
}

/// Derive a task name from the first three tokens of a normalized command,
/// dropping flags and stopwords.
fn derive_name(normalized: &str) -> String {
    let parts: Vec<&str> = normalized
        .split_whitespace()
        .take(3)
        .filter(|word| {
            let lower = word.to_lowercase();
            !word.starts_with('-') && !STOPWORDS.contains(&lower.as_str())
        })
        .collect();

    if parts.is_empty() {
        GENERIC_NAME.to_string()
    } else {
        parts.join("-")
    }
}

/// Disambiguate a taken name with a short content suffix so two distinct
/// commands never collide.
fn unique_name(base: &str, normalized: &str, used: &BTreeSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    format!("{base}-{}", content_suffix(normalized))
}

fn content_suffix(normalized: &str) -> String {
    let digest = Sha256::digest(normalized.as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> CircleConfig {
        serde_yaml::from_str(yaml).expect("fixture parses")
    }

    fn no_reserved() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn test_single_occurrence_is_not_a_pattern() {
        let config = config(
            r#"
version: 2.1
jobs:
  build:
    steps:
      - run: npm install
"#,
        );
        assert!(analyze_patterns(&config, &no_reserved()).is_empty());
    }

    #[test]
    fn test_repeated_command_becomes_one_pattern() {
        let config = config(
            r#"
version: 2.1
jobs:
  build:
    steps:
      - run: npm install
  test:
    steps:
      - run: npm install
"#,
        );
        let patterns = analyze_patterns(&config, &no_reserved());
        assert_eq!(patterns.len(), 1);

        let pattern = patterns.find("npm install").unwrap();
        assert_eq!(pattern.name, "npm-install");
        assert_eq!(pattern.count, 2);
        assert_eq!(pattern.command, "npm install");
    }

    #[test]
    fn test_whitespace_variants_count_as_one_pattern() {
        let config = config(
            "version: 2.1\njobs:\n  build:\n    steps:\n      - run: \"npm   install\"\n  test:\n    steps:\n      - run: \"npm install\"\n",
        );
        let patterns = analyze_patterns(&config, &no_reserved());
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns.find("npm install").unwrap().count, 2);
    }

    #[test]
    fn test_command_steps_count_toward_patterns() {
        let config = config(
            r#"
version: 2.1
jobs:
  build:
    steps:
      - run: make deps
commands:
  prepare:
    steps:
      - run: make deps
"#,
        );
        let patterns = analyze_patterns(&config, &no_reserved());
        assert_eq!(patterns.find("make deps").unwrap().count, 2);
    }

    #[test]
    fn test_name_derivation_skips_flags_and_stopwords() {
        assert_eq!(derive_name("npm install"), "npm-install");
        assert_eq!(derive_name("cp -r dist"), "cp-dist");
        assert_eq!(derive_name("go to build"), "go-build");
        assert_eq!(derive_name("-v --version"), GENERIC_NAME);
    }

    #[test]
    fn test_name_derivation_looks_at_first_three_tokens_only() {
        assert_eq!(derive_name("docker build -t myimage ."), "docker-build");
    }

    #[test]
    fn test_colliding_names_get_content_suffix() {
        let config = config(
            r#"
version: 2.1
jobs:
  a:
    steps:
      - run: npm install --production
      - run: npm install --save-dev
  b:
    steps:
      - run: npm install --production
      - run: npm install --save-dev
"#,
        );
        let patterns = analyze_patterns(&config, &no_reserved());
        assert_eq!(patterns.len(), 2);

        let first = patterns.find("npm install --production").unwrap();
        let second = patterns.find("npm install --save-dev").unwrap();
        assert_ne!(first.name, second.name);
        // Both derive `npm-install`; the later one carries the suffix.
        assert!(second.name.starts_with("npm-install-") || first.name.starts_with("npm-install-"));
    }

    #[test]
    fn test_reserved_names_force_a_suffix() {
        let config = config(
            r#"
version: 2.1
jobs:
  a:
    steps:
      - run: npm install
  b:
    steps:
      - run: npm install
"#,
        );
        let reserved = BTreeSet::from(["npm-install".to_string()]);
        let patterns = analyze_patterns(&config, &reserved);
        let pattern = patterns.find("npm install").unwrap();
        assert!(pattern.name.starts_with("npm-install-"));
        assert_eq!(pattern.name.len(), "npm-install-".len() + 8);
    }

    #[test]
    fn test_parameter_markers_rewritten_before_counting() {
        let config = config(
            r#"
version: 2.1
jobs:
  a:
    steps:
      - run: deploy << parameters.target >>
  b:
    steps:
      - run: deploy << parameters.target >>
"#,
        );
        let patterns = analyze_patterns(&config, &no_reserved());
        assert!(patterns.find("deploy {{.TARGET}}").is_some());
    }
}
