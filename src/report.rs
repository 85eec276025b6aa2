//! Technology-usage report over the input configuration.
//!
//! A formatting pass over data the conversion already classifies: every
//! individual command (after newline/`&&` splitting, parameter rewriting,
//! and environment masking) with its usage count, rendered as a markdown
//! checklist for manual technology categorization.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::CircleConfig;
use crate::convert::all_steps;
use crate::convert::params::rewrite_markers;
use crate::convert::steps::{classify, StepKind};

static ENV_MASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Z_][A-Z0-9_]*|\$\{[A-Z_][A-Z0-9_]*\}").expect("valid regex"));

/// Fragments shorter than this are shell noise, not commands worth listing.
const MIN_COMMAND_LEN: usize = 3;

/// One distinct command with its usage count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandUsage {
    pub command: String,
    pub count: usize,
}

/// Extract every individual command across the config, sorted by descending
/// count then ascending text.
#[must_use]
pub fn extract_all_commands(config: &CircleConfig) -> Vec<CommandUsage> {
    let command_names = config.command_names();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for step in all_steps(config) {
        if let StepKind::Command(text) = classify(step, &command_names) {
            for line in split_commands(&text) {
                if let Some(cleaned) = clean_for_analysis(line) {
                    *counts.entry(cleaned).or_insert(0) += 1;
                }
            }
        }
    }

    let mut usages: Vec<CommandUsage> = counts
        .into_iter()
        .map(|(command, count)| CommandUsage { command, count })
        .collect();
    usages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.command.cmp(&b.command)));
    usages
}

/// Render the markdown report. `None` when there is nothing to list.
#[must_use]
pub fn render_report(usages: &[CommandUsage]) -> Option<String> {
    if usages.is_empty() {
        return None;
    }

    let total: usize = usages.iter().map(|usage| usage.count).sum();

    let mut out = String::new();
    out.push_str("# Technology Analysis Report\n\n");
    out.push_str(
        "This file contains all commands extracted from the CircleCI configuration for technology categorization.\n\n",
    );
    out.push_str("## Instructions for AI Analysis\n\n");
    out.push_str(
        "Please categorize these commands by technology/tool type. Commands are sorted by usage frequency (most used first).\n\n",
    );
    out.push_str("Suggested categories:\n");
    out.push_str("- **Package Managers**: npm, yarn, pip, composer, etc.\n");
    out.push_str("- **Build Tools**: webpack, gulp, maven, gradle, etc.\n");
    out.push_str("- **Testing**: jest, pytest, phpunit, go test, etc.\n");
    out.push_str("- **Cloud/Infrastructure**: aws, gcloud, kubectl, terraform, etc.\n");
    out.push_str("- **Containers**: docker, podman, etc.\n");
    out.push_str("- **Languages**: node, python, php, go, java, etc.\n");
    out.push_str("- **Databases**: mysql, postgres, redis, etc.\n");
    out.push_str("- **Other Tools**: git, curl, ssh, etc.\n\n");

    let _ = writeln!(
        out,
        "## All Commands ({} unique commands, {} total usages)\n",
        usages.len(),
        total
    );

    for (index, usage) in usages.iter().enumerate() {
        let percentage = usage.count as f64 / total as f64 * 100.0;
        let _ = writeln!(
            out,
            "{}. `{}` **(used {} times, {:.1}%)**",
            index + 1,
            usage.command,
            usage.count,
            percentage
        );
    }

    out.push('\n');
    out.push_str("## Usage Summary\n\n");
    out.push_str(
        "Commands ordered by frequency can help prioritize which technologies are most important in this configuration.\n\n",
    );
    out.push_str("## Technology Categories\n\n");
    out.push_str("*Please fill in this section after AI analysis*\n\n");
    out.push_str("### Package Managers\n- \n\n");
    out.push_str("### Build Tools\n- \n\n");
    out.push_str("### Testing Frameworks\n- \n\n");
    out.push_str("### Cloud/Infrastructure\n- \n\n");
    out.push_str("### Container Tools\n- \n\n");
    out.push_str("### Programming Languages\n- \n\n");
    out.push_str("### Databases\n- \n\n");
    out.push_str("### Other Tools\n- \n\n");

    Some(out)
}

/// Split a step body into individual commands on line breaks and `&&`,
/// dropping blanks and comment lines.
fn split_commands(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .flat_map(|line| line.split("&&"))
        .map(str::trim)
        .filter(|part| !part.is_empty() && !part.starts_with('#'))
}

/// Normalize one command for categorization: rewrite parameter markers, mask
/// environment references, drop anything too short to mean something.
fn clean_for_analysis(command: &str) -> Option<String> {
    let rewritten = rewrite_markers(command);
    let cleaned = ENV_MASK.replace_all(&rewritten, "${VAR}").trim().to_string();
    (cleaned.len() >= MIN_COMMAND_LEN).then_some(cleaned)
}
