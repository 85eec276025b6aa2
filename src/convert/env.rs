//! Environment-variable harvesting for local execution defaults.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::CircleConfig;
use crate::convert::all_steps;
use crate::convert::steps::{classify, StepKind};

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Z_][A-Z0-9_]*)\b|\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid regex")
});

/// Defaults for variables CircleCI provides on its own runners, plus a few
/// common ones worth pinning for local runs. Passed into [`harvest_env`]
/// explicitly so the table stays configuration, not ambient state.
pub const CIRCLE_DEFAULTS: &[(&str, &str)] = &[
    ("CIRCLE_PROJECT_REPONAME", "local-repo"),
    ("CIRCLE_PROJECT_USERNAME", "local-user"),
    ("CIRCLE_BRANCH", "main"),
    ("CIRCLE_BUILD_NUM", "1"),
    ("CIRCLE_SHA1", "local-sha"),
    ("CIRCLE_WORKING_DIRECTORY", "."),
    ("CIRCLE_TEST_REPORTS", "./test-results"),
    ("HOME", "$HOME"),
    ("PWD", "$PWD"),
    ("NODE_ENV", "development"),
    ("AWS_DEFAULT_REGION", "us-east-1"),
];

/// Collect every `$NAME` / `${NAME}` reference in plain-command text and
/// produce a local default for each: known variables resolve through
/// `defaults`, everything else gets a placeholder for manual completion.
#[must_use]
pub fn harvest_env(config: &CircleConfig, defaults: &[(&str, &str)]) -> BTreeMap<String, String> {
    let command_names = config.command_names();

    let mut referenced = std::collections::BTreeSet::new();
    for step in all_steps(config) {
        if let StepKind::Command(text) = classify(step, &command_names) {
            for caps in ENV_REFERENCE.captures_iter(&text) {
                if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
                    referenced.insert(name.as_str().to_string());
                }
            }
        }
    }

    referenced
        .into_iter()
        .map(|name| {
            let value = defaults
                .iter()
                .find(|(known, _)| *known == name)
                .map_or_else(
                    || format!("# TODO: Set {name} for local development"),
                    |(_, value)| (*value).to_string(),
                );
            (name, value)
        })
        .collect()
}
