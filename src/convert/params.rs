//! CircleCI parameter syntax to go-task template syntax.
//!
//! Scanning is regex-based on purpose: the marker grammar is small and fixed.
//! Everything stays behind this module so a stricter tokenizer could replace
//! the regexes without touching callers.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::config::Parameter;

static PARAMETER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<<\s*parameters\.([A-Za-z0-9_-]+)\s*>>").expect("valid regex"));

/// Rewrite every `<< parameters.name >>` marker into the go-task
/// `{{.NAME}}` form. Malformed markers are left untouched; this is
/// best-effort, never an error.
#[must_use]
pub fn rewrite_markers(command: &str) -> String {
    PARAMETER_MARKER
        .replace_all(command, |caps: &Captures<'_>| {
            format!("{{{{.{}}}}}", caps[1].to_uppercase())
        })
        .into_owned()
}

/// Derive the go-task variable table from a declared parameter list.
///
/// Each parameter becomes `NAME: '{{.NAME | default "<declared>"}}'`, so a
/// caller-supplied value wins and the declared default (empty string when
/// none) applies otherwise.
#[must_use]
pub fn derive_vars(parameters: &BTreeMap<String, Parameter>) -> BTreeMap<String, String> {
    parameters
        .iter()
        .map(|(name, spec)| {
            let upper = name.to_uppercase();
            let default = spec.default.as_ref().map(scalar_text).unwrap_or_default();
            let expr = format!("{{{{.{upper} | default \"{default}\"}}}}");
            (upper, expr)
        })
        .collect()
}

/// Textual rendering of a YAML scalar. No type inference: `true` stays
/// `true`, `8080` stays `8080`.
#[must_use]
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|rendered| rendered.trim_end().to_string())
            .unwrap_or_default(),
    }
}
