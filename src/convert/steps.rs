//! Step classification and local-equivalent rendering.
//!
//! Classification is pure: one step value plus the set of known
//! reusable-command names in, a [`StepKind`] out. The local-equivalent table
//! for structural steps also lives here, so every place that materializes a
//! command line agrees on what `checkout` or `store_artifacts` means on a
//! developer machine.

use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};

use crate::config::Step;

/// The structural steps CircleCI fixes the meaning of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinStep {
    Checkout,
    SetupRemoteDocker,
    SaveCache,
    RestoreCache,
    PersistToWorkspace,
    AttachWorkspace,
    StoreArtifacts,
    StoreTestResults,
}

impl BuiltinStep {
    /// Map a step key to its structural kind, if it has one.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "checkout" => Some(Self::Checkout),
            "setup_remote_docker" => Some(Self::SetupRemoteDocker),
            "save_cache" => Some(Self::SaveCache),
            "restore_cache" => Some(Self::RestoreCache),
            "persist_to_workspace" => Some(Self::PersistToWorkspace),
            "attach_workspace" => Some(Self::AttachWorkspace),
            "store_artifacts" => Some(Self::StoreArtifacts),
            "store_test_results" => Some(Self::StoreTestResults),
            _ => None,
        }
    }
}

/// Conditional wrappers. Not invocations, not convertible; reserved so a
/// reusable command named `when` can never hijack them.
const RESERVED_KEYS: &[&str] = &["when", "unless"];

/// Classification of one step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind<'a> {
    /// A plain shell command (a `run` step in either of its forms).
    Command(String),
    /// A structural step with its configuration payload.
    Builtin(BuiltinStep, Option<&'a Value>),
    /// Invocation of a reusable command without arguments.
    Invoke(&'a str),
    /// Invocation of a reusable command with arguments.
    InvokeWith(&'a str, &'a Mapping),
    /// Anything unrecognized: opaque key plus best-effort payload.
    Custom(&'a str, Option<&'a Value>),
}

/// Classify one step against the set of known reusable-command names.
/// First match wins; nothing here has side effects.
#[must_use]
pub fn classify<'a>(step: &'a Step, commands: &BTreeSet<&str>) -> StepKind<'a> {
    match step {
        Step::Name(name) => {
            if commands.contains(name.as_str()) {
                StepKind::Invoke(name)
            } else if name == "checkout" {
                StepKind::Builtin(BuiltinStep::Checkout, None)
            } else {
                StepKind::Custom(name, None)
            }
        }
        Step::Table(table) => classify_table(table, commands),
    }
}

fn classify_table<'a>(table: &'a Mapping, commands: &BTreeSet<&str>) -> StepKind<'a> {
    // `run` wins regardless of what else the mapping carries.
    if let Some(run) = table.get("run") {
        return match run_text(run) {
            Some(text) => StepKind::Command(text),
            None => StepKind::Custom("run", Some(run)),
        };
    }

    if table.len() == 1 {
        if let Some((key, value)) = table.iter().next() {
            let Some(key) = key.as_str() else {
                return StepKind::Custom("<non-string key>", Some(value));
            };
            if let Some(builtin) = BuiltinStep::from_key(key) {
                return StepKind::Builtin(builtin, Some(value));
            }
            if !RESERVED_KEYS.contains(&key) && commands.contains(key) {
                return match value.as_mapping() {
                    Some(args) => StepKind::InvokeWith(key, args),
                    None => StepKind::Invoke(key),
                };
            }
            return StepKind::Custom(key, Some(value));
        }
    }

    // Multi-key mapping without `run`: nothing we understand. Pick the
    // lexically first key for the diagnostic so output is deterministic.
    let first_key = table
        .iter()
        .filter_map(|(key, _)| key.as_str())
        .min()
        .unwrap_or("<empty step>");
    StepKind::Custom(first_key, None)
}

fn run_text(run: &Value) -> Option<String> {
    let text = match run {
        Value::String(text) => text.as_str(),
        Value::Mapping(body) => body.get("command").and_then(Value::as_str)?,
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// A step's local materialization: an executable line, or an informational
/// note that renders as a `#` comment and must never execute.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalCommand {
    Shell(String),
    Note(String),
}

impl LocalCommand {
    /// Render as a Taskfile command line.
    #[must_use]
    pub fn into_line(self) -> String {
        match self {
            LocalCommand::Shell(line) => line,
            LocalCommand::Note(note) => format!("# {note}"),
        }
    }
}

/// Local equivalent of a structural step.
#[must_use]
pub fn render_builtin(step: BuiltinStep, payload: Option<&Value>) -> LocalCommand {
    match step {
        BuiltinStep::Checkout => LocalCommand::Shell("git checkout HEAD".to_string()),
        BuiltinStep::SetupRemoteDocker => {
            LocalCommand::Note("Skipping setup_remote_docker (CircleCI server only)".to_string())
        }
        BuiltinStep::RestoreCache => {
            LocalCommand::Note("Skipping restore_cache (CircleCI server only)".to_string())
        }
        BuiltinStep::SaveCache => match payload_paths(payload) {
            Some(paths) => LocalCommand::Note(format!("Local cache: would save {paths}")),
            None => LocalCommand::Note("Skipping save_cache (CircleCI server only)".to_string()),
        },
        BuiltinStep::PersistToWorkspace => copy_into("./workspace", payload_paths(payload)),
        BuiltinStep::AttachWorkspace => {
            LocalCommand::Shell("echo 'Using local workspace if available'".to_string())
        }
        BuiltinStep::StoreArtifacts => copy_into("./artifacts", payload_path(payload)),
        BuiltinStep::StoreTestResults => copy_into("./test-results", payload_path(payload)),
    }
}

/// Best-effort rendering for unrecognized steps: a string payload passes
/// through as a literal, anything else becomes a diagnostic so conversions
/// are never silently lossy.
#[must_use]
pub fn render_custom(key: &str, payload: Option<&Value>) -> LocalCommand {
    match payload.and_then(Value::as_str) {
        Some(text) => LocalCommand::Shell(text.to_string()),
        None => LocalCommand::Note(format!("Custom step not converted: {key}")),
    }
}

fn copy_into(dir: &str, source: Option<String>) -> LocalCommand {
    match source {
        Some(path) => LocalCommand::Shell(format!("mkdir -p {dir} && cp -r {path} {dir}/")),
        None => LocalCommand::Shell(format!("mkdir -p {dir}")),
    }
}

fn payload_paths(payload: Option<&Value>) -> Option<String> {
    match payload?.as_mapping()?.get("paths")? {
        Value::String(path) => Some(path.clone()),
        Value::Sequence(items) => {
            let paths: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if paths.is_empty() {
                None
            } else {
                Some(paths.join(" "))
            }
        }
        _ => None,
    }
}

fn payload_path(payload: Option<&Value>) -> Option<String> {
    payload?
        .as_mapping()?
        .get("path")?
        .as_str()
        .map(str::to_string)
}
