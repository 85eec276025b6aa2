//! Job and reusable-command conversion into go-task tasks.

use std::collections::BTreeSet;

use serde_yaml::Mapping;

use crate::config::{CommandDefinition, Job, Step};
use crate::convert::normalize::normalize_command;
use crate::convert::params::{derive_vars, rewrite_markers, scalar_text};
use crate::convert::patterns::PatternSet;
use crate::convert::steps::{classify, render_builtin, render_custom, StepKind};
use crate::taskfile::Task;

/// Convert one job into its task.
#[must_use]
pub fn job_to_task(
    name: &str,
    job: &Job,
    patterns: &PatternSet,
    commands: &BTreeSet<&str>,
) -> Task {
    let mut task = convert_steps(&job.steps, patterns, commands);
    task.desc = format!("Task converted from CircleCI job: {name}");
    if let Some(parameters) = &job.parameters {
        task.vars = derive_vars(parameters);
    }
    task
}

/// Convert one reusable command into its task. Its declared description wins
/// over the generated one.
#[must_use]
pub fn command_to_task(
    name: &str,
    command: &CommandDefinition,
    patterns: &PatternSet,
    commands: &BTreeSet<&str>,
) -> Task {
    let mut task = convert_steps(&command.steps, patterns, commands);
    task.desc = command
        .description
        .clone()
        .unwrap_or_else(|| format!("Task converted from CircleCI command: {name}"));
    if let Some(parameters) = &command.parameters {
        task.vars = derive_vars(parameters);
    }
    task
}

/// Walk steps in order, accumulating command lines and dependency edges.
///
/// A plain command that matches a discovered pattern becomes a dependency on
/// the pattern task and emits no line of its own; everything else emits
/// exactly one line (or one dependency, for bare invocations).
fn convert_steps(steps: &[Step], patterns: &PatternSet, commands: &BTreeSet<&str>) -> Task {
    let mut task = Task::default();

    for step in steps {
        match classify(step, commands) {
            StepKind::Command(text) => {
                let rewritten = rewrite_markers(&text);
                match patterns.find(&normalize_command(&rewritten)) {
                    Some(pattern) => {
                        task.deps.insert(pattern.name.clone());
                    }
                    None => task.cmds.push(rewritten),
                }
            }
            StepKind::Invoke(name) => {
                task.deps.insert(name.to_string());
            }
            // go-task deps cannot carry per-call arguments, so parameterized
            // invocations stay inline call lines.
            StepKind::InvokeWith(name, args) => {
                task.cmds.push(rewrite_markers(&invocation_line(name, args)));
            }
            StepKind::Builtin(builtin, payload) => {
                let line = render_builtin(builtin, payload).into_line();
                task.cmds.push(rewrite_markers(&line));
            }
            StepKind::Custom(key, payload) => {
                let line = render_custom(key, payload).into_line();
                task.cmds.push(rewrite_markers(&line));
            }
        }
    }

    task
}

/// Render a parameterized invocation as `task <name> KEY=value ...`, keys
/// upper-cased and sorted.
fn invocation_line(name: &str, args: &Mapping) -> String {
    let mut pairs: Vec<String> = args
        .iter()
        .filter_map(|(key, value)| {
            key.as_str()
                .map(|key| format!("{}={}", key.to_uppercase(), scalar_text(value)))
        })
        .collect();
    pairs.sort();

    if pairs.is_empty() {
        format!("task {name}")
    } else {
        format!("task {name} {}", pairs.join(" "))
    }
}
