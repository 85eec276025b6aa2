//! The conversion engine.
//!
//! Pure functions over in-memory models, wired in a fixed order: pattern
//! discovery, per-command and per-job task conversion, environment
//! harvesting, then assembly into the two output models. No I/O happens
//! anywhere in this module tree.

pub mod assemble;
pub mod env;
pub mod normalize;
pub mod params;
pub mod patterns;
pub mod steps;
pub mod tasks;

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::{CircleConfig, Step};
use crate::error::Result;
use crate::taskfile::{Task, Taskfile};

/// The two primary artifacts of one conversion run.
#[derive(Debug)]
pub struct Conversion {
    /// Orchestration-only CircleCI config: one task call per job.
    pub config: CircleConfig,
    /// The task-runner description carrying the executable logic.
    pub taskfile: Taskfile,
}

/// Convert a CircleCI config into its minimized form plus a Taskfile.
pub fn convert_config(config: &CircleConfig) -> Result<Conversion> {
    let command_names = config.command_names();

    let mut reserved: BTreeSet<String> = config.jobs.keys().cloned().collect();
    reserved.extend(config.commands.keys().cloned());
    reserved.extend(assemble::FIXED_TASKS.iter().map(|name| (*name).to_string()));

    let pattern_set = patterns::analyze_patterns(config, &reserved);
    debug!(
        patterns = pattern_set.len(),
        jobs = config.jobs.len(),
        commands = config.commands.len(),
        "analyzed config"
    );

    let command_tasks: Vec<(String, Task)> = config
        .commands
        .iter()
        .map(|(name, command)| {
            let task = tasks::command_to_task(name, command, &pattern_set, &command_names);
            (name.clone(), task)
        })
        .collect();

    let job_tasks: Vec<(String, Task)> = config
        .jobs
        .iter()
        .map(|(name, job)| {
            let task = tasks::job_to_task(name, job, &pattern_set, &command_names);
            (name.clone(), task)
        })
        .collect();

    let env = env::harvest_env(config, env::CIRCLE_DEFAULTS);

    let taskfile =
        assemble::assemble_taskfile(pattern_set.tasks(), command_tasks, job_tasks, env)?;

    Ok(Conversion {
        config: assemble::minimize_config(config),
        taskfile,
    })
}

/// Every step of every job and every reusable command, jobs first, owners in
/// sorted name order.
pub(crate) fn all_steps(config: &CircleConfig) -> impl Iterator<Item = &Step> {
    config
        .jobs
        .values()
        .flat_map(|job| job.steps.iter())
        .chain(
            config
                .commands
                .values()
                .flat_map(|command| command.steps.iter()),
        )
}
