//! Final task-graph assembly and minimized-config rewrite.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::{Mapping, Value};

use crate::config::{CircleConfig, Step};
use crate::error::{Error, Result};
use crate::taskfile::{Task, Taskfile};

/// Local-development task names injected into every generated Taskfile.
pub const FIXED_TASKS: &[&str] = &["clean", "setup-local", "ci-local"];

/// Merge the task categories in priority order: patterns, command tasks, job
/// tasks, then the fixed local-development tasks. A name claimed twice is a
/// configuration error, never a silent overwrite.
pub fn assemble_taskfile(
    pattern_tasks: Vec<(String, Task)>,
    command_tasks: Vec<(String, Task)>,
    job_tasks: Vec<(String, Task)>,
    env: BTreeMap<String, String>,
) -> Result<Taskfile> {
    let mut taskfile = Taskfile::new();

    for (name, task) in pattern_tasks
        .into_iter()
        .chain(command_tasks)
        .chain(job_tasks)
        .chain(local_dev_tasks())
    {
        insert_task(&mut taskfile, name, task)?;
    }

    taskfile.env = env;
    Ok(taskfile)
}

/// Rewrite each job body to the single `run: task <job>` step. Commands fold
/// into the Taskfile; version, workflows, executors, and the jobs' own
/// metadata (executor, docker, machine, parameters, ...) pass through.
#[must_use]
pub fn minimize_config(config: &CircleConfig) -> CircleConfig {
    let mut minimized = config.clone();
    minimized.commands = BTreeMap::new();
    for (name, job) in &mut minimized.jobs {
        job.steps = vec![task_call_step(name)];
    }
    minimized
}

fn insert_task(taskfile: &mut Taskfile, name: String, task: Task) -> Result<()> {
    if taskfile.tasks.contains_key(&name) {
        return Err(Error::DuplicateTask { name });
    }
    taskfile.tasks.insert(name, task);
    Ok(())
}

fn task_call_step(job_name: &str) -> Step {
    let mut run = Mapping::new();
    run.insert(
        Value::String("run".to_string()),
        Value::String(format!("task {job_name}")),
    );
    Step::Table(run)
}

fn local_dev_tasks() -> Vec<(String, Task)> {
    vec![
        (
            "clean".to_string(),
            Task {
                desc: "Clean local build artifacts".to_string(),
                cmds: vec![
                    "rm -rf ./workspace ./artifacts ./test-results".to_string(),
                    "echo 'Cleaned local CircleCI simulation directories'".to_string(),
                ],
                ..Task::default()
            },
        ),
        (
            "setup-local".to_string(),
            Task {
                desc: "Setup local environment for CircleCI simulation".to_string(),
                cmds: vec![
                    "mkdir -p ./workspace ./artifacts ./test-results".to_string(),
                    "echo 'Local CircleCI directories created'".to_string(),
                    "echo 'Note: Some steps are CircleCI-server only and will be skipped'"
                        .to_string(),
                ],
                ..Task::default()
            },
        ),
        (
            "ci-local".to_string(),
            Task {
                desc: "Run full CI pipeline locally (where possible)".to_string(),
                deps: BTreeSet::from(["setup-local".to_string()]),
                cmds: vec![
                    "echo 'Running local CI simulation...'".to_string(),
                    "echo 'Note: This runs the build logic, but skips server-only features'"
                        .to_string(),
                ],
                ..Task::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_task(name: &str) -> (String, Task) {
        (
            name.to_string(),
            Task {
                cmds: vec![format!("echo {name}")],
                ..Task::default()
            },
        )
    }

    #[test]
    fn test_fixed_tasks_always_present() {
        let taskfile =
            assemble_taskfile(Vec::new(), Vec::new(), Vec::new(), BTreeMap::new()).unwrap();
        for name in FIXED_TASKS {
            assert!(taskfile.tasks.contains_key(*name), "missing {name}");
        }
        assert!(taskfile.tasks["ci-local"].deps.contains("setup-local"));
    }

    #[test]
    fn test_duplicate_name_is_an_error() {
        let result = assemble_taskfile(
            vec![named_task("build")],
            Vec::new(),
            vec![named_task("build")],
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(Error::DuplicateTask { name }) if name == "build"));
    }

    #[test]
    fn test_job_colliding_with_fixed_task_is_an_error() {
        let result = assemble_taskfile(
            Vec::new(),
            Vec::new(),
            vec![named_task("clean")],
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(Error::DuplicateTask { .. })));
    }

    #[test]
    fn test_minimize_rewrites_each_job_to_one_task_call() {
        let config: CircleConfig = serde_yaml::from_str(
            r#"
version: 2.1
jobs:
  build:
    docker:
      - image: cimg/node:18.0
    steps:
      - checkout
      - run: npm install
      - run: npm run build
commands:
  deploy:
    steps:
      - run: ./deploy.sh
workflows:
  main:
    jobs:
      - build
"#,
        )
        .unwrap();

        let minimized = minimize_config(&config);

        assert!(minimized.commands.is_empty());
        assert!(minimized.workflows.is_some());
        let job = &minimized.jobs["build"];
        assert_eq!(job.steps.len(), 1);
        assert_eq!(job.steps[0], task_call_step("build"));
        assert_eq!(job.docker[0].image, "cimg/node:18.0");
    }
}
