//! go-task output model (Taskfile schema version 3).
//!
//! Output-side collections are `BTreeMap`/`BTreeSet` throughout so the
//! serialized YAML is byte-for-byte reproducible for identical input,
//! independent of any hash-map iteration order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Taskfile {
    pub version: String,

    pub tasks: BTreeMap<String, Task>,

    /// Environment defaults for local execution, present only when the input
    /// actually references variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Taskfile {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: "3".to_string(),
            tasks: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }
}

impl Default for Taskfile {
    fn default() -> Self {
        Self::new()
    }
}

/// One unit of work in the task runner.
///
/// Dependencies are a set: go-task guarantees each dep runs at most once
/// before the task's own commands, so order within `deps` is meaningless and
/// the serialized form is simply sorted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,

    #[serde(default)]
    pub cmds: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub deps: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub silent: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}
