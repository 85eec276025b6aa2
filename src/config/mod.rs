//! CircleCI configuration model.
//!
//! The input document deserializes once into these types; nothing downstream
//! re-inspects raw YAML shapes. Sections the converter does not understand
//! (`workflows`, `executors`, unknown job fields) ride along unchanged so the
//! minimized output stays a valid drop-in config.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Top-level CircleCI configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleConfig {
    /// Schema version, carried verbatim (`2.1` parses as a number, `"2.1"`
    /// as a string; both round-trip).
    #[serde(default)]
    pub version: Value,

    #[serde(default)]
    pub jobs: BTreeMap<String, Job>,

    /// Reusable commands. Consumed entirely by the conversion: each becomes a
    /// task, and the section is dropped from the minimized config.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, CommandDefinition>,

    /// Opaque to the converter, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows: Option<Value>,

    /// Opaque to the converter, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executors: Option<Value>,
}

impl CircleConfig {
    /// Load and parse a CircleCI config from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Names of the reusable commands defined in this config.
    #[must_use]
    pub fn command_names(&self) -> BTreeSet<&str> {
        self.commands.keys().map(String::as_str).collect()
    }
}

/// A named unit of CI work: an ordered step list plus execution-environment
/// metadata the converter treats as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docker: Vec<DockerImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Value>,

    /// Declared parameters. Kept in the minimized config: workflow
    /// invocations still reference them even though the task step does not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, Parameter>>,

    #[serde(default)]
    pub steps: Vec<Step>,

    /// Anything else (`resource_class`, `working_directory`, ...) survives
    /// the round trip here.
    #[serde(default, flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerImage {
    pub image: String,

    #[serde(default, flatten)]
    pub extra: Mapping,
}

/// A reusable, parameterizable step sequence usable from multiple jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, Parameter>>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One declared parameter of a job or reusable command.
///
/// Values are carried textually; the converter never infers types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, flatten)]
    pub extra: Mapping,
}

/// One step inside a job or reusable command.
///
/// The CircleCI schema allows two syntactic shapes; the tagged variant is
/// constructed once here, and the classifier in [`crate::convert::steps`] is
/// a pure function over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Bare marker or reusable-command reference, e.g. `checkout`.
    Name(String),
    /// Keyed form: a `run` step, a structural step, or a command invocation.
    Table(Mapping),
}
