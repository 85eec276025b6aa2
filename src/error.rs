use std::path::PathBuf;
use thiserror::Error;

/// The failure classes of a conversion run.
///
/// Conversion ambiguities (unrecognized steps, malformed parameter markers,
/// odd structural payloads) are deliberately absent: those degrade to clearly
/// marked passthrough lines in the output instead of failing the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read input file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid CircleCI config", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("duplicate task name '{name}': a job, command, or generated task already uses it")]
    DuplicateTask { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
