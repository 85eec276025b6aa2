//! Output plumbing: directory creation and the artifact writes.
//!
//! The two primary outputs are fatal on failure; the technology report is
//! best-effort and only warns.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::CircleConfig;
use crate::error::Error;
use crate::report::{self, CommandUsage};
use crate::taskfile::Taskfile;

/// Paths of the artifacts produced by one run.
#[derive(Debug)]
pub struct WrittenOutputs {
    pub config: PathBuf,
    pub taskfile: PathBuf,
    pub report: Option<PathBuf>,
}

/// Write the minimized config, the Taskfile, and (best-effort) the
/// technology report into `output_dir`.
pub fn write_outputs(
    output_dir: &Path,
    config: &CircleConfig,
    taskfile: &Taskfile,
    usages: &[CommandUsage],
) -> anyhow::Result<WrittenOutputs> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    let config_path = output_dir.join("config.yml");
    write_yaml(&config_path, config, "minimized CircleCI config")?;

    let taskfile_path = output_dir.join("Taskfile.yml");
    write_yaml(&taskfile_path, taskfile, "Taskfile")?;

    let report_path = report::render_report(usages).and_then(|content| {
        let path = output_dir.join("TECHNOLOGY_ANALYSIS.md");
        match fs::write(&path, content) {
            Ok(()) => Some(path),
            Err(err) => {
                warn!("failed to write technology report: {err}");
                None
            }
        }
    });

    Ok(WrittenOutputs {
        config: config_path,
        taskfile: taskfile_path,
        report: report_path,
    })
}

fn write_yaml<T: Serialize>(path: &Path, value: &T, what: &'static str) -> anyhow::Result<()> {
    let rendered = serde_yaml::to_string(value).map_err(|source| Error::Serialize { what, source })?;
    fs::write(path, rendered).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {what} to {}", path.display());
    Ok(())
}
