use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::process::{run_capture, ProcessOptions, ToolError};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("failed to parse output of {command}: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentRow {
    pub sha: String,
    pub queued: bool,
    pub data: Value,
    pub sub_rows: Vec<ExperimentRow>,
}

/// Runs `exp show --show-json` and parses the per-commit experiment table.
pub fn experiment_show(config: &Config, cwd: &Path) -> Result<Vec<ExperimentRow>, ReadError> {
    let options = ProcessOptions {
        executable: config.resolve_executable(),
        args: vec!["exp".to_string(), "show".to_string(), "--show-json".to_string()],
        cwd: cwd.to_path_buf(),
        env: config.execution_env(),
    };
    let stdout = run_capture(&options)?;
    let value: Value = serde_json::from_str(&stdout).map_err(|source| ReadError::Parse {
        command: "exp show --show-json".to_string(),
        source,
    })?;
    Ok(parse_experiment_rows(&value))
}

/// The tool reports a two-level object: commits keyed by sha, each holding a
/// `baseline` entry plus any experiments run off that baseline. Baselines
/// become top-level rows with their experiments as sub-rows.
pub fn parse_experiment_rows(value: &Value) -> Vec<ExperimentRow> {
    let Some(commits) = value.as_object() else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(commits.len());
    for (commit_sha, entries) in commits {
        let Some(entries) = entries.as_object() else {
            continue;
        };

        let baseline_data = entries.get("baseline").cloned().unwrap_or(Value::Null);
        let sub_rows = entries
            .iter()
            .filter(|(sha, _)| sha.as_str() != "baseline")
            .map(|(sha, data)| ExperimentRow {
                sha: sha.clone(),
                queued: is_queued(data),
                data: data.clone(),
                sub_rows: Vec::new(),
            })
            .collect();

        rows.push(ExperimentRow {
            sha: commit_sha.clone(),
            queued: is_queued(&baseline_data),
            data: baseline_data,
            sub_rows,
        });
    }
    rows
}

fn is_queued(data: &Value) -> bool {
    data.get("queued").and_then(Value::as_bool).unwrap_or(false)
}
