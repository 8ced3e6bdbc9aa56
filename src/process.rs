use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub executable: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: HashMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{executable} exited with code {}: {stderr}", render_exit_code(.exit_code))]
    Execution {
        executable: String,
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn render_exit_code(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

/// Runs the tool to completion and captures stdout verbatim. Callers that
/// need streamed output go through the runner instead.
pub fn run_capture(options: &ProcessOptions) -> Result<String, ToolError> {
    let output = Command::new(&options.executable)
        .args(&options.args)
        .current_dir(&options.cwd)
        .env_clear()
        .envs(&options.env)
        .output()
        .map_err(|source| ToolError::Spawn {
            executable: options.executable.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ToolError::Execution {
            executable: options.executable.clone(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
