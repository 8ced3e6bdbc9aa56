use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::context::{ContextFlagGuard, ContextSink, COMMAND_RUNNING_CONTEXT_KEY};
use crate::process::{run_capture, ProcessOptions, ToolError};
use crate::telemetry::log_cli_telemetry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Force,
}

impl Flag {
    fn as_arg(self) -> &'static str {
        match self {
            Flag::Force => "-f",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcPreserveFlag {
    Workspace,
    AllBranches,
    AllTags,
    AllCommits,
    Queued,
}

impl GcPreserveFlag {
    fn as_arg(self) -> &'static str {
        match self {
            GcPreserveFlag::Workspace => "--workspace",
            GcPreserveFlag::AllBranches => "--all-branches",
            GcPreserveFlag::AllTags => "--all-tags",
            GcPreserveFlag::AllCommits => "--all-commits",
            GcPreserveFlag::Queued => "--queued",
        }
    }
}

/// Argument order is part of the tool contract: subcommand tokens first,
/// then the target if any, flags always last.
pub(crate) fn build_args(command: &[&str], target: Option<&str>, flags: &[&str]) -> Vec<String> {
    let mut args: Vec<String> = command.iter().map(|token| token.to_string()).collect();
    if let Some(target) = target.map(str::trim).filter(|value| !value.is_empty()) {
        args.push(target.to_string());
    }
    args.extend(flags.iter().map(|flag| flag.to_string()));
    args
}

pub struct Executor {
    config: Config,
    context: Arc<dyn ContextSink>,
}

impl Executor {
    pub fn new(config: Config, context: Arc<dyn ContextSink>) -> Self {
        Self { config, context }
    }

    pub fn add(&self, cwd: &Path, target: &str) -> Result<String, ToolError> {
        self.run_scm_tool(cwd, build_args(&["add"], Some(target), &[]))
    }

    pub fn checkout(
        &self,
        cwd: &Path,
        target: Option<&str>,
        flags: &[Flag],
    ) -> Result<String, ToolError> {
        self.run_scm_tool(cwd, build_args(&["checkout"], target, &flag_args(flags)))
    }

    pub fn commit(
        &self,
        cwd: &Path,
        target: Option<&str>,
        flags: &[Flag],
    ) -> Result<String, ToolError> {
        self.run_scm_tool(cwd, build_args(&["commit"], target, &flag_args(flags)))
    }

    pub fn pull(
        &self,
        cwd: &Path,
        target: Option<&str>,
        flags: &[Flag],
    ) -> Result<String, ToolError> {
        self.run_scm_tool(cwd, build_args(&["pull"], target, &flag_args(flags)))
    }

    pub fn push(
        &self,
        cwd: &Path,
        target: Option<&str>,
        flags: &[Flag],
    ) -> Result<String, ToolError> {
        self.run_scm_tool(cwd, build_args(&["push"], target, &flag_args(flags)))
    }

    pub fn remove(&self, cwd: &Path, target: &str) -> Result<String, ToolError> {
        self.run_scm_tool(cwd, build_args(&["remove"], Some(target), &[]))
    }

    pub fn init(&self, cwd: &Path) -> Result<String, ToolError> {
        self.run_tool(cwd, build_args(&["init"], None, &["--subdir"]))
    }

    pub fn move_target(
        &self,
        cwd: &Path,
        target: &str,
        destination: &str,
    ) -> Result<String, ToolError> {
        let mut args = build_args(&["move"], Some(target), &[]);
        args.push(destination.to_string());
        self.run_tool(cwd, args)
    }

    pub fn experiment_apply(&self, cwd: &Path, id: &str) -> Result<String, ToolError> {
        self.run_tool(cwd, build_args(&["exp", "apply"], Some(id), &[]))
    }

    pub fn experiment_branch(
        &self,
        cwd: &Path,
        id: &str,
        branch: &str,
    ) -> Result<String, ToolError> {
        let mut args = build_args(&["exp", "branch"], Some(id), &[]);
        args.push(branch.to_string());
        self.run_tool(cwd, args)
    }

    pub fn experiment_garbage_collect(
        &self,
        cwd: &Path,
        preserve: &[GcPreserveFlag],
    ) -> Result<String, ToolError> {
        let mut args = vec!["exp".to_string(), "gc".to_string(), "-f".to_string()];
        args.extend(preserve.iter().map(|flag| flag.as_arg().to_string()));
        self.run_tool(cwd, args)
    }

    pub fn experiment_remove(&self, cwd: &Path, id: &str) -> Result<String, ToolError> {
        self.run_tool(cwd, build_args(&["exp", "remove"], Some(id), &[]))
    }

    pub fn experiment_remove_queue(&self, cwd: &Path) -> Result<String, ToolError> {
        self.run_tool(cwd, build_args(&["exp", "remove"], None, &["--queue"]))
    }

    pub fn experiment_run_queue(&self, cwd: &Path) -> Result<String, ToolError> {
        self.run_tool(cwd, build_args(&["exp", "run"], None, &["--queue"]))
    }

    // SCM-affecting commands raise command.running for their whole duration.
    fn run_scm_tool(&self, cwd: &Path, args: Vec<String>) -> Result<String, ToolError> {
        let _guard = ContextFlagGuard::raise(&self.context, COMMAND_RUNNING_CONTEXT_KEY);
        self.run_tool(cwd, args)
    }

    pub(crate) fn run_tool(&self, cwd: &Path, args: Vec<String>) -> Result<String, ToolError> {
        let options = ProcessOptions {
            executable: self.config.resolve_executable(),
            args,
            cwd: cwd.to_path_buf(),
            env: self.config.execution_env(),
        };
        log_cli_telemetry(
            self.config.telemetry_enabled,
            "tool.invoke",
            &format!("command={} {}", options.executable, options.args.join(" ")),
        );
        run_capture(&options)
    }
}

fn flag_args(flags: &[Flag]) -> Vec<&'static str> {
    flags.iter().map(|flag| flag.as_arg()).collect()
}
