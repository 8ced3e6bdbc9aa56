use std::io::Read;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use portable_pty::{
    native_pty_system, Child as PtyChild, CommandBuilder, MasterPty, PtySize,
};
use serde::Serialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::Config;
use crate::context::{ContextSink, RUNNER_RUNNING_CONTEXT_KEY};
use crate::telemetry::log_cli_telemetry;

const MAX_OUTPUT_SNAPSHOT_BYTES: usize = 256 * 1024;
const RUNNER_PTY_ROWS: u16 = 34;
const RUNNER_PTY_COLS: u16 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerEvent {
    Started { id: String, command: String },
    Output(String),
    Completed { exit_status: Option<u32> },
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("cannot start {requested}: {active} is still running.")]
    Busy { requested: String, active: String },
    #[error("failed to open a terminal for {command}: {detail}")]
    Pty { command: String, detail: String },
    #[error("failed to start {command}: {detail}")]
    Spawn { command: String, detail: String },
}

struct ActiveProcess {
    id: String,
    command: String,
    kind: String,
    started_at: String,
    child: Box<dyn PtyChild + Send>,
    // Holding the master keeps the pty alive until the reader drains it.
    _master: Box<dyn MasterPty + Send>,
    output: Arc<Mutex<Vec<u8>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveInvocation {
    pub id: String,
    pub command: String,
    pub kind: String,
    pub started_at: String,
}

/// Single-slot runner for long-lived tool invocations. At most one process
/// is alive per runner; a second `run` fails fast instead of queueing.
pub struct Runner {
    config: Config,
    kind: String,
    context: Arc<dyn ContextSink>,
    events: Sender<RunnerEvent>,
    active: Arc<Mutex<Option<ActiveProcess>>>,
}

impl Runner {
    pub fn new(
        config: Config,
        kind: impl Into<String>,
        context: Arc<dyn ContextSink>,
        events: Sender<RunnerEvent>,
    ) -> Self {
        Self {
            config,
            kind: kind.into(),
            context,
            events,
            active: Arc::new(Mutex::new(None)),
        }
    }

    pub fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, RunnerError> {
        let executable = self.config.resolve_executable();
        let command = std::iter::once(executable.as_str())
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        // The slot lock is held from the busy check until the handle is
        // stored, so two concurrent runs can never both pass the check.
        let mut slot = lock_active(&self.active);
        if let Some(active) = slot.as_ref() {
            return Err(RunnerError::Busy {
                requested: command,
                active: active.command.clone(),
            });
        }

        let id = Uuid::new_v4().to_string();
        self.context.set_context(RUNNER_RUNNING_CONTEXT_KEY, true);
        let _ = self.events.send(RunnerEvent::Started {
            id: id.clone(),
            command: command.clone(),
        });
        log_cli_telemetry(
            self.config.telemetry_enabled,
            "runner.start",
            &format!("kind={} id={id} command={command}", self.kind),
        );

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: RUNNER_PTY_ROWS,
                cols: RUNNER_PTY_COLS,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|error| {
                self.abort_start(&id, &command, "pty_error", &error.to_string());
                RunnerError::Pty {
                    command: command.clone(),
                    detail: error.to_string(),
                }
            })?;

        let mut spawn_command = CommandBuilder::new(&executable);
        for arg in args {
            spawn_command.arg(arg);
        }
        spawn_command.cwd(cwd);
        for (key, value) in self.config.execution_env() {
            spawn_command.env(key, value);
        }

        let child = pair.slave.spawn_command(spawn_command).map_err(|error| {
            self.abort_start(&id, &command, "spawn_error", &error.to_string());
            RunnerError::Spawn {
                command: command.clone(),
                detail: error.to_string(),
            }
        })?;
        drop(pair.slave);

        let mut reader = pair.master.try_clone_reader().map_err(|error| {
            self.abort_start(&id, &command, "reader_attach_error", &error.to_string());
            RunnerError::Pty {
                command: command.clone(),
                detail: error.to_string(),
            }
        })?;

        let output = Arc::new(Mutex::new(Vec::new()));
        *slot = Some(ActiveProcess {
            id: id.clone(),
            command: command.clone(),
            kind: self.kind.clone(),
            started_at: now_iso(),
            child,
            _master: pair.master,
            output: output.clone(),
        });
        drop(slot);

        let active = self.active.clone();
        let context = self.context.clone();
        let events = self.events.clone();
        let kind = self.kind.clone();
        let telemetry_enabled = self.config.telemetry_enabled;
        let reader_id = id.clone();
        thread::spawn(move || {
            let mut buffer = [0u8; 4096];
            loop {
                match reader.read(&mut buffer) {
                    Ok(0) | Err(_) => break,
                    Ok(count) => {
                        append_output_snapshot(&output, &buffer[..count]);
                        let chunk = String::from_utf8_lossy(&buffer[..count]).to_string();
                        let _ = events.send(RunnerEvent::Output(chunk));
                    }
                }
            }

            let exit_status = {
                let mut slot = lock_active(&active);
                match slot.take() {
                    Some(mut finished) if finished.id == reader_id => {
                        collect_exit_status(finished.child.as_mut())
                    }
                    other => {
                        // A different process already owns the slot, put it back.
                        *slot = other;
                        None
                    }
                }
            };

            context.set_context(RUNNER_RUNNING_CONTEXT_KEY, false);
            log_cli_telemetry(
                telemetry_enabled,
                "runner.completed",
                &format!("kind={kind} id={reader_id} exit_status={exit_status:?}"),
            );
            let _ = events.send(RunnerEvent::Completed { exit_status });
        });

        Ok(id)
    }

    /// Kills the active process if any. The reader thread observes EOF and
    /// clears the slot, so completion events still fire exactly once.
    pub fn stop(&self) -> bool {
        let mut slot = lock_active(&self.active);
        let Some(active) = slot.as_mut() else {
            return false;
        };

        let killed = active.child.kill().is_ok();
        log_cli_telemetry(
            self.config.telemetry_enabled,
            "runner.stop",
            &format!("kind={} id={} killed={killed}", self.kind, active.id),
        );
        true
    }

    pub fn is_running(&self) -> bool {
        lock_active(&self.active).is_some()
    }

    pub fn active_invocation(&self) -> Option<ActiveInvocation> {
        let slot = lock_active(&self.active);
        slot.as_ref().map(|active| ActiveInvocation {
            id: active.id.clone(),
            command: active.command.clone(),
            kind: active.kind.clone(),
            started_at: active.started_at.clone(),
        })
    }

    pub fn output_snapshot(&self) -> String {
        let slot = lock_active(&self.active);
        let Some(active) = slot.as_ref() else {
            return String::new();
        };
        let snapshot = match active.output.lock() {
            Ok(buffer) => String::from_utf8_lossy(buffer.as_slice()).to_string(),
            Err(_) => String::new(),
        };
        snapshot
    }

    fn abort_start(&self, id: &str, command: &str, event: &str, detail: &str) {
        log_cli_telemetry(
            self.config.telemetry_enabled,
            &format!("runner.{event}"),
            &format!("kind={} id={id} command={command} error={detail}", self.kind),
        );
        self.context.set_context(RUNNER_RUNNING_CONTEXT_KEY, false);
        let _ = self.events.send(RunnerEvent::Completed { exit_status: None });
    }
}

fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn lock_active(
    active: &Arc<Mutex<Option<ActiveProcess>>>,
) -> std::sync::MutexGuard<'_, Option<ActiveProcess>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

fn collect_exit_status(child: &mut (dyn PtyChild + Send)) -> Option<u32> {
    match child.try_wait() {
        Ok(Some(status)) => Some(status.exit_code()),
        Ok(None) => child.wait().ok().map(|status| status.exit_code()),
        Err(_) => None,
    }
}

fn append_output_snapshot(snapshot: &Arc<Mutex<Vec<u8>>>, chunk: &[u8]) {
    let Ok(mut buffer) = snapshot.lock() else {
        return;
    };

    if chunk.len() >= MAX_OUTPUT_SNAPSHOT_BYTES {
        buffer.clear();
        let start = chunk.len() - MAX_OUTPUT_SNAPSHOT_BYTES;
        buffer.extend_from_slice(&chunk[start..]);
        return;
    }

    let total_after_append = buffer.len() + chunk.len();
    if total_after_append > MAX_OUTPUT_SNAPSHOT_BYTES {
        let overflow = total_after_append - MAX_OUTPUT_SNAPSHOT_BYTES;
        buffer.drain(..overflow);
    }

    buffer.extend_from_slice(chunk);
}
