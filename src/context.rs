use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const RUNNER_RUNNING_CONTEXT_KEY: &str = "runner.running";
pub const COMMAND_RUNNING_CONTEXT_KEY: &str = "command.running";

/// Capability handed to the CLI layer so it can surface busy/running state to
/// whatever command-enablement logic the host shell runs. The core never
/// reaches into a global.
pub trait ContextSink: Send + Sync {
    fn set_context(&self, key: &str, value: bool);
}

#[derive(Default)]
pub struct MemoryContext {
    values: Mutex<HashMap<String, bool>>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> bool {
        let Ok(values) = self.values.lock() else {
            return false;
        };
        values.get(key).copied().unwrap_or(false)
    }
}

impl ContextSink for MemoryContext {
    fn set_context(&self, key: &str, value: bool) {
        let Ok(mut values) = self.values.lock() else {
            return;
        };
        values.insert(key.to_string(), value);
    }
}

pub(crate) struct ContextFlagGuard {
    sink: Arc<dyn ContextSink>,
    key: &'static str,
}

impl ContextFlagGuard {
    pub(crate) fn raise(sink: &Arc<dyn ContextSink>, key: &'static str) -> Self {
        sink.set_context(key, true);
        Self {
            sink: Arc::clone(sink),
            key,
        }
    }
}

impl Drop for ContextFlagGuard {
    // clears the flag on every exit path, error paths included
    fn drop(&mut self) {
        self.sink.set_context(self.key, false);
    }
}
