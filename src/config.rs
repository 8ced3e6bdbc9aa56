use std::collections::HashMap;
use std::path::PathBuf;

pub(crate) const DEFAULT_TOOL_BIN: &str = "evx";
const TOOL_BIN_ENV_VAR: &str = "EVX_BIN";

// The wrapped CLI must never phone home or block on a pager while we drive it.
const TOOL_ENV_OVERRIDES: [(&str, &str); 2] = [("EVX_NO_ANALYTICS", "true"), ("EVX_NO_PAGER", "1")];

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub cli_path: Option<PathBuf>,
    pub telemetry_enabled: bool,
}

impl Config {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self {
            cli_path,
            telemetry_enabled: false,
        }
    }

    pub fn resolve_executable(&self) -> String {
        let configured = self
            .cli_path
            .as_ref()
            .map(|path| path.display().to_string());
        let env_override = std::env::var(TOOL_BIN_ENV_VAR).ok();
        pick_executable(configured.as_deref(), env_override.as_deref())
    }

    /// Derived fresh on every call so environment changes between invocations
    /// are always picked up.
    pub fn execution_env(&self) -> HashMap<String, String> {
        let mut env = std::env::vars().collect::<HashMap<_, _>>();
        for (key, value) in TOOL_ENV_OVERRIDES {
            env.insert(key.to_string(), value.to_string());
        }
        env
    }
}

fn pick_executable(configured: Option<&str>, env_override: Option<&str>) -> String {
    if let Some(path) = configured.map(str::trim).filter(|value| !value.is_empty()) {
        return path.to_string();
    }

    env_override
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_TOOL_BIN)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_configured_cli_path() {
        let picked = pick_executable(Some("/usr/local/bin/evx"), Some("elsewhere"));
        assert_eq!(picked, "/usr/local/bin/evx");
    }

    #[test]
    fn falls_back_to_env_override_then_default() {
        assert_eq!(pick_executable(None, Some(" /opt/evx ")), "/opt/evx");
        assert_eq!(pick_executable(Some("   "), None), DEFAULT_TOOL_BIN);
        assert_eq!(pick_executable(None, Some("")), DEFAULT_TOOL_BIN);
    }

    #[test]
    fn execution_env_carries_process_env_and_overrides() {
        let config = Config::default();
        let env = config.execution_env();
        assert_eq!(env.get("EVX_NO_ANALYTICS").map(String::as_str), Some("true"));
        assert_eq!(env.get("EVX_NO_PAGER").map(String::as_str), Some("1"));
        // PATH comes through so the executable can still be resolved
        assert!(env.contains_key("PATH"));
    }
}
