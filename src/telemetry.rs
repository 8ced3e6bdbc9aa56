pub(crate) fn log_cli_telemetry(telemetry_enabled: bool, event: &str, details: &str) {
    if !telemetry_enabled {
        return;
    }
    eprintln!("[tracklab-telemetry] event={event} {details}");
}
