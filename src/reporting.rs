use crate::process::ToolError;

/// User-facing notifications the host shell renders.
pub trait Reporter {
    fn show_information(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
}

/// Converts an executor result into a single toast: trimmed stdout when the
/// tool said something, a stock confirmation when it did not, the error
/// message on failure.
pub fn report_output(result: Result<String, ToolError>, reporter: &mut dyn Reporter) {
    match result {
        Ok(stdout) => {
            let trimmed = stdout.trim();
            if trimmed.is_empty() {
                reporter.show_information("Operation successful.");
            } else {
                reporter.show_information(trimmed);
            }
        }
        Err(error) => reporter.show_error(&error.to_string()),
    }
}
