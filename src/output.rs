use std::io::Write;

/// Abstraction over user-facing output.
///
/// Command modules use this trait instead of `println!`/`eprintln!` so that
/// reports go to stdout, diagnostics go to stderr, and tests can capture
/// both.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Removing old container...")
    fn status(&self, message: &str);

    /// Success message (e.g., "stt-service started")
    fn success(&self, message: &str);

    /// Warning message (e.g., "No .env file found")
    fn warning(&self, message: &str);

    /// Error message
    fn error(&self, message: &str);

    /// Inline progress (no trailing newline). Call `finish_progress` after.
    fn progress(&self, message: &str);

    /// Finish an inline progress line with a result.
    fn finish_progress(&self, result: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Standard CLI output: writes to stdout/stderr with ANSI colors.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[31m{}\x1b[0m", message);
    }

    fn progress(&self, message: &str) {
        print!("{}", message);
        std::io::stdout().flush().ok();
    }

    fn finish_progress(&self, result: &str) {
        println!("{}", result);
    }

    fn blank(&self) {
        println!();
    }
}

/// Records every line. Used by command tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingOutput {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingOutput {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

#[cfg(test)]
impl UserOutput for RecordingOutput {
    fn status(&self, message: &str) {
        self.push(message.to_string());
    }
    fn success(&self, message: &str) {
        self.push(message.to_string());
    }
    fn warning(&self, message: &str) {
        self.push(format!("warning: {}", message));
    }
    fn error(&self, message: &str) {
        self.push(format!("error: {}", message));
    }
    fn progress(&self, message: &str) {
        self.push(message.to_string());
    }
    fn finish_progress(&self, result: &str) {
        self.push(result.to_string());
    }
    fn blank(&self) {
        self.push(String::new());
    }
}
