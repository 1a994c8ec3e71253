//! Console output abstraction for the shell.
//!
//! The `ShellConsole` trait provides line output that works identically
//! for both testing (HeadlessConsole) and real terminals.

/// Console interface for shell output.
pub trait ShellConsole {
    /// Write one line of command output.
    fn write_line(&mut self, line: &str);

    /// Show the prompt before reading a command. Default is a no-op.
    fn write_prompt(&mut self, _prompt: &str) {}
}

/// Headless console for testing - captures output lines and prompts.
#[derive(Debug, Default)]
pub struct HeadlessConsole {
    lines: Vec<String>,
    prompts: Vec<String>,
}

impl HeadlessConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// All output lines written so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Output joined with newlines.
    pub fn output_string(&self) -> String {
        self.lines.join("\n")
    }

    /// Prompts shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Clear output buffer.
    pub fn clear_output(&mut self) {
        self.lines.clear();
        self.prompts.clear();
    }
}

impl ShellConsole for HeadlessConsole {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn write_prompt(&mut self, prompt: &str) {
        self.prompts.push(prompt.to_string());
    }
}
