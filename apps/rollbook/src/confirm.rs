//! # Confirmation Prompts
//!
//! Destructive actions ask before they send anything. Declining sends nothing;
//! there is no undo after accepting.

use std::io::{BufRead, Write};

/// Something that can answer a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Asks on stderr and reads the answer from a line of input.
///
/// Only `y` or `yes` (any case) accepts; anything else, including end of
/// input, declines.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Prompt wired to the terminal.
pub fn terminal() -> LinePrompt<std::io::StdinLock<'static>, std::io::Stderr> {
    LinePrompt::new(std::io::stdin().lock(), std::io::stderr())
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if write!(self.output, "{prompt} [y/N] ")
            .and_then(|()| self.output.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

/// Accepts every prompt (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::debug!("Confirmed without asking: {}", prompt);
        true
    }
}
