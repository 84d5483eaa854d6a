//! Line-oriented question and answer prompting for the create commands.
//!
//! The wizard is generic over its endpoints so tests can drive it with
//! in-memory buffers instead of a terminal.

use crate::error::{self, Result};
use snafu::ResultExt;
use std::io::{BufRead, Write};

pub(crate) struct Wizard<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub(crate) fn new(input: R, output: W) -> Self {
        Wizard { input, output }
    }

    /// Prints a question and returns the answer line, trimmed.
    pub(crate) fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{} ", question).context(error::WritePromptSnafu)?;
        self.output.flush().context(error::WritePromptSnafu)?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context(error::ReadAnswerSnafu)?;
        Ok(line.trim().to_string())
    }

    /// Asks a yes/no question; anything but "y"/"yes" counts as no.
    pub(crate) fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question)?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    /// Asks for a comma-separated list; empty entries are dropped.
    pub(crate) fn ask_list(&mut self, question: &str) -> Result<Vec<String>> {
        Ok(self
            .ask(question)?
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect())
    }
}
