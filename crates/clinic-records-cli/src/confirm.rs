//! Confirmation gate for destructive commands.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Prompts on a terminal and reads the answer line.
///
/// Only `y` or `yes` (any case) counts as consent. End of input declines.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        write!(self.output, "{} [y/N] ", prompt)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        let answer = answer.trim().to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Prompts on stderr and reads stdin, holding the stdin lock only while asking.
pub struct StdioConfirm;

impl Confirm for StdioConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        TerminalConfirm::new(io::stdin().lock(), io::stderr()).confirm(prompt)
    }
}

/// Consents to everything (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Replays fixed answers and records the prompts it was shown.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

impl<C: Confirm + ?Sized> Confirm for &mut C {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        (**self).confirm(prompt)
    }
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        (**self).confirm(prompt)
    }
}
