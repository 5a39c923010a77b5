//! Confirmation gate
//!
//! Every operator decision goes through a closed-vocabulary yes/no prompt.
//! Unrecognized input is never interpreted as an answer: the question is
//! asked again until a valid token arrives (or the input stream ends).

use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};

/// A yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Affirmative
    Yes,
    /// Negative
    No,
}

impl Answer {
    /// Convert to a bool (`Yes` is `true`)
    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }
}

/// The literal token a typed confirmation requires
pub const TYPED_CONFIRMATION_TOKEN: &str = "yes";

/// Parse a yes/no response (case-insensitive)
///
/// Returns `None` for anything outside `y`, `yes`, `n`, `no`. Empty input is
/// also `None`; defaults are applied by the caller.
pub fn parse_answer(input: &str) -> Option<Answer> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Answer::Yes),
        "n" | "no" => Some(Answer::No),
        _ => None,
    }
}

/// Parse a typed-confirmation response
///
/// Only the literal [`TYPED_CONFIRMATION_TOKEN`] confirms. `n`/`no` decline.
/// Everything else, including empty input and a bare `y`, is `None`.
pub fn parse_typed(input: &str) -> Option<Answer> {
    match input.trim().to_lowercase().as_str() {
        TYPED_CONFIRMATION_TOKEN => Some(Answer::Yes),
        "n" | "no" => Some(Answer::No),
        _ => None,
    }
}

/// Source of operator decisions
pub trait Confirm {
    /// Ask a yes/no question; empty input selects `default`
    fn yes_no(&mut self, question: &str, default: Answer) -> Result<bool>;

    /// Ask for a typed confirmation of a destructive operation
    ///
    /// No default applies: only the literal affirmative token confirms.
    fn typed(&mut self, operation: &str) -> Result<bool>;
}

/// Console prompt over any reader/writer pair
pub struct PromptGate<R, W> {
    input: R,
    output: W,
}

impl PromptGate<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptGate<R, W> {
    /// Create a gate reading answers from `input` and writing prompts to `output`
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the writer (useful for inspecting prompts in tests)
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(Error::Console)?;
        if n == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line)
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush())
            .map_err(Error::Console)
    }

    /// Let the operator pick one entry of a numbered list
    ///
    /// Returns the zero-based index. Re-prompts on anything that is not a
    /// number in range.
    pub fn select(&mut self, title: &str, options: &[String]) -> Result<usize> {
        if options.is_empty() {
            return Err(Error::NoDevices);
        }

        self.write(&format!("\n{}\n", title))?;
        for (i, option) in options.iter().enumerate() {
            self.write(&format!("  {}. {}\n", i + 1, option))?;
        }

        loop {
            self.write(&format!("Select (1-{}): ", options.len()))?;
            let line = self.read_line()?;
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => self.write("Invalid choice. Please try again.\n")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptGate<R, W> {
    fn yes_no(&mut self, question: &str, default: Answer) -> Result<bool> {
        let suffix = match default {
            Answer::Yes => "[Y/n]",
            Answer::No => "[y/N]",
        };

        loop {
            self.write(&format!("{} {}: ", question, suffix))?;
            let line = self.read_line()?;
            if line.trim().is_empty() {
                return Ok(default.is_yes());
            }
            match parse_answer(&line) {
                Some(answer) => return Ok(answer.is_yes()),
                None => self.write("Invalid input! Please enter y/n\n")?,
            }
        }
    }

    fn typed(&mut self, operation: &str) -> Result<bool> {
        self.write(&format!("\nCONFIRM: {}?\n", operation))?;
        loop {
            self.write(&format!(
                "Type '{}' to confirm: ",
                TYPED_CONFIRMATION_TOKEN
            ))?;
            let line = self.read_line()?;
            match parse_typed(&line) {
                Some(answer) => return Ok(answer.is_yes()),
                None => self.write(&format!(
                    "Please type '{}' or 'no'\n",
                    TYPED_CONFIRMATION_TOKEN
                ))?,
            }
        }
    }
}
