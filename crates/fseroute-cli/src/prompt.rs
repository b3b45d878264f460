//! Interactive prompts for values not given on the command line.
//!
//! Prompts are written to any `Write` and answers read from any `BufRead`,
//! so the binary uses stdin/stdout while tests script the conversation.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

/// Question-and-answer session over a reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask `question` and return the trimmed answer.
    ///
    /// Fails if the input is closed before an answer arrives.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .with_context(|| format!("failed to read answer to '{question}'"))?;
        if read == 0 {
            bail!("input closed before '{question}' was answered");
        }
        Ok(line.trim().to_string())
    }

    /// Ask for a starting airport until a non-empty code is given.
    pub fn ask_airport(&mut self) -> Result<String> {
        loop {
            let answer = self.ask("Starting airport")?;
            if !answer.is_empty() {
                return Ok(answer.to_ascii_uppercase());
            }
        }
    }

    /// Ask for a positive whole number. An empty answer takes `default`
    /// when there is one; anything unparsable asks again.
    pub fn ask_count(&mut self, question: &str, default: Option<usize>) -> Result<usize> {
        let question = match default {
            Some(value) => format!("{question} [{value}]"),
            None => question.to_string(),
        };
        loop {
            let answer = self.ask(&question)?;
            if answer.is_empty() {
                if let Some(value) = default {
                    return Ok(value);
                }
                continue;
            }
            match answer.parse::<usize>() {
                Ok(value) if value > 0 => return Ok(value),
                _ => writeln!(self.output, "Please enter a whole number greater than zero.")?,
            }
        }
    }

    /// Ask a Y/N question. Only answers starting with `y` (any case) count
    /// as yes; an empty answer is no.
    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} (Y/N)"))?;
        Ok(answer
            .chars()
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(&'y')))
    }
}
