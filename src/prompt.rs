use anyhow::{Result, bail};
use std::io::{BufRead, Write};

/// Line-based console questions over any reader/writer pair
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Input closed while waiting for: {}", question.trim());
        }
        Ok(line.trim().to_string())
    }

    /// Free text, trimmed; may be empty
    pub fn ask_text(&mut self, question: &str) -> Result<String> {
        self.read_answer(question)
    }

    /// Ask until `parse` accepts the answer, echoing its complaint each time
    pub fn ask_parsed<T, F>(&mut self, question: &str, parse: F) -> Result<T>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        loop {
            let answer = self.read_answer(question)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(complaint) => writeln!(self.output, "{complaint}")?,
            }
        }
    }

    /// "y" or "yes" (any case) is true, anything else false
    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_answer(question)?.to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    /// Index into `choices` of the option the user typed
    pub fn ask_choice(&mut self, question: &str, choices: &[&str]) -> Result<usize> {
        self.ask_parsed(question, |answer| {
            choices
                .iter()
                .position(|choice| choice.eq_ignore_ascii_case(answer))
                .ok_or_else(|| format!("Please enter one of: {}", choices.join(", ")))
        })
    }
}
