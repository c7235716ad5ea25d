//! Blocking line input for tutorial step bodies

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;
use tracing::debug;

/// Errors from reading user input
#[derive(Debug, Error)]
pub enum InputError {
    /// Interrupt or end of input; unwinds to the nearest menu
    #[error("Input cancelled")]
    Cancelled,

    #[error("Failed to read input: {0}")]
    Readline(#[from] ReadlineError),
}

/// True when an error chain bottoms out in a user cancellation
pub fn is_cancelled(err: &eyre::Report) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<InputError>(), Some(InputError::Cancelled)))
}

/// Source of typed lines
pub trait LineInput {
    /// Show `prompt` and block until the user submits a line
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError>;

    /// Block until the user acknowledges
    fn pause(&mut self, prompt: &str) -> Result<(), InputError> {
        self.read_line(prompt).map(|_| ())
    }
}

/// Line editor backed by rustyline
pub struct ReadlineInput {
    editor: DefaultEditor,
}

impl ReadlineInput {
    pub fn new() -> Result<Self, InputError> {
        debug!("ReadlineInput::new: called");
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineInput for ReadlineInput {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(line.trim().to_string())
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("ReadlineInput::read_line: cancelled");
                Err(InputError::Cancelled)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Plain line reader over stdin, for pipes and dumb terminals
#[derive(Debug, Default)]
pub struct StdinInput;

impl StdinInput {
    pub fn new() -> Self {
        Self
    }
}

impl LineInput for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        print!("{}", prompt);
        let _ = io::stdout().flush();
        let mut line = String::new();
        let n = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| InputError::Readline(ReadlineError::Io(e)))?;
        if n == 0 {
            debug!("StdinInput::read_line: end of input");
            return Err(InputError::Cancelled);
        }
        // Keep piped transcripts readable
        println!();
        Ok(line.trim().to_string())
    }
}

/// Replays canned answers; running out behaves like end of input
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    /// Prompts shown so far
    pub prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(InputError::Cancelled)
    }
}
