//! ui::prompts
//!
//! Line-based confirmations on stdin.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Interpret a yes/no answer. Blank takes the default; anything
/// unrecognized is `None`.
pub fn parse_answer(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask a yes/no question on stderr and read the answer from stdin.
///
/// Returns `Err(PromptError::NotInteractive)` if not in interactive mode and
/// `Err(PromptError::Cancelled)` on end of input.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let stdin = io::stdin();
    confirm_with(message, default, &mut stdin.lock(), &mut io::stderr())
}

/// [`confirm`] over arbitrary streams. Re-asks until the answer is understood.
pub fn confirm_with<R: BufRead, W: Write>(
    message: &str,
    default: bool,
    reader: &mut R,
    writer: &mut W,
) -> Result<bool, PromptError> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        write!(writer, "{} {} ", message, hint)?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        if let Some(answer) = parse_answer(&line, default) {
            return Ok(answer);
        }
        writeln!(writer, "please answer y or n")?;
    }
}
