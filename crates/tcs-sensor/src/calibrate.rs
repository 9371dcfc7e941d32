//! Operator confirmation for the white-balance phase.

use std::io::{self, BufRead, Write};

/// Prompt shown before the white reference is measured.
pub const WHITE_CARD_PROMPT: &str =
    "Place a white object (like paper) in front of the sensor and press Enter...";

/// Blocks until the operator confirms the white reference is in place.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<()>;
}

/// Confirmation read from the process's stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<()> {
        prompt_and_wait(&mut io::stdin().lock(), &mut io::stdout().lock(), prompt)
    }
}

/// Write the calibration banner and `prompt`, then wait for one line of input.
///
/// End of input before a line arrives is an `UnexpectedEof` error.
fn prompt_and_wait<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<()> {
    writeln!(output)?;
    writeln!(output, "--- White Balance Calibration ---")?;
    write!(output, "{} ", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed before calibration was confirmed",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_confirms() {
        let mut output = Vec::new();
        prompt_and_wait(&mut &b"\n"[..], &mut output, WHITE_CARD_PROMPT).unwrap();

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("--- White Balance Calibration ---"));
        assert!(shown.ends_with("press Enter... "));
    }

    #[test]
    fn test_closed_stdin_is_an_error() {
        let mut output = Vec::new();
        let err = prompt_and_wait(&mut &b""[..], &mut output, WHITE_CARD_PROMPT).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
