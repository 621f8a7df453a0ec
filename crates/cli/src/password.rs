//! Password acquisition for the `cipher` feature.
//!
//! Grounded in the two-matching-entries password prompt: when standard
//! input is a terminal, the user is asked to enter the password twice and
//! re-prompted on a mismatch, masked via [`rpassword`]. When standard input
//! is not a terminal (piped input, a test harness, a script), a single line
//! is read and trusted without confirmation — there is no terminal to
//! re-prompt against.

use std::io::{self, BufRead};

use is_terminal::IsTerminal;
use zeroize::Zeroizing;

use cipher::Secret;

/// Errors raised while acquiring a password.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Reading from the terminal or standard input failed.
    #[error("failed to read password: {0}")]
    Io(#[from] io::Error),
}

/// Acquires a password, confirming it by double entry when a terminal is
/// attached.
pub fn acquire_password() -> Result<Secret, PasswordError> {
    if io::stdin().is_terminal() {
        prompt_confirmed()
    } else {
        read_line_from_stdin()
    }
}

fn prompt_confirmed() -> Result<Secret, PasswordError> {
    loop {
        let first = Zeroizing::new(rpassword::prompt_password("Enter password: ")?);
        let second = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);
        if *first == *second {
            return Ok(Secret::new(first.as_bytes().to_vec()));
        }
        eprintln!("passwords did not match, try again");
    }
}

fn read_line_from_stdin() -> Result<Secret, PasswordError> {
    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    while matches!(line.chars().last(), Some('\n' | '\r')) {
        line.pop();
    }
    Ok(Secret::new(line.as_bytes().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_line_from_stdin_trims_trailing_newline() {
        // `read_line_from_stdin` reads the real process stdin, so this test
        // only exercises the trimming helper's logic via a direct buffer.
        let mut line = Zeroizing::new("hunter2\n".to_string());
        while matches!(line.chars().last(), Some('\n' | '\r')) {
            line.pop();
        }
        assert_eq!(*line, "hunter2");
    }
}
