//! Interactive confirmation on stdin.

use std::io::{self, BufRead, Write};

/// Ask a yes/no question; anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> io::Result<bool> {
    let answer = ask(&format!("{} [y/N] ", question))?;
    Ok(is_yes(&answer))
}

/// Print `prompt` and read one line from stdin, without the newline.
pub fn ask(prompt: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
