//! Line-oriented prompts shared by the two interactive programs.
use colored::Colorize;

use std::io::{self, BufRead, Write};


/// A prompt/answer channel over any reader and writer.
/// The programs use stdin/stdout; tests pass a `Cursor` and a `Vec<u8>`.
pub struct Console<R, W> {
    input: R,
    output: W,
}


impl Console<io::StdinLock<'static>, io::Stdout> {
    /// A console on the process's standard streams.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}


impl<R: BufRead, W: Write> Console<R, W> {
    /// Construct a new console.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }


    /// Write `question` and read one line.
    /// The trailing newline and surrounding blanks are removed.
    /// Returns `None` at end of input.
    pub fn prompt(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{} ", question.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }


    /// Like [`Console::prompt`], but an empty answer yields `default`.
    /// Returns `None` at end of input.
    pub fn prompt_default(&mut self, question: &str, default: &str)
        -> io::Result<Option<String>>
    {
        let question = format!("{question} [{default}]:");
        let answer = self.prompt(&question)?
            .map(|answer| {
                if answer.is_empty() { default.to_string() } else { answer }
            });
        Ok(answer)
    }


    /// Ask a yes/no question. Only `y` counts as yes.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let question = format!("{question} (y/n):");
        let answer = self.prompt(&question)?;
        Ok(answer.as_deref() == Some("y"))
    }


    /// Write one line.
    pub fn say<S: AsRef<str>>(&mut self, line: S) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref())
    }


    /// Write a notice in green.
    pub fn notice<S: AsRef<str>>(&mut self, line: S) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref().bold().green())
    }


    /// Write a warning in red.
    pub fn warn<S: AsRef<str>>(&mut self, line: S) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref().bold().red())
    }


    /// Consume the console and return the writer.
    pub fn into_output(self) -> W {
        self.output
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn prompt_trims_and_stops_at_eof() {
        let mut console = Console::new(Cursor::new("  abc \n"), Vec::new());
        assert_eq!(console.prompt("?").unwrap().as_deref(), Some("abc"));
        assert_eq!(console.prompt("?").unwrap(), None);
    }


    #[test]
    fn empty_answer_keeps_default() {
        let mut console = Console::new(Cursor::new("\nsgd\n"), Vec::new());
        let mut ask = || console.prompt_default("Optimizer", "adam").unwrap();
        assert_eq!(ask().as_deref(), Some("adam"));
        assert_eq!(ask().as_deref(), Some("sgd"));
        assert_eq!(ask(), None);
    }


    #[test]
    fn only_y_confirms() {
        let mut console = Console::new(Cursor::new("y\nyes\nn\n"), Vec::new());
        assert!(console.confirm("Save?").unwrap());
        assert!(!console.confirm("Save?").unwrap());
        assert!(!console.confirm("Save?").unwrap());
        assert!(!console.confirm("Save?").unwrap());
    }
}
