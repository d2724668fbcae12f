use crate::error::PromptError;
use crate::output::Output;
use colored::Colorize;
use std::io::{self, BufRead};

/// Obtains a yes/no decision before an update is applied.
///
/// Returning `Ok(())` means accepted; [`PromptError::Declined`] means rejected.
pub trait Prompt {
    fn confirm(&mut self) -> Result<(), PromptError>;
}

/// Asks on the output and reads the answer from an input stream (stdin by default).
pub struct TerminalPrompt {
    output: Output,
    /// `None` reads stdin, locked only while an answer is read
    input: Option<Box<dyn BufRead>>,
    question: String,
}

impl TerminalPrompt {
    pub fn new(output: Output) -> Self {
        Self {
            output,
            input: None,
            question: "Apply these updates?".to_string(),
        }
    }

    pub fn with_input(output: Output, input: Box<dyn BufRead>) -> Self {
        Self {
            input: Some(input),
            ..Self::new(output)
        }
    }

    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }

    fn read_answer(&mut self, answer: &mut String) -> io::Result<usize> {
        match &mut self.input {
            Some(input) => input.read_line(answer),
            None => io::stdin().lock().read_line(answer),
        }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&mut self) -> Result<(), PromptError> {
        loop {
            self.output
                .write_inline(&format!("{} {}", self.question.bold(), "[Y/n]: ".bold()))?;

            let mut input = String::new();
            if self.read_answer(&mut input)? == 0 {
                // stdin closed
                self.output.write_line("")?;
                return Err(PromptError::Declined);
            }

            match input.trim().to_lowercase().as_str() {
                "" | "y" | "yes" => return Ok(()),
                "n" | "no" | "q" | "quit" => return Err(PromptError::Declined),
                _ => {
                    self.output
                        .write_line(&"Please answer with y(es) or n(o).".red().to_string())?;
                }
            }
        }
    }
}

/// Accepts every confirmation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn confirm(&mut self) -> Result<(), PromptError> {
        Ok(())
    }
}

/// Declines every confirmation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl Prompt for AutoDecline {
    fn confirm(&mut self) -> Result<(), PromptError> {
        Err(PromptError::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt_with(answer: &str) -> (TerminalPrompt, crate::output::SharedBuffer) {
        let (output, buffer) = Output::buffer();
        let input = Box::new(Cursor::new(answer.as_bytes().to_vec()));
        (TerminalPrompt::with_input(output, input), buffer)
    }

    #[test]
    fn empty_answer_accepts() {
        let (mut prompt, buffer) = prompt_with("\n");
        assert!(prompt.confirm().is_ok());
        assert!(buffer.contents().contains("Apply these updates?"));
    }

    #[test]
    fn no_declines() {
        let (mut prompt, _) = prompt_with("n\n");
        assert!(matches!(prompt.confirm(), Err(PromptError::Declined)));
    }

    #[test]
    fn unknown_answer_asks_again() {
        let (mut prompt, buffer) = prompt_with("maybe\nyes\n");
        assert!(prompt.confirm().is_ok());
        assert!(buffer.contents().contains("Please answer with y(es) or n(o)."));
    }

    #[test]
    fn closed_input_declines() {
        let (mut prompt, _) = prompt_with("");
        assert!(matches!(prompt.confirm(), Err(PromptError::Declined)));
    }

    #[test]
    fn custom_question_is_shown() {
        let (prompt, buffer) = prompt_with("y\n");
        let mut prompt = prompt.question("Proceed?");
        prompt.confirm().unwrap();
        assert!(buffer.contents().contains("Proceed?"));
    }

    #[test]
    fn idle_terminal_prompt_leaves_stdin_unlocked() {
        use std::sync::mpsc;
        use std::time::Duration;

        let _prompt = TerminalPrompt::new(Output::Stdout);

        let (locked, acquired) = mpsc::channel();
        std::thread::spawn(move || {
            let _stdin = io::stdin().lock();
            let _ = locked.send(());
        });

        assert!(acquired.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn stubs_behave_as_named() {
        assert!(AutoConfirm.confirm().is_ok());
        assert!(matches!(AutoDecline.confirm(), Err(PromptError::Declined)));
    }
}
