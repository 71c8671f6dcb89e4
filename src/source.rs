//! Program text and the input queue consumed by `,`.

use std::collections::VecDeque;
use std::fmt;

use crate::error::InterpreterError;

/// Pulls one more input character on demand; `None` means end of input.
pub type InputProvider = Box<dyn FnMut() -> Option<char> + Send>;

/// The program being run plus the characters still waiting to be read.
///
/// End of program is the position `program_length()`: fetching there yields
/// `Ok(None)`. No marker character is stored in the text, so every user
/// character stays an ordinary command or comment.
///
/// Input comes from the queue given at construction first, then from the
/// input provider, if one is set.
pub struct ProgramSource {
    commands: Vec<char>,
    input: VecDeque<char>,
    input_provider: Option<InputProvider>,
}

impl fmt::Debug for ProgramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramSource")
            .field("commands", &self.commands)
            .field("input", &self.input)
            .field("input_provider", &self.input_provider.is_some())
            .finish()
    }
}

impl ProgramSource {
    pub fn new(program: &str, input: &str) -> Self {
        Self {
            commands: program.chars().collect(),
            input: input.chars().collect(),
            input_provider: None,
        }
    }

    /// Read further input lazily, one character per `,`, once the queue is empty.
    pub fn set_input_provider(&mut self, provider: InputProvider) {
        self.input_provider = Some(provider);
    }

    /// Number of user characters in the program.
    pub fn program_length(&self) -> usize {
        self.commands.len()
    }

    /// The character at `pc`, or `None` at the end-of-program position.
    pub fn command_at(&self, pc: usize) -> Result<Option<char>, InterpreterError> {
        match pc.cmp(&self.commands.len()) {
            std::cmp::Ordering::Less => Ok(Some(self.commands[pc])),
            std::cmp::Ordering::Equal => Ok(None),
            std::cmp::Ordering::Greater => Err(InterpreterError::BadCommandPointer {
                pc,
                len: self.commands.len(),
            }),
        }
    }

    pub fn is_end(&self, pc: usize) -> bool {
        pc == self.commands.len()
    }

    /// Pop the next input character. `None` once the queue and the provider
    /// are exhausted.
    pub fn next_input_char(&mut self) -> Option<char> {
        match self.input.pop_front() {
            Some(ch) => Some(ch),
            None => self.input_provider.as_mut().and_then(|next| next()),
        }
    }

    /// Queued input not consumed yet. Input the provider has not produced
    /// yet is not included.
    pub fn remaining_input(&self) -> String {
        self.input.iter().collect()
    }

    /// Check bracket balance over the whole program without running it.
    ///
    /// Reports the first `]` with nothing to close, otherwise the last `[`
    /// left open.
    pub fn check_brackets(&self) -> Result<(), InterpreterError> {
        let mut stack: Vec<usize> = Vec::new();
        for (i, &c) in self.commands.iter().enumerate() {
            if c == '[' {
                stack.push(i);
            } else if c == ']' && stack.pop().is_none() {
                return Err(InterpreterError::UnmatchedOpeningBracket { ip: i });
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(InterpreterError::UnmatchedClosingBracket { ip: unmatched_open });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_within_program_and_at_end() {
        let source = ProgramSource::new("+-", "");
        assert_eq!(source.program_length(), 2);
        assert_eq!(source.command_at(0).unwrap(), Some('+'));
        assert_eq!(source.command_at(1).unwrap(), Some('-'));
        assert_eq!(source.command_at(2).unwrap(), None);
        assert!(source.is_end(2));
    }

    #[test]
    fn fetch_past_end_is_bad_command_pointer() {
        let source = ProgramSource::new("+", "");
        let err = source.command_at(2).unwrap_err();
        assert!(matches!(err, InterpreterError::BadCommandPointer { pc: 2, len: 1 }));
    }

    #[test]
    fn empty_program_is_immediately_at_end() {
        let source = ProgramSource::new("", "");
        assert_eq!(source.program_length(), 0);
        assert_eq!(source.command_at(0).unwrap(), None);
    }

    #[test]
    fn multibyte_characters_count_once() {
        let source = ProgramSource::new("+é+", "");
        assert_eq!(source.program_length(), 3);
        assert_eq!(source.command_at(1).unwrap(), Some('é'));
    }

    #[test]
    fn input_is_consumed_in_order_once() {
        let mut source = ProgramSource::new(",,", "ab");
        assert_eq!(source.next_input_char(), Some('a'));
        assert_eq!(source.remaining_input(), "b");
        assert_eq!(source.next_input_char(), Some('b'));
        assert_eq!(source.next_input_char(), None);
        assert_eq!(source.next_input_char(), None);
    }

    #[test]
    fn provider_is_asked_only_after_the_queue() {
        let mut source = ProgramSource::new(",,,", "a");
        let mut pending = vec!['c', 'b'];
        source.set_input_provider(Box::new(move || pending.pop()));
        assert_eq!(source.next_input_char(), Some('a'));
        assert_eq!(source.next_input_char(), Some('b'));
        assert_eq!(source.next_input_char(), Some('c'));
        assert_eq!(source.next_input_char(), None);
    }

    #[test]
    fn provider_is_not_called_until_input_is_needed() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut source = ProgramSource::new("+", "");
        source.set_input_provider(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some('x')
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.next_input_char(), Some('x'));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn balanced_brackets_pass_check() {
        assert!(ProgramSource::new("+[>[-]<-]", "").check_brackets().is_ok());
        assert!(ProgramSource::new("no brackets", "").check_brackets().is_ok());
    }

    #[test]
    fn stray_close_is_reported_first() {
        let err = ProgramSource::new("+]", "").check_brackets().unwrap_err();
        assert!(matches!(err, InterpreterError::UnmatchedOpeningBracket { ip: 1 }));
    }

    #[test]
    fn last_open_is_reported() {
        let err = ProgramSource::new("[[]", "").check_brackets().unwrap_err();
        assert!(matches!(err, InterpreterError::UnmatchedClosingBracket { ip: 0 }));
        let err = ProgramSource::new("[+[", "").check_brackets().unwrap_err();
        assert!(matches!(err, InterpreterError::UnmatchedClosingBracket { ip: 2 }));
    }
}
