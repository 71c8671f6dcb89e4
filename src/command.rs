//! The eight active commands.

use std::fmt;

use crate::error::InterpreterError;
use crate::handlers::{self, Machine};

/// A command symbol recognised by the interpreter.
///
/// Any character that does not map to a variant is a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `>`
    MoveRight,
    /// `<`
    MoveLeft,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    LoopStart,
    /// `]`
    LoopEnd,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::MoveRight,
        Command::MoveLeft,
        Command::Increment,
        Command::Decrement,
        Command::Output,
        Command::Input,
        Command::LoopStart,
        Command::LoopEnd,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '>' => Command::MoveRight,
            '<' => Command::MoveLeft,
            '+' => Command::Increment,
            '-' => Command::Decrement,
            '.' => Command::Output,
            ',' => Command::Input,
            '[' => Command::LoopStart,
            ']' => Command::LoopEnd,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Command::MoveRight => '>',
            Command::MoveLeft => '<',
            Command::Increment => '+',
            Command::Decrement => '-',
            Command::Output => '.',
            Command::Input => ',',
            Command::LoopStart => '[',
            Command::LoopEnd => ']',
        }
    }

    /// Run this command's handler against the machine.
    pub fn execute(self, machine: &mut Machine<'_>) -> Result<(), InterpreterError> {
        match self {
            Command::MoveRight => handlers::move_right(machine),
            Command::MoveLeft => handlers::move_left(machine),
            Command::Increment => handlers::increment(machine),
            Command::Decrement => handlers::decrement(machine),
            Command::Output => handlers::output(machine),
            Command::Input => handlers::input(machine),
            Command::LoopStart => handlers::loop_start(machine),
            Command::LoopEnd => handlers::loop_end(machine),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
