use std::fmt;
use std::io;

/// Errors that can occur while interpreting a program.
///
/// Every variant aborts the run. The machine state is left exactly as it was
/// before the failing command tried to mutate it.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// A `[` on a zero cell has no matching `]` further along the program.
    #[error("no closing bracket for '[' at instruction {ip}")]
    UnmatchedClosingBracket { ip: usize },

    /// A `]` has no matching `[` earlier in the program.
    #[error("no opening bracket for ']' at instruction {ip}")]
    UnmatchedOpeningBracket { ip: usize },

    /// The data pointer would leave the tape.
    #[error("bad memory pointer value: {target} at instruction {ip} (tape size {size})")]
    BadMemoryPointer { ip: usize, target: isize, size: usize },

    /// The program counter points past the end of the program.
    #[error("bad command pointer value: {pc} (program length {len})")]
    BadCommandPointer { pc: usize, len: usize },

    /// An input character does not fit in a cell.
    #[error("bad input character '{ch}' (code {code}) at instruction {ip}: code must be between 0 and 255")]
    BadInput { ch: char, code: u32, ip: usize },

    /// The output sink failed to take a byte written by `.`.
    #[error("output error at instruction {ip}: {source}")]
    Output {
        ip: usize,
        #[source]
        source: io::Error,
    },

    /// Execution aborted due to step limit.
    #[error("step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("cancelled")]
    Canceled,
}

/// Broad family of an [`InterpreterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed bracket nesting.
    Syntax,
    /// The program did something the machine cannot do.
    Runtime,
    /// The caller stopped the run.
    Aborted,
}

impl InterpreterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            InterpreterError::UnmatchedClosingBracket { .. }
            | InterpreterError::UnmatchedOpeningBracket { .. } => ErrorCategory::Syntax,
            InterpreterError::BadMemoryPointer { .. }
            | InterpreterError::BadCommandPointer { .. }
            | InterpreterError::BadInput { .. }
            | InterpreterError::Output { .. } => ErrorCategory::Runtime,
            InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => {
                ErrorCategory::Aborted
            }
        }
    }

    /// Instruction index the error points at, when it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            InterpreterError::UnmatchedClosingBracket { ip }
            | InterpreterError::UnmatchedOpeningBracket { ip }
            | InterpreterError::BadMemoryPointer { ip, .. }
            | InterpreterError::BadInput { ip, .. }
            | InterpreterError::Output { ip, .. } => Some(*ip),
            InterpreterError::BadCommandPointer { pc, .. } => Some(*pc),
            InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => None,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "Syntax error"),
            ErrorCategory::Runtime => write!(f, "Runtime error"),
            ErrorCategory::Aborted => write!(f, "Execution aborted"),
        }
    }
}
