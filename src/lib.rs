//! A small Brainfuck tape-machine interpreter.
//!
//! The machine is a fixed-size tape of wrapping byte cells (30,000 by
//! default) with a single data pointer, driven by eight commands:
//!
//! - `>` / `<` move the data pointer; leaving the tape is an error.
//! - `+` / `-` increment or decrement the current cell, wrapping at 0 and 255.
//! - `.` outputs the current cell: the Latin-1 character of the same value
//!   for character sinks, one raw byte for writers and stdout.
//! - `,` stores the next character of the supplied input; once the input is
//!   exhausted the cell is left unchanged.
//! - `[` / `]` delimit loops. Matching brackets are found by scanning the
//!   program each time a bracket executes, so an unmatched bracket is only
//!   reported when it is reached.
//!
//! Every other character is a comment.
//!
//! Quick start:
//!
//! ```
//! use tapebf::Interpreter;
//!
//! // 2 * 3 through a nested loop, then print the result cell.
//! let mut bf = Interpreter::new("++[>+++<-]>.", "");
//! let out = bf.run_to_string().expect("program should run");
//! assert_eq!(out, "\u{6}");
//! ```

pub mod cell;
pub mod command;
pub mod config;
pub mod error;
pub mod handlers;
pub mod interpreter;
pub mod source;
pub mod tape;

pub mod cli_util;
pub mod commands;

pub use cell::ByteCell;
pub use command::Command;
pub use error::{ErrorCategory, InterpreterError};
pub use interpreter::{Interpreter, RunState, StepControl, StepEvent};
pub use source::ProgramSource;
pub use tape::{Tape, DEFAULT_TAPE_SIZE};
