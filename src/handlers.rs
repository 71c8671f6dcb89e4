//! One handler per command.
//!
//! Handlers validate before they mutate: a handler that returns an error has
//! left the tape, the data pointer and the program counter untouched.

use std::io;

use crate::error::InterpreterError;
use crate::source::ProgramSource;
use crate::tape::Tape;

/// Mutable view of the machine handed to each handler for one command.
pub struct Machine<'a> {
    pub tape: &'a mut Tape,
    pub source: &'a mut ProgramSource,
    pub output: &'a mut dyn FnMut(char) -> io::Result<()>,
}

pub fn move_right(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    m.tape.move_pointer(1)?;
    m.tape.advance();
    Ok(())
}

pub fn move_left(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    m.tape.move_pointer(-1)?;
    m.tape.advance();
    Ok(())
}

pub fn increment(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    let next = m.tape.read_current().increment();
    m.tape.write_current(next);
    m.tape.advance();
    Ok(())
}

pub fn decrement(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    let next = m.tape.read_current().decrement();
    m.tape.write_current(next);
    m.tape.advance();
    Ok(())
}

pub fn output(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    let ip = m.tape.program_counter();
    (m.output)(m.tape.read_current().as_char())
        .map_err(|source| InterpreterError::Output { ip, source })?;
    m.tape.advance();
    Ok(())
}

/// `,` with an exhausted input queue leaves the cell as it is.
pub fn input(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    if let Some(ch) = m.source.next_input_char() {
        let code = u32::from(ch);
        if code > 255 {
            return Err(InterpreterError::BadInput {
                ch,
                code,
                ip: m.tape.program_counter(),
            });
        }
        m.tape.write_current(code);
    }
    m.tape.advance();
    Ok(())
}

/// `[`: enter the body on a non-zero cell, otherwise jump just past the
/// matching `]`.
pub fn loop_start(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    let pc = m.tape.program_counter();
    if !m.tape.read_current().is_zero() {
        m.tape.advance();
        return Ok(());
    }

    let close = find_matching_close(m.source, pc)?;
    m.tape.set_program_counter(close + 1);
    Ok(())
}

/// `]`: jump back onto the matching `[` so it re-tests the cell.
pub fn loop_end(m: &mut Machine<'_>) -> Result<(), InterpreterError> {
    let pc = m.tape.program_counter();
    let open = find_matching_open(m.source, pc)?;
    m.tape.set_program_counter(open);
    Ok(())
}

/// Scan forward from the `[` at `open` for the `]` at the same depth.
pub fn find_matching_close(source: &ProgramSource, open: usize) -> Result<usize, InterpreterError> {
    let mut depth = 0usize;
    for pos in open + 1..source.program_length() {
        match source.command_at(pos)? {
            Some('[') => depth += 1,
            Some(']') => {
                if depth == 0 {
                    return Ok(pos);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    Err(InterpreterError::UnmatchedClosingBracket { ip: open })
}

/// Scan backward from the `]` at `close` for the `[` at the same depth.
pub fn find_matching_open(source: &ProgramSource, close: usize) -> Result<usize, InterpreterError> {
    let mut depth = 0usize;
    for pos in (0..close).rev() {
        match source.command_at(pos)? {
            Some(']') => depth += 1,
            Some('[') => {
                if depth == 0 {
                    return Ok(pos);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    Err(InterpreterError::UnmatchedOpeningBracket { ip: close })
}
