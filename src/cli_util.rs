use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Color;

use crate::command::Command;
use crate::error::InterpreterError;
use crate::interpreter::StepEvent;

/// Pretty-print an [`InterpreterError`] with caret positioning.
/// If `program` is `Some("bf")`, prefix messages with "bf: ..."
pub fn print_interpreter_error(program: Option<&str>, code: &str, err: &InterpreterError) {
    let header = if io::stderr().is_terminal() {
        Color::Red.bold().paint(err.category().to_string()).to_string()
    } else {
        err.category().to_string()
    };
    let msg = match program {
        Some(p) => format!("{p}: {header}: {err}"),
        None => format!("{header}: {err}"),
    };

    match err.position() {
        Some(pos) => print_error_with_context(&msg, code, pos),
        None => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print the message followed by a caret context window around `pos`,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(msg: &str, code: &str, pos: usize) {
    eprintln!("{msg}");
    eprint!("{}", error_context(code, pos));
    let _ = io::stderr().flush();
}

/// Two lines: up to 32 characters either side of `pos`, then a caret under it.
pub fn error_context(code: &str, pos: usize) -> String {
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    // Newlines would break the caret alignment.
    let slice: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    let caret_offset_chars = pos.saturating_sub(start_char);
    format!("  {slice}\n  {}^\n", " ".repeat(caret_offset_chars))
}

/// Header of the `--debug` trace table.
pub fn trace_header() -> String {
    [
        "STEP | IP  | PTR | CELL | INSTR | ACTION",
        "-----+-----+-----+------+-------+------------------------------------------------",
    ]
    .join("\n")
}

/// One row of the `--debug` trace table.
pub fn trace_row(event: &StepEvent) -> String {
    let instr = if event.symbol.is_control() { ' ' } else { event.symbol };
    format!(
        "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
        event.step,
        event.ip,
        event.pointer_before,
        event.cell_before,
        instr,
        describe(event)
    )
}

fn describe(event: &StepEvent) -> String {
    match event.command() {
        Some(Command::MoveRight | Command::MoveLeft) => {
            format!("Moved pointer head to index {}", event.pointer_after)
        }
        Some(Command::Increment) => format!(
            "Increment cell[{}] from {} to {}",
            event.pointer_before, event.cell_before, event.cell_after
        ),
        Some(Command::Decrement) => format!(
            "Decrement cell[{}] from {} to {}",
            event.pointer_before, event.cell_before, event.cell_after
        ),
        Some(Command::Output) => format!("Output byte {} (suppressed in debug)", event.cell_before),
        Some(Command::Input) => format!("Read input -> {}", event.cell_after),
        Some(Command::LoopStart) if event.next_ip == event.ip + 1 => "Enter loop (cell != 0)".to_string(),
        Some(Command::LoopStart) => {
            format!("Cell is 0; jump past matching ']' to IP {}", event.next_ip)
        }
        Some(Command::LoopEnd) => format!("Jump back to matching '[' at IP {}", event.next_ip),
        None => "Comment (skipped)".to_string(),
    }
}

/// Decode raw input bytes one-to-one onto Latin-1 characters.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
