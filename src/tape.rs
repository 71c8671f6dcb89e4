//! The memory tape and the two machine cursors.

use crate::cell::ByteCell;
use crate::error::InterpreterError;

/// Number of cells on a tape unless the caller asks for another size.
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

/// Fixed-size tape of wrapping cells with a data pointer.
///
/// The program counter lives here as well. It indexes the program, not the
/// tape, and is only bounds-checked when the program is read.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<ByteCell>,
    data_pointer: usize,
    program_counter: usize,
}

impl Tape {
    /// A zeroed tape of `size` cells. A size of 0 is raised to one cell.
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![ByteCell::ZERO; size.max(1)],
            data_pointer: 0,
            program_counter: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: [`Tape::new`] never builds a tape with no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[ByteCell] {
        &self.cells
    }

    pub fn data_pointer(&self) -> usize {
        self.data_pointer
    }

    pub fn read_current(&self) -> ByteCell {
        self.cells[self.data_pointer]
    }

    /// Store `value` at the data pointer, wrapped into the cell range.
    pub fn write_current(&mut self, value: impl Into<i64>) {
        self.cells[self.data_pointer] = ByteCell::wrap(value.into());
    }

    /// Shift the data pointer by `delta`.
    ///
    /// The target is validated first; on error the pointer does not move.
    pub fn move_pointer(&mut self, delta: isize) -> Result<(), InterpreterError> {
        match self.data_pointer.checked_add_signed(delta) {
            Some(target) if target < self.cells.len() => {
                self.data_pointer = target;
                Ok(())
            }
            _ => Err(InterpreterError::BadMemoryPointer {
                ip: self.program_counter,
                target: (self.data_pointer as isize).saturating_add(delta),
                size: self.cells.len(),
            }),
        }
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, pc: usize) {
        self.program_counter = pc;
    }

    /// Move the program counter to the next command.
    pub fn advance(&mut self) {
        self.program_counter += 1;
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_TAPE_SIZE)
    }
}
