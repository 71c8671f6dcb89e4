use std::io::{self, Write};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::cell::ByteCell;
use crate::command::Command;
use crate::error::InterpreterError;
use crate::handlers::Machine;
use crate::source::{InputProvider, ProgramSource};
use crate::tape::{Tape, DEFAULT_TAPE_SIZE};

/// Whether the interpreter can still make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// The program counter reached the end of the program.
    Terminated,
}

/// Controls for cooperative cancellation and step limiting.
#[derive(Clone)]
pub struct StepControl {
    pub max_steps: Option<usize>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl StepControl {
    pub fn new(max_steps: Option<usize>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// What a single dispatch cycle did, reported to the step observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEvent {
    /// Zero-based count of cycles executed before this one.
    pub step: usize,
    /// Program counter the character was fetched from.
    pub ip: usize,
    /// The fetched character, command or comment.
    pub symbol: char,
    pub pointer_before: usize,
    pub cell_before: ByteCell,
    pub pointer_after: usize,
    pub cell_after: ByteCell,
    /// Program counter after the handler ran.
    pub next_ip: usize,
}

impl StepEvent {
    pub fn command(&self) -> Option<Command> {
        Command::from_char(self.symbol)
    }
}

type OutputSink = Box<dyn FnMut(char) -> io::Result<()> + Send>;
type StepObserver = Box<dyn FnMut(&StepEvent) + Send>;

/// A Brainfuck interpreter.
///
/// The interpreter maintains:
/// - the program text and the pending input characters,
/// - a fixed-size tape of zeroed cells (30,000 by default),
/// - the data pointer and the program counter.
///
/// Execution is a plain fetch-dispatch loop. Loops are resolved by scanning
/// the program for the matching bracket each time a bracket executes, so a
/// malformed program only fails when the faulty bracket is reached.
pub struct Interpreter {
    tape: Tape,
    source: ProgramSource,
    state: RunState,
    // Optional hooks:
    output_sink: Option<OutputSink>,
    step_observer: Option<StepObserver>,
}

impl Interpreter {
    /// Create an interpreter for `code` that reads `,` input from `input`.
    ///
    /// The tape is initialized to 30,000 zeroed cells.
    pub fn new(code: &str, input: &str) -> Self {
        Self::new_with_memory(code, input, DEFAULT_TAPE_SIZE)
    }

    /// Same as [`Interpreter::new`] with a custom tape size.
    pub fn new_with_memory(code: &str, input: &str, memory_size: usize) -> Self {
        Self {
            tape: Tape::new(memory_size),
            source: ProgramSource::new(code, input),
            state: RunState::Running,
            output_sink: None,
            step_observer: None,
        }
    }

    /// Provide an output sink. When set, '.' sends characters here instead of stdout.
    pub fn set_output_sink<F>(&mut self, mut sink: F)
    where
        F: FnMut(char) + Send + 'static,
    {
        self.output_sink = Some(Box::new(move |ch| {
            sink(ch);
            Ok(())
        }));
    }

    /// Send '.' output to `writer` as raw bytes, one byte per cell.
    ///
    /// A failed write stops the run with [`InterpreterError::Output`].
    pub fn set_output_writer<W>(&mut self, mut writer: W)
    where
        W: Write + Send + 'static,
    {
        self.output_sink = Some(Box::new(move |ch| write_byte(&mut writer, ch)));
    }

    /// Pull `,` input from `provider` once the construction-time input runs out.
    ///
    /// The provider is called once per `,`, so it may block on a slow source.
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: FnMut() -> Option<char> + Send + 'static,
    {
        let provider: InputProvider = Box::new(provider);
        self.source.set_input_provider(provider);
    }

    /// Provide an observer called after every dispatch cycle.
    pub fn set_step_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&StepEvent) + Send + 'static,
    {
        self.step_observer = Some(Box::new(observer));
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn source(&self) -> &ProgramSource {
        &self.source
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute one dispatch cycle, writing any `.` output to `output`.
    pub fn step(&mut self, output: &mut dyn FnMut(char)) -> Result<RunState, InterpreterError> {
        self.dispatch(&mut |ch: char| -> io::Result<()> {
            output(ch);
            Ok(())
        })?;
        Ok(self.state)
    }

    /// Fetch and execute the character at the program counter.
    ///
    /// Returns the character executed, or `None` once the end of the program
    /// has been reached.
    fn dispatch(
        &mut self,
        output: &mut dyn FnMut(char) -> io::Result<()>,
    ) -> Result<Option<char>, InterpreterError> {
        if self.state == RunState::Terminated {
            return Ok(None);
        }

        let Some(symbol) = self.source.command_at(self.tape.program_counter())? else {
            self.state = RunState::Terminated;
            return Ok(None);
        };

        match Command::from_char(symbol) {
            Some(command) => {
                let mut machine = Machine {
                    tape: &mut self.tape,
                    source: &mut self.source,
                    output,
                };
                command.execute(&mut machine)?;
            }
            None => self.tape.advance(),
        }

        Ok(Some(symbol))
    }

    /// Internal executor shared by the run variants.
    fn execute(
        &mut self,
        output: &mut dyn FnMut(char) -> io::Result<()>,
        step_control: Option<&StepControl>,
    ) -> Result<(), InterpreterError> {
        let mut step: usize = 0;

        while self.state == RunState::Running {
            if let Some(ctrl) = step_control {
                // Cooperative cancellation check
                if ctrl.cancel_flag.load(Ordering::Relaxed) {
                    return Err(InterpreterError::Canceled);
                }

                // Reaching the end of the program is not a step.
                if let Some(max) = ctrl.max_steps {
                    if step >= max && !self.source.is_end(self.tape.program_counter()) {
                        return Err(InterpreterError::StepLimitExceeded { limit: max });
                    }
                }
            }

            let ip = self.tape.program_counter();
            let (pointer_before, cell_before) = (self.tape.data_pointer(), self.tape.read_current());

            let Some(symbol) = self.dispatch(output)? else {
                break;
            };

            if let Some(observer) = self.step_observer.as_mut() {
                observer(&StepEvent {
                    step,
                    ip,
                    symbol,
                    pointer_before,
                    cell_before,
                    pointer_after: self.tape.data_pointer(),
                    cell_after: self.tape.read_current(),
                    next_ip: self.tape.program_counter(),
                });
            }

            step += 1;
        }

        Ok(())
    }

    /// Execute against the configured sink, or raw bytes on stdout.
    fn execute_to_sink(&mut self, step_control: Option<&StepControl>) -> Result<(), InterpreterError> {
        match self.output_sink.take() {
            Some(mut sink) => {
                let result = self.execute(&mut *sink, step_control);
                self.output_sink = Some(sink);
                result
            }
            // Unlocked handle: each write takes the lock briefly, so other
            // threads can still print while a run blocks on input.
            None => self.execute_to_writer(&mut io::stdout(), step_control),
        }
    }

    fn execute_to_writer(
        &mut self,
        writer: &mut dyn Write,
        step_control: Option<&StepControl>,
    ) -> Result<(), InterpreterError> {
        let result = self.execute(&mut |ch: char| write_byte(&mut *writer, ch), step_control);
        let flushed = writer.flush().map_err(|source| InterpreterError::Output {
            ip: self.tape.program_counter(),
            source,
        });
        result.and(flushed)
    }

    /// Execute the program until completion.
    ///
    /// Returns `Ok(())` on success or an [`InterpreterError`] on failure.
    pub fn run(&mut self) -> Result<(), InterpreterError> {
        self.execute_to_sink(None)
    }

    /// Execute with cooperative cancellation and optional step limit.
    pub fn run_with_control(&mut self, step_control: StepControl) -> Result<(), InterpreterError> {
        self.execute_to_sink(Some(&step_control))
    }

    /// Execute the program until completion, writing each `.` as one raw byte.
    ///
    /// The configured output sink is bypassed.
    pub fn run_to_writer(&mut self, writer: &mut dyn Write) -> Result<(), InterpreterError> {
        self.execute_to_writer(writer, None)
    }

    /// Execute the program until completion and return everything it printed.
    ///
    /// The configured output sink is bypassed.
    pub fn run_to_string(&mut self) -> Result<String, InterpreterError> {
        let mut out = String::new();
        self.execute(
            &mut |ch: char| -> io::Result<()> {
                out.push(ch);
                Ok(())
            },
            None,
        )?;
        Ok(out)
    }
}

/// Write the cell behind `ch` as a single byte.
fn write_byte(writer: &mut dyn Write, ch: char) -> io::Result<()> {
    let byte = u8::try_from(ch).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(&[byte])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn run(code: &str, input: &str) -> (Result<String, InterpreterError>, Interpreter) {
        let mut bf = Interpreter::new_with_memory(code, input, 10);
        let out = bf.run_to_string();
        (out, bf)
    }

    #[test]
    fn comments_are_skipped() {
        let (out, bf) = run("+a+", "");
        assert_eq!(out.unwrap(), "");
        assert_eq!(bf.tape().read_current().value(), 2);
        assert_eq!(bf.state(), RunState::Terminated);
    }

    #[test]
    fn unmatched_open_bracket_returns_error() {
        // The starting cell is zero, so the forward scan runs and finds nothing.
        let (out, _) = run("[+", "");
        assert!(matches!(out, Err(InterpreterError::UnmatchedClosingBracket { ip: 0 })));
    }

    #[test]
    fn open_bracket_entered_on_nonzero_cell_can_run_off_the_end() {
        let (out, bf) = run("+[", "");
        assert!(out.is_ok());
        assert_eq!(bf.state(), RunState::Terminated);
    }

    #[test]
    fn stray_close_bracket_returns_error() {
        let (out, _) = run("+]", "");
        assert!(matches!(out, Err(InterpreterError::UnmatchedOpeningBracket { ip: 1 })));
    }

    #[test]
    fn left_pointer_out_of_bounds_errors() {
        let (out, bf) = run("<", "");
        assert!(matches!(out, Err(InterpreterError::BadMemoryPointer { ip: 0, .. })));
        assert_eq!(bf.state(), RunState::Running);
        assert_eq!(bf.tape().program_counter(), 0);
    }

    #[test]
    fn right_pointer_out_of_bounds_errors() {
        // With 3 cells (0..=2), the 3rd '>' attempts to move beyond index 2.
        let mut bf = Interpreter::new_with_memory(&">".repeat(3), "", 3);
        let result = bf.run_to_string();
        assert!(matches!(result, Err(InterpreterError::BadMemoryPointer { ip: 2, target: 3, .. })));
        assert_eq!(bf.tape().data_pointer(), 2);
    }

    #[test]
    fn empty_loop_on_zero_cell_is_ok() {
        let (out, _) = run("[]", "");
        assert!(out.is_ok());
    }

    #[test]
    fn wrapping_subtraction() {
        let (out, bf) = run("-", "");
        assert!(out.is_ok());
        assert_eq!(bf.tape().read_current().value(), 255);
    }

    #[test]
    fn wrapping_addition() {
        let code = "+".repeat(256); // 256 increments should wrap around
        let (out, bf) = run(&code, "");
        assert!(out.is_ok());
        assert!(bf.tape().read_current().is_zero());
    }

    #[test]
    fn step_walks_the_state_machine() {
        let mut bf = Interpreter::new_with_memory("+x", "", 1);
        let mut sink = |_: char| {};
        assert_eq!(bf.step(&mut sink).unwrap(), RunState::Running);
        assert_eq!(bf.step(&mut sink).unwrap(), RunState::Running);
        assert_eq!(bf.step(&mut sink).unwrap(), RunState::Terminated);
        assert_eq!(bf.step(&mut sink).unwrap(), RunState::Terminated);
        assert_eq!(bf.tape().program_counter(), 2);
    }

    #[test]
    fn output_sink_receives_characters() {
        let collected = Arc::new(Mutex::new(String::new()));
        let sink_buf = Arc::clone(&collected);
        let mut bf = Interpreter::new_with_memory(&format!("{}.+.", "+".repeat(65)), "", 1);
        bf.set_output_sink(move |ch| sink_buf.lock().unwrap().push(ch));
        bf.run().unwrap();
        assert_eq!(collected.lock().unwrap().as_str(), "AB");
    }

    #[test]
    fn step_observer_sees_every_cycle() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut bf = Interpreter::new_with_memory(">+#", "", 2);
        bf.set_step_observer(move |e| sink.lock().unwrap().push(*e));
        bf.run_to_string().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].command(), Some(Command::MoveRight));
        assert_eq!((events[0].pointer_before, events[0].pointer_after), (0, 1));
        assert_eq!(events[1].cell_after.value(), 1);
        assert_eq!(events[2].symbol, '#');
        assert_eq!(events[2].command(), None);
        assert_eq!(events[2].next_ip, 3);
    }

    #[test]
    fn step_limit_aborts_infinite_loop() {
        let mut bf = Interpreter::new_with_memory("+[]", "", 1);
        bf.set_output_sink(|_| {});
        let ctrl = StepControl::new(Some(50), Arc::new(AtomicBool::new(false)));
        let result = bf.run_with_control(ctrl);
        assert!(matches!(result, Err(InterpreterError::StepLimitExceeded { limit: 50 })));
    }

    #[test]
    fn step_limit_equal_to_program_length_completes() {
        let mut bf = Interpreter::new_with_memory("+++", "", 1);
        bf.set_output_sink(|_| {});
        let ctrl = StepControl::new(Some(3), Arc::new(AtomicBool::new(false)));
        assert!(bf.run_with_control(ctrl).is_ok());
        assert_eq!(bf.tape().read_current().value(), 3);
    }

    #[test]
    fn raised_cancel_flag_stops_before_first_step() {
        let mut bf = Interpreter::new_with_memory("+", "", 1);
        bf.set_output_sink(|_| {});
        let ctrl = StepControl::new(None, Arc::new(AtomicBool::new(true)));
        assert!(matches!(bf.run_with_control(ctrl), Err(InterpreterError::Canceled)));
        assert!(bf.tape().read_current().is_zero());
    }

    #[test]
    fn run_to_writer_emits_one_byte_per_cell() {
        let mut bf = Interpreter::new_with_memory(&format!("{}.", "+".repeat(0xE9)), "", 1);
        let mut out = Vec::new();
        bf.run_to_writer(&mut out).unwrap();
        assert_eq!(out, vec![0xE9]);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_writer_stops_the_run_with_output_error() {
        let mut bf = Interpreter::new_with_memory("+.+", "", 1);
        let err = bf.run_to_writer(&mut ClosedPipe).unwrap_err();
        assert!(matches!(err, InterpreterError::Output { ip: 1, .. }));
        assert_eq!(bf.tape().program_counter(), 1);
        assert_eq!(bf.tape().read_current().value(), 1);
    }

    #[test]
    fn output_writer_failure_surfaces_from_run() {
        let mut bf = Interpreter::new_with_memory(".", "", 1);
        bf.set_output_writer(ClosedPipe);
        assert!(matches!(bf.run(), Err(InterpreterError::Output { ip: 0, .. })));
    }

    #[test]
    fn input_provider_is_read_lazily_per_comma() {
        let mut bytes = b"hi".iter().copied();
        let mut bf = Interpreter::new_with_memory(",.,.,.", "", 1);
        bf.set_input_provider(move || bytes.next().map(char::from));
        assert_eq!(bf.run_to_string().unwrap(), "hii");
    }

    #[test]
    fn program_without_comma_never_asks_provider() {
        let mut bf = Interpreter::new_with_memory("+.", "", 1);
        bf.set_input_provider(|| panic!("input requested"));
        assert_eq!(bf.run_to_string().unwrap(), "\u{1}");
    }
}
