use clap::Args;
use std::io::{self, IsTerminal, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::cli_util::{latin1_to_string, print_interpreter_error, trace_header, trace_row};
use crate::config::Settings;
use crate::{Interpreter, InterpreterError, StepControl};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Print a step-by-step table of operations instead of program output
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read program code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Bytes consumed by `,` (otherwise piped stdin, if any)
    #[arg(short = 'i', long = "input", value_name = "TEXT")]
    pub input: Option<String>,

    /// Number of tape cells (fallback BF_MEMORY_SIZE; default 30_000)
    #[arg(long = "memory", value_name = "CELLS")]
    pub memory: Option<usize>,

    /// Wall-clock timeout in milliseconds (fallback BF_TIMEOUT_MS; default 2_000)
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum interpreter steps before abort (fallback BF_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Concatenated program code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs {
        debug,
        file,
        input,
        memory,
        timeout_ms,
        max_steps,
        code,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    let code_str = match super::load_code(program, file, code) {
        Ok(c) => c,
        Err(exit) => return exit,
    };

    // `--input` reaches `,` as its UTF-8 bytes, the same as piped stdin would.
    let read_stdin = input.is_none() && !io::stdin().is_terminal();
    let input = input
        .map(|text| latin1_to_string(text.as_bytes()))
        .unwrap_or_default();

    // Resolve limits: flags -> env -> config file -> defaults
    let mut settings = Settings::load();
    settings.apply_flags(memory, timeout_ms, max_steps);

    // Execute on a worker thread with cooperative cancellation
    let cancel = Arc::new(AtomicBool::new(false));
    let interrupt = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || interrupt.store(true, Ordering::Relaxed)) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
    }

    let (tx, rx) = mpsc::channel::<Result<(), InterpreterError>>();
    let program_owned = code_str.clone();
    let cancel_clone = cancel.clone();
    let memory_size = settings.memory_size;
    let max_steps = settings
        .max_steps
        .map(|n| usize::try_from(n).unwrap_or(usize::MAX));

    thread::spawn(move || {
        let mut bf = Interpreter::new_with_memory(&program_owned, &input, memory_size);
        if read_stdin {
            bf.set_input_provider(next_stdin_byte);
        }
        if debug {
            let _ = writeln!(io::stdout(), "{}", trace_header());
            bf.set_output_sink(|_| {});
            bf.set_step_observer(|event| {
                let _ = writeln!(io::stdout(), "{}", trace_row(event));
            });
        }
        let ctrl = StepControl::new(max_steps, cancel_clone);
        let _ = tx.send(bf.run_with_control(ctrl));
    });

    let timeout_ms = settings.timeout_ms;
    let exit_code = match rx.recv_timeout(Duration::from_millis(timeout_ms)) {
        Ok(Ok(())) => 0,
        Ok(Err(InterpreterError::StepLimitExceeded { limit })) => {
            eprintln!("Execution aborted: step limit exceeded ({limit})");
            let _ = io::stderr().flush();
            1
        }
        Ok(Err(InterpreterError::Canceled)) => {
            eprintln!("Execution aborted: interrupted");
            let _ = io::stderr().flush();
            130
        }
        Ok(Err(other)) => {
            print_interpreter_error(Some(program), &code_str, &other);
            1
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            eprintln!("Execution aborted: wall-clock timeout exceeded ({timeout_ms} ms)");
            let _ = io::stderr().flush();
            1
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => 1,
    };

    let mut stdout = io::stdout();
    let _ = writeln!(stdout);
    let _ = stdout.flush();
    exit_code
}

/// One byte of stdin per `,`. `None` at end of input or on a read error.
fn next_stdin_byte() -> Option<char> {
    let mut byte = [0u8; 1];
    loop {
        match io::stdin().read(&mut byte) {
            Ok(0) => return None,
            Ok(_) => return Some(char::from(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return None,
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>  Read program code from PATH instead of positional "<code>"
  --input, -i <TEXT>  Bytes consumed by `,` (default: piped stdin, if any)
  --memory <CELLS>    Tape size (default 30000)
  --timeout <MS>      Wall-clock limit in milliseconds (default 2000)
  --max-steps <N>     Abort after N executed commands
  --debug, -d         Print a step-by-step table of operations instead of output
  --help,  -h         Show this help

Notes:
- `,` reads one byte per command; piped stdin is read only as `,` needs it.
- `,` on exhausted input leaves the current cell unchanged.
- `.` writes the current cell to stdout as one raw byte.
- Characters outside of ><+-.,[] are comments.
- Settings fall back to BF_MEMORY_SIZE, BF_TIMEOUT_MS, BF_MAX_STEPS and the
  [interpreter] section of bf.toml in the user config directory.

Examples:
- Load program code from a file:
    {0} run --file ./program.bf
- Feed `,` from a file:
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
