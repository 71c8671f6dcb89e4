use clap::Args;
use std::io::{self, Write};

use crate::cli_util::print_interpreter_error;
use crate::ProgramSource;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    /// Read program code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// Concatenated program code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let CheckArgs { file, code, .. } = args;
    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    let code_str = match super::load_code(program, file, code) {
        Ok(c) => c,
        Err(exit) => return exit,
    };

    match ProgramSource::new(&code_str, "").check_brackets() {
        Ok(()) => {
            let mut stdout = io::stdout();
            let _ = writeln!(stdout, "ok");
            let _ = stdout.flush();
            0
        }
        Err(e) => {
            print_interpreter_error(Some(program), &code_str, &e);
            1
        }
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check "<code>"
  {0} check --file <PATH>

Checks that every '[' has a matching ']' without running the program.

Options:
  --file, -f <PATH>  Read program code from PATH instead of positional "<code>"
  --help, -h         Show this help
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
