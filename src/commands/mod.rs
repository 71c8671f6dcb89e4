pub mod check;
pub mod run;

use std::fs;
use std::io::{self, Write};

/// Program text from `--file` or the concatenated positional parts.
///
/// On failure the error has already been printed and the exit code is returned.
pub(crate) fn load_code(program: &str, file: Option<String>, code: Vec<String>) -> Result<String, i32> {
    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        let _ = io::stderr().flush();
        return Err(2);
    }

    match file {
        Some(path) => fs::read_to_string(&path).map_err(|e| {
            eprintln!("{program}: failed to read code file as UTF-8: {e}");
            let _ = io::stderr().flush();
            1
        }),
        None => Ok(code.join("")),
    }
}
