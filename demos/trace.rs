use tapebf::cli_util::{trace_header, trace_row};
use tapebf::Interpreter;

fn main() {
    // Echo two characters, then clear the cell.
    let mut bf = Interpreter::new_with_memory(",.,.[-]", "hi", 4);
    bf.set_step_observer(|event| println!("{}", trace_row(event)));

    println!("{}", trace_header());
    match bf.run_to_string() {
        Ok(out) => println!("output: {out:?}"),
        Err(err) => eprintln!("Brainfuck interpreter error: {err}"),
    }
}
