use tapebf::Interpreter;

fn main() {
    // Classic Brainfuck "Hello World!" program
    let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";

    let mut bf = Interpreter::new(code, "");

    if let Err(err) = bf.run() {
        eprintln!("Brainfuck interpreter error: {err}");
        std::process::exit(1);
    }

    // Print a newline after the Brainfuck program output for readability
    println!();
}
