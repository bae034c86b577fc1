use std::{fs, process};
use clap::Parser;
use tracing::Level;
use robolang::parse::parse;
use robolang::registry::FunctionTable;

/// Parse a program and print it in canonical form.
#[derive(Debug, Parser)]
struct Args {
    /// Source file to parse.
    file: String,
    /// Name of a function the program may call (repeatable).
    #[clap(long = "function", short = 'f')]
    functions: Vec<String>,
    /// Print the command tree as JSON instead of source text.
    #[clap(long)]
    json: bool,
    /// Log parser internals.
    #[clap(long, short)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::TRACE } else { Level::WARN })
        .init();

    let input = match fs::read_to_string(&args.file) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("{}: {}", args.file, e);
            process::exit(2);
        }
    };
    let functions = FunctionTable::with_names(args.functions);

    match parse(&input, &functions) {
        Err(e) => {
            eprintln!("{}: {}", args.file, e);
            process::exit(1);
        }
        Ok(func) if args.json => match serde_json::to_string_pretty(&func) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("JSON error: {}", e),
        },
        Ok(func) => print!("{}", func),
    }
}
