use std::{fs, process};
use clap::Parser;
use itertools::Itertools;
use robolang::device::{build_message, CommandKind, CommandTable};

/// Build a device message and print it as hex bytes.
#[derive(Debug, Parser)]
struct Args {
    /// Command: stop, echo, print, get, set, reset, done or add.
    command: CommandKind,
    /// Target device id.
    device: u8,
    /// Payload bytes (decimal, or hex with a 0x prefix).
    #[clap(value_parser = parse_byte)]
    payload: Vec<u8>,
    /// JSON firmware profile with the command byte values.
    #[clap(long)]
    table: Option<String>,
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid byte {:?}: {}", s, e))
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt().init();

    let table = match &args.table {
        None => CommandTable::default(),
        Some(path) => match fs::read_to_string(path).map_err(|e| e.to_string())
                          .and_then(|s| CommandTable::from_json(&s).map_err(|e| e.to_string())) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                process::exit(2);
            }
        },
    };

    let msg = build_message(&table, args.device, args.command, &args.payload);
    println!("{}", msg.iter().map(|b| format!("{:02x}", b)).join(" "));
}
