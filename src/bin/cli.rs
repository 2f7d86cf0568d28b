//! respkv CLI Client
//!
//! Runs one command given on the command line, or an interactive prompt.

use std::io::{self, BufRead, Write};

use clap::Parser;
use respkv::client::{format_value, tokenize, Client};
use respkv::{DecodeError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// respkv CLI
#[derive(Parser, Debug)]
#[command(name = "respkv-cli")]
#[command(about = "CLI for a respkv server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Command to run; starts the interactive prompt when omitted
    command: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();

    let mut client = match Client::connect(&args.server, args.timeout_ms) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let outcome = if args.command.is_empty() {
        repl(&mut client)
    } else {
        run_command(&mut client, &args.command)
    };

    if let Err(e) = outcome {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn repl(client: &mut Client) -> Result<()> {
    println!("Connected. Type your commands (Ctrl+D to quit):");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };

        let words = tokenize(&line);
        if words.is_empty() {
            continue;
        }

        run_command(client, &words)?;
    }
}

fn run_command(client: &mut Client, words: &[String]) -> Result<()> {
    match client.command(words)? {
        Ok(value) => println!("{}", format_value(&value)),
        Err(DecodeError::ErrorReply(message)) => println!("(error) {}", message),
        Err(e) => println!("Error decoding response: {}", e),
    }
    Ok(())
}
