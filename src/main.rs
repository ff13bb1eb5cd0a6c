use clap::Parser;
use plox::{RunError, Session};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Runs a script, or starts an interactive prompt when no script is given.
#[derive(Parser, Debug)]
#[command(name = "plox", version)]
struct Args {
    /// Script to run.
    script: Option<PathBuf>,
    /// Print each parsed statement to stderr before running it.
    #[arg(long)]
    print_ast: bool,
}

// Exit codes from sysexits.h.
const EX_DATAERR: i32 = 65;
const EX_SOFTWARE: i32 = 70;
const EX_IOERR: i32 = 74;

fn main() {
    init_tracing();
    let args = Args::parse();
    let code = match &args.script {
        Some(path) => run_file(path, args.print_ast),
        None => run_prompt(args.print_ast),
    };
    std::process::exit(code);
}

/// Logging stays off unless `RUST_LOG` is set, e.g. `RUST_LOG=plox=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_file(path: &Path, print_ast: bool) -> i32 {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Could not read {}: {}", path.display(), e);
            return EX_IOERR;
        }
    };
    let mut session = Session::new(io::stdout()).with_ast_printing(print_ast);
    match session.run(&contents, &mut io::stderr()) {
        Ok(_) => 0,
        Err(RunError::Scan(_)) | Err(RunError::Parse(_)) => EX_DATAERR,
        Err(RunError::Runtime(_)) => EX_SOFTWARE,
        Err(RunError::Diagnostics(_)) => EX_IOERR,
    }
}

fn run_prompt(print_ast: bool) -> i32 {
    let mut session = Session::new(io::stdout()).with_ast_printing(print_ast);
    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return EX_IOERR;
        }
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => return 0,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to read line: {}", e);
                return EX_IOERR;
            }
        }
        if line.trim() == "exit" {
            return 0;
        }
        match session.run(&line, &mut io::stderr()) {
            Ok(values) => {
                for value in values {
                    println!("{}", value);
                }
            }
            Err(error) => debug!(%error, "line rejected"),
        }
    }
}
