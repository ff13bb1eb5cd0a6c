use crate::ast::{AstPrinter, Value};
use crate::interpreter::{Interpreter, RuntimeError};
use crate::parser;
use crate::scanner;
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("source rejected with {0} scan error(s)")]
    Scan(usize),
    #[error("source rejected with {0} syntax error(s)")]
    Parse(usize),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("failed to write diagnostics: {0}")]
    Diagnostics(#[source] io::Error),
}

/// Runs units of source text against one interpreter, so bindings made by
/// one unit are visible to the next (the REPL feeds one line per unit).
///
/// Printed values go to the interpreter's output sink. Diagnostics go to
/// the `errors` sink passed to `run`, one line each.
pub struct Session<W: Write> {
    interpreter: Interpreter<W>,
    print_ast: bool,
}

impl<W: Write> Session<W> {
    pub fn new(out: W) -> Session<W> {
        Session {
            interpreter: Interpreter::new(out),
            print_ast: false,
        }
    }
    /// Also write each parsed statement to the error sink before running it.
    pub fn with_ast_printing(mut self, print_ast: bool) -> Session<W> {
        self.print_ast = print_ast;
        self
    }
    pub fn output(&self) -> &W {
        self.interpreter.output()
    }
    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
    /// Scans, parses and executes `source`. Nothing runs if scanning or
    /// parsing reported an error. A runtime error stops the remaining
    /// statements but keeps the effects of those already executed.
    ///
    /// Returns the non-nil values of top-level expression statements.
    pub fn run<E: Write>(&mut self, source: &str, errors: &mut E) -> Result<Vec<Value>, RunError> {
        let scanned = scanner::scan_tokens(source);
        if !scanned.is_valid() {
            for error in &scanned.errors {
                writeln!(errors, "{}", error).map_err(RunError::Diagnostics)?;
            }
            return Err(RunError::Scan(scanned.errors.len()));
        }
        let parsed = parser::parse(&scanned.tokens);
        if !parsed.is_valid() {
            for error in &parsed.errors {
                writeln!(errors, "{}", error).map_err(RunError::Diagnostics)?;
            }
            return Err(RunError::Parse(parsed.errors.len()));
        }
        if self.print_ast {
            let mut printer = AstPrinter {};
            for stmt in &parsed.statements {
                writeln!(errors, "{}", printer.print(stmt)).map_err(RunError::Diagnostics)?;
            }
        }

        let mut results = Vec::new();
        for stmt in &parsed.statements {
            match self.interpreter.interpret(stmt) {
                Ok(Some(Value::Nil)) | Ok(None) => {}
                Ok(Some(value)) => results.push(value),
                Err(error) => {
                    debug!(%error, "execution stopped");
                    writeln!(errors, "{}", error).map_err(RunError::Diagnostics)?;
                    return Err(error.into());
                }
            }
        }
        Ok(results)
    }
}
