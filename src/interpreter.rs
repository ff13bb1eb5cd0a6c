use crate::ast::{Expression, Statement, Value, Visitor};
use crate::environment::Environment;
use crate::token::{Token, TokenKind};
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(
        "Runtime error at evaluation of {} ({}: {}): {message}",
        .token.kind, .token.line, .token.column
    )]
    Evaluation { token: Token, message: String },
    #[error("failed to write program output: {0}")]
    Output(#[from] io::Error),
}

impl RuntimeError {
    pub fn evaluation(token: &Token, message: String) -> RuntimeError {
        RuntimeError::Evaluation {
            token: token.clone(),
            message,
        }
    }
}

/// How a statement finished. `Break` travels outward until a `while`
/// loop takes it as normal termination.
#[derive(Debug)]
pub enum Completion<'a> {
    Normal(Option<Value>),
    Break(&'a Token),
}

pub struct Interpreter<W: Write> {
    pub environment: Environment,
    out: W,
}

impl<'a, W: Write> Visitor<Expression<'a>, Result<Value, RuntimeError>> for Interpreter<W> {
    fn visit(&mut self, expr: &Expression<'a>) -> Result<Value, RuntimeError> {
        match expr {
            Expression::Literal(x) => Ok(x.clone()),
            Expression::Grouping(x) => self.evaluate(x),
            Expression::Unary { operator, right } => {
                let rv = self.evaluate(right)?;
                match operator.kind {
                    TokenKind::Minus => match rv {
                        Value::Number(r) => Ok(Value::Number(-r)),
                        _ => Err(RuntimeError::evaluation(
                            operator,
                            format!(
                                "{} was expecting (<number>) instead received (<{}>)",
                                operator.kind,
                                rv.type_name()
                            ),
                        )),
                    },
                    TokenKind::Bang => Ok(Value::Boolean(!rv.is_truthy())),
                    _ => Err(not_implemented(operator)),
                }
            }
            Expression::Binary {
                left,
                operator,
                right,
            } => {
                let lv = self.evaluate(left)?;
                let rv = self.evaluate(right)?;
                binary(operator, lv, rv)
            }
            Expression::Variable(token) => self.environment.get(token),
            Expression::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                match operator.kind {
                    TokenKind::Or if left.is_truthy() => Ok(left),
                    TokenKind::And if !left.is_truthy() => Ok(left),
                    TokenKind::Or | TokenKind::And => self.evaluate(right),
                    _ => Err(not_implemented(operator)),
                }
            }
        }
    }
}

impl<'a, W: Write> Visitor<Statement<'a>, Result<Completion<'a>, RuntimeError>> for Interpreter<W> {
    fn visit(&mut self, stmt: &Statement<'a>) -> Result<Completion<'a>, RuntimeError> {
        match stmt {
            Statement::Print(e) => {
                let val = self.evaluate(e)?;
                writeln!(self.out, "{}", val)?;
                Ok(Completion::Normal(None))
            }
            Statement::Expression(e) => Ok(Completion::Normal(Some(self.evaluate(e)?))),
            Statement::Var { name, initializer } => {
                let val = match initializer {
                    Some(e) => self.evaluate(e)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, val);
                Ok(Completion::Normal(None))
            }
            Statement::Block(stmts) => {
                self.environment.start_block();
                trace!(depth = self.environment.depth(), "enter block");
                // The frame is dropped before any error or break leaves this arm.
                let result = self.execute_block(stmts);
                self.environment.end_block();
                trace!(depth = self.environment.depth(), "exit block");
                result
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Completion::Normal(None))
                }
            }
            Statement::While { condition, body } => {
                let mut result = None;
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Completion::Normal(value) => result = value,
                        Completion::Break(token) => {
                            debug!(line = token.line, "loop ended by break");
                            break;
                        }
                    }
                }
                Ok(Completion::Normal(result))
            }
            Statement::Break(token) => Ok(Completion::Break(*token)),
        }
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Interpreter<W> {
        Interpreter {
            environment: Environment::new(),
            out,
        }
    }
    pub fn output(&self) -> &W {
        &self.out
    }
    pub fn into_output(self) -> W {
        self.out
    }
    fn evaluate(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        expr.accept(self)
    }
    pub fn execute<'a>(&mut self, stmt: &Statement<'a>) -> Result<Completion<'a>, RuntimeError> {
        stmt.accept(self)
    }
    fn execute_block<'a>(&mut self, stmts: &[Statement<'a>]) -> Result<Completion<'a>, RuntimeError> {
        for stmt in stmts {
            if let Completion::Break(token) = self.execute(stmt)? {
                return Ok(Completion::Break(token));
            }
        }
        Ok(Completion::Normal(None))
    }
    /// Runs one top-level statement and returns the value it produced, if
    /// any. A `break` that escapes every loop is an error here.
    pub fn interpret(&mut self, stmt: &Statement) -> Result<Option<Value>, RuntimeError> {
        match self.execute(stmt)? {
            Completion::Normal(value) => Ok(value),
            Completion::Break(token) => Err(RuntimeError::evaluation(
                token,
                String::from("break statement seen outside of a loop"),
            )),
        }
    }
}

fn binary(operator: &Token, lv: Value, rv: Value) -> Result<Value, RuntimeError> {
    match operator.kind {
        TokenKind::Plus => match (lv, rv) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::String(l), Value::String(r)) => {
                let mut joined = l;
                joined.push_str(r.as_str());
                Ok(Value::String(joined))
            }
            (l, r) => Err(RuntimeError::evaluation(
                operator,
                format!(
                    "{} was expecting (<number>, <number>) or (<string>, <string>) instead received (<{}>, <{}>)",
                    operator.kind,
                    l.type_name(),
                    r.type_name()
                ),
            )),
        },
        TokenKind::Minus => {
            let (l, r) = numbers(operator, &lv, &rv)?;
            Ok(Value::Number(l - r))
        }
        TokenKind::Star => {
            let (l, r) = numbers(operator, &lv, &rv)?;
            Ok(Value::Number(l * r))
        }
        TokenKind::Slash => {
            let (l, r) = numbers(operator, &lv, &rv)?;
            if r == 0.0 {
                return Err(RuntimeError::evaluation(
                    operator,
                    String::from("Zero division error"),
                ));
            }
            Ok(Value::Number(l / r))
        }
        TokenKind::Greater => {
            let (l, r) = numbers(operator, &lv, &rv)?;
            Ok(Value::Boolean(l > r))
        }
        TokenKind::GreaterEqual => {
            let (l, r) = numbers(operator, &lv, &rv)?;
            Ok(Value::Boolean(l >= r))
        }
        TokenKind::Less => {
            let (l, r) = numbers(operator, &lv, &rv)?;
            Ok(Value::Boolean(l < r))
        }
        TokenKind::LessEqual => {
            let (l, r) = numbers(operator, &lv, &rv)?;
            Ok(Value::Boolean(l <= r))
        }
        TokenKind::EqualEqual => Ok(Value::Boolean(lv == rv)),
        TokenKind::BangEqual => Ok(Value::Boolean(lv != rv)),
        _ => Err(not_implemented(operator)),
    }
}

/// Both operands must be numbers for arithmetic other than `+` and for
/// comparisons.
fn numbers(operator: &Token, lv: &Value, rv: &Value) -> Result<(f64, f64), RuntimeError> {
    match (lv, rv) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(RuntimeError::evaluation(
            operator,
            format!(
                "{} was expecting (<number>, <number>) instead received (<{}>, <{}>)",
                operator.kind,
                lv.type_name(),
                rv.type_name()
            ),
        )),
    }
}

fn not_implemented(operator: &Token) -> RuntimeError {
    RuntimeError::evaluation(
        operator,
        format!("operator {} is not implemented", operator.kind),
    )
}
