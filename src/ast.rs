use crate::token::Token;
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(x) => *x,
            Value::Number(_) | Value::String(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(x) => write!(f, "{}", x),
            // f64's Display already drops the fractional part of integral values.
            Value::Number(x) => write!(f, "{}", x),
            Value::String(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug)]
pub enum Expression<'a> {
    Binary {
        left: Box<Expression<'a>>,
        operator: &'a Token,
        right: Box<Expression<'a>>,
    },
    Grouping(Box<Expression<'a>>),
    Literal(Value),
    Logical {
        left: Box<Expression<'a>>,
        operator: &'a Token,
        right: Box<Expression<'a>>,
    },
    Unary {
        operator: &'a Token,
        right: Box<Expression<'a>>,
    },
    Variable(&'a Token),
    Assign {
        name: &'a Token,
        value: Box<Expression<'a>>,
    },
}

pub trait Visitor<T, Output> {
    fn visit(&mut self, n: &T) -> Output;
}

impl<'a> Expression<'a> {
    pub fn accept<T, V: Visitor<Expression<'a>, T>>(&self, v: &mut V) -> T {
        v.visit(self)
    }
}

#[derive(Debug)]
pub enum Statement<'a> {
    Print(Expression<'a>),
    Expression(Expression<'a>),
    Var {
        name: &'a Token,
        initializer: Option<Expression<'a>>,
    },
    Block(Vec<Statement<'a>>),
    If {
        condition: Expression<'a>,
        then_branch: Box<Statement<'a>>,
        else_branch: Option<Box<Statement<'a>>>,
    },
    While {
        condition: Expression<'a>,
        body: Box<Statement<'a>>,
    },
    Break(&'a Token),
}

impl<'a> Statement<'a> {
    pub fn accept<T, V: Visitor<Statement<'a>, T>>(&self, v: &mut V) -> T {
        v.visit(self)
    }
}

/// Renders the tree in parenthesized prefix form for debugging.
pub struct AstPrinter {}

impl AstPrinter {
    pub fn print(&mut self, stmt: &Statement) -> String {
        stmt.accept(self)
    }
    fn parenthesize(&mut self, name: &str, args: Vec<&Expression>) -> String {
        let mut x = String::from("(");
        x.push_str(name);
        for arg in args {
            x.push(' ');
            x.push_str(arg.accept(self).as_str());
        }
        x.push(')');
        x
    }
}

impl<'a> Visitor<Expression<'a>, String> for AstPrinter {
    fn visit(&mut self, n: &Expression<'a>) -> String {
        match n {
            Expression::Binary {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, vec![&**left, &**right]),
            Expression::Grouping(x) => self.parenthesize("group", vec![&**x]),
            Expression::Literal(x) => match x {
                Value::String(y) => format!("{:?}", y),
                _ => x.to_string(),
            },
            Expression::Unary { operator, right } => {
                self.parenthesize(&operator.lexeme, vec![&**right])
            }
            Expression::Variable(x) => x.lexeme.clone(),
            Expression::Assign { name, value } => {
                format!("(assign {} {})", name.lexeme, value.accept(self))
            }
            Expression::Logical {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, vec![&**left, &**right]),
        }
    }
}

impl<'a> Visitor<Statement<'a>, String> for AstPrinter {
    fn visit(&mut self, n: &Statement<'a>) -> String {
        match n {
            Statement::Print(e) => self.parenthesize("print", vec![e]),
            Statement::Expression(e) => self.parenthesize(";", vec![e]),
            Statement::Var { name, initializer } => match initializer {
                Some(e) => format!("(var {} {})", name.lexeme, e.accept(self)),
                None => format!("(var {})", name.lexeme),
            },
            Statement::Block(stmts) => {
                let mut x = String::from("(block");
                for stmt in stmts {
                    x.push(' ');
                    x.push_str(stmt.accept(self).as_str());
                }
                x.push(')');
                x
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = condition.accept(self);
                let then_branch = then_branch.accept(self);
                match else_branch {
                    Some(e) => format!("(if {} {} {})", condition, then_branch, e.accept(self)),
                    None => format!("(if {} {})", condition, then_branch),
                }
            }
            Statement::While { condition, body } => {
                format!("(while {} {})", condition.accept(self), body.accept(self))
            }
            Statement::Break(_) => String::from("(break)"),
        }
    }
}
