use crate::ast::{Expression, Statement, Value};
use crate::cursor::Cursor;
use crate::token::{Literal, Token, TokenKind};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error)]
#[error("[line {}, column {}] {}: {message}", .token.line, .token.column, location(.token))]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    fn new(token: &Token, message: String) -> ParseError {
        ParseError {
            token: token.clone(),
            message,
        }
    }
}

fn location(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => String::from("at end"),
        _ => format!("at '{}'", token.lexeme),
    }
}

/// Output of a parse. Statements that failed to parse are dropped, so the
/// list must not be executed unless `is_valid`.
#[derive(Debug)]
pub struct Parsed<'a> {
    pub statements: Vec<Statement<'a>>,
    pub errors: Vec<ParseError>,
}

impl<'a> Parsed<'a> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

const STATEMENT_STARTS: &[TokenKind] = &[
    TokenKind::Class,
    TokenKind::Fun,
    TokenKind::For,
    TokenKind::Var,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Print,
    TokenKind::Return,
];

type ExpressionResult<'a> = Result<Expression<'a>, ParseError>;
type StatementResult<'a> = Result<Statement<'a>, ParseError>;

pub fn parse(tokens: &[Token]) -> Parsed<'_> {
    Parser::new(tokens).parse()
}

pub struct Parser<'a> {
    cursor: Cursor<'a, Token>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser {
            cursor: Cursor::new(tokens),
            errors: Vec::new(),
        }
    }
    pub fn parse(mut self) -> Parsed<'a> {
        let mut statements: Vec<Statement<'a>> = Vec::new();
        self.skip_comments();
        while !self.is_at_end() {
            let start = self.cursor.position();
            match self.declaration() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.report(error);
                    self.synchronize();
                    if self.cursor.position() == start {
                        self.advance();
                    }
                }
            }
        }
        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed tokens"
        );
        Parsed {
            statements,
            errors: self.errors,
        }
    }
    fn declaration(&mut self) -> StatementResult<'a> {
        if self.matches(&[TokenKind::Var]).is_some() {
            return self.var_declaration();
        }
        self.statement()
    }
    fn var_declaration(&mut self) -> StatementResult<'a> {
        let name = self.consume(TokenKind::Identifier, "IDENTIFIER")?;
        let initializer = match self.matches(&[TokenKind::Equal]) {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        self.consume(TokenKind::Semicolon, ";")?;
        Ok(Statement::Var { name, initializer })
    }
    fn statement(&mut self) -> StatementResult<'a> {
        match self.peek_kind() {
            TokenKind::Print => {
                self.advance();
                self.print_statement()
            }
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Statement::Block(self.block()?))
            }
            TokenKind::If => {
                self.advance();
                self.if_statement()
            }
            TokenKind::While => {
                self.advance();
                self.while_statement()
            }
            TokenKind::For => {
                self.advance();
                self.for_statement()
            }
            TokenKind::Break => {
                let keyword = self.consume(TokenKind::Break, "break")?;
                self.consume(TokenKind::Semicolon, ";")?;
                Ok(Statement::Break(keyword))
            }
            _ => self.expression_statement(),
        }
    }
    fn print_statement(&mut self) -> StatementResult<'a> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, ";")?;
        Ok(Statement::Print(value))
    }
    fn expression_statement(&mut self) -> StatementResult<'a> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, ";")?;
        Ok(Statement::Expression(expr))
    }
    fn block(&mut self) -> Result<Vec<Statement<'a>>, ParseError> {
        let mut statements: Vec<Statement<'a>> = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume(TokenKind::RightBrace, "}")?;
        Ok(statements)
    }
    fn if_statement(&mut self) -> StatementResult<'a> {
        self.consume(TokenKind::LeftParen, "(")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, ")")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = match self.matches(&[TokenKind::Else]) {
            Some(_) => Some(Box::new(self.statement()?)),
            None => None,
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
        })
    }
    fn while_statement(&mut self) -> StatementResult<'a> {
        self.consume(TokenKind::LeftParen, "(")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, ")")?;
        let body = Box::new(self.statement()?);
        Ok(Statement::While { condition, body })
    }
    /// `for` has no node of its own: it becomes a `while` loop, wrapped in a
    /// block when there is an initializer so the loop variable stays local.
    fn for_statement(&mut self) -> StatementResult<'a> {
        self.consume(TokenKind::LeftParen, "(")?;
        let initializer = if self.matches(&[TokenKind::Semicolon]).is_some() {
            None
        } else if self.matches(&[TokenKind::Var]).is_some() {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = match self.peek_kind() {
            TokenKind::Semicolon => Expression::Literal(Value::Boolean(true)),
            _ => self.expression()?,
        };
        self.consume(TokenKind::Semicolon, ";")?;

        let increment = match self.peek_kind() {
            TokenKind::RightParen => None,
            _ => Some(self.expression()?),
        };
        self.consume(TokenKind::RightParen, ")")?;

        let mut body = self.statement()?;
        if let Some(x) = increment {
            body = Statement::Block(vec![body, Statement::Expression(x)]);
        }
        body = Statement::While {
            condition,
            body: Box::new(body),
        };
        match initializer {
            None => Ok(body),
            Some(x) => Ok(Statement::Block(vec![x, body])),
        }
    }
    fn expression(&mut self) -> ExpressionResult<'a> {
        self.assignment()
    }
    fn assignment(&mut self) -> ExpressionResult<'a> {
        let expr = self.or()?;
        let equals = match self.matches(&[TokenKind::Equal]) {
            Some(equals) => equals,
            None => return Ok(expr),
        };
        match expr {
            Expression::Variable(name) => Ok(Expression::Assign {
                name,
                value: Box::new(self.assignment()?),
            }),
            _ => {
                // Reported without unwinding: the right-hand side still parses.
                self.report(ParseError::new(
                    equals,
                    String::from("Invalid assignment target"),
                ));
                self.assignment()
            }
        }
    }
    fn or(&mut self) -> ExpressionResult<'a> {
        let mut expr = self.and()?;
        while let Some(operator) = self.matches(&[TokenKind::Or]) {
            let right = self.and()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn and(&mut self) -> ExpressionResult<'a> {
        let mut expr = self.equality()?;
        while let Some(operator) = self.matches(&[TokenKind::And]) {
            let right = self.equality()?;
            expr = Expression::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn equality(&mut self) -> ExpressionResult<'a> {
        self.binary(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Parser::comparison,
        )
    }
    fn comparison(&mut self) -> ExpressionResult<'a> {
        self.binary(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Parser::addition,
        )
    }
    fn addition(&mut self) -> ExpressionResult<'a> {
        self.binary(&[TokenKind::Minus, TokenKind::Plus], Parser::multiplication)
    }
    fn multiplication(&mut self) -> ExpressionResult<'a> {
        self.binary(&[TokenKind::Slash, TokenKind::Star], Parser::unary)
    }
    fn binary(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Parser<'a>) -> ExpressionResult<'a>,
    ) -> ExpressionResult<'a> {
        let mut expr = operand(self)?;
        while let Some(operator) = self.matches(operators) {
            let right = operand(self)?;
            expr = Expression::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }
    fn unary(&mut self) -> ExpressionResult<'a> {
        match self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            Some(operator) => {
                let right = self.unary()?;
                Ok(Expression::Unary {
                    operator,
                    right: Box::new(right),
                })
            }
            None => self.primary(),
        }
    }
    fn primary(&mut self) -> ExpressionResult<'a> {
        let token = match self.cursor.peek() {
            Some(token) => token,
            None => return Err(self.error("Expected expression but found end of input".to_string())),
        };
        match token.kind {
            TokenKind::False => {
                self.advance();
                Ok(Expression::Literal(Value::Boolean(false)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Literal(Value::Boolean(true)))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expression::Literal(Value::Nil))
            }
            TokenKind::Number | TokenKind::String => {
                self.advance();
                Ok(Expression::Literal(match &token.literal {
                    Some(Literal::Number(x)) => Value::Number(*x),
                    Some(Literal::String(x)) => Value::String(x.clone()),
                    None => Value::Nil,
                }))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expression::Variable(token))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, ")")?;
                Ok(Expression::Grouping(Box::new(expr)))
            }
            _ => Err(self.error(format!("Expected expression but found '{}'", token))),
        }
    }
    /// Discards tokens up to the next statement boundary: just past a `;`,
    /// or on a keyword that starts a statement.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.cursor.match_any(&[TokenKind::Semicolon]) {
                break;
            }
            if self.cursor.match_any(STATEMENT_STARTS) {
                self.cursor.rewind(1);
                break;
            }
            self.cursor.advance();
        }
        self.skip_comments();
        debug!(position = self.cursor.position(), "resynchronized");
    }
    fn report(&mut self, error: ParseError) {
        debug!(%error, "parse error");
        self.errors.push(error);
    }
    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<&'a Token, ParseError> {
        match self.cursor.peek() {
            Some(token) if *token == kind => {
                self.advance();
                Ok(token)
            }
            Some(token) => Err(self.error(format!(
                "Expected '{}' but found '{}'",
                expected, token
            ))),
            None => Err(self.error(format!(
                "Expected '{}' but found end of input",
                expected
            ))),
        }
    }
    fn matches(&mut self, kinds: &[TokenKind]) -> Option<&'a Token> {
        if kinds.iter().any(|kind| self.check(*kind)) {
            return self.advance();
        }
        None
    }
    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.cursor.consume();
        self.skip_comments();
        token
    }
    fn skip_comments(&mut self) {
        while self.cursor.match_any(&[TokenKind::Comment]) {}
    }
    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }
    fn peek_kind(&self) -> TokenKind {
        self.cursor.peek().map_or(TokenKind::Eof, |token| token.kind)
    }
    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }
    fn error(&self, message: String) -> ParseError {
        match self.cursor.peek().or_else(|| self.cursor.peek_at(-1)) {
            Some(token) => ParseError::new(token, message),
            None => ParseError::new(&Token::new(TokenKind::Eof, "", None, 1, 1), message),
        }
    }
}
