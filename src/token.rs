use std::fmt;
use strum_macros::{Display, EnumIter};

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Single-character tokens.
    LeftParen, RightParen, LeftBrace, RightBrace,
    Comma, Dot, Minus, Plus, Semicolon, Slash, Star,

    // One or two character tokens.
    Bang, BangEqual,
    Equal, EqualEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    // Literals.
    Identifier, String, Number,

    // Keywords.
    And, Class, Else, False, Fun, For, If, Nil, Or,
    Print, Return, Super, This, True, Var, While, Break,

    Comment, Invalid,

    Eof,
}

/// Value decoded from the source text of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

/// A scanned token. Two tokens are equal when their kinds and decoded
/// literals match; the lexeme and position only record where it came from.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: &str,
        literal: Option<Literal>,
        line: usize,
        column: usize,
    ) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            literal,
            line,
            column,
        }
    }
    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Token) -> bool {
        self.kind == other.kind && self.literal == other.literal
    }
}

impl PartialEq<TokenKind> for Token {
    fn eq(&self, other: &TokenKind) -> bool {
        self.kind == *other
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lexeme.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}", self.lexeme)
        }
    }
}

#[cfg(test)]
mod token_tests {
    use super::{Literal, Token, TokenKind};
    use strum::IntoEnumIterator;

    #[test]
    fn equality_ignores_provenance() {
        let a = Token::new(TokenKind::Number, "1", Some(Literal::Number(1.0)), 1, 1);
        let b = Token::new(TokenKind::Number, "1.0", Some(Literal::Number(1.0)), 7, 3);
        let c = Token::new(TokenKind::Number, "2", Some(Literal::Number(2.0)), 1, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a == TokenKind::Number);
        assert!(a != TokenKind::String);
    }

    #[test]
    fn kind_names() {
        assert_eq!(TokenKind::BangEqual.to_string(), "BANG_EQUAL");
        assert_eq!(TokenKind::Plus.to_string(), "PLUS");
        assert_eq!(TokenKind::Eof.to_string(), "EOF");
    }

    #[test]
    fn every_kind_renders_upper_snake_case() {
        for kind in TokenKind::iter() {
            let name = kind.to_string();
            assert!(!name.is_empty());
            assert_eq!(name, name.to_uppercase(), "{:?}", kind);
        }
    }
}
