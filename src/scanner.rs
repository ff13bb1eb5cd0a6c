use crate::cursor::Cursor;
use crate::token::{Literal, Token, TokenKind};
use phf::phf_map;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}, column {column}] at '{lexeme}': {message}")]
pub struct ScanError {
    pub line: usize,
    pub column: usize,
    pub lexeme: String,
    pub message: String,
}

/// Output of a scan. The token list always ends with an EOF token, even
/// when errors were reported; it must not be parsed unless `is_valid`.
#[derive(Debug)]
pub struct Scanned {
    pub tokens: Vec<Token>,
    pub errors: Vec<ScanError>,
}

impl Scanned {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

struct Scanner<'a> {
    cursor: Cursor<'a, char>,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
}

pub fn scan_tokens(source: &str) -> Scanned {
    let chars: Vec<char> = source.chars().collect();
    let mut scanner = Scanner {
        cursor: Cursor::new(&chars),
        line: 1,
        column: 1,
        start_line: 1,
        start_column: 1,
        tokens: Vec::new(),
        errors: Vec::new(),
    };
    loop {
        scanner.skip_whitespace();
        if scanner.cursor.is_finished() {
            break;
        }
        scanner.scan_token();
    }
    scanner.tokens.push(Token::new(
        TokenKind::Eof,
        "",
        None,
        scanner.line,
        scanner.column,
    ));
    debug!(
        tokens = scanner.tokens.len(),
        errors = scanner.errors.len(),
        "scanned source"
    );
    Scanned {
        tokens: scanner.tokens,
        errors: scanner.errors,
    }
}

impl<'a> Scanner<'a> {
    fn scan_token(&mut self) {
        self.cursor.start_recording();
        self.start_line = self.line;
        self.start_column = self.column;
        let c = match self.bump() {
            Some(c) => c,
            None => return,
        };
        if let Some(kind) = SINGLE_CHAR_TOKENS.get(&c) {
            return self.add_token(*kind, None);
        }
        match c {
            '!' => {
                let kind = if self.next_if('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind, None)
            }
            '=' => {
                let kind = if self.next_if('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind, None)
            }
            '<' => {
                let kind = if self.next_if('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind, None)
            }
            '>' => {
                let kind = if self.next_if('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind, None)
            }
            '/' => {
                if self.next_if('/') {
                    self.line_comment()
                } else if self.next_if('*') {
                    self.block_comment()
                } else {
                    self.add_token(TokenKind::Slash, None)
                }
            }
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),
            _ => self.error("Unexpected character."),
        }
    }
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.cursor.peek() {
            match *c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                _ => break,
            }
        }
    }
    fn track(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
    fn bump(&mut self) -> Option<char> {
        let c = *self.cursor.consume()?;
        self.track(c);
        Some(c)
    }
    fn next_if(&mut self, expected: char) -> bool {
        if self.cursor.match_any(&[expected]) {
            self.track(expected);
            return true;
        }
        false
    }
    fn lexeme(&mut self, reset: bool) -> String {
        self.cursor.stop_recording(reset).iter().collect()
    }
    fn add_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.lexeme(true);
        trace!(%kind, lexeme = lexeme.as_str(), line = self.start_line, "token");
        self.tokens.push(Token::new(
            kind,
            &lexeme,
            literal,
            self.start_line,
            self.start_column,
        ));
    }
    fn error(&mut self, message: &str) {
        let lexeme = self.lexeme(true);
        let error = ScanError {
            line: self.start_line,
            column: self.start_column,
            lexeme: lexeme.clone(),
            message: message.to_string(),
        };
        debug!(%error, "scan error");
        self.errors.push(error);
        self.tokens.push(Token::new(
            TokenKind::Invalid,
            &lexeme,
            None,
            self.start_line,
            self.start_column,
        ));
    }
    fn line_comment(&mut self) {
        // The newline itself is left for skip_whitespace to count.
        self.column += self.cursor.advance_until(&'\n');
        self.add_token(TokenKind::Comment, None)
    }
    fn block_comment(&mut self) {
        let mut depth = 1;
        loop {
            match (self.cursor.peek().copied(), self.cursor.peek_at(1).copied()) {
                (None, _) => return self.error("Unterminated block comment."),
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.bump();
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return self.add_token(TokenKind::Comment, None);
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
    }
    fn string(&mut self) {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return self.error("Unterminated string."),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    None => return self.error("Unterminated string."),
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                },
                Some(c) => value.push(c),
            }
        }
        self.add_token(TokenKind::String, Some(Literal::String(value)))
    }
    fn digits(&mut self) {
        while let Some(c) = self.cursor.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump();
        }
    }
    fn number(&mut self) {
        self.digits();
        let fraction_follows = self
            .cursor
            .peek_at(1)
            .map_or(false, |c| c.is_ascii_digit());
        if self.cursor.peek() == Some(&'.') && fraction_follows {
            self.bump();
            self.digits();
        }
        match self.lexeme(false).parse::<f64>() {
            Ok(value) => self.add_token(TokenKind::Number, Some(Literal::Number(value))),
            Err(_) => self.error("Invalid number literal."),
        }
    }
    fn identifier(&mut self) {
        while let Some(c) = self.cursor.peek() {
            if !(c.is_alphanumeric() || *c == '_') {
                break;
            }
            self.bump();
        }
        let text = self.lexeme(false);
        match KEYWORDS.get(text.as_str()) {
            Some(kind) => self.add_token(*kind, None),
            None => self.add_token(TokenKind::Identifier, Some(Literal::String(text))),
        }
    }
}

static SINGLE_CHAR_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '(' => TokenKind::LeftParen,
    ')' => TokenKind::RightParen,
    '{' => TokenKind::LeftBrace,
    '}' => TokenKind::RightBrace,
    ',' => TokenKind::Comma,
    '.' => TokenKind::Dot,
    '-' => TokenKind::Minus,
    '+' => TokenKind::Plus,
    ';' => TokenKind::Semicolon,
    '*' => TokenKind::Star,
};

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "and" => TokenKind::And,
    "class" => TokenKind::Class,
    "else" => TokenKind::Else,
    "false" => TokenKind::False,
    "for" => TokenKind::For,
    "fun" => TokenKind::Fun,
    "if" => TokenKind::If,
    "nil" => TokenKind::Nil,
    "or" => TokenKind::Or,
    "print" => TokenKind::Print,
    "return" => TokenKind::Return,
    "super" => TokenKind::Super,
    "this" => TokenKind::This,
    "true" => TokenKind::True,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
    "break" => TokenKind::Break,
};

#[cfg(test)]
mod scanner_tests {
    use crate::scanner;
    use crate::token::{Literal, Token, TokenKind};
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scanner::scan_tokens(source)
            .tokens
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    fn number(value: f64) -> Token {
        Token::new(TokenKind::Number, "", Some(Literal::Number(value)), 0, 0)
    }

    fn bare(kind: TokenKind) -> Token {
        Token::new(kind, "", None, 0, 0)
    }

    #[test]
    fn arithmetic_expression() {
        let scanned = scanner::scan_tokens("1 + 2 * 3;");
        assert!(scanned.is_valid());
        assert_eq!(
            scanned.tokens,
            vec![
                number(1.0),
                bare(TokenKind::Plus),
                number(2.0),
                bare(TokenKind::Star),
                number(3.0),
                bare(TokenKind::Semicolon),
                bare(TokenKind::Eof),
            ]
        );
    }

    #[test]
    fn one_or_two_character_operators() {
        assert_eq!(
            kinds("! != = == < <= > >="),
            vec![
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_is_tagged() {
        let scanned = scanner::scan_tokens("// comment\n1;");
        assert!(scanned.is_valid());
        assert_eq!(scanned.tokens[0].kind, TokenKind::Comment);
        assert_eq!(scanned.tokens[0].lexeme, "// comment");
        let code: Vec<Token> = scanned
            .tokens
            .into_iter()
            .filter(|t| !t.is_comment())
            .collect();
        assert_eq!(
            code,
            vec![number(1.0), bare(TokenKind::Semicolon), bare(TokenKind::Eof)]
        );
        assert_eq!((code[0].line, code[0].column), (2, 1));
    }

    #[test]
    fn nested_block_comment() {
        let scanned = scanner::scan_tokens("/* a /* b */ c */");
        assert!(scanned.is_valid());
        assert_eq!(
            kinds("/* a /* b */ c */"),
            vec![TokenKind::Comment, TokenKind::Eof]
        );
        assert_eq!(scanned.tokens[0].lexeme, "/* a /* b */ c */");
    }

    #[test]
    fn block_comment_tracks_lines() {
        let scanned = scanner::scan_tokens("/* one\ntwo */ x");
        assert_eq!(scanned.tokens[1].kind, TokenKind::Identifier);
        assert_eq!((scanned.tokens[1].line, scanned.tokens[1].column), (2, 8));
    }

    #[test]
    fn unterminated_block_comment_is_reported() {
        let scanned = scanner::scan_tokens("/* a /* b */");
        assert!(!scanned.is_valid());
        assert_eq!(scanned.errors[0].message, "Unterminated block comment.");
        assert_eq!(
            kinds("/* a /* b */"),
            vec![TokenKind::Invalid, TokenKind::Eof]
        );
    }

    #[test]
    fn strings() {
        let scanned = scanner::scan_tokens("\"hello\nworld\" \"a\\\"b\"");
        assert!(scanned.is_valid());
        assert_eq!(
            scanned.tokens[0].literal,
            Some(Literal::String("hello\nworld".to_string()))
        );
        assert_eq!(scanned.tokens[1].literal, Some(Literal::String("a\"b".to_string())));
        assert_eq!(scanned.tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string() {
        let scanned = scanner::scan_tokens("print \"abc");
        assert!(!scanned.is_valid());
        assert_eq!(scanned.errors.len(), 1);
        assert_eq!(scanned.errors[0].message, "Unterminated string.");
        assert_eq!(
            scanned.errors[0].to_string(),
            "[line 1, column 7] at '\"abc': Unterminated string."
        );
        assert_eq!(
            kinds("print \"abc"),
            vec![TokenKind::Print, TokenKind::Invalid, TokenKind::Eof]
        );
    }

    #[test]
    fn numbers_do_not_swallow_trailing_dot() {
        let scanned = scanner::scan_tokens("12.5 7.");
        assert_eq!(scanned.tokens[0].literal, Some(Literal::Number(12.5)));
        assert_eq!(scanned.tokens[0].lexeme, "12.5");
        assert_eq!(scanned.tokens[1].literal, Some(Literal::Number(7.0)));
        assert_eq!(scanned.tokens[2].kind, TokenKind::Dot);
    }

    #[test]
    fn keywords_and_identifiers() {
        let scanned = scanner::scan_tokens("var _x1 = nil; break");
        assert_eq!(scanned.tokens[0].kind, TokenKind::Var);
        assert_eq!(scanned.tokens[1].kind, TokenKind::Identifier);
        assert_eq!(scanned.tokens[1].literal, Some(Literal::String("_x1".to_string())));
        assert_eq!(scanned.tokens[3].kind, TokenKind::Nil);
        assert_eq!(scanned.tokens[5].kind, TokenKind::Break);
    }

    #[test]
    fn unexpected_character_continues() {
        let scanned = scanner::scan_tokens("1 @ 2");
        assert!(!scanned.is_valid());
        assert_eq!(scanned.errors[0].message, "Unexpected character.");
        assert_eq!(scanned.errors[0].column, 3);
        assert_eq!(
            kinds("1 @ 2"),
            vec![
                TokenKind::Number,
                TokenKind::Invalid,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn positions_and_eof() {
        let scanned = scanner::scan_tokens("a\n  bc");
        assert_eq!((scanned.tokens[0].line, scanned.tokens[0].column), (1, 1));
        assert_eq!((scanned.tokens[1].line, scanned.tokens[1].column), (2, 3));
        let eof = scanned.tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.line, eof.column), (2, 5));
    }
}
