use crate::ast::Value;
use crate::interpreter::RuntimeError;
use crate::token::Token;
use std::collections::BTreeMap;

#[derive(Debug)]
struct Frame {
    values: BTreeMap<String, Value>,
    parent: Option<usize>,
}

/// Scope frames kept in an arena and linked to their enclosing frame by
/// index. Frame 0 is the global scope and is never removed.
///
/// Blocks nest strictly, so the active frame is always the last one in
/// the arena and ending a block truncates it.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    current: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            frames: vec![Frame {
                values: BTreeMap::new(),
                parent: None,
            }],
            current: 0,
        }
    }
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
    pub fn start_block(&mut self) {
        self.frames.push(Frame {
            values: BTreeMap::new(),
            parent: Some(self.current),
        });
        self.current = self.frames.len() - 1;
    }
    pub fn end_block(&mut self) {
        if let Some(parent) = self.frames[self.current].parent {
            self.frames.truncate(self.current);
            self.current = parent;
        }
    }
    pub fn define(&mut self, name: &str, value: Value) {
        self.frames[self.current]
            .values
            .insert(name.to_string(), value);
    }
    pub fn get(&self, token: &Token) -> Result<Value, RuntimeError> {
        let mut frame = Some(self.current);
        while let Some(index) = frame {
            if let Some(x) = self.frames[index].values.get(&token.lexeme) {
                return Ok(x.clone());
            }
            frame = self.frames[index].parent;
        }
        Err(undefined(token))
    }
    /// Overwrites the binding in the nearest frame that defines the name.
    pub fn assign(&mut self, token: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut frame = Some(self.current);
        while let Some(index) = frame {
            if let Some(x) = self.frames[index].values.get_mut(&token.lexeme) {
                *x = value;
                return Ok(());
            }
            frame = self.frames[index].parent;
        }
        Err(undefined(token))
    }
}

fn undefined(token: &Token) -> RuntimeError {
    RuntimeError::evaluation(token, format!("Undefined variable '{}'", token.lexeme))
}

#[cfg(test)]
mod environment_tests {
    use super::Environment;
    use crate::ast::Value;
    use crate::token::{Token, TokenKind};

    fn name(text: &str) -> Token {
        Token::new(TokenKind::Identifier, text, None, 1, 1)
    }

    #[test]
    fn shadowing_and_restore() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.start_block();
        env.define("x", Value::Number(2.0));
        assert_eq!(env.get(&name("x")).unwrap(), Value::Number(2.0));
        env.end_block();
        assert_eq!(env.get(&name("x")).unwrap(), Value::Number(1.0));
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn assign_walks_to_nearest_definition() {
        let mut env = Environment::new();
        env.define("a", Value::Nil);
        env.start_block();
        env.start_block();
        env.assign(&name("a"), Value::Boolean(true)).unwrap();
        env.end_block();
        env.end_block();
        assert_eq!(env.get(&name("a")).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn undefined_names_fault() {
        let mut env = Environment::new();
        assert!(env.get(&name("missing")).is_err());
        let err = env.assign(&name("missing"), Value::Nil).unwrap_err();
        assert!(err.to_string().ends_with("Undefined variable 'missing'"));
        assert!(env.get(&name("missing")).is_err());
    }

    #[test]
    fn global_frame_survives_extra_end_block() {
        let mut env = Environment::new();
        env.define("g", Value::Number(3.0));
        env.end_block();
        assert_eq!(env.get(&name("g")).unwrap(), Value::Number(3.0));
    }
}
