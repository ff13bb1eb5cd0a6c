pub mod ast;
pub mod cursor;
pub mod environment;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod session;
pub mod token;

pub use session::{RunError, Session};
