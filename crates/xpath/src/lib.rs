//! Lexing and token-level rewriting of XPath expressions.
//!
//! Nothing here evaluates an expression. The [`Compiler`] tokenizes an
//! expression, replaces calls to functions registered in a [`FunctionMap`] with
//! equivalent token sequences, and renders the result back to a string that a
//! 1.0-level evaluator understands.

pub mod compiler;
pub mod context;
pub mod error;
pub mod function_map;
pub mod lexer;
pub mod token;

pub use compiler::Compiler;
pub use context::ExpressionContext;
pub use error::XPathError;
pub use function_map::{FunctionMap, ReplaceFunction};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
