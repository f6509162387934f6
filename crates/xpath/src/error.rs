use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XPathError {
    #[error("Unterminated string literal at offset {offset} in '{expression}'")]
    UnterminatedLiteral { expression: String, offset: usize },

    #[error("Unbalanced '{delimiter}' at offset {offset} in '{expression}'")]
    UnbalancedBracket {
        expression: String,
        delimiter: char,
        offset: usize,
    },

    #[error("Function '{function}' error in '{expression}': {message}")]
    InvalidCall {
        function: String,
        expression: String,
        message: String,
    },
}

impl XPathError {
    /// The expression text the error was raised for.
    pub fn expression(&self) -> &str {
        match self {
            XPathError::UnterminatedLiteral { expression, .. }
            | XPathError::UnbalancedBracket { expression, .. }
            | XPathError::InvalidCall { expression, .. } => expression,
        }
    }
}
