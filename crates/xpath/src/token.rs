//! Lexical tokens of an XPath expression.

/// The lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A (possibly qualified) name: element tests, function names, axis names
    /// and the word operators `and`, `or`, `div`, `mod`.
    Name,
    /// `$name`
    Variable,
    StringLiteral,
    NumberLiteral,
    /// Comparison, arithmetic and set operators.
    Operator,
    Slash,
    DoubleSlash,
    /// `::`
    AxisSeparator,
    At,
    Dot,
    DotDot,
    Star,
    Comma,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    /// Anything the lexer does not understand. Passed through verbatim.
    Unknown,
}

impl TokenKind {
    /// Tokens that would fuse into one if written without a separator.
    pub fn is_word_like(self) -> bool {
        matches!(
            self,
            TokenKind::Name | TokenKind::Variable | TokenKind::NumberLiteral
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset in the source expression. `None` for tokens produced by a
    /// replacement strategy.
    pub offset: Option<usize>,
    /// Whether the source had whitespace directly before this token.
    pub preceded_by_whitespace: bool,
}

impl Token {
    /// A token that did not come from the source expression.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            offset: None,
            preceded_by_whitespace: false,
        }
    }

    pub fn name(text: impl Into<String>) -> Self {
        Self::synthetic(TokenKind::Name, text)
    }

    pub fn variable(name: &str) -> Self {
        Self::synthetic(TokenKind::Variable, format!("${}", name))
    }

    pub fn string_literal(value: &str) -> Self {
        let quoted = if value.contains('\'') {
            format!("\"{}\"", value)
        } else {
            format!("'{}'", value)
        };
        Self::synthetic(TokenKind::StringLiteral, quoted)
    }

    pub fn operator(text: impl Into<String>) -> Self {
        Self::synthetic(TokenKind::Operator, text)
    }

    pub fn slash() -> Self {
        Self::synthetic(TokenKind::Slash, "/")
    }

    pub fn double_slash() -> Self {
        Self::synthetic(TokenKind::DoubleSlash, "//")
    }

    pub fn at() -> Self {
        Self::synthetic(TokenKind::At, "@")
    }

    pub fn dot() -> Self {
        Self::synthetic(TokenKind::Dot, ".")
    }

    pub fn star() -> Self {
        Self::synthetic(TokenKind::Star, "*")
    }

    pub fn comma() -> Self {
        Self::synthetic(TokenKind::Comma, ",")
    }

    pub fn left_paren() -> Self {
        Self::synthetic(TokenKind::LeftParen, "(")
    }

    pub fn right_paren() -> Self {
        Self::synthetic(TokenKind::RightParen, ")")
    }

    pub fn left_bracket() -> Self {
        Self::synthetic(TokenKind::LeftBracket, "[")
    }

    pub fn right_bracket() -> Self {
        Self::synthetic(TokenKind::RightBracket, "]")
    }

    pub fn is_synthetic(&self) -> bool {
        self.offset.is_none()
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_picks_safe_quote() {
        assert_eq!(Token::string_literal("abc").text, "'abc'");
        assert_eq!(Token::string_literal("it's").text, "\"it's\"");
    }

    #[test]
    fn test_synthetic_tokens_have_no_offset() {
        let t = Token::variable("current-group-g1");
        assert_eq!(t.text, "$current-group-g1");
        assert!(t.is_synthetic());
        assert!(t.kind.is_word_like());
        assert!(!Token::slash().kind.is_word_like());
    }
}
