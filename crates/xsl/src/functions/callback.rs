use crate::CALLBACK_PREFIX;
use downlevel_xpath::{ExpressionContext, Lexer, ReplaceFunction, Token, TokenKind, XPathError};

/// Routes a call to a native callback through the evaluator's hook:
/// `name(args...)` becomes `ext:call('name', args...)`.
///
/// Only the name and the opening parenthesis are consumed, so the arguments
/// are still scanned and can contain further rewrites.
#[derive(Debug, Clone)]
pub struct NativeCallback {
    name: String,
}

impl NativeCallback {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ReplaceFunction for NativeCallback {
    fn replace(
        &self,
        lexer: &mut Lexer,
        _context: &ExpressionContext<'_>,
    ) -> Result<Vec<Token>, XPathError> {
        let start = lexer.key();
        lexer.seek(start + 2);

        let mut tokens = vec![
            Token::name(format!("{}:call", CALLBACK_PREFIX)),
            Token::left_paren(),
            Token::string_literal(&self.name),
        ];
        let has_arguments = lexer
            .current()
            .is_some_and(|token| !token.is(TokenKind::RightParen));
        if has_arguments {
            tokens.push(Token::comma());
        }
        Ok(tokens)
    }
}
