use crate::context::ExpressionContext;
use crate::error::XPathError;
use crate::function_map::FunctionMap;
use crate::lexer::Lexer;
use crate::token::TokenKind;
use std::sync::Arc;

/// Rewrites calls to registered functions inside XPath expressions.
///
/// The function map is shared read-only, so one compiler can serve every
/// expression of a document (and several documents at once).
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    functions: Arc<FunctionMap>,
}

impl Compiler {
    pub fn new(functions: Arc<FunctionMap>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &FunctionMap {
        &self.functions
    }

    /// Compiles `expression` in `context` and renders the result.
    ///
    /// Expressions without calls to registered functions come back with the
    /// same tokens; only whitespace runs are normalized to single spaces.
    pub fn compile(
        &self,
        expression: &str,
        context: &ExpressionContext<'_>,
    ) -> Result<String, XPathError> {
        let mut lexer = Lexer::tokenize(expression)?;
        let rewrites = self.rewrite(&mut lexer, context)?;
        if rewrites == 0 {
            return Ok(lexer.render());
        }
        let compiled = lexer.render();
        log::debug!(
            "Compiled '{}' -> '{}' ({} rewrites)",
            expression,
            compiled,
            rewrites
        );
        Ok(compiled)
    }

    /// Walks the stream from the start, splicing in replacements for every
    /// registered function call. Returns the number of calls rewritten.
    ///
    /// Scanning resumes right after each splice, so replacement output is
    /// never rewritten again.
    pub fn rewrite(
        &self,
        lexer: &mut Lexer,
        context: &ExpressionContext<'_>,
    ) -> Result<usize, XPathError> {
        let mut rewrites = 0;
        lexer.seek(0);

        while let Some(token) = lexer.current() {
            let is_call = token.is(TokenKind::Name)
                && lexer
                    .peek(1)
                    .is_some_and(|next| next.is(TokenKind::LeftParen));
            let function = if is_call {
                self.functions.get(&token.text)
            } else {
                None
            };
            let Some(function) = function else {
                lexer.advance();
                continue;
            };

            let name = token.text.clone();
            let leading_whitespace = token.preceded_by_whitespace;
            let start = lexer.key();

            let mut replacement = function.replace(lexer, context)?;
            let end = lexer.key();
            if end <= start {
                return Err(XPathError::InvalidCall {
                    function: name,
                    expression: lexer.source().to_string(),
                    message: "replacement did not consume the call".to_string(),
                });
            }

            if let Some(first) = replacement.first_mut() {
                first.preceded_by_whitespace = leading_whitespace;
            }
            let inserted = replacement.len();
            log::trace!(
                "Replacing '{}' tokens {}..{} with {} tokens",
                name,
                start,
                end,
                inserted
            );
            lexer.splice(start..end, replacement);
            lexer.seek(start + inserted);
            rewrites += 1;
        }

        Ok(rewrites)
    }
}
