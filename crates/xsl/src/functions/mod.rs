//! Replacement strategies for functions the 1.0 evaluator does not know.

mod callback;
mod current_group;

pub use callback::NativeCallback;
pub use current_group::{CurrentGroup, CurrentGroupingKey, grouping_ancestor};

use crate::callback::CallbackRegistry;
use downlevel_xpath::{FunctionMap, Lexer, TokenKind, XPathError};
use std::sync::Arc;

/// Registers the grouping functions.
pub fn register_grouping(map: &mut FunctionMap) {
    map.set("current-group", Arc::new(CurrentGroup));
    map.set("current-grouping-key", Arc::new(CurrentGroupingKey));
}

/// Registers a [`NativeCallback`] rewrite for every function in `registry`.
pub fn register_callbacks(map: &mut FunctionMap, registry: &CallbackRegistry) {
    for name in registry.names() {
        map.set(name, Arc::new(NativeCallback::new(name)));
    }
}

/// Consumes `name ( )`, leaving the cursor after the closing parenthesis.
///
/// Calls passing arguments are rejected: the rewritten form could not use them.
pub(crate) fn consume_empty_call(lexer: &mut Lexer) -> Result<(), XPathError> {
    let start = lexer.key();
    let name = lexer
        .current()
        .map(|token| token.text.clone())
        .unwrap_or_default();
    let closed = lexer.peek(1).is_some_and(|t| t.is(TokenKind::LeftParen))
        && lexer.peek(2).is_some_and(|t| t.is(TokenKind::RightParen));
    if !closed {
        return Err(XPathError::InvalidCall {
            function: name,
            expression: lexer.source().to_string(),
            message: "takes no arguments".to_string(),
        });
    }
    lexer.seek(start + 3);
    Ok(())
}
