//! Registry of functions the compiler rewrites.

use crate::context::ExpressionContext;
use crate::error::XPathError;
use crate::lexer::Lexer;
use crate::token::Token;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Rewrites one call of an unsupported function.
///
/// On entry the lexer cursor sits on the function name. An implementation
/// advances the cursor past every token it consumed (at least the name) and
/// returns the tokens that take their place.
pub trait ReplaceFunction: Send + Sync {
    fn replace(
        &self,
        lexer: &mut Lexer,
        context: &ExpressionContext<'_>,
    ) -> Result<Vec<Token>, XPathError>;
}

impl<F> ReplaceFunction for F
where
    F: Fn(&mut Lexer, &ExpressionContext<'_>) -> Result<Vec<Token>, XPathError> + Send + Sync,
{
    fn replace(
        &self,
        lexer: &mut Lexer,
        context: &ExpressionContext<'_>,
    ) -> Result<Vec<Token>, XPathError> {
        self(lexer, context)
    }
}

/// Function name to replacement strategy. Lookup is exact and case-sensitive
/// on the qualified name; registering a name again replaces the old entry.
#[derive(Clone, Default)]
pub struct FunctionMap {
    functions: HashMap<String, Arc<dyn ReplaceFunction>>,
}

impl FunctionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, function: Arc<dyn ReplaceFunction>) {
        let name = name.into();
        if self.functions.insert(name.clone(), function).is_some() {
            log::debug!("Replaced function registration for '{}'", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ReplaceFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FunctionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionMap")
            .field("functions", &self.names())
            .finish()
    }
}
