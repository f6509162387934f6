use thiserror::Error;

#[derive(Error, Debug)]
pub enum XslError {
    #[error("XPath error: {0}")]
    XPath(#[from] downlevel_xpath::XPathError),

    #[error("Invalid value template in attribute '{attribute}' ('{value}'): {message}")]
    TemplateSyntax {
        attribute: String,
        value: String,
        message: String,
    },

    #[error("Unknown callback function '{0}'")]
    UnknownFunction(String),

    #[error("Invalid argument for callback '{function}': {message}")]
    InvalidArgument { function: String, message: String },

    #[error("No callback context is active on this thread")]
    NoActiveContext,

    #[error("Prefix '{prefix}' is already bound to '{namespace}'")]
    NamespaceConflict { prefix: String, namespace: String },

    #[error("Document error: {0}")]
    Dom(#[from] downlevel_dom::DomError),
}

impl XslError {
    pub fn template_syntax(
        attribute: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TemplateSyntax {
            attribute: attribute.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }
}
