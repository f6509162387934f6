use crate::error::XslError;
use crate::is_xsl_element;
use crate::transformer::ElementTransformer;
use downlevel_dom::{Document, NodeId};
use downlevel_xpath::{Compiler, ExpressionContext};

/// Compiles the expression held by one attribute of XSL instructions, such
/// as `xsl:if/@test` or `xsl:value-of/@select`.
#[derive(Debug, Clone)]
pub struct ExpressionAttribute {
    attribute: String,
    compiler: Compiler,
}

impl ExpressionAttribute {
    pub fn new(attribute: impl Into<String>, compiler: Compiler) -> Self {
        Self {
            attribute: attribute.into(),
            compiler,
        }
    }

    pub fn test(compiler: Compiler) -> Self {
        Self::new("test", compiler)
    }

    pub fn select(compiler: Compiler) -> Self {
        Self::new("select", compiler)
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl ElementTransformer for ExpressionAttribute {
    fn supports(&self, document: &Document, element: NodeId) -> bool {
        document.has_attribute(element, &self.attribute) && is_xsl_element(document, element)
    }

    fn transform(&self, document: &mut Document, element: NodeId) -> Result<(), XslError> {
        let Some(value) = document.attribute(element, &self.attribute) else {
            return Ok(());
        };
        let context = ExpressionContext::element(document, element);
        let compiled = self.compiler.compile(value, &context)?;
        if compiled != value {
            document.set_attribute(element, &self.attribute, compiled);
        }
        Ok(())
    }
}
