//! XSL-specific rewriting.
//!
//! This crate knows what an XSL stylesheet looks like: which attributes hold
//! expressions, which hold value templates, and how constructs such as
//! `current-group()` map onto plain 1.0 expressions. The token-level work is
//! delegated to [`downlevel_xpath::Compiler`].

pub mod callback;
pub mod error;
pub mod functions;
pub mod nodes;
pub mod transformer;

pub use callback::{CallbackRegistry, CallbackScope, CallbackValue};
pub use error::XslError;
pub use transformer::{
    AttributeTransformer, CallbackNamespace, DocumentTransformer, ElementTransformer,
    XslTransformations,
};

use downlevel_dom::{Document, NodeId};

pub const XSL_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// Namespace of the `call` function the host evaluator exposes for native
/// callbacks.
pub const CALLBACK_NAMESPACE: &str = "urn:downlevel:callback";

/// Prefix bound to [`CALLBACK_NAMESPACE`] in transpiled stylesheets.
pub const CALLBACK_PREFIX: &str = "ext";

/// True when `element` is an instruction in the XSL namespace.
pub fn is_xsl_element(document: &Document, element: NodeId) -> bool {
    document.namespace_uri(element) == Some(XSL_NAMESPACE)
}

/// True when the attribute `name` of `element` is itself in the XSL
/// namespace, e.g. `xsl:use-attribute-sets` on a literal result element.
pub fn is_xsl_attribute(document: &Document, element: NodeId, name: &str) -> bool {
    match name.split_once(':') {
        Some(("xmlns", _)) | None => false,
        Some((prefix, _)) => {
            document.lookup_namespace(element, Some(prefix)) == Some(XSL_NAMESPACE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xsl_namespace_detection_follows_bindings() {
        let doc = Document::parse(
            r#"<t:stylesheet xmlns:t="http://www.w3.org/1999/XSL/Transform" xmlns:xsl="urn:other"><xsl:if t:use-attribute-sets="a" xsl:b="c"/></t:stylesheet>"#,
        )
        .unwrap();
        let elements = doc.elements();
        assert!(is_xsl_element(&doc, elements[0]));
        assert!(!is_xsl_element(&doc, elements[1]));
        assert!(is_xsl_attribute(&doc, elements[1], "t:use-attribute-sets"));
        assert!(!is_xsl_attribute(&doc, elements[1], "xsl:b"));
        assert!(!is_xsl_attribute(&doc, elements[1], "plain"));
    }
}
