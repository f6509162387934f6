//! The transformer capabilities and the document-level passes built on them.

use crate::error::XslError;
use crate::nodes::{AttributeValueTemplates, ExpressionAttribute};
use crate::{CALLBACK_NAMESPACE, CALLBACK_PREFIX, XSL_NAMESPACE, is_xsl_element};
use downlevel_dom::{Document, NodeId};
use downlevel_xpath::Compiler;

/// Rewrites an element of the stylesheet.
pub trait ElementTransformer: Send + Sync {
    fn supports(&self, document: &Document, element: NodeId) -> bool;
    fn transform(&self, document: &mut Document, element: NodeId) -> Result<(), XslError>;
}

/// Rewrites one attribute of an element.
pub trait AttributeTransformer: Send + Sync {
    fn supports(&self, document: &Document, element: NodeId, attribute: &str) -> bool;
    fn transform(
        &self,
        document: &mut Document,
        element: NodeId,
        attribute: &str,
    ) -> Result<(), XslError>;
}

/// A pass over a whole document.
pub trait DocumentTransformer: Send + Sync {
    fn transform(&self, document: &mut Document) -> Result<(), XslError>;
}

/// Applies element and attribute transformers to every element, in document
/// order.
///
/// For each element the element transformers run first, in registration
/// order, each seeing the output of the previous one. Then every attribute
/// the element had at that point is offered to the attribute transformers.
pub struct XslTransformations {
    elements: Vec<Box<dyn ElementTransformer>>,
    attributes: Vec<Box<dyn AttributeTransformer>>,
}

impl XslTransformations {
    pub fn new(
        elements: Vec<Box<dyn ElementTransformer>>,
        attributes: Vec<Box<dyn AttributeTransformer>>,
    ) -> Self {
        Self {
            elements,
            attributes,
        }
    }

    /// `test` and `select` expressions, then value templates.
    pub fn standard(compiler: &Compiler) -> Self {
        Self::new(
            vec![
                Box::new(ExpressionAttribute::test(compiler.clone())),
                Box::new(ExpressionAttribute::select(compiler.clone())),
            ],
            vec![Box::new(AttributeValueTemplates::new(compiler.clone()))],
        )
    }
}

impl DocumentTransformer for XslTransformations {
    fn transform(&self, document: &mut Document) -> Result<(), XslError> {
        let elements = document.elements();
        log::debug!("Applying XSL transformations to {} elements", elements.len());

        for element in elements {
            for transformer in &self.elements {
                if transformer.supports(document, element) {
                    transformer.transform(document, element)?;
                }
            }

            let names: Vec<String> = document
                .attributes(element)
                .iter()
                .map(|attr| attr.name.clone())
                .collect();
            for name in &names {
                for transformer in &self.attributes {
                    if transformer.supports(document, element, name) {
                        transformer.transform(document, element, name)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Binds the callback prefix on the stylesheet element and keeps it out of
/// the result tree. Stylesheets with no rewritten callback call are left
/// alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackNamespace;

impl DocumentTransformer for CallbackNamespace {
    fn transform(&self, document: &mut Document) -> Result<(), XslError> {
        let Some(root) = document.document_element() else {
            return Ok(());
        };
        if !uses_callbacks(document) {
            return Ok(());
        }

        match document.lookup_namespace(root, Some(CALLBACK_PREFIX)) {
            Some(CALLBACK_NAMESPACE) => {}
            Some(other) => {
                return Err(XslError::NamespaceConflict {
                    prefix: CALLBACK_PREFIX.to_string(),
                    namespace: other.to_string(),
                });
            }
            None => {
                let declaration = format!("xmlns:{}", CALLBACK_PREFIX);
                document.set_attribute(root, &declaration, CALLBACK_NAMESPACE);
            }
        }

        let exclude = if is_xsl_element(document, root) {
            "exclude-result-prefixes".to_string()
        } else {
            match xsl_prefix(document, root) {
                Some(prefix) => format!("{}:exclude-result-prefixes", prefix),
                None => return Ok(()),
            }
        };

        let current = document.attribute(root, &exclude).unwrap_or_default();
        let listed = current
            .split_ascii_whitespace()
            .any(|prefix| prefix == CALLBACK_PREFIX || prefix == "#all");
        if !listed {
            let updated = if current.trim().is_empty() {
                CALLBACK_PREFIX.to_string()
            } else {
                format!("{} {}", current.trim(), CALLBACK_PREFIX)
            };
            document.set_attribute(root, &exclude, updated);
        }
        Ok(())
    }
}

/// Whether any attribute holds a call emitted by the callback rewrite.
fn uses_callbacks(document: &Document) -> bool {
    let call = format!("{}:call(", CALLBACK_PREFIX);
    document.elements().into_iter().any(|element| {
        document
            .attributes(element)
            .iter()
            .any(|attr| attr.value.contains(&call))
    })
}

/// The prefix a literal result element root uses for the XSL namespace.
fn xsl_prefix(document: &Document, root: NodeId) -> Option<String> {
    document
        .attributes(root)
        .iter()
        .filter(|attr| attr.value == XSL_NAMESPACE)
        .find_map(|attr| attr.name.strip_prefix("xmlns:"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::register_grouping;
    use downlevel_xpath::FunctionMap;
    use std::sync::Arc;

    const STYLESHEET: &str = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform" version="2.0" exclude-result-prefixes="xs">
  <xsl:template match="/">
    <xsl:for-each select="item" group-id="g1">
      <li class="n-{count(current-group())}">
        <xsl:if test="count(current-group()) &gt; 1">
          <xsl:value-of select="current-grouping-key()"/>
        </xsl:if>
      </li>
    </xsl:for-each>
  </xsl:template>
</xsl:stylesheet>"#;

    fn standard() -> XslTransformations {
        let mut map = FunctionMap::new();
        register_grouping(&mut map);
        XslTransformations::standard(&Compiler::new(Arc::new(map)))
    }

    fn find(doc: &Document, name: &str) -> NodeId {
        doc.elements()
            .into_iter()
            .find(|&id| doc.name(id) == Some(name))
            .unwrap()
    }

    #[test]
    fn test_standard_transformations() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut doc = Document::parse(STYLESHEET).unwrap();
        standard().transform(&mut doc).unwrap();

        let group = "$current-un-grouped-g1[generate-id(.)=$current-group-g1//xsl:element-id]";
        assert_eq!(
            doc.attribute(find(&doc, "li"), "class"),
            Some(format!("{{concat('n-', count({}))}}", group).as_str())
        );
        assert_eq!(
            doc.attribute(find(&doc, "xsl:if"), "test"),
            Some(format!("count({}) > 1", group).as_str())
        );
        assert_eq!(
            doc.attribute(find(&doc, "xsl:value-of"), "select"),
            Some("string($current-group-g1/@key)")
        );
        assert_eq!(doc.attribute(find(&doc, "xsl:template"), "match"), Some("/"));
    }

    #[test]
    fn test_first_error_aborts() {
        let mut doc = Document::parse(
            r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><p title="{oops"/></xsl:stylesheet>"#,
        )
        .unwrap();
        let err = standard().transform(&mut doc).unwrap_err();
        assert!(matches!(err, XslError::TemplateSyntax { ref attribute, .. } if attribute == "title"));
    }

    const CALLING_STYLESHEET: &str = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform" version="2.0" exclude-result-prefixes="xs">
  <xsl:template match="/"><xsl:value-of select="ext:call('upper-case', name())"/></xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn test_callback_namespace_skipped_without_calls() {
        let mut doc = Document::parse(STYLESHEET).unwrap();
        CallbackNamespace.transform(&mut doc).unwrap();

        let root = doc.document_element().unwrap();
        assert_eq!(doc.attribute(root, "xmlns:ext"), None);
        assert_eq!(doc.attribute(root, "exclude-result-prefixes"), Some("xs"));
        assert_eq!(doc.to_xml(), STYLESHEET);
    }

    #[test]
    fn test_callback_namespace_declared_and_excluded() {
        let mut doc = Document::parse(CALLING_STYLESHEET).unwrap();
        CallbackNamespace.transform(&mut doc).unwrap();
        CallbackNamespace.transform(&mut doc).unwrap();

        let root = doc.document_element().unwrap();
        assert_eq!(doc.attribute(root, "xmlns:ext"), Some(CALLBACK_NAMESPACE));
        assert_eq!(doc.attribute(root, "exclude-result-prefixes"), Some("xs ext"));
    }

    #[test]
    fn test_callback_namespace_on_literal_result_root() {
        let mut doc = Document::parse(
            r#"<html xmlns:x="http://www.w3.org/1999/XSL/Transform" x:version="2.0"><x:value-of select="ext:call('abs', -1)"/></html>"#,
        )
        .unwrap();
        CallbackNamespace.transform(&mut doc).unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.attribute(root, "x:exclude-result-prefixes"), Some("ext"));
    }

    #[test]
    fn test_callback_prefix_conflict() {
        let mut doc = Document::parse(
            r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform" xmlns:ext="urn:else"><xsl:if test="ext:call('abs', 1)"/></xsl:stylesheet>"#,
        )
        .unwrap();
        assert!(matches!(
            CallbackNamespace.transform(&mut doc),
            Err(XslError::NamespaceConflict { .. })
        ));
    }
}
