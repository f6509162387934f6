use downlevel_dom::{Document, NodeId};

/// Where in the stylesheet an expression lives.
///
/// Replacement strategies use this to inspect the structure around the
/// expression, e.g. to find the grouping construct a call belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionContext<'a> {
    pub document: &'a Document,
    /// The element owning the expression.
    pub node: NodeId,
    /// Set when the expression is embedded in a value template of this
    /// attribute rather than being the whole value of an expression attribute.
    pub attribute: Option<&'a str>,
}

impl<'a> ExpressionContext<'a> {
    /// Context for an expression attribute such as `test` or `select`.
    pub fn element(document: &'a Document, node: NodeId) -> Self {
        Self {
            document,
            node,
            attribute: None,
        }
    }

    /// Context for an expression inside the value template of `attribute`.
    pub fn for_attribute(document: &'a Document, node: NodeId, attribute: &'a str) -> Self {
        Self {
            document,
            node,
            attribute: Some(attribute),
        }
    }

    /// The nodes enclosing the expression, innermost first, ending with the
    /// document node.
    ///
    /// For an element's own expression attribute the walk starts at the
    /// element's parent. For an attribute value the attribute's owner element
    /// is the first enclosing node.
    pub fn enclosing_nodes(&self) -> impl Iterator<Item = NodeId> + use<'a> {
        let document = self.document;
        let start = match self.attribute {
            Some(_) => Some(self.node),
            None => document.parent(self.node),
        };
        start
            .into_iter()
            .flat_map(move |first| std::iter::once(first).chain(document.ancestors(first)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing_nodes_for_element_and_attribute() {
        let doc = Document::parse("<a><b><c x='1'/></b></a>").unwrap();
        let c = *doc.elements().last().unwrap();

        let element_scope: Vec<_> = ExpressionContext::element(&doc, c)
            .enclosing_nodes()
            .filter_map(|id| doc.name(id))
            .collect();
        assert_eq!(element_scope, vec!["b", "a"]);

        let attribute_scope: Vec<_> = ExpressionContext::for_attribute(&doc, c, "x")
            .enclosing_nodes()
            .filter_map(|id| doc.name(id))
            .collect();
        assert_eq!(attribute_scope, vec!["c", "b", "a"]);

        let last = ExpressionContext::element(&doc, c).enclosing_nodes().last();
        assert_eq!(last, Some(doc.root()));
    }
}
