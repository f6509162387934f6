use super::consume_empty_call;
use crate::XSL_NAMESPACE;
use downlevel_dom::NodeId;
use downlevel_xpath::{ExpressionContext, Lexer, ReplaceFunction, Token, XPathError};

/// Name of the marker element selected when a grouping function is used
/// outside a grouping construct. It never exists, so the selection is empty.
const EMPTY_SEQUENCE_MARKER: &str = "xs:sequence";

/// Finds the innermost `xsl:for-each` carrying a non-empty `group-id` around
/// the expression, and returns it with that id.
///
/// The walk never goes past the document node.
pub fn grouping_ancestor<'a>(context: &ExpressionContext<'a>) -> Option<(NodeId, &'a str)> {
    let document = context.document;
    context.enclosing_nodes().find_map(|node| {
        let is_for_each = document.local_name(node) == Some("for-each")
            && document.namespace_uri(node) == Some(XSL_NAMESPACE);
        if !is_for_each {
            return None;
        }
        document
            .attribute(node, "group-id")
            .filter(|id| !id.is_empty())
            .map(|id| (node, id))
    })
}

/// Checks that `group_id` can be appended to a variable name.
fn checked_group_id<'a>(
    group_id: &'a str,
    function: &str,
    lexer: &Lexer,
) -> Result<&'a str, XPathError> {
    let valid = group_id
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        return Ok(group_id);
    }
    Err(XPathError::InvalidCall {
        function: function.to_string(),
        expression: lexer.source().to_string(),
        message: format!("group-id '{}' is not a valid name", group_id),
    })
}

/// `/xs:sequence/*`, a path that selects nothing.
fn empty_selection() -> Vec<Token> {
    vec![
        Token::slash(),
        Token::name(EMPTY_SEQUENCE_MARKER),
        Token::slash(),
        Token::star(),
    ]
}

/// `current-group()`.
///
/// Inside a grouped iteration with id `G` the call becomes
/// `$current-un-grouped-G[generate-id(.) = $current-group-G//xsl:element-id]`:
/// the members of the ungrouped population whose generated id is recorded
/// under the active group.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentGroup;

impl ReplaceFunction for CurrentGroup {
    fn replace(
        &self,
        lexer: &mut Lexer,
        context: &ExpressionContext<'_>,
    ) -> Result<Vec<Token>, XPathError> {
        consume_empty_call(lexer)?;

        let Some((_, group_id)) = grouping_ancestor(context) else {
            log::warn!(
                "current-group() used outside a grouping construct in '{}'; it selects nothing",
                lexer.source()
            );
            return Ok(empty_selection());
        };
        let group_id = checked_group_id(group_id, "current-group", lexer)?;

        Ok(vec![
            Token::variable(&format!("current-un-grouped-{}", group_id)),
            Token::left_bracket(),
            Token::name("generate-id"),
            Token::left_paren(),
            Token::dot(),
            Token::right_paren(),
            Token::operator("="),
            Token::variable(&format!("current-group-{}", group_id)),
            Token::double_slash(),
            Token::name("xsl:element-id"),
            Token::right_bracket(),
        ])
    }
}

/// `current-grouping-key()`, read from the `key` attribute of the active
/// group's record: `string($current-group-G/@key)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentGroupingKey;

impl ReplaceFunction for CurrentGroupingKey {
    fn replace(
        &self,
        lexer: &mut Lexer,
        context: &ExpressionContext<'_>,
    ) -> Result<Vec<Token>, XPathError> {
        consume_empty_call(lexer)?;

        let Some((_, group_id)) = grouping_ancestor(context) else {
            log::warn!(
                "current-grouping-key() used outside a grouping construct in '{}'; it is empty",
                lexer.source()
            );
            return Ok(vec![Token::string_literal("")]);
        };
        let group_id = checked_group_id(group_id, "current-grouping-key", lexer)?;

        Ok(vec![
            Token::name("string"),
            Token::left_paren(),
            Token::variable(&format!("current-group-{}", group_id)),
            Token::slash(),
            Token::at(),
            Token::name("key"),
            Token::right_paren(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::register_grouping;
    use downlevel_dom::Document;
    use downlevel_xpath::{Compiler, FunctionMap};
    use std::sync::Arc;

    const STYLESHEET: &str = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform" version="2.0">
  <xsl:template match="/">
    <xsl:for-each select="item" group-id="outer">
      <xsl:value-of select="count(current-group())"/>
      <xsl:for-each select="x" group-id="inner">
        <xsl:value-of select="count(current-group())"/>
      </xsl:for-each>
      <xsl:for-each select="y">
        <span title="{current-grouping-key()}"/>
      </xsl:for-each>
    </xsl:for-each>
    <xsl:value-of select="count(current-group())"/>
    <xsl:for-each select="z" group-id="">
      <xsl:value-of select="current-grouping-key()"/>
    </xsl:for-each>
  </xsl:template>
</xsl:stylesheet>"#;

    fn compiler() -> Compiler {
        let mut map = FunctionMap::new();
        register_grouping(&mut map);
        Compiler::new(Arc::new(map))
    }

    fn value_ofs(doc: &Document) -> Vec<NodeId> {
        doc.elements()
            .into_iter()
            .filter(|&id| doc.local_name(id) == Some("value-of"))
            .collect()
    }

    fn compile_select(doc: &Document, node: NodeId) -> String {
        let select = doc.attribute(node, "select").unwrap();
        compiler()
            .compile(select, &ExpressionContext::element(doc, node))
            .unwrap()
    }

    #[test]
    fn test_current_group_inside_grouping() {
        let doc = Document::parse(STYLESHEET).unwrap();
        let compiled = compile_select(&doc, value_ofs(&doc)[0]);
        assert_eq!(
            compiled,
            "count($current-un-grouped-outer[generate-id(.)=$current-group-outer//xsl:element-id])"
        );
        assert!(compiled.contains('='));
    }

    #[test]
    fn test_innermost_grouping_wins() {
        let doc = Document::parse(STYLESHEET).unwrap();
        let compiled = compile_select(&doc, value_ofs(&doc)[1]);
        assert!(compiled.contains("$current-group-inner"));
        assert!(!compiled.contains("outer"));
    }

    #[test]
    fn test_current_group_outside_grouping_selects_nothing() {
        let doc = Document::parse(STYLESHEET).unwrap();
        let outside = compile_select(&doc, value_ofs(&doc)[2]);
        assert_eq!(outside, "count(/xs:sequence/*)");

        let inside = compile_select(&doc, value_ofs(&doc)[0]);
        assert_ne!(inside, outside);
    }

    #[test]
    fn test_empty_group_id_does_not_qualify() {
        let doc = Document::parse(STYLESHEET).unwrap();
        assert_eq!(compile_select(&doc, value_ofs(&doc)[3]), "''");
    }

    #[test]
    fn test_grouping_key_in_attribute_context() {
        let doc = Document::parse(STYLESHEET).unwrap();
        let span = doc
            .elements()
            .into_iter()
            .find(|&id| doc.name(id) == Some("span"))
            .unwrap();
        let context = ExpressionContext::for_attribute(&doc, span, "title");
        assert_eq!(
            compiler().compile("current-grouping-key()", &context).unwrap(),
            "string($current-group-outer/@key)"
        );
    }

    #[test]
    fn test_group_id_must_be_a_name() {
        let doc = Document::parse(
            r#"<xsl:for-each xmlns:xsl="http://www.w3.org/1999/XSL/Transform" group-id="a b"><xsl:value-of select="count(current-group())"/></xsl:for-each>"#,
        )
        .unwrap();
        let node = value_ofs(&doc)[0];
        let context = ExpressionContext::element(&doc, node);
        for expression in ["count(current-group())", "current-grouping-key()"] {
            let err = compiler().compile(expression, &context).unwrap_err();
            assert!(matches!(
                err,
                XPathError::InvalidCall { ref message, .. } if message.contains("a b")
            ));
        }
    }

    #[test]
    fn test_arguments_are_rejected() {
        let doc = Document::parse(STYLESHEET).unwrap();
        let node = value_ofs(&doc)[0];
        let err = compiler()
            .compile("current-group(1)", &ExpressionContext::element(&doc, node))
            .unwrap_err();
        assert!(matches!(err, XPathError::InvalidCall { .. }));
    }
}
