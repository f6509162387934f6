//! Attribute value templates.
//!
//! A value such as `prefix-{$x}-suffix` is split into literal and expression
//! parts, every expression is compiled, and the parts are put back together
//! as one expression: `{concat('prefix-', $x, '-suffix')}`. Literal text ends
//! up inside string literals, so `{{`/`}}` escapes come out as single braces.

use crate::error::XslError;
use crate::transformer::AttributeTransformer;
use crate::{is_xsl_attribute, is_xsl_element};
use downlevel_dom::{Document, NodeId};
use downlevel_xpath::{Compiler, ExpressionContext};

/// Attributes of XSL instructions that are value templates, keyed by the
/// instruction's local name.
const XSL_TEMPLATE_ATTRIBUTES: &[(&str, &str)] = &[
    ("element", "name"),
    ("element", "namespace"),
    ("attribute", "name"),
    ("attribute", "namespace"),
    ("processing-instruction", "name"),
    ("number", "format"),
    ("number", "lang"),
    ("number", "letter-value"),
    ("number", "grouping-separator"),
    ("number", "grouping-size"),
    ("sort", "lang"),
    ("sort", "data-type"),
    ("sort", "order"),
    ("sort", "case-order"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Expression(String),
}

/// A parsed attribute value template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTemplate {
    parts: Vec<TemplatePart>,
    escaped: bool,
}

impl ValueTemplate {
    /// Splits `value` into parts.
    ///
    /// Braces inside string literals of an expression do not close it, and
    /// nested braces are counted. An unclosed `{`, an empty expression, or a
    /// `}` that is neither doubled nor closing an expression is an error; the
    /// message describes the problem.
    pub fn parse(value: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut escaped = false;
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                    escaped = true;
                }
                '{' => {
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    let mut expression = String::new();
                    let mut depth = 1;
                    let mut quote: Option<char> = None;
                    let mut closed = false;
                    for ec in chars.by_ref() {
                        match (quote, ec) {
                            (Some(q), _) => {
                                if ec == q {
                                    quote = None;
                                }
                            }
                            (None, '\'' | '"') => quote = Some(ec),
                            (None, '{') => depth += 1,
                            (None, '}') => {
                                depth -= 1;
                                if depth == 0 {
                                    closed = true;
                                    break;
                                }
                            }
                            _ => {}
                        }
                        expression.push(ec);
                    }
                    if !closed {
                        return Err("unclosed '{'".to_string());
                    }
                    if expression.trim().is_empty() {
                        return Err("empty expression".to_string());
                    }
                    parts.push(TemplatePart::Expression(expression));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                    escaped = true;
                }
                '}' => return Err("'}' outside an expression must be doubled".to_string()),
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }
        Ok(Self { parts, escaped })
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// True when the value has neither expressions nor escaped braces and
    /// can be left exactly as written.
    pub fn is_static(&self) -> bool {
        !self.escaped
            && self
                .parts
                .iter()
                .all(|part| matches!(part, TemplatePart::Literal(_)))
    }

    /// Reassembles the template as a single expression, compiling every
    /// expression part with `compile`.
    pub fn render<E>(
        &self,
        mut compile: impl FnMut(&str) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut arguments = Vec::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => arguments.extend(quote_literal(text)),
                TemplatePart::Expression(expression) => arguments.push(compile(expression)?),
            }
        }
        Ok(match arguments.as_slice() {
            [] => "{''}".to_string(),
            [single] => format!("{{{}}}", single),
            _ => format!("{{concat({})}}", arguments.join(", ")),
        })
    }
}

/// Writes `value` as XPath string literal arguments.
///
/// One literal when a quote style is free; otherwise the text is split around
/// apostrophes, which are written as `"'"`, so the result is meant to be
/// passed to `concat`.
pub fn quote_literal(value: &str) -> Vec<String> {
    if !value.contains('\'') {
        return vec![format!("'{}'", value)];
    }
    if !value.contains('"') {
        return vec![format!("\"{}\"", value)];
    }
    let mut pieces = Vec::new();
    for (i, segment) in value.split('\'').enumerate() {
        if i > 0 {
            pieces.push("\"'\"".to_string());
        }
        if !segment.is_empty() {
            pieces.push(format!("'{}'", segment));
        }
    }
    pieces
}

/// Expands value templates on literal result elements and on the XSL
/// instruction attributes that accept them.
#[derive(Debug, Clone)]
pub struct AttributeValueTemplates {
    compiler: Compiler,
}

impl AttributeValueTemplates {
    pub fn new(compiler: Compiler) -> Self {
        Self { compiler }
    }
}

impl AttributeTransformer for AttributeValueTemplates {
    fn supports(&self, document: &Document, element: NodeId, attribute: &str) -> bool {
        if attribute == "xmlns" || attribute.starts_with("xmlns:") {
            return false;
        }
        if is_xsl_element(document, element) {
            let Some(local) = document.local_name(element) else {
                return false;
            };
            return XSL_TEMPLATE_ATTRIBUTES
                .iter()
                .any(|&(instruction, name)| instruction == local && name == attribute);
        }
        !is_xsl_attribute(document, element, attribute)
    }

    fn transform(
        &self,
        document: &mut Document,
        element: NodeId,
        attribute: &str,
    ) -> Result<(), XslError> {
        let Some(value) = document.attribute(element, attribute) else {
            return Ok(());
        };
        let template = ValueTemplate::parse(value)
            .map_err(|message| XslError::template_syntax(attribute, value, message))?;
        if template.is_static() {
            return Ok(());
        }

        let context = ExpressionContext::for_attribute(document, element, attribute);
        let rendered =
            template.render(|expression| self.compiler.compile(expression, &context))?;
        log::debug!(
            "Expanded value template {}=\"{}\" -> \"{}\"",
            attribute,
            value,
            rendered
        );
        document.set_attribute(element, attribute, rendered);
        Ok(())
    }
}
