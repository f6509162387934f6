use crate::document::Document;
use crate::node::{NodeId, NodeKind};
use quick_xml::escape::{escape, partial_escape};

/// Writes the document back out as markup.
pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    for &child in document.children(document.root()) {
        write_node(document, child, &mut out);
    }
    out
}

fn write_node(document: &Document, id: NodeId, out: &mut String) {
    match document.kind(id) {
        NodeKind::Document => {
            for &child in document.children(id) {
                write_node(document, child, out);
            }
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for attr in &el.attributes {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(&attr.value));
                out.push('"');
            }
            let children = document.children(id);
            if children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for &child in children {
                    write_node(document, child, out);
                }
                out.push_str("</");
                out.push_str(&el.name);
                out.push('>');
            }
        }
        NodeKind::Text(text) => out.push_str(&partial_escape(text.as_str())),
        NodeKind::EntityRef(name) => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
        NodeKind::Raw(_, raw) => out.push_str(raw),
    }
}

/// Escapes markup characters plus literal whitespace that attribute value
/// normalization would otherwise collapse on the next parse.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}
