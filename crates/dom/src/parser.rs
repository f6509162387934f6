//! Builds a [`Document`] from `quick-xml` reader events.
use crate::doctype::internal_entities;
use crate::document::Document;
use crate::error::DomError;
use crate::node::{Attribute, Element, NodeId, NodeKind, RawKind};
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape, unescape_with};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use std::collections::HashMap;

/// Drives the reader over `source`, appending a node for every event.
///
/// Markup that is not rewritten by the transpiler (declaration, doctype,
/// comments, processing instructions, CDATA) is kept as the exact source slice.
pub fn parse_document(source: &str) -> Result<Document, DomError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut document = Document::new();
    let mut open: Vec<NodeId> = Vec::new();
    let mut entities: HashMap<String, String> = HashMap::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event_into(&mut buf)?;
        let end = reader.buffer_position() as usize;
        let raw = &source[start..end];
        let parent = open.last().copied().unwrap_or_else(|| document.root());

        match event {
            XmlEvent::Start(e) => {
                let element = read_element(&e, &entities)?;
                let id = document.append(parent, NodeKind::Element(element));
                open.push(id);
            }
            XmlEvent::Empty(e) => {
                let element = read_element(&e, &entities)?;
                document.append(parent, NodeKind::Element(element));
            }
            XmlEvent::End(e) => {
                if open.pop().is_none() {
                    let qname = e.name();
                    let name = std::str::from_utf8(qname.as_ref())?;
                    return Err(DomError::UnexpectedEnd(name.to_string()));
                }
            }
            XmlEvent::Text(_) => {
                let text = unescape(raw)?;
                document.append_text(parent, &text);
            }
            XmlEvent::GeneralRef(_) => match unescape(raw) {
                Ok(text) => document.append_text(parent, &text),
                Err(_) => {
                    let name = raw.trim_start_matches('&').trim_end_matches(';');
                    log::debug!("Keeping unresolved entity reference '{}'", name);
                    document.append(parent, NodeKind::EntityRef(name.to_string()));
                }
            },
            XmlEvent::CData(_) => {
                document.append(parent, NodeKind::Raw(RawKind::CData, raw.to_string()));
            }
            XmlEvent::Comment(_) => {
                document.append(parent, NodeKind::Raw(RawKind::Comment, raw.to_string()));
            }
            XmlEvent::PI(_) => {
                document.append(
                    parent,
                    NodeKind::Raw(RawKind::ProcessingInstruction, raw.to_string()),
                );
            }
            XmlEvent::Decl(_) => {
                document.append(parent, NodeKind::Raw(RawKind::Declaration, raw.to_string()));
            }
            XmlEvent::DocType(_) => {
                entities = internal_entities(raw);
                document.append(parent, NodeKind::Raw(RawKind::Doctype, raw.to_string()));
            }
            XmlEvent::Eof => break,
        }
        buf.clear();
    }

    if let Some(&unclosed) = open.last() {
        let name = document.name(unclosed).unwrap_or_default().to_string();
        return Err(DomError::UnclosedElement(name));
    }

    Ok(document)
}

/// Attribute values cannot hold entity reference nodes, so references to
/// internal entities are expanded in place.
fn read_element(
    e: &BytesStart<'_>,
    entities: &HashMap<String, String>,
) -> Result<Element, DomError> {
    let qname = e.name();
    let name = std::str::from_utf8(qname.as_ref())?;
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let raw_value = std::str::from_utf8(&attr.value)?;
        let value = unescape_with(raw_value, |entity| {
            resolve_predefined_entity(entity).or_else(|| entities.get(entity).map(String::as_str))
        })?;
        element.attributes.push(Attribute::new(key, value.into_owned()));
    }
    Ok(element)
}
