//! A small, mutable XML document tree.
//!
//! Stylesheets are parsed into an arena of nodes addressed by [`NodeId`], which
//! keeps parent links cheap and lets transformers rewrite attributes in place
//! while other code holds plain ids. The tree preserves everything needed to
//! serialize the document back out: the XML declaration, the doctype (with its
//! internal subset), comments, processing instructions, CDATA sections and
//! unresolved entity references.

pub mod doctype;
pub mod document;
pub mod error;
pub mod node;
pub mod parser;
pub mod serializer;

pub use document::{Ancestors, Document};
pub use error::DomError;
pub use node::{Attribute, Element, NodeId, NodeKind};

/// The namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
