#![allow(dead_code)]

use downlevel::{Transpiler, TranspilerBuilder};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub const XSL_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A transpiler with default settings.
pub fn transpiler() -> Transpiler {
    TranspilerBuilder::new().build()
}

/// Wraps template content in an `xsl:stylesheet` with the given version.
pub fn stylesheet(version: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xsl:stylesheet xmlns:xsl="{}" version="{}">
{}
</xsl:stylesheet>"#,
        XSL_NAMESPACE, version, body
    )
}

/// Parses transpiled output and returns the value of `attribute` on the first
/// element with the given local name.
pub fn attribute_of(xml: &str, element: &str, attribute: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(xml).ok()?;
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == element)
        .and_then(|n| n.attribute(attribute))
        .map(str::to_string)
}
