//! Inspection of `<!DOCTYPE>` internal subsets.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static ENTITY_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!ENTITY\s+(?:%\s+)?([^\s>]+)").expect("Invalid entity declaration regex")
});

static INTERNAL_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<!ENTITY\s+([^\s%>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)
        .expect("Invalid internal entity regex")
});

/// Returns the bracketed internal subset of a doctype, if it has one.
pub fn internal_subset(doctype: &str) -> Option<&str> {
    let start = doctype.find('[')?;
    let end = doctype.rfind(']')?;
    (end > start).then(|| &doctype[start + 1..end])
}

/// Names of general and parameter entities declared in the internal subset.
///
/// Declarations inside comments are ignored.
pub fn entity_declarations(doctype: &str) -> Vec<String> {
    let Some(subset) = internal_subset(doctype) else {
        return Vec::new();
    };
    let subset = strip_comments(subset);
    ENTITY_DECL_RE
        .captures_iter(&subset)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replacement text of internal general entities, keyed by name.
///
/// External and parameter entities are not included. Replacement text is
/// returned as declared, without expanding nested references.
pub fn internal_entities(doctype: &str) -> HashMap<String, String> {
    let Some(subset) = internal_subset(doctype) else {
        return HashMap::new();
    };
    let subset = strip_comments(subset);
    let mut entities = HashMap::new();
    for caps in INTERNAL_ENTITY_RE.captures_iter(&subset) {
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        // The first declaration of an entity is binding.
        entities
            .entry(caps[1].to_string())
            .or_insert_with(|| value.to_string());
    }
    entities
}

fn strip_comments(subset: &str) -> String {
    let mut out = String::with_capacity(subset.len());
    let mut rest = subset;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 4..].find("-->") {
            Some(end) => &rest[start + 4 + end + 3..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}
