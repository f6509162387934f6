use crate::builder::TranspilerBuilder;
use crate::cache::TranspileCache;
use crate::context::TransformationContext;
use crate::error::TranspileError;
use downlevel_dom::{Document, NodeId};
use downlevel_xsl::{CallbackScope, is_xsl_attribute, is_xsl_element};
use std::path::Path;
use std::sync::Arc;

/// Rewrites stylesheets for a 1.0-level processor.
///
/// A transpiler is immutable once built and can be shared between threads.
pub struct Transpiler {
    context: Arc<TransformationContext>,
    cache: Option<Arc<dyn TranspileCache>>,
}

impl Transpiler {
    pub fn new(context: TransformationContext) -> Self {
        Self {
            context: Arc::new(context),
            cache: None,
        }
    }

    pub fn builder() -> TranspilerBuilder {
        TranspilerBuilder::new()
    }

    pub fn with_cache(mut self, cache: Arc<dyn TranspileCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn context(&self) -> &TransformationContext {
        &self.context
    }

    /// Runs every document transformer over `document`, then normalizes the
    /// stylesheet version. A document without a root element is left alone.
    ///
    /// The rewrite is all or nothing: on error `document` is unchanged.
    pub fn transpile(&self, document: &mut Document) -> Result<(), TranspileError> {
        let Some(root) = document.document_element() else {
            log::debug!("Document has no root element, nothing to transpile");
            return Ok(());
        };

        let mut working = document.clone();
        for transformer in self.context.transformers() {
            transformer.transform(&mut working)?;
        }

        let target = &self.context.config().target_version;
        if let Some(attribute) = version_attribute(&working, root)
            && working.attribute(root, &attribute) != Some(target.as_str())
        {
            log::debug!("Setting {} to '{}'", attribute, target);
            working.set_attribute(root, &attribute, target.as_str());
        }
        *document = working;
        Ok(())
    }

    /// Checks, transpiles and serializes a parsed document.
    ///
    /// When a cache is configured and the document was loaded from a file,
    /// the output is memoized under the file's path.
    pub fn transpile_root(&self, document: &mut Document) -> Result<String, TranspileError> {
        log::info!(
            "Transpiling document{}",
            document
                .uri()
                .map(|uri| format!(" '{}'", uri))
                .unwrap_or_default()
        );

        let cache_key = match (&self.cache, document.uri()) {
            (Some(_), Some(uri)) if Path::new(uri).is_file() => Some(uri.to_string()),
            _ => None,
        };

        let mut compute = || -> Result<String, TranspileError> {
            self.check_entities(document)?;
            self.transpile(document)?;
            Ok(document.to_xml())
        };
        match (&self.cache, cache_key) {
            (Some(cache), Some(key)) => cache.get(&key, &mut compute),
            _ => compute(),
        }
    }

    /// Parses `source` and transpiles it. No caching applies.
    pub fn transpile_str(&self, source: &str) -> Result<String, TranspileError> {
        let mut document = Document::parse(source)?;
        self.transpile_root(&mut document)
    }

    /// Loads, checks, transpiles and serializes the stylesheet at `path`,
    /// memoized under the path when a cache is configured.
    pub fn transpile_file<P: AsRef<Path>>(&self, path: P) -> Result<String, TranspileError> {
        let path = path.as_ref();
        log::info!("Transpiling file '{}'", path.display());

        let mut compute = || -> Result<String, TranspileError> {
            let mut document = Document::from_file(path)?;
            self.check_entities(&document)?;
            self.transpile(&mut document)?;
            Ok(document.to_xml())
        };
        match &self.cache {
            Some(cache) => cache.get(&path.to_string_lossy(), &mut compute),
            None => compute(),
        }
    }

    /// Runs `f` with this transpiler's native callbacks active on the current
    /// thread, for an evaluator executing the transpiled stylesheet.
    ///
    /// The callbacks are deactivated when `f` returns, fails or panics.
    pub fn transform<R>(&self, f: impl FnOnce() -> R) -> R {
        let _scope = CallbackScope::activate(Arc::clone(self.context.callbacks()));
        f()
    }

    fn check_entities(&self, document: &Document) -> Result<(), TranspileError> {
        if !self.context.config().disable_entities {
            return Ok(());
        }
        let entities = document.declared_entities();
        if entities.is_empty() {
            return Ok(());
        }
        log::warn!("Rejecting document declaring entities: {}", entities.join(", "));
        Err(TranspileError::InvalidDocument(
            "Invalid document, contains entities".to_string(),
        ))
    }
}

impl std::fmt::Debug for Transpiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transpiler")
            .field("context", &self.context)
            .field("cache", &self.cache)
            .finish()
    }
}

/// The attribute holding the stylesheet version: `version` on an XSL root,
/// the XSL-namespaced `version` on a literal result element root.
fn version_attribute(document: &Document, root: NodeId) -> Option<String> {
    if is_xsl_element(document, root) {
        return Some("version".to_string());
    }
    document
        .attributes(root)
        .iter()
        .map(|attr| attr.name.as_str())
        .find(|name| name.ends_with(":version") && is_xsl_attribute(document, root, name))
        .map(str::to_string)
}
