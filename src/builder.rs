use crate::cache::{MemoryCache, TranspileCache};
use crate::config::TranspilerConfig;
use crate::context::TransformationContext;
use crate::transpiler::Transpiler;
use downlevel_xpath::{FunctionMap, ReplaceFunction};
use downlevel_xsl::callback::CallbackValue;
use downlevel_xsl::functions::{register_callbacks, register_grouping};
use downlevel_xsl::{CallbackRegistry, DocumentTransformer, XslError};
use std::sync::Arc;

/// A builder for creating a [`Transpiler`].
pub struct TranspilerBuilder {
    config: TranspilerConfig,
    cache: Option<Arc<dyn TranspileCache>>,
    callbacks: CallbackRegistry,
    functions: Vec<(String, Arc<dyn ReplaceFunction>)>,
    transformers: Vec<Arc<dyn DocumentTransformer>>,
}

impl Default for TranspilerBuilder {
    fn default() -> Self {
        Self {
            config: TranspilerConfig::default(),
            cache: None,
            callbacks: CallbackRegistry::with_builtins(),
            functions: Vec::new(),
            transformers: Vec::new(),
        }
    }
}

impl TranspilerBuilder {
    /// Creates a builder with default settings and the built-in callbacks.
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: TranspilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_disable_entities(mut self, disable: bool) -> Self {
        self.config.disable_entities = disable;
        self
    }

    pub fn with_target_version(mut self, version: impl Into<String>) -> Self {
        self.config.target_version = version.into();
        self
    }

    pub fn with_native_callbacks(mut self, enabled: bool) -> Self {
        self.config.native_callbacks = enabled;
        self
    }

    /// Memoizes `transpile_file` and file-backed `transpile_root` calls.
    pub fn with_cache(mut self, cache: Arc<dyn TranspileCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_memory_cache(self) -> Self {
        self.with_cache(Arc::new(MemoryCache::new()))
    }

    /// Registers a native callback, replacing a built-in of the same name.
    pub fn with_callback<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[CallbackValue]) -> Result<CallbackValue, XslError> + Send + Sync + 'static,
    {
        self.callbacks.register(name, function);
        self
    }

    /// Registers a replacement strategy. It is added after the built-in
    /// ones, so it overrides any of the same name.
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        function: Arc<dyn ReplaceFunction>,
    ) -> Self {
        self.functions.push((name.into(), function));
        self
    }

    /// Appends a document transformer that runs after the default ones.
    pub fn with_transformer(mut self, transformer: Arc<dyn DocumentTransformer>) -> Self {
        self.transformers.push(transformer);
        self
    }

    /// Consumes the builder and creates the [`Transpiler`].
    pub fn build(self) -> Transpiler {
        let mut functions = FunctionMap::new();
        let callbacks = if self.config.native_callbacks {
            register_callbacks(&mut functions, &self.callbacks);
            self.callbacks
        } else {
            CallbackRegistry::new()
        };
        register_grouping(&mut functions);
        for (name, function) in self.functions {
            functions.set(name, function);
        }

        log::info!(
            "Building transpiler (target version {}, {} functions, {} callbacks)",
            self.config.target_version,
            functions.len(),
            callbacks.len()
        );

        let mut context = TransformationContext::new(self.config, functions, callbacks);
        for transformer in self.transformers {
            context.push_transformer(transformer);
        }

        let transpiler = Transpiler::new(context);
        match self.cache {
            Some(cache) => transpiler.with_cache(cache),
            None => transpiler,
        }
    }
}
