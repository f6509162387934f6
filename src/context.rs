use crate::config::TranspilerConfig;
use downlevel_xpath::{Compiler, FunctionMap};
use downlevel_xsl::{
    CallbackNamespace, CallbackRegistry, DocumentTransformer, XslTransformations,
};
use std::sync::Arc;

/// Everything a transpilation session shares: configuration, the function
/// map the compiler consults, the native callbacks, and the ordered list of
/// document transformers.
pub struct TransformationContext {
    config: TranspilerConfig,
    compiler: Compiler,
    callbacks: Arc<CallbackRegistry>,
    transformers: Vec<Arc<dyn DocumentTransformer>>,
}

impl TransformationContext {
    /// Builds the default transformer list: XSL expressions and value
    /// templates, then the callback namespace declaration when native
    /// callbacks are enabled.
    pub fn new(
        config: TranspilerConfig,
        functions: FunctionMap,
        callbacks: CallbackRegistry,
    ) -> Self {
        let compiler = Compiler::new(Arc::new(functions));
        let mut transformers: Vec<Arc<dyn DocumentTransformer>> =
            vec![Arc::new(XslTransformations::standard(&compiler))];
        if config.native_callbacks {
            transformers.push(Arc::new(CallbackNamespace));
        }
        Self {
            config,
            compiler,
            callbacks: Arc::new(callbacks),
            transformers,
        }
    }

    /// Appends a transformer that runs after the default ones.
    pub fn push_transformer(&mut self, transformer: Arc<dyn DocumentTransformer>) {
        self.transformers.push(transformer);
    }

    pub fn config(&self) -> &TranspilerConfig {
        &self.config
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn functions(&self) -> &FunctionMap {
        self.compiler.functions()
    }

    pub fn callbacks(&self) -> &Arc<CallbackRegistry> {
        &self.callbacks
    }

    pub fn transformers(&self) -> &[Arc<dyn DocumentTransformer>] {
        &self.transformers
    }
}

impl std::fmt::Debug for TransformationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationContext")
            .field("config", &self.config)
            .field("functions", self.functions())
            .field("callbacks", &self.callbacks)
            .field("transformers", &self.transformers.len())
            .finish()
    }
}
