//! Transpiles XSLT 2.0-style stylesheets into stylesheets a 1.0-level
//! processor can run.
//!
//! Rewriting happens once, ahead of execution: expressions in `test` and
//! `select` attributes and in attribute value templates are re-tokenized and
//! calls the target processor lacks are replaced with equivalent 1.0
//! expressions. Functions that have no such equivalent can be implemented in
//! Rust as native callbacks, reached through [`Transpiler::transform`] while
//! the host evaluator runs.
//!
//! ```ignore
//! let transpiler = Transpiler::builder().with_memory_cache().build();
//! let stylesheet = transpiler.transpile_file("report.xsl")?;
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod transpiler;

pub use builder::TranspilerBuilder;
pub use cache::{MemoryCache, TranspileCache};
pub use config::TranspilerConfig;
pub use context::TransformationContext;
pub use error::TranspileError;
pub use transpiler::Transpiler;

pub use downlevel_dom as dom;
pub use downlevel_xpath as xpath;
pub use downlevel_xsl as xsl;
