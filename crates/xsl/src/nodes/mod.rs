//! Transformers for individual XSL elements and attributes.

pub mod expression_attribute;
pub mod value_template;

pub use expression_attribute::ExpressionAttribute;
pub use value_template::{AttributeValueTemplates, TemplatePart, ValueTemplate, quote_literal};
