//! Template evaluation.
//!
//! - [`TemplateEngine`]: evaluates one file against a scope and a host
//! - [`ViewHost`]: what a template can ask of the render pass
//! - [`StrataEngine`]: the default engine for `strata-syntax` templates
//! - [`register_filters`]: built-in filters (`nl`, `h`, `humanize`, ...)

mod engine;
mod filters;
mod interpreter;

pub use engine::{CacheProducer, TemplateEngine, Vars, ViewHost};
pub use filters::register_filters;
pub use interpreter::StrataEngine;
