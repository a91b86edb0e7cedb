//! Template engine abstraction.
//!
//! A [`TemplateEngine`] turns one file's source into output. Everything the
//! file does beyond printing (writing blocks, declaring a parent, rendering
//! elements, caching fragments) goes through the [`ViewHost`] of the render
//! pass that asked for the evaluation.

use std::path::Path;

use strata_syntax::{CaptureMode, WriteMode};

use crate::cache::ElementOptions;
use crate::error::Result;
use crate::helpers::HelperRegistry;

/// Variables visible to a template.
pub type Vars = serde_json::Map<String, serde_json::Value>;

/// Producer handed to [`ViewHost::cache`].
pub type CacheProducer<'a> = dyn FnMut(&mut dyn ViewHost) -> Result<String> + 'a;

/// The render pass as seen from inside a template.
pub trait ViewHost {
    /// Content of block `name`, empty when it is not set.
    fn fetch(&self, name: &str) -> String;

    /// Whether block `name` has been defined.
    fn block_exists(&self, name: &str) -> bool;

    fn write_block(&mut self, name: &str, value: &str, mode: WriteMode) -> Result<()>;

    fn reset_block(&mut self, name: &str);

    /// Opens a capture. The engine collects output until [`end_block`].
    ///
    /// [`end_block`]: ViewHost::end_block
    fn start_block(&mut self, name: &str, mode: CaptureMode) -> Result<()>;

    /// Closes the innermost capture with the output produced since its start.
    fn end_block(&mut self, captured: String) -> Result<()>;

    /// Declares that the file being evaluated extends `name`.
    fn extend(&mut self, name: &str) -> Result<()>;

    /// Renders an element and returns its output.
    fn element(&mut self, name: &str, data: Vars, options: ElementOptions) -> Result<String>;

    /// Returns cached output for `key`, running `producer` on a miss.
    fn cache(
        &mut self,
        key: &str,
        config: Option<&str>,
        producer: &mut CacheProducer<'_>,
    ) -> Result<String>;

    fn helpers(&self) -> &HelperRegistry;
}

/// Evaluates template files.
///
/// Implementations must be shareable across threads: one engine serves
/// every render pass of a view.
pub trait TemplateEngine: Send + Sync {
    /// Evaluates `source` (read from `path`) with `scope` and returns its
    /// output.
    fn evaluate(
        &self,
        path: &Path,
        source: &str,
        scope: &Vars,
        host: &mut dyn ViewHost,
    ) -> Result<String>;

    /// Forgets anything cached for `path`.
    fn invalidate(&self, _path: &Path) {}
}
