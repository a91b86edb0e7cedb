//! Named content blocks.
//!
//! A [`BlockStack`] holds the named buffers of one render pass. Blocks are
//! written directly (`set`, `concat`) or by capturing template output
//! between `start` and `end`. Captures nest as a strict stack.

use std::collections::HashMap;

use strata_syntax::CaptureMode;
use tracing::trace;

use crate::error::{Result, ViewError};

/// Where concatenated content goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concat {
    Append,
    Prepend,
}

#[derive(Debug, Clone)]
struct OpenCapture {
    name: String,
    mode: CaptureMode,
}

#[derive(Debug, Clone, Default)]
pub struct BlockStack {
    blocks: HashMap<String, String>,
    active: Vec<OpenCapture>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content of `name`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        trace!(block = name, "set");
        self.blocks.insert(name.to_string(), value.into());
    }

    /// Adds `value` before or after the existing content of `name`.
    pub fn concat(&mut self, name: &str, value: &str, mode: Concat) {
        trace!(block = name, ?mode, "concat");
        let entry = self.blocks.entry(name.to_string()).or_default();
        match mode {
            Concat::Append => entry.push_str(value),
            Concat::Prepend => entry.insert_str(0, value),
        }
    }

    /// Opens a capture for `name`.
    pub fn start(&mut self, name: &str, mode: CaptureMode) -> Result<()> {
        if self.active.iter().any(|open| open.name == name) {
            return Err(ViewError::BlockAlreadyOpen(name.to_string()));
        }
        trace!(block = name, ?mode, "start");
        self.active.push(OpenCapture {
            name: name.to_string(),
            mode,
        });
        Ok(())
    }

    /// Closes the innermost capture and commits `captured` to it.
    ///
    /// Returns the name of the block that was closed.
    pub fn end(&mut self, captured: String) -> Result<String> {
        let open = self.active.pop().ok_or(ViewError::EndWithoutStart)?;
        trace!(block = %open.name, mode = ?open.mode, "end");
        match open.mode {
            CaptureMode::Append => self.concat(&open.name, &captured, Concat::Append),
            CaptureMode::Prepend => self.concat(&open.name, &captured, Concat::Prepend),
            CaptureMode::Override => self.set(&open.name, captured),
        }
        Ok(open.name)
    }

    /// Content of `name`, or `default` when the block was never written.
    pub fn get(&self, name: &str, default: &str) -> String {
        self.blocks
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Borrowed content of `name`, empty when unset.
    pub fn fetch(&self, name: &str) -> &str {
        self.blocks.get(name).map(String::as_str).unwrap_or("")
    }

    /// True once the block was written, even with empty content.
    pub fn exists(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Number of open captures.
    pub fn unclosed(&self) -> usize {
        self.active.len()
    }

    /// Name of the innermost open capture.
    pub fn active(&self) -> Option<&str> {
        self.active.last().map(|open| open.name.as_str())
    }

    /// Names of all written blocks, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.blocks.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Clears the content of `name`.
    pub fn reset(&mut self, name: &str) {
        self.set(name, "");
    }
}
