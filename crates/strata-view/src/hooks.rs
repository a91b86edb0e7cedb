//! Listeners around the render pipeline.
//!
//! Hooks run custom code at fixed points while a view renders:
//!
//! ```text
//! render(template)
//!   → BEFORE RENDER
//!   → BEFORE RENDER FILE → evaluate → AFTER RENDER FILE (may replace output)
//!   → AFTER RENDER
//!   → BEFORE LAYOUT
//!   → BEFORE RENDER FILE → evaluate layout → AFTER RENDER FILE
//!   → AFTER LAYOUT
//! ```
//!
//! Listeners of one phase run in registration order. Returning an error
//! aborts the render; the error surfaces as [`ViewError::Hook`].
//!
//! [`ViewError::Hook`]: crate::ViewError::Hook

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

/// The phase a hook error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    BeforeRender,
    AfterRender,
    BeforeRenderFile,
    AfterRenderFile,
    BeforeLayout,
    AfterLayout,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HookPhase::BeforeRender => "before-render",
            HookPhase::AfterRender => "after-render",
            HookPhase::BeforeRenderFile => "before-render-file",
            HookPhase::AfterRenderFile => "after-render-file",
            HookPhase::BeforeLayout => "before-layout",
            HookPhase::AfterLayout => "after-layout",
        })
    }
}

/// Error returned by a hook listener.
#[derive(Debug, Error)]
#[error("hook error ({phase}): {message}")]
pub struct HookError {
    pub message: String,
    pub phase: HookPhase,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    pub fn new(phase: HookPhase, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

/// Listener receiving the file being rendered.
pub type FileHookFn = Arc<dyn Fn(&Path) -> Result<(), HookError> + Send + Sync>;

/// Listener that may replace the output of a rendered file.
pub type AfterRenderFileFn =
    Arc<dyn Fn(&Path, &str) -> Result<Option<String>, HookError> + Send + Sync>;

/// Registered listeners, shared by every render of a view.
#[derive(Clone, Default)]
pub struct ViewHooks {
    before_render: Vec<FileHookFn>,
    after_render: Vec<FileHookFn>,
    before_render_file: Vec<FileHookFn>,
    after_render_file: Vec<AfterRenderFileFn>,
    before_layout: Vec<FileHookFn>,
    after_layout: Vec<FileHookFn>,
}

impl ViewHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.before_render.is_empty()
            && self.after_render.is_empty()
            && self.before_render_file.is_empty()
            && self.after_render_file.is_empty()
            && self.before_layout.is_empty()
            && self.after_layout.is_empty()
    }

    pub fn before_render<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before_render.push(Arc::new(f));
        self
    }

    pub fn after_render<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.after_render.push(Arc::new(f));
        self
    }

    pub fn before_render_file<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before_render_file.push(Arc::new(f));
        self
    }

    /// Adds a listener that sees each file's output.
    ///
    /// Returning `Some(content)` replaces the output; later listeners see the
    /// replacement.
    ///
    /// # Example
    ///
    /// ```rust
    /// use strata_view::ViewHooks;
    ///
    /// let hooks = ViewHooks::new().after_render_file(|_path, content| {
    ///     Ok(Some(content.trim_end().to_string()))
    /// });
    /// assert!(!hooks.is_empty());
    /// ```
    pub fn after_render_file<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path, &str) -> Result<Option<String>, HookError> + Send + Sync + 'static,
    {
        self.after_render_file.push(Arc::new(f));
        self
    }

    pub fn before_layout<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before_layout.push(Arc::new(f));
        self
    }

    pub fn after_layout<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.after_layout.push(Arc::new(f));
        self
    }

    pub fn run_before_render(&self, path: &Path) -> Result<(), HookError> {
        run_all(&self.before_render, path)
    }

    pub fn run_after_render(&self, path: &Path) -> Result<(), HookError> {
        run_all(&self.after_render, path)
    }

    pub fn run_before_render_file(&self, path: &Path) -> Result<(), HookError> {
        run_all(&self.before_render_file, path)
    }

    /// Runs all after-render-file listeners, chaining replacements.
    pub fn run_after_render_file(&self, path: &Path, content: String) -> Result<String, HookError> {
        let mut current = content;
        for hook in &self.after_render_file {
            if let Some(replacement) = hook(path, &current)? {
                current = replacement;
            }
        }
        Ok(current)
    }

    pub fn run_before_layout(&self, path: &Path) -> Result<(), HookError> {
        run_all(&self.before_layout, path)
    }

    pub fn run_after_layout(&self, path: &Path) -> Result<(), HookError> {
        run_all(&self.after_layout, path)
    }
}

fn run_all(hooks: &[FileHookFn], path: &Path) -> Result<(), HookError> {
    for hook in hooks {
        hook(path)?;
    }
    Ok(())
}

impl fmt::Debug for ViewHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHooks")
            .field("before_render_count", &self.before_render.len())
            .field("after_render_count", &self.after_render.len())
            .field("before_render_file_count", &self.before_render_file.len())
            .field("after_render_file_count", &self.after_render_file.len())
            .field("before_layout_count", &self.before_layout.len())
            .field("after_layout_count", &self.after_layout.len())
            .finish()
    }
}
