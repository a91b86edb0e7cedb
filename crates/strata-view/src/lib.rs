//! # Strata View - Layouts, Blocks and Elements
//!
//! `strata-view` renders file-based templates the way a web framework's view
//! layer does: a template is rendered first, its output lands in the
//! `content` block, and a layout wraps it. Templates can write named blocks,
//! extend parent templates, and pull in reusable elements whose output may
//! be cached.
//!
//! ## Core Concepts
//!
//! - [`View`]: the façade. Holds configuration, variables, hooks and helpers
//! - [`ViewConfig`]: template roots, plugins, theme and naming conventions
//! - [`PathResolver`]: ordered search paths and file resolution
//! - [`BlockStack`]: named content buffers of one render
//! - [`AncestorMap`]: `extend` declarations with loop detection
//! - [`CacheStore`] / [`with_cache`]: fragment caching for elements
//! - [`TemplateEngine`]: the evaluation seam; [`StrataEngine`] is the default
//!
//! ## Quick Start
//!
//! ```rust
//! use std::fs;
//! use strata_view::{LayoutSelection, View, ViewConfig};
//!
//! let root = tempfile::tempdir().unwrap();
//! fs::create_dir_all(root.path().join("Posts")).unwrap();
//! fs::create_dir_all(root.path().join("layout")).unwrap();
//! fs::write(
//!     root.path().join("Posts/index.tpl"),
//!     "{% assign \"title\" \"All posts\" %}{% for p in posts %}<li>{{ p }}</li>{% endfor %}",
//! )
//! .unwrap();
//! fs::write(
//!     root.path().join("layout/default.tpl"),
//!     "<title>{% fetch \"title\" %}</title><ul>{% fetch \"content\" %}</ul>",
//! )
//! .unwrap();
//!
//! let config = ViewConfig::new(root.path()).with_template_path("Posts");
//! let mut view = View::new(config).unwrap();
//! view.set("posts", &["one", "two"]).unwrap();
//!
//! let html = view.render(Some("index"), LayoutSelection::Default).unwrap();
//! assert_eq!(html, "<title>All posts</title><ul><li>one</li><li>two</li></ul>");
//! ```
//!
//! ## Inheritance
//!
//! A template that calls `{% extend "base" %}` is rendered first; its output
//! becomes the `content` block of `base`, which is rendered next with the same
//! variables. Blocks written by the child stay visible to the parent:
//!
//! ```text
//! {# Posts/view.tpl #}
//! {% extend "/Common/page" %}
//! {% start "sidebar" %}<a href="/posts">Back</a>{% end %}
//! {{ post.body }}
//!
//! {# Common/page.tpl #}
//! <aside>{% fetch "sidebar" %}</aside><main>{% fetch "content" %}</main>
//! ```
//!
//! ## Elements
//!
//! Elements live in `element/` under each search path. They receive the view
//! variables plus the data passed to them, and can be cached:
//!
//! ```text
//! {% element "card" with {"title": post.title} options {"cache": true} %}
//! ```
//!
//! ## Hooks
//!
//! [`ViewHooks`] run listeners before and after templates, files and layouts.
//! An after-render-file listener can replace a file's output.

pub mod blocks;
pub mod cache;
pub mod config;
mod error;
pub mod helpers;
pub mod hooks;
pub mod inflect;
pub mod inheritance;
pub mod paths;
pub mod prelude;
mod render;
pub mod template;
mod view;

// Error type
pub use error::{ErrorCategory, Result, ViewError};

// Façade
pub use view::{LayoutSelection, View};

// Configuration
pub use config::{CacheKeyPolicy, ViewConfig};

// Resolution
pub use paths::{check_file_path, PathResolver, TemplateKind, TemplateRef, PLUGIN_TEMPLATE_FOLDER};

// Blocks and inheritance
pub use blocks::{BlockStack, Concat};
pub use inheritance::AncestorMap;

// Caching
pub use cache::{
    element_cache_key, with_cache, CacheOption, CacheSettings, CacheStore, ElementCacheKey,
    ElementOptions, MemoryCacheStore,
};

// Hooks
pub use hooks::{HookError, HookPhase, ViewHooks};

// Helpers
pub use helpers::{HelperRegistry, TextHelper};

// Template engine abstraction
pub use template::{register_filters, StrataEngine, TemplateEngine, Vars, ViewHost};

// Template language types surfaced through the engine seam
pub use strata_syntax::{CaptureMode, SyntaxConfig, WriteMode};
