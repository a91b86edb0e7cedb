//! The view façade.

use std::fmt;
use std::sync::Arc;

use minijinja::value::Object;
use serde::Serialize;
use strata_syntax::SyntaxConfig;

use crate::cache::{with_cache, CacheStore, ElementOptions, MemoryCacheStore};
use crate::config::ViewConfig;
use crate::error::Result;
use crate::helpers::HelperRegistry;
use crate::hooks::ViewHooks;
use crate::paths::{PathResolver, TemplateKind};
use crate::render::RenderPass;
use crate::template::{StrataEngine, TemplateEngine, Vars};

/// Which layout wraps a rendered template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayoutSelection {
    /// The configured layout.
    #[default]
    Default,
    /// A specific layout for this render.
    Named(String),
    /// No layout.
    Disabled,
}

impl From<&str> for LayoutSelection {
    fn from(name: &str) -> Self {
        LayoutSelection::Named(name.to_string())
    }
}

/// Renders templates, layouts and elements.
///
/// A view holds everything that is shared between renders: the resolved
/// configuration, the engine, the cache store, hooks, helpers and the bound
/// variables. Each call to [`render`](View::render) or
/// [`element`](View::element) runs in its own pass, so a view can be shared
/// across threads and rendered concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use strata_view::{LayoutSelection, View, ViewConfig};
///
/// let config = ViewConfig::new("templates").with_template_path("Posts");
/// let mut view = View::new(config)?;
/// view.set("title", "Hello")?;
///
/// let html = view.render(Some("index"), LayoutSelection::Default)?;
/// # Ok::<(), strata_view::ViewError>(())
/// ```
pub struct View {
    pub(crate) resolver: PathResolver,
    pub(crate) engine: Arc<dyn TemplateEngine>,
    pub(crate) cache: Arc<dyn CacheStore>,
    pub(crate) hooks: ViewHooks,
    pub(crate) helpers: HelperRegistry,
    pub(crate) vars: Vars,
}

impl View {
    /// Builds a view with the default engine, an in-memory cache store and
    /// the built-in helpers.
    pub fn new(config: ViewConfig) -> Result<Self> {
        config.validate()?;

        let engine = StrataEngine::with_syntax(SyntaxConfig {
            trim_blocks: config.trim_blocks,
        });
        let cache = MemoryCacheStore::with_configs(["default", config.element_cache.as_str()]);

        Ok(Self {
            resolver: PathResolver::new(config),
            engine: Arc::new(engine),
            cache: Arc::new(cache),
            hooks: ViewHooks::new(),
            helpers: HelperRegistry::with_defaults(),
            vars: Vars::new(),
        })
    }

    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = store;
        self
    }

    pub fn with_hooks(mut self, hooks: ViewHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Registers a helper, visible to templates under `name`.
    pub fn with_helper<T: Object + 'static>(mut self, name: impl Into<String>, helper: T) -> Self {
        self.helpers.register(name, helper);
        self
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Binds a variable for every template rendered by this view.
    pub fn set<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) -> Result<()> {
        self.vars.insert(name.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.vars.get(name)
    }

    /// Names of all bound variables, sorted.
    pub fn var_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn config(&self) -> &ViewConfig {
        self.resolver.config()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    pub fn hooks(&self) -> &ViewHooks {
        &self.hooks
    }

    pub fn set_template(&mut self, name: impl Into<String>) {
        self.resolver.config_mut().template = Some(name.into());
    }

    pub fn set_layout(&mut self, name: impl Into<String>) {
        self.resolver.config_mut().layout = name.into();
    }

    pub fn enable_auto_layout(&mut self, enabled: bool) {
        self.resolver.config_mut().auto_layout = enabled;
    }

    /// Sets the theme; an empty name clears it.
    pub fn set_theme(&mut self, theme: impl Into<String>) {
        let theme = theme.into();
        self.resolver.config_mut().theme = (!theme.is_empty()).then_some(theme);
    }

    /// Sets the plugin; an empty name clears it.
    pub fn set_plugin(&mut self, plugin: impl Into<String>) {
        let plugin = plugin.into();
        self.resolver.config_mut().plugin = (!plugin.is_empty()).then_some(plugin);
    }

    pub fn set_template_path(&mut self, path: impl Into<String>) {
        self.resolver.config_mut().template_path = path.into();
    }

    pub fn set_layout_path(&mut self, path: impl Into<String>) {
        self.resolver.config_mut().layout_path = path.into();
    }

    pub fn set_sub_dir(&mut self, sub_dir: impl Into<String>) {
        self.resolver.config_mut().sub_dir = sub_dir.into();
    }

    pub fn set_element_cache(&mut self, config: impl Into<String>) {
        self.resolver.config_mut().element_cache = config.into();
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Renders a template, wrapped in a layout unless auto-layout is off or
    /// `layout` is [`LayoutSelection::Disabled`].
    ///
    /// `None` renders the configured template.
    pub fn render(&self, template: Option<&str>, layout: LayoutSelection) -> Result<String> {
        let config = self.resolver.config();
        let layout = match layout {
            LayoutSelection::Disabled => None,
            _ if !config.auto_layout => None,
            LayoutSelection::Default => Some(config.layout.as_str()),
            LayoutSelection::Named(ref name) => Some(name.as_str()),
        };
        RenderPass::new(self).render(template, layout)
    }

    /// Renders a layout around `content`. `None` uses the configured layout.
    pub fn render_layout(&self, content: &str, layout: Option<&str>) -> Result<String> {
        let layout = layout.unwrap_or(&self.resolver.config().layout);
        RenderPass::new(self).render_layout(Some(content), layout)
    }

    /// Renders an element with `data` layered over the view variables.
    pub fn element(&self, name: &str, data: Vars, options: ElementOptions) -> Result<String> {
        RenderPass::new(self).render_element(name, data, options)
    }

    /// True when `name` resolves to an element file.
    pub fn element_exists(&self, name: &str) -> Result<bool> {
        Ok(self.resolver.element_file(name, true)?.is_some())
    }

    /// True when `name` resolves to a template, layout or element of `kind`.
    pub fn template_exists(&self, name: &str, kind: TemplateKind) -> bool {
        let reference = self.resolver.template_ref(name, kind, true);
        self.resolver.resolve_file(&reference).is_ok()
    }

    /// Caches the output of `producer` under `key`.
    ///
    /// `config` defaults to the element cache config.
    pub fn cache<F>(&self, key: &str, config: Option<&str>, producer: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        let config = config.unwrap_or(&self.resolver.config().element_cache);
        with_cache(self.cache.as_ref(), key, config, producer)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("config", self.resolver.config())
            .field("hooks", &self.hooks)
            .field("helpers", &self.helpers.names().collect::<Vec<_>>())
            .field("vars", &self.var_names())
            .finish()
    }
}
