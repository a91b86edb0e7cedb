//! One render pass: the state behind a single `render` or `element` call.
//!
//! A pass owns its block stack, ancestor map and content stack, so
//! concurrent renders on a shared [`View`] never see each other's blocks.

use std::fs;
use std::path::{Path, PathBuf};

use strata_syntax::{CaptureMode, WriteMode};
use tracing::{debug, warn};

use crate::blocks::{BlockStack, Concat};
use crate::cache::{element_cache_key, with_cache, ElementOptions};
use crate::error::{Result, ViewError};
use crate::helpers::HelperRegistry;
use crate::inflect;
use crate::inheritance::AncestorMap;
use crate::paths::TemplateKind;
use crate::template::{CacheProducer, Vars, ViewHost};
use crate::view::View;

pub(crate) struct RenderPass<'v> {
    view: &'v View,
    blocks: BlockStack,
    ancestors: AncestorMap,
    content_stack: Vec<String>,
    current: Option<PathBuf>,
    kind: TemplateKind,
}

impl<'v> RenderPass<'v> {
    pub(crate) fn new(view: &'v View) -> Self {
        Self {
            view,
            blocks: BlockStack::new(),
            ancestors: AncestorMap::new(),
            content_stack: Vec::new(),
            current: None,
            kind: TemplateKind::Template,
        }
    }

    /// Renders a template and, when `layout` is set, wraps it in that layout.
    pub(crate) fn render(&mut self, template: Option<&str>, layout: Option<&str>) -> Result<String> {
        let view = self.view;
        let path = view.resolver.template_file(template)?;
        debug!(template = %path.display(), ?layout, "rendering");

        self.kind = TemplateKind::Template;
        view.hooks.run_before_render(&path)?;
        let output = self.render_file(&path, &view.vars)?;
        view.hooks.run_after_render(&path)?;
        self.blocks.set("content", output);

        match layout {
            Some(layout) => self.render_layout(None, layout),
            None => Ok(self.blocks.fetch("content").to_string()),
        }
    }

    /// Renders `layout` around `content`, or around the current `content`
    /// block when `content` is `None`.
    pub(crate) fn render_layout(&mut self, content: Option<&str>, layout: &str) -> Result<String> {
        let view = self.view;
        let path = view.resolver.layout_file(layout)?;

        if let Some(content) = content.filter(|c| !c.is_empty()) {
            self.blocks.set("content", content);
        }
        view.hooks.run_before_layout(&path)?;

        if self.blocks.fetch("title").is_empty() {
            let template_path = &view.resolver.config().template_path;
            let title = inflect::humanize(&template_path.trim_matches('/').replace('/', "_"));
            self.blocks.set("title", title);
        }

        self.kind = TemplateKind::Layout;
        let output = self.render_file(&path, &view.vars)?;
        self.blocks.set("content", output);
        view.hooks.run_after_layout(&path)?;

        Ok(self.blocks.fetch("content").to_string())
    }

    /// Renders an element, through the cache when `options` ask for it.
    pub(crate) fn render_element(
        &mut self,
        name: &str,
        data: Vars,
        options: ElementOptions,
    ) -> Result<String> {
        let view = self.view;
        let resolver = &view.resolver;

        let Some(path) = resolver.element_file(name, options.plugin)? else {
            if options.ignore_missing {
                warn!(element = name, "element is missing, rendering nothing");
                return Ok(String::new());
            }
            return Err(self.missing_element(name, options.plugin));
        };

        let config = resolver.config();
        let (plugin, bare) = resolver.plugin_split(name, true);
        let cache_key = element_cache_key(
            plugin.as_deref(),
            &bare,
            &data,
            &options,
            &config.element_cache,
            config.cache_key_policy,
        );

        match cache_key {
            Some(key) => with_cache(view.cache.as_ref(), &key.key, &key.config, || {
                self.render_element_file(&path, data, &options)
            }),
            None => self.render_element_file(&path, data, &options),
        }
    }

    fn render_element_file(
        &mut self,
        path: &Path,
        data: Vars,
        options: &ElementOptions,
    ) -> Result<String> {
        let view = self.view;
        let mut scope = view.vars.clone();
        scope.extend(data);

        let saved_kind = std::mem::replace(&mut self.kind, TemplateKind::Element);
        let result = self.render_with_callbacks(path, &scope, options.callbacks);
        self.kind = saved_kind;
        result
    }

    fn render_with_callbacks(&mut self, path: &Path, scope: &Vars, callbacks: bool) -> Result<String> {
        let view = self.view;
        let hooks = &view.hooks;
        if callbacks {
            hooks.run_before_render(path)?;
        }
        let output = self.render_file(path, scope)?;
        if callbacks {
            hooks.run_after_render(path)?;
        }
        Ok(output)
    }

    fn missing_element(&self, name: &str, plugin_check: bool) -> ViewError {
        let resolver = &self.view.resolver;
        let ext = &resolver.config().extension;
        let (plugin, bare) = resolver.plugin_split(name, plugin_check);

        let mut candidates = vec![format!("{name}{ext}")];
        let bare = format!("{bare}{ext}");
        if !candidates.contains(&bare) {
            candidates.push(bare);
        }

        ViewError::MissingElement {
            name: name.to_string(),
            candidates,
            paths: resolver.element_paths(plugin.as_deref()),
        }
    }

    /// Evaluates one file, then climbs to its parent if it declared one.
    fn render_file(&mut self, path: &Path, scope: &Vars) -> Result<String> {
        let view = self.view;
        let previous = self.current.replace(path.to_path_buf());
        let open_before = self.blocks.unclosed();

        view.hooks.run_before_render_file(path)?;
        let source = fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let output = view.engine.evaluate(path, &source, scope, self)?;
        let mut output = view.hooks.run_after_render_file(path, output)?;

        if self.blocks.unclosed() != open_before {
            return Err(ViewError::BlockLeftOpen {
                block: self.blocks.active().unwrap_or_default().to_string(),
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = self.ancestors.parent_of(path).map(Path::to_path_buf) {
            debug!(child = %path.display(), parent = %parent.display(), "rendering parent");
            self.content_stack
                .push(self.blocks.fetch("content").to_string());
            self.blocks.set("content", output);
            let parent_output = self.render_file(&parent, scope);
            let restored = self.content_stack.pop().unwrap_or_default();
            self.blocks.set("content", restored);
            output = parent_output?;
        }

        self.current = previous;
        Ok(output)
    }

    fn resolve_parent(&self, name: &str) -> Result<PathBuf> {
        let resolver = &self.view.resolver;
        let kind = if name.starts_with('/') {
            TemplateKind::Template
        } else {
            self.kind
        };

        match kind {
            TemplateKind::Template => resolver.template_file(Some(name)),
            TemplateKind::Layout => resolver.layout_file(name),
            TemplateKind::Element => resolver.element_file(name, true)?.ok_or_else(|| {
                let reference = resolver.template_ref(name, TemplateKind::Element, true);
                let file = format!("{}{}", reference.name, resolver.config().extension);
                ViewError::MissingParent {
                    name: file.clone(),
                    candidates: resolver
                        .element_paths(reference.plugin.as_deref())
                        .into_iter()
                        .map(|dir| dir.join(&file))
                        .collect(),
                }
            }),
        }
    }
}

impl ViewHost for RenderPass<'_> {
    fn fetch(&self, name: &str) -> String {
        self.blocks.fetch(name).to_string()
    }

    fn block_exists(&self, name: &str) -> bool {
        self.blocks.exists(name)
    }

    fn write_block(&mut self, name: &str, value: &str, mode: WriteMode) -> Result<()> {
        match mode {
            WriteMode::Set => self.blocks.set(name, value),
            WriteMode::Append => self.blocks.concat(name, value, Concat::Append),
            WriteMode::Prepend => self.blocks.concat(name, value, Concat::Prepend),
        }
        Ok(())
    }

    fn reset_block(&mut self, name: &str) {
        self.blocks.reset(name);
    }

    fn start_block(&mut self, name: &str, mode: CaptureMode) -> Result<()> {
        self.blocks.start(name, mode)
    }

    fn end_block(&mut self, captured: String) -> Result<()> {
        self.blocks.end(captured).map(drop)
    }

    fn extend(&mut self, name: &str) -> Result<()> {
        let current = self.current.clone().ok_or(ViewError::ExtendOutsideFile)?;
        let parent = self.resolve_parent(name)?;
        self.ancestors.declare_extends(&current, &parent)
    }

    fn element(&mut self, name: &str, data: Vars, options: ElementOptions) -> Result<String> {
        self.render_element(name, data, options)
    }

    fn cache(
        &mut self,
        key: &str,
        config: Option<&str>,
        producer: &mut CacheProducer<'_>,
    ) -> Result<String> {
        let view = self.view;
        let config = config.unwrap_or(&view.resolver.config().element_cache);
        with_cache(view.cache.as_ref(), key, config, || producer(self))
    }

    fn helpers(&self) -> &HelperRegistry {
        &self.view.helpers
    }
}
