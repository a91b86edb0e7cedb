//! Template path resolution.
//!
//! [`PathResolver`] turns a logical name such as `view_all`, `Blog.sidebar`
//! or `/common/footer` into a file on disk. Resolution happens in two steps:
//!
//! 1. **Search paths**: an ordered list of directories for a plugin
//!    qualifier. Theme directories come first, then plugin directories, then
//!    application roots, then core roots.
//! 2. **File lookup**: the name is mapped to a relative file name and each
//!    search directory is probed in order. The first existing file wins.
//!
//! Search paths are cached per plugin qualifier. The cache is filled lazily
//! and can be shared across threads; call [`PathResolver::clear_cache`] (or
//! mutate the config through [`PathResolver::config_mut`]) to invalidate it.
//!
//! # Plugin qualifiers
//!
//! `Qualifier.name` is split on the first dot only when `Qualifier` is a
//! registered plugin. `report.v2` stays a literal name unless a plugin called
//! `report` exists.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::config::ViewConfig;
use crate::error::{Result, ViewError};
use crate::inflect;

/// Directory under a root holding per-plugin overrides.
pub const PLUGIN_TEMPLATE_FOLDER: &str = "plugin";

/// What a template file is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Template,
    Layout,
    Element,
}

impl TemplateKind {
    /// Directory below each search path holding files of this kind.
    pub fn dir(self) -> Option<&'static str> {
        match self {
            TemplateKind::Template => None,
            TemplateKind::Layout => Some("layout"),
            TemplateKind::Element => Some("element"),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateKind::Template => "template",
            TemplateKind::Layout => "layout",
            TemplateKind::Element => "element",
        })
    }
}

/// A plugin-split logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub name: String,
    pub plugin: Option<String>,
    pub kind: TemplateKind,
}

/// Resolves logical template names to files.
#[derive(Debug)]
pub struct PathResolver {
    config: ViewConfig,
    cache: DashMap<Option<String>, Arc<Vec<PathBuf>>>,
}

impl PathResolver {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            cache: DashMap::new(),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Mutable access to the config. Clears the search path cache.
    pub fn config_mut(&mut self) -> &mut ViewConfig {
        self.cache.clear();
        &mut self.config
    }

    /// Splits `Plugin.name` into its qualifier and name.
    ///
    /// With `fallback`, an unqualified name inherits the view's plugin.
    pub fn plugin_split(&self, name: &str, fallback: bool) -> (Option<String>, String) {
        if let Some((qualifier, rest)) = name.split_once('.') {
            if self.config.plugins.contains_key(qualifier) {
                return (Some(qualifier.to_string()), rest.to_string());
            }
        }
        let plugin = if fallback {
            self.config.plugin.clone()
        } else {
            None
        };
        (plugin, name.to_string())
    }

    /// Builds a [`TemplateRef`] for `name`.
    pub fn template_ref(&self, name: &str, kind: TemplateKind, fallback: bool) -> TemplateRef {
        let (plugin, name) = self.plugin_split(name, fallback);
        TemplateRef { name, plugin, kind }
    }

    /// Base search paths for a plugin qualifier, cached.
    pub fn paths(&self, plugin: Option<&str>) -> Arc<Vec<PathBuf>> {
        let key = plugin.map(str::to_string);
        if let Some(paths) = self.cache.get(&key) {
            return Arc::clone(&paths);
        }
        let paths = Arc::new(self.paths_uncached(plugin));
        debug!(?plugin, count = paths.len(), "cached template search paths");
        Arc::clone(self.cache.entry(key).or_insert(paths).value())
    }

    /// Base search paths computed without touching the cache.
    pub fn paths_uncached(&self, plugin: Option<&str>) -> Vec<PathBuf> {
        let config = &self.config;
        let mut paths = Vec::new();

        if let Some(theme_root) = config.theme.as_ref().and_then(|t| config.plugins.get(t)) {
            if let Some(plugin) = plugin {
                paths.push(theme_root.join(PLUGIN_TEMPLATE_FOLDER).join(plugin));
            }
            paths.push(theme_root.clone());
        }

        if let Some(plugin) = plugin {
            for root in &config.template_roots {
                paths.push(root.join(PLUGIN_TEMPLATE_FOLDER).join(plugin));
            }
            if let Some(own) = config.plugins.get(plugin) {
                paths.push(own.clone());
            }
        }

        paths.extend(config.template_roots.iter().cloned());
        paths.extend(config.core_roots.iter().cloned());
        paths
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of plugin qualifiers with cached search paths.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Sub directories for `base`, most specific routing prefix first.
    ///
    /// With prefix `Admin/Api` and base `element` this yields
    /// `Admin/Api/element`, `Admin/element`, `element`.
    pub fn sub_paths(&self, base: &str) -> Vec<String> {
        let mut paths = vec![base.to_string()];
        if let Some(prefix) = self.config.prefix.as_deref() {
            let mut accumulated = String::new();
            for part in prefix.split('/').filter(|p| !p.is_empty()) {
                accumulated.push_str(&inflect::camelize(part));
                accumulated.push('/');
                paths.insert(0, format!("{accumulated}{base}"));
            }
        }
        paths
    }

    pub fn layout_paths(&self, plugin: Option<&str>) -> Vec<PathBuf> {
        let base = match self.config.layout_path.trim_matches('/') {
            "" => "layout".to_string(),
            layout_path => format!("layout/{layout_path}"),
        };
        self.expand(plugin, &base)
    }

    pub fn element_paths(&self, plugin: Option<&str>) -> Vec<PathBuf> {
        self.expand(plugin, "element")
    }

    fn expand(&self, plugin: Option<&str>, base: &str) -> Vec<PathBuf> {
        let subs = self.sub_paths(base);
        self.paths(plugin)
            .iter()
            .flat_map(|root| subs.iter().map(move |sub| root.join(sub)))
            .collect()
    }

    /// Ordered candidate directories for a kind.
    pub fn resolve_paths(&self, kind: TemplateKind, plugin: Option<&str>) -> Vec<PathBuf> {
        match kind {
            TemplateKind::Template => self.paths(plugin).to_vec(),
            TemplateKind::Layout => self.layout_paths(plugin),
            TemplateKind::Element => self.element_paths(plugin),
        }
    }

    /// Resolves a reference to an existing file.
    pub fn resolve_file(&self, reference: &TemplateRef) -> Result<PathBuf> {
        let plugin = reference.plugin.as_deref();
        let ext = &self.config.extension;
        let file = match reference.kind {
            TemplateKind::Template => format!("{}{ext}", self.template_relative(&reference.name)),
            _ => format!("{}{ext}", reference.name),
        };
        let dirs = self.resolve_paths(reference.kind, plugin);

        if let Some(found) = find_in(&dirs, &file, &reference.name)? {
            debug!(kind = %reference.kind, name = %reference.name, path = %found.display(), "resolved");
            return Ok(found);
        }

        Err(match reference.kind {
            TemplateKind::Element => ViewError::MissingElement {
                name: reference.name.clone(),
                candidates: vec![file],
                paths: dirs,
            },
            kind => ViewError::MissingTemplate {
                kind,
                name: file,
                paths: dirs,
            },
        })
    }

    /// Resolves a template, falling back to the configured one for `None`.
    pub fn template_file(&self, name: Option<&str>) -> Result<PathBuf> {
        let name = name.or(self.config.template.as_deref()).unwrap_or("");
        if name.is_empty() {
            return Err(ViewError::EmptyTemplateName);
        }
        self.resolve_file(&self.template_ref(name, TemplateKind::Template, true))
    }

    pub fn layout_file(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(ViewError::EmptyLayout);
        }
        self.resolve_file(&self.template_ref(name, TemplateKind::Layout, true))
    }

    /// Looks up an element; `Ok(None)` when no search path holds it.
    pub fn element_file(&self, name: &str, plugin_check: bool) -> Result<Option<PathBuf>> {
        let reference = self.template_ref(name, TemplateKind::Element, plugin_check);
        let file = format!("{}{}", reference.name, self.config.extension);
        let dirs = self.element_paths(reference.plugin.as_deref());
        find_in(&dirs, &file, &reference.name)
    }

    /// Maps a template name to a path relative to a search root.
    fn template_relative(&self, name: &str) -> String {
        if let Some(rooted) = name.strip_prefix('/') {
            return rooted.trim_matches('/').to_string();
        }
        if !name.contains('/') && name.starts_with('.') {
            return name.to_string();
        }

        let template_path = self.config.template_path.trim_matches('/');
        let mut sub_dir = self.config.sub_dir.trim_matches('/');
        if !sub_dir.is_empty()
            && template_path != sub_dir
            && template_path.ends_with(&format!("/{sub_dir}"))
        {
            sub_dir = "";
        }

        let file = if name.contains('/') {
            name.to_string()
        } else {
            inflect::underscore(name)
        };

        [template_path, sub_dir, file.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn find_in(dirs: &[PathBuf], file: &str, raw: &str) -> Result<Option<PathBuf>> {
    for dir in dirs {
        let candidate = dir.join(file);
        if candidate.is_file() {
            return check_file_path(&candidate, dir, raw).map(Some);
        }
    }
    Ok(None)
}

/// Rejects files that escape `root` through `..` segments.
///
/// Names without `..` are returned unchanged; others are canonicalized.
pub fn check_file_path(file: &Path, root: &Path, raw: &str) -> Result<PathBuf> {
    if !raw.contains("..") {
        return Ok(file.to_path_buf());
    }

    let outside = || ViewError::OutsideTemplateRoot {
        name: raw.to_string(),
        path: file.to_path_buf(),
    };
    let absolute = file.canonicalize().map_err(|_| outside())?;
    let root = root.canonicalize().map_err(|_| outside())?;
    if absolute.starts_with(&root) {
        Ok(absolute)
    } else {
        Err(outside())
    }
}
