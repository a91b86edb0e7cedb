//! View configuration.
//!
//! [`ViewConfig`] gathers everything the resolver and orchestrator need:
//! template roots, registered plugins, the active theme, naming conventions
//! and cache defaults. It can be built in code or loaded from YAML:
//!
//! ```yaml
//! template_roots: [templates]
//! plugins:
//!   Blog: plugins/blog/templates
//! theme: Blog
//! template_path: Posts
//! layout: default
//! element_cache: views
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewError};

/// Which parts of element data participate in derived cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyPolicy {
    /// Only the names of data and option entries. Two calls with the same
    /// names but different values share a cache entry.
    #[default]
    Names,
    /// Names plus a digest of the values.
    NamesAndValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Application template roots, highest priority first.
    pub template_roots: Vec<PathBuf>,
    /// Framework fallback roots searched last.
    pub core_roots: Vec<PathBuf>,
    /// Registered plugins and their template roots.
    pub plugins: BTreeMap<String, PathBuf>,
    /// Active theme. Must name a registered plugin.
    pub theme: Option<String>,
    /// Plugin the view belongs to, inherited by unqualified names.
    pub plugin: Option<String>,
    /// Template file extension, including the dot.
    pub extension: String,
    /// Directory (relative to a root) holding this view's templates.
    pub template_path: String,
    /// Sub directory appended to `template_path`, e.g. `json`.
    pub sub_dir: String,
    /// Routing prefix such as `Admin/Api`.
    pub prefix: Option<String>,
    /// Template rendered when `render` is called without a name.
    pub template: Option<String>,
    pub layout: String,
    /// Sub directory under `layout/` for layouts.
    pub layout_path: String,
    pub auto_layout: bool,
    /// Cache config used for element caching.
    pub element_cache: String,
    pub cache_key_policy: CacheKeyPolicy,
    /// Drop the newline following a statement tag.
    pub trim_blocks: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            template_roots: Vec::new(),
            core_roots: Vec::new(),
            plugins: BTreeMap::new(),
            theme: None,
            plugin: None,
            extension: ".tpl".to_string(),
            template_path: String::new(),
            sub_dir: String::new(),
            prefix: None,
            template: None,
            layout: "default".to_string(),
            layout_path: String::new(),
            auto_layout: true,
            element_cache: "default".to_string(),
            cache_key_policy: CacheKeyPolicy::Names,
            trim_blocks: true,
        }
    }
}

impl ViewConfig {
    /// Creates a config with a single application template root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            template_roots: vec![root.into()],
            ..Self::default()
        }
    }

    /// Parses a config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ViewConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config from a YAML file.
    ///
    /// Relative root and plugin paths are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    /// Makes every relative root absolute against `base`.
    pub fn rebase(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.template_roots.iter_mut().for_each(rebase);
        self.core_roots.iter_mut().for_each(rebase);
        self.plugins.values_mut().for_each(rebase);
    }

    /// Registers a plugin and its template root.
    pub fn with_plugin(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.plugins.insert(name.into(), root.into());
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_template_path(mut self, template_path: impl Into<String>) -> Self {
        self.template_path = template_path.into();
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_core_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.core_roots.push(root.into());
        self
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() {
            return Err(ViewError::InvalidConfig(
                "extension must not be empty".to_string(),
            ));
        }
        if let Some(theme) = &self.theme {
            if !self.plugins.contains_key(theme) {
                return Err(ViewError::InvalidConfig(format!(
                    "theme \"{theme}\" is not a registered plugin"
                )));
            }
        }
        if self.element_cache.is_empty() {
            return Err(ViewError::InvalidConfig(
                "element_cache must name a cache config".to_string(),
            ));
        }
        Ok(())
    }
}
