//! Fragment caching.
//!
//! The cache gate reads a store before producing a fragment and writes the
//! fragment back on a miss. Element calls derive their cache key from the
//! element name, plugin, option names and data names.

use std::collections::BTreeMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::CacheKeyPolicy;
use crate::error::{Result, ViewError};
use crate::inflect;
use crate::template::Vars;

/// Backend storing rendered fragments under named configs.
pub trait CacheStore: Send + Sync {
    /// Reads a fragment. Unknown configs are errors, absent keys are `None`.
    fn read(&self, key: &str, config: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str, config: &str) -> Result<()>;
}

/// In-memory [`CacheStore`] with one map per named config.
#[derive(Debug)]
pub struct MemoryCacheStore {
    configs: DashMap<String, DashMap<String, String>>,
}

impl MemoryCacheStore {
    /// Creates a store with a `default` config.
    pub fn new() -> Self {
        Self::with_configs(["default"])
    }

    pub fn with_configs<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let configs = DashMap::new();
        for name in names {
            configs.insert(name.into(), DashMap::new());
        }
        Self { configs }
    }

    pub fn add_config(&self, name: impl Into<String>) {
        self.configs.entry(name.into()).or_default();
    }

    /// Number of entries under `config`, zero for unknown configs.
    pub fn len(&self, config: &str) -> usize {
        self.configs.get(config).map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, config: &str) -> bool {
        self.len(config) == 0
    }

    pub fn clear(&self, config: &str) {
        if let Some(entries) = self.configs.get(config) {
            entries.clear();
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, key: &str, config: &str) -> Result<Option<String>> {
        let entries = self
            .configs
            .get(config)
            .ok_or_else(|| ViewError::UnknownCacheConfig(config.to_string()))?;
        Ok(entries.get(key).map(|v| v.value().clone()))
    }

    fn write(&self, key: &str, value: &str, config: &str) -> Result<()> {
        let entries = self
            .configs
            .get(config)
            .ok_or_else(|| ViewError::UnknownCacheConfig(config.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Returns the cached fragment for `key`, producing and storing it on a miss.
///
/// An empty cached string counts as a miss. Nothing is written when the
/// producer fails.
pub fn with_cache<F>(store: &dyn CacheStore, key: &str, config: &str, producer: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    if key.is_empty() {
        return Err(ViewError::EmptyCacheKey);
    }

    if let Some(hit) = store.read(key, config)?.filter(|v| !v.is_empty()) {
        debug!(key, config, "cache hit");
        return Ok(hit);
    }

    debug!(key, config, "cache miss");
    let output = producer()?;
    store.write(key, &output, config)?;
    Ok(output)
}

/// `cache` option of an element call: `true` or explicit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheOption {
    Enabled(bool),
    Settings(CacheSettings),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub key: Option<String>,
    pub config: Option<String>,
}

/// Options accepted by element rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementOptions {
    pub cache: Option<CacheOption>,
    /// Fire the before/after render hooks around the element.
    pub callbacks: bool,
    /// Render nothing instead of failing when the element is missing.
    pub ignore_missing: bool,
    /// Let unqualified names fall back to the view's plugin.
    pub plugin: bool,
    /// Additional options. Their names participate in derived cache keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for ElementOptions {
    fn default() -> Self {
        Self {
            cache: None,
            callbacks: false,
            ignore_missing: false,
            plugin: true,
            extra: BTreeMap::new(),
        }
    }
}

impl ElementOptions {
    pub fn cached() -> Self {
        Self {
            cache: Some(CacheOption::Enabled(true)),
            ..Self::default()
        }
    }

    pub fn ignore_missing(mut self) -> Self {
        self.ignore_missing = true;
        self
    }

    pub fn with_callbacks(mut self) -> Self {
        self.callbacks = true;
        self
    }

    pub fn with_cache(mut self, cache: CacheOption) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Parses options from a JSON value such as `{"cache": true}`.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| ViewError::InvalidOptions(e.to_string()))
    }

    fn is_cached(&self) -> bool {
        matches!(
            self.cache,
            Some(CacheOption::Enabled(true)) | Some(CacheOption::Settings(_))
        )
    }
}

/// Resolved key and config for a cached element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementCacheKey {
    pub key: String,
    pub config: String,
}

/// Derives the cache key for an element call, `None` when caching is off.
pub fn element_cache_key(
    plugin: Option<&str>,
    name: &str,
    data: &Vars,
    options: &ElementOptions,
    default_config: &str,
    policy: CacheKeyPolicy,
) -> Option<ElementCacheKey> {
    if !options.is_cached() {
        return None;
    }

    let settings = match &options.cache {
        Some(CacheOption::Settings(settings)) => settings.clone(),
        _ => CacheSettings::default(),
    };

    if let (Some(key), Some(config)) = (&settings.key, &settings.config) {
        return Some(ElementCacheKey {
            key: format!("element_{key}"),
            config: config.clone(),
        });
    }

    let key = settings.key.unwrap_or_else(|| {
        let plugin_key = plugin
            .map(|p| inflect::underscore(p).replace('/', "_"))
            .unwrap_or_default();
        let element_key = name.replace(['\\', '/'], "_");

        let mut data_keys: Vec<&String> = data.keys().collect();
        data_keys.sort();

        let mut option_keys: Vec<String> = options.extra.keys().cloned().collect();
        if options.ignore_missing {
            option_keys.push("ignore_missing".to_string());
            option_keys.sort();
        }

        let mut segments = vec![plugin_key, element_key];
        segments.extend(option_keys);
        segments.extend(data_keys.into_iter().cloned());
        if policy == CacheKeyPolicy::NamesAndValues {
            segments.push(value_digest(data, &options.extra));
        }
        segments.join("_")
    });

    Some(ElementCacheKey {
        key: format!("element_{key}"),
        config: settings
            .config
            .unwrap_or_else(|| default_config.to_string()),
    })
}

fn value_digest(data: &Vars, extra: &BTreeMap<String, serde_json::Value>) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in data.iter().chain(extra.iter()) {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.to_string().as_bytes());
        hasher.update([0u8]);
    }
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn vars(value: serde_json::Value) -> Vars {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    // =========================================================================
    // Cache gate
    // =========================================================================

    #[test]
    fn test_miss_then_hit() {
        let store = MemoryCacheStore::new();
        let calls = Cell::new(0);
        let produce = || {
            calls.set(calls.get() + 1);
            Ok("fragment".to_string())
        };

        assert_eq!(with_cache(&store, "k", "default", produce).unwrap(), "fragment");
        assert_eq!(with_cache(&store, "k", "default", produce).unwrap(), "fragment");
        assert_eq!(calls.get(), 1);
        assert_eq!(store.len("default"), 1);
    }

    #[test]
    fn test_hit_never_invokes_producer() {
        let store = MemoryCacheStore::new();
        store.write("k", "cached", "default").unwrap();
        let out = with_cache(&store, "k", "default", || panic!("producer ran")).unwrap();
        assert_eq!(out, "cached");
    }

    #[test]
    fn test_empty_cached_value_is_a_miss() {
        let store = MemoryCacheStore::new();
        store.write("k", "", "default").unwrap();
        let out = with_cache(&store, "k", "default", || Ok("fresh".to_string())).unwrap();
        assert_eq!(out, "fresh");
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let store = MemoryCacheStore::new();
        let err = with_cache(&store, "", "default", || Ok(String::new())).unwrap_err();
        assert!(matches!(err, ViewError::EmptyCacheKey));
    }

    #[test]
    fn test_unknown_config_is_rejected() {
        let store = MemoryCacheStore::new();
        let err = with_cache(&store, "k", "long", || Ok(String::new())).unwrap_err();
        assert!(matches!(err, ViewError::UnknownCacheConfig(name) if name == "long"));
    }

    #[test]
    fn test_failed_producer_writes_nothing() {
        let store = MemoryCacheStore::new();
        let result = with_cache(&store, "k", "default", || Err(ViewError::EmptyLayout));
        assert!(result.is_err());
        assert!(store.is_empty("default"));
    }

    #[test]
    fn test_configs_are_isolated() {
        let store = MemoryCacheStore::with_configs(["a", "b"]);
        store.write("k", "in-a", "a").unwrap();
        assert_eq!(store.read("k", "b").unwrap(), None);
        store.clear("a");
        assert!(store.is_empty("a"));
    }

    // =========================================================================
    // Element options and keys
    // =========================================================================

    #[test]
    fn test_options_from_value() {
        let options = ElementOptions::from_value(json!({
            "cache": {"key": "nav", "config": "long"},
            "callbacks": true,
            "limit": 5
        }))
        .unwrap();
        assert!(options.callbacks);
        assert!(options.plugin);
        assert_eq!(
            options.cache,
            Some(CacheOption::Settings(CacheSettings {
                key: Some("nav".into()),
                config: Some("long".into())
            }))
        );
        assert_eq!(options.extra.get("limit"), Some(&json!(5)));
    }

    #[test]
    fn test_options_plugin_false() {
        let options = ElementOptions::from_value(json!({"plugin": false})).unwrap();
        assert!(!options.plugin);
    }

    #[test]
    fn test_options_invalid() {
        let err = ElementOptions::from_value(json!({"callbacks": "yes"})).unwrap_err();
        assert!(matches!(err, ViewError::InvalidOptions(_)));
    }

    #[test]
    fn test_no_cache_no_key() {
        let key = element_cache_key(
            None,
            "sidebar",
            &Vars::new(),
            &ElementOptions::default(),
            "default",
            CacheKeyPolicy::Names,
        );
        assert_eq!(key, None);
    }

    #[test]
    fn test_derived_key_without_plugin() {
        let key = element_cache_key(
            None,
            "sidebar",
            &Vars::new(),
            &ElementOptions::cached(),
            "default",
            CacheKeyPolicy::Names,
        )
        .unwrap();
        assert_eq!(key.key, "element__sidebar");
        assert_eq!(key.config, "default");
    }

    #[test]
    fn test_derived_key_with_plugin_options_and_data() {
        let mut options = ElementOptions::cached();
        options.extra.insert("limit".into(), json!(5));
        let data = vars(json!({"user": 1, "posts": []}));

        let key = element_cache_key(
            Some("BlogAdmin"),
            "nav/main",
            &data,
            &options,
            "views",
            CacheKeyPolicy::Names,
        )
        .unwrap();
        assert_eq!(key.key, "element_blog_admin_nav_main_limit_posts_user");
        assert_eq!(key.config, "views");
    }

    #[test]
    fn test_ignore_missing_joins_option_names() {
        let mut options = ElementOptions::cached().ignore_missing();
        options.extra.insert("limit".into(), json!(5));
        options.extra.insert("zone".into(), json!("top"));

        let key = element_cache_key(
            None,
            "nav",
            &Vars::new(),
            &options,
            "default",
            CacheKeyPolicy::Names,
        )
        .unwrap();
        assert_eq!(key.key, "element__nav_ignore_missing_limit_zone");
    }

    #[test]
    fn test_names_policy_ignores_values() {
        let a = vars(json!({"id": 1}));
        let b = vars(json!({"id": 2}));
        let options = ElementOptions::cached();
        let key = |data: &Vars, policy| {
            element_cache_key(None, "card", data, &options, "default", policy)
                .unwrap()
                .key
        };

        assert_eq!(key(&a, CacheKeyPolicy::Names), key(&b, CacheKeyPolicy::Names));
        assert_ne!(
            key(&a, CacheKeyPolicy::NamesAndValues),
            key(&b, CacheKeyPolicy::NamesAndValues)
        );
    }

    #[test]
    fn test_explicit_key_and_config() {
        let options = ElementOptions::default().with_cache(CacheOption::Settings(CacheSettings {
            key: Some("home_nav".into()),
            config: Some("long".into()),
        }));
        let key = element_cache_key(
            None,
            "nav",
            &vars(json!({"x": 1})),
            &options,
            "default",
            CacheKeyPolicy::Names,
        )
        .unwrap();
        assert_eq!(
            key,
            ElementCacheKey {
                key: "element_home_nav".into(),
                config: "long".into()
            }
        );
    }

    #[test]
    fn test_explicit_config_keeps_derived_key() {
        let options = ElementOptions::default().with_cache(CacheOption::Settings(CacheSettings {
            key: None,
            config: Some("long".into()),
        }));
        let key = element_cache_key(
            None,
            "nav",
            &Vars::new(),
            &options,
            "default",
            CacheKeyPolicy::Names,
        )
        .unwrap();
        assert_eq!(key.key, "element__nav");
        assert_eq!(key.config, "long");
    }
}
