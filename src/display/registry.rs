//! Named plugin registry with a single active entry

use crate::{ChartError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A registry of named plugins, exactly one of which is active once enabled
#[derive(Debug, Clone)]
pub struct PluginRegistry<T> {
    group: String,
    plugins: BTreeMap<String, T>,
    active: Option<String>,
    options: Map<String, Value>,
}

impl<T: Clone> PluginRegistry<T> {
    /// Create an empty registry labelled with `group`
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            plugins: BTreeMap::new(),
            active: None,
            options: Map::new(),
        }
    }

    /// Label of this registry (e.g. `vlchart.vegalite.v2.renderer`)
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Add a plugin, replacing and returning any plugin of the same name
    pub fn register(&mut self, name: impl Into<String>, plugin: T) -> Option<T> {
        let name = name.into();
        tracing::debug!("Registering '{}' in {}", name, self.group);
        self.plugins.insert(name, plugin)
    }

    /// Remove a plugin. The active plugin cannot be removed.
    pub fn unregister(&mut self, name: &str) -> Result<Option<T>> {
        if self.active.as_deref() == Some(name) {
            return Err(ChartError::RendererError(format!(
                "Cannot unregister '{}' while it is enabled in {}",
                name, self.group
            )));
        }
        Ok(self.plugins.remove(name))
    }

    /// Make `name` the active plugin
    pub fn enable(&mut self, name: &str) -> Result<()> {
        self.enable_with_options(name, Map::new())
    }

    /// Make `name` the active plugin, passing `options` to every invocation
    pub fn enable_with_options(&mut self, name: &str, options: Map<String, Value>) -> Result<()> {
        if !self.plugins.contains_key(name) {
            return Err(ChartError::RendererError(format!(
                "No '{}' entry found in {}. Registered: {}",
                name,
                self.group,
                self.names().join(", ")
            )));
        }
        tracing::info!("Enabled '{}' in {}", name, self.group);
        self.active = Some(name.to_string());
        self.options = options;
        Ok(())
    }

    /// The active plugin, if one has been enabled
    pub fn active(&self) -> Option<&T> {
        self.active.as_ref().and_then(|name| self.plugins.get(name))
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Options passed when the active plugin was enabled
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.plugins.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_enable() {
        let mut reg: PluginRegistry<u8> = PluginRegistry::new("test.group");
        assert!(reg.active().is_none());
        reg.register("a", 1);
        reg.register("b", 2);
        reg.enable("b").unwrap();
        assert_eq!(reg.active(), Some(&2));
        assert_eq!(reg.active_name(), Some("b"));
        assert_eq!(reg.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_register_replaces() {
        let mut reg: PluginRegistry<u8> = PluginRegistry::new("test.group");
        assert_eq!(reg.register("a", 1), None);
        reg.enable("a").unwrap();
        assert_eq!(reg.register("a", 5), Some(1));
        assert_eq!(reg.active(), Some(&5));
    }

    #[test]
    fn test_enable_unknown_fails() {
        let mut reg: PluginRegistry<u8> = PluginRegistry::new("test.group");
        reg.register("a", 1);
        reg.enable("a").unwrap();
        let err = reg.enable("missing").unwrap_err();
        assert!(matches!(err, ChartError::RendererError(_)));
        assert!(err.to_string().contains("'missing'"));
        assert_eq!(reg.active_name(), Some("a"));
    }

    #[test]
    fn test_unregister() {
        let mut reg: PluginRegistry<u8> = PluginRegistry::new("test.group");
        reg.register("a", 1);
        reg.register("b", 2);
        reg.enable("a").unwrap();
        assert!(reg.unregister("a").is_err());
        assert_eq!(reg.unregister("b").unwrap(), Some(2));
        assert_eq!(reg.unregister("b").unwrap(), None);
    }

    #[test]
    fn test_enable_with_options() {
        let mut reg: PluginRegistry<u8> = PluginRegistry::new("test.group");
        reg.register("a", 1);
        let mut options = Map::new();
        options.insert("theme".to_string(), json!("dark"));
        reg.enable_with_options("a", options).unwrap();
        assert_eq!(reg.options()["theme"], json!("dark"));
        reg.enable("a").unwrap();
        assert!(reg.options().is_empty());
    }
}
