use crate::config::Config;
use crate::error::{Result, TomeError};
use crate::source::Source;
use crate::traits::Transport;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Registry of configured sources, keyed by their config name.
pub struct SourceRegistry {
    sources: BTreeMap<String, Source>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: BTreeMap::new(),
        }
    }

    /// Builds one [`Source`] per configured site, all sharing `transport`.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let mut registry = Self::new();

        for (key, source_config) in &config.sources {
            registry.register_source(key, Source::new(source_config.clone(), Arc::clone(&transport)));
        }

        info!("Registered {} sources", registry.sources.len());
        registry
    }

    pub fn register_source(&mut self, name: &str, source: Source) {
        self.sources.insert(name.to_string(), source);
    }

    pub fn get_source(&self, name: &str) -> Option<&Source> {
        self.sources.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Source> {
        self.get_source(name)
            .ok_or_else(|| TomeError::source_not_found(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Source)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
