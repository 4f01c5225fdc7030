use std::collections::HashMap;

use super::mock::SyntheticSource;
use super::serial::SerialSource;
use super::{ByteSource, DeviceProfile, TransportConfig};
use crate::error::ConnectError;

type SourceFactory =
    Box<dyn Fn(&TransportConfig, &DeviceProfile) -> Box<dyn ByteSource> + Send + Sync>;

/// Registry of byte source kinds, keyed by interface name
pub struct SourceRegistry {
    sources: HashMap<String, SourceFactory>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Registry with the built-in "serial" and "simulate" interfaces
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_source("serial", |transport, _| {
            Box::new(SerialSource::from_transport(transport))
        });
        registry.register_source("simulate", |_, profile| {
            Box::new(SyntheticSource::new(profile))
        });
        registry
    }

    pub fn register_source<F>(&mut self, interface: &str, factory: F)
    where
        F: Fn(&TransportConfig, &DeviceProfile) -> Box<dyn ByteSource> + Send + Sync + 'static,
    {
        self.sources.insert(interface.to_string(), Box::new(factory));
    }

    pub fn create_source(
        &self,
        transport: &TransportConfig,
        profile: &DeviceProfile,
    ) -> Result<Box<dyn ByteSource>, ConnectError> {
        self.sources
            .get(&transport.interface)
            .ok_or_else(|| ConnectError::UnknownInterface(transport.interface.clone()))
            .map(|factory| factory(transport, profile))
    }

    pub fn list_sources(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
