//! Process-wide registry service
//!
//! One [`Service`] per process, installed explicitly before the first
//! `create` and torn down explicitly before exit. Nothing here runs at load
//! or unload time.

use minstack_core::{Error, Registry, RegistryConfig, Result, Stack};
use std::sync::OnceLock;
use tracing::info;

static SERVICE: OnceLock<Service> = OnceLock::new();

/// The installed registry plus the name used by [`stack_init`]
#[derive(Debug)]
pub struct Service {
    registry: Registry,
    default_implementation: String,
}

impl Service {
    /// Build a service over the built-in implementations and `config`
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let registry = Registry::from_config(config, crate::builtin_source())?;
        Ok(Self {
            registry,
            default_implementation: config.default_implementation.clone(),
        })
    }

    /// The underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Name resolved by [`stack_init`]
    pub fn default_implementation(&self) -> &str {
        &self.default_implementation
    }
}

/// Install the process-wide service
///
/// Fails with `Error::Config` if a service is already installed.
pub fn install(config: &RegistryConfig) -> Result<&'static Service> {
    let service = Service::new(config)?;
    SERVICE
        .set(service)
        .map_err(|_| Error::config("registry service is already installed"))?;

    info!("Registry service installed");
    global()
}

/// Install the process-wide service from `MINSTACK_*` environment variables
pub fn install_from_env() -> Result<&'static Service> {
    install(&RegistryConfig::from_env()?)
}

/// The installed service
pub fn global() -> Result<&'static Service> {
    SERVICE
        .get()
        .ok_or_else(|| Error::config("registry service is not installed"))
}

/// Create a stack bound to the implementation answering to `name`
pub fn create(name: &str, capacity_hint: usize) -> Result<Stack> {
    global()?.registry.create_stack(name, capacity_hint)
}

/// Create a stack bound to the default implementation
pub fn stack_init(capacity_hint: usize) -> Result<Stack> {
    let service = global()?;
    service
        .registry
        .create_stack(&service.default_implementation, capacity_hint)
}

/// Release every implementation held by the installed service
///
/// Later `create` calls fail with `Error::ShutDown`. Does nothing if no
/// service was installed.
pub fn teardown() {
    if let Some(service) = SERVICE.get() {
        info!("Tearing down registry service");
        service.registry.teardown();
    }
}
