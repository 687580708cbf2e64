// # minstack
//
// Integration layer over `minstack-core`:
// 1. Registering the built-in implementations enabled by features
// 2. The process-wide registry service, with explicit install and teardown
// 3. The public free-function API (`create`, `stack_init`)
//
// ## Features
//
// - `list` (default): implicit minimum chain, `"list"` / `"generic"`
// - `marker` (default): explicit marker stack, `"marker"`
//
// ## Configuration
//
// `install_from_env` reads the registry configuration from environment
// variables (see `RegistryConfig::from_env`):
//
// ```bash
// export MINSTACK_PLUGIN_DIR=/usr/local/lib/minstack
// export MINSTACK_DISCOVERY=scan
// ```
//
// ## Example
//
// ```rust,ignore
// minstack::install(&RegistryConfig::default())?;
//
// let stack = minstack::stack_init(1000)?;
// stack.push(42)?;
// assert_eq!(stack.min()?, 42);
// stack.destroy();
//
// minstack::teardown();
// ```

pub mod service;

pub use minstack_core::{
    BuiltinSource, DiscoveryStrategy, EMPTY_MARKER, Error, Implementation, Registry,
    RegistryConfig, Result, Stack, Value,
};
pub use service::{Service, create, global, install, install_from_env, stack_init, teardown};

/// Catalog of the implementations compiled in
pub fn builtin_source() -> BuiltinSource {
    #[allow(unused_mut)]
    let mut source = BuiltinSource::new();

    #[cfg(feature = "list")]
    {
        tracing::debug!("Registering list implementation");
        minstack_list::register(&mut source);
    }

    #[cfg(feature = "marker")]
    {
        tracing::debug!("Registering marker implementation");
        minstack_marker::register(&mut source);
    }

    source
}

/// Registry over the built-in implementations only
pub fn builtin_registry() -> Registry {
    Registry::new().with_source(builtin_source())
}
