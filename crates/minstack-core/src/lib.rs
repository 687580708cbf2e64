// # minstack-core
//
// Core library for the pluggable stack-with-minimum system.
//
// ## Architecture Overview
//
// This library provides everything a caller needs except the algorithms:
// - **Value**: The fixed unsigned value domain and its `EMPTY_MARKER` sentinel
// - **MinStackAlgorithm**: Trait every stack-with-minimum variant implements
// - **Descriptor**: Immutable metadata identifying one implementation
// - **Registry**: Thread-safe, refcounted name → implementation table
// - **ImplementationSource**: Discovery of implementations (built-in or loaded)
// - **Stack**: The per-instance handle that forwards to a bound implementation
//
// ## Design Principles
//
// 1. **Algorithms are plugins**: The core never names a concrete variant
// 2. **Narrow critical sections**: Artifact I/O never happens under the table lock
// 3. **Explicit lifecycle**: Registries are constructed and torn down explicitly
// 4. **Synchronous failures**: Every error is a returned `Result`

pub mod config;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod registry;
pub mod stack;
pub mod traits;
pub mod value;

// Re-export core types for convenience
pub use config::{DiscoveryStrategy, RegistryConfig};
pub use descriptor::{ABI_VERSION, Descriptor, DescriptorEntry, ENTRY_SYMBOL, STORAGE_SIZE_MAX};
pub use error::{Error, Result};
pub use loader::{BuiltinSource, DirectPathSource, DirectoryScanSource, ImplementationSource};
pub use registry::{Implementation, Registry};
pub use stack::Stack;
pub use traits::MinStackAlgorithm;
pub use value::{EMPTY_MARKER, Value};
