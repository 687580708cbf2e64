//! Process-wide implementation registry
//!
//! The registry maps implementation names (and aliases) to refcounted
//! [`Implementation`]s, discovering unknown names through its
//! [`ImplementationSource`]s on first use.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use minstack_core::{BuiltinSource, Registry};
//!
//! // Construct explicitly
//! let registry = Registry::new().with_source(BuiltinSource::new().with(&LIST));
//!
//! // Resolve and bind a stack
//! let stack = registry.create_stack("generic", 1000)?;
//!
//! // Tear down explicitly (also done on drop)
//! registry.teardown();
//! ```
//!
//! ## Resolution protocol
//!
//! 1. Look the name up under the table lock; a hit takes a reference.
//! 2. On a miss, ask each source in order, with the lock released.
//! 3. Re-take the lock and look again, by the requested name and by the
//!    candidate's canonical name. If another thread registered first, its
//!    entry wins and the fresh candidate is discarded.
//! 4. Discarded candidates are dropped only after the lock is released, so
//!    artifact teardown code never runs under it.
//! 5. If discovery fails, look once more: a concurrent resolution may have
//!    registered the name while this one was searching.

mod implementation;

pub use implementation::Implementation;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::config::{DiscoveryStrategy, RegistryConfig};
use crate::error::{Error, Result};
use crate::loader::{BuiltinSource, DirectPathSource, DirectoryScanSource, ImplementationSource};
use crate::stack::Stack;

/// Registry of resolved implementations
///
/// ## Thread Safety
///
/// One mutex guards the table. It is held only for lookups and insertions,
/// never across discovery or while an implementation is being retired.
/// Reference counts are the atomic counts of `Arc`; the table keeps every
/// entry alive until teardown, so a lookup never revives a retired entry.
#[derive(Default)]
pub struct Registry {
    table: Mutex<Table>,
    sources: Vec<Box<dyn ImplementationSource>>,
}

#[derive(Default)]
struct Table {
    entries: Vec<Arc<Implementation>>,
    torn_down: bool,
}

impl Table {
    fn find(&self, name: &str) -> Option<&Arc<Implementation>> {
        self.entries.iter().find(|entry| entry.matches(name))
    }
}

impl Registry {
    /// Create a new registry with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a discovery source (builder style)
    pub fn with_source(mut self, source: impl ImplementationSource + 'static) -> Self {
        self.add_source(Box::new(source));
        self
    }

    /// Append a discovery source
    ///
    /// Sources are consulted in the order they were added.
    pub fn add_source(&mut self, source: Box<dyn ImplementationSource>) {
        self.sources.push(source);
    }

    /// Build a registry from configuration
    ///
    /// `builtins` is always consulted first; artifact sources follow when
    /// the configuration enables them.
    pub fn from_config(config: &RegistryConfig, builtins: BuiltinSource) -> Result<Self> {
        config.validate()?;

        let mut registry = Self::new().with_source(builtins);

        if let Some(dir) = config.plugin_dir.as_ref().filter(|_| config.loads_artifacts()) {
            let suffix = config.artifact_suffix.clone();
            match config.discovery {
                DiscoveryStrategy::DirectPath => {
                    registry.add_source(Box::new(DirectPathSource::new(dir, suffix)))
                }
                DiscoveryStrategy::Scan => {
                    registry.add_source(Box::new(DirectoryScanSource::new(dir, suffix)))
                }
                DiscoveryStrategy::BuiltinOnly => {}
            }
            info!(
                "Registry will discover artifacts in {} ({})",
                dir.display(),
                config.discovery
            );
        }

        Ok(registry)
    }

    /// Resolve a name to an implementation, discovering it if needed
    ///
    /// Discovery may map an artifact into the process, which runs that
    /// artifact's initialization code.
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<Implementation>)`: a new reference to the registered entry
    /// - `Err(Error::NotFound)`: no source knows the name
    /// - `Err(Error::LoadFailed)`: an artifact exists but could not be mapped
    /// - `Err(Error::InvalidImplementation)`: an artifact's descriptor is
    ///   missing, malformed or answers to another name
    /// - `Err(Error::ShutDown)`: the registry was torn down
    pub fn resolve(&self, name: &str) -> Result<Arc<Implementation>> {
        if let Some(found) = self.lookup(name)? {
            debug!("Resolved '{}' from the table", name);
            return Ok(found);
        }

        let candidate = match self.discover(name) {
            Ok(candidate) => candidate,
            // Another thread may have registered the name while this one was
            // searching; its own search can then miss the artifact.
            Err(e) => {
                return match self.lookup(name)? {
                    Some(found) => {
                        debug!("Resolved '{}' from the table after discovery failed", name);
                        Ok(found)
                    }
                    None => Err(e),
                };
            }
        };

        let mut loser = None;
        let winner = {
            let mut table = self.lock_table();
            if table.torn_down {
                loser = Some(candidate);
                Err(Error::ShutDown)
            } else if let Some(existing) = table
                .find(name)
                .or_else(|| table.find(candidate.name()))
                .cloned()
            {
                loser = Some(candidate);
                Ok(existing)
            } else {
                let entry = Arc::new(candidate);
                entry.mark_registered();
                table.entries.push(Arc::clone(&entry));
                debug!("Registered implementation '{}'", entry.name());
                Ok(entry)
            }
        };

        if let Some(loser) = loser {
            debug!(
                "Discarding duplicate candidate '{}' for '{}'",
                loser.name(),
                name
            );
            drop(loser);
        }

        winner
    }

    /// Resolve `name` and bind a new stack to it
    pub fn create_stack(&self, name: &str, capacity_hint: usize) -> Result<Stack> {
        Stack::create(self, name, capacity_hint)
    }

    /// Release every registered implementation
    ///
    /// Entries are taken out under the lock and dropped after it is
    /// released. Implementations still bound to live stacks are retired
    /// when the last of those stacks is destroyed. Later `resolve` calls
    /// fail with [`Error::ShutDown`].
    pub fn teardown(&self) {
        let retired = {
            let mut table = self.lock_table();
            table.torn_down = true;
            std::mem::take(&mut table.entries)
        };

        if !retired.is_empty() {
            info!("Tearing down registry: {} implementation(s)", retired.len());
        }

        for entry in retired {
            let bound = Arc::strong_count(&entry) - 1;
            if bound > 0 {
                warn!(
                    "Implementation '{}' still bound to {} stack(s), retiring after they are destroyed",
                    entry.name(),
                    bound
                );
            }
        }
    }

    /// `true` once [`teardown`](Self::teardown) has run
    pub fn is_torn_down(&self) -> bool {
        self.lock_table().torn_down
    }

    /// Number of registered implementations
    pub fn len(&self) -> usize {
        self.lock_table().entries.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.lock_table().entries.is_empty()
    }

    /// Canonical names of the registered implementations, in registration order
    pub fn registered_names(&self) -> Vec<String> {
        self.lock_table()
            .entries
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    /// Labels of the configured sources, in consultation order
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// References currently held to the entry answering to `name`
    ///
    /// Includes the table's own reference; `None` if nothing is registered
    /// under that name.
    pub fn reference_count(&self, name: &str) -> Option<usize> {
        self.lock_table().find(name).map(Arc::strong_count)
    }

    fn lookup(&self, name: &str) -> Result<Option<Arc<Implementation>>> {
        let table = self.lock_table();
        if table.torn_down {
            return Err(Error::ShutDown);
        }
        Ok(table.find(name).cloned())
    }

    /// Ask each source in turn; runs without the table lock
    fn discover(&self, name: &str) -> Result<Implementation> {
        let mut first_error = None;

        for source in &self.sources {
            let outcome = source
                .locate(name)
                .and_then(|found| found.map(|c| verify(c, name, source.name())).transpose());

            match outcome {
                Ok(Some(candidate)) => return Ok(candidate),
                Ok(None) => {}
                Err(e) => {
                    warn!("Source '{}' failed to provide '{}': {}", source.name(), name, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                debug!("No source provides '{}'", name);
                Err(Error::not_found(name))
            }
        }
    }

    fn lock_table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("sources", &self.source_names())
            .field("registered", &self.registered_names())
            .finish()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Check a source's candidate before it can reach the table
fn verify(candidate: Implementation, name: &str, origin: &str) -> Result<Implementation> {
    candidate.descriptor().validate(origin)?;
    if !candidate.matches(name) {
        return Err(Error::invalid(
            origin,
            format!(
                "candidate '{}' does not answer to '{}'",
                candidate.name(),
                name
            ),
        ));
    }
    Ok(candidate)
}
