//! The dispatch facade
//!
//! A [`Stack`] binds one resolved [`Implementation`] to one algorithm
//! instance and forwards every operation to it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::registry::{Implementation, Registry};
use crate::traits::MinStackAlgorithm;
use crate::value::{self, Value};

const WORD: usize = std::mem::size_of::<usize>();

/// A stack-with-minimum bound to one implementation
///
/// Operations on one `Stack` from several threads serialize on its own
/// lock; distinct stacks never contend.
///
/// # Example
///
/// ```rust,ignore
/// let stack = Stack::create(&registry, "generic", 16)?;
/// stack.push(5)?;
/// stack.push(3)?;
/// assert_eq!(stack.min()?, 3);
/// assert_eq!(stack.pop()?, 3);
/// stack.destroy();
/// ```
pub struct Stack {
    // Declared first so it is dropped first: the algorithm's code may live
    // in the artifact `implementation` keeps mapped.
    state: Mutex<Box<dyn MinStackAlgorithm>>,
    implementation: Arc<Implementation>,
    footprint: usize,
}

impl Stack {
    /// Resolve `name` in `registry` and create a bound stack
    ///
    /// The stack holds one reference to the implementation for its whole
    /// life. If the implementation's constructor fails, that reference is
    /// released before the error is returned.
    pub fn create(registry: &Registry, name: &str, capacity_hint: usize) -> Result<Self> {
        let implementation = registry.resolve(name)?;
        let footprint = footprint_for(implementation.descriptor().storage_size)?;

        let algorithm = match implementation.instantiate(capacity_hint) {
            Ok(algorithm) => algorithm,
            Err(e) => {
                error!(
                    "Failed to initialize '{}' (capacity hint {}): {}",
                    implementation.name(),
                    capacity_hint,
                    e
                );
                return Err(e);
            }
        };

        debug!(
            "Created stack bound to '{}' ({} bytes)",
            implementation.name(),
            footprint
        );

        Ok(Self {
            state: Mutex::new(algorithm),
            implementation,
            footprint,
        })
    }

    /// Push a value
    pub fn push(&self, value: Value) -> Result<()> {
        self.lock().push(value)
    }

    /// Remove and return the top value, or `Error::Empty`
    pub fn pop(&self) -> Result<Value> {
        self.lock().pop()
    }

    /// Smallest value present, or `Error::Empty`
    pub fn min(&self) -> Result<Value> {
        self.lock().min()
    }

    /// `pop`, reporting emptiness as [`EMPTY_MARKER`](crate::EMPTY_MARKER)
    pub fn pop_or_marker(&self) -> Value {
        value::or_marker(self.pop())
    }

    /// `min`, reporting emptiness as [`EMPTY_MARKER`](crate::EMPTY_MARKER)
    pub fn min_or_marker(&self) -> Value {
        value::or_marker(self.min())
    }

    /// Number of values present
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the stack holds no values
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Nodes the algorithm instance currently holds
    pub fn live_nodes(&self) -> usize {
        self.lock().live_nodes()
    }

    /// Canonical name of the bound implementation
    pub fn implementation_name(&self) -> &str {
        self.implementation.name()
    }

    /// The bound implementation
    pub fn implementation(&self) -> &Arc<Implementation> {
        &self.implementation
    }

    /// Header plus word-aligned private storage, in bytes
    pub fn footprint(&self) -> usize {
        self.footprint
    }

    /// Release every node and the stack itself
    ///
    /// The implementation stays registered; only this stack's reference to
    /// it is released.
    pub fn destroy(self) {
        debug!("Destroying stack bound to '{}'", self.implementation.name());
        drop(self);
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn MinStackAlgorithm>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Stack {
    fn drop(&mut self) {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cleanup();
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("implementation", &self.implementation.name())
            .field("len", &self.len())
            .field("footprint", &self.footprint)
            .finish()
    }
}

/// Header plus `storage_size` rounded up to a whole word
fn footprint_for(storage_size: usize) -> Result<usize> {
    storage_size
        .checked_next_multiple_of(WORD)
        .and_then(|storage| storage.checked_add(std::mem::size_of::<Stack>()))
        .ok_or_else(|| Error::exhausted(format!("storage size {} overflows", storage_size)))
}
