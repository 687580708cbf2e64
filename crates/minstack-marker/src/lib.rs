// # Explicit Marker Stack
//
// Stack-with-minimum that keeps a second, shorter stack of markers. Each
// marker points at the entry that established a new minimum; the top
// marker is always the current minimum.
//
// A marker is allocated only when a push is strictly lower than the
// current minimum, so runs of non-decreasing values cost no extra nodes.
//
// ## Names
//
// Canonical name `"marker"`.

use minstack_core::{BuiltinSource, Descriptor, Error, MinStackAlgorithm, Result, Value};
use tracing::trace;

/// Canonical implementation name
pub const NAME: &str = "marker";

/// Descriptor exposed to the registry
pub static DESCRIPTOR: Descriptor = Descriptor::new(
    NAME,
    None,
    std::mem::size_of::<MarkerStack>(),
    init,
);

#[cfg(feature = "plugin")]
minstack_core::export_descriptor!(DESCRIPTOR);

/// Add this implementation to a built-in catalog
pub fn register(source: &mut BuiltinSource) {
    source.register(&DESCRIPTOR);
}

fn init(capacity_hint: usize) -> Result<Box<dyn MinStackAlgorithm>> {
    trace!("Initializing marker stack (capacity hint {})", capacity_hint);
    Ok(Box::new(MarkerStack::with_capacity(capacity_hint)?))
}

/// Reference to the entry that established a minimum
#[derive(Debug, Clone, Copy)]
struct Marker {
    entry: usize,
}

/// Stack with a parallel stack of minimum markers
#[derive(Debug, Default)]
pub struct MarkerStack {
    entries: Vec<Value>,
    markers: Vec<Marker>,
    markers_allocated: usize,
}

impl MarkerStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stack with room for `capacity_hint` entries
    ///
    /// Markers are not pre-allocated; their count depends on the data.
    pub fn with_capacity(capacity_hint: usize) -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity_hint)?;
        Ok(Self {
            entries,
            ..Self::default()
        })
    }

    /// Markers currently on the marker stack
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Markers created over the stack's lifetime
    pub fn markers_allocated(&self) -> usize {
        self.markers_allocated
    }

    fn current_min(&self) -> Option<Value> {
        self.markers.last().map(|m| self.entries[m.entry])
    }
}

impl MinStackAlgorithm for MarkerStack {
    fn push(&mut self, value: Value) -> Result<()> {
        let lower = self.current_min().is_none_or(|min| value < min);

        // Reserve everything first so a failure leaves the stack untouched
        self.entries.try_reserve(1)?;
        if lower {
            self.markers.try_reserve(1)?;
        }

        let index = self.entries.len();
        self.entries.push(value);
        if lower {
            self.markers.push(Marker { entry: index });
            self.markers_allocated += 1;
        }
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        let value = self.entries.pop().ok_or(Error::Empty)?;
        let index = self.entries.len();
        if self.markers.last().is_some_and(|m| m.entry == index) {
            self.markers.pop();
        }
        Ok(value)
    }

    fn min(&self) -> Result<Value> {
        self.current_min().ok_or(Error::Empty)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn live_nodes(&self) -> usize {
        self.entries.len() + self.markers.len()
    }

    fn cleanup(&mut self) {
        self.entries = Vec::new();
        self.markers = Vec::new();
    }
}
