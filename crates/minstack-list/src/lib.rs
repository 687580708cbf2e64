// # Implicit Minimum Chain
//
// Stack-with-minimum where every entry remembers which entry was the
// minimum just before it was pushed.
//
// ## Layout
//
// Entries live in one vector used as a LIFO; the top is the last element.
// `min` is the index of the current minimum entry. Each entry's `prev_min`
// is the value `min` had when the entry was pushed, so popping the minimum
// restores its predecessor in O(1). Indices stay valid because only the
// top entry is ever removed.
//
// ## Names
//
// Canonical name `"list"`, alias `"generic"` (the default implementation).

use minstack_core::{BuiltinSource, Descriptor, Error, MinStackAlgorithm, Result, Value};
use tracing::trace;

/// Canonical implementation name
pub const NAME: &str = "list";

/// Alias this implementation also answers to
pub const ALIAS: &str = "generic";

/// Descriptor exposed to the registry
pub static DESCRIPTOR: Descriptor = Descriptor::new(
    NAME,
    Some(ALIAS),
    std::mem::size_of::<ListStack>(),
    init,
);

#[cfg(feature = "plugin")]
minstack_core::export_descriptor!(DESCRIPTOR);

/// Add this implementation to a built-in catalog
pub fn register(source: &mut BuiltinSource) {
    source.register(&DESCRIPTOR);
}

fn init(capacity_hint: usize) -> Result<Box<dyn MinStackAlgorithm>> {
    trace!("Initializing list stack (capacity hint {})", capacity_hint);
    Ok(Box::new(ListStack::with_capacity(capacity_hint)?))
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: Value,
    /// Minimum entry at the time this one was pushed
    prev_min: Option<usize>,
}

/// Stack whose entries chain back through previous minima
#[derive(Debug, Default)]
pub struct ListStack {
    entries: Vec<Entry>,
    min: Option<usize>,
}

impl ListStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stack with room for `capacity_hint` entries
    pub fn with_capacity(capacity_hint: usize) -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity_hint)?;
        Ok(Self { entries, min: None })
    }
}

impl MinStackAlgorithm for ListStack {
    fn push(&mut self, value: Value) -> Result<()> {
        self.entries.try_reserve(1)?;

        let index = self.entries.len();
        let prev_min = self.min;
        let lower = prev_min.is_none_or(|i| value < self.entries[i].value);

        self.entries.push(Entry { value, prev_min });
        if lower {
            self.min = Some(index);
        }
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        let entry = self.entries.pop().ok_or(Error::Empty)?;
        if self.min == Some(self.entries.len()) {
            self.min = entry.prev_min;
        }
        Ok(entry.value)
    }

    fn min(&self) -> Result<Value> {
        self.min
            .map(|i| self.entries[i].value)
            .ok_or(Error::Empty)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn live_nodes(&self) -> usize {
        self.entries.len()
    }

    fn cleanup(&mut self) {
        self.entries = Vec::new();
        self.min = None;
    }
}
