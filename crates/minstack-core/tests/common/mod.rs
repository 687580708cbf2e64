//! Test doubles and common utilities for registry and facade contract tests
//!
//! The core crate ships no algorithm, so these doubles provide a naive
//! reference stack and sources that make resolution races observable.

#![allow(dead_code)]

use minstack_core::{
    BuiltinSource, Descriptor, Error, Implementation, ImplementationSource, MinStackAlgorithm,
    Registry, Result, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Naive reference stack: O(n) minimum, one node per value
#[derive(Debug, Default)]
pub struct NaiveStack {
    values: Vec<Value>,
}

impl MinStackAlgorithm for NaiveStack {
    fn push(&mut self, value: Value) -> Result<()> {
        self.values.try_reserve(1)?;
        self.values.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        self.values.pop().ok_or(Error::Empty)
    }

    fn min(&self) -> Result<Value> {
        self.values.iter().copied().min().ok_or(Error::Empty)
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn live_nodes(&self) -> usize {
        self.values.len()
    }

    fn cleanup(&mut self) {
        self.values = Vec::new();
    }
}

fn init_naive(capacity_hint: usize) -> Result<Box<dyn MinStackAlgorithm>> {
    let mut values = Vec::new();
    values.try_reserve(capacity_hint)?;
    Ok(Box::new(NaiveStack { values }))
}

fn init_refuse(_capacity_hint: usize) -> Result<Box<dyn MinStackAlgorithm>> {
    Err(Error::exhausted("refusing to initialize"))
}

pub static NAIVE: Descriptor = Descriptor::new(
    "naive",
    Some("generic"),
    std::mem::size_of::<NaiveStack>(),
    init_naive,
);

pub static FAILING: Descriptor = Descriptor::new("failing", None, 0, init_refuse);

/// Declares more private state than any stack may take
pub static OVERSIZED: Descriptor = Descriptor::new("oversized", None, usize::MAX - 1, init_naive);

/// Built-in catalog holding every test descriptor
pub fn builtins() -> BuiltinSource {
    BuiltinSource::new().with(&NAIVE).with(&FAILING)
}

/// Registry over [`builtins`]
pub fn registry() -> Registry {
    Registry::new().with_source(builtins())
}

/// A source that counts `locate` calls and stalls before answering
///
/// Stalling keeps every racing thread inside discovery at the same time,
/// so they all reach the registration re-check with a fresh candidate.
pub struct SlowSource {
    inner: BuiltinSource,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl SlowSource {
    pub fn new(delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            inner: builtins(),
            delay,
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }
}

impl ImplementationSource for SlowSource {
    fn name(&self) -> &str {
        "slow"
    }

    fn locate(&self, name: &str) -> Result<Option<Implementation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.inner.locate(name)
    }
}

/// A source only one caller at a time can take a candidate from
///
/// While one caller is reading the candidate, every other caller finds
/// nothing, the way a directory scan passes over an artifact another
/// thread is still opening. Those callers answer after `miss_delay`, long
/// after the holder (answering after `hit_delay`) has registered.
pub struct ExclusiveSource {
    inner: BuiltinSource,
    busy: AtomicBool,
    hit_delay: Duration,
    miss_delay: Duration,
    misses: Arc<AtomicUsize>,
}

impl ExclusiveSource {
    pub fn new(hit_delay: Duration, miss_delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let misses = Arc::new(AtomicUsize::new(0));
        let source = Self {
            inner: builtins(),
            busy: AtomicBool::new(false),
            hit_delay,
            miss_delay,
            misses: Arc::clone(&misses),
        };
        (source, misses)
    }
}

impl ImplementationSource for ExclusiveSource {
    fn name(&self) -> &str {
        "exclusive"
    }

    fn locate(&self, name: &str) -> Result<Option<Implementation>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.misses.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(self.miss_delay);
            return Ok(None);
        }

        std::thread::sleep(self.hit_delay);
        let found = self.inner.locate(name);
        self.busy.store(false, Ordering::SeqCst);
        found
    }
}

/// A source that always fails with a load error
pub struct BrokenSource;

impl ImplementationSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    fn locate(&self, name: &str) -> Result<Option<Implementation>> {
        Err(Error::load_failed(format!("/broken/{}.so", name), "simulated failure"))
    }
}

/// A source that hands out a candidate for the wrong name
pub struct LyingSource;

impl ImplementationSource for LyingSource {
    fn name(&self) -> &str {
        "lying"
    }

    fn locate(&self, _name: &str) -> Result<Option<Implementation>> {
        Ok(Some(Implementation::builtin(&FAILING)))
    }
}

/// Install a test-writer subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
