//! Contract Test: Stack Lifecycle
//!
//! Constraints verified:
//! - A failed constructor releases the implementation reference it took
//! - An oversized storage declaration is rejected, never registered
//! - Destroy releases the stack's nodes and reference, not the registration
//! - Emptiness is reported as `Error::Empty` (or the marker when asked)
//! - One handle serializes concurrent callers; handles are independent

mod common;

use common::*;
use minstack_core::{BuiltinSource, EMPTY_MARKER, Error, Registry};

#[test]
fn failed_init_releases_reference() {
    init_tracing();
    let registry = registry();

    let err = registry.create_stack("failing", 16).unwrap_err();

    assert!(matches!(err, Error::ResourceExhausted(_)));
    assert_eq!(registry.reference_count("failing"), Some(1));
}

#[test]
fn oversized_storage_is_invalid() {
    let registry = Registry::new().with_source(BuiltinSource::new().with(&OVERSIZED));

    let err = registry.create_stack("oversized", 0).unwrap_err();

    assert!(
        matches!(err, Error::InvalidImplementation { .. }),
        "got {:?}",
        err
    );
    assert!(registry.is_empty());
}

#[test]
fn destroy_keeps_implementation_registered() {
    let registry = registry();
    let stack = registry.create_stack("generic", 8).unwrap();
    assert_eq!(stack.implementation_name(), "naive");
    assert_eq!(registry.reference_count("naive"), Some(2));

    for v in [4, 2, 9] {
        stack.push(v).unwrap();
    }
    stack.destroy();

    assert_eq!(registry.reference_count("naive"), Some(1));
    assert_eq!(registry.registered_names(), vec!["naive".to_string()]);
}

#[test]
fn empty_is_signalled() {
    let registry = registry();
    let stack = registry.create_stack("naive", 0).unwrap();

    assert!(matches!(stack.pop(), Err(Error::Empty)));
    assert!(matches!(stack.min(), Err(Error::Empty)));
    assert_eq!(stack.pop_or_marker(), EMPTY_MARKER);
    assert_eq!(stack.min_or_marker(), EMPTY_MARKER);

    stack.push(3).unwrap();
    assert_eq!(stack.pop().unwrap(), 3);
    assert!(stack.is_empty());
    assert!(stack.min().unwrap_err().is_empty());
}

#[test]
fn footprint_is_word_aligned() {
    let registry = registry();
    let stack = registry.create_stack("naive", 0).unwrap();

    assert_eq!(stack.footprint() % std::mem::size_of::<usize>(), 0);
    assert!(stack.footprint() >= NAIVE.storage_size);
}

#[test]
fn one_handle_serializes_callers() {
    const THREADS: usize = 4;
    const PUSHES: u32 = 250;

    let registry = registry();
    let stack = registry.create_stack("naive", 0).unwrap();

    std::thread::scope(|scope| {
        for t in 0..THREADS as u32 {
            let stack = &stack;
            scope.spawn(move || {
                for i in 0..PUSHES {
                    stack.push(t * PUSHES + i + 1).unwrap();
                }
            });
        }
    });

    assert_eq!(stack.len(), THREADS * PUSHES as usize);
    assert_eq!(stack.min().unwrap(), 1);
}

#[test]
fn handles_are_independent() {
    let registry = registry();
    let a = registry.create_stack("naive", 0).unwrap();
    let b = registry.create_stack("naive", 0).unwrap();

    a.push(1).unwrap();
    b.push(2).unwrap();

    assert_eq!(a.min().unwrap(), 1);
    assert_eq!(b.min().unwrap(), 2);
    assert_eq!(a.pop().unwrap(), 1);
    assert!(a.is_empty());
    assert_eq!(b.len(), 1);
}

#[test]
fn drained_stack_holds_no_nodes() {
    let registry = registry();
    let stack = registry.create_stack("naive", 100).unwrap();

    for v in 0..100 {
        stack.push(v).unwrap();
    }
    assert_eq!(stack.live_nodes(), 100);
    for _ in 0..100 {
        stack.pop().unwrap();
    }
    assert_eq!(stack.live_nodes(), 0);
}
