//! Contract Test: Process-wide Service Lifecycle
//!
//! Kept to a single test: the service is process-global, and tests in one
//! binary share the process.

use minstack::{Error, RegistryConfig};

#[test]
fn service_lifecycle() {
    assert!(matches!(minstack::create("generic", 1), Err(Error::Config(_))));

    let service = minstack::install(&RegistryConfig::default()).expect("first install succeeds");
    assert_eq!(service.default_implementation(), "generic");
    assert!(service.registry().is_empty());

    let again = minstack::install(&RegistryConfig::default());
    assert!(matches!(again, Err(Error::Config(_))));

    let stack = minstack::stack_init(16).expect("default implementation resolves");
    assert_eq!(stack.implementation_name(), "list");
    stack.push(9).unwrap();
    stack.push(4).unwrap();
    assert_eq!(stack.min().unwrap(), 4);

    let marker = minstack::create("marker", 16).expect("marker resolves");
    assert!(matches!(
        minstack::create("does-not-exist", 16),
        Err(Error::NotFound(_))
    ));
    assert_eq!(service.registry().len(), 2);

    marker.destroy();
    minstack::teardown();

    assert!(matches!(minstack::create("list", 1), Err(Error::ShutDown)));
    // Stacks created before teardown keep working until destroyed
    assert_eq!(stack.pop().unwrap(), 4);
    stack.destroy();
}
