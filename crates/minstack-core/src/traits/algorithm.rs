// # Min-Stack Algorithm Trait
//
// Defines the interface every stack-with-minimum variant implements.
//
// ## Implementations
//
// - Implicit minimum chain: `minstack-list` crate (`"list"`, alias `"generic"`)
// - Explicit marker stack: `minstack-marker` crate (`"marker"`)
//
// ## Usage
//
// ```rust,ignore
// use minstack_core::MinStackAlgorithm;
//
// let mut stack = /* MinStackAlgorithm implementation */;
// stack.push(5)?;
// stack.push(3)?;
// assert_eq!(stack.min()?, 3);
// assert_eq!(stack.pop()?, 3);
// assert_eq!(stack.min()?, 5);
// ```

use crate::error::Result;
use crate::value::Value;

/// Trait for stack-with-minimum implementations
///
/// Instances are created through a [`Descriptor`](crate::Descriptor)'s `init`
/// and are only ever driven by the [`Stack`](crate::Stack) facade, which
/// serializes access behind its own lock. Implementations therefore need
/// `Send` but not `Sync`.
///
/// # Contract
///
/// - `push`, `pop` and `min` run in O(1).
/// - `pop` and `min` return [`Error::Empty`](crate::Error::Empty) when no
///   element is present.
/// - Ties do not move the minimum: a value equal to the current minimum is
///   not a new minimum. Variants must agree on every `pop`/`min` result for
///   any interleaving of operations.
/// - Growth failures surface as
///   [`Error::ResourceExhausted`](crate::Error::ResourceExhausted).
pub trait MinStackAlgorithm: Send {
    /// Push a value on top of the stack
    fn push(&mut self, value: Value) -> Result<()>;

    /// Remove and return the top value
    fn pop(&mut self) -> Result<Value>;

    /// Smallest value currently present
    fn min(&self) -> Result<Value>;

    /// Number of values currently present
    fn len(&self) -> usize;

    /// Check if the stack holds no values
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes currently allocated by this instance, auxiliary ones included
    ///
    /// Used for leak accounting: a stack that had as many pops as pushes
    /// reports zero.
    fn live_nodes(&self) -> usize;

    /// Release every node held by the instance
    ///
    /// Called once by the facade before the instance is dropped.
    fn cleanup(&mut self);
}
