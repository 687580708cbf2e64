//! Core traits for the min-stack system
//!
//! This module defines the abstract interface that all implementations must follow.
//!
//! - [`MinStackAlgorithm`]: LIFO storage with an O(1) minimum query

pub mod algorithm;

pub use algorithm::MinStackAlgorithm;
