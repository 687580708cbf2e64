//! Implementation descriptors
//!
//! A [`Descriptor`] is the immutable record an implementation exposes to the
//! registry: its names, the size of its private state and the constructor
//! producing a [`MinStackAlgorithm`] instance.
//!
//! ## Loadable artifacts
//!
//! An artifact (shared library) exposes one descriptor through the
//! well-known entry point [`ENTRY_SYMBOL`]. Implementation crates generate
//! it with [`export_descriptor!`](crate::export_descriptor):
//!
//! ```rust,ignore
//! pub static DESCRIPTOR: Descriptor = Descriptor::new("list", Some("generic"), 48, init);
//!
//! #[cfg(feature = "plugin")]
//! minstack_core::export_descriptor!(DESCRIPTOR);
//! ```

use crate::error::{Error, Result};
use crate::traits::MinStackAlgorithm;

/// Descriptor layout revision; artifacts built against another revision are rejected
pub const ABI_VERSION: u32 = 1;

/// Name of the entry point every loadable artifact exports
pub const ENTRY_SYMBOL: &str = "minstack_descriptor";

/// Longest accepted implementation name or alias, in bytes
pub const NAME_LENGTH_MAX: usize = 255;

/// Largest accepted `storage_size`, in bytes
pub const STORAGE_SIZE_MAX: usize = 1 << 20;

/// Signature of the artifact entry point
///
/// `None` means the artifact carries no usable descriptor.
pub type DescriptorEntry = fn() -> Option<&'static Descriptor>;

/// Constructor for a fresh algorithm instance, given a capacity hint
pub type InitFn = fn(capacity_hint: usize) -> Result<Box<dyn MinStackAlgorithm>>;

/// Immutable metadata identifying one implementation
#[derive(Debug)]
pub struct Descriptor {
    /// Layout revision, must equal [`ABI_VERSION`]
    pub abi_version: u32,
    /// Canonical name
    pub name: &'static str,
    /// Optional second name the implementation also answers to
    pub alias: Option<&'static str>,
    /// Bytes of private state one instance needs
    pub storage_size: usize,
    /// Instance constructor
    pub init: InitFn,
}

impl Descriptor {
    /// Build a descriptor for the current [`ABI_VERSION`]
    pub const fn new(
        name: &'static str,
        alias: Option<&'static str>,
        storage_size: usize,
        init: InitFn,
    ) -> Self {
        Self {
            abi_version: ABI_VERSION,
            name,
            alias,
            storage_size,
            init,
        }
    }

    /// Exact, case-sensitive match against the name or the alias
    pub fn matches(&self, requested: &str) -> bool {
        self.name == requested || self.alias == Some(requested)
    }

    /// Check the descriptor is well-formed
    ///
    /// `origin` names where the descriptor came from and is carried into
    /// the error.
    pub fn validate(&self, origin: &str) -> Result<()> {
        if self.abi_version != ABI_VERSION {
            return Err(Error::invalid(
                origin,
                format!(
                    "ABI version {} (expected {})",
                    self.abi_version, ABI_VERSION
                ),
            ));
        }

        check_name(origin, "name", self.name)?;

        if let Some(alias) = self.alias {
            check_name(origin, "alias", alias)?;
            if alias == self.name {
                return Err(Error::invalid(origin, "alias repeats the canonical name"));
            }
        }

        if self.storage_size > STORAGE_SIZE_MAX {
            return Err(Error::invalid(
                origin,
                format!(
                    "storage size {} exceeds {} bytes",
                    self.storage_size, STORAGE_SIZE_MAX
                ),
            ));
        }

        Ok(())
    }
}

fn check_name(origin: &str, what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid(origin, format!("empty {}", what)));
    }
    if value.len() > NAME_LENGTH_MAX {
        return Err(Error::invalid(
            origin,
            format!("{} is {} bytes (max {})", what, value.len(), NAME_LENGTH_MAX),
        ));
    }
    Ok(())
}

/// Export a descriptor through the artifact entry point
///
/// Invoke at most once per artifact. Crates that are also linked as
/// ordinary libraries should gate the invocation behind a feature so two
/// implementations never export the same symbol into one binary.
#[macro_export]
macro_rules! export_descriptor {
    ($descriptor:path) => {
        #[unsafe(no_mangle)]
        pub fn minstack_descriptor() -> ::core::option::Option<&'static $crate::Descriptor> {
            ::core::option::Option::Some(&$descriptor)
        }
    };
}
