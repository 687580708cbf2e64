//! Refcounted implementation handles
//!
//! An [`Implementation`] wraps one [`Descriptor`] together with the artifact
//! it came from, if any. The registry shares it as `Arc<Implementation>`:
//! the table holds one reference, every bound [`Stack`](crate::Stack) holds
//! another. Dropping the last reference retires the implementation and
//! unloads its artifact.

use libloading::Library;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::traits::MinStackAlgorithm;

/// A resolved implementation
pub struct Implementation {
    // Points into `origin`'s library for loaded artifacts; never handed out
    // with a lifetime longer than `&self`.
    descriptor: &'static Descriptor,
    origin: Origin,
    registered: AtomicBool,
}

enum Origin {
    Builtin,
    Artifact {
        // Keeps the artifact mapped; unloaded when dropped
        _library: Library,
        path: PathBuf,
    },
}

impl Implementation {
    /// Wrap a descriptor linked into the binary
    pub fn builtin(descriptor: &'static Descriptor) -> Self {
        Self {
            descriptor,
            origin: Origin::Builtin,
            registered: AtomicBool::new(false),
        }
    }

    /// Wrap a descriptor read from a mapped artifact
    pub(crate) fn from_artifact(
        descriptor: &'static Descriptor,
        library: Library,
        path: PathBuf,
    ) -> Self {
        Self {
            descriptor,
            origin: Origin::Artifact {
                _library: library,
                path,
            },
            registered: AtomicBool::new(false),
        }
    }

    /// Canonical name
    pub fn name(&self) -> &str {
        self.descriptor.name
    }

    /// Alias, if the implementation declares one
    pub fn alias(&self) -> Option<&str> {
        self.descriptor.alias
    }

    /// The descriptor this implementation was resolved from
    pub fn descriptor(&self) -> &Descriptor {
        self.descriptor
    }

    /// Resolved artifact path, `None` for built-in implementations
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Builtin => None,
            Origin::Artifact { path, .. } => Some(path),
        }
    }

    /// Exact match against the name or alias
    pub fn matches(&self, name: &str) -> bool {
        self.descriptor.matches(name)
    }

    /// `true` once a registry table has taken this implementation
    ///
    /// Candidates that were only inspected, or lost a registration race,
    /// stay unregistered.
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub(crate) fn mark_registered(&self) {
        self.registered.store(true, Ordering::Release);
    }

    /// Run the descriptor's constructor
    pub(crate) fn instantiate(&self, capacity_hint: usize) -> Result<Box<dyn MinStackAlgorithm>> {
        (self.descriptor.init)(capacity_hint)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("name", &self.descriptor.name)
            .field("alias", &self.descriptor.alias)
            .field("path", &self.path())
            .field("registered", &self.is_registered())
            .finish()
    }
}

impl Drop for Implementation {
    fn drop(&mut self) {
        match (&self.origin, self.is_registered()) {
            (Origin::Builtin, true) => {
                debug!("Retiring implementation '{}'", self.descriptor.name)
            }
            (Origin::Artifact { path, .. }, true) => info!(
                "Retiring implementation '{}', unloading {}",
                self.descriptor.name,
                path.display()
            ),
            (origin, false) => debug!(
                "Releasing unregistered candidate '{}'{}",
                self.descriptor.name,
                match origin {
                    Origin::Artifact { path, .. } => format!(" from {}", path.display()),
                    Origin::Builtin => String::new(),
                }
            ),
        }
        // The library is unloaded when `origin` drops, after this body;
        // nothing reads the descriptor past this point.
    }
}
