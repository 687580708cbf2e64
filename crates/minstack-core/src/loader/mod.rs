//! Implementation discovery
//!
//! The [`Registry`](crate::Registry) never knows how implementations are
//! found. It asks an ordered list of [`ImplementationSource`]s, always
//! outside its table lock.
//!
//! - [`BuiltinSource`]: a static catalog of descriptors linked into the binary
//! - [`DirectPathSource`]: opens `<dir>/<name><suffix>`
//! - [`DirectoryScanSource`]: tries every artifact in a directory

mod dylib;

pub use dylib::{DirectPathSource, DirectoryScanSource};

use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::registry::Implementation;

/// A place implementations can be discovered from
///
/// `locate` may perform I/O and map artifacts into the process, which runs
/// their initialization code. It is called without any registry lock held,
/// possibly from several threads at once for the same name.
pub trait ImplementationSource: Send + Sync {
    /// Short label used in logs and errors
    fn name(&self) -> &str;

    /// Find an implementation answering to `name`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(_))`: a freshly created, not yet registered implementation
    /// - `Ok(None)`: this source has nothing by that name
    /// - `Err(_)`: a candidate exists but could not be loaded or is invalid
    fn locate(&self, name: &str) -> Result<Option<Implementation>>;
}

/// Static catalog of implementations compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct BuiltinSource {
    descriptors: Vec<&'static Descriptor>,
}

impl BuiltinSource {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor (builder style)
    pub fn with(mut self, descriptor: &'static Descriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Add a descriptor
    ///
    /// Later descriptors never shadow earlier ones answering to the same name.
    pub fn register(&mut self, descriptor: &'static Descriptor) {
        self.descriptors.push(descriptor);
    }

    /// Canonical names in the catalog
    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.name).collect()
    }

    /// Number of descriptors in the catalog
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl ImplementationSource for BuiltinSource {
    fn name(&self) -> &str {
        "builtin"
    }

    fn locate(&self, name: &str) -> Result<Option<Implementation>> {
        Ok(self
            .descriptors
            .iter()
            .copied()
            .find(|d| d.matches(name))
            .map(Implementation::builtin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::traits::MinStackAlgorithm;

    fn refuse(_capacity_hint: usize) -> Result<Box<dyn MinStackAlgorithm>> {
        Err(Error::exhausted("test"))
    }

    static FIRST: Descriptor = Descriptor::new("first", Some("shared"), 0, refuse);
    static SECOND: Descriptor = Descriptor::new("second", Some("shared"), 0, refuse);

    #[test]
    fn test_builtin_locate() {
        let source = BuiltinSource::new().with(&FIRST).with(&SECOND);

        assert_eq!(source.names(), vec!["first", "second"]);
        assert_eq!(source.locate("second").unwrap().unwrap().name(), "second");
        assert!(source.locate("third").unwrap().is_none());
    }

    #[test]
    fn test_builtin_first_registration_wins() {
        let source = BuiltinSource::new().with(&FIRST).with(&SECOND);

        let found = source.locate("shared").unwrap().unwrap();
        assert_eq!(found.name(), "first");
        assert!(found.path().is_none());
    }
}
