// # Artifact Sources
//
// Discovery of implementations packaged as shared libraries.
//
// An artifact exports `minstack_descriptor` (see `export_descriptor!`).
// Mapping an artifact runs its initialization code: that is an observable
// side effect of `Registry::resolve`, not hidden internal state.
//
// ## Strategies
//
// - Direct path: `<dir>/<name><suffix>`, one candidate per name
// - Directory scan: every `*<suffix>` in `<dir>`, sorted by file name.
//   Artifacts the process has already mapped are not opened again; their
//   existing mapping is inspected instead.

use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::ImplementationSource;
use crate::descriptor::{DescriptorEntry, ENTRY_SYMBOL};
use crate::error::{Error, Result};
use crate::registry::Implementation;

/// Opens `<dir>/<name><suffix>` for each requested name
#[derive(Debug, Clone)]
pub struct DirectPathSource {
    dir: PathBuf,
    suffix: String,
}

impl DirectPathSource {
    /// Create a source rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    /// Path an artifact for `name` is expected at
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", name, self.suffix))
    }
}

impl ImplementationSource for DirectPathSource {
    fn name(&self) -> &str {
        "direct_path"
    }

    fn locate(&self, name: &str) -> Result<Option<Implementation>> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            debug!("Name '{}' cannot form an artifact path", name);
            return Ok(None);
        }

        let path = self.artifact_path(name);
        if !path.is_file() {
            debug!("No artifact at {}", path.display());
            return Ok(None);
        }

        let candidate = load_artifact(&path)?;
        if !candidate.matches(name) {
            return Err(Error::invalid(
                path.display().to_string(),
                format!(
                    "artifact declares '{}' but '{}' was requested",
                    candidate.name(),
                    name
                ),
            ));
        }

        Ok(Some(candidate))
    }
}

/// Tries every artifact in a directory until one answers to the name
#[derive(Debug, Clone)]
pub struct DirectoryScanSource {
    dir: PathBuf,
    suffix: String,
}

impl DirectoryScanSource {
    /// Create a source scanning `dir`
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
        }
    }

    /// Artifacts currently in the directory, sorted by path
    pub fn candidates(&self) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Plugin directory {} does not exist", self.dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::load_failed(&self.dir, e)),
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_suffix(path, &self.suffix))
            .collect();
        paths.sort();

        Ok(paths)
    }
}

impl ImplementationSource for DirectoryScanSource {
    fn name(&self) -> &str {
        "scan"
    }

    fn locate(&self, name: &str) -> Result<Option<Implementation>> {
        for path in self.candidates()? {
            let loaded = match existing_mapping(&path) {
                Some(library) => {
                    debug!("{} is already mapped, reading its descriptor", path.display());
                    describe_artifact(&path, library)
                }
                None => load_artifact(&path),
            };

            match loaded {
                Ok(candidate) if candidate.matches(name) => return Ok(Some(candidate)),
                Ok(candidate) => {
                    debug!(
                        "{} declares '{}', not '{}'",
                        path.display(),
                        candidate.name(),
                        name
                    );
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        Ok(None)
    }
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > suffix.len() && n.ends_with(suffix))
}

/// Map an artifact and read its descriptor
///
/// The returned implementation is validated but not matched against any
/// requested name.
fn load_artifact(path: &Path) -> Result<Implementation> {
    // SAFETY: mapping runs the artifact's initializers; artifacts in the
    // plugin directory are trusted to be built against this crate.
    let library = unsafe { Library::new(path) }.map_err(|e| Error::load_failed(path, e))?;
    describe_artifact(path, library)
}

/// Read and validate the descriptor of an artifact that is already mapped
fn describe_artifact(path: &Path, library: Library) -> Result<Implementation> {
    let origin = path.display().to_string();

    // SAFETY: `ENTRY_SYMBOL` is declared by `export_descriptor!` with the
    // `DescriptorEntry` signature.
    let descriptor = unsafe {
        let entry: Symbol<DescriptorEntry> = library.get(ENTRY_SYMBOL.as_bytes()).map_err(|e| {
            Error::invalid(
                origin.clone(),
                format!("missing entry point '{}': {}", ENTRY_SYMBOL, e),
            )
        })?;
        entry()
    }
    .ok_or_else(|| Error::invalid(origin.clone(), "entry point returned no descriptor"))?;

    descriptor.validate(&origin)?;

    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    info!("Loaded implementation '{}' from {}", descriptor.name, resolved.display());

    Ok(Implementation::from_artifact(descriptor, library, resolved))
}

/// A new reference to the artifact if the process already maps it
///
/// Never maps anything itself: an artifact that is not mapped yields `None`.
#[cfg(unix)]
fn existing_mapping(path: &Path) -> Option<Library> {
    // SAFETY: RTLD_NOLOAD never maps a new object, so no initializer runs.
    unsafe {
        libloading::os::unix::Library::open(Some(path), libc::RTLD_NOLOAD | libc::RTLD_LAZY)
    }
    .ok()
    .map(Library::from)
}

#[cfg(not(unix))]
fn existing_mapping(_path: &Path) -> Option<Library> {
    None
}
