//! Locating the engine executable
//!
//! Where the engine lives depends on the host: a bundled install directory on
//! Unix-like hosts, a bare name resolved through the search path on Windows. The
//! choice is made once, when an [`EngineLocator`] is created, and then shared by
//! the command builder and the executor.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the engine executable
pub const ENGINE_NAME: &str = "jasperstarter";

/// Host family the engine runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux, macOS and other Unix-like hosts
    Unix,
    /// Windows hosts
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Shell program and flag used to run a rendered command line
    pub fn shell(&self) -> (&'static str, &'static str) {
        match self {
            Platform::Unix => ("sh", "-c"),
            Platform::Windows => ("cmd", "/C"),
        }
    }

    /// Wrap a value in double quotes so the shell passes it as one word
    pub fn quote(&self, value: &str) -> String {
        match self {
            Platform::Unix => {
                let mut quoted = String::with_capacity(value.len() + 2);
                quoted.push('"');
                for c in value.chars() {
                    if matches!(c, '"' | '\\' | '$' | '`') {
                        quoted.push('\\');
                    }
                    quoted.push(c);
                }
                quoted.push('"');
                quoted
            }
            // Backslashes are path separators; a doubled quote stays literal and keeps
            // cmd's quote state balanced
            Platform::Windows => format!("\"{}\"", value.replace('"', "\"\"")),
        }
    }

    /// Whether commands can be wrapped to run as another user
    pub fn supports_user_switch(&self) -> bool {
        matches!(self, Platform::Unix)
    }
}

/// Resolves where the engine executable and its resources live
pub trait EngineLocator: fmt::Debug + Send + Sync {
    /// Path (or bare name) of the engine executable
    fn executable(&self) -> PathBuf;

    /// Directory that must exist before the engine can run, if any
    fn resource_dir(&self) -> Option<&Path>;

    /// Host family the engine runs on
    fn platform(&self) -> Platform;

    /// Check the resource directory is present
    fn verify(&self) -> Result<()> {
        match self.resource_dir() {
            Some(dir) if !dir.is_dir() => Err(Error::InvalidResourceDirectory {
                path: dir.to_path_buf(),
            }),
            _ => Ok(()),
        }
    }
}

/// Engine shipped in a local install directory (Unix-like hosts)
#[derive(Debug, Clone)]
pub struct BundledEngine {
    bin_dir: PathBuf,
    name: String,
}

impl BundledEngine {
    /// Use the engine found in `bin_dir`
    pub fn new(bin_dir: impl Into<PathBuf>) -> Result<Self> {
        let bin_dir = std::path::absolute(bin_dir.into())?;
        Ok(Self {
            bin_dir,
            name: ENGINE_NAME.to_string(),
        })
    }

    /// Override the executable name inside the install directory
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Default install directory: `jasperstarter/bin` next to the running binary
    pub fn default_dir() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let base = exe.parent().ok_or_else(|| {
            std::io::Error::other("cannot determine the running binary's directory")
        })?;
        Ok(base.join(ENGINE_NAME).join("bin"))
    }

    /// The install directory
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }
}

impl EngineLocator for BundledEngine {
    fn executable(&self) -> PathBuf {
        self.bin_dir.join(&self.name)
    }

    fn resource_dir(&self) -> Option<&Path> {
        Some(&self.bin_dir)
    }

    fn platform(&self) -> Platform {
        Platform::Unix
    }
}

/// Engine resolved by name through the OS search path (Windows hosts)
#[derive(Debug, Clone)]
pub struct SearchPathEngine {
    name: String,
}

impl Default for SearchPathEngine {
    fn default() -> Self {
        Self {
            name: ENGINE_NAME.to_string(),
        }
    }
}

impl SearchPathEngine {
    /// Resolve `name` through the search path
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl EngineLocator for SearchPathEngine {
    fn executable(&self) -> PathBuf {
        PathBuf::from(&self.name)
    }

    fn resource_dir(&self) -> Option<&Path> {
        None
    }

    fn platform(&self) -> Platform {
        Platform::Windows
    }
}

/// Pick the locator for the current host.
///
/// On Unix-like hosts `install_dir` overrides [`BundledEngine::default_dir`]; on
/// Windows the engine is always looked up by name.
pub fn locate(install_dir: Option<PathBuf>) -> Result<Arc<dyn EngineLocator>> {
    match Platform::current() {
        Platform::Windows => Ok(Arc::new(SearchPathEngine::default())),
        Platform::Unix => {
            let dir = match install_dir {
                Some(dir) => dir,
                None => BundledEngine::default_dir()?,
            };
            Ok(Arc::new(BundledEngine::new(dir)?))
        }
    }
}
