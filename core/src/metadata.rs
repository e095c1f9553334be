//! Program metadata captured once at startup.
//!
//! # Design
//! `ProgramInfo` is a plain value built by the `program_info!` macro, which
//! expands `env!("CARGO_PKG_*")` in the *calling* crate. Code that needs the
//! program's name or version takes a `MetadataProvider` instead of reading
//! process-wide state, so tests can inject fixed values.

use std::path::{Path, PathBuf};

/// Name, version and location of the running program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    name: String,
    version: String,
    version_parts: (u64, u64, u64),
    description: String,
    authors: Vec<String>,
    executable: Option<PathBuf>,
}

impl ProgramInfo {
    /// `authors` uses Cargo's colon-separated `CARGO_PKG_AUTHORS` format.
    pub fn new(name: &str, version: &str, description: &str, authors: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            version_parts: parse_version(version),
            description: description.to_string(),
            authors: authors
                .split(':')
                .map(str::trim)
                .filter(|author| !author.is_empty())
                .map(str::to_string)
                .collect(),
            executable: None,
        }
    }

    pub fn with_executable(mut self, path: Option<PathBuf>) -> Self {
        self.executable = path;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full version string, including any pre-release or build suffix.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn version_major(&self) -> u64 {
        self.version_parts.0
    }

    pub fn version_minor(&self) -> u64 {
        self.version_parts.1
    }

    pub fn version_patch(&self) -> u64 {
        self.version_parts.2
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn executable_path(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    pub fn executable_dir(&self) -> Option<&Path> {
        self.executable.as_deref().and_then(Path::parent)
    }

    pub fn executable_name(&self) -> Option<&str> {
        self.executable
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    }

    /// `name/major.minor.patch`, suitable for a `User-Agent` header.
    pub fn user_agent(&self) -> String {
        let (major, minor, patch) = self.version_parts;
        format!("{}/{major}.{minor}.{patch}", self.name)
    }
}

/// Source of program metadata.
pub trait MetadataProvider {
    fn program_info(&self) -> &ProgramInfo;
}

impl MetadataProvider for ProgramInfo {
    fn program_info(&self) -> &ProgramInfo {
        self
    }
}

/// Missing or non-numeric components read as 0.
fn parse_version(version: &str) -> (u64, u64, u64) {
    let core = version.split(['-', '+']).next().unwrap_or_default();
    let mut parts = core.split('.').map(|part| part.parse::<u64>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

/// Build a `ProgramInfo` for the crate that invokes the macro.
#[macro_export]
macro_rules! program_info {
    () => {
        $crate::ProgramInfo::new(
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION"),
            env!("CARGO_PKG_AUTHORS"),
        )
        .with_executable(::std::env::current_exe().ok())
    };
}
