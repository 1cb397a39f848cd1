//! Shared value types for the Dendrite engine.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File modification timestamp.
pub type Timestamp = DateTime<Utc>;

/// Set of file paths with deterministic iteration order.
pub type FilePathSet = BTreeSet<FilePath>;

/// Canonical path to a source file.
///
/// Equality is byte-wise on the stored path, which is case-sensitive on
/// case-sensitive filesystems. The path is stored as given; callers that need
/// symlink resolution canonicalize before constructing one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilePath(PathBuf);

impl FilePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Lowercase extension without the leading dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.0
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    pub fn exists(&self) -> bool {
        self.0.exists()
    }

    pub fn with_extension(&self, ext: &str) -> Self {
        Self(self.0.with_extension(ext))
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for FilePath {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for FilePath {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&str> for FilePath {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

impl From<String> for FilePath {
    fn from(path: String) -> Self {
        Self(PathBuf::from(path))
    }
}

impl AsRef<Path> for FilePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Snapshot of a file's identity and modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: FilePath,
    pub last_write_time: Timestamp,
}

impl FileInfo {
    pub fn new(path: impl Into<FilePath>, last_write_time: Timestamp) -> Self {
        Self {
            path: path.into(),
            last_write_time,
        }
    }
}

/// Source language of an indexer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Java,
}

impl Language {
    /// Whether commands of this language honor the preprocessor-only switch.
    pub fn supports_preprocessor_only(&self) -> bool {
        matches!(self, Language::C | Language::Cpp)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "C"),
            Language::Cpp => write!(f, "C++"),
            Language::Java => write!(f, "Java"),
        }
    }
}

/// Access mode of the persistent storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Read,
    Write,
}

/// Description of one file to parse, immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerCommand {
    pub source_path: FilePath,
    pub language: Language,
    pub compiler_args: Vec<String>,
    pub cancel_on_fatal_errors: bool,
    pub preprocessor_only: bool,
}

impl IndexerCommand {
    pub fn new(source_path: impl Into<FilePath>, language: Language) -> Self {
        Self {
            source_path: source_path.into(),
            language,
            compiler_args: Vec::new(),
            cancel_on_fatal_errors: false,
            preprocessor_only: false,
        }
    }

    pub fn with_compiler_args(mut self, args: Vec<String>) -> Self {
        self.compiler_args = args;
        self
    }

    pub fn set_cancel_on_fatal_errors(&mut self, cancel: bool) {
        self.cancel_on_fatal_errors = cancel;
    }

    /// Preprocessor-only mode applies to C/C++ commands only.
    pub fn set_preprocessor_only(&mut self, preprocessor_only: bool) {
        self.preprocessor_only = preprocessor_only && self.language.supports_preprocessor_only();
    }
}
