//! In-memory parse results awaiting merge or injection.

use serde::{Deserialize, Serialize};

use crate::types::{FileInfo, FilePath};

/// Kind of an indexed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
    Macro,
    Other,
}

/// One symbol occurrence recorded by a parser run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub source: FilePath,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, source: impl Into<FilePath>) -> Self {
        Self {
            name: name.into(),
            kind,
            source: source.into(),
        }
    }
}

/// A file-level reference edge: `from` includes or otherwise depends on `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub from: FilePath,
    pub to: FilePath,
}

/// Non-fatal diagnostic recorded during a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDiagnostic {
    pub path: FilePath,
    pub message: String,
    pub fatal: bool,
}

/// Symbol/edge delta produced by a single parser run.
///
/// Storages have no identity; two of them can be merged in either direction and
/// the result carries the union of their content. Every storage produced by a
/// worker is eventually merged into another one or injected into the persistent
/// storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateStorage {
    pub symbols: Vec<Symbol>,
    pub references: Vec<FileReference>,
    pub file_infos: Vec<FileInfo>,
    pub diagnostics: Vec<IndexDiagnostic>,
}

impl IntermediateStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub fn add_reference(&mut self, from: impl Into<FilePath>, to: impl Into<FilePath>) {
        self.references.push(FileReference {
            from: from.into(),
            to: to.into(),
        });
    }

    pub fn add_file_info(&mut self, info: FileInfo) {
        self.file_infos.push(info);
    }

    pub fn add_diagnostic(&mut self, path: impl Into<FilePath>, message: impl Into<String>, fatal: bool) {
        self.diagnostics.push(IndexDiagnostic {
            path: path.into(),
            message: message.into(),
            fatal,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
            && self.references.is_empty()
            && self.file_infos.is_empty()
            && self.diagnostics.is_empty()
    }

    /// Approximate in-memory size in bytes, additive under merge.
    pub fn byte_size(&self) -> usize {
        let symbols: usize = self
            .symbols
            .iter()
            .map(|s| s.name.len() + s.source.as_path().as_os_str().len() + 8)
            .sum();
        let references: usize = self
            .references
            .iter()
            .map(|r| r.from.as_path().as_os_str().len() + r.to.as_path().as_os_str().len())
            .sum();
        let infos: usize = self
            .file_infos
            .iter()
            .map(|i| i.path.as_path().as_os_str().len() + 8)
            .sum();
        let diagnostics: usize = self
            .diagnostics
            .iter()
            .map(|d| d.message.len() + d.path.as_path().as_os_str().len() + 1)
            .sum();
        symbols + references + infos + diagnostics
    }

    /// Union `other` into this storage.
    pub fn merge_from(&mut self, other: IntermediateStorage) {
        self.symbols.extend(other.symbols);
        self.references.extend(other.references);
        self.file_infos.extend(other.file_infos);
        self.diagnostics.extend(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(name: &str, source: &str) -> IntermediateStorage {
        let mut storage = IntermediateStorage::new();
        storage.add_symbol(Symbol::new(name, SymbolKind::Function, source));
        storage.add_file_info(FileInfo::new(source, Utc::now()));
        storage
    }

    #[test]
    fn test_merge_is_size_additive() {
        let mut a = sample("foo", "a.cpp");
        let b = sample("bar", "b.cpp");
        let expected = a.byte_size() + b.byte_size();

        a.merge_from(b);
        assert_eq!(a.byte_size(), expected);
        assert_eq!(a.symbols.len(), 2);
        assert_eq!(a.file_infos.len(), 2);
    }

    #[test]
    fn test_merge_keeps_union_of_content() {
        let mut a = sample("foo", "a.cpp");
        let mut b = IntermediateStorage::new();
        b.add_reference("a.cpp", "h.h");
        b.add_diagnostic("a.cpp", "unused variable", false);

        a.merge_from(b);
        assert_eq!(a.references.len(), 1);
        assert_eq!(a.diagnostics.len(), 1);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_empty_storage() {
        let storage = IntermediateStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.byte_size(), 0);
    }
}
