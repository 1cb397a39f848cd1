//! In-memory persistent storage used by tests and embedders without a
//! database backend.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::debug;

use dendrite_core::error::{DendriteError, Result};
use dendrite_core::intermediate::{IndexDiagnostic, IntermediateStorage, Symbol};
use dendrite_core::traits::PersistentStorage;
use dendrite_core::types::{FileInfo, FilePath, FilePathSet, StorageMode, Timestamp};

#[derive(Debug, Clone, Default)]
struct Content {
    file_records: HashMap<FilePath, Timestamp>,
    symbols: Vec<Symbol>,
    references: HashSet<(FilePath, FilePath)>,
    diagnostics: Vec<IndexDiagnostic>,
    settings_text: String,
}

#[derive(Debug, Default)]
struct Inner {
    content: Content,
    snapshot: Option<Content>,
    mode: Option<StorageMode>,
    incompatible: bool,
    symbol_cache: HashMap<String, Vec<FilePath>>,
}

/// [`PersistentStorage`] kept entirely in memory.
///
/// Mirrors the transactional behavior the engine relies on: `inject` applies a
/// whole intermediate storage under one lock, and the explicit
/// `begin_write`/`commit`/`rollback` cycle snapshots the content so a canceled
/// clean restores the pre-clean state.
#[derive(Default)]
pub struct InMemoryStorage {
    inner: RwLock<Inner>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the storage as written by an incompatible version (test helper).
    pub fn set_incompatible(&self, incompatible: bool) {
        self.inner.write().incompatible = incompatible;
    }

    /// All symbols recorded for a source file.
    pub fn symbols_for(&self, path: &FilePath) -> Vec<Symbol> {
        self.inner
            .read()
            .content
            .symbols
            .iter()
            .filter(|s| &s.source == path)
            .cloned()
            .collect()
    }

    /// Source files that define a symbol with the given name, from the cache
    /// built by [`PersistentStorage::build_caches`].
    pub fn files_defining(&self, symbol_name: &str) -> Vec<FilePath> {
        self.inner
            .read()
            .symbol_cache
            .get(symbol_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn diagnostics(&self) -> Vec<IndexDiagnostic> {
        self.inner.read().content.diagnostics.clone()
    }

    /// Total number of symbols currently stored.
    pub fn symbol_count(&self) -> usize {
        self.inner.read().content.symbols.len()
    }
}

impl PersistentStorage for InMemoryStorage {
    fn is_empty(&self) -> bool {
        self.inner.read().content.file_records.is_empty()
    }

    fn is_incompatible(&self) -> bool {
        self.inner.read().incompatible
    }

    fn mode(&self) -> StorageMode {
        self.inner.read().mode.unwrap_or(StorageMode::Read)
    }

    fn set_mode(&self, mode: StorageMode) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.incompatible {
            return Err(DendriteError::storage(
                "cannot change mode of incompatible storage",
            ));
        }
        debug!(?mode, "storage mode transition");
        inner.mode = Some(mode);
        Ok(())
    }

    fn build_caches(&self) {
        let mut inner = self.inner.write();
        let mut cache: HashMap<String, Vec<FilePath>> = HashMap::new();
        for symbol in &inner.content.symbols {
            cache
                .entry(symbol.name.clone())
                .or_default()
                .push(symbol.source.clone());
        }
        inner.symbol_cache = cache;
    }

    fn info_on_all_files(&self) -> Vec<FileInfo> {
        self.inner
            .read()
            .content
            .file_records
            .iter()
            .map(|(path, time)| FileInfo::new(path.clone(), *time))
            .collect()
    }

    fn referencing(&self, paths: &FilePathSet) -> FilePathSet {
        let inner = self.inner.read();
        closure(paths, |target| {
            inner
                .content
                .references
                .iter()
                .filter(|(_, to)| to == target)
                .map(|(from, _)| from.clone())
                .collect()
        })
    }

    fn referenced_by(&self, paths: &FilePathSet) -> FilePathSet {
        let inner = self.inner.read();
        closure(paths, |source| {
            inner
                .content
                .references
                .iter()
                .filter(|(from, _)| from == source)
                .map(|(_, to)| to.clone())
                .collect()
        })
    }

    fn project_settings_text(&self) -> String {
        self.inner.read().content.settings_text.clone()
    }

    fn set_project_settings_text(&self, text: &str) -> Result<()> {
        self.inner.write().content.settings_text = text.to_string();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write();
        inner.content = Content::default();
        inner.symbol_cache.clear();
        Ok(())
    }

    fn begin_write(&self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.snapshot.is_some() {
            return Err(DendriteError::storage_write(
                "write transaction already open",
            ));
        }
        inner.snapshot = Some(inner.content.clone());
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.snapshot.take().is_none() {
            return Err(DendriteError::storage_write("no open write transaction"));
        }
        Ok(())
    }

    fn rollback(&self) {
        let mut inner = self.inner.write();
        if let Some(snapshot) = inner.snapshot.take() {
            inner.content = snapshot;
        }
    }

    fn clean_files(&self, paths: &[FilePath]) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.snapshot.is_none() {
            return Err(DendriteError::storage_write(
                "clean requires an open write transaction",
            ));
        }
        let targets: HashSet<&FilePath> = paths.iter().collect();
        inner
            .content
            .file_records
            .retain(|path, _| !targets.contains(path));
        inner.content.symbols.retain(|s| !targets.contains(&s.source));
        inner
            .content
            .references
            .retain(|(from, _)| !targets.contains(from));
        inner
            .content
            .diagnostics
            .retain(|d| !targets.contains(&d.path));
        Ok(())
    }

    fn inject(&self, storage: IntermediateStorage) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.mode != Some(StorageMode::Write) {
            return Err(DendriteError::storage_write(
                "injection requires write mode",
            ));
        }
        // Applied under one lock: either everything below lands or, on an
        // early return, nothing does.
        for info in storage.file_infos {
            inner
                .content
                .file_records
                .insert(info.path, info.last_write_time);
        }
        inner.content.symbols.extend(storage.symbols);
        for reference in storage.references {
            inner.content.references.insert((reference.from, reference.to));
        }
        inner.content.diagnostics.extend(storage.diagnostics);
        Ok(())
    }
}

/// Transitive closure of `expand` applied to `seeds`, excluding the seeds
/// themselves.
fn closure(seeds: &FilePathSet, expand: impl Fn(&FilePath) -> Vec<FilePath>) -> FilePathSet {
    let mut result = FilePathSet::new();
    let mut frontier: Vec<FilePath> = seeds.iter().cloned().collect();
    while let Some(path) = frontier.pop() {
        for next in expand(&path) {
            if !seeds.contains(&next) && result.insert(next.clone()) {
                frontier.push(next);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dendrite_core::intermediate::SymbolKind;

    fn set(paths: &[&str]) -> FilePathSet {
        paths.iter().map(|p| FilePath::from(*p)).collect()
    }

    fn writable() -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage.set_mode(StorageMode::Write).unwrap();
        storage
    }

    fn delta_for(path: &str, symbol: &str) -> IntermediateStorage {
        let mut delta = IntermediateStorage::new();
        delta.add_file_info(FileInfo::new(path, Utc::now()));
        delta.add_symbol(Symbol::new(symbol, SymbolKind::Function, path));
        delta
    }

    #[test]
    fn test_inject_requires_write_mode() {
        let storage = InMemoryStorage::new();
        storage.set_mode(StorageMode::Read).unwrap();
        let err = storage.inject(delta_for("a.cpp", "main")).unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_inject_and_query() {
        let storage = writable();
        storage.inject(delta_for("a.cpp", "main")).unwrap();

        assert!(!storage.is_empty());
        assert_eq!(storage.info_on_all_files().len(), 1);
        assert_eq!(storage.symbols_for(&FilePath::from("a.cpp")).len(), 1);
    }

    #[test]
    fn test_referencing_is_transitive() {
        let storage = writable();
        let mut delta = IntermediateStorage::new();
        // c.cpp -> b.h -> a.h
        delta.add_reference("c.cpp", "b.h");
        delta.add_reference("b.h", "a.h");
        storage.inject(delta).unwrap();

        let referencing = storage.referencing(&set(&["a.h"]));
        assert_eq!(referencing, set(&["b.h", "c.cpp"]));

        let referenced = storage.referenced_by(&set(&["c.cpp"]));
        assert_eq!(referenced, set(&["b.h", "a.h"]));
    }

    #[test]
    fn test_clean_files_removes_all_records_for_path() {
        let storage = writable();
        storage.inject(delta_for("a.cpp", "main")).unwrap();
        storage.inject(delta_for("b.cpp", "helper")).unwrap();

        storage.begin_write().unwrap();
        storage.clean_files(&[FilePath::from("a.cpp")]).unwrap();
        storage.commit().unwrap();
        assert!(storage.symbols_for(&FilePath::from("a.cpp")).is_empty());
        assert_eq!(storage.symbols_for(&FilePath::from("b.cpp")).len(), 1);
        assert_eq!(storage.info_on_all_files().len(), 1);
    }

    #[test]
    fn test_clean_files_requires_open_transaction() {
        let storage = writable();
        storage.inject(delta_for("a.cpp", "main")).unwrap();
        assert!(storage.clean_files(&[FilePath::from("a.cpp")]).is_err());
    }

    #[test]
    fn test_rollback_restores_pre_transaction_content() {
        let storage = writable();
        storage.inject(delta_for("a.cpp", "main")).unwrap();

        storage.begin_write().unwrap();
        storage.clean_files(&[FilePath::from("a.cpp")]).unwrap();
        assert!(storage.is_empty());

        storage.rollback();
        assert!(!storage.is_empty());
        assert_eq!(storage.symbols_for(&FilePath::from("a.cpp")).len(), 1);
    }

    #[test]
    fn test_commit_keeps_changes() {
        let storage = writable();
        storage.inject(delta_for("a.cpp", "main")).unwrap();

        storage.begin_write().unwrap();
        storage.clean_files(&[FilePath::from("a.cpp")]).unwrap();
        storage.commit().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clear_drops_all_content() {
        let storage = writable();
        storage.set_project_settings_text("settings v1").unwrap();
        storage.inject(delta_for("a.cpp", "main")).unwrap();

        storage.clear().unwrap();
        assert!(storage.is_empty());
        assert!(storage.project_settings_text().is_empty());
    }

    #[test]
    fn test_build_caches_indexes_symbols_by_name() {
        let storage = writable();
        storage.inject(delta_for("a.cpp", "main")).unwrap();
        storage.inject(delta_for("b.cpp", "main")).unwrap();

        storage.build_caches();
        let files = storage.files_defining("main");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_incompatible_storage_rejects_mode_change() {
        let storage = InMemoryStorage::new();
        storage.set_incompatible(true);
        assert!(storage.is_incompatible());
        assert!(storage.set_mode(StorageMode::Write).is_err());
    }
}
