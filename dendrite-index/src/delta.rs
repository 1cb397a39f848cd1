//! Delta planner computing the minimum reindex work.

use std::sync::Arc;

use tracing::{debug, warn};

use dendrite_core::traits::{FileQuery, PersistentStorage, SourceGroup};
use dendrite_core::types::FilePathSet;

/// Result of delta analysis: what to clean and what to reparse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshPlan {
    /// Files whose records must be removed before indexing.
    pub files_to_clean: FilePathSet,
    /// Files to hand to the parser workers.
    pub files_to_index: FilePathSet,
    /// Every source path governed by the project's source groups.
    pub all_source_paths: FilePathSet,
    /// Whether this plan clears the database and reindexes everything.
    pub full: bool,
}

impl RefreshPlan {
    /// A plan with nothing to clean and nothing to index is a no-op.
    pub fn is_noop(&self) -> bool {
        self.files_to_clean.is_empty() && self.files_to_index.is_empty()
    }
}

/// Compute the refresh plan from filesystem timestamps and the reference graph
/// stored in the persistent storage.
///
/// Pure given its inputs: all filesystem access goes through `files`, all
/// database access through `storage`. With `full_refresh` the analysis is
/// skipped entirely and every source file is scheduled.
pub fn plan_refresh(
    source_groups: &[Arc<dyn SourceGroup>],
    storage: &dyn PersistentStorage,
    files: &dyn FileQuery,
    full_refresh: bool,
) -> RefreshPlan {
    let mut all_source_paths = FilePathSet::new();
    for group in source_groups {
        all_source_paths.extend(group.all_source_paths());
    }

    if full_refresh {
        return RefreshPlan {
            files_to_clean: FilePathSet::new(),
            files_to_index: all_source_paths.clone(),
            all_source_paths,
            full: true,
        };
    }

    // Partition persisted files by timestamp; missing files count as changed.
    let known_records = storage.info_on_all_files();
    let mut unchanged = FilePathSet::new();
    let mut changed = FilePathSet::new();
    for record in &known_records {
        match files.file_info(&record.path) {
            Some(on_disk) if on_disk.last_write_time <= record.last_write_time => {
                unchanged.insert(record.path.clone());
            }
            Some(_) => {
                changed.insert(record.path.clone());
            }
            None => {
                changed.insert(record.path.clone());
            }
        }
    }

    // Any file transitively referencing a changed file must be recleaned.
    let mut files_to_clean = changed.clone();
    files_to_clean.extend(storage.referencing(&changed));

    let static_sources: FilePathSet = all_source_paths.difference(&changed).cloned().collect();

    // A file only referenced by changed files may no longer be referenced at
    // all; clean it so it gets re-discovered if still needed.
    let static_referenced = storage.referenced_by(&static_sources);
    let dynamic_referenced = storage.referenced_by(&changed);
    let known: FilePathSet = known_records.iter().map(|r| r.path.clone()).collect();
    for path in dynamic_referenced {
        if !known.contains(&path) && files.file_info(&path).is_none() {
            warn!(%path, "reference graph names an unknown file, cleaning defensively");
            files_to_clean.insert(path);
        } else if !static_referenced.contains(&path) && !static_sources.contains(&path) {
            files_to_clean.insert(path);
        }
    }

    // Source files never parsed before.
    let files_to_add: FilePathSet = static_sources.difference(&unchanged).cloned().collect();

    // Files considered up to date; the groups decide what else needs indexing
    // (e.g. after compiler-flag changes).
    let static_paths: FilePathSet = all_source_paths
        .iter()
        .filter(|p| !files_to_clean.contains(*p) && !files_to_add.contains(*p))
        .cloned()
        .collect();

    let mut files_to_index = FilePathSet::new();
    for group in source_groups {
        files_to_index.extend(group.source_paths_to_index(&static_paths));
    }

    debug!(
        clean = files_to_clean.len(),
        index = files_to_index.len(),
        total = all_source_paths.len(),
        "computed refresh plan"
    );

    RefreshPlan {
        files_to_clean,
        files_to_index,
        all_source_paths,
        full: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_storage::InMemoryStorage;
    use crate::source_group::FixedSourceGroup;
    use chrono::{Duration, Utc};
    use dendrite_core::fs::StaticFileQuery;
    use dendrite_core::intermediate::IntermediateStorage;
    use dendrite_core::types::{FileInfo, FilePath, Language, StorageMode};

    fn set(paths: &[&str]) -> FilePathSet {
        paths.iter().map(|p| FilePath::from(*p)).collect()
    }

    fn storage_with(records: &[(&str, chrono::DateTime<Utc>)], references: &[(&str, &str)]) -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage.set_mode(StorageMode::Write).unwrap();
        let mut delta = IntermediateStorage::new();
        for (path, time) in records {
            delta.add_file_info(FileInfo::new(*path, *time));
        }
        for (from, to) in references {
            delta.add_reference(*from, *to);
        }
        storage.inject(delta).unwrap();
        storage.set_mode(StorageMode::Read).unwrap();
        storage
    }

    fn groups(paths: &[&str]) -> Vec<Arc<dyn SourceGroup>> {
        vec![Arc::new(FixedSourceGroup::new(Language::Cpp, set(paths)))]
    }

    #[test]
    fn test_single_file_edit_reindexes_only_that_file() {
        // S2: a.cpp edited after last index, b.cpp untouched.
        let base = Utc::now();
        let storage = storage_with(&[("a.cpp", base), ("b.cpp", base)], &[]);
        let mut files = StaticFileQuery::new();
        files.insert("a.cpp", base + Duration::seconds(1));
        files.insert("b.cpp", base);

        let plan = plan_refresh(&groups(&["a.cpp", "b.cpp"]), &storage, &files, false);
        assert_eq!(plan.files_to_clean, set(&["a.cpp"]));
        assert_eq!(plan.files_to_index, set(&["a.cpp"]));
        assert!(!plan.full);
    }

    #[test]
    fn test_header_change_ripples_to_including_source() {
        // S3: h.h changed; a.cpp includes it.
        let base = Utc::now();
        let storage = storage_with(
            &[("a.cpp", base), ("h.h", base)],
            &[("a.cpp", "h.h")],
        );
        let mut files = StaticFileQuery::new();
        files.insert("a.cpp", base);
        files.insert("h.h", base + Duration::seconds(1));

        let plan = plan_refresh(&groups(&["a.cpp"]), &storage, &files, false);
        assert_eq!(plan.files_to_clean, set(&["a.cpp", "h.h"]));
        assert_eq!(plan.files_to_index, set(&["a.cpp"]));
    }

    #[test]
    fn test_removed_file_is_cleaned_but_not_indexed() {
        // S4: c.cpp present in the database, gone from disk.
        let base = Utc::now();
        let storage = storage_with(&[("a.cpp", base), ("c.cpp", base)], &[]);
        let mut files = StaticFileQuery::new();
        files.insert("a.cpp", base);

        let plan = plan_refresh(&groups(&["a.cpp"]), &storage, &files, false);
        assert!(plan.files_to_clean.contains(&FilePath::from("c.cpp")));
        assert!(!plan.files_to_index.contains(&FilePath::from("c.cpp")));
        assert!(plan.files_to_index.is_empty());
    }

    #[test]
    fn test_new_source_file_is_indexed() {
        let base = Utc::now();
        let storage = storage_with(&[("a.cpp", base)], &[]);
        let mut files = StaticFileQuery::new();
        files.insert("a.cpp", base);
        files.insert("b.cpp", base);

        let plan = plan_refresh(&groups(&["a.cpp", "b.cpp"]), &storage, &files, false);
        assert!(plan.files_to_clean.is_empty());
        assert_eq!(plan.files_to_index, set(&["b.cpp"]));
    }

    #[test]
    fn test_orphaned_reference_is_cleaned_for_rediscovery() {
        // h.h is referenced only by the changed a.cpp; it may no longer be
        // referenced after the reparse.
        let base = Utc::now();
        let storage = storage_with(
            &[("a.cpp", base), ("b.cpp", base), ("h.h", base)],
            &[("a.cpp", "h.h")],
        );
        let mut files = StaticFileQuery::new();
        files.insert("a.cpp", base + Duration::seconds(1));
        files.insert("b.cpp", base);
        files.insert("h.h", base);

        let plan = plan_refresh(&groups(&["a.cpp", "b.cpp"]), &storage, &files, false);
        assert!(plan.files_to_clean.contains(&FilePath::from("h.h")));
    }

    #[test]
    fn test_unknown_referenced_path_is_cleaned_defensively() {
        let base = Utc::now();
        let storage = storage_with(
            &[("a.cpp", base)],
            &[("a.cpp", "ghost.h")],
        );
        let mut files = StaticFileQuery::new();
        files.insert("a.cpp", base + Duration::seconds(1));

        let plan = plan_refresh(&groups(&["a.cpp"]), &storage, &files, false);
        assert!(plan.files_to_clean.contains(&FilePath::from("ghost.h")));
    }

    #[test]
    fn test_full_refresh_skips_analysis() {
        let base = Utc::now();
        let storage = storage_with(&[("a.cpp", base)], &[]);
        let files = StaticFileQuery::new();

        let plan = plan_refresh(&groups(&["a.cpp", "b.cpp"]), &storage, &files, true);
        assert!(plan.files_to_clean.is_empty());
        assert_eq!(plan.files_to_index, set(&["a.cpp", "b.cpp"]));
        assert!(plan.full);
    }

    #[test]
    fn test_unchanged_project_is_noop() {
        let base = Utc::now();
        let storage = storage_with(&[("a.cpp", base)], &[]);
        let mut files = StaticFileQuery::new();
        files.insert("a.cpp", base);

        let plan = plan_refresh(&groups(&["a.cpp"]), &storage, &files, false);
        assert!(plan.is_noop());
    }
}
