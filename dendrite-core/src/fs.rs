//! Filesystem access helpers.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::traits::FileQuery;
use crate::types::{FileInfo, FilePath, Timestamp};

/// Info for the file at `path`, or `None` if it does not exist or cannot be
/// statted.
pub fn file_info_for_path(path: &FilePath) -> Option<FileInfo> {
    let metadata = std::fs::metadata(path.as_path()).ok()?;
    let modified = metadata.modified().ok()?;
    Some(FileInfo::new(path.clone(), DateTime::<Utc>::from(modified)))
}

pub fn create_directory(path: impl AsRef<Path>) -> Result<()> {
    std::fs::create_dir_all(path.as_ref())?;
    Ok(())
}

pub fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    std::fs::remove_file(path.as_ref())?;
    Ok(())
}

/// [`FileQuery`] over the real filesystem.
#[derive(Debug, Default)]
pub struct OsFileQuery;

impl FileQuery for OsFileQuery {
    fn file_info(&self, path: &FilePath) -> Option<FileInfo> {
        file_info_for_path(path)
    }
}

/// [`FileQuery`] over a fixed map, for tests and dry runs.
#[derive(Debug, Default)]
pub struct StaticFileQuery {
    infos: HashMap<FilePath, Timestamp>,
}

impl StaticFileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<FilePath>, last_write_time: Timestamp) {
        self.infos.insert(path.into(), last_write_time);
    }

    pub fn remove(&mut self, path: &FilePath) {
        self.infos.remove(path);
    }
}

impl FileQuery for StaticFileQuery {
    fn file_info(&self, path: &FilePath) -> Option<FileInfo> {
        self.infos
            .get(path)
            .map(|time| FileInfo::new(path.clone(), *time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_info_for_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.cpp");
        std::fs::write(&file, "int main() {}").unwrap();

        let path = FilePath::from(file.as_path());
        let info = file_info_for_path(&path).unwrap();
        assert_eq!(info.path, path);
        assert!(info.last_write_time <= Utc::now());
    }

    #[test]
    fn test_file_info_for_missing_file() {
        let path = FilePath::from("/nonexistent/definitely/missing.cpp");
        assert!(file_info_for_path(&path).is_none());
    }

    #[test]
    fn test_static_file_query() {
        let mut query = StaticFileQuery::new();
        let now = Utc::now();
        query.insert("a.cpp", now);

        let found = query.file_info(&FilePath::from("a.cpp")).unwrap();
        assert_eq!(found.last_write_time, now);
        assert!(query.file_info(&FilePath::from("b.cpp")).is_none());

        query.remove(&FilePath::from("a.cpp"));
        assert!(query.file_info(&FilePath::from("a.cpp")).is_none());
    }
}
