//! Source group implementations.

use std::path::PathBuf;

use globset::GlobSet;
use walkdir::{DirEntry, WalkDir};

use dendrite_core::traits::SourceGroup;
use dendrite_core::types::{FilePath, FilePathSet, IndexerCommand, Language};

/// Check if a directory entry is hidden (starts with dot).
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Source group discovering files by walking directories.
///
/// Discovery honors include/exclude glob sets and skips hidden entries; a file
/// belongs to the group when its extension is among the configured source
/// extensions.
pub struct DirectorySourceGroup {
    language: Language,
    roots: Vec<PathBuf>,
    include: GlobSet,
    exclude: GlobSet,
    extensions: Vec<String>,
    compiler_args: Vec<String>,
}

impl DirectorySourceGroup {
    pub fn new(language: Language, roots: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            language,
            roots,
            include: GlobSet::empty(),
            exclude: GlobSet::empty(),
            extensions,
            compiler_args: Vec::new(),
        }
    }

    pub fn with_include(mut self, include: GlobSet) -> Self {
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: GlobSet) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_compiler_args(mut self, args: Vec<String>) -> Self {
        self.compiler_args = args;
        self
    }

    fn matches(&self, path: &FilePath) -> bool {
        let included = self.include.is_empty() || self.include.is_match(path.as_path());
        let excluded = !self.exclude.is_empty() && self.exclude.is_match(path.as_path());
        let extension_matches = path
            .extension()
            .map(|ext| self.extensions.iter().any(|e| e == &ext))
            .unwrap_or(false);
        included && !excluded && extension_matches
    }
}

impl SourceGroup for DirectorySourceGroup {
    fn language(&self) -> Language {
        self.language
    }

    fn prepare_refresh(&self) -> bool {
        self.roots.iter().all(|root| root.exists())
    }

    fn all_source_paths(&self) -> FilePathSet {
        let mut paths = FilePathSet::new();
        for root in &self.roots {
            if root.is_file() {
                let path = FilePath::from(root.as_path());
                if self.matches(&path) {
                    paths.insert(path);
                }
                continue;
            }
            for entry in WalkDir::new(root)
                .into_iter()
                .filter_entry(|e| !is_hidden(e))
                .flatten()
            {
                if !entry.path().is_file() {
                    continue;
                }
                let path = FilePath::from(entry.path());
                if self.matches(&path) {
                    paths.insert(path);
                }
            }
        }
        paths
    }

    fn indexer_commands(&self, paths: &FilePathSet) -> Vec<IndexerCommand> {
        let own = self.all_source_paths();
        paths
            .iter()
            .filter(|path| own.contains(*path))
            .map(|path| {
                IndexerCommand::new(path.clone(), self.language)
                    .with_compiler_args(self.compiler_args.clone())
            })
            .collect()
    }
}

/// Source group over a fixed list of files, for embedders that already know
/// their file set (compilation databases, test fixtures).
pub struct FixedSourceGroup {
    language: Language,
    paths: FilePathSet,
    compiler_args: Vec<String>,
}

impl FixedSourceGroup {
    pub fn new(language: Language, paths: FilePathSet) -> Self {
        Self {
            language,
            paths,
            compiler_args: Vec::new(),
        }
    }

    pub fn with_compiler_args(mut self, args: Vec<String>) -> Self {
        self.compiler_args = args;
        self
    }
}

impl SourceGroup for FixedSourceGroup {
    fn language(&self) -> Language {
        self.language
    }

    fn all_source_paths(&self) -> FilePathSet {
        self.paths.clone()
    }

    fn indexer_commands(&self, paths: &FilePathSet) -> Vec<IndexerCommand> {
        paths
            .iter()
            .filter(|path| self.paths.contains(*path))
            .map(|path| {
                IndexerCommand::new(path.clone(), self.language)
                    .with_compiler_args(self.compiler_args.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_directory_group_discovers_by_extension() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("a.cpp"), "int main() {}").unwrap();
        fs::write(src.join("b.cpp"), "void f() {}").unwrap();
        fs::write(src.join("readme.md"), "docs").unwrap();
        fs::write(src.join(".hidden.cpp"), "skipped").unwrap();

        let group = DirectorySourceGroup::new(
            Language::Cpp,
            vec![src],
            vec!["cpp".to_string()],
        );

        let paths = group.all_source_paths();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.extension() == Some("cpp".to_string())));
    }

    #[test]
    fn test_commands_only_for_own_files() {
        let mut paths = FilePathSet::new();
        paths.insert(FilePath::from("a.cpp"));
        let group = FixedSourceGroup::new(Language::Cpp, paths)
            .with_compiler_args(vec!["-std=c++17".to_string()]);

        let mut requested = FilePathSet::new();
        requested.insert(FilePath::from("a.cpp"));
        requested.insert(FilePath::from("other.java"));

        let commands = group.indexer_commands(&requested);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].source_path, FilePath::from("a.cpp"));
        assert_eq!(commands[0].compiler_args, vec!["-std=c++17".to_string()]);
    }

    #[test]
    fn test_default_paths_to_index_excludes_static_files() {
        let mut paths = FilePathSet::new();
        paths.insert(FilePath::from("a.cpp"));
        paths.insert(FilePath::from("b.cpp"));
        let group = FixedSourceGroup::new(Language::Cpp, paths);

        let mut static_paths = FilePathSet::new();
        static_paths.insert(FilePath::from("b.cpp"));

        let to_index = group.source_paths_to_index(&static_paths);
        assert_eq!(to_index.len(), 1);
        assert!(to_index.contains(&FilePath::from("a.cpp")));
    }

    #[test]
    fn test_prepare_refresh_fails_for_missing_root() {
        let group = DirectorySourceGroup::new(
            Language::Cpp,
            vec![PathBuf::from("/definitely/not/here")],
            vec!["cpp".to_string()],
        );
        assert!(!group.prepare_refresh());
    }
}
