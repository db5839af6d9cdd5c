use crate::error::CommonError;
use crate::result::CommonResult;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// File system abstraction for source loading and testing
pub trait FileSystem: Send + Sync {
    /// Check if a regular file exists
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a directory exists
    fn is_dir(&self, path: &Path) -> bool;

    /// Read a whole file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> CommonResult<String>;

    /// List every file below `root`, sorted by path
    fn list_files(&self, root: &Path) -> CommonResult<Vec<PathBuf>>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        if !path.is_file() {
            return Err(CommonError::NotFound(path.to_path_buf()));
        }
        Ok(std::fs::read_to_string(path)?)
    }

    fn list_files(&self, root: &Path) -> CommonResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }

        Ok(files)
    }
}

/// In-memory file system for tests and editor buffers
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file. The path is normalized lexically.
    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files
            .insert(normalize_path(path.as_ref()), contents.into());
    }

    /// Builder-style variant of [`MemoryFileSystem::add_file`]
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.add_file(path, contents);
        self
    }

    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> Option<String> {
        self.files.remove(&normalize_path(path.as_ref()))
    }
}

impl FileSystem for MemoryFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let dir = normalize_path(path);
        self.files
            .keys()
            .any(|file| file != &dir && file.starts_with(&dir))
    }

    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        self.files
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| CommonError::NotFound(path.to_path_buf()))
    }

    fn list_files(&self, root: &Path) -> CommonResult<Vec<PathBuf>> {
        let root = normalize_path(root);
        Ok(self
            .files
            .keys()
            .filter(|file| file.starts_with(&root))
            .cloned()
            .collect())
    }
}

/// Resolve `.` and `..` segments without touching the disk
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/project/src/./components/../Button.ts")),
            PathBuf::from("/project/src/Button.ts")
        );
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_memory_file_system() {
        let fs = MemoryFileSystem::new()
            .with_file("/project/src/Button.vue", "<template></template>")
            .with_file("/project/src/props.ts", "export interface Props {}");

        assert!(fs.is_file(Path::new("/project/src/Button.vue")));
        assert!(fs.is_file(Path::new("/project/src/../src/props.ts")));
        assert!(fs.is_dir(Path::new("/project/src")));
        assert!(!fs.is_file(Path::new("/project/src")));
        assert_eq!(
            fs.read_to_string(Path::new("/project/src/props.ts")).unwrap(),
            "export interface Props {}"
        );
        assert!(matches!(
            fs.read_to_string(Path::new("/project/missing.ts")),
            Err(CommonError::NotFound(_))
        ));
        assert_eq!(fs.list_files(Path::new("/project")).unwrap().len(), 2);

        let mut fs = fs;
        assert!(fs.remove_file("/project/src/props.ts").is_some());
        assert!(!fs.is_file(Path::new("/project/src/props.ts")));
    }

    #[test]
    fn test_real_file_system_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.ts"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("a.vue"), "").unwrap();

        let files = RealFileSystem.list_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(RealFileSystem.is_file(&dir.path().join("b.ts")));
        assert!(RealFileSystem.is_dir(&dir.path().join("nested")));
    }
}
