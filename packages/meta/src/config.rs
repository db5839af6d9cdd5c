use crate::error::ConfigError;
use component_meta_checker::{has_source_extension, CompilerOptions};
use component_meta_common::{normalize_path, FileSystem};
use glob::{MatchOptions, Pattern};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_NAME: &str = "tsconfig.json";

const DEFAULT_EXCLUDE: [&str; 3] = ["node_modules", "bower_components", "jspm_packages"];

/// The fields of a tsconfig-style file that affect metadata extraction
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    extends: Option<String>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    files: Option<Vec<String>>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    strict: Option<bool>,
    strict_null_checks: Option<bool>,
}

/// One config of an `extends` chain, with the directory its globs are relative to
struct ChainEntry {
    dir: PathBuf,
    raw: RawConfig,
}

/// Resolved project configuration
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Directory of the leaf config; project files are walked from here
    pub root: PathBuf,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    files: Vec<PathBuf>,
    /// Unrestricted configs admit every source file (single-file mode)
    restricted: bool,
    pub strict_null_checks: bool,
}

impl ProjectConfig {
    /// Load a config file and the chain of configs it extends
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, ConfigError> {
        let path = normalize_path(path);
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut visited = HashSet::new();
        visited.insert(path.clone());

        let raw = read_config(fs, &path)?;
        let chain = resolve_chain(fs, &root, raw, &mut visited)?;
        debug!(config = %path.display(), depth = chain.len(), "loaded project config");
        Self::from_chain(root, chain)
    }

    /// Build a config from an in-memory JSON value rooted at `root`
    pub fn from_json(fs: &dyn FileSystem, root: &Path, json: &serde_json::Value) -> Result<Self, ConfigError> {
        let root = normalize_path(root);
        let raw: RawConfig =
            serde_json::from_value(json.clone()).map_err(|source| ConfigError::Invalid {
                path: root.join(DEFAULT_CONFIG_NAME),
                source,
            })?;

        let mut visited = HashSet::new();
        let chain = resolve_chain(fs, &root, raw, &mut visited)?;
        Self::from_chain(root, chain)
    }

    /// A synthesized config admitting every source file, with strict null checks
    pub fn single_file() -> Self {
        Self {
            root: PathBuf::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            files: Vec::new(),
            restricted: false,
            strict_null_checks: true,
        }
    }

    fn from_chain(root: PathBuf, chain: Vec<ChainEntry>) -> Result<Self, ConfigError> {
        // The nearest config defining a field wins, and its globs are relative to it
        let include = chain.iter().find_map(|entry| entry.raw.include.as_ref().map(|i| (entry, i)));
        let exclude = chain.iter().find_map(|entry| entry.raw.exclude.as_ref().map(|e| (entry, e)));
        let files = chain.iter().find_map(|entry| entry.raw.files.as_ref().map(|f| (entry, f)));

        let include = match (include, files) {
            (Some((entry, patterns)), _) => compile_patterns(&entry.dir, patterns)?,
            // Explicit `files` without `include` admits nothing else
            (None, Some(_)) => Vec::new(),
            (None, None) => compile_patterns(&root, &["**/*".to_string()])?,
        };
        let exclude = match exclude {
            Some((entry, patterns)) => compile_patterns(&entry.dir, patterns)?,
            None => {
                let defaults: Vec<String> = DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect();
                compile_patterns(&root, &defaults)?
            }
        };
        let files = files
            .map(|(entry, files)| files.iter().map(|file| normalize_path(&entry.dir.join(file))).collect())
            .unwrap_or_default();

        let strict = chain.iter().find_map(|entry| entry.raw.compiler_options.strict);
        let strict_null_checks = chain
            .iter()
            .find_map(|entry| entry.raw.compiler_options.strict_null_checks)
            .or(strict)
            .unwrap_or(true);

        Ok(Self {
            root,
            include,
            exclude,
            files,
            restricted: true,
            strict_null_checks,
        })
    }

    /// True when `path` is a source file admitted by this project
    pub fn includes(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        if !has_source_extension(&path.to_string_lossy()) {
            return false;
        }
        if !self.restricted || self.files.contains(&path) {
            return true;
        }

        let options = match_options();
        self.include.iter().any(|pattern| pattern.matches_path_with(&path, options))
            && !self.exclude.iter().any(|pattern| pattern.matches_path_with(&path, options))
    }

    /// Every project file under the root, sorted; empty in single-file mode
    pub fn project_files(&self, fs: &dyn FileSystem) -> Result<Vec<PathBuf>, ConfigError> {
        if !self.restricted {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs
            .list_files(&self.root)
            .map_err(|source| ConfigError::Walk {
                root: self.root.clone(),
                source,
            })?
            .into_iter()
            .filter(|path| self.includes(path))
            .collect();

        for file in &self.files {
            if !files.contains(file) && fs.is_file(file) {
                files.push(file.clone());
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn compiler_options(&self, force_typed: bool) -> CompilerOptions {
        CompilerOptions {
            strict_null_checks: self.strict_null_checks,
            force_typed,
            ..Default::default()
        }
    }
}

fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    }
}

fn read_config(fs: &dyn FileSystem, path: &Path) -> Result<RawConfig, ConfigError> {
    let text = fs.read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = json5::from_str(&text).map_err(|source| ConfigError::Json5 {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_value(value).map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Follow `extends` from `raw`, nearest config first
fn resolve_chain(
    fs: &dyn FileSystem,
    dir: &Path,
    raw: RawConfig,
    visited: &mut HashSet<PathBuf>,
) -> Result<Vec<ChainEntry>, ConfigError> {
    let mut chain = Vec::new();
    let mut next = Some((dir.to_path_buf(), raw));

    while let Some((dir, raw)) = next.take() {
        if let Some(extends) = &raw.extends {
            if extends.starts_with('.') || extends.starts_with('/') {
                let mut base = normalize_path(&dir.join(extends));
                if !fs.is_file(&base) && !base.to_string_lossy().ends_with(".json") {
                    base = PathBuf::from(format!("{}.json", base.display()));
                }

                if !visited.insert(base.clone()) {
                    return Err(ConfigError::ExtendsCycle(base));
                }

                if fs.is_file(&base) {
                    let parent = read_config(fs, &base)?;
                    let base_dir = base.parent().map(Path::to_path_buf).unwrap_or_default();
                    next = Some((base_dir, parent));
                } else {
                    warn!(extends = %base.display(), "extended config not found");
                }
            } else {
                warn!(extends = %extends, "package configs are not followed");
            }
        }
        chain.push(ChainEntry { dir, raw });
    }

    Ok(chain)
}

/// Compile include/exclude entries; a bare directory means everything below it
fn compile_patterns(dir: &Path, patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            let last = pattern.rsplit('/').next().unwrap_or(pattern);
            let expanded = if last.contains('*') || last.contains('?') || last.contains('.') {
                pattern.clone()
            } else {
                format!("{}/**/*", pattern.trim_end_matches('/'))
            };
            let absolute = normalize_path(&dir.join(&expanded));
            let text = absolute.to_string_lossy().to_string();
            Pattern::new(&text).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_meta_common::MemoryFileSystem;

    #[test]
    fn test_extends_chain_and_comments() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/repo/tsconfig.base.json",
                "{\n  // shared\n  compilerOptions: { strict: false, },\n  include: ['src'],\n}\n",
            )
            .with_file(
                "/repo/app/tsconfig.json",
                r#"{ "extends": "../tsconfig.base.json", "compilerOptions": { "strictNullChecks": true } }"#,
            )
            .with_file("/repo/src/Button.vue", "")
            .with_file("/repo/app/Other.vue", "");

        let config = ProjectConfig::load(&fs, Path::new("/repo/app/tsconfig.json")).unwrap();
        assert_eq!(config.root, PathBuf::from("/repo/app"));
        assert!(config.strict_null_checks);
        // `include` is inherited relative to the config that declares it
        assert!(config.includes(Path::new("/repo/src/Button.vue")));
        assert!(!config.includes(Path::new("/repo/app/Other.vue")));
    }

    #[test]
    fn test_extends_without_json_suffix() {
        let fs = MemoryFileSystem::new()
            .with_file("/repo/base.json", r#"{ "compilerOptions": { "strict": false } }"#)
            .with_file("/repo/tsconfig.json", r#"{ "extends": "./base" }"#);

        let config = ProjectConfig::load(&fs, Path::new("/repo/tsconfig.json")).unwrap();
        assert!(!config.strict_null_checks);
    }

    #[test]
    fn test_extends_cycle() {
        let fs = MemoryFileSystem::new()
            .with_file("/repo/a.json", r#"{ "extends": "./b.json" }"#)
            .with_file("/repo/b.json", r#"{ "extends": "./a.json" }"#);

        assert!(matches!(
            ProjectConfig::load(&fs, Path::new("/repo/a.json")),
            Err(ConfigError::ExtendsCycle(_))
        ));
    }

    #[test]
    fn test_missing_extends_only_warns() {
        let fs = MemoryFileSystem::new().with_file("/repo/tsconfig.json", r#"{ "extends": "./missing.json" }"#);
        let config = ProjectConfig::load(&fs, Path::new("/repo/tsconfig.json")).unwrap();
        assert!(config.includes(Path::new("/repo/src/a.ts")));
    }

    #[test]
    fn test_malformed_config() {
        let fs = MemoryFileSystem::new().with_file("/repo/tsconfig.json", "{ include: [ }");
        assert!(matches!(
            ProjectConfig::load(&fs, Path::new("/repo/tsconfig.json")),
            Err(ConfigError::Json5 { .. })
        ));
        assert!(matches!(
            ProjectConfig::load(&fs, Path::new("/repo/other.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_from_json_defaults() {
        let fs = MemoryFileSystem::new()
            .with_file("/repo/src/Button.vue", "")
            .with_file("/repo/src/readme.md", "")
            .with_file("/repo/node_modules/lib/index.ts", "");

        let config = ProjectConfig::from_json(&fs, Path::new("/repo"), &serde_json::json!({})).unwrap();
        assert_eq!(
            config.project_files(&fs).unwrap(),
            vec![PathBuf::from("/repo/src/Button.vue")]
        );
    }

    #[test]
    fn test_files_and_exclude() {
        let fs = MemoryFileSystem::new()
            .with_file("/repo/a.ts", "")
            .with_file("/repo/src/b.ts", "")
            .with_file("/repo/src/b.spec.ts", "");

        let config = ProjectConfig::from_json(
            &fs,
            Path::new("/repo"),
            &serde_json::json!({ "files": ["a.ts"], "include": ["src/**/*"], "exclude": ["**/*.spec.ts"] }),
        )
        .unwrap();

        assert_eq!(
            config.project_files(&fs).unwrap(),
            vec![PathBuf::from("/repo/a.ts"), PathBuf::from("/repo/src/b.ts")]
        );
    }

    #[test]
    fn test_single_file_admits_everything() {
        let config = ProjectConfig::single_file();
        assert!(config.includes(Path::new("/anywhere/Comp.vue")));
        assert!(!config.includes(Path::new("/anywhere/notes.txt")));
    }
}
