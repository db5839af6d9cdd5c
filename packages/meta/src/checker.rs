use crate::adapter::TypeChecker;
use crate::classifier::{Classification, Classifier};
use crate::config::ProjectConfig;
use crate::error::{MetaError, MetaResult};
use crate::events::extract_events;
use crate::merger::build_property;
use crate::options::MetaCheckerOptions;
use crate::schema::SchemaContext;
use crate::slots::extract_slots;
use crate::types::{ComponentKind, ComponentMeta, PropertyMeta, GLOBAL_ATTRIBUTES};
use component_meta_checker::{FileId, Program, ValueSymbol};
use component_meta_common::{normalize_path, FileSystem, RealFileSystem};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Extracts component metadata from the files of one project
///
/// Every query builds a fresh [`Program`] over the current file contents, so
/// edits between queries are always observed and concurrent queries never
/// share state.
pub struct ComponentMetaChecker {
    fs: Arc<dyn FileSystem>,
    config: ProjectConfig,
    options: MetaCheckerOptions,
}

impl ComponentMetaChecker {
    /// Project described by a tsconfig-style file on disk
    pub fn from_tsconfig(path: impl AsRef<Path>, options: MetaCheckerOptions) -> MetaResult<Self> {
        Self::from_tsconfig_with_fs(Arc::new(RealFileSystem), path, options)
    }

    pub fn from_tsconfig_with_fs(
        fs: Arc<dyn FileSystem>,
        path: impl AsRef<Path>,
        options: MetaCheckerOptions,
    ) -> MetaResult<Self> {
        options.validate()?;
        let config = ProjectConfig::load(fs.as_ref(), path.as_ref())?;
        info!(config = %path.as_ref().display(), root = %config.root.display(), "created component meta checker");
        Ok(Self { fs, config, options })
    }

    /// Project described by an in-memory config whose `extends` resolves from `root`
    pub fn from_json_config(
        root: impl AsRef<Path>,
        json: &serde_json::Value,
        options: MetaCheckerOptions,
    ) -> MetaResult<Self> {
        Self::from_json_config_with_fs(Arc::new(RealFileSystem), root, json, options)
    }

    pub fn from_json_config_with_fs(
        fs: Arc<dyn FileSystem>,
        root: impl AsRef<Path>,
        json: &serde_json::Value,
        options: MetaCheckerOptions,
    ) -> MetaResult<Self> {
        options.validate()?;
        let config = ProjectConfig::from_json(fs.as_ref(), root.as_ref(), json)?;
        info!(root = %config.root.display(), "created component meta checker from JSON config");
        Ok(Self { fs, config, options })
    }

    /// No project config: every source file is admitted, with strict null checks
    pub fn for_single_file(options: MetaCheckerOptions) -> MetaResult<Self> {
        Self::for_single_file_with_fs(Arc::new(RealFileSystem), options)
    }

    pub fn for_single_file_with_fs(fs: Arc<dyn FileSystem>, options: MetaCheckerOptions) -> MetaResult<Self> {
        options.validate()?;
        Ok(Self {
            fs,
            config: ProjectConfig::single_file(),
            options,
        })
    }

    pub fn options(&self) -> &MetaCheckerOptions {
        &self.options
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Metadata of the default export of `path`
    pub fn get_component_meta(&self, path: &Path) -> MetaResult<ComponentMeta> {
        self.get_component_meta_for_export(path, "default")
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn get_component_meta_for_export(&self, path: &Path, export: &str) -> MetaResult<ComponentMeta> {
        let (mut program, file) = self.open(path)?;
        let symbol = self.resolve_export(&mut program, file, path, export)?;

        let meta = self.build_meta(&mut program, symbol);
        debug!(
            kind = ?meta.kind,
            props = meta.props.len(),
            events = meta.events.len(),
            slots = meta.slots.len(),
            "extracted component meta"
        );
        Ok(meta)
    }

    /// Export names of `path` that are components, `default` first
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn get_exported_components(&self, path: &Path) -> MetaResult<Vec<String>> {
        let (mut program, file) = self.open(path)?;
        let names = program.file(file).export_names();

        let mut components = Vec::new();
        for name in names {
            let Some(symbol) = program.resolve_export_value(file, &name, &mut HashSet::new()) else {
                continue;
            };
            if Classifier::new(&mut program).classify(symbol).kind != ComponentKind::Unknown {
                components.push(name);
            }
        }
        Ok(components)
    }

    /// Source files admitted by the project config, sorted
    pub fn project_files(&self) -> MetaResult<Vec<PathBuf>> {
        Ok(self.config.project_files(self.fs.as_ref())?)
    }

    fn open(&self, path: &Path) -> MetaResult<(Program, FileId)> {
        let path = normalize_path(path);
        if !self.config.includes(&path) {
            return Err(MetaError::NotInProject(path));
        }

        let options = self.config.compiler_options(self.options.force_typed_analysis);
        let mut program = Program::new(Arc::clone(&self.fs), options);
        let file = program.load(&path)?;
        Ok((program, file))
    }

    fn resolve_export(
        &self,
        program: &mut Program,
        file: FileId,
        path: &Path,
        export: &str,
    ) -> MetaResult<ValueSymbol> {
        program
            .resolve_export_value(file, export, &mut HashSet::new())
            .ok_or_else(|| MetaError::UnknownExport {
                path: path.to_path_buf(),
                export: export.to_string(),
            })
    }

    fn schema_context(&self) -> SchemaContext<'_> {
        SchemaContext {
            ignore: self.options.ignored_types(),
            enabled: self.options.schema_enabled(),
            declarations: !self.options.suppress_declaration_sites,
        }
    }

    fn build_meta(&self, program: &mut Program, symbol: ValueSymbol) -> ComponentMeta {
        let classification = Classifier::new(program).classify(symbol);
        if classification.kind == ComponentKind::Unknown {
            return ComponentMeta::unknown();
        }
        let ctx = self.schema_context();

        let mut props = self.declared_props(program, &classification, &ctx);
        if classification.has_globals() {
            self.append_globals(program, &mut props, &ctx);
        }

        let events = match &classification.emits {
            Some(emits) => extract_events(program, emits, &ctx),
            None => Vec::new(),
        };
        let slots = match classification.slots {
            Some(slots) => extract_slots(program, slots, &ctx),
            None => Vec::new(),
        };

        ComponentMeta {
            kind: classification.kind,
            props,
            events,
            slots,
        }
    }

    fn declared_props(
        &self,
        program: &Program,
        classification: &Classification,
        ctx: &SchemaContext<'_>,
    ) -> Vec<PropertyMeta> {
        let Some(props) = classification.props else {
            return Vec::new();
        };
        let newline = self.options.newline();
        let arena = program.arena();

        TypeChecker::properties(arena, props)
            .iter()
            .map(|property| {
                let mut meta = build_property(arena, property, ctx, &mut HashSet::new());
                meta.default = classification.defaults.resolve_default(&meta.name, newline);
                meta
            })
            .collect()
    }

    /// Global attributes in canonical order, skipping names the component declares itself
    fn append_globals(&self, program: &mut Program, props: &mut Vec<PropertyMeta>, ctx: &SchemaContext<'_>) {
        let globals = program.global_attributes();
        let arena = program.arena();
        let properties = TypeChecker::properties(arena, globals);

        for name in GLOBAL_ATTRIBUTES {
            if props.iter().any(|prop| prop.name == name) {
                continue;
            }
            let Some(property) = properties.iter().find(|property| property.name == name) else {
                continue;
            };
            let mut meta = build_property(arena, property, ctx, &mut HashSet::new());
            meta.global = true;
            meta.tags.clear();
            meta.declarations.clear();
            props.push(meta);
        }
    }
}
