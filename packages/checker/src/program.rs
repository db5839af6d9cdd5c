use crate::error::{CheckError, CheckResult};
use crate::options::CompilerOptions;
use crate::printer::TypePrinter;
use crate::types::{Declaration, TypeArena, TypeId};
use component_meta_common::{normalize_path, FileSystem};
use component_meta_parser::ast::*;
use component_meta_parser::{format_error, parse_module, parse_sfc, ParseError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};

const PRELUDE: &str = include_str!("prelude.d.ts");
const PRELUDE_PATH: &str = "<prelude>";

/// Extensions tried, in order, when resolving a relative import
pub const RESOLVE_EXTENSIONS: [&str; 6] = [".ts", ".tsx", ".d.ts", ".js", ".jsx", ".vue"];

/// Library names rendered by name without being analyzed
const BUILTIN_TYPES: &[&str] = &[
    "Record",
    "Partial",
    "Required",
    "Readonly",
    "Pick",
    "Omit",
    "Exclude",
    "Extract",
    "NonNullable",
    "ReturnType",
    "Parameters",
    "InstanceType",
    "Awaited",
    "Date",
    "RegExp",
    "Error",
    "Promise",
    "PromiseLike",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Function",
    "Object",
    "String",
    "Number",
    "Boolean",
    "Symbol",
    "Iterable",
    "Node",
    "Element",
    "Event",
    "Window",
    "Document",
    "File",
    "Blob",
    "FileList",
    "Ref",
    "ShallowRef",
    "ComputedRef",
    "MaybeRef",
    "VNode",
    "VNodeChild",
    "Component",
    "ComponentPublicInstance",
    "DefineComponent",
    "FunctionalComponent",
    "PropType",
    "Slot",
    "Slots",
    "SlotsType",
    "CSSProperties",
    "StyleValue",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A script unit of one file: the whole file, or one `<script>` block
#[derive(Debug, Clone)]
pub struct ScriptUnit {
    pub module: Module,
    /// Byte offset of the unit within the file
    pub offset: usize,
    pub setup: bool,
}

/// Position of a top-level item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub unit: usize,
    pub item: usize,
}

/// Where type annotations and declaration sites are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Site {
    pub file: FileId,
    pub unit: usize,
}

/// A top-level value declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRef {
    Declarator { item: ItemRef, index: usize },
    Function(ItemRef),
    Class(ItemRef),
    Enum(ItemRef),
    DefaultExport(ItemRef),
}

impl ValueRef {
    pub fn item(&self) -> ItemRef {
        match self {
            ValueRef::Declarator { item, .. }
            | ValueRef::Function(item)
            | ValueRef::Class(item)
            | ValueRef::Enum(item)
            | ValueRef::DefaultExport(item) => *item,
        }
    }
}

/// Result of resolving a value name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSymbol {
    Item { file: FileId, value: ValueRef },
    /// The default export of a single-file component
    SfcComponent(FileId),
}

/// Result of resolving a type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTarget {
    /// Declarations of one named type (several when interfaces merge)
    Decl { file: FileId, items: Vec<ItemRef> },
    Namespace(FileId),
    Builtin(String),
}

#[derive(Debug, Clone)]
enum ImportBinding {
    Named { source: String, imported: String },
    Namespace { source: String },
}

#[derive(Debug, Clone)]
enum ExportTarget {
    Local(String),
    Reexport { source: String, name: String },
    Namespace { source: String },
}

#[derive(Debug, Clone, Default)]
struct SymbolTable {
    types: HashMap<String, Vec<ItemRef>>,
    values: HashMap<String, ValueRef>,
    imports: HashMap<String, ImportBinding>,
    exports: Vec<(String, ExportTarget)>,
    star_exports: Vec<String>,
    default_export: Option<ItemRef>,
}

impl SymbolTable {
    fn build(units: &[ScriptUnit]) -> Self {
        let mut table = SymbolTable::default();

        for (unit_index, unit) in units.iter().enumerate() {
            for (item_index, item) in unit.module.items.iter().enumerate() {
                let at = ItemRef {
                    unit: unit_index,
                    item: item_index,
                };
                table.add_item(item, at);
            }
        }

        table
    }

    fn add_item(&mut self, item: &Item, at: ItemRef) {
        match item {
            Item::Import(import) => {
                if let Some(local) = &import.default {
                    self.imports.insert(
                        local.clone(),
                        ImportBinding::Named {
                            source: import.source.clone(),
                            imported: "default".to_string(),
                        },
                    );
                }
                if let Some(local) = &import.namespace {
                    self.imports.insert(
                        local.clone(),
                        ImportBinding::Namespace {
                            source: import.source.clone(),
                        },
                    );
                }
                for specifier in &import.named {
                    self.imports.insert(
                        specifier.local.clone(),
                        ImportBinding::Named {
                            source: import.source.clone(),
                            imported: specifier.imported.clone(),
                        },
                    );
                }
            }
            Item::Export(export) => {
                if export.star {
                    if let Some(source) = &export.source {
                        self.star_exports.push(source.clone());
                    }
                }
                for specifier in &export.specifiers {
                    let target = match &export.source {
                        Some(source) if specifier.local == "*" => ExportTarget::Namespace {
                            source: source.clone(),
                        },
                        Some(source) => ExportTarget::Reexport {
                            source: source.clone(),
                            name: specifier.local.clone(),
                        },
                        None => ExportTarget::Local(specifier.local.clone()),
                    };
                    self.exports.push((specifier.exported.clone(), target));
                }
            }
            Item::Interface(decl) => {
                self.types.entry(decl.name.clone()).or_default().push(at);
                self.export_local(&decl.name, &decl.meta);
            }
            Item::TypeAlias(decl) => {
                self.types.entry(decl.name.clone()).or_default().push(at);
                self.export_local(&decl.name, &decl.meta);
            }
            Item::Enum(decl) => {
                self.types.entry(decl.name.clone()).or_default().push(at);
                self.values.insert(decl.name.clone(), ValueRef::Enum(at));
                self.export_local(&decl.name, &decl.meta);
            }
            Item::Class(decl) => {
                if let Some(name) = &decl.name {
                    self.types.entry(name.clone()).or_default().push(at);
                    self.values.insert(name.clone(), ValueRef::Class(at));
                    self.export_local(name, &decl.meta);
                }
            }
            Item::Function(decl) => {
                if let Some(name) = &decl.name {
                    self.values.entry(name.clone()).or_insert(ValueRef::Function(at));
                    self.export_local(name, &decl.meta);
                }
            }
            Item::Variable(decl) => {
                for (index, declarator) in decl.declarators.iter().enumerate() {
                    let mut names = Vec::new();
                    pattern_names(&declarator.pattern, &mut names);
                    for name in names {
                        self.values
                            .insert(name.clone(), ValueRef::Declarator { item: at, index });
                        self.export_local(&name, &decl.meta);
                    }
                }
            }
            Item::ExportDefault(default) => {
                self.default_export = Some(at);
                match default {
                    ExportDefault::Function(FunctionDecl {
                        name: Some(name), ..
                    }) => {
                        self.values.insert(name.clone(), ValueRef::Function(at));
                    }
                    ExportDefault::Class(ClassDecl {
                        name: Some(name), ..
                    }) => {
                        self.types.entry(name.clone()).or_default().push(at);
                        self.values.insert(name.clone(), ValueRef::Class(at));
                    }
                    _ => {}
                }
            }
            Item::Expression { .. } | Item::Other { .. } => {}
        }
    }

    fn export_local(&mut self, name: &str, meta: &DeclMeta) {
        if meta.exported && !self.exports.iter().any(|(exported, _)| exported == name) {
            self.exports
                .push((name.to_string(), ExportTarget::Local(name.to_string())));
        }
    }

    fn export(&self, name: &str) -> Option<&ExportTarget> {
        self.exports
            .iter()
            .find(|(exported, _)| exported == name)
            .map(|(_, target)| target)
    }
}

fn pattern_names(pattern: &Pattern, out: &mut Vec<String>) {
    match pattern {
        Pattern::Ident { name, .. } => out.push(name.clone()),
        Pattern::Object {
            properties, rest, ..
        } => {
            for property in properties {
                pattern_names(&property.value, out);
            }
            if let Some(rest) = rest {
                out.push(rest.clone());
            }
        }
        Pattern::Array { elements, .. } => {
            for element in elements.iter().flatten() {
                pattern_names(element, out);
            }
        }
    }
}

/// A loaded and parsed source file
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub units: Vec<ScriptUnit>,
    /// Type annotations are meaningful (`.ts`, `.tsx`, `lang="ts"` blocks)
    pub typed: bool,
    /// Declaration file (`.d.ts`): no runtime surface
    pub ambient: bool,
    pub is_sfc: bool,
    pub has_template: bool,
    symbols: SymbolTable,
}

impl SourceFile {
    pub fn item(&self, at: ItemRef) -> Option<&Item> {
        self.units.get(at.unit)?.module.items.get(at.item)
    }

    pub fn declarator(&self, at: ItemRef, index: usize) -> Option<&Declarator> {
        match self.item(at)? {
            Item::Variable(decl) => decl.declarators.get(index),
            _ => None,
        }
    }

    pub fn setup_unit(&self) -> Option<usize> {
        self.units.iter().position(|unit| unit.setup)
    }

    /// Names this file exports, in declaration order (`default` included)
    pub fn export_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        if self.symbols.default_export.is_some() || self.is_sfc {
            names.push("default".to_string());
        }
        for (name, _) in &self.symbols.exports {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn default_export(&self) -> Option<ItemRef> {
        self.symbols.default_export
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct InstantiationKey {
    pub file: FileId,
    pub item: ItemRef,
    pub args: Vec<TypeId>,
}

/// One snapshot of the sources reachable from a component
///
/// Files are loaded on demand through the [`FileSystem`]; every type created
/// while answering queries lives in the program's [`TypeArena`].
pub struct Program {
    fs: Arc<dyn FileSystem>,
    pub(crate) options: CompilerOptions,
    pub(crate) arena: TypeArena,
    files: Vec<Rc<SourceFile>>,
    file_ids: HashMap<PathBuf, FileId>,
    failed: HashSet<PathBuf>,
    prelude: FileId,
    pub(crate) instantiations: HashMap<InstantiationKey, TypeId>,
    pub(crate) in_progress: HashSet<InstantiationKey>,
    pub(crate) values_in_progress: HashSet<(FileId, ValueRef)>,
    pub(crate) value_types: HashMap<(FileId, ValueRef), TypeId>,
    pub(crate) depth: usize,
}

impl Program {
    pub fn new(fs: Arc<dyn FileSystem>, options: CompilerOptions) -> Self {
        let module = parse_module(PRELUDE).unwrap_or_else(|error| {
            warn!(%error, "prelude failed to parse");
            Module::default()
        });
        let units = vec![ScriptUnit {
            module,
            offset: 0,
            setup: false,
        }];
        let prelude = SourceFile {
            path: PathBuf::from(PRELUDE_PATH),
            symbols: SymbolTable::build(&units),
            units,
            typed: true,
            ambient: true,
            is_sfc: false,
            has_template: false,
        };

        let mut program = Self {
            fs,
            options,
            arena: TypeArena::new(),
            files: Vec::new(),
            file_ids: HashMap::new(),
            failed: HashSet::new(),
            prelude: FileId(0),
            instantiations: HashMap::new(),
            in_progress: HashSet::new(),
            values_in_progress: HashSet::new(),
            value_types: HashMap::new(),
            depth: 0,
        };
        program.prelude = program.push_file(prelude);
        program
    }

    pub(crate) fn prelude(&self) -> FileId {
        self.prelude
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut TypeArena {
        &mut self.arena
    }

    pub fn printer(&self) -> TypePrinter<'_> {
        TypePrinter::new(&self.arena)
    }

    pub fn print(&self, ty: TypeId) -> String {
        self.printer().print(ty)
    }

    pub fn file(&self, id: FileId) -> Rc<SourceFile> {
        Rc::clone(&self.files[id.index()])
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.file_ids.get(&normalize_path(path)).copied()
    }

    fn push_file(&mut self, file: SourceFile) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.file_ids.insert(file.path.clone(), id);
        self.files.push(Rc::new(file));
        id
    }

    /// Load and parse a source file; repeated loads return the same id
    pub fn load(&mut self, path: &Path) -> CheckResult<FileId> {
        let path = normalize_path(path);
        if let Some(id) = self.file_ids.get(&path) {
            return Ok(*id);
        }

        let text = self
            .fs
            .read_to_string(&path)
            .map_err(|source| CheckError::Read {
                path: path.clone(),
                source,
            })?;

        let file = parse_source_file(&path, &text, &self.options)?;
        debug!(path = %path.display(), units = file.units.len(), "loaded source file");
        Ok(self.push_file(file))
    }

    /// Load an imported file; failures degrade to an unresolved import
    fn load_import(&mut self, path: &Path) -> Option<FileId> {
        if self.failed.contains(path) {
            return None;
        }
        match self.load(path) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "imported file could not be loaded");
                self.failed.insert(path.to_path_buf());
                None
            }
        }
    }

    /// Resolve a relative module specifier; bare package names resolve to `None`
    pub fn resolve_module(&mut self, from: FileId, specifier: &str) -> Option<FileId> {
        if !is_relative(specifier) {
            return None;
        }

        let from_path = self.files[from.index()].path.clone();
        let base = normalize_path(&from_path.parent().unwrap_or(Path::new("")).join(specifier));

        for candidate in module_candidates(&base) {
            if self.fs.is_file(&candidate) {
                return self.load_import(&candidate);
            }
        }

        warn!(specifier, from = %from_path.display(), "cannot resolve module");
        None
    }

    pub fn declaration(&self, site: Site, span: Span) -> Declaration {
        let file = &self.files[site.file.index()];
        let offset = file.units.get(site.unit).map(|unit| unit.offset).unwrap_or(0);
        Declaration {
            file: file.path.clone(),
            range: [span.start + offset, span.end + offset],
        }
    }

    /// Resolve a type name visible in `file`
    pub fn resolve_type(&mut self, file: FileId, name: &str) -> Option<TypeTarget> {
        let source = self.file(file);

        if let Some(items) = source.symbols.types.get(name) {
            return Some(TypeTarget::Decl {
                file,
                items: items.clone(),
            });
        }

        if let Some(binding) = source.symbols.imports.get(name).cloned() {
            return match binding {
                ImportBinding::Named { source: spec, imported } => {
                    if !is_relative(&spec) {
                        debug!(name, package = %spec, "type from package rendered by name");
                        return self.global_type(&imported).or(Some(TypeTarget::Builtin(imported)));
                    }
                    let target = self.resolve_module(file, &spec)?;
                    let mut visited = HashSet::new();
                    self.resolve_export_type(target, &imported, &mut visited)
                }
                ImportBinding::Namespace { source: spec } => {
                    self.resolve_module(file, &spec).map(TypeTarget::Namespace)
                }
            };
        }

        self.global_type(name)
    }

    fn global_type(&self, name: &str) -> Option<TypeTarget> {
        let prelude = &self.files[self.prelude.index()];
        if let Some(items) = prelude.symbols.types.get(name) {
            return Some(TypeTarget::Decl {
                file: self.prelude,
                items: items.clone(),
            });
        }
        if BUILTIN_TYPES.contains(&name) || is_dom_type(name) {
            return Some(TypeTarget::Builtin(name.to_string()));
        }
        None
    }

    /// Resolve a type exported from `file` under `name`
    pub fn resolve_export_type(
        &mut self,
        file: FileId,
        name: &str,
        visited: &mut HashSet<(FileId, String)>,
    ) -> Option<TypeTarget> {
        if !visited.insert((file, name.to_string())) {
            return None;
        }
        let source = self.file(file);

        if name == "default" {
            if let Some(at) = source.symbols.default_export {
                if let Some(Item::ExportDefault(ExportDefault::Class(_))) = source.item(at) {
                    return Some(TypeTarget::Decl {
                        file,
                        items: vec![at],
                    });
                }
            }
        }

        match source.symbols.export(name).cloned() {
            Some(ExportTarget::Local(local)) => return self.resolve_type(file, &local),
            Some(ExportTarget::Reexport { source: spec, name: inner }) => {
                let target = self.resolve_module(file, &spec)?;
                return self.resolve_export_type(target, &inner, visited);
            }
            Some(ExportTarget::Namespace { source: spec }) => {
                return self.resolve_module(file, &spec).map(TypeTarget::Namespace);
            }
            None => {}
        }

        // Declaration files expose their top-level declarations
        if source.ambient {
            if let Some(items) = source.symbols.types.get(name) {
                return Some(TypeTarget::Decl {
                    file,
                    items: items.clone(),
                });
            }
        }

        for spec in source.symbols.star_exports.clone() {
            if let Some(target) = self.resolve_module(file, &spec) {
                if let Some(found) = self.resolve_export_type(target, name, visited) {
                    return Some(found);
                }
            }
        }

        None
    }

    /// Resolve a value name visible in `file`
    pub fn resolve_value(&mut self, file: FileId, name: &str) -> Option<ValueSymbol> {
        let source = self.file(file);

        if let Some(value) = source.symbols.values.get(name) {
            return Some(ValueSymbol::Item {
                file,
                value: *value,
            });
        }

        match source.symbols.imports.get(name).cloned() {
            Some(ImportBinding::Named { source: spec, imported }) => {
                let target = self.resolve_module(file, &spec)?;
                let mut visited = HashSet::new();
                self.resolve_export_value(target, &imported, &mut visited)
            }
            _ => None,
        }
    }

    /// Resolve a value exported from `file` under `name`
    pub fn resolve_export_value(
        &mut self,
        file: FileId,
        name: &str,
        visited: &mut HashSet<(FileId, String)>,
    ) -> Option<ValueSymbol> {
        if !visited.insert((file, name.to_string())) {
            return None;
        }
        let source = self.file(file);

        if name == "default" {
            if source.is_sfc {
                return Some(ValueSymbol::SfcComponent(file));
            }
            if let Some(at) = source.symbols.default_export {
                return Some(ValueSymbol::Item {
                    file,
                    value: ValueRef::DefaultExport(at),
                });
            }
        }

        match source.symbols.export(name).cloned() {
            Some(ExportTarget::Local(local)) => return self.resolve_value(file, &local),
            Some(ExportTarget::Reexport { source: spec, name: inner }) => {
                let target = self.resolve_module(file, &spec)?;
                return self.resolve_export_value(target, &inner, visited);
            }
            Some(ExportTarget::Namespace { .. }) => return None,
            None => {}
        }

        for spec in source.symbols.star_exports.clone() {
            if let Some(target) = self.resolve_module(file, &spec) {
                if let Some(found) = self.resolve_export_value(target, name, visited) {
                    return Some(found);
                }
            }
        }

        None
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || specifier == "."
        || specifier == ".."
}

fn is_dom_type(name: &str) -> bool {
    (name.starts_with("HTML") && name.ends_with("Element"))
        || (name.starts_with("SVG") && name.ends_with("Element"))
        || (name.len() > 5 && name.ends_with("Event") && name.starts_with(|c: char| c.is_uppercase()))
}

fn module_candidates(base: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let text = base.to_string_lossy().to_string();

    if has_source_extension(&text) {
        candidates.push(base.to_path_buf());
    }
    // `./button.js` written for a `./button.ts` source
    if let Some(stem) = text.strip_suffix(".js") {
        candidates.push(PathBuf::from(format!("{}.ts", stem)));
    }
    if let Some(stem) = text.strip_suffix(".jsx") {
        candidates.push(PathBuf::from(format!("{}.tsx", stem)));
    }
    for extension in RESOLVE_EXTENSIONS {
        candidates.push(PathBuf::from(format!("{}{}", text, extension)));
    }
    for extension in RESOLVE_EXTENSIONS {
        candidates.push(base.join(format!("index{}", extension)));
    }

    candidates
}

/// True for the file kinds a program can load
pub fn has_source_extension(path: &str) -> bool {
    [".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs", ".vue"]
        .iter()
        .any(|extension| path.ends_with(extension))
}

fn parse_source_file(path: &Path, text: &str, options: &CompilerOptions) -> CheckResult<SourceFile> {
    let name = path.to_string_lossy().to_string();
    let syntax_error = |error: ParseError, offset: usize| {
        let error = error.offset(offset);
        CheckError::Syntax {
            path: path.to_path_buf(),
            report: format_error(&error, &name, text),
            error,
        }
    };

    if name.ends_with(".vue") {
        let descriptor = parse_sfc(text).map_err(|error| syntax_error(error, 0))?;
        let mut units = Vec::new();
        let mut typed = options.force_typed;

        for block in &descriptor.scripts {
            typed |= block.is_typed();
            let module = parse_module(block.content).map_err(|error| syntax_error(error, block.offset))?;
            units.push(ScriptUnit {
                module,
                offset: block.offset,
                setup: block.setup,
            });
        }

        return Ok(SourceFile {
            path: path.to_path_buf(),
            symbols: SymbolTable::build(&units),
            units,
            typed,
            ambient: false,
            is_sfc: true,
            has_template: descriptor.has_template,
        });
    }

    if !has_source_extension(&name) {
        return Err(CheckError::UnsupportedFile(path.to_path_buf()));
    }

    let typed = options.force_typed
        || [".ts", ".tsx", ".mts", ".cts"]
            .iter()
            .any(|extension| name.ends_with(extension));
    let module = parse_module(text).map_err(|error| syntax_error(error, 0))?;
    let units = vec![ScriptUnit {
        module,
        offset: 0,
        setup: false,
    }];

    Ok(SourceFile {
        path: path.to_path_buf(),
        symbols: SymbolTable::build(&units),
        units,
        typed,
        ambient: name.ends_with(".d.ts"),
        is_sfc: false,
        has_template: false,
    })
}
