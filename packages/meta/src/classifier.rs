//! Component classification.
//!
//! Decides how a component symbol is authored and where its inputs, defaults,
//! events and slots are declared. Every authoring style maps onto one of the
//! closed [`ComponentKind`] variants; anything unrecognized is `Unknown`.

use crate::defaults::{ComponentDefaults, DefaultEntry};
use crate::events::EmitsDecl;
use crate::types::ComponentKind;
use component_meta_checker::{FileId, ItemRef, Program, Site, TypeId, TypeKind, ValueRef, ValueSymbol};
use component_meta_parser::ast::{
    ClassDecl, ClassMemberKind, Expr, ExportDefault, Function, Item, ObjectLit, ObjectPropertyKind, Pattern,
    TypeExpr, Visibility,
};
use tracing::{debug, warn};

const MAX_REFERENCE_DEPTH: usize = 16;

/// Keys that mark a plain object literal as a component options object
const COMPONENT_KEYS: &[&str] = &[
    "props",
    "emits",
    "setup",
    "render",
    "template",
    "components",
    "data",
    "slots",
    "name",
    "computed",
    "methods",
    "expose",
    "inheritAttrs",
    "directives",
    "mixins",
    "extends",
    "watch",
];

/// Where the parts of one component's interface are declared
#[derive(Debug, Clone)]
pub struct Classification {
    pub kind: ComponentKind,
    /// Declared without a runtime surface (`declare`, `.d.ts`)
    pub ambient: bool,
    pub props: Option<TypeId>,
    pub defaults: ComponentDefaults,
    pub emits: Option<EmitsDecl>,
    pub slots: Option<TypeId>,
}

impl Classification {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            ambient: false,
            props: None,
            defaults: ComponentDefaults::new(),
            emits: None,
            slots: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(ComponentKind::Unknown)
    }

    /// Runtime components accept the global attributes
    pub fn has_globals(&self) -> bool {
        self.kind != ComponentKind::Unknown && !self.ambient
    }

    fn ambient(mut self, ambient: bool) -> Self {
        self.ambient |= ambient;
        self
    }
}

pub struct Classifier<'p> {
    program: &'p mut Program,
    depth: usize,
}

impl<'p> Classifier<'p> {
    pub fn new(program: &'p mut Program) -> Self {
        Self { program, depth: 0 }
    }

    pub fn classify(&mut self, symbol: ValueSymbol) -> Classification {
        if self.depth >= MAX_REFERENCE_DEPTH {
            warn!(?symbol, "component reference chain too deep");
            return Classification::unknown();
        }

        self.depth += 1;
        let classification = match symbol {
            ValueSymbol::SfcComponent(file) => self.classify_sfc(file),
            ValueSymbol::Item { file, value } => self.classify_item(file, value),
        };
        self.depth -= 1;

        debug!(kind = ?classification.kind, ambient = classification.ambient, "classified component");
        classification
    }

    fn classify_sfc(&mut self, file: FileId) -> Classification {
        let source = self.program.file(file);
        if let Some(unit) = source.setup_unit() {
            return self.classify_setup(Site { file, unit });
        }
        if let Some(at) = source.default_export() {
            return self.classify_item(file, ValueRef::DefaultExport(at));
        }
        // Template-only components have no declared inputs
        Classification::new(ComponentKind::ClassLike)
    }

    /// Compiler macros of a `<script setup>` block
    fn classify_setup(&mut self, site: Site) -> Classification {
        let source = self.program.file(site.file);
        let mut classification = Classification::new(ComponentKind::ClassLike);
        let Some(unit) = source.units.get(site.unit) else {
            return classification;
        };

        for item in &unit.module.items {
            match item {
                Item::Expression { expr, .. } => self.read_macro(site, expr, None, &mut classification),
                Item::Variable(decl) => {
                    for declarator in &decl.declarators {
                        if let Some(init) = &declarator.init {
                            self.read_macro(site, init, Some(&declarator.pattern), &mut classification);
                        }
                    }
                }
                _ => {}
            }
        }

        classification
    }

    fn read_macro(&mut self, site: Site, expr: &Expr, pattern: Option<&Pattern>, result: &mut Classification) {
        let expr = expr.unwrap_assertions();
        let Expr::Call { type_args, args, .. } = expr else {
            return;
        };

        match expr.callee_name() {
            Some("defineProps") => {
                if let Some(type_) = type_args.first() {
                    result.props = Some(self.program.lower_type(site, type_));
                } else if let Some(runtime) = args.first() {
                    result.props = Some(self.program.runtime_props_type(site, runtime));
                    self.read_runtime_defaults(site, runtime, 0, &mut result.defaults);
                }
                if let Some(Pattern::Object { properties, .. }) = pattern {
                    for property in properties {
                        if let Some(default) = &property.default {
                            result.defaults.push(DefaultEntry::value(&property.key, default.clone()));
                        }
                    }
                }
            }
            Some("withDefaults") => {
                if let Some(inner) = args.first() {
                    self.read_macro(site, inner, None, result);
                }
                if let Some(Expr::Object(defaults)) = args.get(1).map(Expr::unwrap_assertions) {
                    result.defaults.extend(ComponentDefaults::from_object(defaults));
                }
            }
            Some("defineEmits") => {
                if let Some(type_) = type_args.first() {
                    result.emits = Some(EmitsDecl::Typed(self.program.lower_type(site, type_)));
                } else if let Some(runtime) = args.first() {
                    result.emits = Some(EmitsDecl::Runtime {
                        site,
                        expr: runtime.clone(),
                    });
                }
            }
            Some("defineSlots") => {
                if let Some(type_) = type_args.first() {
                    result.slots = Some(self.program.lower_type(site, type_));
                }
            }
            _ => {}
        }
    }

    /// `default:` entries of runtime prop definitions
    fn read_runtime_defaults(&mut self, site: Site, expr: &Expr, depth: usize, defaults: &mut ComponentDefaults) {
        match expr.unwrap_assertions() {
            Expr::Object(props) => {
                for property in &props.properties {
                    let Some(Expr::Object(definition)) = property.value().map(Expr::unwrap_assertions) else {
                        continue;
                    };
                    let Some(default) = definition.get("default") else {
                        continue;
                    };
                    let value = match &default.kind {
                        ObjectPropertyKind::Init(value) => value.clone(),
                        ObjectPropertyKind::Method(function) => Expr::Function(Box::new(function.clone())),
                        _ => continue,
                    };
                    // For function props the function itself is the default
                    let is_function = matches!(
                        definition.get("type").and_then(|p| p.value()).map(Expr::unwrap_assertions),
                        Some(Expr::Ident { name, .. }) if name == "Function"
                    );
                    let name = property.key.name();
                    defaults.push(if is_function {
                        DefaultEntry::value(name, value)
                    } else {
                        DefaultEntry::factory(name, value)
                    });
                }
            }
            Expr::Ident { name, .. } if depth < MAX_REFERENCE_DEPTH => {
                let Some(ValueSymbol::Item {
                    file,
                    value: ValueRef::Declarator { item, index },
                }) = self.program.resolve_value(site.file, name)
                else {
                    return;
                };
                let source = self.program.file(file);
                if let Some(init) = source.declarator(item, index).and_then(|d| d.init.as_ref()) {
                    self.read_runtime_defaults(Site { file, unit: item.unit }, init, depth + 1, defaults);
                }
            }
            _ => {}
        }
    }

    fn classify_item(&mut self, file: FileId, value: ValueRef) -> Classification {
        let source = self.program.file(file);
        let at = value.item();
        let site = Site { file, unit: at.unit };

        match source.item(at) {
            Some(Item::Variable(decl)) => {
                let ValueRef::Declarator { index, .. } = value else {
                    return Classification::unknown();
                };
                let Some(declarator) = decl.declarators.get(index) else {
                    return Classification::unknown();
                };
                if decl.meta.declare || source.ambient {
                    return match &declarator.type_ {
                        Some(type_) => self.classify_annotation(site, type_).ambient(true),
                        None => Classification::unknown(),
                    };
                }
                match (&declarator.init, &declarator.type_) {
                    (Some(init), _) => self.classify_expr(site, init),
                    (None, Some(type_)) => self.classify_annotation(site, type_),
                    (None, None) => Classification::unknown(),
                }
            }
            Some(Item::Function(decl)) | Some(Item::ExportDefault(ExportDefault::Function(decl))) => self
                .classify_function(site, &decl.function)
                .ambient(decl.meta.declare || source.ambient),
            Some(Item::Class(decl)) | Some(Item::ExportDefault(ExportDefault::Class(decl))) => self
                .classify_class(file, at, decl)
                .ambient(decl.meta.declare || source.ambient),
            Some(Item::ExportDefault(ExportDefault::Expr { expr, .. })) => {
                self.classify_expr(site, expr).ambient(source.ambient)
            }
            _ => Classification::unknown(),
        }
    }

    fn classify_expr(&mut self, site: Site, expr: &Expr) -> Classification {
        match expr.unwrap_assertions() {
            Expr::Call { callee, args, .. } if is_define_component(callee) => {
                match args.first().map(Expr::unwrap_assertions) {
                    Some(Expr::Object(options)) => self.classify_options(site, options),
                    Some(Expr::Function(function)) => self.classify_function(site, function),
                    Some(reference @ Expr::Ident { .. }) => self.classify_expr(site, reference),
                    _ => Classification::new(ComponentKind::ObjectLike),
                }
            }
            Expr::Object(options) if is_options_object(options) => self.classify_options(site, options),
            Expr::Function(function) => self.classify_function(site, function),
            Expr::Ident { name, .. } => match self.program.resolve_value(site.file, name) {
                Some(symbol) => self.classify(symbol),
                None => {
                    debug!(name = %name, "component reference does not resolve");
                    Classification::unknown()
                }
            },
            _ => Classification::unknown(),
        }
    }

    fn classify_options(&mut self, site: Site, options: &ObjectLit) -> Classification {
        let mut classification = Classification::new(ComponentKind::ObjectLike);

        if let Some(props) = options.get("props").and_then(|p| p.value()) {
            classification.props = Some(self.program.runtime_props_type(site, props));
            self.read_runtime_defaults(site, props, 0, &mut classification.defaults);
        }

        if let Some(emits) = options.get("emits").and_then(|p| p.value()) {
            classification.emits = Some(EmitsDecl::Runtime {
                site,
                expr: emits.clone(),
            });
        }

        // `slots: Object as SlotsType<T>`
        if let Some(Expr::TypeAssertion {
            type_: TypeExpr::Reference { name, args, .. },
            ..
        }) = options.get("slots").and_then(|p| p.value())
        {
            if name == "SlotsType" && args.len() == 1 {
                classification.slots = Some(self.program.lower_type(site, &args[0]));
            }
        }

        classification
    }

    /// Functional components: the first parameter describes the inputs
    fn classify_function(&mut self, site: Site, function: &Function) -> Classification {
        let mut classification = Classification::new(ComponentKind::FunctionLike);
        let Some(param) = function.params.first() else {
            return classification;
        };

        if let Some(type_) = &param.type_ {
            classification.props = Some(self.program.lower_type(site, type_));
        }
        if let Pattern::Object { properties, .. } = &param.pattern {
            for property in properties {
                if let Some(default) = &property.default {
                    classification
                        .defaults
                        .push(DefaultEntry::value(&property.key, default.clone()));
                }
            }
        }

        classification
    }

    /// Class components: public instance fields are the inputs
    fn classify_class(&mut self, file: FileId, at: ItemRef, decl: &ClassDecl) -> Classification {
        let mut classification = Classification::new(ComponentKind::ClassLike);
        classification.props = Some(self.program.class_instance_type(file, at));

        for member in &decl.members {
            if member.is_static || member.visibility != Visibility::Public {
                continue;
            }
            if let ClassMemberKind::Field {
                initializer: Some(initializer),
                ..
            } = &member.kind
            {
                classification
                    .defaults
                    .push(DefaultEntry::value(&member.name, initializer.clone()));
            }
        }

        classification
    }

    /// `DefineComponent<P>`, `FunctionalComponent<P>` and function type annotations
    fn classify_annotation(&mut self, site: Site, type_: &TypeExpr) -> Classification {
        let ty = self.program.lower_type(site, type_);

        match self.program.arena().get(ty).clone() {
            TypeKind::Builtin { name, args } => {
                let kind = match name.as_str() {
                    "DefineComponent" | "Component" => ComponentKind::ObjectLike,
                    "FunctionalComponent" => ComponentKind::FunctionLike,
                    _ => return Classification::unknown(),
                };
                let mut classification = Classification::new(kind);
                classification.props = args.first().copied();
                classification
            }
            TypeKind::Function(signature) => {
                let mut classification = Classification::new(ComponentKind::FunctionLike);
                if let Some(param) = signature.params.first() {
                    classification.props = Some(self.program.arena_mut().non_optional(param.ty));
                }
                classification
            }
            _ => Classification::unknown(),
        }
    }
}

fn is_define_component(callee: &Expr) -> bool {
    match callee {
        Expr::Ident { name, .. } => name == "defineComponent",
        Expr::Member { property, .. } => property == "defineComponent",
        _ => false,
    }
}

fn is_options_object(object: &ObjectLit) -> bool {
    object
        .properties
        .iter()
        .any(|property| COMPONENT_KEYS.contains(&property.key.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_meta_checker::CompilerOptions;
    use component_meta_common::MemoryFileSystem;
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Arc;

    fn classify(source_path: &str, source: &str, export: &str) -> (Program, Classification) {
        let fs = MemoryFileSystem::new().with_file(source_path, source);
        let mut program = Program::new(Arc::new(fs), CompilerOptions::default());
        let file = program.load(Path::new(source_path)).unwrap();
        let symbol = program
            .resolve_export_value(file, export, &mut HashSet::new())
            .unwrap();
        let classification = Classifier::new(&mut program).classify(symbol);
        (program, classification)
    }

    #[test]
    fn test_setup_macros() {
        let (_, c) = classify(
            "/src/Button.vue",
            "<script setup lang=\"ts\">\nconst props = withDefaults(defineProps<{ size?: number }>(), { size: 1 })\nconst emit = defineEmits(['click'])\ndefineSlots<{ default(props: { item: string }): any }>()\n</script>\n",
            "default",
        );
        assert_eq!(c.kind, ComponentKind::ClassLike);
        assert!(c.props.is_some());
        assert_eq!(c.defaults.resolve_default("size", "\n").as_deref(), Some("1"));
        assert!(matches!(c.emits, Some(EmitsDecl::Runtime { .. })));
        assert!(c.slots.is_some());
        assert!(c.has_globals());
    }

    #[test]
    fn test_template_only_component() {
        let (_, c) = classify("/src/Empty.vue", "<template><div /></template>\n", "default");
        assert_eq!(c.kind, ComponentKind::ClassLike);
        assert!(c.props.is_none());
    }

    #[test]
    fn test_options_object_styles() {
        let (_, c) = classify(
            "/src/Card.ts",
            "import { defineComponent } from 'vue'\nexport default defineComponent({ props: { title: { type: String, default: 'Card' } } })\n",
            "default",
        );
        assert_eq!(c.kind, ComponentKind::ObjectLike);
        assert_eq!(c.defaults.resolve_default("title", "\n").as_deref(), Some("\"Card\""));

        let (_, plain) = classify("/src/Plain.js", "export default { props: ['a'] }\n", "default");
        assert_eq!(plain.kind, ComponentKind::ObjectLike);

        let (_, data) = classify("/src/Data.js", "export default { width: 1 }\n", "default");
        assert_eq!(data.kind, ComponentKind::Unknown);
        assert!(!data.has_globals());
    }

    #[test]
    fn test_function_and_class_components() {
        let (_, function) = classify(
            "/src/Label.ts",
            "export function Label({ text = 'x' }: { text?: string }) { return null }\n",
            "Label",
        );
        assert_eq!(function.kind, ComponentKind::FunctionLike);
        assert_eq!(function.defaults.resolve_default("text", "\n").as_deref(), Some("\"x\""));

        let (_, class) = classify(
            "/src/Counter.ts",
            "export class Counter { count: number = 0; private secret = 1 }\n",
            "Counter",
        );
        assert_eq!(class.kind, ComponentKind::ClassLike);
        assert_eq!(class.defaults.len(), 1);
    }

    #[test]
    fn test_ambient_declarations() {
        let (program, c) = classify(
            "/src/types.d.ts",
            "import type { DefineComponent } from 'vue'\nexport declare const Button: DefineComponent<{ size?: number }>\n",
            "Button",
        );
        assert_eq!(c.kind, ComponentKind::ObjectLike);
        assert!(c.ambient);
        assert!(!c.has_globals());
        assert_eq!(program.print(c.props.unwrap()), "{ size?: number | undefined; }");
    }

    #[test]
    fn test_unknown_values() {
        let (_, c) = classify("/src/value.ts", "export const answer = 42\n", "answer");
        assert_eq!(c.kind, ComponentKind::Unknown);
    }
}
