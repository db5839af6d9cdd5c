use crate::types::TypeId;
use std::collections::HashMap;
use std::rc::Rc;

/// Type parameter bindings of generic declarations
/// Uses Rc so nested signatures can fork a scope without deep copies
#[derive(Debug, Clone, Default)]
pub struct Scope {
    parent: Option<Rc<Scope>>,
    bindings: HashMap<String, TypeId>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a child scope, used for generic methods and function types
    pub fn with_parent(parent: Rc<Scope>) -> Self {
        Self {
            parent: Some(parent),
            bindings: HashMap::new(),
        }
    }

    /// Bind a type parameter, shadowing outer bindings of the same name
    pub fn bind(&mut self, name: impl Into<String>, ty: TypeId) {
        self.bindings.insert(name.into(), ty);
    }

    /// Look up a type parameter in this scope or parent scopes
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.bindings
            .get(name)
            .copied()
            .or_else(|| self.parent.as_ref().and_then(|p| p.lookup(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.parent.as_ref().map(|p| p.is_empty()).unwrap_or(true)
    }
}
