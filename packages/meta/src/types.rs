use crate::schema::SchemaNode;
use component_meta_checker::Declaration;
use component_meta_parser::DocTag;
use serde::{Deserialize, Serialize};

/// Attributes every runtime component accepts, in their canonical order
pub const GLOBAL_ATTRIBUTES: [&str; 6] = ["key", "ref", "ref_for", "ref_key", "class", "style"];

/// How a component is authored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "class")]
    ClassLike,
    #[serde(rename = "function")]
    FunctionLike,
    #[serde(rename = "object")]
    ObjectLike,
}

/// Public interface of one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMeta {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub props: Vec<PropertyMeta>,
    pub events: Vec<EventMeta>,
    pub slots: Vec<SlotMeta>,
}

impl ComponentMeta {
    pub fn unknown() -> Self {
        Self {
            kind: ComponentKind::Unknown,
            props: Vec::new(),
            events: Vec::new(),
            slots: Vec::new(),
        }
    }

    pub fn prop(&self, name: &str) -> Option<&PropertyMeta> {
        self.props.iter().find(|prop| prop.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&EventMeta> {
        self.events.iter().find(|event| event.name == name)
    }

    pub fn slot(&self, name: &str) -> Option<&SlotMeta> {
        self.slots.iter().find(|slot| slot.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMeta {
    pub name: String,
    pub description: String,
    pub tags: Vec<DocTag>,
    pub global: bool,
    pub required: bool,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub declarations: Vec<Declaration>,
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    pub name: String,
    pub description: String,
    pub tags: Vec<DocTag>,
    /// Argument list rendered as a tuple (`[id: number]`)
    #[serde(rename = "type")]
    pub type_: String,
    /// Emit signature (`(event: "change", id: number): void`)
    pub signature: String,
    pub declarations: Vec<Declaration>,
    /// One schema per argument
    pub schema: Vec<SchemaNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotMeta {
    pub name: String,
    pub description: String,
    /// Type of the slot props
    #[serde(rename = "type")]
    pub type_: String,
    pub declarations: Vec<Declaration>,
    pub schema: SchemaNode,
}
