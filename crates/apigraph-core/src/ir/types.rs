use serde::Serialize;

use super::operations::Operation;
use super::schemas::Model;

/// The fully resolved type graph of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub version: String,
    pub models: Vec<Model>,
    pub services: Vec<Service>,
}

impl Client {
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.services.iter().flat_map(|s| s.operations.iter())
    }
}

/// Operations sharing one tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operations: Vec<Operation>,
    pub imports: Vec<String>,
}

/// The `type` / `base` / `template` triple naming a resolved type.
///
/// `Page<Pet>` has base `Page` and template `Pet`; `Pet[]` has base `Pet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeName {
    #[serde(rename = "type")]
    pub ty: String,
    pub base: String,
    pub template: Option<String>,
}

impl TypeName {
    pub fn simple(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            ty: name.clone(),
            base: name,
            template: None,
        }
    }

    pub fn any() -> Self {
        Self::simple("any")
    }

    pub fn is_any(&self) -> bool {
        self.ty == "any"
    }
}

/// Output of the primitive type mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub name: TypeName,
    pub imports: Vec<String>,
    pub is_nullable: bool,
}

impl ResolvedType {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: TypeName::simple(name),
            imports: Vec::new(),
            is_nullable: false,
        }
    }

    pub fn any() -> Self {
        Self::primitive("any")
    }
}
