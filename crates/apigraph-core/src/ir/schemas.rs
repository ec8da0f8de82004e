use serde::Serialize;

use super::types::TypeName;
use crate::parse::schema::ExclusiveBound;

/// A fully resolved schema node.
///
/// The variant-specific payload lives in `kind`; everything every model
/// carries (flags, constraints, hoisted enums, imports) lives here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    #[serde(flatten)]
    pub kind: ModelKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_definition: bool,
    pub is_read_only: bool,
    pub is_required: bool,
    pub is_nullable: bool,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub constraints: Constraints,
    pub imports: Vec<String>,
    /// Enum-typed properties hoisted for flattened emission.
    pub enums: Vec<Model>,
}

/// The `export` discriminator with the data each variant needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "export", content = "detail", rename_all = "kebab-case")]
pub enum ModelKind {
    Reference(TypeName),
    Generic(TypeName),
    Enum(Vec<EnumMember>),
    Array(Link),
    Dictionary(Link),
    Interface(Vec<Model>),
    OneOf(Composition),
    AnyOf(Composition),
    AllOf(Composition),
}

/// Element type of an array or value type of a dictionary.
///
/// `model` is only present when the element schema was declared inline;
/// a `$ref` element is named by `ty` alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    #[serde(flatten)]
    pub ty: TypeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Box<Model>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionKind {
    OneOf,
    AnyOf,
    AllOf,
}

/// Surviving members of a `oneOf`/`anyOf`/`allOf`, in declaration order,
/// followed by the synthetic own-properties member when there is one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub members: Vec<Model>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    pub property_name: String,
    /// Discriminator value → model name.
    pub mapping: Vec<(String, String)>,
}

/// One member of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMember {
    pub name: String,
    /// The literal as it should be emitted (`'text'` or `42`).
    pub value: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// JSON Schema validation keywords carried through unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ExclusiveBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ExclusiveBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
}

impl Model {
    pub fn new(name: impl Into<String>, kind: ModelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            is_definition: false,
            is_read_only: false,
            is_required: false,
            is_nullable: false,
            deprecated: false,
            default: None,
            example: None,
            format: None,
            constraints: Constraints::default(),
            imports: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// A `generic` model of the given primitive type.
    pub fn generic(name: impl Into<String>, ty: &str) -> Self {
        Self::new(name, ModelKind::Generic(TypeName::simple(ty)))
    }

    /// The `export` tag as emitted.
    pub fn export(&self) -> &'static str {
        match self.kind {
            ModelKind::Reference(_) => "reference",
            ModelKind::Generic(_) => "generic",
            ModelKind::Enum(_) => "enum",
            ModelKind::Array(_) => "array",
            ModelKind::Dictionary(_) => "dictionary",
            ModelKind::Interface(_) => "interface",
            ModelKind::OneOf(_) => "one-of",
            ModelKind::AnyOf(_) => "any-of",
            ModelKind::AllOf(_) => "all-of",
        }
    }

    /// The type triple; for arrays and dictionaries this is the element
    /// type, for enums `string`, for objects and compositions `any`.
    pub fn type_name(&self) -> TypeName {
        match &self.kind {
            ModelKind::Reference(ty) | ModelKind::Generic(ty) => ty.clone(),
            ModelKind::Array(link) | ModelKind::Dictionary(link) => link.ty.clone(),
            ModelKind::Enum(_) => TypeName::simple("string"),
            ModelKind::Interface(_)
            | ModelKind::OneOf(_)
            | ModelKind::AnyOf(_)
            | ModelKind::AllOf(_) => TypeName::any(),
        }
    }

    /// Interface properties, or composition members.
    pub fn properties(&self) -> &[Model] {
        match &self.kind {
            ModelKind::Interface(props) => props,
            ModelKind::OneOf(c) | ModelKind::AnyOf(c) | ModelKind::AllOf(c) => &c.members,
            _ => &[],
        }
    }

    pub fn enum_members(&self) -> &[EnumMember] {
        match &self.kind {
            ModelKind::Enum(members) => members,
            _ => &[],
        }
    }

    pub fn link(&self) -> Option<&Model> {
        match &self.kind {
            ModelKind::Array(link) | ModelKind::Dictionary(link) => link.model.as_deref(),
            _ => None,
        }
    }

    pub fn composition(&self) -> Option<(CompositionKind, &Composition)> {
        match &self.kind {
            ModelKind::OneOf(c) => Some((CompositionKind::OneOf, c)),
            ModelKind::AnyOf(c) => Some((CompositionKind::AnyOf, c)),
            ModelKind::AllOf(c) => Some((CompositionKind::AllOf, c)),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, ModelKind::Enum(_))
    }

    /// An untyped object with no properties and no hoisted enums.
    /// Dictionaries never count as empty.
    pub fn is_empty_object(&self) -> bool {
        !matches!(self.kind, ModelKind::Dictionary(_))
            && self.type_name().is_any()
            && self.properties().is_empty()
            && self.enums.is_empty()
    }

    /// Structural type equality: same type triple, recursing through links.
    pub fn same_type(&self, other: &Model) -> bool {
        if self.type_name() != other.type_name() {
            return false;
        }
        match (self.link(), other.link()) {
            (Some(a), Some(b)) => a.same_type(b),
            _ => true,
        }
    }
}

impl CompositionKind {
    pub fn wrap(self, composition: Composition) -> ModelKind {
        match self {
            CompositionKind::OneOf => ModelKind::OneOf(composition),
            CompositionKind::AnyOf => ModelKind::AnyOf(composition),
            CompositionKind::AllOf => ModelKind::AllOf(composition),
        }
    }
}
