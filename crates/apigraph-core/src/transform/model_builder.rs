use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use super::dialect::Dialect;
use super::name_normalizer::{NameRegistry, enum_member_name, model_name};
use super::type_mapper::{TypeMapper, split_generic};
use crate::error::ResolveError;
use crate::ir::{
    CompositionKind, Constraints, EnumMember, Link, Model, ModelKind, ResolvedType, TypeName,
};
use crate::parse::document::Document;
use crate::parse::ref_resolve::{RefResolver, decode_pointer_segment};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

/// Converts schema nodes into [`Model`]s.
///
/// One builder serves all three dialects; the [`Dialect`] decides
/// nullability and reference namespaces. `$ref`s are never expanded into the
/// tree, so recursion only follows inline nesting. The one place a target is
/// expanded (required-promotion across composition members) is guarded by
/// `expanding`.
pub struct ModelBuilder<'a> {
    doc: &'a Document,
    dialect: Dialect,
    refs: RefResolver<'a>,
    types: TypeMapper,
    names: HashMap<String, String>,
    pub(super) expanding: Vec<String>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(doc: &'a Document, dialect: Dialect) -> Self {
        Self {
            doc,
            dialect,
            refs: RefResolver::new(doc),
            types: TypeMapper::new(dialect),
            names: definition_names(doc),
            expanding: Vec::new(),
        }
    }

    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn refs(&self) -> RefResolver<'a> {
        self.refs
    }

    /// Build every named schema of the document as a top-level model.
    pub fn build_definitions(&mut self) -> Result<Vec<Model>, ResolveError> {
        let doc = self.doc;
        let schemas = doc.schemas();
        let mut models = Vec::with_capacity(schemas.len());

        for (raw_name, node) in schemas {
            let identity = schema_identity(&format!("{}{}", self.dialect.schema_prefix(), raw_name));
            self.expanding.push(identity);
            let name = self.definition_name(raw_name);
            let built = self.build(&name, node, true);
            self.expanding.pop();

            let mut model = built?;
            if let Some(example) = self.named_example(raw_name) {
                model.example = Some(example);
            }
            log::debug!("built model {} ({})", model.name, model.export());
            models.push(model);
        }

        Ok(models)
    }

    /// Build a model from a schema or reference.
    pub fn build(
        &mut self,
        name: &str,
        node: &'a SchemaOrRef,
        is_definition: bool,
    ) -> Result<Model, ResolveError> {
        match node {
            SchemaOrRef::Ref { ref_path } => {
                let mut model = self.reference(name, ref_path)?;
                model.is_definition = is_definition;
                Ok(model)
            }
            SchemaOrRef::Schema(schema) => self.build_schema(name, schema, is_definition),
        }
    }

    /// A `reference` model pointing at `ref_path`, which must exist.
    pub fn reference(&self, name: &str, ref_path: &str) -> Result<Model, ResolveError> {
        let resolved = self.resolve_reference(ref_path)?;
        let mut model = Model::new(name, ModelKind::Reference(resolved.name));
        model.imports = resolved.imports;
        Ok(model)
    }

    pub(super) fn resolve_reference(&self, ref_path: &str) -> Result<ResolvedType, ResolveError> {
        self.refs.lookup(ref_path)?;
        Ok(self.reference_type(ref_path))
    }

    /// The type a pointer names. Pointers at named schemas yield that
    /// model's (possibly deduplicated) name; bracketed generics and anything
    /// else go through the type mapper.
    pub(super) fn reference_type(&self, ref_path: &str) -> ResolvedType {
        let named = ref_path
            .trim()
            .strip_prefix(self.dialect.schema_prefix())
            .map(decode_pointer_segment)
            .filter(|tail| split_generic(tail).is_none())
            .and_then(|tail| self.names.get(&tail));
        match named {
            Some(name) => ResolvedType {
                name: TypeName::simple(name.clone()),
                imports: vec![name.clone()],
                is_nullable: false,
            },
            None => self.types.resolve_ref(ref_path),
        }
    }

    fn definition_name(&self, raw_name: &str) -> String {
        self.names
            .get(raw_name)
            .cloned()
            .unwrap_or_else(|| model_name(raw_name))
    }

    /// Build a model from an inline schema. The first matching rule wins:
    /// enum, array, dictionary, composition, object, primitive, then `any`.
    pub fn build_schema(
        &mut self,
        name: &str,
        schema: &'a Schema,
        is_definition: bool,
    ) -> Result<Model, ResolveError> {
        let primary = schema.primary_type();

        let mut model = Model::new(name, ModelKind::Generic(TypeName::any()));
        model.description = schema.description.clone();
        model.is_definition = is_definition;
        model.is_read_only = schema.read_only == Some(true);
        model.is_nullable = self.dialect.is_nullable(schema);
        model.deprecated = schema.deprecated == Some(true);
        model.example = schema.example.clone();
        model.format = schema.format.clone();
        model.constraints = constraints_of(schema);

        if !schema.enum_values.is_empty() && primary != Some(&SchemaType::Boolean) {
            let members = enum_members(schema);
            if !members.is_empty() {
                model.default = enum_default(schema, &members);
                model.kind = ModelKind::Enum(members);
                return Ok(model);
            }
        }

        if primary == Some(&SchemaType::Array) {
            if let Some(items) = &schema.items {
                let (link, imports) = self.link(items)?;
                model.imports.extend(imports);
                model.kind = ModelKind::Array(link);
                return Ok(model);
            }
        }

        if primary == Some(&SchemaType::Object) {
            if let Some(AdditionalProperties::Schema(values)) = &schema.additional_properties {
                let (link, imports) = self.link(values)?;
                model.imports.extend(imports);
                model.kind = ModelKind::Dictionary(link);
                model.default = render_default(schema);
                return Ok(model);
            }
        }

        let compositions = [
            (CompositionKind::OneOf, &schema.one_of),
            (CompositionKind::AnyOf, &schema.any_of),
            (CompositionKind::AllOf, &schema.all_of),
        ];
        for (kind, members) in compositions {
            if members.is_empty() {
                continue;
            }
            let composed = self.compose(schema, members, kind)?;
            model.imports.extend(composed.imports);
            model.enums.extend(composed.enums);
            model.kind = kind.wrap(composed.composition);
            return Ok(model);
        }

        let untyped_with_properties = schema.schema_type.is_none() && !schema.properties.is_empty();
        if primary == Some(&SchemaType::Object) || untyped_with_properties {
            let properties = self.build_properties(schema)?;
            for property in &properties {
                model.imports.extend(property.imports.iter().cloned());
                model.enums.extend(property.enums.iter().cloned());
                if property.is_enum() {
                    model.enums.push(property.clone());
                }
            }
            model.kind = ModelKind::Interface(properties);
            return Ok(model);
        }

        if let Some(types) = &schema.schema_type {
            let resolved = self.types.resolve_type_set(types, schema.format.as_deref());
            model.is_nullable |= resolved.is_nullable;
            model.kind = if resolved.imports.is_empty() {
                ModelKind::Generic(resolved.name)
            } else {
                ModelKind::Reference(resolved.name)
            };
            model.imports.extend(resolved.imports);
            model.default = render_default(schema);
            return Ok(model);
        }

        Ok(model)
    }

    /// Build each declared property, marking the ones the parent requires.
    pub(super) fn build_properties(&mut self, schema: &'a Schema) -> Result<Vec<Model>, ResolveError> {
        let mut properties = Vec::with_capacity(schema.properties.len());
        for (property_name, node) in &schema.properties {
            let mut property = self.build(property_name, node, false)?;
            property.is_required = schema.required.iter().any(|r| r == property_name);
            properties.push(property);
        }
        Ok(properties)
    }

    /// Element link for arrays and dictionaries: a `$ref` element is named
    /// only, an inline element is built and owned.
    fn link(&mut self, node: &'a SchemaOrRef) -> Result<(Link, Vec<String>), ResolveError> {
        match node {
            SchemaOrRef::Ref { ref_path } => {
                let resolved = self.resolve_reference(ref_path)?;
                Ok((
                    Link {
                        ty: resolved.name,
                        model: None,
                    },
                    resolved.imports,
                ))
            }
            SchemaOrRef::Schema(schema) => {
                let inner = self.build_schema("", schema, false)?;
                let imports = inner.imports.clone();
                Ok((
                    Link {
                        ty: inner.type_name(),
                        model: Some(Box::new(inner)),
                    },
                    imports,
                ))
            }
        }
    }

    fn named_example(&self, raw_name: &str) -> Option<Value> {
        self.doc
            .components
            .as_ref()
            .and_then(|c| c.examples.get(raw_name))
            .and_then(|example| example.value.clone())
    }
}

/// Model names for every named schema. Schemas whose names normalize to the
/// same identifier are numbered in declaration order.
fn definition_names(doc: &Document) -> HashMap<String, String> {
    let mut registry = NameRegistry::default();
    doc.schemas()
        .keys()
        .map(|raw| {
            let preferred = model_name(raw);
            let unique = registry.claim(&preferred);
            if unique != preferred {
                log::warn!("schema {raw} renamed to {unique}");
            }
            (raw.clone(), unique)
        })
        .collect()
}

/// Identity of a schema pointer, independent of how its tail was escaped.
pub(super) fn schema_identity(ref_path: &str) -> String {
    decode_pointer_segment(ref_path)
}

fn constraints_of(schema: &Schema) -> Constraints {
    Constraints {
        maximum: schema.maximum,
        exclusive_maximum: schema.exclusive_maximum,
        minimum: schema.minimum,
        exclusive_minimum: schema.exclusive_minimum,
        multiple_of: schema.multiple_of,
        max_length: schema.max_length,
        min_length: schema.min_length,
        pattern: schema.pattern.clone(),
        max_items: schema.max_items,
        min_items: schema.min_items,
        unique_items: schema.unique_items,
        max_properties: schema.max_properties,
        min_properties: schema.min_properties,
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "\\'"))
}

/// Enum members: deduplicated by value, strings and numbers only, with
/// `x-enum-varnames` / `x-enum-descriptions` applied by position.
pub(super) fn enum_members(schema: &Schema) -> Vec<EnumMember> {
    let mut seen: Vec<&Value> = Vec::new();
    let mut members = Vec::new();

    for value in &schema.enum_values {
        if seen.contains(&value) {
            continue;
        }
        seen.push(value);
        let member = match value {
            Value::Number(n) => EnumMember {
                name: format!("_{n}").replace(['.', '-', '+'], "_"),
                value: n.to_string(),
                ty: "number".to_string(),
                description: None,
            },
            Value::String(s) => EnumMember {
                name: enum_member_name(s),
                value: quote(s),
                ty: "string".to_string(),
                description: None,
            },
            _ => continue,
        };
        members.push(member);
    }

    for (index, member) in members.iter_mut().enumerate() {
        if let Some(Value::String(name)) = schema.enum_varnames.get(index) {
            if !name.is_empty() {
                member.name = name.clone();
            }
        }
        if let Some(Value::String(description)) = schema.enum_descriptions.get(index) {
            if !description.is_empty() {
                member.description = Some(description.clone());
            }
        }
    }

    members
}

/// An enum default names the member holding that value; anything else falls
/// back to the rendered literal.
fn enum_default(schema: &Schema, members: &[EnumMember]) -> Option<String> {
    let literal = match schema.default_value.as_ref()? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        _ => return render_default(schema),
    };
    members
        .iter()
        .find(|m| m.value == literal)
        .map(|m| m.name.clone())
        .or_else(|| render_default(schema))
}

/// Render a default literal: strings quoted, numbers and booleans raw,
/// objects and arrays as pretty JSON.
pub(super) fn render_default(schema: &Schema) -> Option<String> {
    match schema.default_value.as_ref()? {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(quote(s)),
        value @ (Value::Array(_) | Value::Object(_)) => pretty_json(value),
    }
}

fn pretty_json(value: &Value) -> Option<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn build_one(yaml: &str, name: &str) -> Model {
        let doc = parse::from_yaml(yaml).unwrap();
        let dialect = Dialect::detect(&doc).unwrap();
        let mut builder = ModelBuilder::new(&doc, dialect);
        builder
            .build_definitions()
            .unwrap()
            .into_iter()
            .find(|m| m.name == name)
            .unwrap()
    }

    #[test]
    fn test_enum_beats_string() {
        let model = build_one(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Status:
      type: string
      enum: [active, "on hold", active]
"#,
            "Status",
        );
        assert_eq!(model.export(), "enum");
        let names: Vec<&str> = model.enum_members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ACTIVE", "ON_HOLD"]);
        assert_eq!(model.enum_members()[0].value, "'active'");
    }

    #[test]
    fn test_boolean_enum_is_generic() {
        let model = build_one(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Flag:
      type: boolean
      enum: [true]
"#,
            "Flag",
        );
        assert_eq!(model.export(), "generic");
        assert_eq!(model.type_name().ty, "boolean");
    }

    #[test]
    fn test_enum_vendor_extensions() {
        let model = build_one(
            r#"
swagger: "2.0"
info: { title: t, version: "1" }
paths: {}
definitions:
  Level:
    type: integer
    enum: [1, 2]
    x-enum-varnames: [Low, High]
    x-enum-descriptions: [Lowest level]
"#,
            "Level",
        );
        let members = model.enum_members();
        assert_eq!(members[0].name, "Low");
        assert_eq!(members[0].description.as_deref(), Some("Lowest level"));
        assert_eq!(members[1].name, "High");
        assert_eq!(members[1].description, None);
        assert_eq!(members[1].ty, "number");
    }

    #[test]
    fn test_enum_default_names_member() {
        let model = build_one(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Priority:
      type: integer
      enum: [1, 2]
      default: 1
"#,
            "Priority",
        );
        assert_eq!(model.default.as_deref(), Some("_1"));
    }

    #[test]
    fn test_array_of_ref_has_no_link() {
        let model = build_one(
            r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Pet:
      type: object
    Pets:
      type: array
      items:
        $ref: "#/components/schemas/Pet"
"##,
            "Pets",
        );
        assert_eq!(model.export(), "array");
        assert_eq!(model.type_name().ty, "Pet");
        assert!(model.link().is_none());
        assert_eq!(model.imports, vec!["Pet"]);
    }

    #[test]
    fn test_inline_array_owns_link() {
        let model = build_one(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Tags:
      type: array
      items:
        type: string
"#,
            "Tags",
        );
        assert_eq!(model.type_name().ty, "string");
        assert_eq!(model.link().map(Model::export), Some("generic"));
    }

    #[test]
    fn test_dictionary() {
        let model = build_one(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Counts:
      type: object
      additionalProperties:
        type: integer
      default: { a: 1 }
"#,
            "Counts",
        );
        assert_eq!(model.export(), "dictionary");
        assert_eq!(model.type_name().ty, "number");
        assert_eq!(model.default.as_deref(), Some("{\n    \"a\": 1\n}"));
    }

    #[test]
    fn test_interface_required_and_hoisted_enums() {
        let model = build_one(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Pet:
      type: object
      required: [name]
      properties:
        name:
          type: string
          default: Rex
        kind:
          type: string
          enum: [cat, dog]
"#,
            "Pet",
        );
        assert_eq!(model.export(), "interface");
        let props = model.properties();
        assert!(props[0].is_required);
        assert_eq!(props[0].default.as_deref(), Some("'Rex'"));
        assert!(!props[1].is_required);
        assert_eq!(model.enums.len(), 1);
        assert_eq!(model.enums[0].name, "kind");
    }

    #[test]
    fn test_untyped_is_any() {
        let model = build_one(
            r#"
openapi: 3.1.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Anything: {}
"#,
            "Anything",
        );
        assert_eq!(model.export(), "generic");
        assert!(model.type_name().is_any());
    }

    #[test]
    fn test_nullability_per_dialect() {
        let v31 = build_one(
            r#"
openapi: 3.1.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    MaybeName:
      type: [string, "null"]
"#,
            "MaybeName",
        );
        assert!(v31.is_nullable);
        assert_eq!(v31.type_name().ty, "string");

        let v2 = build_one(
            r#"
swagger: "2.0"
info: { title: t, version: "1" }
paths: {}
definitions:
  MaybeName:
    type: string
    x-nullable: true
"#,
            "MaybeName",
        );
        assert!(v2.is_nullable);
    }

    #[test]
    fn test_unresolved_property_ref_fails() {
        let doc = parse::from_yaml(
            r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Owner:
      type: object
      properties:
        pet:
          $ref: "#/components/schemas/Missing"
"##,
        )
        .unwrap();
        let mut builder = ModelBuilder::new(&doc, Dialect::OpenApi30);
        assert!(matches!(
            builder.build_definitions(),
            Err(ResolveError::UnresolvedRef(_))
        ));
    }

    #[test]
    fn test_named_example() {
        let model = build_one(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Pet:
      type: object
  examples:
    Pet:
      value: { name: Rex }
"#,
            "Pet",
        );
        assert_eq!(model.example, Some(serde_json::json!({"name": "Rex"})));
    }

    #[test]
    fn test_colliding_schema_names_numbered() {
        let doc = parse::from_yaml(
            r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    pet:
      type: object
    Pet:
      type: string
    Owner:
      type: object
      properties:
        first:
          $ref: "#/components/schemas/pet"
        second:
          $ref: "#/components/schemas/Pet"
"##,
        )
        .unwrap();
        let models = ModelBuilder::new(&doc, Dialect::OpenApi30)
            .build_definitions()
            .unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Pet", "Pet1", "Owner"]);

        let owner = &models[2];
        assert_eq!(owner.properties()[0].type_name().ty, "Pet");
        assert_eq!(owner.properties()[1].type_name().ty, "Pet1");
        assert_eq!(owner.imports, vec!["Pet", "Pet1"]);
    }
}
