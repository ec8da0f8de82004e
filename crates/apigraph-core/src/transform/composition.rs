use super::model_builder::{ModelBuilder, schema_identity};
use crate::error::ResolveError;
use crate::ir::{Composition, CompositionKind, Discriminator, Model, ModelKind};
use crate::parse::schema::{Schema, SchemaOrRef};

/// A flattened `oneOf`/`anyOf`/`allOf` plus what it contributes to the
/// enclosing model.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedModel {
    pub composition: Composition,
    pub imports: Vec<String>,
    pub enums: Vec<Model>,
}

/// Name of the synthetic member holding the composing schema's own
/// properties.
pub const OWN_PROPERTIES: &str = "properties";

impl<'a> ModelBuilder<'a> {
    /// Flatten a composition.
    ///
    /// Members that come out as empty objects are dropped. Properties the
    /// composing schema requires but members declare optional are copied as
    /// required, and together with the schema's own properties form a
    /// trailing synthetic interface member.
    pub fn compose(
        &mut self,
        schema: &'a Schema,
        members: &'a [SchemaOrRef],
        kind: CompositionKind,
    ) -> Result<ComposedModel, ResolveError> {
        let mut composed = ComposedModel {
            composition: Composition {
                members: Vec::with_capacity(members.len() + 1),
                discriminator: None,
            },
            imports: Vec::new(),
            enums: Vec::new(),
        };

        for node in members {
            let member = self.build("", node, false)?;
            if member.is_empty_object() {
                log::debug!("dropping empty {kind:?} member");
                continue;
            }
            composed.imports.extend(member.imports.iter().cloned());
            composed.enums.extend(member.enums.iter().cloned());
            composed.composition.members.push(member);
        }

        let mut own = Vec::new();

        if !schema.required.is_empty() {
            let promoted = self.promote_required(&schema.required, members)?;
            for property in &promoted {
                composed.imports.extend(property.imports.iter().cloned());
                composed.enums.extend(property.enums.iter().cloned());
            }
            own.extend(promoted);
        }

        if !schema.properties.is_empty() {
            let properties = self.build_properties(schema)?;
            for property in &properties {
                composed.imports.extend(property.imports.iter().cloned());
                composed.enums.extend(property.enums.iter().cloned());
                if property.is_enum() {
                    composed.enums.push(property.clone());
                }
            }
            own.retain(|promoted: &Model| !properties.iter().any(|p| p.name == promoted.name));
            own.extend(properties);
        }

        if !own.is_empty() {
            composed
                .composition
                .members
                .push(Model::new(OWN_PROPERTIES, ModelKind::Interface(own)));
        }

        if let Some(discriminator) = &schema.discriminator {
            composed.composition.discriminator = Some(Discriminator {
                property_name: discriminator.property_name.clone(),
                mapping: discriminator
                    .mapping
                    .iter()
                    .map(|(value, target)| (value.clone(), self.reference_type(target).name.ty))
                    .collect(),
            });
        }

        Ok(composed)
    }

    /// Copies of member properties that `required` names but the member
    /// leaves optional, marked required. Members are left untouched.
    fn promote_required(
        &mut self,
        required: &[String],
        members: &'a [SchemaOrRef],
    ) -> Result<Vec<Model>, ResolveError> {
        let mut promoted = Vec::new();

        for node in members {
            let model = match node {
                SchemaOrRef::Ref { ref_path } => {
                    let identity = schema_identity(ref_path);
                    if self.expanding.contains(&identity) {
                        log::debug!("not re-expanding {ref_path} during required promotion");
                        continue;
                    }
                    let target = self.refs().schema(ref_path)?;
                    self.expanding.push(identity);
                    let built = self.build_schema("", target, false);
                    self.expanding.pop();
                    built?
                }
                SchemaOrRef::Schema(schema) => self.build_schema("", schema, false)?,
            };

            promoted.extend(
                model
                    .properties()
                    .iter()
                    .filter(|p| !p.is_required && required.contains(&p.name))
                    .map(|p| Model {
                        is_required: true,
                        ..p.clone()
                    }),
            );
        }

        Ok(promoted)
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::Model;
    use crate::parse;
    use crate::transform::dialect::Dialect;
    use crate::transform::model_builder::ModelBuilder;

    fn definitions(yaml: &str) -> Vec<Model> {
        let doc = parse::from_yaml(yaml).unwrap();
        let dialect = Dialect::detect(&doc).unwrap();
        ModelBuilder::new(&doc, dialect).build_definitions().unwrap()
    }

    #[test]
    fn test_empty_branch_dropped() {
        let models = definitions(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Loose:
      anyOf:
        - {}
        - type: string
"#,
        );
        let loose = &models[0];
        assert_eq!(loose.export(), "any-of");
        assert_eq!(loose.properties().len(), 1);
        assert_eq!(loose.properties()[0].type_name().ty, "string");
    }

    #[test]
    fn test_required_promotion() {
        let models = definitions(
            r#"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Both:
      allOf:
        - type: object
          properties:
            a: { type: string }
        - type: object
          properties:
            b: { type: integer }
      required: [a, b]
"#,
        );
        let both = &models[0];
        assert_eq!(both.export(), "all-of");
        let members = both.properties();
        assert_eq!(members.len(), 3);

        // Members themselves are untouched.
        assert!(!members[0].properties()[0].is_required);
        assert!(!members[1].properties()[0].is_required);

        let own = members.last().unwrap();
        assert_eq!(own.name, "properties");
        let promoted: Vec<(&str, bool)> = own
            .properties()
            .iter()
            .map(|p| (p.name.as_str(), p.is_required))
            .collect();
        assert_eq!(promoted, vec![("a", true), ("b", true)]);
    }

    #[test]
    fn test_required_promotion_through_refs() {
        let models = definitions(
            r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Base:
      type: object
      properties:
        id: { type: string }
    Derived:
      allOf:
        - $ref: "#/components/schemas/Base"
        - type: object
          properties:
            extra: { type: string }
      required: [id]
"##,
        );
        let derived = models.iter().find(|m| m.name == "Derived").unwrap();
        let members = derived.properties();
        assert_eq!(members[0].export(), "reference");
        assert_eq!(derived.imports, vec!["Base"]);
        let own = members.last().unwrap();
        assert_eq!(own.properties()[0].name, "id");
        assert!(own.properties()[0].is_required);
    }

    #[test]
    fn test_own_properties_last() {
        let models = definitions(
            r##"
openapi: 3.1.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
    Cat:
      allOf:
        - $ref: "#/components/schemas/Pet"
      properties:
        indoor: { type: boolean }
"##,
        );
        let cat = models.iter().find(|m| m.name == "Cat").unwrap();
        let members = cat.properties();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].name, "properties");
        assert_eq!(members[1].properties()[0].name, "indoor");
    }

    #[test]
    fn test_mutual_refs_terminate() {
        let models = definitions(
            r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    A:
      allOf:
        - $ref: "#/components/schemas/B"
      required: [x]
    B:
      allOf:
        - $ref: "#/components/schemas/A"
        - type: object
          properties:
            x: { type: string }
      required: [y]
"##,
        );
        let a = models.iter().find(|m| m.name == "A").unwrap();
        assert_eq!(a.export(), "all-of");
        assert_eq!(a.imports, vec!["B"]);
    }

    #[test]
    fn test_discriminator_mapping() {
        let models = definitions(
            r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Cat: { type: object, properties: { meow: { type: boolean } } }
    Dog: { type: object, properties: { bark: { type: boolean } } }
    Pet:
      oneOf:
        - $ref: "#/components/schemas/Cat"
        - $ref: "#/components/schemas/Dog"
      discriminator:
        propertyName: kind
        mapping:
          cat: "#/components/schemas/Cat"
          dog: "#/components/schemas/Dog"
"##,
        );
        let pet = models.iter().find(|m| m.name == "Pet").unwrap();
        let (_, composition) = pet.composition().unwrap();
        let discriminator = composition.discriminator.as_ref().unwrap();
        assert_eq!(discriminator.property_name, "kind");
        assert_eq!(
            discriminator.mapping,
            vec![
                ("cat".to_string(), "Cat".to_string()),
                ("dog".to_string(), "Dog".to_string())
            ]
        );
    }
}
