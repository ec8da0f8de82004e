use std::collections::HashSet;

use super::service::disambiguate;
use crate::ir::{Client, Model, ModelKind, Operation, Service};

/// Final whole-client pass. Running it on its own output changes nothing.
pub fn postprocess(client: Client) -> Client {
    Client {
        version: client.version,
        models: client.models.into_iter().map(postprocess_model).collect(),
        services: client.services.into_iter().map(postprocess_service).collect(),
    }
}

fn postprocess_model(mut model: Model) -> Model {
    normalize(&mut model);
    let own_name = model.name.clone();
    model.imports.retain(|import| *import != own_name);
    model
}

/// Dedupe imports, hoisted enums and enum members of a model and of every
/// model nested inside it.
fn normalize(model: &mut Model) {
    model.imports = sorted_unique(std::mem::take(&mut model.imports));

    let mut seen = HashSet::new();
    model.enums.retain(|e| seen.insert(e.name.clone()));
    model.enums.iter_mut().for_each(normalize);

    match &mut model.kind {
        ModelKind::Enum(members) => {
            let mut seen = HashSet::new();
            members.retain(|m| seen.insert(m.name.clone()));
        }
        ModelKind::Interface(properties) => properties.iter_mut().for_each(normalize),
        ModelKind::OneOf(c) | ModelKind::AnyOf(c) | ModelKind::AllOf(c) => {
            c.members.iter_mut().for_each(normalize)
        }
        ModelKind::Array(link) | ModelKind::Dictionary(link) => {
            if let Some(inner) = link.model.as_deref_mut() {
                normalize(inner);
            }
        }
        ModelKind::Reference(_) | ModelKind::Generic(_) => {}
    }
}

fn postprocess_operation(mut operation: Operation) -> Operation {
    operation.imports = sorted_unique(operation.imports);
    for parameter in &mut operation.parameters {
        normalize(&mut parameter.model);
    }
    for result in &mut operation.results {
        normalize(&mut result.model);
        result.headers.iter_mut().for_each(normalize);
    }
    operation
}

fn postprocess_service(service: Service) -> Service {
    let operations: Vec<Operation> = service
        .operations
        .into_iter()
        .map(postprocess_operation)
        .collect();
    let imports = sorted_unique(
        operations
            .iter()
            .flat_map(|op| op.imports.iter().cloned())
            .collect(),
    );
    let mut service = Service {
        name: service.name,
        description: service.description,
        operations,
        imports,
    };
    disambiguate(&mut service);
    service
}

/// Unique by case-insensitive name (first spelling wins), sorted the way
/// locale collation orders identifiers: case-insensitive, with punctuation
/// before digits and digits before letters.
pub fn sorted_unique(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = names
        .into_iter()
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect();
    unique.sort_by_cached_key(|name| collation_key(name));
    unique
}

fn collation_key(name: &str) -> Vec<(u8, char)> {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            let class = if c.is_alphabetic() {
                2
            } else if c.is_numeric() {
                1
            } else {
                0
            };
            (class, c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EnumMember, Service, TypeName};

    #[test]
    fn test_sorted_unique() {
        let names = vec!["pet".into(), "Owner".into(), "Pet".into(), "alpha".into()];
        assert_eq!(sorted_unique(names), vec!["alpha", "Owner", "pet"]);
    }

    #[test]
    fn test_sorted_unique_orders_punctuation_before_digits() {
        let names = vec!["ab".into(), "a1".into(), "a_b".into(), "A2".into()];
        assert_eq!(sorted_unique(names), vec!["a_b", "a1", "A2", "ab"]);
    }

    #[test]
    fn test_model_imports_exclude_self() {
        let mut model = Model::generic("Node", "any");
        model.imports = vec!["Node".into(), "Leaf".into(), "Leaf".into()];
        let processed = postprocess_model(model);
        assert_eq!(processed.imports, vec!["Leaf"]);
    }

    #[test]
    fn test_enum_members_deduped_by_name() {
        let member = |name: &str, value: &str| EnumMember {
            name: name.into(),
            value: value.into(),
            ty: "string".into(),
            description: None,
        };
        let model = Model::new(
            "Color",
            ModelKind::Enum(vec![member("RED", "'red'"), member("RED", "'Red'")]),
        );
        let processed = postprocess_model(model);
        assert_eq!(processed.enum_members().len(), 1);
        assert_eq!(processed.enum_members()[0].value, "'red'");
    }

    #[test]
    fn test_service_imports_accumulate() {
        let operation = |name: &str, imports: &[&str]| Operation {
            id: name.into(),
            name: "same".into(),
            summary: None,
            description: None,
            deprecated: false,
            method: "GET".into(),
            path: "/".into(),
            tags: vec!["t".into()],
            parameters: vec![],
            imports: imports.iter().map(|s| s.to_string()).collect(),
            errors: vec![],
            results: vec![],
            response_header: None,
            external_docs: None,
        };
        let client = Client {
            version: "1".into(),
            models: vec![],
            services: vec![Service {
                name: "t".into(),
                description: None,
                operations: vec![operation("a", &["Pet", "Owner"]), operation("b", &["Pet"])],
                imports: vec![],
            }],
        };
        let processed = postprocess(client);
        let service = &processed.services[0];
        assert_eq!(service.imports, vec!["Owner", "Pet"]);
        assert_eq!(service.operations[0].name, "same");
        assert_eq!(service.operations[1].name, "same1");

        let again = postprocess(processed.clone());
        assert_eq!(again, processed);
    }

    #[test]
    fn test_nested_imports_deduped() {
        let mut inner = Model::new(
            "inner",
            ModelKind::Interface(vec![
                Model::new("a", ModelKind::Reference(TypeName::simple("Pet"))),
                Model::new("b", ModelKind::Reference(TypeName::simple("Pet"))),
            ]),
        );
        inner.imports = vec!["Pet".into(), "Pet".into()];
        let mut owner = Model::new("Owner", ModelKind::Interface(vec![inner]));
        owner.imports = vec!["Pet".into(), "Pet".into()];

        let processed = postprocess_model(owner);
        assert_eq!(processed.imports, vec!["Pet"]);
        assert_eq!(processed.properties()[0].imports, vec!["Pet"]);
    }

    #[test]
    fn test_nested_imports_keep_property_named_like_its_type() {
        let mut pet = Model::new("Pet", ModelKind::Reference(TypeName::simple("Pet")));
        pet.imports = vec!["Pet".into()];
        let mut owner = Model::new("Owner", ModelKind::Interface(vec![pet]));
        owner.imports = vec!["Pet".into()];

        let processed = postprocess_model(owner);
        assert_eq!(processed.properties()[0].imports, vec!["Pet"]);
    }
}
