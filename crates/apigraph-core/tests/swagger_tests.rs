use apigraph_core::ir::{Client, ParameterIn};
use apigraph_core::parse;
use apigraph_core::transform;

const PETSTORE: &str = include_str!("fixtures/petstore-2.0.yaml");

fn petstore() -> Client {
    let doc = parse::from_yaml(PETSTORE).unwrap();
    transform::resolve(&doc).unwrap()
}

#[test]
fn swagger_definitions() {
    let client = petstore();
    let names: Vec<&str> = client.models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Pet", "Category", "Error"]);

    let pet = client.model("Pet").unwrap();
    assert_eq!(pet.imports, vec!["Category"]);

    let props = pet.properties();
    assert_eq!(props[0].type_name().ty, "number");
    assert_eq!(props[0].format.as_deref(), Some("int64"));
    assert!(props[1].is_required);
    assert!(props[2].is_nullable);
    assert!(!props[1].is_nullable);
    assert_eq!(props[3].type_name().ty, "Category");
}

#[test]
fn inline_parameter_types() {
    let client = petstore();
    let op = client.operations().find(|op| op.id == "listPets").unwrap();

    let limit = &op.parameters[0];
    assert_eq!(limit.location, ParameterIn::Query);
    assert_eq!(limit.model.type_name().ty, "number");
    assert_eq!(limit.model.constraints.maximum, Some(100.0));

    let status = &op.parameters[1];
    assert_eq!(status.name(), "status");
    assert_eq!(status.model.export(), "enum");
    assert_eq!(status.model.default.as_deref(), Some("AVAILABLE"));
}

#[test]
fn response_schema_and_inline_headers() {
    let client = petstore();
    let op = client.operations().find(|op| op.id == "listPets").unwrap();

    assert_eq!(op.results.len(), 1);
    let result = &op.results[0];
    assert_eq!(result.model.export(), "array");
    assert_eq!(result.model.type_name().ty, "Pet");
    assert_eq!(result.headers.len(), 1);
    assert_eq!(result.headers[0].name, "X-Total");
    assert_eq!(result.headers[0].type_name().ty, "number");

    assert_eq!(op.errors.len(), 1);
    assert_eq!(op.errors[0].code, 500);
    assert_eq!(op.errors[0].description, "Server error");
    assert_eq!(op.imports, vec!["Pet"]);
}

#[test]
fn body_parameter_uses_document_consumes() {
    let client = petstore();
    let op = client.operations().find(|op| op.id == "addPet").unwrap();

    let body = op.body_parameter().unwrap();
    assert_eq!(body.prop, "pet");
    assert_eq!(body.media_type.as_deref(), Some("application/json"));
    assert_eq!(body.model.type_name().ty, "Pet");
    assert!(body.needs_value());

    assert_eq!(op.results[0].code, 201);
    assert_eq!(op.results[0].model.description.as_deref(), Some("Created"));
}

#[test]
fn form_data_parameters() {
    let client = petstore();
    let op = client.operations().find(|op| op.id == "uploadPhoto").unwrap();

    let form: Vec<&str> = op.form_parameters().map(|p| p.name()).collect();
    assert_eq!(form, vec!["file", "caption"]);
    assert_eq!(op.parameters[1].model.type_name().ty, "binary");
    assert!(op.body_parameter().is_none());

    // The shared response is resolved through its reference.
    assert_eq!(op.results[0].model.description.as_deref(), Some("OK"));
}

#[test]
fn unresolved_definition_is_fatal() {
    let doc = parse::from_yaml(
        r##"
swagger: "2.0"
info: { title: t, version: "1" }
paths: {}
definitions:
  Broken:
    type: object
    properties:
      missing:
        $ref: "#/definitions/Nowhere"
"##,
    )
    .unwrap();
    let err = transform::resolve(&doc).unwrap_err();
    assert!(err.to_string().contains("#/definitions/Nowhere"));
}
