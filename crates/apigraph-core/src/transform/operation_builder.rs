use indexmap::IndexMap;

use super::model_builder::ModelBuilder;
use super::name_normalizer::{operation_name, parameter_name};
use crate::error::ResolveError;
use crate::ir::{
    Model, ModelKind, Operation, OperationError, OperationParameter, OperationResponse,
    ParameterIn, ResponseIn, TypeName,
};
use crate::parse::media_type::MediaType;
use crate::parse::operation::Operation as OperationNode;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::request_body::RequestBody;
use crate::parse::response::{Response, ResponseOrRef};
use crate::parse::schema::SchemaOrRef;

/// Media types preferred when a body offers several, most preferred first.
/// Parameters after `;` are ignored when matching.
pub const BASIC_MEDIA_TYPES: &[&str] = &[
    "application/json-patch+json",
    "application/json",
    "application/x-www-form-urlencoded",
    "text/json",
    "text/plain",
    "multipart/form-data",
    "multipart/mixed",
    "multipart/related",
    "multipart/batch",
];

const FORM_MEDIA_TYPES: &[&str] = &["application/x-www-form-urlencoded", "multipart/form-data"];

const BINARY_MEDIA_TYPE: &str = "application/octet-stream";

/// Builds one [`Operation`] per path × method.
pub struct OperationBuilder<'a> {
    models: ModelBuilder<'a>,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(models: ModelBuilder<'a>) -> Self {
        Self { models }
    }

    /// Build an operation. `path_parameters` are the ones declared on the
    /// path item; operation-level parameters with the same name and location
    /// replace them.
    pub fn build(
        &mut self,
        path: &str,
        method: &str,
        node: &'a OperationNode,
        path_parameters: &'a [ParameterOrRef],
    ) -> Result<Operation, ResolveError> {
        let id = match node.operation_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("{method}:{path}"),
        };

        let mut operation = Operation {
            id,
            name: operation_name(path, method, node.operation_id.as_deref()),
            summary: node.summary.clone(),
            description: node.description.clone(),
            deprecated: node.deprecated == Some(true),
            method: method.to_uppercase(),
            path: path.to_string(),
            tags: node.tags.clone(),
            parameters: Vec::new(),
            imports: Vec::new(),
            errors: Vec::new(),
            results: Vec::new(),
            response_header: None,
            external_docs: node.external_docs.as_ref().map(|docs| docs.url.clone()),
        };

        for parameter in self.merged_parameters(path_parameters, &node.parameters)? {
            if parameter.name == "api-version" {
                continue;
            }
            let built = self.parameter(parameter, node)?;
            operation.imports.extend(built.model.imports.iter().cloned());
            operation.parameters.push(built);
        }

        if let Some(body) = node
            .request_body
            .as_ref()
            .filter(|_| self.models.dialect().has_request_bodies())
        {
            let body = self.models.refs().resolve_request_body(body)?;
            let built = self.request_body(body)?;
            operation.imports.extend(built.model.imports.iter().cloned());
            operation.parameters.push(built);
        }

        let responses = self.responses(&node.responses)?;
        operation.errors = errors(&responses);
        operation.results = results(&responses);
        operation.response_header = operation
            .results
            .iter()
            .find(|r| r.location == ResponseIn::Header)
            .map(|r| r.model.name.clone());
        for result in &operation.results {
            operation.imports.extend(result.model.imports.iter().cloned());
        }

        operation.parameters.sort_by_key(|p| !p.needs_value());

        log::debug!(
            "built operation {} ({} {})",
            operation.name,
            operation.method,
            operation.path
        );
        Ok(operation)
    }

    /// Path-level parameters followed by operation-level ones; an operation
    /// parameter with the same name and location takes the earlier one's
    /// place.
    fn merged_parameters(
        &self,
        path_level: &'a [ParameterOrRef],
        operation_level: &'a [ParameterOrRef],
    ) -> Result<Vec<&'a Parameter>, ResolveError> {
        let refs = self.models.refs();
        let mut merged: Vec<&'a Parameter> = Vec::with_capacity(path_level.len() + operation_level.len());

        for node in path_level {
            merged.push(refs.resolve_parameter(node)?);
        }
        for node in operation_level {
            let parameter = refs.resolve_parameter(node)?;
            let existing = merged
                .iter()
                .position(|p| p.name == parameter.name && p.location == parameter.location);
            match existing {
                Some(index) => merged[index] = parameter,
                None => merged.push(parameter),
            }
        }

        Ok(merged)
    }

    fn parameter(
        &mut self,
        parameter: &'a Parameter,
        operation: &'a OperationNode,
    ) -> Result<OperationParameter, ResolveError> {
        let location = match parameter.location {
            ParameterLocation::Path => ParameterIn::Path,
            ParameterLocation::Query => ParameterIn::Query,
            ParameterLocation::Header => ParameterIn::Header,
            ParameterLocation::Cookie => ParameterIn::Cookie,
            ParameterLocation::FormData => ParameterIn::FormData,
            ParameterLocation::Body => ParameterIn::Body,
        };
        let name = parameter_name(&parameter.name);

        let mut media_type = None;
        let mut model = if let Some(schema) = &parameter.schema {
            self.models.build(&name, schema, false)?
        } else if let Some((key, schema)) = select_media_type(&parameter.content) {
            media_type = Some(key.to_string());
            self.models.build(&name, schema, false)?
        } else if parameter.has_inline_type() {
            self.models.build_schema(&name, &parameter.inline, false)?
        } else {
            Model::generic(name.as_str(), "any")
        };

        if location == ParameterIn::Body {
            let consumes = if operation.consumes.is_empty() {
                &self.models.doc().consumes
            } else {
                &operation.consumes
            };
            media_type = select_from_list(consumes).map(str::to_string);
        }

        model.name = name;
        if parameter.description.is_some() {
            model.description = parameter.description.clone();
        }
        model.deprecated |= parameter.deprecated == Some(true);
        model.is_required |= parameter.required;

        Ok(OperationParameter {
            location,
            prop: parameter.name.clone(),
            original_name: parameter.name.clone(),
            media_type,
            model,
        })
    }

    /// The request body as a synthetic parameter. Its media type decides
    /// the shape: binary upload, whole form, or plain body.
    fn request_body(&mut self, body: &'a RequestBody) -> Result<OperationParameter, ResolveError> {
        let Some((media_type, schema)) = select_media_type(&body.content) else {
            let mut model = Model::generic("body", "any");
            model.description = body.description.clone();
            model.is_required = body.required;
            return Ok(OperationParameter {
                location: ParameterIn::Body,
                prop: "body".to_string(),
                original_name: "body".to_string(),
                media_type: None,
                model,
            });
        };

        let essence = media_type_essence(media_type);
        let (location, name) = if essence == BINARY_MEDIA_TYPE {
            (ParameterIn::Body, "file")
        } else if FORM_MEDIA_TYPES.contains(&essence) {
            (ParameterIn::FormData, "formData")
        } else {
            (ParameterIn::Body, "body")
        };

        let mut model = self.models.build(name, schema, false)?;
        if essence == BINARY_MEDIA_TYPE {
            model.kind = ModelKind::Generic(TypeName::simple("binary"));
            model.imports.clear();
            model.enums.clear();
        }
        model.name = name.to_string();
        model.description = body.description.clone();
        model.is_required |= body.required;

        Ok(OperationParameter {
            location,
            prop: name.to_string(),
            original_name: name.to_string(),
            media_type: Some(media_type.to_string()),
            model,
        })
    }

    /// Declared responses with a usable status code, sorted by code.
    fn responses(
        &mut self,
        responses: &'a IndexMap<String, ResponseOrRef>,
    ) -> Result<Vec<OperationResponse>, ResolveError> {
        let mut built = Vec::with_capacity(responses.len());
        for (key, node) in responses {
            let Some(code) = response_code(key) else {
                log::debug!("ignoring response key {key}");
                continue;
            };
            let response = self.models.refs().resolve_response(node)?;
            built.push(self.response(response, code)?);
        }
        built.sort_by_key(|r| r.code);
        Ok(built)
    }

    fn response(
        &mut self,
        response: &'a Response,
        code: u16,
    ) -> Result<OperationResponse, ResolveError> {
        let refs = self.models.refs();

        let mut headers = Vec::with_capacity(response.headers.len());
        for (header_name, node) in &response.headers {
            let header = refs.resolve_header(node)?;
            let mut model = if let Some(schema) = &header.schema {
                self.models.build(header_name, schema, false)?
            } else if !header.inline.is_untyped() {
                self.models.build_schema(header_name, &header.inline, false)?
            } else {
                continue;
            };
            if header.description.is_some() {
                model.description = header.description.clone();
            }
            model.is_required |= header.required;
            model.deprecated |= header.deprecated == Some(true);
            headers.push(model);
        }

        let body = select_media_type(&response.content)
            .map(|(_, schema)| schema)
            .or(response.schema.as_ref());

        let (location, mut model) = match (body, response.headers.keys().next()) {
            (Some(schema), _) => (ResponseIn::Response, self.models.build("", schema, false)?),
            (None, Some(first_header)) => (
                ResponseIn::Header,
                Model::generic(first_header.as_str(), "string"),
            ),
            (None, None) => (ResponseIn::Response, Model::generic("", "any")),
        };

        let response_description =
            Some(response.description.clone()).filter(|d| !d.is_empty());
        if response_description.is_some() {
            model.description = response_description.clone();
        }
        for header in &headers {
            model.imports.extend(header.imports.iter().cloned());
        }

        Ok(OperationResponse {
            location,
            code,
            response_description,
            headers,
            model,
        })
    }
}

/// `"default"` counts as 200 and `4XX` as 400; anything else must be a
/// plain non-negative status.
pub fn response_code(key: &str) -> Option<u16> {
    let key = key.trim();
    if key == "default" {
        return Some(200);
    }
    let bytes = key.as_bytes();
    if bytes.len() == 3 && bytes[0].is_ascii_digit() && key[1..].eq_ignore_ascii_case("xx") {
        return Some(u16::from(bytes[0] - b'0') * 100);
    }
    key.parse().ok()
}

fn media_type_essence(media_type: &str) -> &str {
    media_type.split(';').next().unwrap_or(media_type).trim()
}

/// Pick the body schema: the most preferred basic media type that has a
/// schema, otherwise the first declared one that has a schema.
pub fn select_media_type(content: &IndexMap<String, MediaType>) -> Option<(&str, &SchemaOrRef)> {
    let with_schema = || {
        content
            .iter()
            .filter_map(|(key, media)| media.schema.as_ref().map(|schema| (key.as_str(), schema)))
    };
    BASIC_MEDIA_TYPES
        .iter()
        .find_map(|basic| with_schema().find(|(key, _)| media_type_essence(key) == *basic))
        .or_else(|| with_schema().next())
}

/// Same preference over a Swagger 2.0 `consumes` list.
fn select_from_list(media_types: &[String]) -> Option<&str> {
    BASIC_MEDIA_TYPES
        .iter()
        .find_map(|basic| {
            media_types
                .iter()
                .find(|m| media_type_essence(m) == *basic)
        })
        .or_else(|| media_types.first())
        .map(String::as_str)
}

/// 2xx responses except 204, or a synthetic `void` 200. Responses with the
/// same type as an earlier one are dropped.
fn results(responses: &[OperationResponse]) -> Vec<OperationResponse> {
    let mut results: Vec<OperationResponse> = Vec::new();
    for response in responses {
        let success = (200..300).contains(&response.code) && response.code != 204;
        if success && !results.iter().any(|r| r.model.same_type(&response.model)) {
            results.push(response.clone());
        }
    }
    if results.is_empty() {
        results.push(OperationResponse {
            location: ResponseIn::Response,
            code: 200,
            response_description: None,
            headers: Vec::new(),
            model: Model::generic("", "void"),
        });
    }
    results
}

/// Non-2xx responses that carry a description of their own.
fn errors(responses: &[OperationResponse]) -> Vec<OperationError> {
    responses
        .iter()
        .filter(|r| !(200..300).contains(&r.code))
        .filter_map(|r| {
            r.response_description
                .as_ref()
                .map(|description| OperationError {
                    code: r.code,
                    description: description.clone(),
                })
        })
        .collect()
}
