use serde::Serialize;

use super::schemas::Model;

/// Where an operation parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterIn {
    Path,
    Query,
    Header,
    Cookie,
    FormData,
    Body,
}

/// A model specialized as operation input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationParameter {
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// The wire name (`X-Request-Id`); `model.name` is the camel-cased one.
    pub prop: String,
    pub original_name: String,
    pub media_type: Option<String>,
    #[serde(flatten)]
    pub model: Model,
}

impl OperationParameter {
    pub fn name(&self) -> &str {
        &self.model.name
    }

    /// Required with nothing to fall back on.
    pub fn needs_value(&self) -> bool {
        self.model.is_required && self.model.default.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseIn {
    Response,
    Header,
}

/// A model specialized as an HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(rename = "in")]
    pub location: ResponseIn,
    pub code: u16,
    /// The response's own description. `model.description` may instead
    /// come from the body schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_description: Option<String>,
    pub headers: Vec<Model>,
    #[serde(flatten)]
    pub model: Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationError {
    pub code: u16,
    pub description: String,
}

/// One path × method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub name: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub method: String,
    pub path: String,
    pub tags: Vec<String>,
    pub parameters: Vec<OperationParameter>,
    pub imports: Vec<String>,
    pub errors: Vec<OperationError>,
    pub results: Vec<OperationResponse>,
    pub response_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<String>,
}

impl Operation {
    fn parameters_in(&self, location: ParameterIn) -> impl Iterator<Item = &OperationParameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    pub fn path_parameters(&self) -> impl Iterator<Item = &OperationParameter> {
        self.parameters_in(ParameterIn::Path)
    }

    pub fn query_parameters(&self) -> impl Iterator<Item = &OperationParameter> {
        self.parameters_in(ParameterIn::Query)
    }

    pub fn header_parameters(&self) -> impl Iterator<Item = &OperationParameter> {
        self.parameters_in(ParameterIn::Header)
    }

    pub fn cookie_parameters(&self) -> impl Iterator<Item = &OperationParameter> {
        self.parameters_in(ParameterIn::Cookie)
    }

    /// Individual form fields (Swagger 2.0 `in: formData`).
    pub fn form_parameters(&self) -> impl Iterator<Item = &OperationParameter> {
        self.parameters
            .iter()
            .filter(|p| p.location == ParameterIn::FormData && p.media_type.is_none())
    }

    /// The request payload: a body parameter, or a whole form decoded from a
    /// request body.
    pub fn body_parameter(&self) -> Option<&OperationParameter> {
        self.parameters.iter().find(|p| {
            p.location == ParameterIn::Body
                || (p.location == ParameterIn::FormData && p.media_type.is_some())
        })
    }
}
