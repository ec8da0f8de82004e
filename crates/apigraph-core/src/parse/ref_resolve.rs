use percent_encoding::percent_decode_str;

use super::components::Example;
use super::document::Document;
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Header, HeaderOrRef, Response, ResponseOrRef};
use super::schema::{Schema, SchemaOrRef};
use crate::error::ResolveError;

/// A node a same-document `$ref` can point at.
#[derive(Debug, Clone, Copy)]
pub enum RefTarget<'a> {
    Schema(&'a SchemaOrRef),
    Parameter(&'a ParameterOrRef),
    Response(&'a ResponseOrRef),
    RequestBody(&'a RequestBodyOrRef),
    Header(&'a HeaderOrRef),
    Example(&'a Example),
}

enum Step<'a, T> {
    Found(&'a T),
    Next(&'a str),
}

/// Resolves same-document `$ref` pointers against a parsed document.
///
/// Cross-document references are expected to have been inlined by the
/// loader; anything not starting with `#/` is rejected.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    doc: &'a Document,
}

impl<'a> RefResolver<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }

    /// Look up the node a pointer names, without following further refs.
    pub fn lookup(&self, ref_path: &str) -> Result<RefTarget<'a>, ResolveError> {
        let (section, name) = parse_ref(ref_path)?;
        let components = self.doc.components.as_ref();
        let found = match section {
            "definitions" => self.doc.definitions.get(&name).map(RefTarget::Schema),
            "parameters" => self.doc.parameters.get(&name).map(RefTarget::Parameter),
            "responses" => self.doc.responses.get(&name).map(RefTarget::Response),
            "components/schemas" => components
                .and_then(|c| c.schemas.get(&name))
                .map(RefTarget::Schema),
            "components/parameters" => components
                .and_then(|c| c.parameters.get(&name))
                .map(RefTarget::Parameter),
            "components/responses" => components
                .and_then(|c| c.responses.get(&name))
                .map(RefTarget::Response),
            "components/requestBodies" => components
                .and_then(|c| c.request_bodies.get(&name))
                .map(RefTarget::RequestBody),
            "components/headers" => components
                .and_then(|c| c.headers.get(&name))
                .map(RefTarget::Header),
            "components/examples" => components
                .and_then(|c| c.examples.get(&name))
                .map(RefTarget::Example),
            _ => return Err(ResolveError::InvalidRefFormat(ref_path.to_string())),
        };
        found.ok_or_else(|| ResolveError::UnresolvedRef(ref_path.to_string()))
    }

    pub fn schema(&self, ref_path: &str) -> Result<&'a Schema, ResolveError> {
        self.follow(ref_path, |target| match target {
            RefTarget::Schema(SchemaOrRef::Schema(s)) => Some(Step::Found(s.as_ref())),
            RefTarget::Schema(SchemaOrRef::Ref { ref_path }) => Some(Step::Next(ref_path)),
            _ => None,
        })
    }

    pub fn parameter(&self, ref_path: &str) -> Result<&'a Parameter, ResolveError> {
        self.follow(ref_path, |target| match target {
            RefTarget::Parameter(ParameterOrRef::Parameter(p)) => Some(Step::Found(p.as_ref())),
            RefTarget::Parameter(ParameterOrRef::Ref { ref_path }) => Some(Step::Next(ref_path)),
            _ => None,
        })
    }

    pub fn response(&self, ref_path: &str) -> Result<&'a Response, ResolveError> {
        self.follow(ref_path, |target| match target {
            RefTarget::Response(ResponseOrRef::Response(r)) => Some(Step::Found(r.as_ref())),
            RefTarget::Response(ResponseOrRef::Ref { ref_path }) => Some(Step::Next(ref_path)),
            _ => None,
        })
    }

    pub fn request_body(&self, ref_path: &str) -> Result<&'a RequestBody, ResolveError> {
        self.follow(ref_path, |target| match target {
            RefTarget::RequestBody(RequestBodyOrRef::RequestBody(b)) => Some(Step::Found(b)),
            RefTarget::RequestBody(RequestBodyOrRef::Ref { ref_path }) => {
                Some(Step::Next(ref_path))
            }
            _ => None,
        })
    }

    pub fn header(&self, ref_path: &str) -> Result<&'a Header, ResolveError> {
        self.follow(ref_path, |target| match target {
            RefTarget::Header(HeaderOrRef::Header(h)) => Some(Step::Found(h.as_ref())),
            RefTarget::Header(HeaderOrRef::Ref { ref_path }) => Some(Step::Next(ref_path)),
            _ => None,
        })
    }

    pub fn resolve_schema(&self, node: &'a SchemaOrRef) -> Result<&'a Schema, ResolveError> {
        match node {
            SchemaOrRef::Schema(s) => Ok(s),
            SchemaOrRef::Ref { ref_path } => self.schema(ref_path),
        }
    }

    pub fn resolve_parameter(
        &self,
        node: &'a ParameterOrRef,
    ) -> Result<&'a Parameter, ResolveError> {
        match node {
            ParameterOrRef::Parameter(p) => Ok(p),
            ParameterOrRef::Ref { ref_path } => self.parameter(ref_path),
        }
    }

    pub fn resolve_response(&self, node: &'a ResponseOrRef) -> Result<&'a Response, ResolveError> {
        match node {
            ResponseOrRef::Response(r) => Ok(r),
            ResponseOrRef::Ref { ref_path } => self.response(ref_path),
        }
    }

    pub fn resolve_request_body(
        &self,
        node: &'a RequestBodyOrRef,
    ) -> Result<&'a RequestBody, ResolveError> {
        match node {
            RequestBodyOrRef::RequestBody(b) => Ok(b),
            RequestBodyOrRef::Ref { ref_path } => self.request_body(ref_path),
        }
    }

    pub fn resolve_header(&self, node: &'a HeaderOrRef) -> Result<&'a Header, ResolveError> {
        match node {
            HeaderOrRef::Header(h) => Ok(h),
            HeaderOrRef::Ref { ref_path } => self.header(ref_path),
        }
    }

    /// Follow a chain of references until a concrete node of the expected
    /// kind is reached.
    fn follow<T>(
        &self,
        ref_path: &str,
        pick: impl Fn(RefTarget<'a>) -> Option<Step<'a, T>>,
    ) -> Result<&'a T, ResolveError> {
        let mut seen: Vec<String> = Vec::new();
        let mut current = ref_path.to_string();
        loop {
            if seen.contains(&current) {
                return Err(ResolveError::CircularRef(ref_path.to_string()));
            }
            let target = self.lookup(&current)?;
            seen.push(current);
            match pick(target) {
                Some(Step::Found(node)) => return Ok(node),
                Some(Step::Next(next)) => current = next.to_string(),
                None => {
                    return Err(ResolveError::InvalidRefFormat(format!(
                        "{ref_path} points at a node of the wrong kind"
                    )));
                }
            }
        }
    }
}

/// Split a same-document pointer into its section and decoded entry name.
///
/// `#/components/schemas/Foo` → `("components/schemas", "Foo")`,
/// `#/definitions/Foo` → `("definitions", "Foo")`.
fn parse_ref(ref_path: &str) -> Result<(&str, String), ResolveError> {
    let pointer = ref_path
        .strip_prefix("#/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let split_at = if pointer.starts_with("components/") {
        pointer["components/".len()..]
            .find('/')
            .map(|i| i + "components/".len())
    } else {
        pointer.find('/')
    };
    let idx = split_at.ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, raw_name) = (&pointer[..idx], &pointer[idx + 1..]);
    if raw_name.is_empty() {
        return Err(ResolveError::InvalidRefFormat(ref_path.to_string()));
    }
    Ok((section, decode_pointer_segment(raw_name)))
}

/// Undo JSON-pointer escaping and percent-encoding in one pointer segment.
pub fn decode_pointer_segment(segment: &str) -> String {
    let unescaped = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&unescaped).decode_utf8_lossy().into_owned()
}
