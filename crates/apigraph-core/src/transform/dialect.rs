use serde::Serialize;

use crate::error::ParseError;
use crate::parse::document::Document;
use crate::parse::schema::Schema;

const SWAGGER2_PREFIXES: &[&str] = &[
    "#/definitions/",
    "#/parameters/",
    "#/responses/",
    "#/securityDefinitions/",
];

const OPENAPI3_PREFIXES: &[&str] = &[
    "#/components/schemas/",
    "#/components/responses/",
    "#/components/parameters/",
    "#/components/examples/",
    "#/components/requestBodies/",
    "#/components/headers/",
    "#/components/securitySchemes/",
    "#/components/links/",
    "#/components/callbacks/",
];

/// The three schema dialects and the conventions that differ between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dialect {
    Swagger2,
    OpenApi30,
    OpenApi31,
}

impl Dialect {
    /// Identify the dialect from the `swagger` / `openapi` version keys.
    pub fn detect(doc: &Document) -> Result<Self, ParseError> {
        let version = doc.version_string().ok_or_else(|| {
            ParseError::UnsupportedVersion("missing `openapi` or `swagger` version".to_string())
        })?;
        let dialect = if doc.openapi.is_some() {
            if version.starts_with("3.0.") || version == "3.0" {
                Some(Dialect::OpenApi30)
            } else if version.starts_with("3.1.") || version == "3.1" {
                Some(Dialect::OpenApi31)
            } else {
                None
            }
        } else if version == "2" || version.starts_with("2.") {
            Some(Dialect::Swagger2)
        } else {
            None
        };
        dialect.ok_or_else(|| ParseError::UnsupportedVersion(version.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Swagger2 => "2.0",
            Dialect::OpenApi30 => "3.0",
            Dialect::OpenApi31 => "3.1",
        }
    }

    /// Pointer prefixes stripped when turning a `$ref` into a type name.
    pub fn ref_prefixes(&self) -> &'static [&'static str] {
        match self {
            Dialect::Swagger2 => SWAGGER2_PREFIXES,
            Dialect::OpenApi30 | Dialect::OpenApi31 => OPENAPI3_PREFIXES,
        }
    }

    /// Where named schemas live.
    pub fn schema_prefix(&self) -> &'static str {
        match self {
            Dialect::Swagger2 => "#/definitions/",
            Dialect::OpenApi30 | Dialect::OpenApi31 => "#/components/schemas/",
        }
    }

    /// Whether a schema admits `null` under this dialect's convention.
    pub fn is_nullable(&self, schema: &Schema) -> bool {
        match self {
            Dialect::Swagger2 => schema.x_nullable == Some(true),
            Dialect::OpenApi30 => schema.nullable == Some(true),
            Dialect::OpenApi31 => schema
                .schema_type
                .as_ref()
                .is_some_and(|types| types.contains_null()),
        }
    }

    /// Whether this dialect reads request bodies from `requestBody`.
    pub fn has_request_bodies(&self) -> bool {
        !matches!(self, Dialect::Swagger2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::schema::{SchemaType, TypeSet};

    fn doc(openapi: Option<&str>, swagger: Option<&str>) -> Document {
        Document {
            openapi: openapi.map(str::to_string),
            swagger: swagger.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            Dialect::detect(&doc(Some("3.0.3"), None)).unwrap(),
            Dialect::OpenApi30
        );
        assert_eq!(
            Dialect::detect(&doc(Some("3.1.0"), None)).unwrap(),
            Dialect::OpenApi31
        );
        assert_eq!(
            Dialect::detect(&doc(None, Some("2.0"))).unwrap(),
            Dialect::Swagger2
        );
    }

    #[test]
    fn test_unsupported_versions() {
        assert!(matches!(
            Dialect::detect(&doc(Some("4.0.0"), None)),
            Err(ParseError::UnsupportedVersion(v)) if v == "4.0.0"
        ));
        assert!(Dialect::detect(&doc(None, Some("1.2"))).is_err());
        assert!(Dialect::detect(&doc(None, None)).is_err());
    }

    #[test]
    fn test_nullability_conventions() {
        let x_nullable = Schema {
            x_nullable: Some(true),
            ..Default::default()
        };
        let nullable = Schema {
            nullable: Some(true),
            ..Default::default()
        };
        let type_array = Schema {
            schema_type: Some(TypeSet::Multiple(vec![SchemaType::String, SchemaType::Null])),
            ..Default::default()
        };

        assert!(Dialect::Swagger2.is_nullable(&x_nullable));
        assert!(!Dialect::Swagger2.is_nullable(&nullable));
        assert!(Dialect::OpenApi30.is_nullable(&nullable));
        assert!(!Dialect::OpenApi30.is_nullable(&type_array));
        assert!(Dialect::OpenApi31.is_nullable(&type_array));
        assert!(!Dialect::OpenApi31.is_nullable(&x_nullable));
    }
}
