use percent_encoding::percent_decode_str;

use super::dialect::Dialect;
use super::name_normalizer::{encode_identifier, model_name};
use crate::ir::{ResolvedType, TypeName};
use crate::parse::schema::TypeSet;

/// Map a dialect primitive or format token to its canonical output token.
/// `format: binary` wins over the declared type.
pub fn map_primitive(token: &str, format: Option<&str>) -> Option<&'static str> {
    if format == Some("binary") {
        return Some("binary");
    }
    let mapped = match token {
        "file" => "binary",
        "any" | "object" => "any",
        "array" => "any[]",
        "boolean" => "boolean",
        "byte" | "int" | "integer" | "float" | "double" | "short" | "long" | "number" => "number",
        "char" | "date" | "date-time" | "password" | "string" => "string",
        "void" => "void",
        "null" => "null",
        _ => return None,
    };
    Some(mapped)
}

/// Turns type tokens and `$ref` strings into [`ResolvedType`]s.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper {
    dialect: Dialect,
}

impl TypeMapper {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Resolve a schema's declared `type` (single or array) and `format`.
    pub fn resolve_type_set(&self, types: &TypeSet, format: Option<&str>) -> ResolvedType {
        match types {
            TypeSet::Single(t) => self.resolve(t.as_str(), format),
            TypeSet::Multiple(list) => {
                let tokens: Vec<&str> = list.iter().map(|t| t.as_str()).collect();
                self.resolve_union(&tokens, format)
            }
        }
    }

    /// A type array: resolved tokens joined with ` | `, `null` folded into
    /// nullability.
    pub fn resolve_union(&self, tokens: &[&str], format: Option<&str>) -> ResolvedType {
        let is_nullable = tokens.contains(&"null");
        let mut names = Vec::with_capacity(tokens.len());
        let mut imports = Vec::new();
        for token in tokens.iter().filter(|t| **t != "null") {
            let resolved = self.resolve(token, format);
            names.push(resolved.name.ty);
            imports.extend(resolved.imports);
        }
        let name = if names.is_empty() {
            (if is_nullable { "null" } else { "any" }).to_string()
        } else {
            names.join(" | ")
        };
        ResolvedType {
            name: TypeName::simple(name),
            imports,
            is_nullable,
        }
    }

    pub fn resolve_ref(&self, ref_path: &str) -> ResolvedType {
        self.resolve(ref_path, None)
    }

    /// Resolve one raw token: a primitive, a `$ref` string, or a name.
    ///
    /// Bracketed generics `Page[Pet]` become `Page<Pet>` importing both
    /// sides; `array[Pet]` collapses to `Pet[]`.
    pub fn resolve(&self, raw: &str, format: Option<&str>) -> ResolvedType {
        if let Some(mapped) = map_primitive(raw, format) {
            return ResolvedType::primitive(mapped);
        }

        let stripped = percent_decode_str(self.strip_namespace(raw))
            .decode_utf8_lossy()
            .replace("~1", "/")
            .replace("~0", "~");

        if let Some((outer, inner)) = split_generic(&stripped) {
            let outer = self.resolve(&encode_identifier(outer), None);
            let inner = self.resolve(&encode_identifier(inner), None);
            if outer.name.ty == "any[]" {
                return ResolvedType {
                    name: TypeName {
                        ty: format!("{}[]", inner.name.ty),
                        base: inner.name.ty,
                        template: None,
                    },
                    imports: inner.imports,
                    is_nullable: false,
                };
            }
            let mut imports = outer.imports;
            imports.extend(inner.imports);
            return ResolvedType {
                name: TypeName {
                    ty: format!("{}<{}>", outer.name.ty, inner.name.ty),
                    base: outer.name.ty,
                    template: Some(inner.name.ty),
                },
                imports,
                is_nullable: false,
            };
        }

        let name = model_name(&stripped);
        if name.is_empty() {
            return ResolvedType::any();
        }
        ResolvedType {
            name: TypeName::simple(name.clone()),
            imports: vec![name],
            is_nullable: false,
        }
    }

    fn strip_namespace<'r>(&self, raw: &'r str) -> &'r str {
        let raw = raw.trim();
        self.dialect
            .ref_prefixes()
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix))
            .unwrap_or(raw)
    }
}

/// `Foo[Bar]` → `("Foo", "Bar")`: the outer name runs to the first `[`, the
/// template to the final `]`.
pub fn split_generic(value: &str) -> Option<(&str, &str)> {
    let body = value.strip_suffix(']')?;
    let open = body.find('[')?;
    Some((&body[..open], &body[open + 1..]))
}
