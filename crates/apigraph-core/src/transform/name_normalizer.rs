use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToPascalCase};

/// Words an operation name may not be, checked after camel-casing.
const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "any",
    "arguments",
    "async",
    "await",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "constructor",
    "continue",
    "debugger",
    "declare",
    "default",
    "delete",
    "do",
    "double",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "function",
    "get",
    "goto",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "int",
    "interface",
    "let",
    "long",
    "module",
    "native",
    "new",
    "null",
    "number",
    "of",
    "package",
    "private",
    "protected",
    "public",
    "require",
    "return",
    "set",
    "short",
    "static",
    "string",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "volatile",
    "while",
    "with",
    "yield",
];

/// Parameter names get a `_` prefix when they collide with one of these.
const PARAMETER_RESERVED_WORDS: &[&str] = &[
    "arguments",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// Escape an arbitrary string into an identifier: leading characters that
/// cannot start one are dropped and every other run of invalid characters
/// becomes a single `_`.
pub fn encode_identifier(value: &str) -> String {
    let trimmed =
        value.trim_start_matches(|c: char| !(c.is_ascii_alphabetic() || c == '_' || c == '$'));
    let mut out = String::with_capacity(trimmed.len());
    let mut in_gap = false;
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            out.push(c);
            in_gap = false;
        } else if !in_gap {
            out.push('_');
            in_gap = true;
        }
    }
    out
}

/// The canonical model identifier for a schema name or reference tail.
///
/// Definitions and references both go through here so an import always
/// names a top-level model exactly.
///
/// - `pet` → `Pet`
/// - `from_email_object` → `FromEmailObject`
/// - `Foo.Bar-baz` → `FooBarBaz`
pub fn model_name(raw: &str) -> String {
    encode_identifier(raw).to_pascal_case()
}

/// Strip leading non-letters and collapse anything outside `[A-Za-z0-9_-]`
/// into `-`, ready for camel-casing.
fn clean_identifier(value: &str) -> String {
    let trimmed = value.trim_start_matches(|c: char| !c.is_ascii_alphabetic());
    let mut out = String::with_capacity(trimmed.len());
    let mut in_gap = false;
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_gap = false;
        } else if !in_gap {
            out.push('-');
            in_gap = true;
        }
    }
    out.trim().to_string()
}

/// Derive the callable name of an operation.
///
/// With an `operationId`, its last `/` segment is camel-cased. A result that
/// is a reserved word is prefixed with the id's first segment or the method,
/// and the noun is singularized when the path ends in a variable and
/// pluralized otherwise. Without an id the name comes from method + path.
///
/// - `("/pets", "get", Some("listPets"))` → `listPets`
/// - `("/pets/{id}", "get", Some("pets/delete"))` → `deletePet`
/// - `("/pets/{id}", "get", None)` → `getPets`
pub fn operation_name(path: &str, method: &str, operation_id: Option<&str>) -> String {
    if let Some(id) = operation_id.filter(|id| !id.is_empty()) {
        let last = id.rsplit('/').next().unwrap_or(id);
        let result = clean_identifier(last).to_lower_camel_case();
        if !is_reserved_word(&result) {
            return result;
        }
        return match id.split_once('/') {
            Some((prefix, _)) => {
                format!("{result}-{}", correct_case_for_path(path, prefix)).to_lower_camel_case()
            }
            None => {
                format!("{method}-{}", correct_case_for_path(path, &result)).to_lower_camel_case()
            }
        };
    }

    let stripped = strip_path_placeholders(path).replace('/', "-");
    format!("{method}-{stripped}").to_lower_camel_case()
}

/// Remove `{api-version}` segments and every `{variable}` from a path.
fn strip_path_placeholders(path: &str) -> String {
    const API_VERSION: &str = "{api-version}";

    let mut out = path.to_string();
    while let Some(pos) = out.find(API_VERSION) {
        let segment_start = out[..pos].rfind('/').map_or(0, |i| i + 1);
        let after = pos + API_VERSION.len();
        match out[after..].find('/') {
            Some(rel) => out.replace_range(segment_start..after + rel + 1, ""),
            None => break,
        }
    }

    let mut result = String::with_capacity(out.len());
    let mut rest = out.as_str();
    while let Some(open) = rest.find('{') {
        match rest[open..].find('}') {
            Some(close) => {
                result.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    result.push_str(rest);
    result
}

/// Singular when the last path segment is a variable, plural otherwise.
fn correct_case_for_path(path: &str, name: &str) -> String {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if last_segment.starts_with('{') {
        singularize(name)
    } else {
        pluralize(name)
    }
}

/// Camel-cased parameter name; reserved words get a `_` prefix.
///
/// `filter.someProperty` → `filterSomeProperty`, `default` → `_default`.
pub fn parameter_name(raw: &str) -> String {
    let name = clean_identifier(raw).to_lower_camel_case();
    if PARAMETER_RESERVED_WORDS.contains(&name.as_str()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Constant-style name for a string enum value.
///
/// `pending review` → `PENDING_REVIEW`, `inProgress` → `IN_PROGRESS`,
/// `1st` → `_1ST`.
pub fn enum_member_name(value: &str) -> String {
    let mut word = String::with_capacity(value.len() + 2);
    let mut in_gap = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c);
            in_gap = false;
        } else if !in_gap {
            word.push('_');
            in_gap = true;
        }
    }
    if word.starts_with(|c: char| c.is_ascii_digit()) {
        word.insert(0, '_');
    }

    let mut out = String::with_capacity(word.len() + 4);
    let mut prev_lower = false;
    for c in word.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c);
    }
    out.to_uppercase()
}

/// Naive singularization.
pub fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Naive pluralization. Words that already look plural are left alone.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || (word.ends_with('s') && !word.ends_with("ss")) {
        return word.to_string();
    }
    let bytes = word.as_bytes();
    if word.ends_with('y') && bytes.len() > 1 && !b"aeiou".contains(&bytes[bytes.len() - 2]) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if word.ends_with("ss")
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Hands out unique names within one scope: the first claim of a name keeps
/// it, later ones get `1`, `2`, … appended.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
}

impl NameRegistry {
    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let mut suffix = 1usize;
        loop {
            let candidate = format!("{name}{suffix}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name() {
        assert_eq!(model_name("pet"), "Pet");
        assert_eq!(model_name("from_email_object"), "FromEmailObject");
        assert_eq!(model_name("contactdb_segments"), "ContactdbSegments");
        assert_eq!(model_name("Foo.Bar-baz"), "FooBarBaz");
        assert_eq!(model_name("123Model"), "Model");
    }

    #[test]
    fn test_encode_identifier() {
        assert_eq!(encode_identifier("Foo Bar"), "Foo_Bar");
        assert_eq!(encode_identifier("9lives"), "lives");
        assert_eq!(encode_identifier("a..b"), "a_b");
        assert_eq!(encode_identifier("$ref"), "$ref");
    }

    #[test]
    fn test_operation_name_from_id() {
        assert_eq!(operation_name("/pets", "get", Some("listPets")), "listPets");
        assert_eq!(
            operation_name("/pets", "get", Some("Pets_ListAll")),
            "petsListAll"
        );
        assert_eq!(
            operation_name("/pets", "get", Some("api/v1/list-pets")),
            "listPets"
        );
    }

    #[test]
    fn test_reserved_operation_name_with_prefix() {
        assert_eq!(
            operation_name("/pets/{id}", "delete", Some("pets/delete")),
            "deletePet"
        );
        assert_eq!(
            operation_name("/pets", "delete", Some("pet/delete")),
            "deletePets"
        );
    }

    #[test]
    fn test_reserved_operation_name_without_prefix() {
        assert_eq!(operation_name("/items", "get", Some("get")), "getGets");
        assert_eq!(
            operation_name("/items/{id}", "delete", Some("delete")),
            "deleteDelete"
        );
    }

    #[test]
    fn test_operation_name_from_route() {
        assert_eq!(operation_name("/pets", "get", None), "getPets");
        assert_eq!(operation_name("/pets/{petId}", "get", None), "getPets");
        assert_eq!(
            operation_name("/users/{userId}/messages", "post", None),
            "postUsersMessages"
        );
        assert_eq!(
            operation_name("/{api-version}/pets", "get", None),
            "getPets"
        );
    }

    #[test]
    fn test_parameter_name() {
        assert_eq!(parameter_name("filter.someProperty"), "filterSomeProperty");
        assert_eq!(parameter_name("X-Request-Id"), "xRequestId");
        assert_eq!(parameter_name("default"), "_default");
        assert_eq!(parameter_name("page_size"), "pageSize");
    }

    #[test]
    fn test_enum_member_name() {
        assert_eq!(enum_member_name("pending review"), "PENDING_REVIEW");
        assert_eq!(enum_member_name("inProgress"), "IN_PROGRESS");
        assert_eq!(enum_member_name("1st"), "_1ST");
        assert_eq!(enum_member_name("a-b"), "A_B");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("class"), "class");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("pet"), "pets");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("items"), "items");
    }

    #[test]
    fn test_registry_appends_counter() {
        let mut names = NameRegistry::default();
        assert_eq!(names.claim("listItems"), "listItems");
        assert_eq!(names.claim("listItems"), "listItems1");
        assert_eq!(names.claim("listItems"), "listItems2");
    }

    #[test]
    fn test_registry_skips_taken_suffix() {
        let mut names = NameRegistry::default();
        assert_eq!(names.claim("get"), "get");
        assert_eq!(names.claim("get1"), "get1");
        assert_eq!(names.claim("get"), "get2");
    }
}
