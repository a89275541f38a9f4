//! Mapping of OpenAPI schemas onto Elixir types.

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::Namespace;
use crate::openapi::{OpenApiContext, SCHEMA_REF_PREFIX};
use crate::utils::camelize;
use crate::Error;

/// Types the Elixir client never generates a module for.
pub const ELIXIR_PRIMITIVES: &[&str] = &[
    "Integer", "Float", "Decimal", "Boolean", "String", "List", "Atom", "Map", "AnyType", "Tuple",
    "PID", "DateTime", "map()", "any()",
];

const MAX_ALIAS_DEPTH: usize = 16;

/// Whether `base_type` names an Elixir built-in rather than a generated model.
pub fn is_language_primitive(base_type: &str) -> bool {
    ELIXIR_PRIMITIVES.contains(&base_type)
}

/// Container shape of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Map,
    Array,
    #[default]
    None,
}

/// Elixir view of one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeInfo {
    /// Model or primitive name; for containers, the name of the element type.
    pub base_type: Option<String>,
    pub container: ContainerKind,
    /// The element type is a language primitive.
    pub is_primitive: bool,
    /// Element type of an array or map.
    #[serde(skip)]
    pub items: Option<Box<TypeInfo>>,
}

impl TypeInfo {
    pub fn primitive(name: &str) -> Self {
        Self {
            base_type: Some(name.to_string()),
            container: ContainerKind::None,
            is_primitive: true,
            items: None,
        }
    }

    pub fn model(name: impl Into<String>) -> Self {
        Self {
            base_type: Some(name.into()),
            container: ContainerKind::None,
            is_primitive: false,
            items: None,
        }
    }

    pub fn array(items: TypeInfo) -> Self {
        let base_type = match items.container {
            ContainerKind::None => items.base_type.clone(),
            ContainerKind::Array => Some("List".to_string()),
            ContainerKind::Map => Some("Map".to_string()),
        };
        let is_primitive = base_type.as_deref().map_or(true, is_language_primitive);
        Self {
            base_type,
            container: ContainerKind::Array,
            is_primitive,
            items: Some(Box::new(items)),
        }
    }

    pub fn map(values: TypeInfo) -> Self {
        Self {
            base_type: Some("Map".to_string()),
            container: ContainerKind::Map,
            is_primitive: true,
            items: Some(Box::new(values)),
        }
    }

    /// Elixir typespec, e.g. `String.t()`, `[integer()]` or
    /// `LINE.Bot.Model.Foo.t()`.
    pub fn type_spec(&self, namespace: &Namespace) -> String {
        match self.container {
            ContainerKind::Array => format!("[{}]", self.items_spec(namespace)),
            ContainerKind::Map => {
                format!("%{{optional(String.t()) => {}}}", self.items_spec(namespace))
            }
            ContainerKind::None => match self.base_type.as_deref() {
                None => "any()".to_string(),
                Some(name) if self.is_primitive => primitive_spec(name).to_string(),
                Some(name) => format!("{}.t()", namespace.model(name)),
            },
        }
    }

    fn items_spec(&self, namespace: &Namespace) -> String {
        self.items
            .as_ref()
            .map_or_else(|| "any()".to_string(), |t| t.type_spec(namespace))
    }
}

fn primitive_spec(name: &str) -> &'static str {
    match name {
        "Integer" => "integer()",
        "Float" => "float()",
        "Decimal" => "Decimal.t()",
        "Boolean" => "boolean()",
        "String" => "String.t()",
        "DateTime" => "DateTime.t()",
        "Date" => "Date.t()",
        "List" => "list()",
        "Map" | "map()" => "map()",
        "Atom" => "atom()",
        "Tuple" => "tuple()",
        "PID" => "pid()",
        _ => "any()",
    }
}

/// Maps schemas of one document, following `$ref`s into `components.schemas`.
pub struct TypeMapper<'a> {
    spec: &'a OpenApiContext,
}

impl<'a> TypeMapper<'a> {
    pub fn new(spec: &'a OpenApiContext) -> Self {
        Self { spec }
    }

    /// Map a schema to its Elixir type.
    ///
    /// A `$ref` to a named object or enum schema is a model. A `$ref` to a
    /// plain primitive, array or map schema is unaliased and mapped like the
    /// target. Dangling references are errors.
    pub fn map(&self, schema: &JsonValue) -> crate::Result<TypeInfo> {
        self.map_with_depth(schema, 0)
    }

    fn map_with_depth(&self, schema: &JsonValue, depth: usize) -> crate::Result<TypeInfo> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(Error::openapi(format!(
                "Schema alias chain deeper than {} levels",
                MAX_ALIAS_DEPTH
            )));
        }

        if let Some(ref_str) = schema.get("$ref").and_then(JsonValue::as_str) {
            let name = ref_str.strip_prefix(SCHEMA_REF_PREFIX).ok_or_else(|| {
                Error::openapi(format!("Unexpected schema ref '{}'", ref_str))
            })?;
            let target = self
                .spec
                .schema(name)
                .ok_or_else(|| Error::openapi(format!("Schema '{}' not found", name)))?;
            if is_alias(target) {
                return self.map_with_depth(target, depth + 1);
            }
            return Ok(TypeInfo::model(camelize(name)));
        }

        // `allOf: [{$ref: X}]` is a common way to attach a description to a ref.
        if let Some([single]) = schema.get("allOf").and_then(JsonValue::as_array).map(Vec::as_slice) {
            return self.map_with_depth(single, depth + 1);
        }

        let typ = schema.get("type").and_then(JsonValue::as_str);
        let info = match typ {
            Some("array") => {
                let items = match schema.get("items") {
                    Some(items) => self.map_with_depth(items, depth + 1)?,
                    None => TypeInfo::primitive("AnyType"),
                };
                TypeInfo::array(items)
            }
            // Inline objects, with or without properties, decode as plain maps.
            Some("object") => self.map_object(schema, depth)?,
            None if schema.get("properties").is_some()
                || schema.get("additionalProperties").is_some() =>
            {
                self.map_object(schema, depth)?
            }
            Some("string") => match schema.get("format").and_then(JsonValue::as_str) {
                Some("date-time") => TypeInfo::primitive("DateTime"),
                Some("date") => TypeInfo::primitive("Date"),
                _ => TypeInfo::primitive("String"),
            },
            Some("integer") => TypeInfo::primitive("Integer"),
            Some("number") => TypeInfo::primitive("Float"),
            Some("boolean") => TypeInfo::primitive("Boolean"),
            _ => TypeInfo::primitive("AnyType"),
        };
        Ok(info)
    }

    fn map_object(&self, schema: &JsonValue, depth: usize) -> crate::Result<TypeInfo> {
        let values = match schema.get("additionalProperties") {
            Some(additional) if additional.is_object() => {
                self.map_with_depth(additional, depth + 1)?
            }
            _ => TypeInfo::primitive("AnyType"),
        };
        Ok(TypeInfo::map(values))
    }
}

/// A named schema that does not deserve its own module.
pub fn is_alias(schema: &JsonValue) -> bool {
    if schema.get("enum").is_some()
        || schema.get("properties").is_some()
        || schema.get("allOf").is_some()
        || schema.get("oneOf").is_some()
        || schema.get("anyOf").is_some()
        || schema.get("discriminator").is_some()
    {
        return false;
    }
    match schema.get("type").and_then(JsonValue::as_str) {
        Some("string" | "integer" | "number" | "boolean" | "array") => true,
        Some("object") => schema.get("additionalProperties").is_some(),
        _ => schema.get("$ref").is_some(),
    }
}
