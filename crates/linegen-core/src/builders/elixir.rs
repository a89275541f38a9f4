//! Elixir context builder for the LINE Bot SDK templates.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{ContextBuilder, DEFAULT_API_TAG};
use crate::codegen::path::{self, placeholder_collisions, PlaceholderCollision};
use crate::codegen::types::is_alias;
use crate::codegen::{
    ContainerKind, DecodedType, HeaderParameter, PathParameter, ResponseDescriptor,
    ResponseTypeResolver, TypeInfo, TypeMapper,
};
use crate::config::GeneratorSettings;
use crate::openapi::{OpenApiContext, OpenApiOperation, OpenApiParameter, SCHEMA_REF_PREFIX};
use crate::utils::{camelize, underscore};

/// One parameter of a generated API function.
#[derive(Debug, Clone, Serialize)]
pub struct ElixirParameter {
    /// Name as declared in the document
    pub base_name: String,
    /// snake_case argument or option name
    pub name: String,
    /// `path`, `query` or `header`
    pub location: String,
    pub type_spec: String,
    pub required: bool,
    pub description: Option<String>,
    /// Lower-cased wire name, set for header parameters only
    pub header_name: Option<String>,
}

/// One declared response with its decoding decision.
#[derive(Debug, Clone, Serialize)]
pub struct ElixirResponse {
    pub code: String,
    pub code_mapping_key: String,
    pub decoded_struct: String,
    pub description: Option<String>,
    /// Typespec of the decoded body; `None` when the body is not decoded.
    pub type_spec: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElixirOperationContext {
    pub operation_id: String,
    pub fn_name: String,
    pub method: String,
    /// Path as written in the document
    pub path: String,
    /// Path with `{param}` replaced by `:param`
    pub req_path: String,
    pub api_tag: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub tags: Vec<String>,
    pub path_params: Vec<ElixirParameter>,
    pub query_params: Vec<ElixirParameter>,
    pub header_params: Vec<ElixirParameter>,
    /// Positional arguments: path params, then required headers and queries.
    pub required_params: Vec<ElixirParameter>,
    /// Keyword options: optional headers and queries.
    pub optional_params: Vec<ElixirParameter>,
    pub has_body: bool,
    pub body_required: bool,
    pub body_type: Option<String>,
    pub responses: Vec<ElixirResponse>,
    pub return_types: Vec<String>,
}

/// One struct field of a generated model.
#[derive(Debug, Clone, Serialize)]
pub struct ElixirField {
    pub base_name: String,
    pub name: String,
    pub type_spec: String,
    pub required: bool,
    pub description: Option<String>,
    /// Decoded type of the field, `false` when the value is kept as is
    pub decoded: String,
    /// Arguments for `Deserializer.deserialize/3`, e.g. `:struct, LINE.Bot.Model.Foo`
    pub deserializer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElixirModelContext {
    pub name: String,
    pub module_name: String,
    pub file_name: String,
    pub description: Option<String>,
    pub fields: Vec<ElixirField>,
    pub enum_values: Vec<String>,
    pub is_enum: bool,
}

pub struct ElixirContextBuilder<'a> {
    settings: &'a GeneratorSettings,
    spec: &'a OpenApiContext,
}

impl<'a> ElixirContextBuilder<'a> {
    pub fn new(settings: &'a GeneratorSettings, spec: &'a OpenApiContext) -> Self {
        Self { settings, spec }
    }

    fn mapper(&self) -> TypeMapper<'a> {
        TypeMapper::new(self.spec)
    }

    fn resolver(&self) -> ResponseTypeResolver<'a> {
        ResponseTypeResolver::new(&self.settings.namespace)
    }

    fn map_optional(&self, schema: Option<&JsonValue>) -> crate::Result<Option<TypeInfo>> {
        schema.map(|s| self.mapper().map(s)).transpose()
    }

    fn parameter(&self, param: &OpenApiParameter) -> crate::Result<ElixirParameter> {
        let info = self.map_optional(param.schema.as_ref())?;
        let header_name = (param.in_ == "header").then(|| HeaderParameter::new(&param.name).wire_name);
        Ok(ElixirParameter {
            base_name: param.name.clone(),
            name: underscore(&param.name),
            location: param.in_.clone(),
            type_spec: info
                .map(|i| i.type_spec(&self.settings.namespace))
                .unwrap_or_else(|| "any()".to_string()),
            required: param.is_required(),
            description: param.description.as_deref().map(sanitize_doc),
            header_name,
        })
    }

    fn req_path(&self, op: &OpenApiOperation) -> String {
        let params: Vec<PathParameter> = op
            .parameters_in("path")
            .map(|p| PathParameter::new(&p.name))
            .collect();

        for collision in placeholder_collisions(&params) {
            match collision {
                PlaceholderCollision::Placeholder { first, .. } => log::warn!(
                    "{}: path parameter '{}' is declared twice, only the first is substituted",
                    op.id,
                    first
                ),
                PlaceholderCollision::Marker {
                    first,
                    second,
                    marker,
                } => log::warn!(
                    "{}: path parameters '{}' and '{}' both become {}",
                    op.id,
                    first,
                    second,
                    marker
                ),
            }
        }

        let req_path = path::rewrite(&op.path, &params);
        let unmatched = path::unmatched_placeholders(&req_path);
        if !unmatched.is_empty() {
            log::debug!(
                "{}: no path parameter declared for {:?} in {}",
                op.id,
                unmatched,
                op.path
            );
        }
        req_path
    }

    fn responses(&self, op: &OpenApiOperation) -> crate::Result<Vec<ElixirResponse>> {
        let resolver = self.resolver();
        op.responses
            .iter()
            .map(|(code, response)| -> crate::Result<ElixirResponse> {
                let info = self.map_optional(response.schema())?;
                let resolved = resolver.resolve(&ResponseDescriptor::with_type(code, info.as_ref()));
                let type_spec = match (&resolved.decoded, &info) {
                    (DecodedType::Skip, _) | (_, None) => None,
                    (_, Some(info)) => Some(info.type_spec(&self.settings.namespace)),
                };
                Ok(ElixirResponse {
                    code: code.clone(),
                    code_mapping_key: resolved.dispatch_key.to_string(),
                    decoded_struct: resolved.decoded.to_string(),
                    description: response.description.as_deref().map(sanitize_doc),
                    type_spec,
                })
            })
            .collect()
    }

    /// Properties of an object schema, following `allOf` parts.
    fn collect_properties(
        &self,
        schema: &JsonValue,
        properties: &mut Vec<(String, JsonValue)>,
        required: &mut BTreeSet<String>,
        depth: usize,
    ) -> crate::Result<()> {
        if depth > 16 {
            return Err(crate::Error::openapi("allOf nesting too deep"));
        }

        let schema = match schema.get("$ref").and_then(JsonValue::as_str) {
            Some(ref_str) => {
                let name = ref_str.strip_prefix(SCHEMA_REF_PREFIX).ok_or_else(|| {
                    crate::Error::openapi(format!("Unexpected schema ref '{}'", ref_str))
                })?;
                self.spec
                    .schema(name)
                    .ok_or_else(|| crate::Error::openapi(format!("Schema '{}' not found", name)))?
            }
            None => schema,
        };

        for part in schema
            .get("allOf")
            .and_then(JsonValue::as_array)
            .into_iter()
            .flatten()
        {
            self.collect_properties(part, properties, required, depth + 1)?;
        }

        if let Some(props) = schema.get("properties").and_then(JsonValue::as_object) {
            for (name, prop) in props {
                match properties.iter_mut().find(|(existing, _)| existing == name) {
                    Some(entry) => entry.1 = prop.clone(),
                    None => properties.push((name.clone(), prop.clone())),
                }
            }
        }

        required.extend(
            schema
                .get("required")
                .and_then(JsonValue::as_array)
                .into_iter()
                .flatten()
                .filter_map(JsonValue::as_str)
                .map(String::from),
        );
        Ok(())
    }

    fn field(&self, base_name: &str, schema: &JsonValue, required: bool) -> crate::Result<ElixirField> {
        let namespace = &self.settings.namespace;
        let info = self.mapper().map(schema)?;
        let decoded = self.resolver().decoded_type_of(&info);
        let deserializer = match (&decoded, info.container, info.base_type.as_deref()) {
            (DecodedType::Model(module), ContainerKind::Array, _) => Some(format!(":list, {}", module)),
            (DecodedType::Model(module), _, _) => Some(format!(":struct, {}", module)),
            (_, ContainerKind::None, Some("DateTime")) => Some(":datetime".to_string()),
            (_, ContainerKind::None, Some("Date")) => Some(":date".to_string()),
            _ => None,
        };
        Ok(ElixirField {
            base_name: base_name.to_string(),
            name: underscore(base_name),
            type_spec: info.type_spec(namespace),
            required,
            description: schema
                .get("description")
                .and_then(JsonValue::as_str)
                .map(sanitize_doc),
            decoded: decoded.to_string(),
            deserializer,
        })
    }
}

impl ContextBuilder for ElixirContextBuilder<'_> {
    fn build(&self, op: &OpenApiOperation) -> crate::Result<JsonValue> {
        let path_params = op
            .parameters_in("path")
            .map(|p| self.parameter(p))
            .collect::<crate::Result<Vec<_>>>()?;
        let query_params = op
            .parameters_in("query")
            .map(|p| self.parameter(p))
            .collect::<crate::Result<Vec<_>>>()?;
        let header_params = op
            .parameters_in("header")
            .map(|p| self.parameter(p))
            .collect::<crate::Result<Vec<_>>>()?;

        let mut required_params = path_params.clone();
        let mut optional_params = Vec::new();
        for param in header_params.iter().chain(&query_params) {
            if param.required {
                required_params.push(param.clone());
            } else {
                optional_params.push(param.clone());
            }
        }

        let has_body = op.request_body.is_some();
        let body_type = self
            .map_optional(op.request_body_schema())?
            .map(|info| info.type_spec(&self.settings.namespace))
            .or_else(|| has_body.then(|| "any()".to_string()));

        let responses = self.responses(op)?;
        let mut return_types: Vec<String> = Vec::new();
        for response in &responses {
            let spec = response.type_spec.clone().unwrap_or_else(|| "nil".to_string());
            if !return_types.contains(&spec) {
                return_types.push(spec);
            }
        }

        let context = ElixirOperationContext {
            operation_id: op.id.clone(),
            fn_name: underscore(&op.id),
            method: op.method.clone(),
            path: op.path.clone(),
            req_path: self.req_path(op),
            api_tag: op
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| DEFAULT_API_TAG.to_string()),
            summary: op.summary.as_deref().map(sanitize_doc),
            description: op.description.as_deref().map(sanitize_doc),
            deprecated: op.deprecated,
            tags: op.tags.clone(),
            path_params,
            query_params,
            header_params,
            required_params,
            optional_params,
            has_body,
            body_required: op.request_body_required(),
            body_type,
            responses,
            return_types,
        };

        Ok(serde_json::to_value(&context)?)
    }

    fn build_model(&self, name: &str, schema: &JsonValue) -> crate::Result<Option<JsonValue>> {
        if is_alias(schema) {
            log::debug!("Schema '{}' is an alias, no module generated", name);
            return Ok(None);
        }

        let mut properties = Vec::new();
        let mut required = BTreeSet::new();
        self.collect_properties(schema, &mut properties, &mut required, 0)?;

        let fields = properties
            .iter()
            .map(|(base_name, prop)| self.field(base_name, prop, required.contains(base_name)))
            .collect::<crate::Result<Vec<_>>>()?;

        let enum_values: Vec<String> = schema
            .get("enum")
            .and_then(JsonValue::as_array)
            .into_iter()
            .flatten()
            .map(|v| match v {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        let model_name = camelize(name);
        let context = ElixirModelContext {
            module_name: self.settings.namespace.model(&model_name),
            file_name: format!("{}.ex", underscore(&model_name)),
            name: model_name,
            description: schema
                .get("description")
                .and_then(JsonValue::as_str)
                .map(sanitize_doc),
            fields,
            is_enum: !enum_values.is_empty(),
            enum_values,
        };
        Ok(Some(serde_json::to_value(&context)?))
    }
}

/// Make text safe inside an Elixir `"""` heredoc.
fn sanitize_doc(text: &str) -> String {
    text.trim()
        .replace('\\', "\\\\")
        .replace("#{", "\\#{")
        .replace("\"\"\"", "\\\"\\\"\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Namespace;
    use serde_json::json;

    fn spec() -> OpenApiContext {
        OpenApiContext {
            json: json!({
                "openapi": "3.0.0",
                "info": { "title": "Shop", "version": "1.0.0" },
                "paths": {
                    "/v2/bot/user/{userId}/richmenu/{richMenuId}": {
                        "parameters": [
                            { "name": "userId", "in": "path", "required": true, "schema": { "type": "string" } }
                        ],
                        "post": {
                            "operationId": "linkRichMenuIdToUser",
                            "tags": ["messaging-api"],
                            "summary": "Link #{rich} menu",
                            "parameters": [
                                { "name": "richMenuId", "in": "path", "required": true, "schema": { "type": "string" } },
                                { "name": "X-Line-Retry-Key", "in": "header", "schema": { "type": "string" } },
                                { "name": "limit", "in": "query", "required": true, "schema": { "type": "integer" } }
                            ],
                            "requestBody": {
                                "required": true,
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Item" } } }
                            },
                            "responses": {
                                "200": {
                                    "description": "OK",
                                    "content": { "application/json": { "schema": {
                                        "type": "array", "items": { "$ref": "#/components/schemas/Item" }
                                    } } }
                                },
                                "204": { "description": "No content" },
                                "2XX": {
                                    "description": "Labels",
                                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Labels" } } }
                                },
                                "default": {
                                    "description": "Error",
                                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
                                }
                            }
                        }
                    }
                },
                "components": { "schemas": {
                    "ErrorResponse": {
                        "type": "object",
                        "required": ["message"],
                        "properties": {
                            "message": { "type": "string" },
                            "details": { "type": "array", "items": { "$ref": "#/components/schemas/Item" } }
                        }
                    },
                    "Item": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Base" },
                            { "type": "object", "properties": { "sentAt": { "type": "string", "format": "date-time" } } }
                        ]
                    },
                    "Base": {
                        "type": "object",
                        "required": ["itemId"],
                        "properties": { "itemId": { "type": "string" } }
                    },
                    "Labels": { "type": "object", "additionalProperties": { "type": "string" } },
                    "Status": { "type": "string", "enum": ["ready", "done"] }
                } }
            }),
        }
    }

    fn settings() -> GeneratorSettings {
        GeneratorSettings {
            namespace: Namespace::new("LINE.Bot", Some("Shop".into())),
            ..Default::default()
        }
    }

    fn operation_context() -> JsonValue {
        let spec = spec();
        let settings = settings();
        let op = spec.parse_operations().unwrap().remove(0);
        ElixirContextBuilder::new(&settings, &spec).build(&op).unwrap()
    }

    #[test]
    fn test_operation_names_and_path() {
        let ctx = operation_context();
        assert_eq!(ctx["operation_id"], "linkRichMenuIdToUser");
        assert_eq!(ctx["fn_name"], "link_rich_menu_id_to_user");
        assert_eq!(ctx["method"], "post");
        assert_eq!(ctx["req_path"], "/v2/bot/user/:user_id/richmenu/:rich_menu_id");
        assert_eq!(ctx["api_tag"], "messaging-api");
        assert_eq!(ctx["summary"], "Link \\#{rich} menu");
    }

    #[test]
    fn test_operation_parameters() {
        let ctx = operation_context();
        assert_eq!(ctx["path_params"].as_array().unwrap().len(), 2);
        assert_eq!(ctx["path_params"][0]["name"], "user_id");

        let header = &ctx["header_params"][0];
        assert_eq!(header["base_name"], "X-Line-Retry-Key");
        assert_eq!(header["header_name"], "x-line-retry-key");
        assert_eq!(header["required"], false);

        let required: Vec<_> = ctx["required_params"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["user_id", "rich_menu_id", "limit"]);
        assert_eq!(ctx["optional_params"][0]["name"], "x_line_retry_key");
        assert_eq!(ctx["query_params"][0]["type_spec"], "integer()");

        assert_eq!(ctx["has_body"], true);
        assert_eq!(ctx["body_required"], true);
        assert_eq!(ctx["body_type"], "LINE.Bot.Shop.Model.Item.t()");
    }

    #[test]
    fn test_operation_responses() {
        let ctx = operation_context();
        let responses = ctx["responses"].as_array().unwrap();
        let by_code = |code: &str| {
            responses
                .iter()
                .find(|r| r["code"] == code)
                .cloned()
                .unwrap()
        };

        let ok = by_code("200");
        assert_eq!(ok["code_mapping_key"], "200");
        assert_eq!(ok["decoded_struct"], "LINE.Bot.Shop.Model.Item");
        assert_eq!(ok["type_spec"], "[LINE.Bot.Shop.Model.Item.t()]");

        let empty = by_code("204");
        assert_eq!(empty["decoded_struct"], "false");
        assert!(empty["type_spec"].is_null());

        let range = by_code("2XX");
        assert_eq!(range["code_mapping_key"], "\"2XX\"");
        assert_eq!(range["decoded_struct"], "%{}");

        let default = by_code("default");
        assert_eq!(default["code_mapping_key"], ":default");
        assert_eq!(default["decoded_struct"], "LINE.Bot.Shop.Model.ErrorResponse");

        let return_types = ctx["return_types"].as_array().unwrap();
        assert!(return_types.contains(&json!("nil")));
        assert!(return_types.contains(&json!("LINE.Bot.Shop.Model.ErrorResponse.t()")));
    }

    #[test]
    fn test_model_fields() {
        let spec = spec();
        let settings = settings();
        let builder = ElixirContextBuilder::new(&settings, &spec);
        let ctx = builder
            .build_model("ErrorResponse", spec.schema("ErrorResponse").unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(ctx["module_name"], "LINE.Bot.Shop.Model.ErrorResponse");
        assert_eq!(ctx["file_name"], "error_response.ex");
        let fields = ctx["fields"].as_array().unwrap();
        let details = fields.iter().find(|f| f["base_name"] == "details").unwrap();
        assert_eq!(details["deserializer"], ":list, LINE.Bot.Shop.Model.Item");
        assert_eq!(details["required"], false);
        let message = fields.iter().find(|f| f["base_name"] == "message").unwrap();
        assert_eq!(message["required"], true);
        assert_eq!(message["decoded"], "false");
        assert!(message["deserializer"].is_null());
    }

    #[test]
    fn test_model_merges_all_of() {
        let spec = spec();
        let settings = settings();
        let ctx = ElixirContextBuilder::new(&settings, &spec)
            .build_model("Item", spec.schema("Item").unwrap())
            .unwrap()
            .unwrap();
        let names: Vec<_> = ctx["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["item_id", "sent_at"]);
        assert_eq!(ctx["fields"][0]["required"], true);
        assert_eq!(ctx["fields"][1]["deserializer"], ":datetime");
    }

    #[test]
    fn test_enum_and_alias_models() {
        let spec = spec();
        let settings = settings();
        let builder = ElixirContextBuilder::new(&settings, &spec);

        let status = builder
            .build_model("Status", spec.schema("Status").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(status["is_enum"], true);
        assert_eq!(status["enum_values"], json!(["ready", "done"]));

        assert!(builder
            .build_model("Labels", spec.schema("Labels").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_sanitize_doc() {
        assert_eq!(sanitize_doc(" a \"\"\" b "), "a \\\"\\\"\\\" b");
        assert_eq!(sanitize_doc("C:\\path"), "C:\\\\path");
    }
}
