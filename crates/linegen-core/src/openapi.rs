//! OpenAPI document loading and querying.
//!
//! The document is kept as a raw JSON tree; only the parts the Elixir
//! generator needs (operations, parameters, responses, component schemas) are
//! extracted into typed structs.
//!
//! # Examples
//!
//! ```no_run
//! use linegen_core::openapi::OpenApiContext;
//! use linegen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let spec = OpenApiContext::from_file("messaging-api.yml").await?;
//! spec.validate()?;
//!
//! for op in spec.parse_operations()? {
//!     println!("{} {} -> {}", op.method, op.path, op.id);
//! }
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::Path;

use crate::Error;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::fs;

/// Prefix of every `$ref` into `components.schemas`.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// HTTP methods an OpenAPI path item may define, in output order.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Represents an OpenAPI specification
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct OpenApiContext {
    /// The raw JSON value of the OpenAPI spec
    pub json: JsonValue,
}

impl OpenApiContext {
    /// Create a new OpenApiContext from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::openapi(format!(
                "Failed to parse OpenAPI spec at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse JSON, falling back to YAML.
    pub fn parse_content(content: &str) -> Result<Self, String> {
        let json = match serde_json::from_str::<JsonValue>(content) {
            Ok(json) => json,
            Err(_) => serde_yaml::from_str::<JsonValue>(content)
                .map_err(|_| "content is neither valid JSON nor YAML".to_string())?,
        };
        if !json.is_object() {
            return Err("document root is not an object".to_string());
        }
        Ok(Self { json })
    }

    /// Get a reference to the raw JSON value
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// The `openapi` version string, e.g. `3.0.0`
    pub fn openapi_version(&self) -> Option<&str> {
        self.json.get("openapi")?.as_str()
    }

    /// Check that the document is a structurally valid OpenAPI 3 document.
    pub fn validate(&self) -> crate::Result<()> {
        let typed: openapiv3::OpenAPI = serde_json::from_value(self.json.clone())
            .map_err(|e| Error::openapi(format!("Invalid OpenAPI document: {}", e)))?;
        if !typed.openapi.starts_with("3.") {
            return Err(Error::openapi(format!(
                "Unsupported OpenAPI version '{}', expected 3.x",
                typed.openapi
            )));
        }
        log::debug!(
            "Validated OpenAPI {} document with {} paths",
            typed.openapi,
            typed.paths.paths.len()
        );
        Ok(())
    }

    /// A schema from `components.schemas` by name
    pub fn schema(&self, name: &str) -> Option<&JsonValue> {
        self.json.get("components")?.get("schemas")?.get(name)
    }

    /// All component schemas, ordered by name.
    pub fn schemas(&self) -> Vec<(&str, &JsonValue)> {
        self.json
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(JsonValue::as_object)
            .map(|schemas| {
                let mut sorted: Vec<_> = schemas.iter().map(|(k, v)| (k.as_str(), v)).collect();
                sorted.sort_by(|a, b| a.0.cmp(b.0));
                sorted
            })
            .unwrap_or_default()
    }

    /// Follow a local `$ref` into `components`.
    pub fn resolve_ref(&self, ref_str: &str) -> crate::Result<&JsonValue> {
        if !ref_str.starts_with("#/components/") {
            return Err(Error::openapi(format!(
                "Unsupported reference '{}', only '#/components/...' is resolved",
                ref_str
            )));
        }
        self.json
            .pointer(&ref_str[1..])
            .ok_or_else(|| Error::openapi(format!("Reference '{}' not found", ref_str)))
    }

    /// Resolve `value` if it is a `$ref`, otherwise return it unchanged.
    fn deref<'a>(&'a self, value: &'a JsonValue) -> crate::Result<&'a JsonValue> {
        match value.get("$ref").and_then(JsonValue::as_str) {
            Some(ref_str) => self.resolve_ref(ref_str),
            None => Ok(value),
        }
    }

    /// Parse every operation of every path.
    ///
    /// Operations are ordered by path, then by [`HTTP_METHODS`] order.
    pub fn parse_operations(&self) -> crate::Result<Vec<OpenApiOperation>> {
        let mut operations = Vec::new();
        let paths = self
            .json
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::openapi("Missing 'paths' object"))?;

        let mut paths: Vec<_> = paths.iter().collect();
        paths.sort_by(|a, b| a.0.cmp(b.0));

        for (path, item) in paths {
            let item = self.deref(item)?;
            for method in HTTP_METHODS {
                let Some(method_item) = item.get(*method).and_then(JsonValue::as_object) else {
                    continue;
                };

                let operation_id = method_item
                    .get("operationId")
                    .and_then(JsonValue::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| {
                        format!(
                            "{}_{}",
                            method,
                            path.trim_start_matches('/').replace(['/', '{', '}'], "_")
                        )
                    });

                let tags = method_item
                    .get("tags")
                    .and_then(JsonValue::as_array)
                    .map(|arr| {
                        arr.iter()
                            .filter_map(JsonValue::as_str)
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();

                let request_body = match method_item.get("requestBody") {
                    Some(body) => Some(self.deref(body)?.clone()),
                    None => None,
                };

                operations.push(OpenApiOperation {
                    id: operation_id,
                    method: method.to_string(),
                    path: path.clone(),
                    tags,
                    summary: method_item
                        .get("summary")
                        .and_then(JsonValue::as_str)
                        .map(String::from),
                    description: method_item
                        .get("description")
                        .and_then(JsonValue::as_str)
                        .map(String::from),
                    parameters: self.extract_parameters(item, method_item)?,
                    request_body,
                    responses: self.extract_responses(method_item)?,
                    deprecated: method_item
                        .get("deprecated")
                        .and_then(JsonValue::as_bool)
                        .unwrap_or(false),
                    vendor_extensions: extract_vendor_extensions(method_item),
                });
            }
        }
        Ok(operations)
    }

    /// Path-item parameters merged with operation parameters; an operation
    /// parameter replaces a path-item parameter with the same name and location.
    pub fn extract_parameters(
        &self,
        path_item: &JsonValue,
        method_item: &JsonMap<String, JsonValue>,
    ) -> crate::Result<Vec<OpenApiParameter>> {
        let mut merged: Vec<OpenApiParameter> = Vec::new();
        let shared = path_item.get("parameters").and_then(JsonValue::as_array);
        let own = method_item.get("parameters").and_then(JsonValue::as_array);

        for raw in shared.into_iter().chain(own).flatten() {
            let resolved = self.deref(raw)?;
            let param: OpenApiParameter =
                serde_json::from_value(resolved.clone()).map_err(|e| {
                    Error::openapi(format!("Invalid parameter {}: {}", resolved, e))
                })?;
            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.in_ == param.in_)
            {
                Some(existing) => *existing = param,
                None => merged.push(param),
            }
        }
        Ok(merged)
    }

    /// Responses keyed by status code, with `$ref`s resolved
    pub fn extract_responses(
        &self,
        method_item: &JsonMap<String, JsonValue>,
    ) -> crate::Result<BTreeMap<String, OpenApiResponse>> {
        let Some(responses) = method_item.get("responses").and_then(JsonValue::as_object) else {
            return Ok(BTreeMap::new());
        };
        responses
            .iter()
            .map(|(code, raw)| -> crate::Result<(String, OpenApiResponse)> {
                let resolved = self.deref(raw)?;
                let response: OpenApiResponse =
                    serde_json::from_value(resolved.clone()).map_err(|e| {
                    Error::openapi(format!("Invalid response '{}': {}", code, e))
                })?;
                Ok((code.clone(), response))
            })
            .collect()
    }
}

/// Extract vendor extensions from JSON object
fn extract_vendor_extensions(item: &JsonMap<String, JsonValue>) -> BTreeMap<String, JsonValue> {
    item.iter()
        .filter(|(k, _)| k.starts_with("x-"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Parsed OpenAPI operation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpenApiOperation {
    /// `operationId`, or `<method>_<path>` when the document has none.
    #[serde(rename = "operationId")]
    pub id: String,
    /// Lower-case HTTP method
    pub method: String,
    /// The path where this operation is defined (e.g., "/v2/bot/user/{userId}/richmenu")
    pub path: String,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<OpenApiParameter>,
    /// Resolved request body object
    #[serde(rename = "requestBody")]
    pub request_body: Option<JsonValue>,
    pub responses: BTreeMap<String, OpenApiResponse>,
    pub deprecated: bool,
    /// Specification extensions (fields starting with `x-`).
    pub vendor_extensions: BTreeMap<String, JsonValue>,
}

impl OpenApiOperation {
    /// Parameters located `in` the given place, in declaration order.
    pub fn parameters_in<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a OpenApiParameter> {
        self.parameters.iter().filter(move |p| p.in_ == location)
    }

    /// Schema of the request body's preferred media type.
    pub fn request_body_schema(&self) -> Option<&JsonValue> {
        let content = self.request_body.as_ref()?.get("content")?.as_object()?;
        preferred_media_type(content.iter().collect())?.get("schema")
    }

    pub fn request_body_required(&self) -> bool {
        self.request_body
            .as_ref()
            .and_then(|b| b.get("required"))
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }
}

/// Information about a single parameter in an OpenAPI operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenApiParameter {
    /// The name of the parameter. Parameter names are case sensitive.
    pub name: String,
    /// The location of the parameter. Possible values: "query", "header", "path", or "cookie".
    #[serde(rename = "in")]
    pub in_: String,
    pub description: Option<String>,
    /// Path parameters are always required.
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
    /// The schema defining the type used for the parameter.
    pub schema: Option<JsonValue>,
    pub example: Option<JsonValue>,
}

impl OpenApiParameter {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(self.in_ == "path")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OpenApiResponse {
    pub description: Option<String>,
    /// A map containing descriptions of potential response payloads. The key is a media type, and the value describes it.
    pub content: Option<BTreeMap<String, JsonValue>>,
}

impl OpenApiResponse {
    /// Schema of the preferred media type; `None` when the response has no body.
    pub fn schema(&self) -> Option<&JsonValue> {
        let content = self.content.as_ref()?;
        preferred_media_type(content.iter().collect())?.get("schema")
    }
}

/// `application/json` if present, otherwise the first media type.
fn preferred_media_type<'a>(content: Vec<(&'a String, &'a JsonValue)>) -> Option<&'a JsonValue> {
    content
        .iter()
        .find(|(media, _)| media.as_str() == "application/json")
        .or_else(|| content.first())
        .map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn petstore() -> OpenApiContext {
        OpenApiContext {
            json: json!({
                "openapi": "3.0.0",
                "info": { "title": "LINE Messaging API", "version": "0.0.1" },
                "paths": {
                    "/v2/bot/user/{userId}/richmenu": {
                        "parameters": [
                            { "name": "userId", "in": "path", "schema": { "type": "string" } },
                            { "$ref": "#/components/parameters/limit" }
                        ],
                        "get": {
                            "operationId": "getRichMenuIdOfUser",
                            "tags": ["messaging-api"],
                            "parameters": [
                                { "name": "limit", "in": "query", "required": true, "schema": { "type": "integer" } }
                            ],
                            "responses": {
                                "200": { "$ref": "#/components/responses/RichMenuId" },
                                "default": { "description": "error" }
                            }
                        },
                        "delete": {
                            "responses": { "200": { "description": "ok" } }
                        }
                    }
                },
                "components": {
                    "parameters": {
                        "limit": { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                    },
                    "responses": {
                        "RichMenuId": {
                            "description": "OK",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/RichMenuIdResponse" } } }
                        }
                    },
                    "schemas": {
                        "RichMenuIdResponse": { "type": "object", "properties": { "richMenuId": { "type": "string" } } },
                        "ErrorResponse": { "type": "object" }
                    }
                }
            }),
        }
    }

    #[tokio::test]
    async fn test_from_file_yaml() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("openapi.yml");
        let yaml_content = "openapi: 3.0.0\ninfo:\n  title: Shop API\n  version: 0.0.1\npaths: {}\n";
        tokio::fs::write(&file_path, yaml_content).await?;

        let spec = OpenApiContext::from_file(&file_path).await?;
        assert_eq!(spec.title(), Some("Shop API"));
        assert_eq!(spec.version(), Some("0.0.1"));
        assert_eq!(spec.openapi_version(), Some("3.0.0"));
        spec.validate()?;
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file_rejects_garbage() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("broken.json");
        tokio::fs::write(&file_path, "just a string").await?;
        let err = OpenApiContext::from_file(&file_path).await.unwrap_err();
        assert!(matches!(err, Error::OpenApi(_)));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_swagger_2() {
        let spec = OpenApiContext {
            json: json!({"swagger": "2.0", "info": {"title": "x", "version": "1"}, "paths": {}}),
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_parse_operations_merges_parameters() {
        let spec = petstore();
        let ops = spec.parse_operations().unwrap();
        assert_eq!(ops.len(), 2);

        let get = &ops[0];
        assert_eq!(get.method, "get");
        assert_eq!(get.id, "getRichMenuIdOfUser");
        assert_eq!(get.tags, vec!["messaging-api".to_string()]);
        let names: Vec<_> = get.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["userId", "limit"]);
        let limit = get.parameters_in("query").next().unwrap();
        assert!(limit.is_required(), "operation-level parameter overrides path-level one");
        assert!(get.parameters_in("path").next().unwrap().is_required());
    }

    #[test]
    fn test_parse_operations_default_id() {
        let ops = petstore().parse_operations().unwrap();
        assert_eq!(ops[1].method, "delete");
        assert_eq!(ops[1].id, "delete_v2_bot_user__userId__richmenu");
    }

    #[test]
    fn test_responses_resolve_refs() {
        let ops = petstore().parse_operations().unwrap();
        let ok = &ops[0].responses["200"];
        assert_eq!(
            ok.schema(),
            Some(&json!({"$ref": "#/components/schemas/RichMenuIdResponse"}))
        );
        assert_eq!(ops[0].responses["default"].schema(), None);
    }

    #[test]
    fn test_missing_paths_is_fatal() {
        let spec = OpenApiContext { json: json!({"openapi": "3.0.0"}) };
        assert!(spec.parse_operations().is_err());
    }

    #[test]
    fn test_dangling_ref_is_fatal() {
        let spec = OpenApiContext {
            json: json!({"paths": {"/x": {"get": {"responses": {"200": {"$ref": "#/components/responses/Nope"}}}}}}),
        };
        assert!(spec.parse_operations().is_err());
        assert!(spec.resolve_ref("https://example.com/x.yaml").is_err());
    }

    #[test]
    fn test_schemas_sorted_by_name() {
        let spec = petstore();
        let names: Vec<_> = spec.schemas().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ErrorResponse", "RichMenuIdResponse"]);
        assert!(spec.schema("ErrorResponse").is_some());
    }

    #[test]
    fn test_preferred_media_type() {
        let response: OpenApiResponse = serde_json::from_value(json!({
            "content": {
                "text/plain": { "schema": { "type": "string" } },
                "application/json": { "schema": { "type": "integer" } }
            }
        }))
        .unwrap();
        assert_eq!(response.schema(), Some(&json!({"type": "integer"})));

        let plain: OpenApiResponse = serde_json::from_value(json!({
            "content": { "image/png": { "schema": { "type": "string", "format": "binary" } } }
        }))
        .unwrap();
        assert_eq!(
            plain.schema(),
            Some(&json!({"type": "string", "format": "binary"}))
        );
    }
}
