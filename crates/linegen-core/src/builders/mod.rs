//! Context builder traits and adapters for language-specific codegen.
pub mod elixir;

use std::collections::BTreeMap;

use crate::config::GeneratorSettings;
use crate::openapi::{OpenApiContext, OpenApiOperation};
use crate::templates::TemplateKind;
use crate::utils::{camelize, underscore};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Tag used for operations that declare none.
pub const DEFAULT_API_TAG: &str = "Default";

/// Converts parsed OpenAPI items into template contexts.
pub trait ContextBuilder {
    /// Context for one operation. Must contain `fn_name` and `api_tag`.
    fn build(&self, op: &OpenApiOperation) -> crate::Result<JsonValue>;

    /// Context for one component schema; `None` when the schema gets no module.
    fn build_model(&self, name: &str, schema: &JsonValue) -> crate::Result<Option<JsonValue>>;
}

/// Operations sharing a tag, rendered into one API module.
#[derive(Debug, Clone, Serialize)]
pub struct ApiGroup {
    pub tag: String,
    pub module_name: String,
    pub file_name: String,
    pub operations: Vec<JsonValue>,
}

pub struct EndpointContext;

impl EndpointContext {
    /// Build the context of every operation and group them by `api_tag`.
    ///
    /// Tags that camelize to the same module name (`messaging-api`,
    /// `MessagingApi`) share one group, named after the smallest raw tag.
    /// Groups are ordered by module name and operations inside a group by
    /// `fn_name` so repeated runs produce identical files.
    pub fn transform_endpoints(
        builder: &dyn ContextBuilder,
        settings: &GeneratorSettings,
        operations: &[OpenApiOperation],
    ) -> crate::Result<Vec<ApiGroup>> {
        let mut grouped: BTreeMap<String, (String, Vec<JsonValue>)> = BTreeMap::new();
        for op in operations {
            let context = builder.build(op)?;
            let tag = context
                .get("api_tag")
                .and_then(JsonValue::as_str)
                .unwrap_or(DEFAULT_API_TAG)
                .to_string();
            let (group_tag, contexts) = grouped
                .entry(camelize(&tag))
                .or_insert_with(|| (tag.clone(), Vec::new()));
            if tag < *group_tag {
                log::debug!("Tags '{}' and '{}' share one API module", tag, group_tag);
                *group_tag = tag;
            }
            contexts.push(context);
        }

        Ok(grouped
            .into_iter()
            .map(|(module, (tag, mut operations))| {
                operations.sort_by(|a, b| {
                    let name_a = a.get("fn_name").and_then(|v| v.as_str()).unwrap_or("");
                    let name_b = b.get("fn_name").and_then(|v| v.as_str()).unwrap_or("");
                    name_a.cmp(name_b)
                });
                ApiGroup {
                    module_name: settings.namespace.api(&module),
                    file_name: format!("{}.ex", underscore(&module)),
                    tag,
                    operations,
                }
            })
            .collect())
    }

    pub fn get_builder<'a>(
        template: TemplateKind,
        settings: &'a GeneratorSettings,
        spec: &'a OpenApiContext,
    ) -> Box<dyn ContextBuilder + 'a> {
        match template {
            // Custom templates get the same contexts as the built-in ones.
            TemplateKind::LineBotElixir | TemplateKind::Custom => {
                Box::new(elixir::ElixirContextBuilder::new(settings, spec))
            }
        }
    }
}
