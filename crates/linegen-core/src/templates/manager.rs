//! Template loading and rendering

// Internal imports (std, crate)
use std::{
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use crate::{
    builders::EndpointContext,
    config::{GeneratorSettings, GENERATOR_HELP, GENERATOR_NAME},
    error::Result,
    manifest::{ForEach, TemplateFile, TemplateManifest},
    openapi::OpenApiContext,
};

use super::{TemplateDir, TemplateKind};

// External imports (alphabetized)
use futures::future::try_join_all;
use serde_json::{json, Map, Value as JsonValue};
use tera::{Context, Tera};

/// A rendered template waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Manages loading and rendering of code generation templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    /// Template directory
    template_dir: TemplateDir,
    /// The template manifest
    manifest: TemplateManifest,
}

impl TemplateManager {
    /// Create a new TemplateManager for the given template kind and directory
    ///
    /// # Arguments
    /// * `template_kind` - The kind of template to use
    /// * `template_dir` - Optional template directory, either the directory
    ///   holding every kind or the kind's own directory. If None, the standard
    ///   locations are searched.
    pub async fn new(template_kind: TemplateKind, template_dir: Option<PathBuf>) -> Result<Self> {
        let template_dir = TemplateDir::discover(template_kind, template_dir.as_deref())?;

        let template_path = template_dir.template_path();
        let template_dir_str = template_path.to_str().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "Template path contains invalid UTF-8",
            )
        })?;

        let manifest = TemplateManifest::load_from_dir(template_path).await?;

        let tera = Tera::new(&format!("{}/**/*.tera", template_dir_str)).map_err(|e| {
            crate::Error::template(format!(
                "Failed to parse templates in {}: {}",
                template_dir.display(),
                e
            ))
        })?;
        log::debug!(
            "Loaded templates from {}: {:?}",
            template_dir.display(),
            tera.get_template_names().collect::<Vec<_>>()
        );

        Ok(TemplateManager {
            tera: Arc::new(tera),
            template_dir,
            manifest,
        })
    }

    /// Get the template kind this template manager is configured for
    pub fn template_kind(&self) -> TemplateKind {
        self.template_dir.kind()
    }

    pub fn template_dir(&self) -> &TemplateDir {
        &self.template_dir
    }

    /// Get a reference to the template manifest
    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// Manifest entries whose template was loaded, as `(source, destination)`
    pub fn list_templates(&self) -> Vec<(String, String)> {
        self.manifest
            .files
            .iter()
            .filter(|f| self.has_template(&f.source))
            .map(|f| (f.source.clone(), f.destination.clone()))
            .collect()
    }

    /// Generate the client for `spec` into `output_dir`.
    ///
    /// Every file is rendered before the first one is written, so a template
    /// or document error leaves the output directory untouched. Returns the
    /// written paths.
    pub async fn generate(
        &self,
        spec: &OpenApiContext,
        settings: &GeneratorSettings,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let files = self.render_all(spec, settings, output_dir)?;

        tokio::fs::create_dir_all(output_dir).await?;
        let written = Self::write_all(files).await?;
        log::info!("Wrote {} files to {}", written.len(), output_dir.display());

        self.execute_post_generation_hooks(output_dir).await?;
        Ok(written)
    }

    /// Render every manifest entry in memory.
    pub fn render_all(
        &self,
        spec: &OpenApiContext,
        settings: &GeneratorSettings,
        output_dir: &Path,
    ) -> Result<Vec<RenderedFile>> {
        spec.validate()?;

        let operations: Vec<_> = spec
            .parse_operations()?
            .into_iter()
            .filter(|op| {
                let keep = settings.includes_operation(&op.id);
                if !keep {
                    log::debug!("Skipping filtered operation {}", op.id);
                }
                keep
            })
            .collect();

        let builder = EndpointContext::get_builder(self.template_kind(), settings, spec);
        let api_groups = EndpointContext::transform_endpoints(builder.as_ref(), settings, &operations)?;

        let mut models = Vec::new();
        let mut model_files: BTreeMap<String, &str> = BTreeMap::new();
        for (name, schema) in spec.schemas() {
            let Some(model) = builder.build_model(name, schema)? else {
                continue;
            };
            let file_name = model
                .get("file_name")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| crate::Error::template("Model context without file_name"))?;
            if let Some(other) = model_files.insert(file_name.to_string(), name) {
                return Err(crate::Error::openapi(format!(
                    "Schemas '{}' and '{}' both generate {}",
                    other, name, file_name
                )));
            }
            models.push(model);
        }

        let base_context = Self::build_context(spec, settings);
        let mut rendered = Vec::new();

        for file in &self.manifest.files {
            log::debug!("Processing file: {} -> {}", file.source, file.destination);
            match file.for_each {
                Some(ForEach::Api) => {
                    for group in &api_groups {
                        let mut context = Self::create_file_context(&base_context, &file.context);
                        context.insert("api".to_string(), serde_json::to_value(group)?);
                        rendered.push(self.render_file(
                            file,
                            context,
                            output_dir,
                            settings,
                            Some(&group.file_name),
                        )?);
                    }
                }
                Some(ForEach::Model) => {
                    for model in &models {
                        let file_name = model
                            .get("file_name")
                            .and_then(JsonValue::as_str)
                            .ok_or_else(|| crate::Error::template("Model context without file_name"))?;
                        let mut context = Self::create_file_context(&base_context, &file.context);
                        context.insert("model".to_string(), model.clone());
                        rendered.push(self.render_file(
                            file,
                            context,
                            output_dir,
                            settings,
                            Some(file_name),
                        )?);
                    }
                }
                None => {
                    let mut context = Self::create_file_context(&base_context, &file.context);
                    context.insert("apis".to_string(), serde_json::to_value(&api_groups)?);
                    context.insert("models".to_string(), JsonValue::Array(models.clone()));
                    rendered.push(self.render_file(file, context, output_dir, settings, None)?);
                }
            }
        }

        let mut seen = BTreeSet::new();
        for file in &rendered {
            if !seen.insert(&file.path) {
                return Err(crate::Error::template(format!(
                    "More than one template renders to {}",
                    file.path.display()
                )));
            }
        }

        Ok(rendered)
    }

    /// Values shared by every rendered file
    fn build_context(spec: &OpenApiContext, settings: &GeneratorSettings) -> Map<String, JsonValue> {
        let mut base_map = Map::new();
        base_map.insert("module_name".to_string(), json!(settings.namespace.root()));
        base_map.insert("namespace".to_string(), json!(settings.namespace.base()));
        base_map.insert("package_name".to_string(), json!(settings.package_name));
        base_map.insert("deps".to_string(), json!(settings.deps));
        base_map.insert("generator_name".to_string(), json!(GENERATOR_NAME));
        base_map.insert("generator_help".to_string(), json!(GENERATOR_HELP));
        base_map.insert("api_folder".to_string(), json!(settings.api_folder));
        base_map.insert("model_folder".to_string(), json!(settings.model_folder));
        base_map.insert("project_title".to_string(), json!(spec.title()));
        base_map.insert("api_version".to_string(), json!(spec.version()));
        base_map
    }

    /// Merge base context with file context, giving precedence to file context keys
    fn create_file_context(
        base_context: &Map<String, JsonValue>,
        file_context: &JsonValue,
    ) -> Map<String, JsonValue> {
        let mut context = base_context.clone();
        if let JsonValue::Object(extra) = file_context {
            for (key, value) in extra {
                context.insert(key.clone(), value.clone());
            }
        }
        context
    }

    fn render_file(
        &self,
        file: &TemplateFile,
        context: Map<String, JsonValue>,
        output_dir: &Path,
        settings: &GeneratorSettings,
        file_name: Option<&str>,
    ) -> Result<RenderedFile> {
        let destination = expand_destination(&file.destination, settings, file_name)?;
        let tera_context = Context::from_value(JsonValue::Object(context))?;

        let content = self.tera.render(&file.source, &tera_context).map_err(|e| {
            log::error!("Template rendering failed for '{}': {:?}", file.source, e);
            crate::Error::template(format!(
                "Failed to render template '{}' for {}: {}",
                file.source,
                destination.display(),
                e
            ))
        })?;

        Ok(RenderedFile {
            path: output_dir.join(destination),
            content,
        })
    }

    async fn write_all(files: Vec<RenderedFile>) -> Result<Vec<PathBuf>> {
        try_join_all(files.into_iter().map(|file| async move {
            if let Some(parent) = file.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            log::debug!("Writing {}", file.path.display());
            tokio::fs::write(&file.path, file.content).await?;
            Ok::<_, crate::Error>(file.path)
        }))
        .await
    }

    /// Execute post-generation hooks from the manifest
    pub async fn execute_post_generation_hooks(&self, output_path: &Path) -> Result<()> {
        use tokio::process::Command as AsyncCommand;

        for command in &self.manifest.hooks.post_generate {
            log::info!("Running post-generation hook: {}", command);
            let output = AsyncCommand::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(output_path)
                .output()
                .await
                .map_err(|e| {
                    crate::Error::template(format!(
                        "Failed to execute post-generation hook '{}': {}",
                        command, e
                    ))
                })?;

            if !output.status.success() {
                return Err(crate::Error::template(format!(
                    "Post-generation hook '{}' failed with status {}\n{}{}",
                    command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr),
                    String::from_utf8_lossy(&output.stdout)
                )));
            }
        }
        Ok(())
    }
}

/// Fill `{api_folder}`, `{model_folder}` and `{file_name}` into a manifest
/// destination. The result must stay inside the output directory.
fn expand_destination(
    destination: &str,
    settings: &GeneratorSettings,
    file_name: Option<&str>,
) -> Result<PathBuf> {
    let mut expanded = destination
        .replace("{api_folder}", &settings.api_folder)
        .replace("{model_folder}", &settings.model_folder);
    if let Some(file_name) = file_name {
        expanded = expanded.replace("{file_name}", file_name);
    }

    let path = PathBuf::from(&expanded);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if expanded.is_empty() || escapes {
        return Err(crate::Error::template(format!(
            "Destination '{}' must be a relative path inside the output directory",
            destination
        )));
    }
    Ok(path)
}
