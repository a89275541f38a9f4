//! Code generation entry point

use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    error::Result,
    openapi::OpenApiContext,
    templates::TemplateManager,
};

/// Generate the Elixir client described by `config`.
///
/// Returns the paths of the written files.
pub async fn generate(config: &Config) -> Result<Vec<PathBuf>> {
    // 1. Derive run settings; invalid configuration fails before any I/O
    let settings = config.settings()?;

    // 2. Load OpenAPI schema
    let schema = OpenApiContext::from_file(&config.openapi_schema_path).await?;
    log::info!(
        "Loaded {} {}",
        schema.title().unwrap_or("OpenAPI document"),
        schema.version().unwrap_or_default()
    );

    // 3. Initialize template manager
    let template_dir = config.template_dir.as_ref().map(PathBuf::from);
    let template_manager = TemplateManager::new(settings.template_kind, template_dir).await?;

    // 4. Render and write
    template_manager
        .generate(&schema, &settings, Path::new(&config.output_dir))
        .await
}
