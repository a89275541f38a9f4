//! Configuration management for linegen code generation.
//!
//! This module defines the `Config` struct, which can be loaded from a YAML
//! file or created programmatically, and the immutable `GeneratorSettings`
//! derived from it for a single generation run.
//!
//! # Examples
//!
//! ```no_run
//! use linegen_core::config::Config;
//!
//! let mut config = Config::new("channel-access-token.yml", "lib/line/bot");
//! config.package_name = Some("channel_access_token".to_string());
//!
//! let settings = config.settings().unwrap();
//! assert_eq!(settings.namespace.base(), "LINE.Bot.ChannelAccessToken");
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::codegen::namespace::DEFAULT_ROOT_NAMESPACE;
use crate::codegen::Namespace;
use crate::templates::TemplateKind;
use crate::Error;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Name the generator registers itself under.
pub const GENERATOR_NAME: &str = "line-bot-sdk-elixir-generator";

/// One-line help text for the generator.
pub const GENERATOR_HELP: &str = "Generates a line-bot-sdk-elixir-generator client library.";

/// Dependencies emitted in place of the generic Elixir client's defaults.
pub const DEFAULT_DEPS: &[&str] = &[r#"{:req, "~> 0.5"}"#, r#"{:jason, "~> 1.4"}"#];

/// Configuration for a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the OpenAPI schema file
    pub openapi_schema_path: String,

    /// Output directory for generated code
    pub output_dir: String,

    /// Package name in snake_case (e.g. `channel_access_token`); drives the
    /// namespace prefix of every generated module
    #[serde(default)]
    pub package_name: Option<String>,

    /// Template to use for code generation
    #[serde(default = "default_template")]
    pub template_kind: String,

    /// Optional path to template directory
    #[serde(default)]
    pub template_dir: Option<String>,

    /// Root module of the SDK
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Sub-folder of `output_dir` for API modules
    #[serde(default = "default_api_folder")]
    pub api_folder: String,

    /// Sub-folder of `output_dir` for model modules
    #[serde(default = "default_model_folder")]
    pub model_folder: String,

    /// Mix dependency declarations exposed to templates
    #[serde(default = "default_deps")]
    pub deps: Vec<String>,

    /// Operation ids to generate; empty means all
    #[serde(default)]
    pub include_operations: Vec<String>,

    /// Operation ids to skip
    #[serde(default)]
    pub exclude_operations: Vec<String>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(openapi_schema_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            openapi_schema_path: openapi_schema_path.into(),
            output_dir: output_dir.into(),
            package_name: None,
            template_kind: default_template(),
            template_dir: None,
            module_name: default_module_name(),
            api_folder: default_api_folder(),
            model_folder: default_model_folder(),
            deps: default_deps(),
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Derive the settings for one run.
    pub fn settings(&self) -> crate::Result<GeneratorSettings> {
        let template_kind = self
            .template_kind
            .parse::<TemplateKind>()
            .map_err(Error::config)?;
        if self.module_name.trim().is_empty() {
            return Err(Error::config("module_name must not be empty"));
        }
        for (field, folder) in [("api_folder", &self.api_folder), ("model_folder", &self.model_folder)] {
            if folder.is_empty() || Path::new(folder).is_absolute() || folder.contains("..") {
                return Err(Error::config(format!(
                    "{} must be a relative folder inside the output directory, got '{}'",
                    field, folder
                )));
            }
        }

        let package_name = self.package_name.clone().filter(|p| !p.is_empty());
        Ok(GeneratorSettings {
            namespace: Namespace::from_package_name(&self.module_name, package_name.as_deref()),
            package_name,
            template_kind,
            api_folder: self.api_folder.clone(),
            model_folder: self.model_folder.clone(),
            deps: self.deps.clone(),
            include_operations: self.include_operations.clone(),
            exclude_operations: self.exclude_operations.clone(),
        })
    }
}

/// Read-only values shared by every work item of one run.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub namespace: Namespace,
    pub package_name: Option<String>,
    pub template_kind: TemplateKind,
    pub api_folder: String,
    pub model_folder: String,
    pub deps: Vec<String>,
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
}

impl GeneratorSettings {
    /// Whether an operation passes the include/exclude filters.
    pub fn includes_operation(&self, operation_id: &str) -> bool {
        let included = self.include_operations.is_empty()
            || self.include_operations.iter().any(|id| id == operation_id);
        included && !self.exclude_operations.iter().any(|id| id == operation_id)
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            namespace: Namespace::default(),
            package_name: None,
            template_kind: TemplateKind::default(),
            api_folder: default_api_folder(),
            model_folder: default_model_folder(),
            deps: default_deps(),
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
        }
    }
}

fn default_template() -> String {
    TemplateKind::default().as_str().to_string()
}

fn default_module_name() -> String {
    DEFAULT_ROOT_NAMESPACE.to_string()
}

fn default_api_folder() -> String {
    "api".to_string()
}

fn default_model_folder() -> String {
    "model".to_string()
}

fn default_deps() -> Vec<String> {
    DEFAULT_DEPS.iter().map(|d| d.to_string()).collect()
}
