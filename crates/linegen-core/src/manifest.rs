//! Manifest file format for linegen templates.
//!
//! A template directory holds a `manifest.yaml` (or `manifest.toml`) listing
//! which template renders to which output file:
//!
//! ```yaml
//! name: line_bot_elixir
//! description: LINE Bot SDK Elixir client
//! version: 0.1.0
//! language: elixir
//! files:
//!   - source: api.ex.tera
//!     destination: "{api_folder}/{file_name}"
//!     for_each: api
//!   - source: model.ex.tera
//!     destination: "{model_folder}/{file_name}"
//!     for_each: model
//! hooks:
//!   post_generate: mix format
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;
use tokio::fs;

/// The root manifest structure for a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// The name of the template
    pub name: String,

    /// A short description of what the template generates
    pub description: String,

    /// The version of the template (should follow semantic versioning)
    pub version: String,

    /// The target programming language
    pub language: String,

    /// List of files to generate
    pub files: Vec<TemplateFile>,

    /// Optional hooks that run after generation
    #[serde(default)]
    pub hooks: TemplateHooks,
}

/// What a template file is rendered once per.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForEach {
    /// One file per API group (operations sharing their first tag)
    Api,
    /// One file per component schema
    Model,
}

/// Describes a single file to be generated from a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Path to the template file, relative to the template directory
    pub source: String,

    /// Destination path relative to the output directory. May contain
    /// `{api_folder}`, `{model_folder}` and, for `for_each` files, `{file_name}`.
    pub destination: String,

    /// Render once per API group or model instead of once
    #[serde(default)]
    pub for_each: Option<ForEach>,

    /// Additional context to pass to the template
    #[serde(default)]
    pub context: serde_json::Value,
}

/// Hooks that run at specific points during code generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateHooks {
    /// Commands to run in the output directory after every file is written
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub post_generate: Vec<String>,
}

impl Default for TemplateManifest {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            description: String::from("Default template"),
            version: String::from("0.1.0"),
            language: String::from("elixir"),
            files: Vec::new(),
            hooks: TemplateHooks::default(),
        }
    }
}

impl TemplateManifest {
    /// Load the manifest of a template directory.
    ///
    /// `manifest.yaml` wins over `manifest.toml`; a directory with neither
    /// yields the default (empty) manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest file exists but can't be read or parsed.
    pub async fn load_from_dir(template_dir: &Path) -> crate::Result<Self> {
        let yaml_path = template_dir.join("manifest.yaml");
        let toml_path = template_dir.join("manifest.toml");

        if yaml_path.exists() {
            log::debug!("Reading template manifest {}", yaml_path.display());
            let content = fs::read_to_string(&yaml_path).await?;
            serde_yaml::from_str(&content).map_err(|e| {
                crate::Error::template(format!(
                    "Invalid YAML in template manifest at {}: {}",
                    yaml_path.display(),
                    e
                ))
            })
        } else if toml_path.exists() {
            log::debug!("Reading template manifest {}", toml_path.display());
            let content = fs::read_to_string(&toml_path).await?;
            Ok(toml::from_str(&content)?)
        } else {
            log::warn!(
                "No manifest in {}, nothing will be generated",
                template_dir.display()
            );
            Ok(Self::default())
        }
    }
}

/// Helper function to deserialize either a single command or a list of commands
fn deserialize_commands<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => seq
            .into_iter()
            .map(|item| match item {
                SerdeValue::String(s) => Ok(s),
                _ => Err(serde::de::Error::custom(
                    "Expected string or array of strings",
                )),
            })
            .collect(),
        _ => Err(serde::de::Error::custom(
            "Expected string or array of strings",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_yaml_manifest() {
        let manifest: TemplateManifest = serde_yaml::from_str(
            r#"
name: t
description: d
version: 0.1.0
language: elixir
files:
  - source: api.ex.tera
    destination: "{api_folder}/{file_name}"
    for_each: api
  - source: deps.exs.tera
    destination: deps.exs
hooks:
  post_generate: mix format
"#,
        )
        .unwrap();
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files[0].for_each, Some(ForEach::Api));
        assert_eq!(manifest.files[1].for_each, None);
        assert_eq!(manifest.hooks.post_generate, vec!["mix format".to_string()]);
    }

    #[test]
    fn test_hooks_accept_lists_only_of_strings() {
        let hooks: TemplateHooks =
            serde_yaml::from_str("post_generate: [mix format, mix compile]").unwrap();
        assert_eq!(hooks.post_generate.len(), 2);
        assert!(serde_yaml::from_str::<TemplateHooks>("post_generate: [1, 2]").is_err());
    }

    #[test]
    fn test_unknown_for_each_is_rejected() {
        let result = serde_yaml::from_str::<TemplateFile>(
            "source: a.tera\ndestination: a\nfor_each: endpoint\n",
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_toml_and_missing() -> crate::Result<()> {
        let dir = tempdir()?;
        let empty = TemplateManifest::load_from_dir(dir.path()).await?;
        assert!(empty.files.is_empty());

        let manifest = TemplateManifest {
            name: "toml".into(),
            ..Default::default()
        };
        let content = toml::to_string_pretty(&manifest)
            .map_err(|e| crate::Error::template(e.to_string()))?;
        tokio::fs::write(dir.path().join("manifest.toml"), content).await?;
        let loaded = TemplateManifest::load_from_dir(dir.path()).await?;
        assert_eq!(loaded.name, "toml");
        Ok(())
    }
}
