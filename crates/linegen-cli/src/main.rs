//! linegen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use linegen_core::config::{GENERATOR_HELP, GENERATOR_NAME};
use linegen_core::{Config, TemplateKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate Elixir API and model modules from an OpenAPI document
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(long)]
        schema_path: Option<String>,
        /// Output directory for generated code
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Package name in snake_case, e.g. channel_access_token
        #[arg(long)]
        package_name: Option<String>,
        /// Template to render
        #[arg(long, value_enum)]
        template_kind: Option<TemplateKind>,
        /// Template directory (root of all kinds or the kind's own directory)
        #[arg(long)]
        template_dir: Option<PathBuf>,
        /// YAML configuration file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show generator information
    Info {
        /// Print a sample configuration file instead
        #[arg(long)]
        sample_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            schema_path,
            output_dir,
            package_name,
            template_kind,
            template_dir,
            config,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(&path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => {
                    let schema_path = schema_path
                        .clone()
                        .context("--schema-path is required without --config")?;
                    let output_dir = output_dir
                        .clone()
                        .context("--output-dir is required without --config")?;
                    Config::new(schema_path, output_dir.to_string_lossy())
                }
            };

            if let Some(schema_path) = schema_path {
                config.openapi_schema_path = schema_path;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir.to_string_lossy().to_string();
            }
            if package_name.is_some() {
                config.package_name = package_name;
            }
            if let Some(kind) = template_kind {
                config.template_kind = kind.as_str().to_string();
            }
            if let Some(dir) = template_dir {
                config.template_dir = Some(dir.to_string_lossy().to_string());
            }

            tracing::info!(
                schema = %config.openapi_schema_path,
                output = %config.output_dir,
                template = %config.template_kind,
                "Generating client"
            );

            let written = linegen_core::generate(&config)
                .await
                .with_context(|| format!("Failed to generate from {}", config.openapi_schema_path))?;

            tracing::info!("Generated {} files in {}", written.len(), config.output_dir);
        }
        Commands::Info { sample_config } => {
            if sample_config {
                let sample = Config::new("openapi.yml", "lib/line/bot");
                print!("{}", serde_yaml::to_string(&sample)?);
            } else {
                println!("{}", GENERATOR_NAME);
                println!("{}", GENERATOR_HELP);
                println!(
                    "Templates: {}",
                    TemplateKind::all()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }
    Ok(())
}
