//! linegen core library
//!
//! Generates the Elixir modules of the LINE Bot SDK from OpenAPI documents:
//! one API module per tag and one model module per component schema, all
//! living under the `LINE.Bot[.<Package>]` namespace.
//!
//! The Elixir-specific decisions (response dispatch keys and decoders, path
//! templates for `Req`, header names) live in [`codegen`]; the rest of the
//! crate loads documents, builds template contexts and renders them.

pub mod builders;
pub mod codegen;
pub mod config;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod openapi;
pub mod templates;
pub mod utils;

pub use crate::{
    config::{Config, GeneratorSettings},
    error::{Error, Result},
    generate::generate,
    openapi::OpenApiContext,
    templates::{TemplateDir, TemplateKind, TemplateManager},
};
