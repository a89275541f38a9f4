//! Template discovery, manifests and rendering.

pub mod dir;
pub mod kind;
pub mod manager;

pub use dir::TemplateDir;
pub use kind::TemplateKind;
pub use manager::{RenderedFile, TemplateManager};
