//! Elixir-specific transforms applied to every operation, response and schema
//! of the OpenAPI document before templates are rendered.
//!
//! Everything in here is a pure function of the parsed document and the
//! [`Namespace`] the run was configured with.

pub mod namespace;
pub mod path;
pub mod response;
pub mod types;

pub use namespace::Namespace;
pub use path::{HeaderParameter, PathParameter, PlaceholderCollision};
pub use response::{
    DecodedType, DispatchKey, ResolvedResponse, ResponseDescriptor, ResponseTypeResolver, Warning,
};
pub use types::{ContainerKind, TypeInfo, TypeMapper, ELIXIR_PRIMITIVES};
