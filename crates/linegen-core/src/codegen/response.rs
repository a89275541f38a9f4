//! Per-response decoding decisions.
//!
//! Each declared response of an operation gets a dispatch key (how the
//! generated client matches the HTTP status) and a decoded type (what, if
//! anything, the body is decoded into).

use std::fmt;

use serde::{Serialize, Serializer};

use super::types::{is_language_primitive, ContainerKind, TypeInfo};
use super::Namespace;

/// Key the generated client uses to pick a decoder by status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchKey {
    /// `default` or `0`, rendered as `:default`.
    Default,
    /// A three digit status code, rendered as is.
    Code(String),
    /// Anything else (`2XX`, `20`), rendered as a quoted string.
    Quoted(String),
}

impl DispatchKey {
    pub fn from_status_code(code: &str) -> Self {
        if code == "0" || code == "default" {
            Self::Default
        } else if code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()) {
            Self::Code(code.to_string())
        } else {
            Self::Quoted(code.to_string())
        }
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str(":default"),
            Self::Code(code) => f.write_str(code),
            Self::Quoted(code) => write!(f, "\"{}\"", code),
        }
    }
}

/// How a response body is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedType {
    /// Untyped key-value blob, rendered `%{}`.
    AsMap,
    /// Untyped list, rendered `[]`.
    AsList,
    /// Body is not decoded, rendered `false`.
    Skip,
    /// Fully-qualified model module.
    Model(String),
}

impl fmt::Display for DecodedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsMap => f.write_str("%{}"),
            Self::AsList => f.write_str("[]"),
            Self::Skip => f.write_str("false"),
            Self::Model(reference) => f.write_str(reference),
        }
    }
}

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    )*};
}

serialize_as_display!(DispatchKey, DecodedType);

/// One declared response of an operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseDescriptor {
    /// `"200"`, `"default"`, `"0"` or whatever the document declares.
    pub status_code: String,
    pub base_type: Option<String>,
    pub container: ContainerKind,
    pub is_primitive: bool,
}

impl ResponseDescriptor {
    /// A response with no body schema.
    pub fn new(status_code: impl Into<String>) -> Self {
        Self {
            status_code: status_code.into(),
            ..Default::default()
        }
    }

    /// A response whose body maps to `info`; `None` means no schema.
    pub fn with_type(status_code: impl Into<String>, info: Option<&TypeInfo>) -> Self {
        match info {
            Some(info) => Self {
                status_code: status_code.into(),
                base_type: info.base_type.clone(),
                container: info.container,
                is_primitive: info.is_primitive,
            },
            None => Self::new(status_code),
        }
    }

    pub fn is_defined_default(&self) -> bool {
        self.status_code == "0" || self.status_code == "default"
    }
}

/// Advisory raised while resolving a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    UnknownStatusCode(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStatusCode(code) => write!(f, "Unknown HTTP status code: {}", code),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResponse {
    pub dispatch_key: DispatchKey,
    pub decoded: DecodedType,
    pub warnings: Vec<Warning>,
}

/// Resolves dispatch keys and decoded types against a namespace.
#[derive(Debug, Clone, Copy)]
pub struct ResponseTypeResolver<'a> {
    namespace: &'a Namespace,
}

impl<'a> ResponseTypeResolver<'a> {
    pub fn new(namespace: &'a Namespace) -> Self {
        Self { namespace }
    }

    pub fn resolve(&self, descriptor: &ResponseDescriptor) -> ResolvedResponse {
        let dispatch_key = DispatchKey::from_status_code(&descriptor.status_code);
        let mut warnings = Vec::new();
        if let DispatchKey::Quoted(code) = &dispatch_key {
            log::warn!("Unknown HTTP status code: {}", code);
            warnings.push(Warning::UnknownStatusCode(code.clone()));
        }

        ResolvedResponse {
            dispatch_key,
            decoded: self.decoded_type(
                descriptor.base_type.as_deref(),
                descriptor.container,
                descriptor.is_primitive,
            ),
            warnings,
        }
    }

    /// First match wins: maps, then missing or bare primitive types, then
    /// lists of primitives, then models.
    pub fn decoded_type(
        &self,
        base_type: Option<&str>,
        container: ContainerKind,
        is_primitive: bool,
    ) -> DecodedType {
        if container == ContainerKind::Map {
            return DecodedType::AsMap;
        }
        let base_type = match base_type {
            Some(base_type) if !(container == ContainerKind::None && is_primitive) => base_type,
            _ => return DecodedType::Skip,
        };
        if container == ContainerKind::Array && is_language_primitive(base_type) {
            return DecodedType::AsList;
        }
        DecodedType::Model(self.namespace.model(base_type))
    }

    /// Decoded type of a mapped schema.
    pub fn decoded_type_of(&self, info: &TypeInfo) -> DecodedType {
        self.decoded_type(info.base_type.as_deref(), info.container, info.is_primitive)
    }
}
