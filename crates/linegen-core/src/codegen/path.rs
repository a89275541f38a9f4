//! Path template rewriting for `Req`'s `:path_params` option and header
//! name normalization.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::utils::underscore;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("valid regex"));

/// A declared path parameter and its snake_case name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathParameter {
    pub original_name: String,
    pub normalized_name: String,
}

impl PathParameter {
    pub fn new(original_name: impl Into<String>) -> Self {
        let original_name = original_name.into();
        let normalized_name = underscore(&original_name);
        Self {
            original_name,
            normalized_name,
        }
    }

    /// `{userId}`
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.original_name)
    }

    /// `:user_id`
    pub fn marker(&self) -> String {
        format!(":{}", self.normalized_name)
    }
}

/// Replace every `{originalName}` with `:normalized_name`.
///
/// Parameters are applied in declaration order with plain substring
/// replacement. Placeholders without a declared parameter are left alone, so
/// rewriting an already rewritten path returns it unchanged.
pub fn rewrite(path_template: &str, parameters: &[PathParameter]) -> String {
    parameters
        .iter()
        .fold(path_template.to_string(), |path, param| {
            path.replace(&param.placeholder(), &param.marker())
        })
}

/// Names of `{...}` placeholders still present in `path`.
pub fn unmatched_placeholders(path: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Two parameters of one operation that interfere during [`rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderCollision {
    /// Same placeholder text; only the first parameter is ever substituted.
    Placeholder { first: String, second: String },
    /// Different placeholders that produce the same marker.
    Marker {
        first: String,
        second: String,
        marker: String,
    },
}

/// Parameter pairs whose substitution is ambiguous.
pub fn placeholder_collisions(parameters: &[PathParameter]) -> Vec<PlaceholderCollision> {
    let mut collisions = Vec::new();
    for (i, first) in parameters.iter().enumerate() {
        for second in &parameters[i + 1..] {
            if first.original_name == second.original_name {
                collisions.push(PlaceholderCollision::Placeholder {
                    first: first.original_name.clone(),
                    second: second.original_name.clone(),
                });
            } else if first.normalized_name == second.normalized_name {
                collisions.push(PlaceholderCollision::Marker {
                    first: first.original_name.clone(),
                    second: second.original_name.clone(),
                    marker: first.marker(),
                });
            }
        }
    }
    collisions
}

/// A header parameter with the lower-cased name sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderParameter {
    pub name: String,
    pub wire_name: String,
}

impl HeaderParameter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let wire_name = name.to_lowercase();
        Self { name, wire_name }
    }
}
