//! Module namespace used for every generated Elixir module.

use serde::Serialize;

use crate::utils::camelize;

/// Root module every generated module lives under.
pub const DEFAULT_ROOT_NAMESPACE: &str = "LINE.Bot";

/// Root namespace plus the optional per-package segment.
///
/// `LINE.Bot` + `ChannelAccessToken` yields modules such as
/// `LINE.Bot.ChannelAccessToken.Model.ErrorResponse`. The value is built once
/// per run and handed to every builder explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    root: String,
    prefix: Option<String>,
}

impl Namespace {
    /// Create a namespace; an empty prefix is treated as no prefix.
    pub fn new(root: impl Into<String>, prefix: Option<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.filter(|p| !p.is_empty()),
        }
    }

    /// Derive the prefix from a snake_case package name
    /// (`channel_access_token` -> `ChannelAccessToken`).
    pub fn from_package_name(root: impl Into<String>, package_name: Option<&str>) -> Self {
        Self::new(root, package_name.map(camelize))
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// `root[.prefix]`
    pub fn base(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}.{}", self.root, prefix),
            None => self.root.clone(),
        }
    }

    /// `root[.prefix].<group>.<name>`, e.g. `module("Model", "ErrorResponse")`.
    pub fn module(&self, group: &str, name: &str) -> String {
        format!("{}.{}.{}", self.base(), group, name)
    }

    /// Fully-qualified reference to a generated model module.
    pub fn model(&self, name: &str) -> String {
        self.module("Model", name)
    }

    /// Fully-qualified reference to a generated API module.
    pub fn api(&self, name: &str) -> String {
        self.module("Api", name)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAMESPACE, None)
    }
}
