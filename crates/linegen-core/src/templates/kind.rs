//! Template kinds and their identifiers.
//!
//! # Examples
//!
//! ```
//! use linegen_core::templates::TemplateKind;
//! use std::str::FromStr;
//!
//! let template = TemplateKind::from_str("line_bot_elixir").unwrap();
//! assert_eq!(template, TemplateKind::LineBotElixir);
//! assert_eq!(template.to_string(), "line_bot_elixir");
//! assert_eq!(TemplateKind::default(), TemplateKind::LineBotElixir);
//! ```
//!
//! The identifier doubles as the name of the template's directory, see
//! [`TemplateDir::discover`](super::TemplateDir::discover).

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

/// Supported template kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum TemplateKind {
    /// Elixir client modules for the LINE Bot SDK
    #[default]
    #[value(name = "line_bot_elixir")]
    LineBotElixir,
    /// User supplied templates rendered with the same Elixir contexts
    #[value(name = "custom")]
    Custom,
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line_bot_elixir" => Ok(TemplateKind::LineBotElixir),
            "custom" => Ok(TemplateKind::Custom),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

impl TemplateKind {
    /// Returns the template identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineBotElixir => "line_bot_elixir",
            Self::Custom => "custom",
        }
    }

    /// Returns an iterator over all available template kinds
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::LineBotElixir, Self::Custom].into_iter()
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
