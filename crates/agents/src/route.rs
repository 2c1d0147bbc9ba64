//! Route labels and classifier-output normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which specialist(s) a question needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Route {
    /// Structured customer/ticket records only
    Sql,
    /// Policy documents only
    Policy,
    /// Records first, then policy
    Both,
    /// Neither specialist applies
    None,
}

impl Route {
    /// Canonical upper-case label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "SQL",
            Self::Policy => "POLICY",
            Self::Both => "BOTH",
            Self::None => "NONE",
        }
    }

    /// Parse an exact canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "SQL" => Some(Self::Sql),
            "POLICY" => Some(Self::Policy),
            "BOTH" => Some(Self::Both),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }

    /// Whether the structured-data specialist runs for this route.
    pub fn needs_sql(&self) -> bool {
        matches!(self, Self::Sql | Self::Both)
    }

    /// Whether the policy specialist runs for this route.
    pub fn needs_policy(&self) -> bool {
        matches!(self, Self::Policy | Self::Both)
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip raw classifier output down to upper-case ASCII letters.
///
/// `" sql.\n"` becomes `"SQL"`, `"maybe sql"` becomes `"MAYBESQL"`.
pub fn clean_label(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase())
        .collect()
}

/// Normalize classifier output to a route; anything unrecognized is `None`.
pub fn normalize_route(raw: &str) -> Route {
    Route::from_label(&clean_label(raw)).unwrap_or(Route::None)
}
