//! Column affinity classification from declared types.
//!
//! SQLite column types are advisory: the engine derives a column's affinity
//! by looking for keyword substrings in whatever the schema author wrote.
//! The browser follows the same rule so that `VARCHAR(255)`, `NVARCHAR`,
//! `DOUBLE PRECISION` and `BIGINT UNSIGNED` all land in the right class.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse type class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affinity {
    Text,
    Numeric,
    Other,
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Affinity::Text => write!(f, "text"),
            Affinity::Numeric => write!(f, "numeric"),
            Affinity::Other => write!(f, "other"),
        }
    }
}

const TEXT_MARKERS: &[&str] = &["CHAR", "TEXT", "CLOB"];
const NUMERIC_MARKERS: &[&str] = &["INT", "REAL", "NUM", "DEC", "DOUBLE", "FLOAT"];

/// Classify a declared column type.
///
/// Text markers win over numeric ones, so `CHARINT` is text.
pub fn classify(decl_type: &str) -> Affinity {
    let upper = decl_type.trim().to_uppercase();
    if TEXT_MARKERS.iter().any(|m| upper.contains(m)) {
        Affinity::Text
    } else if NUMERIC_MARKERS.iter().any(|m| upper.contains(m)) {
        Affinity::Numeric
    } else {
        Affinity::Other
    }
}
