//! Artifact generation.
//!
//! Turns an already-computed analysis into publishable artifacts: an
//! llms.txt manifest document and ready-to-paste structured-data snippets.
//! Generation is purely templated string and JSON construction from facts
//! the pipeline has already extracted; nothing here infers anything new.

pub mod manifest;
pub mod snippets;

pub use manifest::{ManifestArtifact, generate_manifest};
pub use snippets::{
    FieldPresence, FieldStatus, SchemaSnippet, SchemaSuggestions, generate_schema_for_page,
};

use serde::{Deserialize, Serialize};

/// How trustworthy a generated artifact is, judged purely by how many
/// gaps generation had to work around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl Confidence {
    /// Tier from an accumulated issue count: none is high, up to two is
    /// medium, anything more is low.
    #[must_use]
    pub const fn from_issue_count(issues: usize) -> Self {
        match issues {
            0 => Self::High,
            1 | 2 => Self::Medium,
            _ => Self::Low,
        }
    }
}
