//! Non-fatal conversion diagnostics.
//!
//! Failures confined to one element degrade that element only and are
//! reported here alongside the output, never by aborting the conversion.

use serde::Serialize;
use std::fmt;

/// The kind of a non-fatal conversion notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A style's based-on chain revisited an ID; the style falls back to
    /// its directly declared attributes.
    CyclicStyle,
    /// A relationship ID had no target; the element degrades in place.
    UnresolvedRelationship,
    /// An image's bytes could not be extracted; a placeholder is rendered.
    MissingImage,
    /// A body element kind outside the supported set was skipped.
    UnsupportedElement,
}

impl WarningKind {
    /// Stable label used in CLI and log output.
    pub fn label(&self) -> &'static str {
        match self {
            WarningKind::CyclicStyle => "cyclic-style",
            WarningKind::UnresolvedRelationship => "unresolved-relationship",
            WarningKind::MissingImage => "missing-image",
            WarningKind::UnsupportedElement => "unsupported-element",
        }
    }
}

/// A single non-fatal notice: a kind tag plus a human-readable description.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cyclic_style(style_id: &str) -> Self {
        Self::new(
            WarningKind::CyclicStyle,
            format!("style '{}' has a cyclic based-on chain; using its own attributes only", style_id),
        )
    }

    pub fn unresolved_relationship(rel_id: &str) -> Self {
        Self::new(
            WarningKind::UnresolvedRelationship,
            format!("relationship '{}' has no target; element degraded", rel_id),
        )
    }

    pub fn missing_image(rel_id: &str) -> Self {
        Self::new(
            WarningKind::MissingImage,
            format!("image for relationship '{}' is missing; placeholder rendered", rel_id),
        )
    }

    pub fn unsupported_element(kind: &str) -> Self {
        Self::new(
            WarningKind::UnsupportedElement,
            format!("unsupported element '{}' skipped", kind),
        )
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let w = Warning::missing_image("rId7");
        assert_eq!(w.kind, WarningKind::MissingImage);
        assert!(w.to_string().starts_with("[missing-image]"));
        assert!(w.message.contains("rId7"));
    }

    #[test]
    fn test_warning_serializes_kind() {
        let w = Warning::cyclic_style("Loop");
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"cyclic_style\""));
    }
}
