use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnostics::kind::DiagnosticKind;
use crate::diagnostics::source_location::SourceLocation;

/// A compile-time diagnostic with its kind and source position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }

    pub fn name_error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::NameError, location, message)
    }

    pub fn type_error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::TypeError, location, message)
    }

    pub fn semantic_error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::SemanticError, location, message)
    }

    pub fn attribute_error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::AttributeError, location, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) - {}: {}",
            self.location.line, self.location.column, self.kind, self.message
        )
    }
}
