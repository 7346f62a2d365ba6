use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic kinds, matching the COOL error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Reference to an unbound identifier
    NameError,
    /// A type does not conform, or a required primitive type is violated
    TypeError,
    /// Structural rules: assigning to self, duplicate formals, duplicate
    /// case branches, override signature mismatches
    SemanticError,
    /// Method or attribute not found on a receiver type
    AttributeError,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::NameError => write!(f, "NameError"),
            DiagnosticKind::TypeError => write!(f, "TypeError"),
            DiagnosticKind::SemanticError => write!(f, "SemanticError"),
            DiagnosticKind::AttributeError => write!(f, "AttributeError"),
        }
    }
}
