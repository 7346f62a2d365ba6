use std::fmt;

/// A COOL class: its parent (by name), attributes and methods in declaration
/// order. Types reference each other by name through the [`Context`]
/// registry.
///
/// [`Context`]: crate::semantic::Context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub name: String,
    pub parent: Option<String>,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
}

impl Type {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn own_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn own_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Declared type name, kept verbatim (may be `SELF_TYPE` or a name that
    /// failed to resolve; the checker substitutes on use).
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub param_names: Vec<String>,
    pub param_types: Vec<String>,
    pub return_type: String,
}

/// An inferred type as computed by the checker.
///
/// `Error` conforms to everything in both directions so one diagnostic does
/// not cascade into its context; `Auto` behaves the same way but marks an
/// inference placeholder rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    Named(String),
    SelfType,
    Auto,
    Error,
    Void,
}

impl Ty {
    pub fn named(name: impl Into<String>) -> Self {
        Ty::Named(name.into())
    }

    /// The printable name used in diagnostic messages.
    pub fn name(&self) -> &str {
        match self {
            Ty::Named(n) => n,
            Ty::SelfType => "SELF_TYPE",
            Ty::Auto => "AUTO_TYPE",
            Ty::Error => "<error>",
            Ty::Void => "Void",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Ty::Error)
    }

    /// True for `Error` and `Auto`, the two types that silence conformance
    /// checks.
    pub fn is_permissive(&self) -> bool {
        matches!(self, Ty::Error | Ty::Auto)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
