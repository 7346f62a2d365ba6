use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::semantic::types::{Attribute, Method, Ty, Type};

pub const OBJECT: &str = "Object";
pub const IO: &str = "IO";
pub const INT: &str = "Int";
pub const STRING: &str = "String";
pub const BOOL: &str = "Bool";
pub const SELF_TYPE: &str = "SELF_TYPE";
pub const AUTO_TYPE: &str = "AUTO_TYPE";

/// The built-in classes no user class may inherit from.
pub const FINAL_BUILTINS: [&str; 3] = [INT, STRING, BOOL];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("Type \"{0}\" is not defined.")]
    UndefinedType(String),
    #[error("Type \"{0}\" is already defined.")]
    RedefinedType(String),
    #[error("Method \"{0}\" is not defined in \"{1}\".")]
    UndefinedMethod(String, String),
    #[error("Attribute \"{0}\" is not defined in \"{1}\".")]
    UndefinedAttribute(String, String),
}

/// Registry of every class in the compilation, keyed by name.
///
/// Conformance and LUB walk the `parent` links recorded here. All walks carry
/// a visited set so a not-yet-reported inheritance cycle cannot hang them.
#[derive(Debug, Clone, Default)]
pub struct Context {
    types: HashMap<String, Type>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context holding the fixed COOL hierarchy: `Object` at the root,
    /// `IO`, `Int`, `String` and `Bool` below it.
    pub fn with_builtins() -> Self {
        let mut ctx = Self::new();

        let object = ctx.create_type(OBJECT, None).expect("fresh context");
        object.methods.push(Method {
            name: "abort".into(),
            param_names: vec![],
            param_types: vec![],
            return_type: OBJECT.into(),
        });
        object.methods.push(Method {
            name: "type_name".into(),
            param_names: vec![],
            param_types: vec![],
            return_type: STRING.into(),
        });
        object.methods.push(Method {
            name: "copy".into(),
            param_names: vec![],
            param_types: vec![],
            return_type: SELF_TYPE.into(),
        });

        let io = ctx.create_type(IO, Some(OBJECT)).expect("fresh context");
        io.methods.push(Method {
            name: "out_string".into(),
            param_names: vec!["x".into()],
            param_types: vec![STRING.into()],
            return_type: SELF_TYPE.into(),
        });
        io.methods.push(Method {
            name: "out_int".into(),
            param_names: vec!["x".into()],
            param_types: vec![INT.into()],
            return_type: SELF_TYPE.into(),
        });
        io.methods.push(Method {
            name: "in_string".into(),
            param_names: vec![],
            param_types: vec![],
            return_type: STRING.into(),
        });
        io.methods.push(Method {
            name: "in_int".into(),
            param_names: vec![],
            param_types: vec![],
            return_type: INT.into(),
        });

        ctx.create_type(INT, Some(OBJECT)).expect("fresh context");

        let string = ctx.create_type(STRING, Some(OBJECT)).expect("fresh context");
        string.methods.push(Method {
            name: "length".into(),
            param_names: vec![],
            param_types: vec![],
            return_type: INT.into(),
        });
        string.methods.push(Method {
            name: "concat".into(),
            param_names: vec!["s".into()],
            param_types: vec![STRING.into()],
            return_type: STRING.into(),
        });
        string.methods.push(Method {
            name: "substr".into(),
            param_names: vec!["i".into(), "l".into()],
            param_types: vec![INT.into(), INT.into()],
            return_type: STRING.into(),
        });

        ctx.create_type(BOOL, Some(OBJECT)).expect("fresh context");

        ctx
    }

    pub fn create_type(
        &mut self,
        name: impl Into<String>,
        parent: Option<&str>,
    ) -> Result<&mut Type, ContextError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(ContextError::RedefinedType(name));
        }
        let ty = Type::new(name.clone(), parent);
        Ok(self.types.entry(name).or_insert(ty))
    }

    pub fn get_type(&self, name: &str) -> Result<&Type, ContextError> {
        self.types
            .get(name)
            .ok_or_else(|| ContextError::UndefinedType(name.to_string()))
    }

    pub fn get_type_mut(&mut self, name: &str) -> Result<&mut Type, ContextError> {
        self.types
            .get_mut(name)
            .ok_or_else(|| ContextError::UndefinedType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The chain `name, parent(name), ..` up to `Object`, cycle-guarded.
    /// Unregistered names have no chain.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.types.get(name);
        while let Some(ty) = current {
            if !seen.insert(ty.name.as_str()) {
                break;
            }
            chain.push(ty.name.as_str());
            current = ty.parent.as_deref().and_then(|p| self.types.get(p));
        }
        chain
    }

    /// Walks the parent chain looking for `method`.
    pub fn lookup_method(&self, class: &str, method: &str) -> Result<&Method, ContextError> {
        for ancestor in self.ancestors(class) {
            if let Some(ty) = self.types.get(ancestor) {
                if let Some(m) = ty.own_method(method) {
                    return Ok(m);
                }
            }
        }
        Err(ContextError::UndefinedMethod(
            method.to_string(),
            class.to_string(),
        ))
    }

    /// Walks the parent chain looking for `attribute`.
    pub fn lookup_attribute(&self, class: &str, attribute: &str) -> Result<&Attribute, ContextError> {
        for ancestor in self.ancestors(class) {
            if let Some(ty) = self.types.get(ancestor) {
                if let Some(a) = ty.own_attribute(attribute) {
                    return Ok(a);
                }
            }
        }
        Err(ContextError::UndefinedAttribute(
            attribute.to_string(),
            class.to_string(),
        ))
    }

    /// Attributes of `class` in inheritance-linearized order: the root
    /// ancestor's attributes first, the class's own last. The position in
    /// this list is the attribute's slot in the instance layout.
    pub fn attributes_linearized(&self, class: &str) -> Vec<(&str, &Attribute)> {
        let mut out = Vec::new();
        for ancestor in self.ancestors(class).into_iter().rev() {
            if let Some(ty) = self.types.get(ancestor) {
                for attr in &ty.attributes {
                    out.push((ancestor, attr));
                }
            }
        }
        out
    }

    /// The dispatch table of `class`: `(method name, defining class)` pairs.
    /// An override keeps the slot its parent introduced; new methods append
    /// in declaration order.
    pub fn method_table(&self, class: &str) -> Vec<(String, String)> {
        let mut table: Vec<(String, String)> = Vec::new();
        for ancestor in self.ancestors(class).into_iter().rev() {
            if let Some(ty) = self.types.get(ancestor) {
                for method in &ty.methods {
                    match table.iter_mut().find(|(name, _)| *name == method.name) {
                        Some(slot) => slot.1 = ancestor.to_string(),
                        None => table.push((method.name.clone(), ancestor.to_string())),
                    }
                }
            }
        }
        table
    }

    fn names_conform(&self, a: &str, b: &str) -> bool {
        a == b || self.ancestors(a).contains(&b)
    }

    /// The conformance relation. `Error` and `Auto` conform in both
    /// directions; `SELF_TYPE` inside `current` conforms as `current` does,
    /// except that `SELF_TYPE <= SELF_TYPE` is exact.
    pub fn conforms(&self, a: &Ty, b: &Ty, current: &str) -> bool {
        match (a, b) {
            (Ty::Error, _) | (_, Ty::Error) => true,
            (Ty::Auto, _) | (_, Ty::Auto) => true,
            (Ty::SelfType, Ty::SelfType) => true,
            (Ty::SelfType, Ty::Named(b)) => self.names_conform(current, b),
            (Ty::Named(_), Ty::SelfType) => false,
            (Ty::Named(a), Ty::Named(b)) => self.names_conform(a, b),
            (Ty::Void, Ty::Void) => true,
            _ => false,
        }
    }

    /// Least upper bound: the nearest common ancestor in the inheritance
    /// tree. `Error` is the identity; `Auto` absorbs.
    pub fn join(&self, a: &Ty, b: &Ty, current: &str) -> Ty {
        match (a, b) {
            (Ty::Error, other) | (other, Ty::Error) => other.clone(),
            (Ty::Auto, _) | (_, Ty::Auto) => Ty::Auto,
            (Ty::SelfType, Ty::SelfType) => Ty::SelfType,
            _ => {
                let a_name = match a {
                    Ty::SelfType => current,
                    Ty::Named(n) => n,
                    _ => return Ty::named(OBJECT),
                };
                let b_name = match b {
                    Ty::SelfType => current,
                    Ty::Named(n) => n,
                    _ => return Ty::named(OBJECT),
                };
                let a_chain: Vec<&str> = self.ancestors(a_name);
                for candidate in self.ancestors(b_name) {
                    if a_chain.contains(&candidate) {
                        return Ty::named(candidate);
                    }
                }
                Ty::named(OBJECT)
            }
        }
    }

    /// Resolves a declared type name into an inferred type: `SELF_TYPE`
    /// becomes the enclosing class, unknown names become `Error`.
    pub fn resolve_declared(&self, name: &str, current: &str) -> Ty {
        if name == SELF_TYPE {
            return Ty::named(current);
        }
        if name == AUTO_TYPE {
            return Ty::Auto;
        }
        if self.contains(name) {
            Ty::named(name)
        } else {
            Ty::Error
        }
    }

    /// Class names in the registry, sorted for deterministic iteration.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
