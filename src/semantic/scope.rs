use crate::semantic::types::Ty;

/// Handle into the scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    pub ty: Ty,
}

#[derive(Debug, Clone, Default)]
struct Frame {
    parent: Option<ScopeId>,
    variables: Vec<VariableInfo>,
}

/// Tree of nested binding frames backed by an index arena. Children inherit
/// lookup from their ancestors; a definition in a child shadows one above.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn create_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.frames.len());
        self.frames.push(Frame {
            parent: Some(parent),
            variables: Vec::new(),
        });
        id
    }

    pub fn define_variable(&mut self, frame: ScopeId, name: impl Into<String>, ty: Ty) {
        self.frames[frame.0]
            .variables
            .push(VariableInfo { name: name.into(), ty });
    }

    /// Innermost binding of `name` visible from `frame`.
    pub fn find_variable(&self, frame: ScopeId, name: &str) -> Option<&VariableInfo> {
        let mut current = Some(frame);
        while let Some(id) = current {
            let f = &self.frames[id.0];
            // last definition wins within a frame
            if let Some(var) = f.variables.iter().rev().find(|v| v.name == name) {
                return Some(var);
            }
            current = f.parent;
        }
        None
    }

    pub fn is_defined(&self, frame: ScopeId, name: &str) -> bool {
        self.find_variable(frame, name).is_some()
    }

    pub fn is_defined_locally(&self, frame: ScopeId, name: &str) -> bool {
        self.frames[frame.0].variables.iter().any(|v| v.name == name)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
