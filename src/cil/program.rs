use crate::cil::instr::CilInstruction;

/// A whole program in three-address form: per-class layout tables, interned
/// string data, and a flat list of functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CilProgram {
    pub types: Vec<CilType>,
    pub data: Vec<CilData>,
    pub code: Vec<CilFunction>,
}

impl CilProgram {
    pub fn function(&self, name: &str) -> Option<&CilFunction> {
        self.code.iter().find(|f| f.name == name)
    }

    pub fn type_of(&self, name: &str) -> Option<&CilType> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Layout information for one class: attribute slots in inheritance-
/// linearized order and the dispatch table as `(method, function label)`
/// pairs. An override occupies the slot its parent introduced.
#[derive(Debug, Clone, PartialEq)]
pub struct CilType {
    pub name: String,
    pub attributes: Vec<String>,
    pub methods: Vec<(String, String)>,
}

impl CilType {
    pub fn method_slot(&self, method: &str) -> Option<usize> {
        self.methods.iter().position(|(name, _)| name == method)
    }

    pub fn attribute_slot(&self, attribute: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == attribute)
    }
}

/// A named string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct CilData {
    pub name: String,
    pub value: String,
}

/// One function: ordered parameters, ordered locals, linear instruction
/// list. Every name an instruction references must appear in `params` or
/// `locals` (checked by [`verify`]).
///
/// [`verify`]: crate::cil::verify
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CilFunction {
    pub name: String,
    pub params: Vec<String>,
    pub locals: Vec<String>,
    pub instructions: Vec<CilInstruction>,
}

impl CilFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
