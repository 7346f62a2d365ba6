//! COOL abstract syntax tree.
//!
//! The parser (outside this crate) produces these nodes; the semantic stages
//! read them immutably. Every identifier carries the location of its token so
//! diagnostics can point back into the source.

use crate::diagnostics::SourceLocation;

/// A named occurrence in the source together with its token location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub location: SourceLocation,
}

impl Identifier {
    pub fn new(name: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            name: name.into(),
            location: SourceLocation::new(line, column),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub classes: Vec<ClassDeclaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: Identifier,
    pub parent: Option<Identifier>,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Attribute(AttributeDeclaration),
    Method(MethodDeclaration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDeclaration {
    pub name: Identifier,
    pub declared_type: Identifier,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub name: Identifier,
    pub params: Vec<FormalParam>,
    pub return_type: Identifier,
    pub body: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormalParam {
    pub name: Identifier,
    pub declared_type: Identifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Less,
    LessEq,
}

/// One `name : Type [<- init]` binding inside a `let`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Identifier,
    pub declared_type: Identifier,
    pub init: Option<Expression>,
}

/// One `name : Type => body` arm of a `case`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub name: Identifier,
    pub declared_type: Identifier,
    pub body: Expression,
}

/// An expression node: the variant payload plus the location of the token
/// that introduced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: SourceLocation,
}

impl Expression {
    pub fn new(kind: ExpressionKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            location: SourceLocation::new(line, column),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// `target <- value`
    Assign {
        target: Identifier,
        value: Box<Expression>,
    },
    /// The three dispatch forms: `receiver` is `None` for implicit self,
    /// `static_type` is `Some` for the `expr@Type.method(...)` form.
    Dispatch {
        receiver: Option<Box<Expression>>,
        static_type: Option<Identifier>,
        method: Identifier,
        args: Vec<Expression>,
    },
    If {
        predicate: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
    While {
        predicate: Box<Expression>,
        body: Box<Expression>,
    },
    Block {
        expressions: Vec<Expression>,
    },
    Let {
        bindings: Vec<Binding>,
        body: Box<Expression>,
    },
    Case {
        scrutinee: Box<Expression>,
        branches: Vec<CaseBranch>,
    },
    New {
        ty: Identifier,
    },
    Isvoid {
        operand: Box<Expression>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Comparison {
        op: ComparisonOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Equal {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not {
        operand: Box<Expression>,
    },
    Neg {
        operand: Box<Expression>,
    },
    Variable {
        name: Identifier,
    },
    IntLiteral {
        value: i32,
    },
    StringLiteral {
        value: String,
    },
    BoolLiteral {
        value: bool,
    },
}
