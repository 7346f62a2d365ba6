// Shared AST construction helpers. The parser is outside this crate, so
// tests assemble programs by hand; locations are dummies unless a test
// cares about them.

#![allow(dead_code)]

use coolc::ast::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ident(name: &str) -> Identifier {
    Identifier::new(name, 1, 1)
}

pub fn expr(kind: ExpressionKind) -> Expression {
    Expression::new(kind, 1, 1)
}

pub fn int(value: i32) -> Expression {
    expr(ExpressionKind::IntLiteral { value })
}

pub fn string(value: &str) -> Expression {
    expr(ExpressionKind::StringLiteral {
        value: value.to_string(),
    })
}

pub fn boolean(value: bool) -> Expression {
    expr(ExpressionKind::BoolLiteral { value })
}

pub fn var(name: &str) -> Expression {
    expr(ExpressionKind::Variable { name: ident(name) })
}

pub fn new_of(ty: &str) -> Expression {
    expr(ExpressionKind::New { ty: ident(ty) })
}

pub fn assign(target: &str, value: Expression) -> Expression {
    expr(ExpressionKind::Assign {
        target: ident(target),
        value: Box::new(value),
    })
}

pub fn arith(op: ArithmeticOp, left: Expression, right: Expression) -> Expression {
    expr(ExpressionKind::Arithmetic {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn plus(left: Expression, right: Expression) -> Expression {
    arith(ArithmeticOp::Add, left, right)
}

pub fn if_expr(predicate: Expression, then_branch: Expression, else_branch: Expression) -> Expression {
    expr(ExpressionKind::If {
        predicate: Box::new(predicate),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    })
}

pub fn while_expr(predicate: Expression, body: Expression) -> Expression {
    expr(ExpressionKind::While {
        predicate: Box::new(predicate),
        body: Box::new(body),
    })
}

pub fn block(expressions: Vec<Expression>) -> Expression {
    expr(ExpressionKind::Block { expressions })
}

pub fn let_expr(bindings: Vec<Binding>, body: Expression) -> Expression {
    expr(ExpressionKind::Let {
        bindings,
        body: Box::new(body),
    })
}

pub fn binding(name: &str, ty: &str, init: Option<Expression>) -> Binding {
    Binding {
        name: ident(name),
        declared_type: ident(ty),
        init,
    }
}

pub fn case_expr(scrutinee: Expression, branches: Vec<CaseBranch>) -> Expression {
    expr(ExpressionKind::Case {
        scrutinee: Box::new(scrutinee),
        branches,
    })
}

pub fn case_branch(name: &str, ty: &str, body: Expression) -> CaseBranch {
    CaseBranch {
        name: ident(name),
        declared_type: ident(ty),
        body,
    }
}

/// `receiver.method(args)`
pub fn dispatch(receiver: Expression, method: &str, args: Vec<Expression>) -> Expression {
    expr(ExpressionKind::Dispatch {
        receiver: Some(Box::new(receiver)),
        static_type: None,
        method: ident(method),
        args,
    })
}

/// `method(args)` on the implicit self
pub fn self_dispatch(method: &str, args: Vec<Expression>) -> Expression {
    expr(ExpressionKind::Dispatch {
        receiver: None,
        static_type: None,
        method: ident(method),
        args,
    })
}

/// `receiver@Type.method(args)`
pub fn static_dispatch(
    receiver: Expression,
    ty: &str,
    method: &str,
    args: Vec<Expression>,
) -> Expression {
    expr(ExpressionKind::Dispatch {
        receiver: Some(Box::new(receiver)),
        static_type: Some(ident(ty)),
        method: ident(method),
        args,
    })
}

pub fn method(name: &str, params: &[(&str, &str)], return_type: &str, body: Expression) -> Feature {
    Feature::Method(MethodDeclaration {
        name: ident(name),
        params: params
            .iter()
            .map(|(n, t)| FormalParam {
                name: ident(n),
                declared_type: ident(t),
            })
            .collect(),
        return_type: ident(return_type),
        body,
    })
}

pub fn attribute(name: &str, ty: &str, init: Option<Expression>) -> Feature {
    Feature::Attribute(AttributeDeclaration {
        name: ident(name),
        declared_type: ident(ty),
        init,
    })
}

pub fn class(name: &str, parent: Option<&str>, features: Vec<Feature>) -> ClassDeclaration {
    ClassDeclaration {
        name: ident(name),
        parent: parent.map(ident),
        features,
    }
}

/// `class Main { main() : Int { 0 } };`
pub fn main_class() -> ClassDeclaration {
    class("Main", None, vec![method("main", &[], "Int", int(0))])
}

pub fn program(classes: Vec<ClassDeclaration>) -> Program {
    Program { classes }
}

/// A program with the given classes plus a trivial `Main`, so tests only
/// see the diagnostics they provoke.
pub fn program_with_main(mut classes: Vec<ClassDeclaration>) -> Program {
    classes.push(main_class());
    program(classes)
}
