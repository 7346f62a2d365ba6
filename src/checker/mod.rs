//! Type checker.
//!
//! Walks the AST under a nested scope structure, inferring the type of every
//! expression and validating declarations against the class registry. On any
//! localized failure it records a diagnostic and substitutes [`Ty::Error`],
//! which conforms in both directions, so a single mistake does not cascade
//! into a wall of follow-up errors. The checker never aborts: the whole
//! program is analyzed on every run.

use std::collections::HashSet;

use log::debug;

use crate::ast::{
    AttributeDeclaration, Binding, ClassDeclaration, Expression, ExpressionKind, Feature,
    MethodDeclaration, Program,
};
use crate::diagnostics::{Diagnostic, DiagnosticCollection};
use crate::semantic::builder::ClassIndex;
use crate::semantic::context::{Context, BOOL, INT, OBJECT, SELF_TYPE, STRING};
use crate::semantic::{Scope, ScopeId, Ty};

pub struct TypeChecker<'a> {
    context: &'a Context,
    program: &'a Program,
    scope: Scope,
    diagnostics: DiagnosticCollection,
    current_class: String,
    current_method: Option<String>,
    pending: Vec<usize>,
    visited: HashSet<String>,
}

impl<'a> TypeChecker<'a> {
    /// Checks the whole program and returns the scope tree together with the
    /// accumulated diagnostics.
    pub fn check(program: &'a Program, context: &'a Context) -> (Scope, DiagnosticCollection) {
        let mut checker = Self {
            context,
            program,
            scope: Scope::new(),
            diagnostics: DiagnosticCollection::new(),
            current_class: OBJECT.to_string(),
            current_method: None,
            pending: Vec::new(),
            visited: HashSet::new(),
        };
        checker.visit_program();
        debug!("type check finished: {} diagnostics", checker.diagnostics.len());
        (checker.scope, checker.diagnostics)
    }

    /// Classes are visited in inheritance order so each child sees its
    /// parent's bindings. Classes unreachable from any root (inheritance
    /// cycles) are drained afterwards so they still get checked.
    fn visit_program(&mut self) {
        let (index, roots) = ClassIndex::from_program(self.program, self.context);

        let mut seen = HashSet::new();
        for (i, class) in self.program.classes.iter().enumerate() {
            if seen.insert(class.name.name.clone()) {
                self.pending.push(i);
            }
        }

        let root_frame = self.scope.root();
        for i in roots {
            let frame = self.scope.create_child(root_frame);
            self.visit_class(i, frame, &index);
        }
        while let Some(&i) = self.pending.first() {
            let frame = self.scope.create_child(root_frame);
            self.visit_class(i, frame, &index);
        }
    }

    fn visit_class(&mut self, class_index: usize, frame: ScopeId, index: &ClassIndex) {
        self.pending.retain(|&i| i != class_index);
        let class = &self.program.classes[class_index];
        let name = class.name.name.clone();
        self.visited.insert(name.clone());
        self.current_class = name.clone();

        self.scope.define_variable(frame, "self", Ty::SelfType);
        let ctx = self.context;
        let attributes: Vec<(String, Ty)> = ctx
            .attributes_linearized(&name)
            .into_iter()
            .map(|(_, attr)| {
                let ty = if attr.ty == SELF_TYPE {
                    Ty::SelfType
                } else {
                    ctx.resolve_declared(&attr.ty, &name)
                };
                (attr.name.clone(), ty)
            })
            .collect();
        for (attr_name, ty) in attributes {
            self.scope.define_variable(frame, attr_name, ty);
        }

        for feature in &class.features {
            match feature {
                Feature::Attribute(attr) => self.visit_attribute(attr, frame),
                Feature::Method(method) => self.visit_method(class, method, frame),
            }
        }

        for &child in index.children_of(&name) {
            let child_name = &self.program.classes[child].name.name;
            if !self.visited.contains(child_name) {
                let child_frame = self.scope.create_child(frame);
                self.visit_class(child, child_frame, index);
            }
        }
        self.current_class = name;
    }

    fn visit_attribute(&mut self, attr: &AttributeDeclaration, frame: ScopeId) {
        self.current_method = None;
        let declared = if attr.declared_type.name == SELF_TYPE {
            Ty::named(&self.current_class)
        } else {
            match self.context.get_type(&attr.declared_type.name) {
                Ok(ty) => Ty::named(&ty.name),
                // already reported by the context builder
                Err(_) => return,
            }
        };

        if let Some(init) = &attr.init {
            let init_ty = self.visit_expression(init, frame);
            if !self.conforms(&init_ty, &declared) {
                self.diagnostics.add(Diagnostic::type_error(
                    attr.name.location,
                    format!("Cannot convert \"{}\" into \"{}\".", init_ty, declared),
                ));
            }
        }
    }

    fn visit_method(&mut self, class: &ClassDeclaration, method: &MethodDeclaration, frame: ScopeId) {
        self.current_method = Some(method.name.name.clone());

        let return_ty = if method.return_type.name == SELF_TYPE {
            Ty::named(&self.current_class)
        } else {
            self.context
                .resolve_declared(&method.return_type.name, &self.current_class)
        };

        let child = self.scope.create_child(frame);
        let mut param_seen = HashSet::new();
        for param in &method.params {
            if param.name.name == "self" {
                self.diagnostics.add(Diagnostic::semantic_error(
                    param.name.location,
                    "'self' cannot be the name of a formal parameter.",
                ));
            }
            if !param_seen.insert(param.name.name.clone()) {
                self.diagnostics.add(Diagnostic::semantic_error(
                    param.name.location,
                    format!(
                        "Formal parameter '{}' multiply defined in method '{}'.",
                        param.name.name, method.name.name
                    ),
                ));
                continue;
            }
            let param_ty = self
                .context
                .resolve_declared(&param.declared_type.name, &self.current_class);
            self.scope.define_variable(child, param.name.name.clone(), param_ty);
        }

        let body_ty = self.visit_expression(&method.body, child);
        if !self.conforms(&body_ty, &return_ty) {
            self.diagnostics.add(Diagnostic::type_error(
                method.body.location,
                format!(
                    "Inferred return type '{}' of method '{}' (the type of the last expression) does not conform to declared return type '{}'.",
                    body_ty, method.name.name, return_ty
                ),
            ));
        }

        self.check_override(class, method);
        self.current_method = None;
    }

    /// A method redefining one in the parent chain must keep the exact
    /// signature: same return type, same arity, same parameter types. Each
    /// mismatch is reported separately.
    fn check_override(&mut self, class: &ClassDeclaration, method: &MethodDeclaration) {
        let ctx = self.context;
        let parent = match ctx.get_type(&class.name.name) {
            Ok(ty) => match &ty.parent {
                Some(p) => p.clone(),
                None => return,
            },
            Err(_) => return,
        };
        let Ok(parent_method) = ctx.lookup_method(&parent, &method.name.name) else {
            return; // no ancestor defines this method
        };

        if parent_method.return_type != method.return_type.name {
            self.diagnostics.add(Diagnostic::semantic_error(
                method.return_type.location,
                format!(
                    "In redefined method '{}', return type {} is different from original return type {}.",
                    method.name.name, method.return_type.name, parent_method.return_type
                ),
            ));
        }

        if parent_method.param_types.len() != method.params.len() {
            self.diagnostics.add(Diagnostic::semantic_error(
                method.name.location,
                format!(
                    "Incompatible number of formal parameters in redefined method '{}'.",
                    method.name.name
                ),
            ));
        }

        let compared = parent_method.param_types.len().min(method.params.len());
        for i in 0..compared {
            if parent_method.param_types[i] != method.params[i].declared_type.name {
                self.diagnostics.add(Diagnostic::semantic_error(
                    method.params[i].name.location,
                    format!(
                        "In redefined method '{}', type {} of parameter {} is different from original type {}.",
                        method.name.name,
                        method.params[i].declared_type.name,
                        method.params[i].name.name,
                        parent_method.param_types[i]
                    ),
                ));
            }
        }
    }

    fn visit_expression(&mut self, expr: &Expression, frame: ScopeId) -> Ty {
        match &expr.kind {
            ExpressionKind::Assign { target, value } => self.visit_assign(expr, target, value, frame),
            ExpressionKind::Dispatch {
                receiver,
                static_type,
                method,
                args,
            } => self.visit_dispatch(receiver.as_deref(), static_type.as_ref(), method, args, frame),
            ExpressionKind::If {
                predicate,
                then_branch,
                else_branch,
            } => {
                let predicate_ty = self.visit_expression(predicate, frame);
                if predicate_ty != Ty::named(BOOL) && !predicate_ty.is_permissive() {
                    self.diagnostics.add(Diagnostic::type_error(
                        predicate.location,
                        format!(
                            "Expression after 'if' must be Bool, current type is {}.",
                            predicate_ty
                        ),
                    ));
                }
                let then_ty = self.visit_expression(then_branch, frame);
                let else_ty = self.visit_expression(else_branch, frame);
                self.context.join(&then_ty, &else_ty, &self.current_class)
            }
            ExpressionKind::While { predicate, body } => {
                let predicate_ty = self.visit_expression(predicate, frame);
                if predicate_ty != Ty::named(BOOL) && !predicate_ty.is_permissive() {
                    self.diagnostics.add(Diagnostic::type_error(
                        predicate.location,
                        format!(
                            "Expression in 'while' condition must be Bool, current type is {}.",
                            predicate_ty
                        ),
                    ));
                }
                self.visit_expression(body, frame);
                Ty::named(OBJECT)
            }
            ExpressionKind::Block { expressions } => {
                let mut ty = Ty::Error;
                for e in expressions {
                    ty = self.visit_expression(e, frame);
                }
                ty
            }
            ExpressionKind::Let { bindings, body } => {
                let child = self.scope.create_child(frame);
                for binding in bindings {
                    self.visit_binding(binding, child);
                }
                self.visit_expression(body, child)
            }
            ExpressionKind::Case { scrutinee, branches } => {
                self.visit_expression(scrutinee, frame);
                let mut result: Option<Ty> = None;
                let mut seen = HashSet::new();
                for branch in branches {
                    if !seen.insert(branch.declared_type.name.clone()) {
                        self.diagnostics.add(Diagnostic::semantic_error(
                            branch.declared_type.location,
                            format!(
                                "Duplicate branch {} in case statement.",
                                branch.declared_type.name
                            ),
                        ));
                        continue;
                    }
                    let child = self.scope.create_child(frame);
                    let branch_ty = match self.context.get_type(&branch.declared_type.name) {
                        Ok(ty) => Ty::named(&ty.name),
                        Err(_) => {
                            self.diagnostics.add(Diagnostic::type_error(
                                branch.declared_type.location,
                                format!(
                                    "Type {} of case branch is undefined.",
                                    branch.declared_type.name
                                ),
                            ));
                            Ty::Error
                        }
                    };
                    self.scope
                        .define_variable(child, branch.name.name.clone(), branch_ty);
                    let body_ty = self.visit_expression(&branch.body, child);
                    result = Some(match result {
                        None => body_ty,
                        Some(acc) => self.context.join(&acc, &body_ty, &self.current_class),
                    });
                }
                result.unwrap_or(Ty::Error)
            }
            ExpressionKind::New { ty } => {
                if ty.name == SELF_TYPE {
                    return Ty::named(&self.current_class);
                }
                match self.context.get_type(&ty.name) {
                    Ok(t) => Ty::named(&t.name),
                    Err(_) => {
                        self.diagnostics.add(Diagnostic::type_error(
                            ty.location,
                            format!("Type {} of 'new' expression is not defined.", ty.name),
                        ));
                        Ty::Error
                    }
                }
            }
            ExpressionKind::Isvoid { operand } => {
                self.visit_expression(operand, frame);
                Ty::named(BOOL)
            }
            ExpressionKind::Arithmetic { left, right, .. } => {
                let left_ty = self.visit_expression(left, frame);
                let right_ty = self.visit_expression(right, frame);
                if !self.is_int_operand(&left_ty) || !self.is_int_operand(&right_ty) {
                    self.diagnostics.add(Diagnostic::type_error(
                        expr.location,
                        format!(
                            "Operation is not defined between \"{}\" and \"{}\".",
                            left_ty, right_ty
                        ),
                    ));
                }
                Ty::named(INT)
            }
            ExpressionKind::Comparison { left, right, .. } => {
                let left_ty = self.visit_expression(left, frame);
                let right_ty = self.visit_expression(right, frame);
                if !self.is_int_operand(&left_ty) || !self.is_int_operand(&right_ty) {
                    self.diagnostics.add(Diagnostic::type_error(
                        expr.location,
                        format!(
                            "Operation is not defined between \"{}\" and \"{}\".",
                            left_ty, right_ty
                        ),
                    ));
                }
                Ty::named(BOOL)
            }
            ExpressionKind::Equal { left, right } => {
                let left_ty = self.visit_expression(left, frame);
                let right_ty = self.visit_expression(right, frame);
                let primitive = |t: &Ty| {
                    matches!(t, Ty::Named(n) if n == INT || n == STRING || n == BOOL)
                };
                if (primitive(&left_ty) || primitive(&right_ty))
                    && left_ty != right_ty
                    && !left_ty.is_permissive()
                    && !right_ty.is_permissive()
                {
                    self.diagnostics.add(Diagnostic::type_error(
                        expr.location,
                        format!(
                            "One of the expressions of '=' operator is of type Int, String or Bool, the other must have the same static type. Left type: {}. Right type: {}.",
                            left_ty, right_ty
                        ),
                    ));
                }
                Ty::named(BOOL)
            }
            ExpressionKind::Not { operand } => {
                let ty = self.visit_expression(operand, frame);
                if ty != Ty::named(BOOL) && !ty.is_permissive() {
                    self.diagnostics.add(Diagnostic::type_error(
                        operand.location,
                        format!("Expression after 'not' must be Bool, current is {}.", ty),
                    ));
                }
                Ty::named(BOOL)
            }
            ExpressionKind::Neg { operand } => {
                let ty = self.visit_expression(operand, frame);
                if ty != Ty::named(INT) && !ty.is_permissive() {
                    self.diagnostics.add(Diagnostic::type_error(
                        operand.location,
                        format!("Expression after '~' must be Int, current is {}.", ty),
                    ));
                }
                Ty::named(INT)
            }
            ExpressionKind::Variable { name } => match self.scope.find_variable(frame, &name.name) {
                Some(var) => var.ty.clone(),
                None => {
                    let enclosing = self.enclosing_name();
                    self.diagnostics.add(Diagnostic::name_error(
                        name.location,
                        format!("Variable \"{}\" is not defined in \"{}\".", name.name, enclosing),
                    ));
                    Ty::Error
                }
            },
            ExpressionKind::IntLiteral { .. } => Ty::named(INT),
            ExpressionKind::StringLiteral { .. } => Ty::named(STRING),
            ExpressionKind::BoolLiteral { .. } => Ty::named(BOOL),
        }
    }

    fn visit_assign(
        &mut self,
        expr: &Expression,
        target: &crate::ast::Identifier,
        value: &Expression,
        frame: ScopeId,
    ) -> Ty {
        if target.name == "self" {
            self.diagnostics.add(Diagnostic::semantic_error(
                expr.location,
                "Cannot assign to 'self'. Variable \"self\" is read-only.",
            ));
            let value_ty = self.visit_expression(value, frame);
            return value_ty;
        }
        let target_ty = match self.scope.find_variable(frame, &target.name) {
            Some(var) => var.ty.clone(),
            None => {
                let enclosing = self.enclosing_name();
                self.diagnostics.add(Diagnostic::name_error(
                    target.location,
                    format!(
                        "Variable \"{}\" is not defined in \"{}\".",
                        target.name, enclosing
                    ),
                ));
                Ty::Error
            }
        };
        let value_ty = self.visit_expression(value, frame);
        if !self.conforms(&value_ty, &target_ty) {
            self.diagnostics.add(Diagnostic::type_error(
                expr.location,
                format!(
                    "Inferred type {} of assigned expression does not conform to type {} of variable '{}'.",
                    value_ty, target_ty, target.name
                ),
            ));
        }
        value_ty
    }

    fn visit_dispatch(
        &mut self,
        receiver: Option<&Expression>,
        static_type: Option<&crate::ast::Identifier>,
        method: &crate::ast::Identifier,
        args: &[Expression],
        frame: ScopeId,
    ) -> Ty {
        let receiver_ty = match receiver {
            Some(r) => self.visit_expression(r, frame),
            None => Ty::SelfType,
        };
        if receiver_ty.is_permissive() {
            // an unresolved receiver already produced its diagnostic
            for arg in args {
                self.visit_expression(arg, frame);
            }
            return receiver_ty;
        }

        let receiver_class = match &receiver_ty {
            Ty::SelfType => self.current_class.clone(),
            Ty::Named(n) => n.clone(),
            _ => {
                for arg in args {
                    self.visit_expression(arg, frame);
                }
                return Ty::Error;
            }
        };

        let ctx = self.context;
        let lookup = match static_type {
            Some(at) => match ctx.get_type(&at.name) {
                Ok(at_ty) => {
                    if !self.conforms(&receiver_ty, &Ty::named(&at_ty.name)) {
                        self.diagnostics.add(Diagnostic::type_error(
                            at.location,
                            format!(
                                "Expression type {} does not conform to declared static dispatch type {}.",
                                receiver_ty, at.name
                            ),
                        ));
                        for arg in args {
                            self.visit_expression(arg, frame);
                        }
                        return Ty::Error;
                    }
                    ctx.lookup_method(&at.name, &method.name)
                }
                Err(err) => Err(err),
            },
            None => ctx.lookup_method(&receiver_class, &method.name),
        };
        let found = match lookup {
            Ok(m) => m,
            Err(err) => {
                self.diagnostics
                    .add(Diagnostic::attribute_error(method.location, err.to_string()));
                for arg in args {
                    self.visit_expression(arg, frame);
                }
                return Ty::Error;
            }
        };

        if found.param_types.len() != args.len() {
            self.diagnostics.add(Diagnostic::semantic_error(
                method.location,
                format!(
                    "There is no definition of {} that takes {} arguments.",
                    method.name,
                    args.len()
                ),
            ));
        }

        let param_types = found.param_types.clone();
        let return_type = found.return_type.clone();
        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.visit_expression(arg, frame);
            let Some(param_type) = param_types.get(i) else {
                continue;
            };
            let param_ty = ctx.resolve_declared(param_type, &self.current_class);
            if !self.conforms(&arg_ty, &param_ty) {
                self.diagnostics.add(Diagnostic::type_error(
                    arg.location,
                    format!(
                        "In call of method {} parameter of type {} does not conform to declared type {}.",
                        method.name, arg_ty, param_ty
                    ),
                ));
            }
        }
        if return_type == SELF_TYPE {
            receiver_ty
        } else {
            ctx.resolve_declared(&return_type, &self.current_class)
        }
    }

    fn visit_binding(&mut self, binding: &Binding, frame: ScopeId) {
        if binding.name.name == "self" {
            self.diagnostics.add(Diagnostic::semantic_error(
                binding.name.location,
                "'self' cannot be bound in a 'let' expression. Variable \"self\" is read-only.",
            ));
        }
        let declared = if binding.declared_type.name == SELF_TYPE {
            Ty::named(&self.current_class)
        } else {
            match self.context.get_type(&binding.declared_type.name) {
                Ok(ty) => Ty::named(&ty.name),
                Err(err) => {
                    self.diagnostics
                        .add(Diagnostic::type_error(binding.declared_type.location, err.to_string()));
                    Ty::Error
                }
            }
        };

        if let Some(init) = &binding.init {
            let init_ty = self.visit_expression(init, frame);
            if !self.conforms(&init_ty, &declared) {
                self.diagnostics.add(Diagnostic::type_error(
                    init.location,
                    format!("Cannot convert \"{}\" into \"{}\".", init_ty, declared),
                ));
            }
        }
        if binding.name.name != "self" {
            self.scope
                .define_variable(frame, binding.name.name.clone(), declared);
        }
    }

    fn conforms(&self, a: &Ty, b: &Ty) -> bool {
        self.context.conforms(a, b, &self.current_class)
    }

    fn is_int_operand(&self, ty: &Ty) -> bool {
        *ty == Ty::named(INT) || ty.is_permissive()
    }

    fn enclosing_name(&self) -> String {
        self.current_method
            .clone()
            .unwrap_or_else(|| self.current_class.clone())
    }
}
