use std::collections::{HashMap, HashSet};

use log::debug;
use thiserror::Error;

use crate::ast::{
    ArithmeticOp, Binding, CaseBranch, ClassDeclaration, ComparisonOp, Expression, ExpressionKind,
    Feature, MethodDeclaration, Program,
};
use crate::cil::instr::{CilInstruction, RuntimeErrorKind, Value};
use crate::cil::program::{CilData, CilFunction, CilProgram, CilType};
use crate::semantic::context::{Context, ContextError, BOOL, INT, IO, OBJECT, SELF_TYPE, STRING};
use crate::semantic::Ty;

pub const EMPTY_STRING: &str = "empty_str";
pub const ENTRY_FUNCTION: &str = "main";

#[derive(Debug, Error)]
pub enum CilError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("variable '{0}' is unbound during lowering")]
    UnboundVariable(String),
}

#[derive(Debug, Clone)]
struct EnvBinding {
    source_name: String,
    local: String,
    ty: Ty,
}

enum Place {
    Local(String, Ty),
    Attribute(String, Ty),
}

/// Lowers a type-checked AST into the flat CIL form.
///
/// Only runs on programs that checked clean, so lookups that fail here are
/// compiler bugs surfaced as [`CilError`], not user diagnostics.
pub struct CilBuilder<'a> {
    context: &'a Context,
    program: CilProgram,
    current: CilFunction,
    env: Vec<Vec<EnvBinding>>,
    current_class: String,
    next_temp: usize,
    next_label: usize,
    strings: HashMap<String, String>,
}

impl<'a> CilBuilder<'a> {
    pub fn build(ast: &Program, context: &'a Context) -> Result<CilProgram, CilError> {
        let mut builder = Self {
            context,
            program: CilProgram::default(),
            current: CilFunction::default(),
            env: Vec::new(),
            current_class: OBJECT.to_string(),
            next_temp: 0,
            next_label: 0,
            strings: HashMap::new(),
        };
        builder.program.data.push(CilData {
            name: EMPTY_STRING.to_string(),
            value: String::new(),
        });
        builder.strings.insert(String::new(), EMPTY_STRING.to_string());

        builder.build_types(ast);
        builder.build_entry()?;
        builder.build_builtin_inits();
        let mut seen = HashSet::new();
        for class in &ast.classes {
            if !seen.insert(class.name.name.clone()) {
                continue;
            }
            builder.build_class(class)?;
        }
        debug!(
            "cil lowering done: {} types, {} functions, {} data entries",
            builder.program.types.len(),
            builder.program.code.len(),
            builder.program.data.len()
        );
        Ok(builder.program)
    }

    /// Layout tables for every class, builtins first. The function label of
    /// a dispatch slot points at the defining class, so overrides replace
    /// the label without moving the slot.
    fn build_types(&mut self, ast: &Program) {
        let mut names: Vec<String> = [OBJECT, IO, INT, STRING, BOOL]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut seen: HashSet<String> = names.iter().cloned().collect();
        for class in &ast.classes {
            if seen.insert(class.name.name.clone()) {
                names.push(class.name.name.clone());
            }
        }
        for name in names {
            let attributes = self
                .context
                .attributes_linearized(&name)
                .into_iter()
                .map(|(_, attr)| attr.name.clone())
                .collect();
            let methods = self
                .context
                .method_table(&name)
                .into_iter()
                .map(|(method, owner)| {
                    let label = format!("{}_{}", owner, method);
                    (method, label)
                })
                .collect();
            self.program.types.push(CilType {
                name,
                attributes,
                methods,
            });
        }
    }

    /// The program entry: allocate `Main`, run its initializer, dispatch
    /// `main`.
    fn build_entry(&mut self) -> Result<(), CilError> {
        self.begin_function(ENTRY_FUNCTION, &[]);
        let instance = self.temp();
        self.emit(CilInstruction::Allocate {
            dest: instance.clone(),
            ty: "Main".to_string(),
        });
        self.emit(CilInstruction::Arg {
            name: instance.clone(),
        });
        let initialized = self.temp();
        self.emit(CilInstruction::StaticCall {
            dest: initialized,
            function: "Main_init".to_string(),
        });
        self.emit(CilInstruction::Arg {
            name: instance.clone(),
        });
        let result = self.temp();
        let main_label = self.resolve_label("Main", "main")?;
        self.emit(CilInstruction::StaticCall {
            dest: result,
            function: main_label,
        });
        self.emit(CilInstruction::Return { value: None });
        self.end_function();
        Ok(())
    }

    /// `Object` and `IO` carry no attributes; their initializers just hand
    /// back the instance. `Int`, `String` and `Bool` are unboxed and never
    /// allocated.
    fn build_builtin_inits(&mut self) {
        for class in [OBJECT, IO] {
            self.begin_function(format!("{}_init", class), &["self".to_string()]);
            self.emit(CilInstruction::Return {
                value: Some("self".to_string()),
            });
            self.end_function();
        }
    }

    fn build_class(&mut self, class: &ClassDeclaration) -> Result<(), CilError> {
        self.current_class = class.name.name.clone();
        self.build_init(class)?;
        for feature in &class.features {
            if let Feature::Method(method) = feature {
                self.build_method(class, method)?;
            }
        }
        Ok(())
    }

    /// `{T}_init(self)`: run the parent initializer, then set every own
    /// attribute to its default and run declared initializers in order.
    fn build_init(&mut self, class: &ClassDeclaration) -> Result<(), CilError> {
        let class_name = class.name.name.clone();
        self.begin_function(format!("{}_init", class_name), &["self".to_string()]);
        self.push_frame();
        self.bind("self", "self", Ty::SelfType);

        let parent = self
            .context
            .get_type(&class_name)?
            .parent
            .clone()
            .unwrap_or_else(|| OBJECT.to_string());
        self.emit(CilInstruction::Arg {
            name: "self".to_string(),
        });
        let parent_done = self.temp();
        self.emit(CilInstruction::StaticCall {
            dest: parent_done,
            function: format!("{}_init", parent),
        });

        for feature in &class.features {
            let Feature::Attribute(attr) = feature else {
                continue;
            };
            let value = match &attr.init {
                Some(init) => self.lower_expression(init)?.0,
                None => self.default_value(&attr.declared_type.name),
            };
            self.emit(CilInstruction::SetAttrib {
                instance: "self".to_string(),
                ty: class_name.clone(),
                attr: attr.name.name.clone(),
                value,
            });
        }

        self.emit(CilInstruction::Return {
            value: Some("self".to_string()),
        });
        self.pop_frame();
        self.end_function();
        Ok(())
    }

    fn build_method(
        &mut self,
        class: &ClassDeclaration,
        method: &MethodDeclaration,
    ) -> Result<(), CilError> {
        let mut params = vec!["self".to_string()];
        params.extend(method.params.iter().map(|p| p.name.name.clone()));
        self.begin_function(
            format!("{}_{}", class.name.name, method.name.name),
            &params,
        );
        self.push_frame();
        self.bind("self", "self", Ty::SelfType);
        for param in &method.params {
            let ty = self
                .context
                .resolve_declared(&param.declared_type.name, &self.current_class);
            self.bind(&param.name.name, &param.name.name, ty);
        }

        let (result, _) = self.lower_expression(&method.body)?;
        self.emit(CilInstruction::Return {
            value: Some(result),
        });
        self.pop_frame();
        self.end_function();
        Ok(())
    }

    fn lower_expression(&mut self, expr: &Expression) -> Result<(String, Ty), CilError> {
        match &expr.kind {
            ExpressionKind::Assign { target, value } => {
                let (value_local, value_ty) = self.lower_expression(value)?;
                match self.resolve_place(&target.name)? {
                    Place::Local(local, _) => {
                        self.emit(CilInstruction::Assign {
                            dest: local,
                            src: value_local.clone(),
                        });
                    }
                    Place::Attribute(attr, _) => {
                        self.emit(CilInstruction::SetAttrib {
                            instance: "self".to_string(),
                            ty: self.current_class.clone(),
                            attr,
                            value: value_local.clone(),
                        });
                    }
                }
                Ok((value_local, value_ty))
            }
            ExpressionKind::Dispatch {
                receiver,
                static_type,
                method,
                args,
            } => self.lower_dispatch(
                receiver.as_deref(),
                static_type.as_ref().map(|t| t.name.as_str()),
                &method.name,
                args,
            ),
            ExpressionKind::If {
                predicate,
                then_branch,
                else_branch,
            } => {
                let (cond, _) = self.lower_expression(predicate)?;
                let then_label = self.fresh_label("then");
                let end_label = self.fresh_label("endif");
                let result = self.temp();
                self.emit(CilInstruction::GotoIf {
                    cond,
                    label: then_label.clone(),
                });
                let (else_value, else_ty) = self.lower_expression(else_branch)?;
                self.emit(CilInstruction::Assign {
                    dest: result.clone(),
                    src: else_value,
                });
                self.emit(CilInstruction::Goto {
                    label: end_label.clone(),
                });
                self.emit(CilInstruction::Label { name: then_label });
                let (then_value, then_ty) = self.lower_expression(then_branch)?;
                self.emit(CilInstruction::Assign {
                    dest: result.clone(),
                    src: then_value,
                });
                self.emit(CilInstruction::Label { name: end_label });
                let ty = self
                    .context
                    .join(&then_ty, &else_ty, &self.current_class);
                Ok((result, ty))
            }
            ExpressionKind::While { predicate, body } => {
                let start = self.fresh_label("while");
                let body_label = self.fresh_label("loop");
                let end = self.fresh_label("pool");
                self.emit(CilInstruction::Label {
                    name: start.clone(),
                });
                let (cond, _) = self.lower_expression(predicate)?;
                self.emit(CilInstruction::GotoIf {
                    cond,
                    label: body_label.clone(),
                });
                self.emit(CilInstruction::Goto { label: end.clone() });
                self.emit(CilInstruction::Label { name: body_label });
                self.lower_expression(body)?;
                self.emit(CilInstruction::Goto { label: start });
                self.emit(CilInstruction::Label { name: end });
                let result = self.temp();
                self.emit(CilInstruction::Load {
                    dest: result.clone(),
                    value: Value::Int(0),
                });
                Ok((result, Ty::named(OBJECT)))
            }
            ExpressionKind::Block { expressions } => {
                let mut last = None;
                for e in expressions {
                    last = Some(self.lower_expression(e)?);
                }
                // the parser guarantees a block is non-empty
                last.ok_or_else(|| CilError::UnboundVariable("<empty block>".to_string()))
            }
            ExpressionKind::Let { bindings, body } => {
                self.push_frame();
                for binding in bindings {
                    self.lower_binding(binding)?;
                }
                let result = self.lower_expression(body)?;
                self.pop_frame();
                Ok(result)
            }
            ExpressionKind::Case { scrutinee, branches } => self.lower_case(scrutinee, branches),
            ExpressionKind::New { ty } => {
                let class_name = if ty.name == SELF_TYPE {
                    self.current_class.clone()
                } else {
                    ty.name.clone()
                };
                match class_name.as_str() {
                    INT | BOOL => {
                        let result = self.temp();
                        self.emit(CilInstruction::Load {
                            dest: result.clone(),
                            value: Value::Int(0),
                        });
                        Ok((result, Ty::named(class_name)))
                    }
                    STRING => {
                        let result = self.temp();
                        self.emit(CilInstruction::Load {
                            dest: result.clone(),
                            value: Value::Label(EMPTY_STRING.to_string()),
                        });
                        Ok((result, Ty::named(STRING)))
                    }
                    _ => {
                        let instance = self.temp();
                        self.emit(CilInstruction::Allocate {
                            dest: instance.clone(),
                            ty: class_name.clone(),
                        });
                        self.emit(CilInstruction::Arg {
                            name: instance.clone(),
                        });
                        let initialized = self.temp();
                        self.emit(CilInstruction::StaticCall {
                            dest: initialized,
                            function: format!("{}_init", class_name),
                        });
                        Ok((instance, Ty::named(class_name)))
                    }
                }
            }
            ExpressionKind::Isvoid { operand } => {
                let (value, _) = self.lower_expression(operand)?;
                let result = self.temp();
                let end = self.fresh_label("endvoid");
                self.emit(CilInstruction::Load {
                    dest: result.clone(),
                    value: Value::Int(0),
                });
                self.emit(CilInstruction::GotoIf {
                    cond: value,
                    label: end.clone(),
                });
                self.emit(CilInstruction::Load {
                    dest: result.clone(),
                    value: Value::Int(1),
                });
                self.emit(CilInstruction::Label { name: end });
                Ok((result, Ty::named(BOOL)))
            }
            ExpressionKind::Arithmetic { op, left, right } => {
                let (l, _) = self.lower_expression(left)?;
                let (r, _) = self.lower_expression(right)?;
                let dest = self.temp();
                let instr = match op {
                    ArithmeticOp::Add => CilInstruction::Plus {
                        dest: dest.clone(),
                        left: l,
                        right: r,
                    },
                    ArithmeticOp::Sub => CilInstruction::Minus {
                        dest: dest.clone(),
                        left: l,
                        right: r,
                    },
                    ArithmeticOp::Mul => CilInstruction::Star {
                        dest: dest.clone(),
                        left: l,
                        right: r,
                    },
                    ArithmeticOp::Div => CilInstruction::Div {
                        dest: dest.clone(),
                        left: l,
                        right: r,
                    },
                };
                self.emit(instr);
                Ok((dest, Ty::named(INT)))
            }
            ExpressionKind::Comparison { op, left, right } => {
                let (l, _) = self.lower_expression(left)?;
                let (r, _) = self.lower_expression(right)?;
                let dest = self.temp();
                let instr = match op {
                    ComparisonOp::Less => CilInstruction::Less {
                        dest: dest.clone(),
                        left: l,
                        right: r,
                    },
                    ComparisonOp::LessEq => CilInstruction::LessEq {
                        dest: dest.clone(),
                        left: l,
                        right: r,
                    },
                };
                self.emit(instr);
                Ok((dest, Ty::named(BOOL)))
            }
            ExpressionKind::Equal { left, right } => {
                let (l, _) = self.lower_expression(left)?;
                let (r, _) = self.lower_expression(right)?;
                let diff = self.temp();
                self.emit(CilInstruction::Minus {
                    dest: diff.clone(),
                    left: l,
                    right: r,
                });
                let result = self.temp();
                let end = self.fresh_label("endeq");
                self.emit(CilInstruction::Load {
                    dest: result.clone(),
                    value: Value::Int(0),
                });
                self.emit(CilInstruction::GotoIf {
                    cond: diff,
                    label: end.clone(),
                });
                self.emit(CilInstruction::Load {
                    dest: result.clone(),
                    value: Value::Int(1),
                });
                self.emit(CilInstruction::Label { name: end });
                Ok((result, Ty::named(BOOL)))
            }
            ExpressionKind::Not { operand } => {
                let (value, _) = self.lower_expression(operand)?;
                let one = self.temp();
                self.emit(CilInstruction::Load {
                    dest: one.clone(),
                    value: Value::Int(1),
                });
                let result = self.temp();
                self.emit(CilInstruction::Minus {
                    dest: result.clone(),
                    left: one,
                    right: value,
                });
                Ok((result, Ty::named(BOOL)))
            }
            ExpressionKind::Neg { operand } => {
                let (value, _) = self.lower_expression(operand)?;
                let zero = self.temp();
                self.emit(CilInstruction::Load {
                    dest: zero.clone(),
                    value: Value::Int(0),
                });
                let result = self.temp();
                self.emit(CilInstruction::Minus {
                    dest: result.clone(),
                    left: zero,
                    right: value,
                });
                Ok((result, Ty::named(INT)))
            }
            ExpressionKind::Variable { name } => match self.resolve_place(&name.name)? {
                Place::Local(local, ty) => Ok((local, ty)),
                Place::Attribute(attr, ty) => {
                    let dest = self.temp();
                    self.emit(CilInstruction::GetAttrib {
                        dest: dest.clone(),
                        instance: "self".to_string(),
                        ty: self.current_class.clone(),
                        attr,
                    });
                    Ok((dest, ty))
                }
            },
            ExpressionKind::IntLiteral { value } => {
                let dest = self.temp();
                self.emit(CilInstruction::Load {
                    dest: dest.clone(),
                    value: Value::Int(*value),
                });
                Ok((dest, Ty::named(INT)))
            }
            ExpressionKind::StringLiteral { value } => {
                let label = self.intern_string(value);
                let dest = self.temp();
                self.emit(CilInstruction::Load {
                    dest: dest.clone(),
                    value: Value::Label(label),
                });
                Ok((dest, Ty::named(STRING)))
            }
            ExpressionKind::BoolLiteral { value } => {
                let dest = self.temp();
                self.emit(CilInstruction::Load {
                    dest: dest.clone(),
                    value: Value::Int(i32::from(*value)),
                });
                Ok((dest, Ty::named(BOOL)))
            }
        }
    }

    /// Receiver and arguments are fully evaluated into temporaries before
    /// any `Arg` push, so a nested call cannot clobber the outgoing frame.
    fn lower_dispatch(
        &mut self,
        receiver: Option<&Expression>,
        static_type: Option<&str>,
        method: &str,
        args: &[Expression],
    ) -> Result<(String, Ty), CilError> {
        let (receiver_local, receiver_ty) = match receiver {
            Some(r) => self.lower_expression(r)?,
            None => ("self".to_string(), Ty::SelfType),
        };
        let receiver_class = match &receiver_ty {
            Ty::SelfType => self.current_class.clone(),
            Ty::Named(n) => n.clone(),
            _ => OBJECT.to_string(),
        };

        let mut arg_locals = Vec::with_capacity(args.len());
        for arg in args {
            arg_locals.push(self.lower_expression(arg)?.0);
        }
        self.emit(CilInstruction::Arg {
            name: receiver_local.clone(),
        });
        for local in arg_locals {
            self.emit(CilInstruction::Arg { name: local });
        }

        let dest = self.temp();
        let lookup_class = static_type.unwrap_or(&receiver_class).to_string();
        match static_type {
            Some(at) => {
                let function = self.resolve_label(at, method)?;
                self.emit(CilInstruction::StaticCall {
                    dest: dest.clone(),
                    function,
                });
            }
            // unboxed receivers have no descriptor to dispatch through
            None if [INT, STRING, BOOL].contains(&receiver_class.as_str()) => {
                let function = self.resolve_label(&receiver_class, method)?;
                self.emit(CilInstruction::StaticCall {
                    dest: dest.clone(),
                    function,
                });
            }
            None => {
                self.emit(CilInstruction::DynamicCall {
                    dest: dest.clone(),
                    instance: receiver_local.clone(),
                    ty: receiver_class.clone(),
                    method: method.to_string(),
                });
            }
        }

        let signature = self.context.lookup_method(&lookup_class, method)?;
        let ty = if signature.return_type == SELF_TYPE {
            receiver_ty
        } else {
            Ty::named(signature.return_type.clone())
        };
        Ok((dest, ty))
    }

    fn lower_binding(&mut self, binding: &Binding) -> Result<(), CilError> {
        let declared = binding.declared_type.name.clone();
        let value = match &binding.init {
            Some(init) => self.lower_expression(init)?.0,
            None => self.default_value(&declared),
        };
        let local = self.named_local(&binding.name.name);
        self.emit(CilInstruction::Assign {
            dest: local.clone(),
            src: value,
        });
        let ty = self
            .context
            .resolve_declared(&declared, &self.current_class);
        self.bind(&binding.name.name, &local, ty);
        Ok(())
    }

    /// `case` compiles to a void check, a `TypeOf`, and one descriptor
    /// comparison per branch in declaration order; falling off the end
    /// reaches the mismatch stub.
    fn lower_case(
        &mut self,
        scrutinee: &Expression,
        branches: &[CaseBranch],
    ) -> Result<(String, Ty), CilError> {
        let (value, _) = self.lower_expression(scrutinee)?;
        let not_void = self.fresh_label("case_value");
        self.emit(CilInstruction::GotoIf {
            cond: value.clone(),
            label: not_void.clone(),
        });
        self.emit(CilInstruction::RuntimeError {
            kind: RuntimeErrorKind::CaseOnVoid,
        });
        self.emit(CilInstruction::Label { name: not_void });

        let descriptor = self.temp();
        self.emit(CilInstruction::TypeOf {
            dest: descriptor.clone(),
            instance: value.clone(),
        });

        let result = self.temp();
        let end = self.fresh_label("endcase");
        let mut result_ty: Option<Ty> = None;
        for branch in branches {
            let next = self.fresh_label("branch");
            let expected = self.temp();
            self.emit(CilInstruction::Load {
                dest: expected.clone(),
                value: Value::Label(branch.declared_type.name.clone()),
            });
            let diff = self.temp();
            self.emit(CilInstruction::Minus {
                dest: diff.clone(),
                left: descriptor.clone(),
                right: expected,
            });
            self.emit(CilInstruction::GotoIf {
                cond: diff,
                label: next.clone(),
            });

            self.push_frame();
            let bound = self.named_local(&branch.name.name);
            self.emit(CilInstruction::Assign {
                dest: bound.clone(),
                src: value.clone(),
            });
            let branch_ty = self
                .context
                .resolve_declared(&branch.declared_type.name, &self.current_class);
            self.bind(&branch.name.name, &bound, branch_ty);
            let (branch_value, branch_value_ty) = self.lower_expression(&branch.body)?;
            self.pop_frame();

            self.emit(CilInstruction::Assign {
                dest: result.clone(),
                src: branch_value,
            });
            self.emit(CilInstruction::Goto { label: end.clone() });
            self.emit(CilInstruction::Label { name: next });

            result_ty = Some(match result_ty {
                None => branch_value_ty,
                Some(acc) => self
                    .context
                    .join(&acc, &branch_value_ty, &self.current_class),
            });
        }
        self.emit(CilInstruction::RuntimeError {
            kind: RuntimeErrorKind::CaseMissmatch,
        });
        self.emit(CilInstruction::Label { name: end });
        Ok((result, result_ty.unwrap_or_else(|| Ty::named(OBJECT))))
    }

    // --- plumbing ---

    fn begin_function(&mut self, name: impl Into<String>, params: &[String]) {
        self.current = CilFunction::new(name);
        self.current.params = params.to_vec();
        self.next_temp = 0;
    }

    fn end_function(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.program.code.push(finished);
    }

    fn emit(&mut self, instruction: CilInstruction) {
        self.current.instructions.push(instruction);
    }

    fn temp(&mut self) -> String {
        let name = format!("t{}", self.next_temp);
        self.next_temp += 1;
        self.current.locals.push(name.clone());
        name
    }

    fn named_local(&mut self, source: &str) -> String {
        let name = format!("{}_{}", source, self.next_temp);
        self.next_temp += 1;
        self.current.locals.push(name.clone());
        name
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let name = format!("{}_{}", prefix, self.next_label);
        self.next_label += 1;
        name
    }

    fn push_frame(&mut self) {
        self.env.push(Vec::new());
    }

    fn pop_frame(&mut self) {
        self.env.pop();
    }

    fn bind(&mut self, source_name: &str, local: &str, ty: Ty) {
        if let Some(frame) = self.env.last_mut() {
            frame.push(EnvBinding {
                source_name: source_name.to_string(),
                local: local.to_string(),
                ty,
            });
        }
    }

    /// Innermost binding wins; names bound nowhere in the frame stack fall
    /// back to attributes of the current class.
    fn resolve_place(&self, name: &str) -> Result<Place, CilError> {
        for frame in self.env.iter().rev() {
            if let Some(binding) = frame.iter().rev().find(|b| b.source_name == name) {
                return Ok(Place::Local(binding.local.clone(), binding.ty.clone()));
            }
        }
        let attr = self
            .context
            .lookup_attribute(&self.current_class, name)
            .map_err(|_| CilError::UnboundVariable(name.to_string()))?;
        let ty = if attr.ty == SELF_TYPE {
            Ty::named(&self.current_class)
        } else {
            Ty::named(attr.ty.clone())
        };
        Ok(Place::Attribute(attr.name.clone(), ty))
    }

    fn resolve_label(&self, class: &str, method: &str) -> Result<String, CilError> {
        for ancestor in self.context.ancestors(class) {
            if let Ok(ty) = self.context.get_type(ancestor) {
                if ty.own_method(method).is_some() {
                    return Ok(format!("{}_{}", ancestor, method));
                }
            }
        }
        Err(ContextError::UndefinedMethod(method.to_string(), class.to_string()).into())
    }

    fn default_value(&mut self, declared_type: &str) -> String {
        let dest = self.temp();
        let value = match declared_type {
            STRING => Value::Label(EMPTY_STRING.to_string()),
            // Int and Bool default to zero; everything else starts void
            _ => Value::Int(0),
        };
        self.emit(CilInstruction::Load { dest: dest.clone(), value });
        dest
    }

    fn intern_string(&mut self, value: &str) -> String {
        if let Some(label) = self.strings.get(value) {
            return label.clone();
        }
        let label = format!("str_{}", self.strings.len());
        self.strings.insert(value.to_string(), label.clone());
        self.program.data.push(CilData {
            name: label.clone(),
            value: value.to_string(),
        });
        label
    }
}
