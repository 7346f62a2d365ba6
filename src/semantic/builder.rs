use std::collections::{HashMap, HashSet};

use log::debug;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::ast::{ClassDeclaration, Feature, Program};
use crate::diagnostics::{Diagnostic, DiagnosticCollection, SourceLocation};
use crate::semantic::context::{Context, FINAL_BUILTINS, OBJECT, SELF_TYPE};
use crate::semantic::types::{Attribute, Method};

/// Discovers every declared class and enforces inheritance-graph
/// well-formedness before the type checker runs.
///
/// Runs in three passes: collect class names, define parents and features,
/// then validate the inheritance graph (unknown parents were already
/// re-rooted; cycles are reported here). Erroneous classes are re-rooted at
/// `Object` so later stages always see a tree.
pub struct ContextBuilder {
    context: Context,
    diagnostics: DiagnosticCollection,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            context: Context::with_builtins(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    pub fn build(program: &Program) -> (Context, DiagnosticCollection) {
        let mut builder = Self::new();
        builder.collect_classes(program);
        builder.define_classes(program);
        builder.check_cycles(program);
        builder.check_inherited_attributes(program);
        builder.check_main(program);
        debug!(
            "context built: {} types, {} diagnostics",
            builder.context.type_names().len(),
            builder.diagnostics.len()
        );
        (builder.context, builder.diagnostics)
    }

    fn collect_classes(&mut self, program: &Program) {
        for class in &program.classes {
            let name = &class.name.name;
            if name == SELF_TYPE {
                self.diagnostics.add(Diagnostic::semantic_error(
                    class.name.location,
                    "SELF_TYPE cannot be the name of a class.",
                ));
                continue;
            }
            match self.context.create_type(name.clone(), Some(OBJECT)) {
                Ok(_) => {}
                Err(_) if [OBJECT, "IO", "Int", "String", "Bool"].contains(&name.as_str()) => {
                    self.diagnostics.add(Diagnostic::semantic_error(
                        class.name.location,
                        format!("Redefinition of basic class {}.", name),
                    ));
                }
                Err(_) => {
                    self.diagnostics.add(Diagnostic::semantic_error(
                        class.name.location,
                        format!("Class {} was previously defined.", name),
                    ));
                }
            }
        }
    }

    fn define_classes(&mut self, program: &Program) {
        let mut defined = HashSet::new();
        for class in &program.classes {
            let name = class.name.name.clone();
            // only the first declaration of a duplicated class defines it
            if !defined.insert(name.clone()) || !self.is_user_class(&name) {
                continue;
            }
            self.define_parent(class);
            for feature in &class.features {
                match feature {
                    Feature::Attribute(attr) => self.define_attribute(&name, class, attr),
                    Feature::Method(method) => self.define_method(&name, method),
                }
            }
        }
    }

    fn is_user_class(&self, name: &str) -> bool {
        self.context.contains(name)
            && ![OBJECT, "IO", "Int", "String", "Bool"].contains(&name)
    }

    fn define_parent(&mut self, class: &ClassDeclaration) {
        let Some(parent) = &class.parent else {
            return; // defaulted to Object at collection
        };
        let parent_name = parent.name.as_str();
        if FINAL_BUILTINS.contains(&parent_name) {
            self.diagnostics.add(Diagnostic::semantic_error(
                parent.location,
                format!("Class {} cannot inherit class {}.", class.name.name, parent_name),
            ));
            return;
        }
        if parent_name == SELF_TYPE {
            self.diagnostics.add(Diagnostic::semantic_error(
                parent.location,
                format!("Class {} cannot inherit class SELF_TYPE.", class.name.name),
            ));
            return;
        }
        if !self.context.contains(parent_name) {
            self.diagnostics.add(Diagnostic::type_error(
                parent.location,
                format!(
                    "Class {} inherits from an undefined class {}.",
                    class.name.name, parent_name
                ),
            ));
            return;
        }
        if let Ok(ty) = self.context.get_type_mut(&class.name.name) {
            ty.parent = Some(parent_name.to_string());
        }
    }

    fn define_attribute(
        &mut self,
        class_name: &str,
        class: &ClassDeclaration,
        attr: &crate::ast::AttributeDeclaration,
    ) {
        if attr.name.name == "self" {
            self.diagnostics.add(Diagnostic::semantic_error(
                attr.name.location,
                "'self' cannot be the name of an attribute.",
            ));
            return;
        }
        let declared = attr.declared_type.name.clone();
        if declared != SELF_TYPE && !self.context.contains(&declared) {
            self.diagnostics.add(Diagnostic::type_error(
                attr.declared_type.location,
                format!("Class {} of attribute {} is undefined.", declared, attr.name.name),
            ));
        }
        let Ok(ty) = self.context.get_type_mut(class_name) else {
            return;
        };
        if ty.own_attribute(&attr.name.name).is_some() {
            self.diagnostics.add(Diagnostic::semantic_error(
                attr.name.location,
                format!(
                    "Attribute {} is multiply defined in class {}.",
                    attr.name.name, class.name.name
                ),
            ));
            return;
        }
        ty.attributes.push(Attribute {
            name: attr.name.name.clone(),
            ty: declared,
        });
    }

    fn define_method(&mut self, class_name: &str, method: &crate::ast::MethodDeclaration) {
        let mut param_names = Vec::new();
        let mut param_types = Vec::new();
        for param in &method.params {
            let declared = param.declared_type.name.clone();
            if declared == SELF_TYPE {
                self.diagnostics.add(Diagnostic::semantic_error(
                    param.declared_type.location,
                    format!("Formal parameter {} cannot have type SELF_TYPE.", param.name.name),
                ));
            } else if !self.context.contains(&declared) {
                self.diagnostics.add(Diagnostic::type_error(
                    param.declared_type.location,
                    format!(
                        "Class {} of formal parameter {} is undefined.",
                        declared, param.name.name
                    ),
                ));
            }
            param_names.push(param.name.name.clone());
            param_types.push(declared);
        }

        let return_type = method.return_type.name.clone();
        if return_type != SELF_TYPE && !self.context.contains(&return_type) {
            self.diagnostics.add(Diagnostic::type_error(
                method.return_type.location,
                format!("Undefined return type {} in method {}.", return_type, method.name.name),
            ));
        }

        let Ok(ty) = self.context.get_type_mut(class_name) else {
            return;
        };
        if ty.own_method(&method.name.name).is_some() {
            self.diagnostics.add(Diagnostic::semantic_error(
                method.name.location,
                format!(
                    "Method {} is multiply defined in class {}.",
                    method.name.name, class_name
                ),
            ));
            return;
        }
        ty.methods.push(Method {
            name: method.name.name.clone(),
            param_names,
            param_types,
            return_type,
        });
    }

    /// Finds inheritance cycles among user classes and re-roots every
    /// participant at `Object` so downstream walks terminate.
    fn check_cycles(&mut self, program: &Program) {
        let names: Vec<String> = self
            .context
            .type_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let mut edges: Vec<(String, String)> = Vec::new();
        for name in &names {
            if let Ok(ty) = self.context.get_type(name) {
                if let Some(parent) = &ty.parent {
                    edges.push((name.clone(), parent.clone()));
                }
            }
        }

        let cyclic: HashSet<String> = {
            let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
            for name in &names {
                graph.add_node(name.as_str());
            }
            for (child, parent) in &edges {
                graph.add_edge(child.as_str(), parent.as_str(), ());
            }

            let mut cyclic = HashSet::new();
            for component in tarjan_scc(&graph) {
                let is_cycle = component.len() > 1
                    || (component.len() == 1 && graph.contains_edge(component[0], component[0]));
                if is_cycle {
                    cyclic.extend(component.into_iter().map(str::to_string));
                }
            }
            cyclic
        };
        if cyclic.is_empty() {
            return;
        }

        // report in declaration order
        for class in &program.classes {
            if cyclic.contains(&class.name.name) {
                self.diagnostics.add(Diagnostic::semantic_error(
                    class.name.location,
                    format!(
                        "Class {}, or an ancestor of {}, is involved in an inheritance cycle.",
                        class.name.name, class.name.name
                    ),
                ));
            }
        }
        for name in &cyclic {
            if let Ok(ty) = self.context.get_type_mut(name) {
                ty.parent = Some(OBJECT.to_string());
            }
        }
    }

    fn check_inherited_attributes(&mut self, program: &Program) {
        let mut reported = HashSet::new();
        for class in &program.classes {
            let name = &class.name.name;
            if !self.is_user_class(name) || !reported.insert(name.clone()) {
                continue;
            }
            let inherited: HashSet<String> = self
                .context
                .ancestors(name)
                .into_iter()
                .skip(1)
                .filter_map(|a| self.context.get_type(a).ok())
                .flat_map(|t| t.attributes.iter().map(|a| a.name.clone()))
                .collect();
            for feature in &class.features {
                if let Feature::Attribute(attr) = feature {
                    if inherited.contains(&attr.name.name) {
                        self.diagnostics.add(Diagnostic::semantic_error(
                            attr.name.location,
                            format!(
                                "Attribute {} is an attribute of an inherited class.",
                                attr.name.name
                            ),
                        ));
                    }
                }
            }
        }
    }

    fn check_main(&mut self, program: &Program) {
        let main_location = program
            .classes
            .iter()
            .find(|c| c.name.name == "Main")
            .map(|c| c.name.location)
            .unwrap_or(SourceLocation::new(1, 1));

        if !self.context.contains("Main") {
            self.diagnostics.add(Diagnostic::semantic_error(
                SourceLocation::new(1, 1),
                "Class Main is not defined.",
            ));
            return;
        }
        match self.context.lookup_method("Main", "main") {
            Ok(method) if !method.param_names.is_empty() => {
                self.diagnostics.add(Diagnostic::semantic_error(
                    main_location,
                    "'main' method in class Main should have no arguments.",
                ));
            }
            Ok(_) => {}
            Err(_) => {
                self.diagnostics.add(Diagnostic::semantic_error(
                    main_location,
                    "Class Main must have a method main.",
                ));
            }
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parent -> children adjacency over the declaration list, used by the
/// checker to visit classes in inheritance order. Roots are classes whose
/// parent is a built-in or could not be resolved; duplicate declarations
/// keep only their first occurrence.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    by_parent: HashMap<String, Vec<usize>>,
}

impl ClassIndex {
    /// Parent name -> indices of declarations naming it, in source order.
    pub fn from_program(program: &Program, context: &Context) -> (Self, Vec<usize>) {
        let mut index = Self::default();
        let mut roots = Vec::new();
        let mut seen = HashSet::new();
        for (i, class) in program.classes.iter().enumerate() {
            if !seen.insert(class.name.name.clone()) {
                continue;
            }
            match &class.parent {
                None => roots.push(i),
                Some(p)
                    if [OBJECT, "IO", "Int", "String", "Bool"].contains(&p.name.as_str())
                        || !context.contains(&p.name) =>
                {
                    roots.push(i)
                }
                Some(p) => index
                    .by_parent
                    .entry(p.name.clone())
                    .or_default()
                    .push(i),
            }
        }
        (index, roots)
    }

    pub fn children_of(&self, parent: &str) -> &[usize] {
        self.by_parent.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }
}
