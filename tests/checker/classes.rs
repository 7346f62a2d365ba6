use coolc::compiler::Compiler;
use coolc::diagnostics::DiagnosticKind;

use crate::common::*;

#[test]
fn override_with_different_arity_is_a_semantic_error() {
    let program = program_with_main(vec![
        class("A", None, vec![method("m", &[("x", "Int")], "Int", int(0))]),
        class(
            "B",
            Some("A"),
            vec![method("m", &[("x", "Int"), ("y", "Int")], "Int", int(0))],
        ),
    ]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    let d = diagnostics.iter().next().unwrap();
    assert_eq!(d.kind, DiagnosticKind::SemanticError);
    assert!(d.message.contains("formal parameters"), "{}", d.message);
}

#[test]
fn override_mismatches_report_separately() {
    let program = program_with_main(vec![
        class(
            "A",
            None,
            vec![method("m", &[("x", "Int")], "Int", int(0))],
        ),
        // wrong return type and wrong parameter type: two diagnostics
        class(
            "B",
            Some("A"),
            vec![method("m", &[("x", "String")], "String", string(""))],
        ),
    ]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 2, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::SemanticError));
}

#[test]
fn self_and_duplicate_formal_parameters_are_rejected() {
    let program = program_with_main(vec![class(
        "A",
        None,
        vec![method(
            "m",
            &[("self", "Int"), ("x", "Int"), ("x", "Int")],
            "Int",
            int(0),
        )],
    )]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 2, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .all(|d| d.kind == DiagnosticKind::SemanticError));
}

#[test]
fn duplicate_class_declarations_are_reported() {
    let program = program_with_main(vec![
        class("A", None, vec![]),
        class("A", None, vec![]),
    ]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .next()
        .unwrap()
        .message
        .contains("previously defined"));
}

#[test]
fn redefining_a_basic_class_is_rejected() {
    let program = program_with_main(vec![class("Int", None, vec![])]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .next()
        .unwrap()
        .message
        .contains("basic class Int"));
}

#[test]
fn inheriting_from_final_builtins_is_rejected() {
    for builtin in ["Int", "String", "Bool"] {
        let program = program_with_main(vec![class("A", Some(builtin), vec![])]);
        let diagnostics = Compiler::new().analyze(&program);
        assert_eq!(diagnostics.len(), 1, "inheriting {}", builtin);
        assert_eq!(
            diagnostics.iter().next().unwrap().kind,
            DiagnosticKind::SemanticError
        );
    }
}

#[test]
fn unknown_parent_is_reported_and_recovered() {
    let program = program_with_main(vec![class(
        "A",
        Some("Phantom"),
        // the class body is still checked after re-rooting at Object
        vec![method("f", &[], "Int", int(1))],
    )]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    let d = diagnostics.iter().next().unwrap();
    assert_eq!(d.kind, DiagnosticKind::TypeError);
    assert!(d.message.contains("undefined class Phantom"), "{}", d.message);
}

#[test]
fn inheritance_cycles_are_reported_per_class_and_do_not_hang() {
    let program = program_with_main(vec![
        class("A", Some("B"), vec![method("f", &[], "Int", int(1))]),
        class("B", Some("A"), vec![]),
    ]);
    let diagnostics = Compiler::new().analyze(&program);

    let cycle_errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.message.contains("inheritance cycle"))
        .collect();
    assert_eq!(cycle_errors.len(), 2, "{}", diagnostics);
    assert_eq!(diagnostics.len(), 2, "{}", diagnostics);
}

#[test]
fn missing_main_class_is_reported() {
    let program = program(vec![class("A", None, vec![])]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .next()
        .unwrap()
        .message
        .contains("Class Main is not defined"));
}

#[test]
fn main_must_declare_a_zero_argument_main_method() {
    let no_method = program(vec![class("Main", None, vec![])]);
    let diagnostics = Compiler::new().analyze(&no_method);
    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .next()
        .unwrap()
        .message
        .contains("must have a method main"));

    let with_args = program(vec![class(
        "Main",
        None,
        vec![method("main", &[("x", "Int")], "Int", int(0))],
    )]);
    let diagnostics = Compiler::new().analyze(&with_args);
    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .next()
        .unwrap()
        .message
        .contains("no arguments"));
}

#[test]
fn main_method_may_be_inherited() {
    let program = program(vec![
        class("Base", None, vec![method("main", &[], "Int", int(0))]),
        class("Main", Some("Base"), vec![]),
    ]);
    let diagnostics = Compiler::new().analyze(&program);
    assert!(diagnostics.is_empty(), "{}", diagnostics);
}

#[test]
fn redefining_an_inherited_attribute_is_rejected() {
    let program = program_with_main(vec![
        class("A", None, vec![attribute("x", "Int", None)]),
        class("B", Some("A"), vec![attribute("x", "Int", None)]),
    ]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .next()
        .unwrap()
        .message
        .contains("inherited class"));
}

#[test]
fn duplicate_methods_within_a_class_are_rejected() {
    let program = program_with_main(vec![class(
        "A",
        None,
        vec![
            method("f", &[], "Int", int(0)),
            method("f", &[], "Int", int(1)),
        ],
    )]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    assert!(diagnostics
        .iter()
        .next()
        .unwrap()
        .message
        .contains("multiply defined"));
}

#[test]
fn grandchildren_see_attributes_from_the_whole_chain() {
    let program = program_with_main(vec![
        class("A", None, vec![attribute("a", "Int", None)]),
        class("B", Some("A"), vec![attribute("b", "Int", None)]),
        class(
            "C",
            Some("B"),
            vec![method("sum", &[], "Int", plus(var("a"), var("b")))],
        ),
    ]);
    let diagnostics = Compiler::new().analyze(&program);
    assert!(diagnostics.is_empty(), "{}", diagnostics);
}

#[test]
fn method_body_must_conform_to_declared_return_type() {
    let program = program_with_main(vec![class(
        "A",
        None,
        vec![method("f", &[], "Int", string("nope"))],
    )]);
    let diagnostics = Compiler::new().analyze(&program);

    assert_eq!(diagnostics.len(), 1, "{}", diagnostics);
    let d = diagnostics.iter().next().unwrap();
    assert_eq!(d.kind, DiagnosticKind::TypeError);
    assert!(d.message.contains("Inferred return type"), "{}", d.message);
}
