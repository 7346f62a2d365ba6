use coolc::ast::ComparisonOp;
use coolc::cil::builder::CilBuilder;
use coolc::cil::verify::CilVerifier;
use coolc::compiler::{CompileError, Compiler};
use coolc::mips::{MipsInstruction, Register};
use coolc::semantic::ContextBuilder;

use crate::common::*;

fn hello_world() -> coolc::ast::Program {
    program(vec![class(
        "Main",
        Some("IO"),
        vec![method(
            "main",
            &[],
            "Object",
            self_dispatch("out_string", vec![string("Hello, COOL.\n")]),
        )],
    )])
}

#[test]
fn hello_world_compiles_to_assembly() {
    init_logging();
    let mips = Compiler::new().compile(&hello_world()).unwrap();
    let assembly = mips.to_string();

    assert!(assembly.starts_with(".data"));
    assert!(assembly.contains(".text"));
    assert!(assembly.contains("Main_main:"));
    assert!(assembly.contains("Hello, COOL."));
    assert!(assembly.contains("jal Main_init"));

    // the entry procedure terminates the program instead of returning
    let entry = mips.procedure("main").unwrap();
    let exit = entry
        .instructions
        .iter()
        .position(|i| matches!(i, MipsInstruction::Li { rt: Register::V0, imm: 10 }));
    assert!(exit.is_some(), "entry must exit via syscall 10");
}

#[test]
fn diagnostics_prevent_code_emission() {
    let program = program(vec![class(
        "Main",
        None,
        vec![method("main", &[], "Int", var("ghost"))],
    )]);
    match Compiler::new().compile(&program) {
        Err(CompileError::Diagnostics(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1, "{}", diagnostics)
        }
        other => panic!("expected diagnostics, got {:?}", other.map(|_| ())),
    }
}

/// One program exercising attributes, overrides, let, while, case and
/// dispatch, driven through every stage.
fn full_feature_program() -> coolc::ast::Program {
    let a = class(
        "A",
        None,
        vec![
            attribute("x", "Int", Some(int(5))),
            method("get", &[], "Int", var("x")),
            method(
                "set",
                &[("v", "Int")],
                "SELF_TYPE",
                block(vec![assign("x", var("v")), var("self")]),
            ),
        ],
    );
    let b = class(
        "B",
        Some("A"),
        vec![method("get", &[], "Int", plus(var("x"), int(1)))],
    );
    let main = class(
        "Main",
        Some("IO"),
        vec![method(
            "main",
            &[],
            "Object",
            let_expr(
                vec![
                    binding("a", "A", Some(new_of("B"))),
                    binding("i", "Int", Some(int(0))),
                ],
                block(vec![
                    while_expr(
                        expr(coolc::ast::ExpressionKind::Comparison {
                            op: ComparisonOp::Less,
                            left: Box::new(var("i")),
                            right: Box::new(int(3)),
                        }),
                        assign("i", plus(var("i"), int(1))),
                    ),
                    case_expr(
                        var("a"),
                        vec![
                            case_branch(
                                "bb",
                                "B",
                                self_dispatch("out_int", vec![dispatch(var("bb"), "get", vec![])]),
                            ),
                            case_branch("aa", "A", self_dispatch("out_int", vec![int(0)])),
                        ],
                    ),
                ]),
            ),
        )],
    );
    program(vec![a, b, main])
}

#[test]
fn lowered_cil_passes_verification() {
    let ast = full_feature_program();
    let (context, diagnostics) = ContextBuilder::build(&ast);
    assert!(diagnostics.is_empty(), "{}", diagnostics);

    let cil = CilBuilder::build(&ast, &context).unwrap();
    CilVerifier::verify_program(&cil).unwrap();

    // every class got an initializer and every method a function
    for name in ["Main_init", "A_init", "B_init", "Main_main", "A_get", "A_set", "B_get"] {
        assert!(cil.function(name).is_some(), "missing function {}", name);
    }
    // overriding get keeps the parent's slot but retargets the label
    let a = cil.type_of("A").unwrap();
    let b = cil.type_of("B").unwrap();
    let slot = a.method_slot("get").unwrap();
    assert_eq!(b.method_slot("get").unwrap(), slot);
    assert_eq!(a.methods[slot].1, "A_get");
    assert_eq!(b.methods[slot].1, "B_get");
}

#[test]
fn full_feature_program_reaches_assembly() {
    init_logging();
    let mips = Compiler::new().compile(&full_feature_program()).unwrap();
    let assembly = mips.to_string();

    // both case branches survive into the dispatch chain, and the
    // no-match path reaches the mismatch stub
    assert!(assembly.contains("la $t") && assembly.contains(", B"), "{}", assembly);
    assert!(assembly.contains("j __case_missmatch"));
    assert!(assembly.contains("B_get:"));
    assert!(assembly.contains("jal __strlen") || assembly.contains("__strlen:"));

    // division never appears, so no zero guard either
    assert!(!assembly.contains("j __division_by_zero"));
}

#[test]
fn compiling_twice_yields_identical_assembly() {
    let first = Compiler::new().compile(&full_feature_program()).unwrap();
    let second = Compiler::new().compile(&full_feature_program()).unwrap();
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn case_on_possibly_void_value_guards_at_runtime() {
    // a case over a freshly declared (void) A still compiles; the guard
    // jumps to the case_on_void stub when the scrutinee is null
    let ast = program(vec![
        class("A", None, vec![]),
        class(
            "Main",
            None,
            vec![method(
                "main",
                &[],
                "Int",
                let_expr(
                    vec![binding("a", "A", None)],
                    case_expr(var("a"), vec![case_branch("x", "A", int(1))]),
                ),
            )],
        ),
    ]);
    let mips = Compiler::new().compile(&ast).unwrap();
    let assembly = mips.to_string();
    assert!(assembly.contains("j __case_on_void"));
}
