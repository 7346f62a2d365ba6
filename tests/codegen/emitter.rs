use coolc::cil::{CilFunction, CilInstruction, CilProgram, CilType, Value};
use coolc::mips::{DataDirective, MipsEmitter, MipsInstruction, MipsProcedure, Register};

/// Net `$sp` movement across a procedure. A balanced procedure with `n`
/// incoming arguments nets `+4n`: the callee pops what its caller pushed.
fn sp_delta(procedure: &MipsProcedure) -> i32 {
    procedure
        .instructions
        .iter()
        .map(|i| match i {
            MipsInstruction::Addi {
                rt: Register::Sp,
                rs: Register::Sp,
                imm,
            } => *imm,
            _ => 0,
        })
        .sum()
}

fn position_of(procedure: &MipsProcedure, wanted: &MipsInstruction) -> Option<usize> {
    procedure.instructions.iter().position(|i| i == wanted)
}

/// One function allocating an `A` with two Int attributes and returning the
/// second one.
fn allocate_fixture() -> CilProgram {
    let mut program = CilProgram::default();
    program.types.push(CilType {
        name: "A".to_string(),
        attributes: vec!["first".to_string(), "second".to_string()],
        methods: vec![],
    });
    let mut f = CilFunction::new("get_second");
    f.locals = vec!["t0".to_string(), "t1".to_string()];
    f.instructions = vec![
        CilInstruction::Allocate {
            dest: "t0".to_string(),
            ty: "A".to_string(),
        },
        CilInstruction::GetAttrib {
            dest: "t1".to_string(),
            instance: "t0".to_string(),
            ty: "A".to_string(),
            attr: "second".to_string(),
        },
        CilInstruction::Return {
            value: Some("t1".to_string()),
        },
    ];
    program.code.push(f);
    program
}

#[test]
fn allocation_reserves_header_plus_attribute_slots() {
    let mips = MipsEmitter::emit(&allocate_fixture()).unwrap();
    let procedure = mips.procedure("get_second").unwrap();

    // sbrk of 4 * (2 attributes + 1 descriptor slot)
    assert!(position_of(
        procedure,
        &MipsInstruction::Li {
            rt: Register::V0,
            imm: 9
        }
    )
    .is_some());
    assert!(position_of(
        procedure,
        &MipsInstruction::Li {
            rt: Register::A0,
            imm: 12
        }
    )
    .is_some());

    // the descriptor pointer lands at offset 0 of the fresh block
    assert!(position_of(
        procedure,
        &MipsInstruction::Sw {
            rt: Register::T0,
            offset: 0,
            rs: Register::V0
        }
    )
    .is_some());

    // the second attribute reads from offset 8
    assert!(position_of(
        procedure,
        &MipsInstruction::Lw {
            rt: Register::T1,
            offset: 8,
            rs: Register::T0
        }
    )
    .is_some());
}

#[test]
fn procedures_restore_the_stack_pointer() {
    let mips = MipsEmitter::emit(&allocate_fixture()).unwrap();
    let procedure = mips.procedure("get_second").unwrap();

    assert_eq!(sp_delta(procedure), 0);
    assert_eq!(
        procedure.instructions.last(),
        Some(&MipsInstruction::Jr { rs: Register::Ra })
    );
}

#[test]
fn division_is_guarded_against_zero() {
    let mut program = CilProgram::default();
    let mut f = CilFunction::new("quotient");
    f.locals = vec!["a".to_string(), "b".to_string(), "q".to_string()];
    f.instructions = vec![
        CilInstruction::Load {
            dest: "a".to_string(),
            value: Value::Int(6),
        },
        CilInstruction::Load {
            dest: "b".to_string(),
            value: Value::Int(3),
        },
        CilInstruction::Div {
            dest: "q".to_string(),
            left: "a".to_string(),
            right: "b".to_string(),
        },
        CilInstruction::Return {
            value: Some("q".to_string()),
        },
    ];
    program.code.push(f);

    let mips = MipsEmitter::emit(&program).unwrap();
    let procedure = mips.procedure("quotient").unwrap();

    let guard = position_of(
        procedure,
        &MipsInstruction::Beq {
            rs: Register::T1,
            rt: Register::Zero,
            label: "__division_by_zero".to_string(),
        },
    )
    .expect("zero guard emitted");
    let div = position_of(
        procedure,
        &MipsInstruction::Div {
            rd: Register::T2,
            rs: Register::T0,
            rt: Register::T1,
        },
    )
    .expect("div emitted");
    assert!(guard < div, "guard must run before the division");
}

#[test]
fn dynamic_dispatch_goes_through_the_virtual_table() {
    let mut program = CilProgram::default();
    program.types.push(CilType {
        name: "A".to_string(),
        attributes: vec![],
        methods: vec![("f".to_string(), "A_f".to_string())],
    });
    let mut caller = CilFunction::new("caller");
    caller.locals = vec!["obj".to_string(), "res".to_string()];
    caller.instructions = vec![
        CilInstruction::Allocate {
            dest: "obj".to_string(),
            ty: "A".to_string(),
        },
        CilInstruction::Arg {
            name: "obj".to_string(),
        },
        CilInstruction::DynamicCall {
            dest: "res".to_string(),
            instance: "obj".to_string(),
            ty: "A".to_string(),
            method: "f".to_string(),
        },
        CilInstruction::Return {
            value: Some("res".to_string()),
        },
    ];
    program.code.push(caller);
    let mut callee = CilFunction::new("A_f");
    callee.params = vec!["self".to_string()];
    callee.instructions = vec![CilInstruction::Return {
        value: Some("self".to_string()),
    }];
    program.code.push(callee);

    let mips = MipsEmitter::emit(&program).unwrap();
    let caller = mips.procedure("caller").unwrap();

    // null receiver aborts through the stub
    assert!(position_of(
        caller,
        &MipsInstruction::Beq {
            rs: Register::T0,
            rt: Register::Zero,
            label: "__dispatch_on_void".to_string(),
        }
    )
    .is_some());
    // slot 0 sits right after the name and size words of the descriptor
    assert!(position_of(
        caller,
        &MipsInstruction::Lw {
            rt: Register::T2,
            offset: 8,
            rs: Register::T1
        }
    )
    .is_some());
    assert!(position_of(caller, &MipsInstruction::Jalr { rs: Register::T2 }).is_some());

    // the callee pops its single incoming argument
    let callee = mips.procedure("A_f").unwrap();
    assert_eq!(sp_delta(callee), 4);
}

#[test]
fn descriptors_carry_name_size_and_method_labels() {
    let mut program = CilProgram::default();
    program.types.push(CilType {
        name: "A".to_string(),
        attributes: vec!["x".to_string()],
        methods: vec![
            ("f".to_string(), "A_f".to_string()),
            ("g".to_string(), "A_g".to_string()),
        ],
    });
    let mips = MipsEmitter::emit(&program).unwrap();

    let descriptor = mips.datum("A").unwrap();
    assert_eq!(descriptor.directive, DataDirective::Word);
    assert_eq!(descriptor.values, vec!["A_cname", "8", "A_f", "A_g"]);

    let cname = mips.datum("A_cname").unwrap();
    assert_eq!(cname.directive, DataDirective::Asciiz);
    assert_eq!(cname.values, vec!["\"A\""]);
}

#[test]
fn runtime_messages_and_stubs_are_always_present() {
    let mips = MipsEmitter::emit(&CilProgram::default()).unwrap();

    for label in [
        "abort_signal",
        "case_missmatch",
        "case_on_void",
        "dispatch_on_void",
        "division_by_zero",
        "substr_out_of_range",
        "heap_overflow",
    ] {
        assert!(mips.datum(label).is_some(), "message {}", label);
        assert!(
            mips.procedure(&format!("__{}", label)).is_some(),
            "stub {}",
            label
        );
    }
    assert_eq!(
        mips.datum("division_by_zero").unwrap().values,
        vec!["\"Division by zero\""]
    );
}

#[test]
fn builtin_procedures_follow_the_frame_discipline() {
    let mips = MipsEmitter::emit(&CilProgram::default()).unwrap();

    for (label, params) in [
        ("Object_type_name", 1),
        ("Object_copy", 1),
        ("IO_out_string", 2),
        ("IO_out_int", 2),
        ("IO_in_string", 1),
        ("IO_in_int", 1),
        ("String_length", 1),
        ("String_concat", 2),
        ("String_substr", 3),
    ] {
        let procedure = mips
            .procedure(label)
            .unwrap_or_else(|| panic!("missing builtin {}", label));
        assert_eq!(sp_delta(procedure), 4 * params, "{}", label);
        assert_eq!(
            procedure.instructions.last(),
            Some(&MipsInstruction::Jr { rs: Register::Ra }),
            "{}",
            label
        );
    }

    // raw helpers exist for the builtins that loop
    assert!(mips.procedure("__strlen").is_some());
    assert!(mips.procedure("__copy_words").is_some());
}

#[test]
fn copy_lowering_calls_the_word_copy_helper() {
    let mut program = CilProgram::default();
    program.types.push(CilType {
        name: "A".to_string(),
        attributes: vec![],
        methods: vec![],
    });
    let mut f = CilFunction::new("duplicate");
    f.locals = vec!["p".to_string(), "d".to_string(), "n".to_string(), "c".to_string()];
    f.instructions = vec![
        CilInstruction::Allocate {
            dest: "p".to_string(),
            ty: "A".to_string(),
        },
        CilInstruction::TypeOf {
            dest: "d".to_string(),
            instance: "p".to_string(),
        },
        CilInstruction::TypeName {
            dest: "n".to_string(),
            instance: "d".to_string(),
        },
        CilInstruction::Copy {
            dest: "c".to_string(),
            src: "p".to_string(),
        },
        CilInstruction::Return {
            value: Some("c".to_string()),
        },
    ];
    program.code.push(f);

    let mips = MipsEmitter::emit(&program).unwrap();
    let procedure = mips.procedure("duplicate").unwrap();
    assert!(position_of(
        procedure,
        &MipsInstruction::Jal {
            label: "__copy_words".to_string()
        }
    )
    .is_some());
}

#[test]
fn instructions_render_in_canonical_syntax() {
    insta::assert_snapshot!(
        MipsInstruction::Lw {
            rt: Register::T0,
            offset: 4,
            rs: Register::Fp
        }
        .to_string(),
        @"lw $t0, 4($fp)"
    );
    insta::assert_snapshot!(
        MipsInstruction::Addi {
            rt: Register::Sp,
            rs: Register::Sp,
            imm: -8
        }
        .to_string(),
        @"addi $sp, $sp, -8"
    );
}

#[test]
fn emitting_with_an_undeclared_name_is_an_error() {
    let mut program = CilProgram::default();
    let mut f = CilFunction::new("broken");
    f.instructions = vec![CilInstruction::Return {
        value: Some("ghost".to_string()),
    }];
    program.code.push(f);

    // "broken" is not the entry function, so the return operand is loaded
    let err = MipsEmitter::emit(&program).unwrap_err();
    assert!(matches!(err, coolc::mips::EmitError::UnknownName(..)));
}
