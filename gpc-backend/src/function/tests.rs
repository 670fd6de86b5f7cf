use super::*;
use crate::CodegenOptions;
use gpc_codegen::Reg;
use gpc_common::Severity;
use gpc_frontend::TreeBuilder;
use pretty_assertions::assert_eq;

fn context() -> CodegenContext {
    CodegenContext::new(CodegenOptions::default()).unwrap()
}

#[test]
fn test_program_locals_and_frame() {
    let b = TreeBuilder::new();
    let program = b.program(
        "p",
        vec![b.int_vars(&["x", "y"])],
        vec![],
        b.block(vec![b.assign("x", b.int(1)), b.assign("y", b.var("x"))]),
    );

    let mut ctx = context();
    let functions = generate_functions(&mut ctx, &program).unwrap();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name, "p");
    // 8 bytes of locals + 16 reserved
    assert_eq!(functions[0].frame_size, 32);
    assert_eq!(
        functions[0].body,
        vec![
            AsmInst::Movl(Operand::Imm(1), Operand::Reg(Reg::Rdi)),
            AsmInst::Movl(Operand::Reg(Reg::Rdi), Operand::frame_slot(4)),
            AsmInst::Movl(Operand::frame_slot(4), Operand::Reg(Reg::Rdi)),
            AsmInst::Movl(Operand::Reg(Reg::Rdi), Operand::frame_slot(8)),
        ]
    );
    assert!(ctx.finish().is_ok());
}

#[test]
fn test_function_stores_params_and_returns_its_name() {
    let b = TreeBuilder::new();
    let add = b.function(
        "add",
        vec![b.int_vars(&["a", "b"])],
        vec![],
        b.assign("add", b.add(b.var("a"), b.var("b"))),
    );
    let program = b.program("p", vec![], vec![add], b.block(vec![]));

    let mut ctx = context();
    let functions = generate_functions(&mut ctx, &program).unwrap();
    let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["add", "p"]);

    let body = &functions[0].body;
    assert_eq!(body[0], AsmInst::Movl(Operand::Reg(Reg::Rdi), Operand::frame_slot(4)));
    assert_eq!(body[1], AsmInst::Movl(Operand::Reg(Reg::Rsi), Operand::frame_slot(8)));
    assert_eq!(
        body.last(),
        Some(&AsmInst::Movl(Operand::frame_slot(12), Operand::Reg(Reg::Rax)))
    );
    assert_eq!(functions[0].frame_size, 32);
    assert_eq!(functions[1].frame_size, 16);
}

#[test]
fn test_nested_subprograms_come_first() {
    let b = TreeBuilder::new();
    let mut outer = b.procedure("outer", vec![], vec![], b.proc_call("inner", vec![]));
    outer.subprograms.push(b.procedure("inner", vec![], vec![], b.block(vec![])));
    let program = b.program("p", vec![], vec![outer], b.proc_call("outer", vec![]));

    let mut ctx = context();
    let functions = generate_functions(&mut ctx, &program).unwrap();
    let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer", "p"]);
    assert_eq!(ctx.frames.depth(), 0);
}

#[test]
fn test_real_declarations_warn() {
    let b = TreeBuilder::at(3);
    let program = b.program(
        "p",
        vec![b.vars(&["r"], VarType::Real)],
        vec![],
        b.assign("r", b.real(2.5)),
    );

    let mut ctx = context();
    let functions = generate_functions(&mut ctx, &program).unwrap();
    assert_eq!(
        functions[0].body[0],
        AsmInst::Movl(Operand::Imm(2), Operand::Reg(Reg::Rdi))
    );

    let reporter = ctx.finish().unwrap();
    let diagnostics = reporter.diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
    assert!(diagnostics[0].message.contains("REAL types not supported"));
}

#[test]
fn test_arrays_are_skipped_then_rejected_on_use() {
    let b = TreeBuilder::at(6);
    let program = b.program(
        "p",
        vec![b.array(&["t"], VarType::Integer, 1, 10), b.int_vars(&["x"])],
        vec![],
        b.assign("x", b.var("t")),
    );

    let mut ctx = context();
    let err = generate_functions(&mut ctx, &program).unwrap_err();
    assert!(matches!(err, BackendError::Unsupported { .. }));
    assert_eq!(ctx.frames.depth(), 0);
    assert_eq!(ctx.diagnostics().len(), 1);
}

#[test]
fn test_five_params_rejected() {
    let b = TreeBuilder::new();
    let f = b.procedure("f", vec![b.int_vars(&["a", "b", "c", "d", "e"])], vec![], b.block(vec![]));
    let program = b.program("p", vec![], vec![f], b.block(vec![]));

    let mut ctx = context();
    let err = generate_functions(&mut ctx, &program).unwrap_err();
    assert!(matches!(
        err,
        BackendError::TooManyArguments { count: 5, max: 4, .. }
    ));
}

#[test]
fn test_outer_variable_is_non_local() {
    let b = TreeBuilder::new();
    let inner = b.procedure("show", vec![], vec![], b.write(vec![b.var("x")]));
    let program = b.program("p", vec![b.int_vars(&["x"])], vec![inner], b.block(vec![]));

    let mut ctx = context();
    let err = generate_functions(&mut ctx, &program).unwrap_err();
    assert!(err.to_string().contains("non-local access to x"));
}
