use super::*;
use crate::CodegenOptions;
use gpc_codegen::{ArithOp, Operand};
use gpc_frontend::TreeBuilder;
use pretty_assertions::assert_eq;

const LOCALS: [&str; 5] = ["a", "b", "c", "d", "x"];

fn context(register_count: usize) -> CodegenContext {
    let options = CodegenOptions {
        register_count,
        ..CodegenOptions::default()
    };
    let mut ctx = CodegenContext::new(options).unwrap();
    ctx.enter_scope();
    for name in LOCALS {
        ctx.frames.add_local(name).unwrap();
    }
    ctx
}

fn slot(name: &str) -> Operand {
    let index = LOCALS.iter().position(|n| *n == name).unwrap() as u32;
    Operand::frame_slot(4 * (index + 1))
}

fn reg(r: Reg) -> Operand {
    Operand::Reg(r)
}

#[test]
fn test_labels_of_balanced_product() {
    let b = TreeBuilder::new();
    let expr = b.mul(b.add(b.var("a"), b.var("b")), b.sub(b.var("c"), b.var("d")));
    let mut ctx = context(3);
    let tree = build_value_tree(&mut ctx, &expr).unwrap();

    assert_eq!(tree.label, 3);
    let NodeKind::Binary { left, right, .. } = &tree.kind else {
        panic!("expected a binary root");
    };
    assert_eq!((left.label, right.label), (2, 2));
    let NodeKind::Binary { left: a, right: b_leaf, .. } = &left.kind else {
        panic!("expected a binary left child");
    };
    assert_eq!((a.label, b_leaf.label), (1, 1));

    let dump = tree.to_string();
    assert!(dump.starts_with("[NODE MUL, L:3]\n"));
    assert!(dump.contains("    [NODE VAR d, L:1]"));
}

#[test]
fn test_root_leaf_label_zero() {
    let b = TreeBuilder::new();
    let mut ctx = context(3);
    assert_eq!(build_value_tree(&mut ctx, &b.var("a")).unwrap().label, 0);
    assert_eq!(build_value_tree(&mut ctx, &b.neg(b.int(4))).unwrap().label, 1);
    assert_eq!(
        build_value_tree(&mut ctx, &b.add(b.var("a"), b.int(1))).unwrap().label,
        2
    );
    // Unequal children keep the larger label
    let uneven = b.add(b.add(b.var("a"), b.var("b")), b.var("c"));
    assert_eq!(build_value_tree(&mut ctx, &uneven).unwrap().label, 2);
}

#[test]
fn test_leaf_operand_on_right() {
    let b = TreeBuilder::new();
    let mut ctx = context(3);
    let mut out = Vec::new();
    let r = generate_expr(&mut ctx, &b.sub(b.var("a"), b.int(7)), &mut out).unwrap();

    assert_eq!(r, Reg::Rdi);
    assert_eq!(
        out,
        vec![
            AsmInst::Movl(slot("a"), reg(Reg::Rdi)),
            AsmInst::Arith(ArithOp::Sub, Operand::Imm(7), reg(Reg::Rdi)),
        ]
    );
}

#[test]
fn test_harder_right_operand_keeps_order() {
    let b = TreeBuilder::new();
    let mut ctx = context(3);
    let mut out = Vec::new();
    let expr = b.sub(b.var("a"), b.add(b.var("b"), b.var("c")));
    let r = generate_expr(&mut ctx, &expr, &mut out).unwrap();

    assert_eq!(r, Reg::Rdi);
    assert_eq!(
        out,
        vec![
            AsmInst::Movl(slot("b"), reg(Reg::Rsi)),
            AsmInst::Arith(ArithOp::Add, slot("c"), reg(Reg::Rsi)),
            AsmInst::Movl(slot("a"), reg(Reg::Rdi)),
            AsmInst::Arith(ArithOp::Sub, reg(Reg::Rsi), reg(Reg::Rdi)),
        ]
    );
    ctx.pool.free(r).unwrap();
    assert_eq!(ctx.pool.free_order(), vec![Reg::Rdi, Reg::Rsi, Reg::Rcx]);
}

#[test]
fn test_harder_left_operand_held() {
    let b = TreeBuilder::new();
    let mut ctx = context(3);
    let mut out = Vec::new();
    let expr = b.mul(b.add(b.var("a"), b.var("b")), b.sub(b.var("c"), b.var("d")));
    let r = generate_expr(&mut ctx, &expr, &mut out).unwrap();

    assert_eq!(r, Reg::Rdi);
    assert_eq!(
        out,
        vec![
            AsmInst::Movl(slot("a"), reg(Reg::Rdi)),
            AsmInst::Arith(ArithOp::Add, slot("b"), reg(Reg::Rdi)),
            AsmInst::Movl(slot("c"), reg(Reg::Rsi)),
            AsmInst::Arith(ArithOp::Sub, slot("d"), reg(Reg::Rsi)),
            AsmInst::Arith(ArithOp::Imul, reg(Reg::Rsi), reg(Reg::Rdi)),
        ]
    );
}

#[test]
fn test_division_by_constant_uses_temporary() {
    let b = TreeBuilder::new();
    let mut ctx = context(3);
    let mut out = Vec::new();
    generate_expr(&mut ctx, &b.modulo(b.var("a"), b.int(3)), &mut out).unwrap();

    let temp = Operand::frame_slot(24);
    assert_eq!(
        out,
        vec![
            AsmInst::Movl(slot("a"), reg(Reg::Rdi)),
            AsmInst::Movl(Operand::Imm(3), temp.clone()),
            AsmInst::Movl(reg(Reg::Rdi), reg(Reg::Rax)),
            AsmInst::Cdq,
            AsmInst::Idivl(temp),
            AsmInst::Movl(reg(Reg::Rdx), reg(Reg::Rdi)),
        ]
    );
}

#[test]
fn test_too_complex_emits_nothing() {
    let b = TreeBuilder::at(8);
    let mut ctx = context(2);
    let mut out = Vec::new();
    let expr = b.mul(b.add(b.var("a"), b.var("b")), b.add(b.var("c"), b.var("d")));

    let err = generate_expr(&mut ctx, &expr, &mut out).unwrap_err();
    assert!(matches!(
        err,
        BackendError::ExpressionTooComplex { label: 3, capacity: 2, line: Some(8) }
    ));
    assert!(out.is_empty());
    assert!(ctx.pool.is_full());

    // The same tree fits three registers
    let mut ctx = context(3);
    assert!(generate_expr(&mut ctx, &expr, &mut out).is_ok());
}

#[test]
fn test_condition_leaves_pool_balanced() {
    let b = TreeBuilder::new();
    let mut ctx = context(3);
    let mut out = Vec::new();
    let cond = b.rel(RelOp::Le, b.var("a"), b.add(b.var("b"), b.int(1)));
    let op = generate_condition(&mut ctx, &cond, &mut out).unwrap();

    assert_eq!(op, RelOp::Le);
    assert_eq!(out.last(), Some(&AsmInst::Cmpl(reg(Reg::Rsi), reg(Reg::Rdi))));
    assert!(ctx.pool.is_full());
    assert_eq!(ctx.pool.free_order(), vec![Reg::Rdi, Reg::Rsi, Reg::Rcx]);
}

#[test]
fn test_call_saves_held_register() {
    let b = TreeBuilder::new();
    let mut ctx = context(3);
    let mut out = Vec::new();
    let expr = b.add(b.int(1), b.call("f", vec![b.var("x")]));
    let r = generate_expr(&mut ctx, &expr, &mut out).unwrap();

    let save = Operand::frame_slot(24);
    assert_eq!(r, Reg::Rdi);
    assert_eq!(
        out,
        vec![
            AsmInst::Movl(Operand::Imm(1), reg(Reg::Rdi)),
            AsmInst::Movl(reg(Reg::Rdi), save.clone()),
            AsmInst::Movl(slot("x"), reg(Reg::Rdi)),
            AsmInst::Movl(Operand::Imm(0), reg(Reg::Rax)),
            AsmInst::Call("f".to_string()),
            AsmInst::Movl(save, reg(Reg::Rdi)),
            AsmInst::Movl(reg(Reg::Rax), reg(Reg::Rsi)),
            AsmInst::Arith(ArithOp::Add, reg(Reg::Rsi), reg(Reg::Rdi)),
        ]
    );
}

#[test]
fn test_real_division_warns() {
    let b = TreeBuilder::at(2);
    let mut ctx = context(3);
    let mut out = Vec::new();
    let expr = b.mulop(gpc_frontend::MulOp::Slash, b.var("a"), b.var("b"));
    generate_expr(&mut ctx, &expr, &mut out).unwrap();

    assert!(out.contains(&AsmInst::Idivl(slot("b"))));
    assert_eq!(ctx.diagnostics().len(), 1);
}

#[test]
fn test_array_access_unsupported() {
    let b = TreeBuilder::at(5);
    let mut ctx = context(3);
    let mut out = Vec::new();
    let err = generate_expr(&mut ctx, &b.index("t", b.int(0)), &mut out).unwrap_err();
    assert!(matches!(err, BackendError::Unsupported { line: Some(5), .. }));
}

#[test]
fn test_condition_codes_invert() {
    for op in [RelOp::Eq, RelOp::Ne, RelOp::Lt, RelOp::Le, RelOp::Gt, RelOp::Ge] {
        assert_eq!(condition_code(op).inverse(), condition_code(op.negate()));
    }
}
