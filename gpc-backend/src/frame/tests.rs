// Tests for the stack frame manager
use super::*;
use crate::error::BackendError;
use gpc_codegen::Operand;
use pretty_assertions::assert_eq;

fn manager_with_scope() -> StackFrameManager {
    let mut frames = StackFrameManager::new();
    frames.push_scope();
    frames
}

#[test]
fn test_offsets_accumulate_across_regions() {
    let mut frames = manager_with_scope();

    let a = frames.add_argument("a").unwrap();
    let x = frames.add_local("x").unwrap();
    let y = frames.add_local("y").unwrap();
    let t = frames.add_temporary("$t").unwrap();

    assert_eq!((a.offset, x.offset, y.offset, t.offset), (4, 8, 12, 16));
    assert_eq!(a.region, Region::Argument);
    assert_eq!(t.operand(), Operand::frame_slot(16));
    assert_eq!(frames.needed_space().unwrap(), 16);
}

#[test]
fn test_find_searches_current_scope() {
    let mut frames = manager_with_scope();
    frames.add_argument("n").unwrap();
    frames.add_local("n_copy").unwrap();
    frames.add_temporary("$div_const").unwrap();

    assert_eq!(frames.find("n").unwrap().region, Region::Argument);
    assert_eq!(frames.find("n_copy").unwrap().region, Region::Local);
    assert_eq!(frames.find("$div_const").unwrap().region, Region::Temporary);
    assert!(frames.find("missing").is_none());
}

#[test]
fn test_frame_alignment() {
    for count in [1, 2, 3, 5] {
        let mut frames = manager_with_scope();
        for i in 0..count {
            frames.add_local(&format!("v{}", i)).unwrap();
        }
        let size = frames.total_frame_size().unwrap();
        assert_eq!(size % 16, 0, "{} slots gave {}", count, size);
        assert!(size >= count * DOUBLEWORD + 16);
    }
}

#[test]
fn test_empty_scope_frame_size() {
    let frames = manager_with_scope();
    assert_eq!(frames.total_frame_size().unwrap(), 16);
}

#[test]
fn test_scope_isolation() {
    let mut frames = manager_with_scope();
    frames.add_local("outer_var").unwrap();

    frames.push_scope();
    frames.add_local("inner_var").unwrap();
    assert!(frames.find("outer_var").is_none());
    assert!(frames.bound_in_enclosing("outer_var"));
    assert!(!frames.bound_in_enclosing("inner_var"));

    frames.pop_scope().unwrap();
    assert!(frames.find("inner_var").is_none());
    assert!(frames.find("outer_var").is_some());

    // Once the enclosing scope is gone a fresh nested scope sees nothing
    frames.pop_scope().unwrap();
    frames.push_scope();
    frames.push_scope();
    assert!(frames.find("outer_var").is_none());
    assert!(!frames.bound_in_enclosing("outer_var"));
}

#[test]
fn test_nested_scope_offsets_restart() {
    let mut frames = manager_with_scope();
    frames.add_local("a").unwrap();
    frames.add_local("b").unwrap();

    frames.push_scope();
    assert_eq!(frames.add_local("c").unwrap().offset, 4);
    frames.pop_scope().unwrap();

    assert_eq!(frames.add_local("d").unwrap().offset, 12);
}

#[test]
fn test_out_of_order_regions_rejected() {
    let mut frames = manager_with_scope();
    frames.add_local("x").unwrap();
    assert!(matches!(frames.add_argument("a"), Err(BackendError::FrameLayout(_))));

    frames.add_temporary("$t").unwrap();
    assert!(matches!(frames.add_local("y"), Err(BackendError::FrameLayout(_))));
}

#[test]
fn test_duplicate_binding_rejected() {
    let mut frames = manager_with_scope();
    frames.add_local("x").unwrap();
    assert!(matches!(frames.add_local("x"), Err(BackendError::FrameLayout(_))));
}

#[test]
fn test_no_open_scope() {
    let mut frames = StackFrameManager::new();
    assert!(frames.find("x").is_none());
    assert!(frames.add_local("x").is_err());
    assert!(frames.total_frame_size().is_err());
    assert!(frames.pop_scope().is_err());
}
