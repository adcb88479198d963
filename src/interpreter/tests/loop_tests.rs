//! Tests for LOOP / ENDLOOP

use super::helpers::{effects, press_count, run_to_events};
use crate::interpreter::{tokenize, Interpreter, LoopMode, Step, StepError};

#[test]
fn test_loop_body_runs_exactly_n_times() {
    let effects = effects("LOOP:3\nKEY:A\nENDLOOP");
    assert_eq!(press_count(&effects, "A"), 3);
}

#[test]
fn test_nested_loops_multiply() {
    let effects = effects("LOOP:2\nLOOP:3\nKEY:A\nENDLOOP\nENDLOOP");
    assert_eq!(press_count(&effects, "A"), 6);
}

#[test]
fn test_loop_of_one_runs_once() {
    let effects = effects("LOOP:1\nKEY:A\nENDLOOP");
    assert_eq!(press_count(&effects, "A"), 1);
}

#[test]
fn test_loop_of_zero_still_runs_body_once() {
    // Decrement-then-test: the body has already run by the first
    // ENDLOOP, so LOOP:0 behaves like LOOP:1
    let effects = effects("LOOP:0\nKEY:A\nENDLOOP");
    assert_eq!(press_count(&effects, "A"), 1);
}

#[test]
fn test_instructions_after_loop_run_once() {
    let effects = effects("LOOP:4\nKEY:A\nENDLOOP\nKEY:B");
    assert_eq!(press_count(&effects, "A"), 4);
    assert_eq!(press_count(&effects, "B"), 1);
}

#[test]
fn test_malformed_loop_count_fails_the_run() {
    let err = run_to_events("LOOP:abc\nKEY:A\nENDLOOP", LoopMode::Replay).unwrap_err();
    assert_eq!(err, StepError::InvalidLoopCount { raw: "abc".into() });
}

#[test]
fn test_negative_loop_count_fails_the_run() {
    let err = run_to_events("LOOP:-2\nKEY:A\nENDLOOP", LoopMode::Replay).unwrap_err();
    assert!(matches!(err, StepError::InvalidLoopCount { .. }));
}

#[test]
fn test_loop_inside_false_branch_is_skipped_entirely() {
    let effects = effects("IF:missing == 1\nLOOP:5\nKEY:A\nENDLOOP\nENDIF\nKEY:B");
    assert_eq!(press_count(&effects, "A"), 0);
    assert_eq!(press_count(&effects, "B"), 1);
}

#[test]
fn test_loop_stack_empty_at_end_of_program() {
    for mode in [LoopMode::Replay, LoopMode::AnnounceOnce] {
        let source = "LOOP:2\nLOOP:3\nKEY:A\nENDLOOP\nENDLOOP";
        let mut interpreter = Interpreter::new(tokenize(source), mode);
        while !matches!(interpreter.step().unwrap(), Step::Done) {}
        assert!(interpreter.state().loop_stack.is_empty(), "mode {:?}", mode);
        assert!(interpreter.state().condition_stack.is_empty());
    }
}
