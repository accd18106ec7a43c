mod common;

use common::{code, run, run_json};
use ippcode_vm::error::VmError;

#[test]
fn test_return_without_call() {
    let out = run("RETURN");
    assert!(matches!(out.status, Err(VmError::MissingValue(_))));
    assert_eq!(code(&out), 56);
}

#[test]
fn test_pops_on_empty_stack() {
    let out = run("
        DEFVAR var@GF@a
        POPS var@GF@a
    ");
    assert_eq!(code(&out), 56);
}

#[test]
fn test_arithmetic_type_mismatch_either_order() {
    for listing in [
        "DEFVAR var@GF@r\nADD var@GF@r int@1 bool@true",
        "DEFVAR var@GF@r\nADD var@GF@r bool@true int@1",
        "DEFVAR var@GF@r\nMUL var@GF@r string@2 int@2",
    ] {
        let out = run(listing);
        assert_eq!(code(&out), 53, "{listing}");
    }
}

#[test]
fn test_idiv_type_check_precedes_zero_check() {
    let out = run("
        DEFVAR var@GF@r
        IDIV var@GF@r bool@true int@0
    ");
    assert_eq!(code(&out), 53);

    let out = run("
        DEFVAR var@GF@r
        IDIV var@GF@r int@10 int@0
    ");
    assert_eq!(code(&out), 57);
}

#[test]
fn test_exit_codes() {
    let out = run("EXIT int@10");
    assert!(matches!(out.status, Err(VmError::OperandValue(_))));
    assert_eq!(code(&out), 57);

    let out = run("
        DEFVAR var@GF@c
        MOVE var@GF@c int@3
        EXIT var@GF@c
    ");
    assert_eq!(code(&out), 53);

    let out = run("EXIT int@9");
    assert_eq!(code(&out), 9);
}

#[test]
fn test_exit_resolves_its_operand_first() {
    let out = run("EXIT var@TF@code");
    assert!(matches!(out.status, Err(VmError::FrameAccess(_))));
    assert_eq!(code(&out), 55);

    let out = run("EXIT var@GF@code");
    assert!(matches!(out.status, Err(VmError::VariableAccess(_))));
    assert_eq!(code(&out), 54);
}

#[test]
fn test_variable_access_errors() {
    let out = run("
        DEFVAR var@GF@a
        DEFVAR var@GF@a
    ");
    assert!(matches!(out.status, Err(VmError::VariableAccess(_))));
    assert_eq!(code(&out), 54);

    let out = run("WRITE var@GF@missing");
    assert_eq!(code(&out), 54);

    let out = run("MOVE var@GF@missing int@1");
    assert_eq!(code(&out), 54);
}

#[test]
fn test_frame_access_errors() {
    for listing in [
        "DEFVAR var@TF@a",
        "DEFVAR var@LF@a",
        "PUSHFRAME",
        "POPFRAME",
        // PUSHFRAME consumes the temporary frame
        "CREATEFRAME\nPUSHFRAME\nDEFVAR var@TF@a",
    ] {
        let out = run(listing);
        assert_eq!(code(&out), 55, "{listing}");
    }
}

#[test]
fn test_semantic_errors() {
    let out = run("JUMP label@nowhere");
    assert!(matches!(out.status, Err(VmError::Semantic(_))));
    assert_eq!(code(&out), 52);

    let out = run("CALL label@nowhere");
    assert_eq!(code(&out), 52);

    // duplicate labels fail before anything runs
    let out = run("
        WRITE string@x
        LABEL label@a
        LABEL label@a
    ");
    assert_eq!(code(&out), 52);
    assert!(out.stdout.is_empty());
}

#[test]
fn test_comparison_type_errors() {
    for listing in [
        "DEFVAR var@GF@b\nLT var@GF@b nil@nil nil@nil",
        "DEFVAR var@GF@b\nGT var@GF@b int@1 string@1",
        "DEFVAR var@GF@b\nEQ var@GF@b int@1 bool@true",
        "JUMPIFEQ label@l int@1 nil@nil\nLABEL label@l",
        "DEFVAR var@GF@b\nAND var@GF@b bool@true int@1",
        "DEFVAR var@GF@b\nINT2CHAR var@GF@b string@a",
    ] {
        let out = run(listing);
        assert_eq!(code(&out), 53, "{listing}");
    }
}

#[test]
fn test_string_operation_errors() {
    for listing in [
        "DEFVAR var@GF@c\nINT2CHAR var@GF@c int@256",
        "DEFVAR var@GF@c\nGETCHAR var@GF@c string@abc int@3",
        "DEFVAR var@GF@c\nSTRI2INT var@GF@c string@abc int@-1",
        "DEFVAR var@GF@c\nMOVE var@GF@c string@abc\nSETCHAR var@GF@c int@0 string@",
    ] {
        let out = run(listing);
        assert_eq!(code(&out), 58, "{listing}");
    }
}

#[test]
fn test_structural_errors() {
    let out = run_json(
        r#"{ "instructions": [
            { "order": 2, "opcode": "BREAK" },
            { "order": 2, "opcode": "BREAK" } ] }"#,
        "",
    );
    assert!(matches!(out.status, Err(VmError::Structure(_))));
    assert_eq!(code(&out), 32);

    let out = run_json(r#"{ "instructions": [ { "order": 0, "opcode": "BREAK" } ] }"#, "");
    assert_eq!(code(&out), 32);

    let out = run("FOO int@1");
    assert_eq!(code(&out), 32);

    let out = run("ADD var@GF@a int@1");
    assert_eq!(code(&out), 32);

    let out = run_json("not json", "");
    assert_eq!(code(&out), 31);
}

#[test]
fn test_effects_before_error_persist() {
    let out = run("
        WRITE string@partial
        DEFVAR var@GF@r
        IDIV var@GF@r int@1 int@0
        WRITE string@never
    ");
    assert_eq!(code(&out), 57);
    assert_eq!(out.stdout, "partial");
}
