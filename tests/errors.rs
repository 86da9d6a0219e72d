use ibmasm_rs::{Error, Interpreter, PreprocessError, RuntimeError};

fn run_err(src: &str) -> Error {
    Interpreter::new(src).interpret().unwrap_err()
}

fn preprocess_err(src: &str) -> PreprocessError {
    Interpreter::new(src).preprocess().unwrap_err()
}

#[test]
fn preprocessing_errors() {
    assert!(matches!(
        preprocess_err("X DC 1\nX DC 1"),
        PreprocessError::DuplicateLabel { line: 2, .. }
    ));
    assert!(matches!(
        preprocess_err("BAD$ AR 1, 1"),
        PreprocessError::InvalidLabel { line: 1, .. }
    ));
    assert!(matches!(
        preprocess_err("\nMVC 1, 2"),
        PreprocessError::UnknownMnemonic { line: 2, .. }
    ));
    assert!(matches!(
        preprocess_err("AR 1, 1\nX DS 2"),
        PreprocessError::DataAfterCode { line: 2 }
    ));
    assert!(matches!(
        preprocess_err("X DC INTEGER(ten)"),
        PreprocessError::BadNumber { line: 1, .. }
    ));
    assert!(matches!(
        preprocess_err("X DC 99999999999"),
        PreprocessError::BadNumber { line: 1, .. }
    ));
    assert!(matches!(preprocess_err("X DC"), PreprocessError::MissingValue { line: 1 }));
}

#[test]
fn preprocessing_errors_surface_from_interpret() {
    let err = run_err("AR 1, 1\nlowercase ar 1, 1");
    assert!(matches!(err, Error::Preprocess(PreprocessError::UnknownMnemonic { line: 2, .. })));
    assert_eq!(err.line(), 2);
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn operand_arity() {
    for src in ["AR 1", "AR 1, 2, 3", "A 1", "L", "J", "J X Y"] {
        let err = run_err(src);
        assert!(
            matches!(err, Error::Runtime(RuntimeError::Arity { line: 1, .. })),
            "{src:?}: {err}"
        );
    }
}

#[test]
fn missing_comma() {
    let err = run_err("AR 1 2 3");
    assert!(matches!(err, Error::Runtime(RuntimeError::MissingComma { line: 1, .. })));
}

#[test]
fn invalid_registers() {
    for src in ["AR 16, 1", "AR 1, R2", "L -1, 0", "L 1, 0(x)"] {
        let err = run_err(src);
        assert!(
            matches!(err, Error::Runtime(RuntimeError::InvalidRegister { line: 1, .. })),
            "{src:?}: {err}"
        );
    }
}

#[test]
fn undefined_symbol_names_line_and_label() {
    let err = run_err("AR 1, 1\nL 1, NOPE");
    match err {
        Error::Runtime(RuntimeError::UndefinedLabel { line, label }) => {
            assert_eq!(line, 2);
            assert_eq!(label, "NOPE");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_jump_targets() {
    // inside a statement
    let err = run_err("AR 1, 1\nA 1, 0\nJ 3");
    assert!(matches!(err, Error::Runtime(RuntimeError::InvalidJumpTarget { line: 3, addr: 3 })));
    // one past the end
    let err = run_err("AR 1, 1\nJ 6");
    assert!(matches!(err, Error::Runtime(RuntimeError::InvalidJumpTarget { line: 2, addr: 6 })));
    // far beyond the program
    let err = run_err("J 4000000000");
    assert!(matches!(err, Error::Runtime(RuntimeError::InvalidJumpTarget { .. })));
}

#[test]
fn division_by_zero() {
    let err = run_err("Z DC 0\nLA 1, 5\nD 1, Z");
    assert!(matches!(err, Error::Runtime(RuntimeError::DivisionByZero { line: 3 })));
    let err = run_err("LA 1, 5\nDR 1, 2");
    assert!(matches!(err, Error::Runtime(RuntimeError::DivisionByZero { line: 2 })));
}

#[test]
fn failed_step_leaves_position_on_faulting_line() {
    let mut it = Interpreter::new("LA 1, 3\nL 2, MISSING\nLA 3, 1");
    it.preprocess().unwrap();
    it.interpret_next_line().unwrap();
    assert!(it.interpret_next_line().is_err());
    assert_eq!(it.current_line(), 1);
    assert_eq!(it.current_address(), 4);
    assert_eq!(it.registers()[1], 3);
}
