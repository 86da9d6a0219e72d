use ibmasm_rs::memory::decode_word;
use ibmasm_rs::{Byte, Interpreter, Layout, PreprocessError, Statement};
use pretty_assertions::assert_eq;

fn layout(src: &str) -> Result<Layout, PreprocessError> {
    Layout::build(Statement::parse_program(src))
}

fn word_at(l: &Layout, addr: usize) -> i32 {
    let b = &l.memory.bytes[addr..addr + 4];
    decode_word([b[0].raw(), b[1].raw(), b[2].raw(), b[3].raw()])
}

#[test]
fn image_length_matches_footprints() {
    let programs = [
        "",
        "AR 1, 1",
        "X DC 1\nY DS 5\nZ DC 2*INTEGER(-9)\n\nL 1, X\nLR 2, 1\nJ 0",
        "# only comments\n# here",
        "A DS\nB DC INTEGER(3)\nSTART LA 1, A\nCR 1, 1\nJZ START",
    ];
    for src in programs {
        let l = layout(src).unwrap();
        let total: usize = l.statements.iter().map(|s| s.footprint).sum();
        assert_eq!(l.memory.len(), total, "program: {src:?}");
        assert_eq!(l.size(), total);
    }
}

#[test]
fn repeated_constants_are_replicated_big_endian() {
    let l = layout("V DC 3*INTEGER(258)\nW DC -2").unwrap();
    assert_eq!(l.statements[0].footprint, 12);
    for cell in 0..3 {
        assert_eq!(word_at(&l, cell * 4), 258);
        assert_eq!(l.memory.bytes[cell * 4 + 2], Byte::Data(1));
        assert_eq!(l.memory.bytes[cell * 4 + 3], Byte::Data(2));
    }
    assert_eq!(word_at(&l, 12), -2);
    assert_eq!(l.symbols.resolve("W"), Some(12));
}

#[test]
fn reserved_storage_is_zeroed_data() {
    let l = layout("BUF DS 4*INTEGER\nONE DS\nTWO DS 2").unwrap();
    let fps: Vec<usize> = l.statements.iter().map(|s| s.footprint).collect();
    assert_eq!(fps, vec![16, 4, 8]);
    assert!(l.memory.bytes.iter().all(|b| *b == Byte::Data(0)));
}

#[test]
fn code_widths() {
    let l = layout("AR 1, 2\nA 1, 0\nJ 0\nLR 1, 2\nST 1, 0").unwrap();
    let fps: Vec<usize> = l.statements.iter().map(|s| s.footprint).collect();
    assert_eq!(fps, vec![2, 4, 4, 2, 4]);
    assert!(l.memory.bytes.iter().all(|b| *b == Byte::Instruction));
}

#[test]
fn labels_record_line_and_address() {
    let l = layout("\nK DC 1\n\nGO AR 1, 1\nNEXT SR 1, 1").unwrap();
    let labels: Vec<(String, usize, u32)> = l
        .symbols
        .iter()
        .map(|s| (s.name.clone(), s.line, s.addr))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("K".to_string(), 1, 0),
            ("GO".to_string(), 3, 4),
            ("NEXT".to_string(), 4, 6),
        ]
    );
}

#[test]
fn preprocess_rewinds_position() {
    let mut it = Interpreter::new("X DC 1\nAR 1, 1\nAR 1, 1");
    it.interpret().unwrap();
    assert!(it.is_at_end());
    it.preprocess().unwrap();
    assert_eq!(it.current_line(), 0);
    assert_eq!(it.current_address(), 0);
    assert_eq!(it.memory().len(), 8);
}

#[test]
fn duplicate_labels_always_fail() {
    let tails = ["AR 1, 1", "J X", "L 1, X", "LA 2, 0", ""];
    for tail in tails {
        let src = format!("X DC 1\nY DC 2\nX DC 3\n{tail}");
        assert_eq!(
            layout(&src).unwrap_err(),
            PreprocessError::DuplicateLabel { line: 3, label: "X".into() }
        );
    }
    // a code label colliding with a data label
    assert!(matches!(
        layout("X DC 1\nX AR 1, 1"),
        Err(PreprocessError::DuplicateLabel { line: 2, .. })
    ));
}

#[test]
fn data_after_code_always_fails() {
    for decl in ["Q DC 1", "Q DS 1", "DC INTEGER(4)", "DS"] {
        for code in ["AR 1, 1", "J 0", "L 1, 0"] {
            let src = format!("P DC 1\n{code}\n{decl}");
            assert_eq!(
                layout(&src).unwrap_err(),
                PreprocessError::DataAfterCode { line: 3 },
                "{src:?}"
            );
        }
    }
}
