//! 汇编前端测试

use super::*;
use crate::diag::{Diagnostic, DiagnosticKind, ImmKind, RegRole};
use crate::isa::RvInstr;

const ENTRY: u32 = 0x1000;

/// 校验单行（带标签 l1:），返回 (是否合法, 诊断列表)
fn check(mnemonic: &str, operand: &str) -> (bool, Vec<Diagnostic>) {
    let lines = vec![SourceLine {
        label: Some("l1:".to_string()),
        mnemonic: mnemonic.to_string(),
        operand: operand.to_string(),
    }];
    let mut diags: Vec<Diagnostic> = Vec::new();
    let ok = validate(&lines, ENTRY, "test.s", &mut diags).is_some();
    (ok, diags)
}

fn assemble_ok(src: &[&str]) -> Program {
    let mut diags: Vec<Diagnostic> = Vec::new();
    let program = assemble(src, ENTRY, "test.s", &mut diags);
    assert!(diags.is_empty(), "意外的诊断: {:?}", diags);
    program.expect("程序应当合法")
}

#[test]
fn test_validate_diagnostic_counts() {
    const R: &[&str] = &["add", "sub", "and", "or", "xor", "sll", "srl", "sra", "slt", "sltu"];
    const I: &[&str] = &["addi", "andi", "ori", "xori", "slti", "sltiu"];
    const SHIFT: &[&str] = &["slli", "srli", "srai"];
    const S: &[&str] = &["sb", "sh", "sw"];
    const B: &[&str] = &["beq", "bne", "blt", "bltu", "bge", "bgeu"];
    const U: &[&str] = &["lui", "auipc"];
    const LOAD: &[&str] = &["lbu", "lb", "lhu", "lh", "lw"];
    const JAL: &[&str] = &["jal"];
    const JALR: &[&str] = &["jalr"];
    const UNSUPPORTED: &[&str] = &[
        "ecall", "ebreak", "fence", "csrrw", "csrrs", "csrrc", "csrrwi", "csrrsi", "csrrci", "fence.i", "mul", "div", "123",
    ];

    let cases: &[(&[&str], &str, usize)] = &[
        (R, "x2, x3, x4", 0),
        (R, "x32, x33, 4", 3),
        (R, "x32, x3, x4", 1),
        (R, "x2, x33, x4", 1),
        (R, "x2, x3, 4", 1),
        (R, "", 1),
        (R, "x2", 1),
        (R, "x2, x3", 1),
        (R, "x2, x3, x4, x5", 1),
        (R, "zero, ra, t6", 0),
        (I, "x2, x3, 4", 0),
        (I, "x32, x33, x4", 3),
        (I, "x32, x3, 4", 1),
        (I, "x2, x33, 4", 1),
        (I, "x2, x3, x4", 1),
        (I, "", 1),
        (I, "x2, x3", 1),
        (I, "x2, x3, 4, 5", 1),
        (I, "x2, x3, 2047", 0),
        (I, "x2, x3, 2048", 1),
        (I, "x2, x3, -2048", 0),
        (I, "x2, x3, -2049", 1),
        (I, "x2, x3, 0x7ff", 0),
        (S, "x2, 0x20(x3)", 0),
        (S, "x2x, 0x20x(x3x)", 3),
        (S, "x2x, 0x20(x3)", 1),
        (S, "x2, 0x20x(x3)", 1),
        (S, "x2, 0x20(x3x)", 1),
        (S, "x2, 0x20", 1),
        (S, "x2", 1),
        (S, "x2, (x3)", 0),
        (S, "x2,(x3)", 0),
        (S, "x2, 0x20(x3), 1", 1),
        (S, "", 1),
        (S, "x2, 2047(x3)", 0),
        (S, "x2, 2048(x3)", 1),
        (S, "x2, -2048(x3)", 0),
        (S, "x2, -2049(x3)", 1),
        (B, "x5, x6, l1", 0),
        (B, "x5x, x6x, l2", 3),
        (B, "x5x, x6, l1", 1),
        (B, "x5, x6x, l1", 1),
        (B, "x5, x6, l2", 1),
        (B, "x5", 1),
        (B, "x5, x6", 1),
        (B, "x5, x6, l1, 1", 1),
        (B, "", 1),
        (U, "x30, 0x8", 0),
        (U, "", 1),
        (U, "30, x8", 2),
        (U, "30, 0x8", 1),
        (U, "x30, x8", 1),
        (U, "x30, 0x80000", 0),
        (U, "x30, 0xfffff", 0),
        (U, "x30, 0x100000", 1),
        (U, "x30, -1", 1),
        (JAL, "x2, l1", 0),
        (JAL, ", l1", 0),
        (JAL, "l1", 0),
        (JAL, "", 1),
        (JAL, "2, l2", 2),
        (JAL, "2, l1", 1),
        (JAL, "x5, l2", 1),
        (JAL, "x2, l1,", 1),
        (JALR, "x5, 0x20(x3)", 0),
        (JALR, ", 0x20(x3)", 0),
        (JALR, "0x20(x3)", 0),
        (JALR, "(x3)", 0),
        (JALR, "2, x20(x)", 3),
        (JALR, "2, 0x20(x3)", 1),
        (JALR, "x5, x20(x3)", 1),
        (JALR, "x5, 0x20(x)", 1),
        (JALR, "", 1),
        (JALR, "x5, 2047(x3)", 0),
        (JALR, "x5, 2048(x3)", 1),
        (JALR, "x5, -2048(x3)", 0),
        (JALR, "x5, -2049(x3)", 1),
        (JALR, "x5, 0x20(x3),", 1),
        (SHIFT, "x2, x3, 4", 0),
        (SHIFT, "x32, x33, x4", 3),
        (SHIFT, "x2, x3, x4", 1),
        (SHIFT, "", 1),
        (SHIFT, "x2, x3, 4, 5", 1),
        (SHIFT, "x2, x3, -2048", 1),
        (SHIFT, "x2, x3, -1", 1),
        (SHIFT, "x2, x3, 0", 0),
        (SHIFT, "x2, x3, 31", 0),
        (SHIFT, "x2, x3, 32", 1),
        (LOAD, "x2, 0x20(x3)", 0),
        (LOAD, "x2x, 0x20x(x3x)", 3),
        (LOAD, "x2x, 0x20(x3)", 1),
        (LOAD, "x2, 0x20x(x3)", 1),
        (LOAD, "x2, 0x20(x3x)", 1),
        (LOAD, "x2, 0x20", 1),
        (LOAD, "x2, 0x20(x3), 1", 1),
        (LOAD, "", 1),
        (LOAD, "x2, 2047(x3)", 0),
        (LOAD, "x2, 2048(x3)", 1),
        (LOAD, "x2, -2048(x3)", 0),
        (LOAD, "x2, -2049(x3)", 1),
        (LOAD, "x2\t ,\t 2047  (\tx3\t )", 0),
        (LOAD, "x2, 0x20)x3(", 1),
        (LOAD, "x2, 0x20(x3) 1", 1),
        (UNSUPPORTED, "", 1),
    ];

    for (mnemonics, operand, want) in cases {
        for mnemonic in *mnemonics {
            let (ok, diags) = check(mnemonic, operand);
            assert_eq!(
                (ok, diags.len()),
                (*want == 0, *want),
                "{} {:?} => {:?}",
                mnemonic,
                operand,
                diags
            );
        }
    }
}

#[test]
fn test_mnemonic_is_case_insensitive() {
    let (ok, _) = check("ADDI", "x1, x0, 1");
    assert!(ok);
    let (ok, _) = check("Lb", "x2, 0(x3)");
    assert!(ok);
}

#[test]
fn test_diagnostic_kinds_and_lines() {
    let src = ["addi x1, x0, 2048", "add x1, x2, x99", "jal x1, nowhere", "ECALL"];
    let mut diags: Vec<Diagnostic> = Vec::new();
    assert!(assemble(&src, ENTRY, "prog.s", &mut diags).is_none());

    assert_eq!(diags.len(), 4);
    assert_eq!(diags[0].line, 1);
    assert_eq!(
        diags[0].kind,
        DiagnosticKind::ImmediateOutOfRange { kind: ImmKind::Signed12, text: "2048".into() }
    );
    assert_eq!(diags[1].line, 2);
    assert_eq!(
        diags[1].kind,
        DiagnosticKind::UnknownRegister { role: RegRole::Rs2, text: "x99".into() }
    );
    assert_eq!(diags[2].message(), "label not found(nowhere:)");
    // 诊断保留原始大小写
    assert_eq!(diags[3].message(), "unimplemented instruction(ECALL)");
    assert!(diags.iter().all(|d| d.source == "prog.s"));
}

#[test]
fn test_store_reports_rs2_role() {
    let (_, diags) = check("sw", "t9, 0(sp)");
    assert_eq!(
        diags[0].kind,
        DiagnosticKind::UnknownRegister { role: RegRole::Rs2, text: "t9".into() }
    );
}

#[test]
fn test_offset_syntax_message() {
    let (_, diags) = check("lw", "x2, 0x20");
    assert_eq!(diags[0].message(), "parse failed(0x20)");
    let (_, diags) = check("lw", "x2");
    assert_eq!(diags[0].message(), "parse failed");
}

#[test]
fn test_label_syntax() {
    let long_ok = format!("{}:", "a".repeat(MAX_LABEL_LEN));
    let too_long = format!("{}:", "a".repeat(MAX_LABEL_LEN + 1));
    let cases: &[(&str, bool)] = &[
        ("label1:", true),
        ("Label1:", true),
        ("_Label1:", true),
        ("Label1_:", true),
        ("Label.1:", true),
        ("Label$1:", true),
        ("a:", true),
        ("Z:", true),
        ("l9:", true),
        (".1:", true),
        ("$1:", true),
        (long_ok.as_str(), true),
        ("Label+1:", false),
        ("1label:", false),
        ("label1", false),
        (":", false),
        (too_long.as_str(), false),
        ("ラベル:", false),
    ];
    for (label, want) in cases {
        assert_eq!(is_valid_label(label), *want, "{label}");

        let lines = vec![SourceLine {
            label: Some(label.to_string()),
            ..SourceLine::default()
        }];
        let mut diags: Vec<Diagnostic> = Vec::new();
        assert_eq!(validate(&lines, ENTRY, "t", &mut diags).is_some(), *want, "{label}");
    }
}

#[test]
fn test_duplicate_label_reported_once() {
    let mut diags: Vec<Diagnostic> = Vec::new();
    let result = assemble(&["l1: addi x5, x0, 1", "l1: addi x5, x5, 1"], ENTRY, "t", &mut diags);
    assert!(result.is_none());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::DuplicateLabel("l1:".into()));
    assert_eq!(diags[0].line, 2);
}

#[test]
fn test_labels_are_case_sensitive() {
    let mut diags: Vec<Diagnostic> = Vec::new();
    assert!(assemble(&["Loop: addi x1, x1, 1", "beq x0, x0, loop"], ENTRY, "t", &mut diags).is_none());
    assert_eq!(diags.len(), 1);

    let p = assemble_ok(&["Loop: addi x1, x1, 1", "loop: beq x0, x0, loop"]);
    assert_eq!(p.label_address("Loop"), Some(0x1000));
    assert_eq!(p.label_address("loop"), Some(0x1004));
}

#[test]
fn test_forward_reference_and_addresses() {
    let p = assemble_ok(&[
        "# header",
        ".text",
        "start:",
        "    beq x0, x0, done",
        "    addi x1, x1, 1",
        "",
        "done: jal ra, start",
    ]);
    assert_eq!(p.len(), 3);
    assert_eq!(p.label_address("start"), Some(0x1000));
    assert_eq!(p.label_address("done"), Some(0x1008));
    assert_eq!(p.instructions()[0].op, RvInstr::Beq { rs1: 0, rs2: 0, target: 0x1008 });
    assert_eq!(p.instructions()[2].op, RvInstr::Jal { rd: 1, target: 0x1000 });
    assert_eq!(p.instructions()[0].label.as_deref(), Some("start"));
    assert_eq!(p.instructions()[0].line, 4);
    assert_eq!(p.end_address(), Some(0x1008));
}

#[test]
fn test_trailing_label_gets_padding_slot() {
    let p = assemble_ok(&["addi x5, x0, 1", "end:"]);
    assert_eq!(p.len(), 2);
    assert_eq!(p.instructions()[1].op, RvInstr::Padding);
    assert_eq!(p.instructions()[1].mnemonic, "");
    assert_eq!(p.instructions()[1].label.as_deref(), Some("end"));
    assert_eq!(p.label_address("end"), Some(0x1004));
    assert_eq!(p.end_address(), Some(0x1004));
}

#[test]
fn test_labels_only_program_is_empty() {
    let p = assemble_ok(&["a:", "b:"]);
    assert!(p.is_empty());
    assert_eq!(p.end_address(), None);
    assert!(!p.contains_pc(ENTRY));
}

#[test]
fn test_stacked_labels_share_address() {
    let p = assemble_ok(&["a:", "b:", "addi x1, x0, 1"]);
    assert_eq!(p.label_address("a"), Some(0x1000));
    assert_eq!(p.label_address("b"), Some(0x1000));
    // 显示最后一个挂起的标签
    assert_eq!(p.instructions()[0].label.as_deref(), Some("b"));
}

#[test]
fn test_jump_defaults_to_ra() {
    let p = assemble_ok(&["l: jal l", "jal , l", "jalr 4(x5)", "jalr , (x5)"]);
    assert_eq!(p.instructions()[0].op, RvInstr::Jal { rd: 1, target: 0x1000 });
    assert_eq!(p.instructions()[1].op, RvInstr::Jal { rd: 1, target: 0x1000 });
    assert_eq!(p.instructions()[2].op, RvInstr::Jalr { rd: 1, rs1: 5, offset: 4 });
    assert_eq!(p.instructions()[3].op, RvInstr::Jalr { rd: 1, rs1: 5, offset: 0 });
}

#[test]
fn test_normalized_fields() {
    let p = assemble_ok(&["  Lb  \tx2\t ,\t 2047  (\tx3\t ) "]);
    let i = &p.instructions()[0];
    assert_eq!(i.mnemonic_raw, "Lb");
    assert_eq!(i.mnemonic, "lb");
    assert_eq!(i.operand, "x2,2047(x3)");
    assert_eq!(i.op, RvInstr::Lb { rd: 2, rs1: 3, offset: 2047 });
}

#[test]
fn test_immediates_are_sign_extended() {
    let p = assemble_ok(&["sltiu x1, x2, -1", "lui x3, 0xfffff", "sw a0, -4(sp)"]);
    assert_eq!(p.instructions()[0].op, RvInstr::Sltiu { rd: 1, rs1: 2, imm: -1 });
    assert_eq!(p.instructions()[1].op, RvInstr::Lui { rd: 3, imm: 0xfffff });
    assert_eq!(p.instructions()[2].op, RvInstr::Sw { rs1: 2, rs2: 10, offset: -4 });
}

#[test]
fn test_entry_alignment() {
    assert_eq!(align_entry(0), 0);
    assert_eq!(align_entry(0x1000), 0x1000);
    assert_eq!(align_entry(0x1001), 0x1004);
    assert_eq!(align_entry(0x1003), 0x1004);
    assert_eq!(align_entry(MAX_ENTRY_POINT), MAX_ENTRY_POINT);
    assert_eq!(align_entry(u32::MAX), MAX_ENTRY_POINT);
}

#[test]
fn test_index_and_contains_pc() {
    let p = assemble_ok(&["addi x1, x0, 1", "addi x1, x1, 1", "addi x1, x1, 1"]);
    assert!(p.contains_pc(0x1000));
    assert!(p.contains_pc(0x1008));
    assert!(!p.contains_pc(0x100C));
    assert!(!p.contains_pc(0x1002));
    assert!(!p.contains_pc(0x0FFC));
    assert_eq!(p.index_of(0x1008), Some(2));
    assert_eq!(p.index_of(0x100C), None);
    assert!(p.fetch(0x1004).is_some());
    assert!(p.fetch(0x1006).is_none());
}

#[test]
fn test_labels_resolve_against_entry() {
    let mut diags: Vec<Diagnostic> = Vec::new();
    let p = assemble(&["nop_target: addi x0, x0, 0", "bne x1, x2, nop_target"], 0x2000, "t", &mut diags)
        .expect("合法程序");
    assert_eq!(p.instructions()[1].op, RvInstr::Bne { rs1: 1, rs2: 2, target: 0x2000 });
}

#[test]
fn test_program_past_address_space_fails() {
    // 入口 0xffffff80 之后只能放 32 个槽
    let fits: Vec<String> = (0..32).map(|_| "addi x1, x1, 1".to_string()).collect();
    let mut diags: Vec<Diagnostic> = Vec::new();
    let p = assemble(&fits, MAX_ENTRY_POINT, "t", &mut diags).expect("恰好放满");
    assert_eq!(p.end_address(), Some(0xFFFF_FFFC));
    assert!(p.contains_pc(0xFFFF_FFFC));

    let mut lines = fits.clone();
    lines.push("addi x1, x1, 1".to_string());
    lines.push("addi x1, x1, 1".to_string());
    let mut diags: Vec<Diagnostic> = Vec::new();
    assert!(assemble(&lines, MAX_ENTRY_POINT, "t", &mut diags).is_none());
    assert_eq!(diags.len(), 1, "只报告一次");
    assert_eq!(diags[0].line, 33);
    assert_eq!(diags[0].kind, DiagnosticKind::AddressOverflow(0x1_0000_0000));

    // 末尾标签需要的填充槽同样越界
    let mut lines = fits;
    lines.push("end:".to_string());
    let mut diags: Vec<Diagnostic> = Vec::new();
    assert!(assemble(&lines, MAX_ENTRY_POINT, "t", &mut diags).is_none());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].line, 33);
}
