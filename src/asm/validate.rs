//! 源程序校验
//!
//! 两遍扫描：
//! 1. 标签遍：检查标签语法与重复定义，并把合法标签绑定到装载后的地址
//! 2. 指令遍：按助记符表分派到各格式的操作数校验，同时构造 `RvInstr`
//!
//! 同一行上的每一处独立缺陷各产生一条诊断，整体合法性为各行结果的与。

use std::collections::HashMap;

use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink, ImmKind, RegRole};
use crate::isa::{self, Format, Operands, RvInstr};

use super::lexer::SourceLine;

/// 标签最大长度（不含冒号）
pub const MAX_LABEL_LEN: usize = 4095;

/// 检查标签语法，参数包含结尾冒号
///
/// 首字符为字母、`_`、`.` 或 `$`，其后还可以是数字；长度 1..=4095（不含冒号）。
pub fn is_valid_label(label: &str) -> bool {
    let Some(name) = label.strip_suffix(':') else {
        return false;
    };
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_LABEL_LEN {
        return false;
    }
    let first_ok = |c: u8| c.is_ascii_alphabetic() || matches!(c, b'_' | b'.' | b'$');
    first_ok(bytes[0]) && bytes[1..].iter().all(|c| first_ok(*c) || c.is_ascii_digit())
}

/// 校验器
struct Validator<'a, 's> {
    source: &'a str,
    sink: &'s mut dyn DiagnosticSink,
    /// 标签名（不含冒号）-> 装载地址
    labels: HashMap<&'a str, u32>,
    errors: usize,
}

/// 校验全部行
///
/// 合法时返回与输入逐行对应的指令（无指令的行为 `None`），
/// 否则返回 `None`，所有缺陷已报告给 `sink`。
pub fn validate(
    lines: &[SourceLine],
    entry: u32,
    source: &str,
    sink: &mut dyn DiagnosticSink,
) -> Option<Vec<Option<RvInstr>>> {
    let mut v = Validator {
        source,
        sink,
        labels: HashMap::new(),
        errors: 0,
    };

    // 第一遍：标签与地址范围
    let mut slot: u32 = 0;
    let mut overflowed = false;
    for (i, line) in lines.iter().enumerate() {
        let addr = entry as u64 + 4 * slot as u64;
        if !overflowed && addr > u32::MAX as u64 && (line.label.is_some() || line.has_instruction()) {
            overflowed = true;
            v.error(i + 1, DiagnosticKind::AddressOverflow(addr));
        }
        if let Some(label) = line.label.as_deref() {
            let name = label.strip_suffix(':').unwrap_or(label);
            if !is_valid_label(label) {
                v.error(i + 1, DiagnosticKind::InvalidLabelSyntax(label.to_string()));
            } else if v.labels.contains_key(name) {
                v.error(i + 1, DiagnosticKind::DuplicateLabel(label.to_string()));
            } else {
                v.labels.insert(name, entry.wrapping_add(slot.wrapping_mul(4)));
            }
        }
        if line.has_instruction() {
            slot = slot.wrapping_add(1);
        }
    }

    // 第二遍：指令
    let instrs: Vec<Option<RvInstr>> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if line.has_instruction() {
                v.instruction(i + 1, &line.mnemonic, &line.operand)
            } else {
                None
            }
        })
        .collect();

    if v.errors == 0 {
        Some(instrs)
    } else {
        log::debug!("{}: validation failed with {} diagnostic(s)", source, v.errors);
        None
    }
}

impl Validator<'_, '_> {
    fn error(&mut self, line: usize, kind: DiagnosticKind) {
        self.errors += 1;
        self.sink.report(&Diagnostic::new(self.source, line, kind));
    }

    fn instruction(&mut self, line: usize, mnemonic: &str, operand: &str) -> Option<RvInstr> {
        let lower = mnemonic.to_lowercase();
        let Some(def) = isa::lookup(&lower) else {
            self.error(
                line,
                DiagnosticKind::UnsupportedInstruction {
                    mnemonic: mnemonic.to_string(),
                    extension: isa::unsupported(&lower),
                },
            );
            return None;
        };

        let ops = match def.format {
            Format::R => self.format_r(line, operand),
            Format::I => self.format_imm(line, operand, ImmKind::Signed12),
            Format::Shift => self.format_imm(line, operand, ImmKind::Shamt),
            Format::Load => self.format_offset(line, operand, RegRole::Rd),
            Format::S => self.format_offset(line, operand, RegRole::Rs2),
            Format::B => self.format_b(line, operand),
            Format::U => self.format_u(line, operand),
            Format::J => self.format_j(line, operand),
            Format::Jalr => self.format_jalr(line, operand),
        }?;
        Some((def.build)(&ops))
    }

    // ========== 单字段 ==========

    fn reg(&mut self, line: usize, text: &str, role: RegRole) -> Option<u8> {
        let text = text.trim();
        let idx = isa::register_index(text);
        if idx.is_none() {
            self.error(
                line,
                DiagnosticKind::UnknownRegister {
                    role,
                    text: text.to_string(),
                },
            );
        }
        idx
    }

    fn imm(&mut self, line: usize, text: &str, kind: ImmKind) -> Option<i32> {
        let text = text.trim();
        let value = match kind {
            ImmKind::Signed12 | ImmKind::Offset => isa::imm12(text),
            ImmKind::Shamt => isa::shamt(text).map(i32::from),
            ImmKind::Unsigned20 => isa::uimm20(text).map(|v| v as i32),
        };
        if value.is_none() {
            self.error(
                line,
                DiagnosticKind::ImmediateOutOfRange {
                    kind,
                    text: text.to_string(),
                },
            );
        }
        value
    }

    fn label(&mut self, line: usize, text: &str) -> Option<u32> {
        let name = text.trim();
        let addr = self.labels.get(name).copied();
        if addr.is_none() {
            self.error(line, DiagnosticKind::UndefinedLabel(format!("{name}:")));
        }
        addr
    }

    fn split<'o>(&mut self, line: usize, operand: &'o str, expected: usize) -> Option<Vec<&'o str>> {
        let parts: Vec<&str> = operand.split(',').collect();
        if parts.len() != expected {
            self.error(line, DiagnosticKind::Syntax);
            return None;
        }
        Some(parts)
    }

    // ========== 各格式 ==========

    fn format_r(&mut self, line: usize, operand: &str) -> Option<Operands> {
        let p = self.split(line, operand, 3)?;
        let rd = self.reg(line, p[0], RegRole::Rd);
        let rs1 = self.reg(line, p[1], RegRole::Rs1);
        let rs2 = self.reg(line, p[2], RegRole::Rs2);
        Some(Operands {
            rd: rd?,
            rs1: rs1?,
            rs2: rs2?,
            ..Operands::default()
        })
    }

    fn format_imm(&mut self, line: usize, operand: &str, kind: ImmKind) -> Option<Operands> {
        let p = self.split(line, operand, 3)?;
        let rd = self.reg(line, p[0], RegRole::Rd);
        let rs1 = self.reg(line, p[1], RegRole::Rs1);
        let imm = self.imm(line, p[2], kind);
        Some(Operands {
            rd: rd?,
            rs1: rs1?,
            imm: imm?,
            ..Operands::default()
        })
    }

    fn format_u(&mut self, line: usize, operand: &str) -> Option<Operands> {
        let p = self.split(line, operand, 2)?;
        let rd = self.reg(line, p[0], RegRole::Rd);
        let imm = self.imm(line, p[1], ImmKind::Unsigned20);
        Some(Operands {
            rd: rd?,
            imm: imm?,
            ..Operands::default()
        })
    }

    fn format_b(&mut self, line: usize, operand: &str) -> Option<Operands> {
        let p = self.split(line, operand, 3)?;
        let rs1 = self.reg(line, p[0], RegRole::Rs1);
        let rs2 = self.reg(line, p[1], RegRole::Rs2);
        let target = self.label(line, p[2]);
        Some(Operands {
            rs1: rs1?,
            rs2: rs2?,
            target: target?,
            ..Operands::default()
        })
    }

    /// `[rd,] label`，rd 省略或为空时取 ra
    fn format_j(&mut self, line: usize, operand: &str) -> Option<Operands> {
        let parts: Vec<&str> = operand.split(',').collect();
        let (rd_text, label_text) = match parts.as_slice() {
            [label] => ("", *label),
            [rd, label] => (*rd, *label),
            _ => {
                self.error(line, DiagnosticKind::Syntax);
                return None;
            }
        };
        let rd = if rd_text.trim().is_empty() {
            Some(isa::RA)
        } else {
            self.reg(line, rd_text, RegRole::Rd)
        };
        let target = self.label(line, label_text);
        Some(Operands {
            rd: rd?,
            target: target?,
            ..Operands::default()
        })
    }

    /// `[rd,] offset(rs1)`，rd 省略或为空时取 ra
    fn format_jalr(&mut self, line: usize, operand: &str) -> Option<Operands> {
        let parts: Vec<&str> = operand.split(',').collect();
        match parts.as_slice() {
            [mem] => self.offset_operands(line, None, mem),
            [rd, mem] if rd.trim().is_empty() => self.offset_operands(line, None, mem),
            _ => self.format_offset(line, operand, RegRole::Rd),
        }
    }

    /// `rd/rs2, offset(rs1)`
    fn format_offset(&mut self, line: usize, operand: &str, role: RegRole) -> Option<Operands> {
        let p = self.split(line, operand, 2)?;
        self.offset_operands(line, Some((p[0], role)), p[1])
    }

    fn offset_operands(&mut self, line: usize, first: Option<(&str, RegRole)>, mem: &str) -> Option<Operands> {
        let mem = mem.trim();
        let (offset_text, base_text) = match (mem.find('('), mem.find(')')) {
            (Some(b), Some(e)) if b < e && e == mem.len() - 1 => (&mem[..b], &mem[b + 1..e]),
            _ => {
                self.error(line, DiagnosticKind::SyntaxAt(mem.to_string()));
                return None;
            }
        };

        let first = match first {
            Some((text, role)) => self.reg(line, text, role).map(|r| (r, role)),
            None => Some((isa::RA, RegRole::Rd)),
        };
        let rs1 = self.reg(line, base_text, RegRole::Rs1);
        let offset = if offset_text.trim().is_empty() {
            Some(0)
        } else {
            self.imm(line, offset_text, ImmKind::Offset)
        };

        let (reg, role) = first?;
        let mut ops = Operands {
            rs1: rs1?,
            imm: offset?,
            ..Operands::default()
        };
        match role {
            RegRole::Rs2 => ops.rs2 = reg,
            _ => ops.rd = reg,
        }
        Some(ops)
    }
}
