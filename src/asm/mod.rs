//! 汇编前端
//!
//! 源文本 -> `SourceLine`（词法切分）-> 校验（诊断输出到 sink）-> `Program`（装载）。

mod lexer;
mod program;
mod validate;

pub use lexer::{SourceLine, normalize_operand, split_line};
pub use program::{DEFAULT_ENTRY_POINT, Instruction, LabelTable, MAX_ENTRY_POINT, Program, align_entry};
pub use validate::{MAX_LABEL_LEN, is_valid_label, validate};

use crate::diag::DiagnosticSink;

/// 汇编整段源文本
///
/// 成功返回装载好的程序；任何一行校验失败则返回 `None`，诊断已交给 `sink`。
/// `entry` 应已经过 `align_entry` 规整。
///
/// # 示例
///
/// ```
/// use rv32i_sim::asm::assemble;
///
/// let mut diags: Vec<rv32i_sim::diag::Diagnostic> = Vec::new();
/// let program = assemble(&["start: addi x1, x0, 1", "beq x0, x0, start"], 0x1000, "demo", &mut diags)
///     .expect("valid program");
/// assert_eq!(program.len(), 2);
/// assert_eq!(program.label_address("start"), Some(0x1000));
/// assert!(diags.is_empty());
/// ```
pub fn assemble<S: AsRef<str>>(
    source_lines: &[S],
    entry: u32,
    source: &str,
    sink: &mut dyn DiagnosticSink,
) -> Option<Program> {
    let lines: Vec<SourceLine> = source_lines.iter().map(|l| split_line(l.as_ref())).collect();
    let instrs = validate(&lines, entry, source, sink)?;
    Some(Program::load(&lines, &instrs, entry))
}

#[cfg(test)]
mod tests;
