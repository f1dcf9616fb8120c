//! 程序装载
//!
//! 把校验通过的行线性化为按 4 字节递增编址的指令序列，
//! 并建立标签表。

use std::collections::BTreeMap;

use crate::isa::RvInstr;

use super::lexer::{SourceLine, normalize_operand};

/// 默认入口地址
pub const DEFAULT_ENTRY_POINT: u32 = 0x1000;

/// 入口地址上限
pub const MAX_ENTRY_POINT: u32 = 0xFFFF_FF80;

/// 规整入口地址：上限截断后向上对齐到 4 字节
///
/// # 示例
///
/// ```
/// use rv32i_sim::asm::align_entry;
///
/// assert_eq!(align_entry(0x1001), 0x1004);
/// assert_eq!(align_entry(0xFFFF_FFFF), 0xFFFF_FF80);
/// ```
pub fn align_entry(requested: u32) -> u32 {
    (requested.min(MAX_ENTRY_POINT) + 3) & !3
}

/// 已装载的一条指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// 源行号（从 1 开始）
    pub line: usize,
    /// 显示用标签（不含冒号）
    pub label: Option<String>,
    /// 助记符原文
    pub mnemonic_raw: String,
    /// 小写助记符
    pub mnemonic: String,
    /// 操作数原文
    pub operand_raw: String,
    /// 去除全部空白后的操作数
    pub operand: String,
    /// 指令地址
    pub address: u32,
    /// 已解析的指令
    pub op: RvInstr,
}

/// 标签表：标签名（区分大小写）-> 地址
pub type LabelTable = BTreeMap<String, u32>;

/// 已装载的程序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    entry: u32,
    instructions: Vec<Instruction>,
    labels: LabelTable,
}

impl Program {
    /// 空程序（无结束地址）
    pub fn empty(entry: u32) -> Self {
        Self {
            entry,
            instructions: Vec::new(),
            labels: LabelTable::new(),
        }
    }

    /// 装载校验通过的行
    ///
    /// `instrs` 与 `lines` 逐行对应。纯标签行不占地址，挂起的标签绑定到下一条指令；
    /// 末尾悬空的标签在已有指令时占用一个填充槽。
    pub fn load(lines: &[SourceLine], instrs: &[Option<RvInstr>], entry: u32) -> Self {
        let mut program = Self::empty(entry);
        let mut next = entry;
        let mut pending: Option<(usize, &str)> = None;

        for (i, (line, instr)) in lines.iter().zip(instrs).enumerate() {
            if line.is_blank() {
                continue;
            }
            if let Some(name) = line.label_name() {
                program.labels.insert(name.to_string(), next);
            }
            let Some(op) = instr else {
                if let Some(name) = line.label_name() {
                    pending = Some((i + 1, name));
                }
                continue;
            };
            let label = line.label_name().or(pending.map(|(_, name)| name));
            program.instructions.push(Instruction {
                line: i + 1,
                label: label.map(str::to_string),
                mnemonic_raw: line.mnemonic.clone(),
                mnemonic: line.mnemonic.to_lowercase(),
                operand_raw: line.operand.clone(),
                operand: normalize_operand(&line.operand),
                address: next,
                op: *op,
            });
            next = next.wrapping_add(4);
            pending = None;
        }

        if let Some((line, name)) = pending {
            if !program.instructions.is_empty() {
                program.instructions.push(Instruction {
                    line,
                    label: Some(name.to_string()),
                    mnemonic_raw: String::new(),
                    mnemonic: String::new(),
                    operand_raw: String::new(),
                    operand: String::new(),
                    address: next,
                    op: RvInstr::Padding,
                });
            }
        }

        log::debug!(
            "loaded {} instruction(s), {} label(s) at 0x{:08x}",
            program.instructions.len(),
            program.labels.len(),
            entry
        );
        program
    }

    pub fn entry(&self) -> u32 {
        self.entry
    }

    /// 最后一条指令的地址，空程序为 `None`
    pub fn end_address(&self) -> Option<u32> {
        let count = self.instructions.len() as u32;
        count
            .checked_sub(1)
            .map(|last| self.entry.wrapping_add(last.wrapping_mul(4)))
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn label_address(&self, name: &str) -> Option<u32> {
        self.labels.get(name).copied()
    }

    /// PC 是否有效：程序非空、4 字节对齐且落在 `[entry, end]` 内
    pub fn contains_pc(&self, pc: u32) -> bool {
        match self.end_address() {
            Some(end) => pc & 3 == 0 && self.entry <= pc && pc <= end,
            None => false,
        }
    }

    /// 地址对应的指令序号，超出 `[entry, end]` 时为 `None`
    pub fn index_of(&self, addr: u32) -> Option<usize> {
        let end = self.end_address()?;
        if addr < self.entry || addr > end {
            return None;
        }
        Some(((addr - self.entry) / 4) as usize)
    }

    /// 取 PC 处的指令
    pub fn fetch(&self, pc: u32) -> Option<&Instruction> {
        if !self.contains_pc(pc) {
            return None;
        }
        self.index_of(pc).and_then(|i| self.instructions.get(i))
    }
}
