//! 助记符定义表
//!
//! 每个助记符一条定义：操作数格式 + 构造函数。
//! 汇编器按格式校验操作数，校验通过后调用构造函数生成 `RvInstr`。

use super::instr::RvInstr;

/// 操作数格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `rd, rs1, rs2`
    R,
    /// `rd, rs1, imm12`
    I,
    /// `rd, rs1, shamt`
    Shift,
    /// `rd, offset(rs1)`
    Load,
    /// `rs2, offset(rs1)`
    S,
    /// `rs1, rs2, label`
    B,
    /// `rd, imm20`
    U,
    /// `[rd,] label`
    J,
    /// `[rd,] offset(rs1)`
    Jalr,
}

/// 校验后的操作数
///
/// 未用到的字段保持默认值 0。`target` 为已解析标签的绝对地址。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operands {
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub imm: i32,
    pub target: u32,
}

/// 助记符定义
#[derive(Clone, Copy)]
pub struct InstrDef {
    /// 小写助记符
    pub name: &'static str,
    /// 操作数格式
    pub format: Format,
    /// 构造函数
    pub build: fn(&Operands) -> RvInstr,
}

impl InstrDef {
    pub const fn new(name: &'static str, format: Format, build: fn(&Operands) -> RvInstr) -> Self {
        Self { name, format, build }
    }
}

impl std::fmt::Debug for InstrDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrDef")
            .field("name", &self.name)
            .field("format", &self.format)
            .finish()
    }
}

/// 已识别但未实现的指令所属扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    /// ecall / ebreak / fence
    System,
    Zicsr,
    Zifencei,
    /// 乘除法扩展
    M,
}

/// RV32I 助记符表
pub static RV32I_INSTRS: &[InstrDef] = &[
    // ========== R-type ==========
    InstrDef::new("add", Format::R, |o| RvInstr::Add { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("sub", Format::R, |o| RvInstr::Sub { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("and", Format::R, |o| RvInstr::And { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("or", Format::R, |o| RvInstr::Or { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("xor", Format::R, |o| RvInstr::Xor { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("sll", Format::R, |o| RvInstr::Sll { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("srl", Format::R, |o| RvInstr::Srl { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("sra", Format::R, |o| RvInstr::Sra { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("slt", Format::R, |o| RvInstr::Slt { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    InstrDef::new("sltu", Format::R, |o| RvInstr::Sltu { rd: o.rd, rs1: o.rs1, rs2: o.rs2 }),
    // ========== I-type ==========
    InstrDef::new("addi", Format::I, |o| RvInstr::Addi { rd: o.rd, rs1: o.rs1, imm: o.imm }),
    InstrDef::new("andi", Format::I, |o| RvInstr::Andi { rd: o.rd, rs1: o.rs1, imm: o.imm }),
    InstrDef::new("ori", Format::I, |o| RvInstr::Ori { rd: o.rd, rs1: o.rs1, imm: o.imm }),
    InstrDef::new("xori", Format::I, |o| RvInstr::Xori { rd: o.rd, rs1: o.rs1, imm: o.imm }),
    InstrDef::new("slti", Format::I, |o| RvInstr::Slti { rd: o.rd, rs1: o.rs1, imm: o.imm }),
    InstrDef::new("sltiu", Format::I, |o| RvInstr::Sltiu { rd: o.rd, rs1: o.rs1, imm: o.imm }),
    // ========== 立即数移位 ==========
    InstrDef::new("slli", Format::Shift, |o| RvInstr::Slli { rd: o.rd, rs1: o.rs1, shamt: o.imm as u8 }),
    InstrDef::new("srli", Format::Shift, |o| RvInstr::Srli { rd: o.rd, rs1: o.rs1, shamt: o.imm as u8 }),
    InstrDef::new("srai", Format::Shift, |o| RvInstr::Srai { rd: o.rd, rs1: o.rs1, shamt: o.imm as u8 }),
    // ========== Load ==========
    InstrDef::new("lb", Format::Load, |o| RvInstr::Lb { rd: o.rd, rs1: o.rs1, offset: o.imm }),
    InstrDef::new("lh", Format::Load, |o| RvInstr::Lh { rd: o.rd, rs1: o.rs1, offset: o.imm }),
    InstrDef::new("lw", Format::Load, |o| RvInstr::Lw { rd: o.rd, rs1: o.rs1, offset: o.imm }),
    InstrDef::new("lbu", Format::Load, |o| RvInstr::Lbu { rd: o.rd, rs1: o.rs1, offset: o.imm }),
    InstrDef::new("lhu", Format::Load, |o| RvInstr::Lhu { rd: o.rd, rs1: o.rs1, offset: o.imm }),
    // ========== Store ==========
    InstrDef::new("sb", Format::S, |o| RvInstr::Sb { rs1: o.rs1, rs2: o.rs2, offset: o.imm }),
    InstrDef::new("sh", Format::S, |o| RvInstr::Sh { rs1: o.rs1, rs2: o.rs2, offset: o.imm }),
    InstrDef::new("sw", Format::S, |o| RvInstr::Sw { rs1: o.rs1, rs2: o.rs2, offset: o.imm }),
    // ========== Branch ==========
    InstrDef::new("beq", Format::B, |o| RvInstr::Beq { rs1: o.rs1, rs2: o.rs2, target: o.target }),
    InstrDef::new("bne", Format::B, |o| RvInstr::Bne { rs1: o.rs1, rs2: o.rs2, target: o.target }),
    InstrDef::new("blt", Format::B, |o| RvInstr::Blt { rs1: o.rs1, rs2: o.rs2, target: o.target }),
    InstrDef::new("bge", Format::B, |o| RvInstr::Bge { rs1: o.rs1, rs2: o.rs2, target: o.target }),
    InstrDef::new("bltu", Format::B, |o| RvInstr::Bltu { rs1: o.rs1, rs2: o.rs2, target: o.target }),
    InstrDef::new("bgeu", Format::B, |o| RvInstr::Bgeu { rs1: o.rs1, rs2: o.rs2, target: o.target }),
    // ========== U-type ==========
    InstrDef::new("lui", Format::U, |o| RvInstr::Lui { rd: o.rd, imm: o.imm as u32 }),
    InstrDef::new("auipc", Format::U, |o| RvInstr::Auipc { rd: o.rd, imm: o.imm as u32 }),
    // ========== Jump ==========
    InstrDef::new("jal", Format::J, |o| RvInstr::Jal { rd: o.rd, target: o.target }),
    InstrDef::new("jalr", Format::Jalr, |o| RvInstr::Jalr { rd: o.rd, rs1: o.rs1, offset: o.imm }),
];

/// 已识别但未实现的助记符
pub static UNSUPPORTED_INSTRS: &[(&str, Extension)] = &[
    ("ecall", Extension::System),
    ("ebreak", Extension::System),
    ("fence", Extension::System),
    ("csrrw", Extension::Zicsr),
    ("csrrs", Extension::Zicsr),
    ("csrrc", Extension::Zicsr),
    ("csrrwi", Extension::Zicsr),
    ("csrrsi", Extension::Zicsr),
    ("csrrci", Extension::Zicsr),
    ("fence.i", Extension::Zifencei),
    ("mul", Extension::M),
    ("mulh", Extension::M),
    ("mulhsu", Extension::M),
    ("mulhu", Extension::M),
    ("div", Extension::M),
    ("divu", Extension::M),
    ("rem", Extension::M),
    ("remu", Extension::M),
];

/// 按小写助记符查找定义
pub fn lookup(mnemonic: &str) -> Option<&'static InstrDef> {
    RV32I_INSTRS.iter().find(|def| def.name == mnemonic)
}

/// 查找已识别但未实现的助记符所属扩展
pub fn unsupported(mnemonic: &str) -> Option<Extension> {
    UNSUPPORTED_INSTRS
        .iter()
        .find(|(name, _)| *name == mnemonic)
        .map(|(_, ext)| *ext)
}
