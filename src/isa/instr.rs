//! 定义指令的语义表达式，用于汇编和执行阶段

/// RV32I 指令的语义化表示
///
/// 汇编阶段一次性完成寄存器别名解析、立即数符号扩展和标签解析，
/// 执行阶段只需对枚举做匹配，不再接触源文本。
///
/// 分支与 `jal` 携带的 `target` 是已解析的绝对地址。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RvInstr {
    // ========== R-type 算术/逻辑指令 ==========
    /// ADD: rd = rs1 + rs2
    Add { rd: u8, rs1: u8, rs2: u8 },
    /// SUB: rd = rs1 - rs2
    Sub { rd: u8, rs1: u8, rs2: u8 },
    /// AND: rd = rs1 & rs2
    And { rd: u8, rs1: u8, rs2: u8 },
    /// OR: rd = rs1 | rs2
    Or { rd: u8, rs1: u8, rs2: u8 },
    /// XOR: rd = rs1 ^ rs2
    Xor { rd: u8, rs1: u8, rs2: u8 },
    /// SLT: rd = (rs1 < rs2) ? 1 : 0 (有符号比较)
    Slt { rd: u8, rs1: u8, rs2: u8 },
    /// SLTU: rd = (rs1 < rs2) ? 1 : 0 (无符号比较)
    Sltu { rd: u8, rs1: u8, rs2: u8 },
    /// SLL: rd = rs1 << rs2[4:0]
    Sll { rd: u8, rs1: u8, rs2: u8 },
    /// SRL: rd = rs1 >> rs2[4:0] (逻辑右移)
    Srl { rd: u8, rs1: u8, rs2: u8 },
    /// SRA: rd = rs1 >> rs2[4:0] (算术右移)
    Sra { rd: u8, rs1: u8, rs2: u8 },

    // ========== I-type 立即数算术/逻辑指令 ==========
    /// ADDI: rd = rs1 + imm
    Addi { rd: u8, rs1: u8, imm: i32 },
    /// ANDI: rd = rs1 & imm
    Andi { rd: u8, rs1: u8, imm: i32 },
    /// ORI: rd = rs1 | imm
    Ori { rd: u8, rs1: u8, imm: i32 },
    /// XORI: rd = rs1 ^ imm
    Xori { rd: u8, rs1: u8, imm: i32 },
    /// SLTI: rd = (rs1 < imm) ? 1 : 0 (有符号比较)
    Slti { rd: u8, rs1: u8, imm: i32 },
    /// SLTIU: rd = (rs1 < imm) ? 1 : 0 (无符号比较，imm 先符号扩展)
    Sltiu { rd: u8, rs1: u8, imm: i32 },
    /// SLLI: rd = rs1 << shamt
    Slli { rd: u8, rs1: u8, shamt: u8 },
    /// SRLI: rd = rs1 >> shamt (逻辑右移)
    Srli { rd: u8, rs1: u8, shamt: u8 },
    /// SRAI: rd = rs1 >> shamt (算术右移)
    Srai { rd: u8, rs1: u8, shamt: u8 },

    // ========== Load 指令 ==========
    /// LB: rd = sign_extend(mem[rs1 + offset])
    Lb { rd: u8, rs1: u8, offset: i32 },
    /// LH: rd = sign_extend(mem[rs1 + offset])
    Lh { rd: u8, rs1: u8, offset: i32 },
    /// LW: rd = mem[rs1 + offset]
    Lw { rd: u8, rs1: u8, offset: i32 },
    /// LBU: rd = zero_extend(mem[rs1 + offset])
    Lbu { rd: u8, rs1: u8, offset: i32 },
    /// LHU: rd = zero_extend(mem[rs1 + offset])
    Lhu { rd: u8, rs1: u8, offset: i32 },

    // ========== Store 指令 ==========
    /// SB: mem[rs1 + offset] = rs2[7:0]
    Sb { rs1: u8, rs2: u8, offset: i32 },
    /// SH: mem[rs1 + offset] = rs2[15:0]
    Sh { rs1: u8, rs2: u8, offset: i32 },
    /// SW: mem[rs1 + offset] = rs2
    Sw { rs1: u8, rs2: u8, offset: i32 },

    // ========== U-type 指令 ==========
    /// LUI: rd = imm << 12
    Lui { rd: u8, imm: u32 },
    /// AUIPC: rd = pc + (imm << 12)
    Auipc { rd: u8, imm: u32 },

    // ========== 跳转指令 ==========
    /// JAL: rd = pc + 4; pc = target
    Jal { rd: u8, target: u32 },
    /// JALR: rd = pc + 4; pc = rs1 + offset
    Jalr { rd: u8, rs1: u8, offset: i32 },

    // ========== 分支指令 ==========
    /// BEQ: if (rs1 == rs2) pc = target
    Beq { rs1: u8, rs2: u8, target: u32 },
    /// BNE: if (rs1 != rs2) pc = target
    Bne { rs1: u8, rs2: u8, target: u32 },
    /// BLT: if (rs1 < rs2) pc = target (有符号比较)
    Blt { rs1: u8, rs2: u8, target: u32 },
    /// BGE: if (rs1 >= rs2) pc = target (有符号比较)
    Bge { rs1: u8, rs2: u8, target: u32 },
    /// BLTU: if (rs1 < rs2) pc = target (无符号比较)
    Bltu { rs1: u8, rs2: u8, target: u32 },
    /// BGEU: if (rs1 >= rs2) pc = target (无符号比较)
    Bgeu { rs1: u8, rs2: u8, target: u32 },

    /// 末尾悬空标签占用的填充槽，执行时只推进 PC
    Padding,
}
