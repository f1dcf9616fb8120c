use super::Flow;
use crate::cpu::Effect;
use crate::cpu::status::RegFile;
use crate::isa::RvInstr;
use crate::memory::{AccessSize, Memory};

/// Execute one RV32I instruction against `regs`/`mem`.
///
/// Source registers are read before rd is written, so `jalr ra, 0(ra)` jumps to the old value.
pub fn execute(
    regs: &mut RegFile,
    mem: &mut dyn Memory,
    instr: RvInstr,
    current_pc: u32,
    effect: Effect,
) -> (Effect, Flow) {
    let x = |r: u8| regs.read(r);

    match instr {
        // ========== R-type 算术/逻辑指令 ==========
        RvInstr::Add { rd, rs1, rs2 } => {
            let result = x(rs1).wrapping_add(x(rs2));
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }
        RvInstr::Sub { rd, rs1, rs2 } => {
            let result = x(rs1).wrapping_sub(x(rs2));
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }
        RvInstr::And { rd, rs1, rs2 } => {
            let result = x(rs1) & x(rs2);
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }
        RvInstr::Or { rd, rs1, rs2 } => {
            let result = x(rs1) | x(rs2);
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }
        RvInstr::Xor { rd, rs1, rs2 } => {
            let result = x(rs1) ^ x(rs2);
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }
        RvInstr::Slt { rd, rs1, rs2 } => {
            let result = ((x(rs1) as i32) < (x(rs2) as i32)) as u32;
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2).signed_compare(), Flow::Next)
        }
        RvInstr::Sltu { rd, rs1, rs2 } => {
            let result = (x(rs1) < x(rs2)) as u32;
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2).unsigned_compare(), Flow::Next)
        }
        RvInstr::Sll { rd, rs1, rs2 } => {
            let shamt = x(rs2) & 0x1F;
            let result = x(rs1) << shamt;
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }
        RvInstr::Srl { rd, rs1, rs2 } => {
            let shamt = x(rs2) & 0x1F;
            let result = x(rs1) >> shamt;
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }
        RvInstr::Sra { rd, rs1, rs2 } => {
            let shamt = x(rs2) & 0x1F;
            let result = ((x(rs1) as i32) >> shamt) as u32;
            regs.write(rd, result);
            (effect.with_r(rd, rs1, rs2), Flow::Next)
        }

        // ========== I-type 立即数算术/逻辑指令 ==========
        RvInstr::Addi { rd, rs1, imm } => {
            let result = x(rs1).wrapping_add(imm as u32);
            regs.write(rd, result);
            (effect.with_i(rd, rs1), Flow::Next)
        }
        RvInstr::Andi { rd, rs1, imm } => {
            let result = x(rs1) & (imm as u32);
            regs.write(rd, result);
            (effect.with_i(rd, rs1), Flow::Next)
        }
        RvInstr::Ori { rd, rs1, imm } => {
            let result = x(rs1) | (imm as u32);
            regs.write(rd, result);
            (effect.with_i(rd, rs1), Flow::Next)
        }
        RvInstr::Xori { rd, rs1, imm } => {
            let result = x(rs1) ^ (imm as u32);
            regs.write(rd, result);
            (effect.with_i(rd, rs1), Flow::Next)
        }
        RvInstr::Slti { rd, rs1, imm } => {
            let result = ((x(rs1) as i32) < imm) as u32;
            regs.write(rd, result);
            (effect.with_i(rd, rs1).signed_compare(), Flow::Next)
        }
        RvInstr::Sltiu { rd, rs1, imm } => {
            let result = (x(rs1) < (imm as u32)) as u32;
            regs.write(rd, result);
            (effect.with_i(rd, rs1).unsigned_compare(), Flow::Next)
        }
        RvInstr::Slli { rd, rs1, shamt } => {
            let result = x(rs1) << (shamt & 0x1F);
            regs.write(rd, result);
            (effect.with_i(rd, rs1), Flow::Next)
        }
        RvInstr::Srli { rd, rs1, shamt } => {
            let result = x(rs1) >> (shamt & 0x1F);
            regs.write(rd, result);
            (effect.with_i(rd, rs1), Flow::Next)
        }
        RvInstr::Srai { rd, rs1, shamt } => {
            let result = ((x(rs1) as i32) >> (shamt & 0x1F)) as u32;
            regs.write(rd, result);
            (effect.with_i(rd, rs1), Flow::Next)
        }

        // ========== U-type 指令 ==========
        RvInstr::Lui { rd, imm } => {
            regs.write(rd, imm << 12);
            (effect.with_rd(rd), Flow::Next)
        }
        RvInstr::Auipc { rd, imm } => {
            regs.write(rd, current_pc.wrapping_add(imm << 12));
            (effect.with_rd(rd), Flow::Next)
        }

        // ========== Load 指令 ==========
        RvInstr::Lb { rd, rs1, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            let value = mem.load8(addr) as i8 as i32 as u32;
            regs.write(rd, value);
            let mut effect = effect.with_i(rd, rs1);
            effect.rd_unsigned = false;
            effect.mem_read = AccessSize::Byte.span(addr);
            (effect, Flow::Next)
        }
        RvInstr::Lh { rd, rs1, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            let value = mem.load16(addr) as i16 as i32 as u32;
            regs.write(rd, value);
            let mut effect = effect.with_i(rd, rs1);
            effect.rd_unsigned = false;
            effect.mem_read = AccessSize::Half.span(addr);
            (effect, Flow::Next)
        }
        RvInstr::Lw { rd, rs1, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            let value = mem.load32(addr);
            regs.write(rd, value);
            let mut effect = effect.with_i(rd, rs1);
            effect.mem_read = AccessSize::Word.span(addr);
            (effect, Flow::Next)
        }
        RvInstr::Lbu { rd, rs1, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            let value = mem.load8(addr) as u32;
            regs.write(rd, value);
            let mut effect = effect.with_i(rd, rs1);
            effect.rd_signed = false;
            effect.mem_read = AccessSize::Byte.span(addr);
            (effect, Flow::Next)
        }
        RvInstr::Lhu { rd, rs1, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            let value = mem.load16(addr) as u32;
            regs.write(rd, value);
            let mut effect = effect.with_i(rd, rs1);
            effect.rd_signed = false;
            effect.mem_read = AccessSize::Half.span(addr);
            (effect, Flow::Next)
        }

        // ========== Store 指令 ==========
        RvInstr::Sb { rs1, rs2, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            mem.store8(addr, x(rs2) as u8);
            let mut effect = effect.with_rs(rs1, rs2);
            effect.mem_write = AccessSize::Byte.span(addr);
            (effect, Flow::Next)
        }
        RvInstr::Sh { rs1, rs2, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            mem.store16(addr, x(rs2) as u16);
            let mut effect = effect.with_rs(rs1, rs2);
            effect.mem_write = AccessSize::Half.span(addr);
            (effect, Flow::Next)
        }
        RvInstr::Sw { rs1, rs2, offset } => {
            let addr = x(rs1).wrapping_add(offset as u32);
            mem.store32(addr, x(rs2));
            let mut effect = effect.with_rs(rs1, rs2);
            effect.mem_write = AccessSize::Word.span(addr);
            (effect, Flow::Next)
        }

        // ========== 跳转指令 ==========
        RvInstr::Jal { rd, target } => {
            regs.write(rd, current_pc.wrapping_add(4));
            (effect.with_rd(rd), Flow::Jump(target))
        }
        RvInstr::Jalr { rd, rs1, offset } => {
            let target = x(rs1).wrapping_add(offset as u32);
            regs.write(rd, current_pc.wrapping_add(4));
            (effect.with_i(rd, rs1), Flow::Jump(target))
        }

        // ========== 分支指令 ==========
        RvInstr::Beq { rs1, rs2, target } => {
            let taken = x(rs1) == x(rs2);
            (effect.with_rs(rs1, rs2), Flow::Branch { target, taken })
        }
        RvInstr::Bne { rs1, rs2, target } => {
            let taken = x(rs1) != x(rs2);
            (effect.with_rs(rs1, rs2), Flow::Branch { target, taken })
        }
        RvInstr::Blt { rs1, rs2, target } => {
            let taken = (x(rs1) as i32) < (x(rs2) as i32);
            (effect.with_rs(rs1, rs2).signed_compare(), Flow::Branch { target, taken })
        }
        RvInstr::Bge { rs1, rs2, target } => {
            let taken = (x(rs1) as i32) >= (x(rs2) as i32);
            (effect.with_rs(rs1, rs2).signed_compare(), Flow::Branch { target, taken })
        }
        RvInstr::Bltu { rs1, rs2, target } => {
            let taken = x(rs1) < x(rs2);
            (effect.with_rs(rs1, rs2).unsigned_compare(), Flow::Branch { target, taken })
        }
        RvInstr::Bgeu { rs1, rs2, target } => {
            let taken = x(rs1) >= x(rs2);
            (effect.with_rs(rs1, rs2).unsigned_compare(), Flow::Branch { target, taken })
        }

        RvInstr::Padding => (effect, Flow::Next),
    }
}
