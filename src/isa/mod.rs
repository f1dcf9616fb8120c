//! RISC-V RV32I ISA 抽象
//!
//! 本模块提供汇编器与执行引擎共用的指令层定义：
//! - `RvInstr`: 指令的语义表示
//! - `InstrDef`: 助记符定义表（格式 + 构造函数）
//! - 寄存器命名与数字字面量解析

mod fields;
mod instr;
mod instr_def;
mod regs;

pub use fields::*;
pub use instr::RvInstr;
pub use instr_def::{Extension, Format, InstrDef, Operands, RV32I_INSTRS, UNSUPPORTED_INSTRS, lookup, unsupported};
pub use regs::{ABI_NAMES, RA, register_index, register_name};
