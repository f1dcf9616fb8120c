//! CPU 核心与执行引擎
//!
//! 本模块定义了单线程 RV32I CPU 核心 `CpuCore`，
//! 包含寄存器文件、程序计数器以及执行引擎。

use std::fmt::Write as _;

use crate::asm::Program;
use crate::isa::ABI_NAMES;
use crate::memory::Memory;

mod effect;
pub mod exu;
mod status;

pub use effect::Effect;
pub use exu::Flow;
pub use status::{REG_COUNT, RegFile};

/// 单线程 CPU 核心
///
/// 包含 RV32I 的最小状态：
/// - 32 个 32-bit 通用寄存器 x0..x31（x0 恒为 0）
/// - 32-bit 程序计数器
///
/// 指令来自已装载的 `Program`，而不是从内存取指；
/// 核心状态不依赖全局变量，每个模拟器实例各持有一份。
#[derive(Debug, Clone)]
pub struct CpuCore {
    /// 整数寄存器文件
    regs: RegFile,
    /// 程序计数器
    pc: u32,
}

impl CpuCore {
    /// 创建一个新的 CPU 核心
    ///
    /// # 参数
    ///
    /// * `entry_pc` - 初始程序计数器值
    ///
    /// # 示例
    ///
    /// ```
    /// use rv32i_sim::cpu::CpuCore;
    ///
    /// let cpu = CpuCore::new(0x1000);
    /// assert_eq!(cpu.pc(), 0x1000);
    /// ```
    pub fn new(entry_pc: u32) -> Self {
        CpuCore {
            regs: RegFile::new(),
            pc: entry_pc,
        }
    }

    /// 获取当前 PC
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// 设置 PC
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// 读取通用寄存器
    pub fn read_reg(&self, reg: u8) -> u32 {
        self.regs.read(reg)
    }

    /// 写入通用寄存器（写 x0 被丢弃）
    pub fn write_reg(&mut self, reg: u8, value: u32) {
        self.regs.write(reg, value);
    }

    /// 获取全部寄存器
    pub fn regs(&self) -> &[u32; REG_COUNT] {
        self.regs.snapshot()
    }

    /// 寄存器清零，PC 回到入口
    pub fn reset(&mut self, entry_pc: u32) {
        self.regs.clear();
        self.pc = entry_pc;
    }

    /// 执行单条指令
    ///
    /// # 参数
    ///
    /// * `program` - 已装载的程序
    /// * `mem` - 内存接口
    ///
    /// # 返回
    ///
    /// 本条指令的效果；PC 不指向程序内的指令时返回 `None` 且不改变任何状态
    pub fn step(&mut self, program: &Program, mem: &mut dyn Memory) -> Option<Effect> {
        let (effect, next_pc) = exu::execute(program, &mut self.regs, mem, self.pc)?;
        self.pc = next_pc;
        Some(effect)
    }

    /// 格式化寄存器表（用于调试输出）
    pub fn dump_regs(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "PC: 0x{:08x}", self.pc);
        for (i, value) in self.regs.snapshot().iter().enumerate() {
            let _ = write!(
                out,
                "x{:<2} {:>4}: 0x{:08x} {:>11}  ",
                i, ABI_NAMES[i], value, *value as i32
            );
            if i % 4 == 3 {
                out.push('\n');
            }
        }
        out
    }
}

impl Default for CpuCore {
    fn default() -> Self {
        Self::new(0)
    }
}
