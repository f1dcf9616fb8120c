//! 显示窗口
//!
//! 与渲染方式无关的窗口位置计算：指令清单窗口随当前指令滚动，
//! 内存窗口跟随最近一次访存聚焦。

use crate::asm::{Instruction, Program};
use crate::cpu::Effect;
use crate::memory::{PAGE_MASK, PagedMemory};

/// 指令窗口行数
pub const INSTRUCTION_ROWS: usize = 32;

/// 当前指令保持在窗口内的最大下移量
const INSTRUCTION_MIDDLE: usize = INSTRUCTION_ROWS / 2;

/// 内存窗口每行字节数
pub const MEMORY_ROW_BYTES: usize = 16;

/// 内存窗口行数
pub const MEMORY_ROWS: usize = 32;

/// 内存窗口字节数
pub const MEMORY_WINDOW_BYTES: u32 = (MEMORY_ROW_BYTES * MEMORY_ROWS) as u32;

/// 内存窗口基址上限，窗口末尾恰好落在 0xffffffff
const MEMORY_BASE_MAX: u32 = 0u32.wrapping_sub(MEMORY_WINDOW_BYTES);

/// 指令清单窗口
///
/// 清单至少有 `INSTRUCTION_ROWS` 行，不足部分显示为空行。
/// 首次滚动前没有基址。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstructionWindow {
    base: Option<usize>,
}

impl InstructionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 窗口首行的指令序号
    pub fn base(&self) -> usize {
        self.base.unwrap_or(0)
    }

    /// 滚动使 `current` 可见
    ///
    /// `current` 在 `[base, base + 16]` 内时不动；否则把它放到窗口中部，
    /// 靠近清单末尾时贴底，且基址不小于 0。
    pub fn scroll(&mut self, current: usize, instruction_count: usize) {
        if let Some(base) = self.base {
            if base <= current && current <= base + INSTRUCTION_MIDDLE {
                return;
            }
        }

        let len = instruction_count.max(INSTRUCTION_ROWS);
        let base = if len < current + INSTRUCTION_MIDDLE {
            len - INSTRUCTION_ROWS
        } else {
            current.saturating_sub(INSTRUCTION_MIDDLE)
        };
        self.base = Some(base);
    }

    /// 滚回顶部
    pub fn reset(&mut self) {
        self.base = Some(0);
    }

    /// 窗口内各行：(序号, 地址, 指令)，超出程序的行没有指令
    pub fn rows<'p>(
        &self,
        program: &'p Program,
    ) -> impl Iterator<Item = (usize, u32, Option<&'p Instruction>)> + 'p {
        let base = self.base();
        let entry = program.entry();
        (base..base + INSTRUCTION_ROWS).map(move |i| {
            let addr = entry.wrapping_add((i as u32).wrapping_mul(4));
            (i, addr, program.instructions().get(i))
        })
    }
}

/// 内存窗口（512 字节，32 行 x 16 字节）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryWindow {
    base: u32,
}

impl MemoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn reset(&mut self) {
        self.base = 0;
    }

    /// 窗口是否完整覆盖 `[min, max]`
    pub fn covers(&self, min: u32, max: u32) -> bool {
        self.base <= min && (max as u64) < self.base as u64 + MEMORY_WINDOW_BYTES as u64
    }

    /// 按本次访存移动窗口
    ///
    /// 写地址优先于读地址；没有访存时不动。
    pub fn focus(&mut self, effect: &Effect) {
        let addrs = if effect.mem_write.is_empty() {
            &effect.mem_read
        } else {
            &effect.mem_write
        };
        let (Some(&min), Some(&max)) = (addrs.iter().min(), addrs.iter().max()) else {
            return;
        };
        if self.covers(min, max) {
            return;
        }

        self.base = if max < MEMORY_WINDOW_BYTES {
            0
        } else {
            (min & PAGE_MASK).min(MEMORY_BASE_MAX)
        };
        log::trace!("memory window -> 0x{:08x}", self.base);
    }

    /// 窗口内各行：(行地址, 16 字节)，不分配页面
    pub fn rows(&self, memory: &PagedMemory) -> Vec<(u32, [u8; MEMORY_ROW_BYTES])> {
        (0..MEMORY_ROWS as u32)
            .map(|row| {
                let addr = self.base.wrapping_add(row * MEMORY_ROW_BYTES as u32);
                let mut bytes = [0u8; MEMORY_ROW_BYTES];
                for (i, b) in bytes.iter_mut().enumerate() {
                    *b = memory.peek(addr.wrapping_add(i as u32));
                }
                (addr, bytes)
            })
            .collect()
    }
}
