//! 单条指令执行的可观察效果

/// 一条指令执行后的效果记录
///
/// 记录本次执行涉及的指令序号、控制流目标、寄存器与内存地址，
/// 供显示层高亮使用。寄存器与内存字段在 RUN 正常结束时会被清空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    /// 被执行指令的序号
    pub current: usize,
    /// 控制流目标的指令序号；目标不在程序范围内或非控制流指令时为 `None`
    pub target: Option<usize>,
    /// PC 是否被重定向（跳转或分支成立）
    pub jump: bool,
    pub rd: Option<u8>,
    pub rs1: Option<u8>,
    pub rs2: Option<u8>,
    /// rd 的有符号解读是否有意义
    pub rd_signed: bool,
    /// rd 的无符号解读是否有意义
    pub rd_unsigned: bool,
    /// 源寄存器的有符号解读是否有意义
    pub rs_signed: bool,
    /// 源寄存器的无符号解读是否有意义
    pub rs_unsigned: bool,
    /// 读取的字节地址（按访问顺序）
    pub mem_read: Vec<u32>,
    /// 写入的字节地址（按访问顺序）
    pub mem_write: Vec<u32>,
}

impl Effect {
    pub fn new(current: usize) -> Self {
        Self {
            current,
            target: None,
            jump: false,
            rd: None,
            rs1: None,
            rs2: None,
            rd_signed: true,
            rd_unsigned: true,
            rs_signed: true,
            rs_unsigned: true,
            mem_read: Vec::new(),
            mem_write: Vec::new(),
        }
    }

    /// 清空寄存器与内存字段（RUN 正常结束时使用）
    pub fn clear_operands(&mut self) {
        self.rd = None;
        self.rs1 = None;
        self.rs2 = None;
        self.mem_read.clear();
        self.mem_write.clear();
    }

    /// 本次执行是否访问了内存
    pub fn touches_memory(&self) -> bool {
        !self.mem_read.is_empty() || !self.mem_write.is_empty()
    }

    pub(crate) fn with_r(mut self, rd: u8, rs1: u8, rs2: u8) -> Self {
        self.rd = Some(rd);
        self.rs1 = Some(rs1);
        self.rs2 = Some(rs2);
        self
    }

    pub(crate) fn with_i(mut self, rd: u8, rs1: u8) -> Self {
        self.rd = Some(rd);
        self.rs1 = Some(rs1);
        self
    }

    pub(crate) fn with_rs(mut self, rs1: u8, rs2: u8) -> Self {
        self.rs1 = Some(rs1);
        self.rs2 = Some(rs2);
        self
    }

    pub(crate) fn with_rd(mut self, rd: u8) -> Self {
        self.rd = Some(rd);
        self
    }

    /// 只有有符号比较有意义
    pub(crate) fn signed_compare(mut self) -> Self {
        self.rs_unsigned = false;
        self
    }

    /// 只有无符号比较有意义
    pub(crate) fn unsigned_compare(mut self) -> Self {
        self.rs_signed = false;
        self
    }
}
