//! 内存抽象层
//!
//! 本模块定义了内存访问的统一接口 `Memory` trait，
//! 以及覆盖完整 32 位地址空间的稀疏分页内存 `PagedMemory`。
//!
//! 页面大小固定为 256 字节，以 `addr & 0xffff_ff00` 为键，
//! 首次读或写时分配并清零。

use std::collections::BTreeMap;

/// 页面大小（字节）
pub const PAGE_SIZE: usize = 256;

/// 页基址掩码
pub const PAGE_MASK: u32 = !(PAGE_SIZE as u32 - 1);

/// 单个内存页
pub type Page = [u8; PAGE_SIZE];

/// 访存粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSize {
    Byte,
    Half,
    Word,
}

impl AccessSize {
    pub fn bytes(self) -> usize {
        match self {
            AccessSize::Byte => 1,
            AccessSize::Half => 2,
            AccessSize::Word => 4,
        }
    }

    /// 本次访问覆盖的字节地址（按地址升序，32 位回绕）
    pub fn span(self, addr: u32) -> Vec<u32> {
        (0..self.bytes() as u32).map(|i| addr.wrapping_add(i)).collect()
    }
}

/// 内存访问的统一接口
///
/// 地址空间为完整的 2^32 字节，任何地址均可访问，不存在访存错误。
/// 多字节访问按小端序逐字节组合，地址在 2^32 处回绕。
/// 读操作也可能改变内部状态（分页内存在读时分配页面），因此读取使用 `&mut self`。
pub trait Memory {
    /// 从指定地址读取 8 位数据
    fn load8(&mut self, addr: u32) -> u8;

    /// 向指定地址写入 8 位数据
    fn store8(&mut self, addr: u32, value: u8);

    /// 从指定地址读取 16 位数据（小端序）
    fn load16(&mut self, addr: u32) -> u16 {
        u16::from_le_bytes([self.load8(addr), self.load8(addr.wrapping_add(1))])
    }

    /// 从指定地址读取 32 位数据（小端序）
    fn load32(&mut self, addr: u32) -> u32 {
        u32::from_le_bytes([
            self.load8(addr),
            self.load8(addr.wrapping_add(1)),
            self.load8(addr.wrapping_add(2)),
            self.load8(addr.wrapping_add(3)),
        ])
    }

    /// 向指定地址写入 16 位数据（小端序）
    fn store16(&mut self, addr: u32, value: u16) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.store8(addr.wrapping_add(i as u32), b);
        }
    }

    /// 向指定地址写入 32 位数据（小端序）
    fn store32(&mut self, addr: u32, value: u32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.store8(addr.wrapping_add(i as u32), b);
        }
    }
}

/// 稀疏分页内存
///
/// 使用 `BTreeMap<页基址, 页>` 存储已触及的页面，未触及的字节读为 0。
/// 页面按需创建，运行期间不会释放，只有 `clear` 会清空全部页面。
///
/// # 示例
///
/// ```
/// use rv32i_sim::memory::{Memory, PagedMemory};
///
/// let mut mem = PagedMemory::new();
/// mem.store32(0x2000, 0x1234_5678);
/// assert_eq!(mem.load8(0x2000), 0x78);
/// assert_eq!(mem.page_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PagedMemory {
    pages: BTreeMap<u32, Box<Page>>,
}

impl PagedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计算地址所在页的基址
    #[inline]
    pub fn page_base(addr: u32) -> u32 {
        addr & PAGE_MASK
    }

    fn page_mut(&mut self, addr: u32) -> &mut Page {
        self.pages
            .entry(Self::page_base(addr))
            .or_insert_with(|| Box::new([0; PAGE_SIZE]))
    }

    /// 已分配的页面数
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 获取指定基址的页面（不分配）
    pub fn page(&self, base: u32) -> Option<&Page> {
        self.pages.get(&Self::page_base(base)).map(|p| &**p)
    }

    /// 按基址升序遍历已分配的页面
    pub fn touched_pages(&self) -> impl Iterator<Item = (u32, &Page)> {
        self.pages.iter().map(|(base, page)| (*base, &**page))
    }

    /// 读取一个字节但不分配页面，供显示层使用
    pub fn peek(&self, addr: u32) -> u8 {
        self.page(addr)
            .map(|p| p[(addr & !PAGE_MASK) as usize])
            .unwrap_or(0)
    }

    /// 释放全部页面，等价于将整个地址空间清零
    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

impl Memory for PagedMemory {
    fn load8(&mut self, addr: u32) -> u8 {
        self.page_mut(addr)[(addr & !PAGE_MASK) as usize]
    }

    fn store8(&mut self, addr: u32, value: u8) {
        self.page_mut(addr)[(addr & !PAGE_MASK) as usize] = value;
    }
}
