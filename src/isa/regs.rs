//! 通用寄存器命名
//!
//! 同时接受 `x0`..`x31` 与 ABI 别名，`s0` 与 `fp` 都指向 x8。
//! 名称区分大小写。

/// x0..x31 对应的 ABI 名称（x8 显示为 `s0`）
pub const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", //
    "s0", "s1", "a0", "a1", "a2", "a3", "a4", "a5", //
    "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", //
    "s8", "s9", "s10", "s11", "t3", "t4", "t5", "t6",
];

/// 返回地址寄存器 x1
pub const RA: u8 = 1;

/// 将寄存器名解析为编号
///
/// # 示例
///
/// ```
/// use rv32i_sim::isa::register_index;
///
/// assert_eq!(register_index("x31"), Some(31));
/// assert_eq!(register_index("fp"), Some(8));
/// assert_eq!(register_index("X1"), None);
/// ```
pub fn register_index(name: &str) -> Option<u8> {
    if name == "fp" {
        return Some(8);
    }
    if let Some(pos) = ABI_NAMES.iter().position(|abi| *abi == name) {
        return Some(pos as u8);
    }
    let digits = name.strip_prefix('x')?;
    // 不接受 "x01" 之类带前导零的写法
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u8>().ok().filter(|n| *n < 32)
}

/// 寄存器的显示名称，例如 `x10 (a0)`
pub fn register_name(index: u8) -> String {
    let abi = ABI_NAMES.get(index as usize).copied().unwrap_or("?");
    format!("x{index} ({abi})")
}
