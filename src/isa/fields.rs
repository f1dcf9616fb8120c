//! 操作数字段解析辅助函数
//!
//! 数字字面量遵循带前缀自动识别进制的规则：
//! 可选符号（仅有符号字段），`0x`/`0X` 十六进制，`0b`/`0B` 二进制，
//! `0o`/`0O` 或前导 `0` 为八进制，其余为十进制。

/// 12 位有符号立即数下界
pub const IMM12_MIN: i64 = -2048;
/// 12 位有符号立即数上界
pub const IMM12_MAX: i64 = 2047;
/// 20 位无符号立即数上界
pub const UIMM20_MAX: u64 = 0xF_FFFF;
/// 移位量上界
pub const SHAMT_MAX: i64 = 31;

/// 解析无符号数字（不含符号）
pub fn parse_unsigned(text: &str) -> Option<u64> {
    let (radix, digits) = split_radix(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// 解析有符号数字
///
/// # 示例
///
/// ```
/// use rv32i_sim::isa::parse_signed;
///
/// assert_eq!(parse_signed("-0x10"), Some(-16));
/// assert_eq!(parse_signed("010"), Some(8));
/// assert_eq!(parse_signed("0b101"), Some(5));
/// assert_eq!(parse_signed("12a"), None);
/// ```
pub fn parse_signed(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = i64::try_from(parse_unsigned(body)?).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn split_radix(text: &str) -> (u32, &str) {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (16, &text[2..]),
            b'b' | b'B' => return (2, &text[2..]),
            b'o' | b'O' => return (8, &text[2..]),
            _ => return (8, &text[1..]),
        }
    }
    (10, text)
}

/// 解析 12 位有符号立即数（-2048..=2047），返回符号扩展后的值
#[inline]
pub fn imm12(text: &str) -> Option<i32> {
    parse_signed(text)
        .filter(|v| (IMM12_MIN..=IMM12_MAX).contains(v))
        .map(|v| v as i32)
}

/// 解析 20 位无符号立即数（0..=0xfffff）
#[inline]
pub fn uimm20(text: &str) -> Option<u32> {
    parse_unsigned(text)
        .filter(|v| *v <= UIMM20_MAX)
        .map(|v| v as u32)
}

/// 解析移位量（0..=31）
#[inline]
pub fn shamt(text: &str) -> Option<u8> {
    parse_signed(text)
        .filter(|v| (0..=SHAMT_MAX).contains(v))
        .map(|v| v as u8)
}
