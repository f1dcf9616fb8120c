//! 行级词法切分
//!
//! 每一行切分为：可选标签（含结尾冒号）、助记符、操作数原文。

/// 单行切分结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLine {
    /// 定义的标签，包含结尾的 `:`
    pub label: Option<String>,
    /// 助记符原文（未转小写），空串表示本行无指令
    pub mnemonic: String,
    /// 操作数原文（已去除首尾空白）
    pub operand: String,
}

impl SourceLine {
    /// 本行既无标签也无指令
    pub fn is_blank(&self) -> bool {
        self.label.is_none() && self.mnemonic.is_empty()
    }

    /// 本行是否包含指令
    pub fn has_instruction(&self) -> bool {
        !self.mnemonic.is_empty()
    }

    /// 标签名（去掉结尾冒号）
    pub fn label_name(&self) -> Option<&str> {
        self.label
            .as_deref()
            .map(|l| l.strip_suffix(':').unwrap_or(l))
    }
}

/// 切分一行源文本
///
/// - 空行、以 `.` 开头且不含 `:` 的伪指令行返回空结果
/// - `#` 或 `;` 起始注释
/// - 注释前第一个 `:` 之前（含）的内容为标签
/// - 剩余部分按第一个空格/制表符拆成助记符与操作数
///
/// # 示例
///
/// ```
/// use rv32i_sim::asm::split_line;
///
/// let line = split_line("loop: addi x1, x1, 1 # inc");
/// assert_eq!(line.label.as_deref(), Some("loop:"));
/// assert_eq!(line.mnemonic, "addi");
/// assert_eq!(line.operand, "x1, x1, 1");
/// ```
pub fn split_line(raw: &str) -> SourceLine {
    let line = raw.trim();
    if line.is_empty() || (line.starts_with('.') && !line.contains(':')) {
        return SourceLine::default();
    }

    let code = match line.find(['#', ';']) {
        Some(c) => &line[..c],
        None => line,
    };

    let (label, body) = match code.find(':') {
        Some(l) => (Some(code[..=l].trim().to_string()), &code[l + 1..]),
        None => (None, code),
    };

    let body = body.trim();
    let (mnemonic, operand) = match body.find([' ', '\t']) {
        Some(s) => (&body[..s], body[s..].trim()),
        None => (body, ""),
    };

    SourceLine {
        label,
        mnemonic: mnemonic.to_string(),
        operand: operand.to_string(),
    }
}

/// 规范化操作数：去除全部空格与制表符
pub fn normalize_operand(operand: &str) -> String {
    operand.chars().filter(|c| *c != ' ' && *c != '\t').collect()
}
