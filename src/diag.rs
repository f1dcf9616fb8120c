//! 汇编诊断信息
//!
//! 校验阶段的每一处缺陷生成一条 `Diagnostic`，交给可替换的 `DiagnosticSink`。
//! 诊断只描述源文本问题，执行阶段不产生诊断。

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::isa::Extension;

/// 寄存器操作数位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegRole {
    Rd,
    Rs1,
    Rs2,
}

impl fmt::Display for RegRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RegRole::Rd => "rd",
            RegRole::Rs1 => "rs1",
            RegRole::Rs2 => "rs2",
        })
    }
}

/// 立即数字段种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmKind {
    /// 12 位有符号立即数
    Signed12,
    /// 20 位无符号立即数
    Unsigned20,
    /// 移位量
    Shamt,
    /// 访存/jalr 偏移
    Offset,
}

/// 诊断类别
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("parse failed")]
    Syntax,
    #[error("parse failed({0})")]
    SyntaxAt(String),
    #[error("invalid {role}({text})")]
    UnknownRegister { role: RegRole, text: String },
    #[error("{}", imm_message(.kind, .text))]
    ImmediateOutOfRange { kind: ImmKind, text: String },
    #[error("label not found({0})")]
    UndefinedLabel(String),
    #[error("label duplicated({0})")]
    DuplicateLabel(String),
    #[error("invalid label({0})")]
    InvalidLabelSyntax(String),
    #[error("{}", unsupported_message(.extension, .mnemonic))]
    UnsupportedInstruction {
        mnemonic: String,
        extension: Option<Extension>,
    },
    #[error("source unavailable({0})")]
    SourceUnavailable(String),
    #[error("address out of range(0x{0:x})")]
    AddressOverflow(u64),
}

fn imm_message(kind: &ImmKind, text: &str) -> String {
    match kind {
        ImmKind::Signed12 => format!("invalid immediate({text}) 12 bit signed integer"),
        ImmKind::Unsigned20 => format!("invalid immediate({text}) 20 bit unsigned integer"),
        ImmKind::Shamt => format!("invalid shamt({text}) 0 <= shamt <= 31"),
        ImmKind::Offset => format!("invalid offset({text}) 12 bit signed integer"),
    }
}

fn unsupported_message(extension: &Option<Extension>, mnemonic: &str) -> String {
    match extension {
        Some(Extension::System) => format!("unimplemented instruction({mnemonic})"),
        Some(Extension::Zicsr) => format!("unimplemented Zicsr instruction({mnemonic})"),
        Some(Extension::Zifencei) => format!("unimplemented Zifencei instruction({mnemonic})"),
        Some(Extension::M) => format!("unimplemented M extension instruction({mnemonic})"),
        None => format!("unknown instruction({mnemonic})"),
    }
}

/// 一条诊断：来源标识、行号（从 1 开始，0 表示与具体行无关）、类别
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: String,
    pub line: usize,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(source: impl Into<String>, line: usize, kind: DiagnosticKind) -> Self {
        Self {
            source: source.into(),
            line,
            kind,
        }
    }

    /// 诊断文本
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.source, self.line, self.kind)
    }
}

/// 诊断接收端
pub trait DiagnosticSink {
    fn report(&mut self, diag: &Diagnostic);
}

/// 通过 `log::warn!` 输出诊断
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diag: &Diagnostic) {
        log::warn!("{diag}");
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diag: &Diagnostic) {
        self.push(diag.clone());
    }
}

/// 可在多处共享的诊断收集器
///
/// 克隆后共享同一份列表，便于在模拟器持有 sink 的同时由调用方读取结果。
#[derive(Debug, Clone, Default)]
pub struct SharedDiagnostics {
    inner: Arc<Mutex<Vec<Diagnostic>>>,
}

impl SharedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前收集到的诊断副本
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 取出并清空
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for SharedDiagnostics {
    fn report(&mut self, diag: &Diagnostic) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diag.clone());
    }
}
