//! 源文本供给
//!
//! 每次装载（含 RELOAD）都重新向供给方读取全部行。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// 汇编源的提供者
pub trait SourceSupplier: Send {
    /// 诊断中使用的源名称
    fn name(&self) -> &str;

    /// 读取全部源行（不含换行符）
    fn read_lines(&mut self) -> io::Result<Vec<String>>;
}

/// 从文件读取
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        Self { path, name }
    }

    /// 使用自定义名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceSupplier for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_lines(&mut self) -> io::Result<Vec<String>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

/// 内存中的源
///
/// 克隆后共享同一份行，调用方可随时替换内容再触发 RELOAD。
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySource {
    pub fn new<S: AsRef<str>>(name: impl Into<String>, lines: &[S]) -> Self {
        let source = Self {
            name: name.into(),
            lines: Arc::default(),
        };
        source.set_lines(lines);
        source
    }

    /// 按换行拆分整段文本
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self::new(name, &lines)
    }

    /// 替换全部行
    pub fn set_lines<S: AsRef<str>>(&self, lines: &[S]) {
        let mut guard = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = lines.iter().map(|l| l.as_ref().to_string()).collect();
    }
}

impl SourceSupplier for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_lines(&mut self) -> io::Result<Vec<String>> {
        Ok(self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
