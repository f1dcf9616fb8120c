//! 模拟器构建器
//!
//! # 示例
//!
//! ```
//! use std::time::Duration;
//! use rv32i_sim::diag::SharedDiagnostics;
//! use rv32i_sim::simulator::{MemorySource, SimulatorBuilder};
//!
//! let diags = SharedDiagnostics::new();
//! let sim = SimulatorBuilder::new(MemorySource::new("bad.s", &["addi x0, x0"]))
//!     .with_entry(0x2000)
//!     .with_timeout(Duration::from_millis(100))
//!     .with_sink(diags.clone())
//!     .build();
//!
//! assert!(sim.load_failed());
//! assert_eq!(diags.len(), 1);
//! ```

use std::time::Duration;

use super::{DEFAULT_TIMEOUT, Simulator, SourceSupplier};
use crate::asm::{DEFAULT_ENTRY_POINT, align_entry};
use crate::config::SimConfig;
use crate::diag::{DiagnosticSink, LogSink};

/// 模拟器构建器
///
/// 默认入口 0x1000、RUN 时限 5 秒、诊断输出到日志。
pub struct SimulatorBuilder {
    source: Box<dyn SourceSupplier>,
    sink: Box<dyn DiagnosticSink + Send>,
    entry: u32,
    timeout: Duration,
}

impl SimulatorBuilder {
    pub fn new(source: impl SourceSupplier + 'static) -> Self {
        Self {
            source: Box::new(source),
            sink: Box::new(LogSink),
            entry: DEFAULT_ENTRY_POINT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// 设置入口地址（构建时规整）
    pub fn with_entry(mut self, entry: u32) -> Self {
        self.entry = entry;
        self
    }

    /// 设置 RUN 时限
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 设置诊断接收者
    pub fn with_sink(mut self, sink: impl DiagnosticSink + Send + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// 从配置取入口与时限
    pub fn with_config(self, config: &SimConfig) -> Self {
        self.with_entry(config.entry_point)
            .with_timeout(config.timeout())
    }

    /// 构建并完成首次装载
    pub fn build(self) -> Simulator {
        let entry = align_entry(self.entry);
        if entry != self.entry {
            log::debug!("entry 0x{:08x} aligned to 0x{:08x}", self.entry, entry);
        }
        Simulator::from_parts(self.source, self.sink, entry, self.timeout)
    }
}
