//! 模拟器控制状态机
//!
//! `Simulator` 把装载好的程序、CPU 核心、分页内存与显示窗口组合在一起，
//! 并按 RUN / STEP / STOP / RELOAD / REFRESH 五种动作推进状态。
//!
//! # 示例
//!
//! ```
//! use rv32i_sim::simulator::{Action, MemorySource, SimStatus, Simulator};
//!
//! let source = MemorySource::new("demo.s", &["addi x5, x0, 1", "addi x5, x5, 1"]);
//! let mut sim = Simulator::create(source, 0x1000);
//! assert_eq!(sim.status(), SimStatus::Ready);
//!
//! sim.handle(Action::Run);
//! assert_eq!(sim.status(), SimStatus::Executed);
//! assert_eq!(sim.registers()[5], 2);
//! ```

use std::time::{Duration, Instant};

use crate::asm::{self, Program};
use crate::cpu::{CpuCore, Effect, REG_COUNT};
use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::memory::PagedMemory;
use crate::view::{InstructionWindow, MemoryWindow};

mod action;
mod builder;
mod source;

pub use action::{Action, EnabledActions, ParseActionError, SimStatus};
pub use builder::SimulatorBuilder;
pub use source::{FileSource, MemorySource, SourceSupplier};

/// RUN 的默认时限
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// 单个模拟器实例
///
/// 实例之间不共享任何可变状态；并发访问由外层（`SimulatorRegistry`）加锁。
pub struct Simulator {
    source: Box<dyn SourceSupplier>,
    sink: Box<dyn DiagnosticSink + Send>,
    entry: u32,
    timeout: Duration,

    program: Program,
    cpu: CpuCore,
    memory: PagedMemory,

    status: SimStatus,
    last: Option<Effect>,
    load_failed: bool,
    timed_out: bool,
    step_pending: bool,

    instr_window: InstructionWindow,
    mem_window: MemoryWindow,
}

impl Simulator {
    /// 以默认时限与 `LogSink` 创建并完成首次装载
    ///
    /// `entry` 会被规整到 4 字节边界且不超过 0xffffff80。
    pub fn create(source: impl SourceSupplier + 'static, entry: u32) -> Self {
        SimulatorBuilder::new(source).with_entry(entry).build()
    }

    pub fn builder(source: impl SourceSupplier + 'static) -> SimulatorBuilder {
        SimulatorBuilder::new(source)
    }

    pub(crate) fn from_parts(
        source: Box<dyn SourceSupplier>,
        sink: Box<dyn DiagnosticSink + Send>,
        entry: u32,
        timeout: Duration,
    ) -> Self {
        let mut sim = Simulator {
            source,
            sink,
            entry,
            timeout,
            program: Program::empty(entry),
            cpu: CpuCore::new(entry),
            memory: PagedMemory::new(),
            status: SimStatus::Standby,
            last: None,
            load_failed: false,
            timed_out: false,
            step_pending: false,
            instr_window: InstructionWindow::new(),
            mem_window: MemoryWindow::new(),
        };
        sim.load();
        sim
    }

    /// 处理一个动作
    ///
    /// 除 REFRESH 外，返回值同时成为新的"上一次效果"。
    /// 当前状态下不可用的动作不改变任何状态，返回上一次效果。
    pub fn handle(&mut self, action: Action) -> Option<Effect> {
        log::debug!("{}: {} ({})", self.source.name(), action, self.status);
        if !self.is_enabled(action) {
            log::debug!("{}: {} ignored while {}", self.source.name(), action, self.status);
            return self.last.clone();
        }

        let effect = match action {
            Action::Run => self.run(),
            Action::Step => self.step(),
            Action::Stop => {
                self.reset();
                self.status = SimStatus::Ready;
                None
            }
            Action::Reload => {
                self.load();
                None
            }
            Action::Refresh => return self.last.clone(),
        };

        self.last = effect.clone();
        effect
    }

    fn run(&mut self) -> Option<Effect> {
        let deadline = Instant::now() + self.timeout;
        let mut last = None;
        while let Some(effect) = self.cpu.step(&self.program, &mut self.memory) {
            self.mem_window.focus(&effect);
            last = Some(effect);
            if Instant::now() >= deadline {
                break;
            }
        }
        let mut effect = last?;

        self.instr_window.scroll(effect.current, self.program.len());
        self.step_pending = false;
        if self.pc_effective() {
            self.timed_out = true;
            self.status = SimStatus::Running;
            log::info!(
                "{}: RUN timed out after {:?} at pc 0x{:08x}",
                self.source.name(),
                self.timeout,
                self.cpu.pc()
            );
        } else {
            self.timed_out = false;
            effect.clear_operands();
            self.status = SimStatus::Executed;
            log::info!("{}: RUN finished at pc 0x{:08x}", self.source.name(), self.cpu.pc());
        }
        Some(effect)
    }

    fn step(&mut self) -> Option<Effect> {
        let effect = self.cpu.step(&self.program, &mut self.memory)?;
        self.instr_window.scroll(effect.current, self.program.len());
        self.mem_window.focus(&effect);
        self.timed_out = false;
        if self.pc_effective() {
            self.step_pending = true;
            self.status = SimStatus::Running;
        } else {
            self.step_pending = false;
            self.status = SimStatus::Executed;
        }
        Some(effect)
    }

    /// PC 回到入口，寄存器与内存清零；程序与标签保留
    fn reset(&mut self) {
        self.cpu.reset(self.entry);
        self.memory.clear();
        self.instr_window.reset();
        self.mem_window.reset();
        self.step_pending = false;
        self.timed_out = false;
        self.last = None;
    }

    /// 读取源、校验并装载；失败时装载空程序
    fn load(&mut self) {
        let name = self.source.name().to_string();
        let program = match self.source.read_lines() {
            Ok(lines) => asm::assemble(&lines, self.entry, &name, self.sink.as_mut()),
            Err(err) => {
                log::error!("{name}: cannot read source: {err}");
                let diag = Diagnostic::new(name.as_str(), 0, DiagnosticKind::SourceUnavailable(err.to_string()));
                self.sink.report(&diag);
                None
            }
        };

        self.load_failed = program.is_none();
        self.program = program.unwrap_or_else(|| Program::empty(self.entry));
        self.reset();
        self.status = if self.program.end_address().is_some() {
            SimStatus::Ready
        } else {
            SimStatus::Standby
        };

        if self.load_failed {
            log::info!("{name}: load failed");
        } else {
            log::info!(
                "{name}: loaded {} instruction(s) at 0x{:08x}",
                self.program.len(),
                self.entry
            );
        }
    }

    fn pc_effective(&self) -> bool {
        self.program.contains_pc(self.cpu.pc())
    }

    // ========== 状态查询 ==========

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn enabled_actions(&self) -> EnabledActions {
        self.status.enabled_actions()
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        self.enabled_actions().contains(action)
    }

    /// 最近一次装载是否校验失败
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// 最近一次 RUN 是否因超时停下
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// 单步执行中且还有下一条指令
    pub fn step_pending(&self) -> bool {
        self.step_pending
    }

    pub fn entry(&self) -> u32 {
        self.entry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    // ========== 架构状态 ==========

    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    pub fn registers(&self) -> &[u32; REG_COUNT] {
        self.cpu.regs()
    }

    pub fn cpu(&self) -> &CpuCore {
        &self.cpu
    }

    /// 已访问过的内存页
    pub fn memory(&self) -> &PagedMemory {
        &self.memory
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn last_effect(&self) -> Option<&Effect> {
        self.last.as_ref()
    }

    pub fn instruction_window(&self) -> InstructionWindow {
        self.instr_window
    }

    pub fn memory_window(&self) -> MemoryWindow {
        self.mem_window
    }
}
