//! rv32i_sim: RV32I 汇编行级模拟器
//!
//! 直接读取汇编源文本（不经过机器码编码），逐行校验、装载并执行，
//! 通过 RUN / STEP / STOP / RELOAD / REFRESH 控制状态机驱动。
//!
//! # 模块结构
//!
//! - `isa`: 指令定义、助记符表、寄存器名与数字字面量
//! - `asm`: 汇编前端（词法切分、校验、装载）
//! - `diag`: 校验诊断与诊断接收端
//! - `cpu`: CPU 核心与执行引擎
//! - `memory`: 256 字节分页的稀疏内存
//! - `view`: 指令与内存显示窗口
//! - `simulator`: 控制状态机
//! - `registry`: 按标识符管理的模拟器实例
//! - `config`: 配置加载

pub mod asm;
pub mod config;
pub mod cpu;
pub mod diag;
pub mod isa;
pub mod memory;
pub mod registry;
pub mod simulator;
pub mod view;
