//! rv32i_sim 命令行入口
//!
//! 装载一个汇编源文件，从 `--script` 或标准输入读取动作并打印模拟器状态。

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rv32i_sim::config::SimConfig;
use rv32i_sim::cpu::Effect;
use rv32i_sim::isa::{parse_unsigned, register_name};
use rv32i_sim::registry::{self, SimulatorRegistry};
use rv32i_sim::simulator::{Action, FileSource, Simulator};

#[derive(Parser, Debug)]
#[command(name = "rv32i_sim_cli", version, about = "RV32I 汇编行级模拟器")]
struct Args {
    /// 汇编源文件
    file: PathBuf,

    /// 入口地址（支持 0x 前缀），覆盖配置文件
    #[arg(long, value_parser = parse_address)]
    entry: Option<u32>,

    /// RUN 时限（毫秒），覆盖配置文件
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 逗号分隔的命令序列，给出时不读标准输入
    #[arg(long)]
    script: Option<String>,
}

fn parse_address(text: &str) -> Result<u32, String> {
    parse_unsigned(text)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("invalid address: {text}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = SimConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(entry) = args.entry {
        config.entry_point = entry;
    }
    if let Some(ms) = args.timeout_ms {
        config.timeout_ms = ms;
    }
    log::debug!("configuration: {config:?}");

    let path = args.file.clone();
    let factory_config = config.clone();
    let registry = SimulatorRegistry::new(config.shared_id.clone(), move || {
        let mut source = FileSource::new(&path);
        if let Some(name) = &factory_config.source_name {
            source = source.with_name(name.as_str());
        }
        Simulator::builder(source).with_config(&factory_config).build()
    });

    println!("=== rv32i_sim: {} ===", args.file.display());
    print_status(&registry);

    match args.script {
        Some(script) => {
            for command in script.split(',') {
                if !execute(&registry, command.trim())? {
                    break;
                }
            }
        }
        None => {
            let stdin = io::stdin();
            prompt()?;
            for line in stdin.lock().lines() {
                let line = line.context("reading stdin")?;
                if !execute(&registry, line.trim())? {
                    break;
                }
                prompt()?;
            }
        }
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

/// 执行一条命令，返回是否继续
fn execute(registry: &SimulatorRegistry, command: &str) -> Result<bool> {
    match command.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => return Ok(false),
        "regs" => print_regs(registry),
        "mem" => print_memory(registry),
        "labels" => print_labels(registry),
        "list" => print_listing(registry),
        "help" => println!("命令: run step stop reload refresh regs mem labels list quit"),
        _ => match command.parse::<Action>() {
            Ok(action) => match registry.dispatch("", action) {
                Ok(effect) => {
                    print_effect(effect.as_ref());
                    print_status(registry);
                }
                Err(err) => println!("拒绝: {err}"),
            },
            Err(err) => println!("{err}"),
        },
    }
    Ok(true)
}

fn print_status(registry: &SimulatorRegistry) {
    let sim = registry.shared();
    let sim = registry::lock(&sim);
    let enabled: Vec<String> = sim.enabled_actions().iter().map(|a| a.to_string()).collect();
    println!(
        "状态: {}  PC: 0x{:08x}  超时: {}  单步: {}  装载失败: {}",
        sim.status(),
        sim.pc(),
        sim.timed_out(),
        sim.step_pending(),
        sim.load_failed()
    );
    println!("可用动作: {}", enabled.join(" "));
}

fn print_effect(effect: Option<&Effect>) {
    let Some(e) = effect else {
        println!("(无效果)");
        return;
    };
    let reg = |r: Option<u8>| r.map(register_name).unwrap_or_else(|| "-".to_string());
    println!(
        "指令 #{}  目标: {}  跳转: {}  rd: {}  rs1: {}  rs2: {}",
        e.current,
        e.target.map(|t| format!("#{t}")).unwrap_or_else(|| "-".to_string()),
        e.jump,
        reg(e.rd),
        reg(e.rs1),
        reg(e.rs2)
    );
    if !e.mem_read.is_empty() {
        println!("读内存: {:08x?}", e.mem_read);
    }
    if !e.mem_write.is_empty() {
        println!("写内存: {:08x?}", e.mem_write);
    }
}

fn print_regs(registry: &SimulatorRegistry) {
    let sim = registry.shared();
    let sim = registry::lock(&sim);
    print!("{}", sim.cpu().dump_regs());
}

fn print_memory(registry: &SimulatorRegistry) {
    let sim = registry.shared();
    let sim = registry::lock(&sim);
    for (addr, bytes) in sim.memory_window().rows(sim.memory()) {
        let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
        println!("0x{addr:08x}: {}", hex.join(" "));
    }
    let pages: Vec<String> = sim
        .memory()
        .touched_pages()
        .map(|(base, _)| format!("0x{base:08x}"))
        .collect();
    println!("已分配页: {}", pages.join(" "));
}

fn print_labels(registry: &SimulatorRegistry) {
    let sim = registry.shared();
    let sim = registry::lock(&sim);
    for (name, addr) in sim.program().labels() {
        println!("0x{addr:08x}  {name}:");
    }
}

fn print_listing(registry: &SimulatorRegistry) {
    let sim = registry.shared();
    let sim = registry::lock(&sim);
    let current = sim.program().index_of(sim.pc());
    for (i, addr, instr) in sim.instruction_window().rows(sim.program()) {
        let Some(instr) = instr else { break };
        let marker = if Some(i) == current { "=>" } else { "  " };
        let label = instr.label.as_deref().map(|l| format!("{l}:")).unwrap_or_default();
        println!(
            "{marker} 0x{addr:08x}  {label:<12} {:<8} {}",
            instr.mnemonic_raw, instr.operand
        );
    }
}
