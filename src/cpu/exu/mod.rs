//! Execution unit: applies one loaded instruction and reports its effect.

pub mod rv32i;

use super::Effect;
use super::status::RegFile;
use crate::asm::Program;
use crate::memory::Memory;

/// Control-flow outcome of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Fall through to pc + 4.
    Next,
    /// Unconditional jump (jal/jalr).
    Jump(u32),
    /// Conditional branch; the target is reported whether or not it is taken.
    Branch { target: u32, taken: bool },
}

/// Execute the instruction at `pc`, returning its effect and the next PC.
///
/// Returns `None` when `pc` does not address an instruction of `program`.
pub fn execute(
    program: &Program,
    regs: &mut RegFile,
    mem: &mut dyn Memory,
    pc: u32,
) -> Option<(Effect, u32)> {
    let current = program.index_of(pc)?;
    let instr = program.fetch(pc)?.op;

    let (mut effect, flow) = rv32i::execute(regs, mem, instr, pc, Effect::new(current));

    let next_pc = match flow {
        Flow::Next => pc.wrapping_add(4),
        Flow::Jump(target) => {
            effect.target = program.index_of(target);
            effect.jump = true;
            target
        }
        Flow::Branch { target, taken } => {
            effect.target = program.index_of(target);
            effect.jump = taken;
            if taken { target } else { pc.wrapping_add(4) }
        }
    };

    log::trace!("0x{:08x}: {:?} -> 0x{:08x}", pc, instr, next_pc);
    Some((effect, next_pc))
}
