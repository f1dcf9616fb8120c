//! CPU architectural state: the integer register file.

/// Number of integer registers.
pub const REG_COUNT: usize = 32;

/// Integer register file x0..x31. x0 is hard-wired to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegFile {
    regs: [u32; REG_COUNT],
}

impl RegFile {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn read(&self, reg: u8) -> u32 {
        self.regs[reg as usize & (REG_COUNT - 1)]
    }

    /// Writes to x0 are discarded.
    #[inline]
    pub fn write(&mut self, reg: u8, value: u32) {
        let idx = reg as usize & (REG_COUNT - 1);
        if idx != 0 {
            self.regs[idx] = value;
        }
    }

    pub fn snapshot(&self) -> &[u32; REG_COUNT] {
        &self.regs
    }

    /// Zero every register.
    pub fn clear(&mut self) {
        self.regs = [0; REG_COUNT];
    }
}
