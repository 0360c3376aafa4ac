use crate::constants::{REGISTER_COUNT, RETURN_REGISTER, STACK_REGISTER, ZERO_REGISTER};

/// Sixteen 64-bit general-purpose registers plus the ALU condition flags.
///
/// `r0` is hard-wired to zero: reads always yield 0 and writes are
/// discarded. That rule lives entirely in [`RegisterFile::set`] rather than
/// scattered across execution paths, so every caller gets it for free.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    registers: [u64; REGISTER_COUNT],
    pub zero: bool,
    pub negative: bool,
    pub carry: bool,
}

impl Default for RegisterFile {
    fn default() -> Self {
        RegisterFile {
            registers: [0; REGISTER_COUNT],
            zero: false,
            negative: false,
            carry: false,
        }
    }
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        RegisterFile::default()
    }

    pub fn get(&self, index: u8) -> u64 {
        self.registers[index as usize]
    }

    pub fn set(&mut self, index: u8, value: u64) {
        if index != ZERO_REGISTER {
            self.registers[index as usize] = value;
        }
    }

    pub fn sp(&self) -> u64 {
        self.get(STACK_REGISTER)
    }

    pub fn set_sp(&mut self, value: u64) {
        self.set(STACK_REGISTER, value);
    }

    pub fn rp(&self) -> u64 {
        self.get(RETURN_REGISTER)
    }

    pub fn set_rp(&mut self, value: u64) {
        self.set(RETURN_REGISTER, value);
    }

    /// Sets Z/N from a computed 64-bit result; callers set `carry` themselves
    /// since it depends on the operation (add/sub/shift all differ).
    pub fn set_zn(&mut self, result: u64) {
        self.zero = result == 0;
        self.negative = (result as i64) < 0;
    }
}
