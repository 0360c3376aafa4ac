use std::io;
use std::num::Wrapping;

use thiserror::Error;

use crate::constants::WORD_BYTES;
use crate::instruction::{DecodeError, Fields, Instruction};
use crate::memory::{BlockMemory, MemoryError};
use crate::opcode::Opcode;
use crate::register::RegisterFile;

pub const SYSCALL_READ: u64 = 0;
pub const SYSCALL_WRITE: u64 = 1;

pub const ERRNO_IO: u64 = 1;
pub const ERRNO_BAD_FD: u64 = 2;

/// Host-side file descriptor access consulted by `SYSCALL`. Kept as a trait
/// so the VM core has no direct dependency on `std::fs`/stdio — the `vm`
/// crate's binary wires real file descriptors in, tests wire in-memory ones.
pub trait SyscallIo {
    fn read(&mut self, fd: u64, buf: &mut [u8]) -> io::Result<usize>;
    fn write(&mut self, fd: u64, buf: &[u8]) -> io::Result<usize>;
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("memory target address {0:#x} exceeds i32::MAX")]
    AddressOverflow(u64),
}

#[derive(Debug, Eq, PartialEq)]
pub enum TickResult {
    Next,
    Jump(u64),
    Halt,
}

/// The full architectural state: registers, the program counter, and
/// byte-addressable memory. `step` executes exactly one instruction.
pub struct Vm {
    pub registers: RegisterFile,
    pub memory: BlockMemory,
    pub pc: u64,
    pub halted: bool,
}

impl Vm {
    pub fn new(memory: BlockMemory, entry: u64) -> Vm {
        Vm {
            registers: RegisterFile::new(),
            memory,
            pc: entry,
            halted: false,
        }
    }

    pub fn run(&mut self, io: &mut impl SyscallIo) -> Result<(), RuntimeError> {
        while !self.halted {
            self.step(io)?;
        }
        Ok(())
    }

    pub fn step(&mut self, io: &mut impl SyscallIo) -> Result<(), RuntimeError> {
        let word = self.memory.read_word(self.pc)?;
        let (opcode, fields) = Instruction(word).decode()?;
        let result = self.execute(opcode, fields, io)?;
        match result {
            TickResult::Next => self.pc += WORD_BYTES as u64,
            TickResult::Jump(target) => self.pc = target,
            TickResult::Halt => self.halted = true,
        }
        Ok(())
    }

    fn execute(
        &mut self,
        opcode: Opcode,
        fields: Fields,
        io: &mut impl SyscallIo,
    ) -> Result<TickResult, RuntimeError> {
        use Opcode::*;
        match (opcode, fields) {
            (Add, Fields::A { dest, a, b }) => self.alu_add(dest, a, b),
            (Sub, Fields::A { dest, a, b }) => self.alu_sub(dest, a, b),
            (And, Fields::A { dest, a, b }) => self.alu_logic(dest, a, b, |x, y| x & y),
            (Or, Fields::A { dest, a, b }) => self.alu_logic(dest, a, b, |x, y| x | y),
            (Xor, Fields::A { dest, a, b }) => self.alu_logic(dest, a, b, |x, y| x ^ y),
            (Lsl, Fields::A { dest, a, b }) => self.alu_shift(dest, a, b, true),
            (Lsr, Fields::A { dest, a, b }) => self.alu_shift(dest, a, b, false),

            (Addi, Fields::Ai { dest, a, imm }) => self.alu_addi(dest, a, imm),
            (Subi, Fields::Ai { dest, a, imm }) => self.alu_subi(dest, a, imm),

            (Ldreg, Fields::M { a, b, imm }) => self.load(a, b, imm, 8),
            (Ldword, Fields::M { a, b, imm }) => self.load(a, b, imm, 4),
            (Ldhwrd, Fields::M { a, b, imm }) => self.load(a, b, imm, 2),
            (Ldbyte, Fields::M { a, b, imm }) => self.load(a, b, imm, 1),
            (Streg, Fields::M { a, b, imm }) => self.store(a, b, imm, 8),
            (Stword, Fields::M { a, b, imm }) => self.store(a, b, imm, 4),
            (Sthwrd, Fields::M { a, b, imm }) => self.store(a, b, imm, 2),
            (Stbyte, Fields::M { a, b, imm }) => self.store(a, b, imm, 1),

            (Movz, Fields::E { dest, imm }) => {
                self.registers.set(dest, imm as u64);
                Ok(TickResult::Next)
            }
            (Movk, Fields::E { dest, imm }) => {
                let current = self.registers.get(dest);
                self.registers
                    .set(dest, (current & !0xFFFF) | imm as u64);
                Ok(TickResult::Next)
            }

            (B, Fields::Bi { offset }) => Ok(self.branch_offset(offset)),
            (Breg, Fields::B { a }) => Ok(TickResult::Jump(self.registers.get(a))),
            (Blr, Fields::B { a }) => {
                self.registers.set_rp(self.pc + WORD_BYTES as u64);
                Ok(TickResult::Jump(self.registers.get(a)))
            }
            (Bl, Fields::Bi { offset }) => {
                self.registers.set_rp(self.pc + WORD_BYTES as u64);
                Ok(self.branch_offset(offset))
            }
            (BEq, Fields::Bi { offset }) => Ok(self.branch_if(self.registers.zero, offset)),
            (BNeq, Fields::Bi { offset }) => Ok(self.branch_if(!self.registers.zero, offset)),
            (BLt, Fields::Bi { offset }) => {
                Ok(self.branch_if(self.registers.negative != self.registers.carry, offset))
            }
            (BGe, Fields::Bi { offset }) => {
                Ok(self.branch_if(self.registers.negative == self.registers.carry, offset))
            }
            (BGt, Fields::Bi { offset }) => Ok(self.branch_if(
                !self.registers.zero && self.registers.negative == self.registers.carry,
                offset,
            )),
            (BLe, Fields::Bi { offset }) => Ok(self.branch_if(
                !(!self.registers.zero && self.registers.negative == self.registers.carry),
                offset,
            )),

            (Push, Fields::R { a }) => {
                let sp = self.registers.sp() - 8;
                self.memory.write_word(sp, self.registers.get(a) as u32)?;
                self.memory
                    .write_word(sp + 4, (self.registers.get(a) >> 32) as u32)?;
                self.registers.set_sp(sp);
                Ok(TickResult::Next)
            }
            (Pop, Fields::R { a }) => {
                let sp = self.registers.sp();
                let lo = self.memory.read_word(sp)? as u64;
                let hi = self.memory.read_word(sp + 4)? as u64;
                self.registers.set(a, lo | (hi << 32));
                self.registers.set_sp(sp + 8);
                Ok(TickResult::Next)
            }

            (Syscall, Fields::O) => {
                self.syscall(io);
                Ok(TickResult::Next)
            }
            (Halt, Fields::O) => Ok(TickResult::Halt),
            (Noop, Fields::O) => Ok(TickResult::Next),

            _ => unreachable!("decode() guarantees fields match the opcode's shape"),
        }
    }

    fn branch_offset(&self, offset: i16) -> TickResult {
        let delta = offset as i64 * WORD_BYTES as i64;
        TickResult::Jump((self.pc as i64 + delta) as u64)
    }

    fn branch_if(&self, condition: bool, offset: i16) -> TickResult {
        if condition {
            self.branch_offset(offset)
        } else {
            TickResult::Next
        }
    }

    fn alu_add(&mut self, dest: u8, a: u8, b: u8) -> Result<TickResult, RuntimeError> {
        let lhs = self.registers.get(a);
        let rhs = self.registers.get(b);
        let (result, carry) = lhs.overflowing_add(rhs);
        self.registers.set(dest, result);
        self.registers.set_zn(result);
        self.registers.carry = carry;
        Ok(TickResult::Next)
    }

    fn alu_sub(&mut self, dest: u8, a: u8, b: u8) -> Result<TickResult, RuntimeError> {
        let lhs = self.registers.get(a);
        let rhs = self.registers.get(b);
        let (result, borrow) = lhs.overflowing_sub(rhs);
        self.registers.set(dest, result);
        self.registers.set_zn(result);
        self.registers.carry = !borrow;
        Ok(TickResult::Next)
    }

    fn alu_addi(&mut self, dest: u8, a: u8, imm: u16) -> Result<TickResult, RuntimeError> {
        let lhs = self.registers.get(a);
        let (result, carry) = lhs.overflowing_add(imm as u64);
        self.registers.set(dest, result);
        self.registers.set_zn(result);
        self.registers.carry = carry;
        Ok(TickResult::Next)
    }

    fn alu_subi(&mut self, dest: u8, a: u8, imm: u16) -> Result<TickResult, RuntimeError> {
        let lhs = self.registers.get(a);
        let (result, borrow) = lhs.overflowing_sub(imm as u64);
        self.registers.set(dest, result);
        self.registers.set_zn(result);
        self.registers.carry = !borrow;
        Ok(TickResult::Next)
    }

    fn alu_logic(
        &mut self,
        dest: u8,
        a: u8,
        b: u8,
        op: impl Fn(u64, u64) -> u64,
    ) -> Result<TickResult, RuntimeError> {
        let result = op(self.registers.get(a), self.registers.get(b));
        self.registers.set(dest, result);
        self.registers.set_zn(result);
        self.registers.carry = false;
        Ok(TickResult::Next)
    }

    fn alu_shift(
        &mut self,
        dest: u8,
        a: u8,
        b: u8,
        left: bool,
    ) -> Result<TickResult, RuntimeError> {
        let shift = (self.registers.get(b) & 0x3F) as u32;
        let lhs = Wrapping(self.registers.get(a));
        let result = if left { (lhs << shift as usize).0 } else { (lhs >> shift as usize).0 };
        self.registers.set(dest, result);
        self.registers.set_zn(result);
        self.registers.carry = false;
        Ok(TickResult::Next)
    }

    fn load(&mut self, dest: u8, base: u8, imm: i16, size: u8) -> Result<TickResult, RuntimeError> {
        let address = (self.registers.get(base) as i64 + imm as i64) as u64;
        if address > i32::MAX as u64 {
            return Err(RuntimeError::AddressOverflow(address));
        }
        let value = match size {
            1 => self.memory.read_byte(address)? as u64,
            2 => self.memory.read_halfword(address)? as u64,
            4 => self.memory.read_word(address)? as u64,
            8 => {
                let lo = self.memory.read_word(address)? as u64;
                let hi = self.memory.read_word(address + 4)? as u64;
                lo | (hi << 32)
            }
            _ => unreachable!(),
        };
        self.registers.set(dest, value);
        Ok(TickResult::Next)
    }

    fn store(&mut self, src: u8, base: u8, imm: i16, size: u8) -> Result<TickResult, RuntimeError> {
        let address = (self.registers.get(base) as i64 + imm as i64) as u64;
        if address > i32::MAX as u64 {
            return Err(RuntimeError::AddressOverflow(address));
        }
        let value = self.registers.get(src);
        match size {
            1 => self.memory.write_byte(address, value as u8)?,
            2 => self.memory.write_halfword(address, value as u16)?,
            4 => self.memory.write_word(address, value as u32)?,
            8 => {
                self.memory.write_word(address, value as u32)?;
                self.memory.write_word(address + 4, (value >> 32) as u32)?;
            }
            _ => unreachable!(),
        }
        Ok(TickResult::Next)
    }

    fn syscall(&mut self, io: &mut impl SyscallIo) {
        let number = self.registers.get(9);
        let fd = self.registers.get(1);
        let buf_ptr = self.registers.get(2);
        let count = self.registers.get(3) as usize;

        match number {
            SYSCALL_READ => {
                let mut scratch = vec![0u8; count];
                match io.read(fd, &mut scratch) {
                    Ok(n) => {
                        if self.memory.write_bytes(buf_ptr, &scratch[..n]).is_err() {
                            self.registers.set(8, ERRNO_IO);
                            return;
                        }
                        self.registers.set(7, n as u64);
                    }
                    Err(_) => self.registers.set(8, ERRNO_BAD_FD),
                }
            }
            SYSCALL_WRITE => match self.memory.read_bytes(buf_ptr, count) {
                Ok(data) => match io.write(fd, data) {
                    Ok(n) => self.registers.set(7, n as u64),
                    Err(_) => self.registers.set(8, ERRNO_BAD_FD),
                },
                Err(_) => self.registers.set(8, ERRNO_IO),
            },
            _ => self.registers.set(8, ERRNO_BAD_FD),
        }
    }
}
