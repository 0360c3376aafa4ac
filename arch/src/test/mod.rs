mod branches;
mod encoding;
mod memory;
mod registers;
mod stack;

use crate::instruction::{Fields, Instruction};
use crate::memory::BlockMemory;
use crate::opcode::Opcode;
use crate::vm::{SyscallIo, Vm};
use std::io;

pub struct NullIo;

impl SyscallIo for NullIo {
    fn read(&mut self, _fd: u64, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "no fds in test harness"))
    }

    fn write(&mut self, _fd: u64, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "no fds in test harness"))
    }
}

/// Builds a `Vm` with a single RAM block at address 0 holding `words`,
/// entry point at 0.
pub fn vm_with_program(words: &[(Opcode, Fields)]) -> Vm {
    let mut bytes = Vec::with_capacity(words.len() * 4 + 256);
    for (opcode, fields) in words {
        bytes.extend_from_slice(&Instruction::encode(*opcode, *fields).0.to_le_bytes());
    }
    bytes.resize(bytes.len() + 256, 0);

    let mut memory = BlockMemory::new();
    memory.mount(0, bytes).unwrap();
    Vm::new(memory, 0)
}

pub fn run_to_halt(vm: &mut Vm) {
    let mut io = NullIo;
    vm.run(&mut io).expect("program should run to completion");
}
