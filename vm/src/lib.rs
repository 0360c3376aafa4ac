pub mod error;
pub mod io;

pub use error::{Error, Result};

use arch::{BlockMemory, RuntimeError, Vm};
use objfile::Image;

/// Default stack block: `0x10000` bytes ending just below the top of the
/// 32-bit address space, matching the fixed layout every program can rely
/// on without the assembler knowing the final link layout.
pub const STACK_BASE: u64 = 0x7FFF_0000;
pub const STACK_SIZE: u64 = 0x1_0000;

/// Loads `image` at address 0, mounts a stack block of `stack_size` bytes
/// at [`STACK_BASE`], and runs the program to completion.
pub fn run(image: &Image, stack_size: u64) -> Result<()> {
    let mut memory = BlockMemory::new();
    image
        .mount_at(&mut memory, 0)
        .map_err(|e| Error::Panic { pc: 0, cause: e.to_string() })?;
    memory
        .mount(STACK_BASE, vec![0u8; stack_size as usize])
        .map_err(|e| Error::Panic { pc: 0, cause: e.to_string() })?;

    let mut vm = Vm::new(memory, 0);
    vm.registers.set_sp(STACK_BASE + stack_size);

    let mut stdio = io::StdIo;
    vm.run(&mut stdio).map_err(|e| to_panic(&vm, e))
}

fn to_panic(vm: &Vm, error: RuntimeError) -> Error {
    Error::Panic {
        pc: vm.pc,
        cause: error.to_string(),
    }
}
