use std::io::{self, Read, Write};

use arch::SyscallIo;

/// Binds `SYSCALL`'s read/write to the process's real standard streams.
/// The VM starts with exactly the three standard descriptors mapped;
/// there is no `open`/`close` syscall in this instruction set.
pub struct StdIo;

impl SyscallIo for StdIo {
    fn read(&mut self, fd: u64, buf: &mut [u8]) -> io::Result<usize> {
        match fd {
            0 => io::stdin().read(buf),
            _ => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn write(&mut self, fd: u64, buf: &[u8]) -> io::Result<usize> {
        match fd {
            1 => io::stdout().write(buf),
            2 => io::stderr().write(buf),
            _ => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}
