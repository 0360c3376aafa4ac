use byteorder::ByteOrder;
use thiserror::Error;
use util::MemEndian;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum MemoryError {
    #[error("address {address:#x} (size {size}) is not backed by any memory block")]
    OutOfBounds { address: u64, size: usize },
    #[error("block at {start:#x}..{end:#x} overlaps existing block at {other_start:#x}..{other_end:#x}")]
    Overlap {
        start: u64,
        end: u64,
        other_start: u64,
        other_end: u64,
    },
}

/// A single contiguous, owned range of byte-addressable memory.
struct Block {
    start: u64,
    bytes: Vec<u8>,
}

impl Block {
    fn end(&self) -> u64 {
        self.start + self.bytes.len() as u64
    }

    fn contains_range(&self, address: u64, size: usize) -> bool {
        address >= self.start && address + size as u64 <= self.end()
    }
}

/// Byte-addressable memory made up of a list of non-overlapping blocks.
/// An access that does not fall entirely within one block is a fatal
/// [`MemoryError::OutOfBounds`] — there is no implicit zero-filled
/// address space between blocks.
#[derive(Default)]
pub struct BlockMemory {
    blocks: Vec<Block>,
}

impl BlockMemory {
    pub fn new() -> BlockMemory {
        BlockMemory { blocks: Vec::new() }
    }

    pub fn mount(&mut self, start: u64, bytes: Vec<u8>) -> Result<(), MemoryError> {
        let end = start + bytes.len() as u64;
        for block in &self.blocks {
            if start < block.end() && block.start < end {
                return Err(MemoryError::Overlap {
                    start,
                    end,
                    other_start: block.start,
                    other_end: block.end(),
                });
            }
        }
        self.blocks.push(Block { start, bytes });
        Ok(())
    }

    fn find(&self, address: u64, size: usize) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.contains_range(address, size))
    }

    fn slice(&self, address: u64, size: usize) -> Result<&[u8], MemoryError> {
        let idx = self
            .find(address, size)
            .ok_or(MemoryError::OutOfBounds { address, size })?;
        let block = &self.blocks[idx];
        let offset = (address - block.start) as usize;
        Ok(&block.bytes[offset..offset + size])
    }

    fn slice_mut(&mut self, address: u64, size: usize) -> Result<&mut [u8], MemoryError> {
        let idx = self
            .find(address, size)
            .ok_or(MemoryError::OutOfBounds { address, size })?;
        let block = &mut self.blocks[idx];
        let offset = (address - block.start) as usize;
        Ok(&mut block.bytes[offset..offset + size])
    }

    pub fn read_byte(&self, address: u64) -> Result<u8, MemoryError> {
        Ok(self.slice(address, 1)?[0])
    }

    pub fn write_byte(&mut self, address: u64, value: u8) -> Result<(), MemoryError> {
        self.slice_mut(address, 1)?[0] = value;
        Ok(())
    }

    pub fn read_halfword(&self, address: u64) -> Result<u16, MemoryError> {
        Ok(MemEndian::read_u16(self.slice(address, 2)?))
    }

    pub fn write_halfword(&mut self, address: u64, value: u16) -> Result<(), MemoryError> {
        MemEndian::write_u16(self.slice_mut(address, 2)?, value);
        Ok(())
    }

    pub fn read_word(&self, address: u64) -> Result<u32, MemoryError> {
        Ok(MemEndian::read_u32(self.slice(address, 4)?))
    }

    pub fn write_word(&mut self, address: u64, value: u32) -> Result<(), MemoryError> {
        MemEndian::write_u32(self.slice_mut(address, 4)?, value);
        Ok(())
    }

    /// Reads `len` bytes starting at `address`, used by the `read` syscall's
    /// destination buffer and by `write`'s source buffer.
    pub fn read_bytes(&self, address: u64, len: usize) -> Result<&[u8], MemoryError> {
        self.slice(address, len)
    }

    pub fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<(), MemoryError> {
        self.slice_mut(address, data.len())?.copy_from_slice(data);
        Ok(())
    }
}
