use std::io::{Read, Write};

use arch::BlockMemory;
use byteorder::ByteOrder;
use util::{FileEndian, MemEndian};

use crate::error::Result;

/// A flat executable image: raw instruction/data bytes with no header,
/// written using the project's shared file byte order. Loaded into VM
/// memory starting at address 0.
pub struct Image(pub Vec<u8>);

impl Image {
    pub fn read<R: Read>(mut reader: R) -> Result<Image> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Image(bytes))
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.0)?;
        Ok(())
    }

    /// Mounts the image as VM memory starting at `base`, translating every
    /// 4-byte word from the on-disk byte order to the VM's in-memory byte
    /// order as it goes (the two are independent constants by design, see
    /// [`util::FileEndian`]/[`util::MemEndian`]).
    pub fn mount_at(&self, memory: &mut BlockMemory, base: u64) -> Result<()> {
        let mut translated = vec![0u8; self.0.len()];
        for (chunk, out) in self.0.chunks(4).zip(translated.chunks_mut(4)) {
            let mut padded = [0u8; 4];
            padded[..chunk.len()].copy_from_slice(chunk);
            let value = FileEndian::read_u32(&padded);
            MemEndian::write_u32(out, value);
        }
        memory
            .mount(base, translated)
            .map_err(|e| crate::error::Error::Malformed(e.to_string()))
    }
}
