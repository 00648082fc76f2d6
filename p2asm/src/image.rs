use byteorder::{ByteOrder, LittleEndian};

// Hub memory, 1 MiB
pub const MEM_SIZE: usize = 0x100000;

// First hub address, below this addresses are cog longs
pub const HUB_ADDR0: u32 = 0x400;


// Binary image, byte/word/long addressable, little endian
//
// Writes past the end are dropped, reads past the end are 0.
#[derive(Clone)]
pub struct Image {
    mem: Vec<u8>,
}

impl Default for Image {
    fn default() -> Image {
        Image::new()
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Image({} bytes)", self.mem.len())
    }
}

impl Image {
    pub fn new() -> Image {
        Image { mem: vec![0; MEM_SIZE] }
    }

    pub fn clear(&mut self) {
        for b in self.mem.iter_mut() {
            *b = 0;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mem
    }

    pub fn read_byte(&self, addr: usize) -> u8 {
        self.mem.get(addr).cloned().unwrap_or(0)
    }

    pub fn read_word(&self, addr: usize) -> u16 {
        match self.mem.get(addr..addr + 2) {
            Some(buf) => LittleEndian::read_u16(buf),
            None => 0,
        }
    }

    pub fn read_long(&self, addr: usize) -> u32 {
        match self.mem.get(addr..addr + 4) {
            Some(buf) => LittleEndian::read_u32(buf),
            None => 0,
        }
    }

    pub fn write_long(&mut self, addr: usize, data: u32) -> bool {
        match self.mem.get_mut(addr..addr + 4) {
            Some(buf) => {
                LittleEndian::write_u32(buf, data);
                true
            },
            None => false,
        }
    }

    pub fn write_bytes(&mut self, addr: usize, data: &[u8]) -> bool {
        match self.mem.get_mut(addr..addr + data.len()) {
            Some(buf) => {
                buf.copy_from_slice(data);
                true
            },
            None => false,
        }
    }
}

// Program counter after `bytes` bytes, cog counts longs and rounds up
pub fn step(pc: u32, bytes: u32) -> u32 {
    if pc < HUB_ADDR0 { pc + (bytes + 3) / 4 } else { pc + bytes }
}

// Byte address of a program counter, cog longs sit at pc * 4
pub fn byte_addr(pc: u32) -> usize {
    if pc < HUB_ADDR0 { pc as usize * 4 } else { pc as usize }
}


#[cfg(test)]
mod image_tests {
    use super::*;

    #[test]
    fn test_little_endian() {
        let mut img = Image::new();
        assert!(img.write_long(0, 0x12345678));
        assert_eq!(img.read_byte(0), 0x78);
        assert_eq!(img.read_byte(3), 0x12);
        assert_eq!(img.read_word(2), 0x1234);

        assert!(img.write_bytes(8, &[0xef, 0xbe]));
        assert_eq!(img.read_long(8), 0xbeef);
    }

    #[test]
    fn test_out_of_range() {
        let mut img = Image::new();
        assert!(!img.write_long(MEM_SIZE - 2, 1));
        assert!(!img.write_bytes(MEM_SIZE, &[1]));
        assert!(img.write_bytes(MEM_SIZE - 1, &[0xaa]));
        assert_eq!(img.read_long(MEM_SIZE - 2), 0);
        assert_eq!(img.read_byte(MEM_SIZE - 1), 0xaa);
    }

    #[test]
    fn test_byte_addr() {
        assert_eq!(byte_addr(0), 0);
        assert_eq!(byte_addr(0x3ff), 0xffc);
        assert_eq!(byte_addr(0x400), 0x400);
        assert_eq!(byte_addr(0x1234), 0x1234);
    }

    #[test]
    fn test_step() {
        assert_eq!(step(0, 4), 1);
        assert_eq!(step(0, 5), 2);
        assert_eq!(step(0x10, 0), 0x10);
        assert_eq!(step(0x400, 4), 0x404);
        assert_eq!(step(0x400, 3), 0x403);
    }
}
