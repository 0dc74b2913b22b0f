/// Per-voxel metadata for one section: 4096 4-bit values in 2048 bytes.
///
/// Index `i` lives in byte `i / 2`; even indices use the low nibble, odd
/// indices the high nibble.
#[derive(Clone, PartialEq, Eq)]
pub struct NibbleArray {
    data: Box<[u8; NIBBLE_BYTES]>,
}

const NIBBLE_BYTES: usize = 2048;

impl NibbleArray {
    pub const BYTES: usize = NIBBLE_BYTES;

    pub fn new() -> Self {
        Self {
            data: Box::new([0; Self::BYTES]),
        }
    }

    pub fn get(&self, index: usize) -> u8 {
        let byte = self.data[index >> 1];
        if index & 1 == 0 { byte & 0x0F } else { byte >> 4 }
    }

    /// Stores the low 4 bits of `value`.
    pub fn set(&mut self, index: usize, value: u8) {
        let value = value & 0x0F;
        let byte = &mut self.data[index >> 1];
        if index & 1 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl Default for NibbleArray {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NibbleArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = self.data.iter().filter(|&&b| b != 0).count();
        write!(f, "NibbleArray({} nonzero bytes)", set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_order() {
        let mut nibbles = NibbleArray::new();
        nibbles.set(0, 0xA);
        nibbles.set(1, 0xB);
        assert_eq!(nibbles.as_bytes()[0], 0xBA);
        assert_eq!(nibbles.get(0), 0xA);
        assert_eq!(nibbles.get(1), 0xB);
    }

    #[test]
    fn test_set_keeps_neighbour() {
        let mut nibbles = NibbleArray::new();
        nibbles.set(4094, 0x3);
        nibbles.set(4095, 0xF);
        nibbles.set(4094, 0x1F); // high bits dropped
        assert_eq!(nibbles.get(4094), 0xF);
        assert_eq!(nibbles.get(4095), 0xF);
        assert_eq!(nibbles.as_bytes()[2047], 0xFF);
        assert_eq!(nibbles.as_bytes().len(), 2048);
    }
}
