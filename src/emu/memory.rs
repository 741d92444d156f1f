/// Flat byte-addressable RAM.
///
/// Every access is bounds checked: reads outside the backing store return 0
/// and writes outside it are dropped, one byte at a time.
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads the byte at `addr`, or 0 if `addr` is out of bounds.
    pub fn read(&self, addr: usize) -> u8 {
        self.data.get(addr).copied().unwrap_or(0)
    }

    /// Writes `bytes` at increasing addresses starting at `addr`.
    ///
    /// Each byte is checked on its own, so a write straddling the end of
    /// memory still stores the bytes that fit.
    pub fn write(&mut self, addr: usize, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            if let Some(slot) = addr
                .checked_add(offset)
                .and_then(|target| self.data.get_mut(target))
            {
                *slot = *byte;
            }
        }
    }

    /// Returns true if `len` bytes starting at `addr` all fit in memory.
    pub fn fits(&self, addr: usize, len: usize) -> bool {
        addr.checked_add(len).is_some_and(|end| end <= self.data.len())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
