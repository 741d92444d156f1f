/// A 4-bit unsigned integer (nibble).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub struct u4(u8);

impl u4 {
    pub const MAX: u4 = u4(0x0F);

    /// Creates a new `u4` from a `u8`.
    ///
    /// Panics if the value is greater than 0x0F.
    pub const fn new(value: u8) -> Self {
        assert!(value <= 0x0F, "u4 value must be in range 0x0-0xF");
        Self(value)
    }

    /// Creates a `u4` from the low nibble of `value`, discarding the high nibble.
    pub const fn truncate(value: u8) -> Self {
        Self(value & 0x0F)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Iterates over every nibble value, 0x0 through 0xF.
    pub fn all() -> impl Iterator<Item = u4> {
        (0..=0x0F).map(u4)
    }
}

impl From<u4> for usize {
    fn from(v: u4) -> usize {
        v.0 as usize
    }
}
