use std::ops::{Index, IndexMut};

use crate::u4;

/// Flags register, also usable as a regular operand.
pub const VF: u4 = u4::MAX;

/// CPU register file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    /// General-purpose registers V0-VF.
    pub v: [u8; 16],
    /// Index register.
    pub i: u16,
    /// Program counter: address of the next instruction to fetch.
    pub pc: u16,
}

impl Registers {
    pub fn new(pc: u16) -> Self {
        Self {
            pc,
            ..Self::default()
        }
    }

    /// Writes VF. Flag-producing instructions call this after their
    /// destination write so the flag wins when the destination is VF.
    pub fn set_flag(&mut self, flag: bool) {
        self[VF] = u8::from(flag);
    }

    pub fn flag(&self) -> u8 {
        self[VF]
    }
}

impl Index<u4> for Registers {
    type Output = u8;

    fn index(&self, index: u4) -> &Self::Output {
        &self.v[usize::from(index)]
    }
}

impl IndexMut<u4> for Registers {
    fn index_mut(&mut self, index: u4) -> &mut Self::Output {
        &mut self.v[usize::from(index)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vf_is_both_operand_and_flag() {
        let mut registers = Registers::new(0x200);
        registers[VF] = 0x42;
        assert_eq!(registers.v[15], 0x42);

        registers.set_flag(true);
        assert_eq!(registers.flag(), 1);
        registers.set_flag(false);
        assert_eq!(registers[u4::new(0xF)], 0);
    }

    #[test]
    fn new_only_sets_pc() {
        let registers = Registers::new(0x300);
        assert_eq!(registers.pc, 0x300);
        assert_eq!(registers.i, 0);
        assert_eq!(registers.v, [0; 16]);
    }
}
