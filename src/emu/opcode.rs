use std::fmt;

use crate::u4;

/// One 16-bit instruction word split into its addressing-mode fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub raw: u16,
    /// Top nibble, selects the instruction family.
    pub f: u4,
    pub x: u4,
    pub y: u4,
    pub n: u4,
    pub nn: u8,
    pub nnn: u16,
}

impl Opcode {
    pub fn decode(raw: u16) -> Self {
        Self {
            raw,
            f: u4::truncate((raw >> 12) as u8),
            x: u4::truncate((raw >> 8) as u8),
            y: u4::truncate((raw >> 4) as u8),
            n: u4::truncate(raw as u8),
            nn: (raw & 0x00FF) as u8,
            nnn: raw & 0x0FFF,
        }
    }
}

impl fmt::UpperHex for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.raw, f)
    }
}

/// CHIP-8 instructions.
///
/// The fields (x, y, n, nn, nnn) correspond to the operands encoded in the opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - Clear the display.
    ClearDisplay,
    /// 00EE - Return from a subroutine.
    Return,
    /// 1nnn - Jump to location nnn.
    Jump { nnn: u16 },
    /// 2nnn - Call subroutine at nnn.
    Call { nnn: u16 },

    /// 3xnn - Skip next instruction if Vx == nn.
    SkipRegEqualImm { x: u4, nn: u8 },
    /// 4xnn - Skip next instruction if Vx != nn.
    SkipRegNotEqualImm { x: u4, nn: u8 },
    /// 5xy0 - Skip next instruction if Vx == Vy.
    SkipRegEqualReg { x: u4, y: u4 },

    /// 6xnn - Set Vx = nn.
    SetRegImm { x: u4, nn: u8 },
    /// 7xnn - Set Vx = Vx + nn, no carry.
    AddRegImm { x: u4, nn: u8 },

    /// 8xyN - ALU operations.
    Alu { x: u4, y: u4, op: AluOp },

    /// 9xy0 - Skip next instruction if Vx != Vy.
    SkipRegNotEqualReg { x: u4, y: u4 },

    /// Annn - Set I = nnn.
    SetIndexImm { nnn: u16 },
    /// Bnnn - Jump to location nnn + V0 (or + Vx).
    JumpWithOffset { x: u4, nnn: u16 },
    /// Cxnn - Set Vx = random byte AND nn.
    Random { x: u4, nn: u8 },
    /// Dxyn - Draw an n-row sprite from I at (Vx, Vy).
    Draw { x: u4, y: u4, n: u4 },

    /// Ex9E - Skip next instruction if key Vx is down.
    SkipIfPressed { x: u4 },
    /// ExA1 - Skip next instruction if key Vx is up.
    SkipIfNotPressed { x: u4 },

    /// Fx07 - Set Vx = delay timer.
    ReadDelayTimer { x: u4 },
    /// Fx0A - Wait for a key, store it in Vx.
    WaitForKey { x: u4 },
    /// Fx15 - Set delay timer = Vx.
    SetDelayTimer { x: u4 },
    /// Fx18 - Set sound timer = Vx.
    SetSoundTimer { x: u4 },
    /// Fx1E - Set I = I + Vx.
    AddIndexReg { x: u4 },
    /// Fx29 - Set I = location of the font glyph for digit Vx.
    FontChar { x: u4 },
    /// Fx33 - Store BCD of Vx at I, I+1, I+2.
    Bcd { x: u4 },
    /// Fx55 - Store V0 through Vx starting at I.
    StoreRegs { x: u4 },
    /// Fx65 - Load V0 through Vx starting at I.
    LoadRegs { x: u4 },

    Unknown(u16),
}

/// ALU operations for the 8xyN instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// 8xy0 - Vx = Vy
    Set,
    /// 8xy1 - Vx = Vx OR Vy
    Or,
    /// 8xy2 - Vx = Vx AND Vy
    And,
    /// 8xy3 - Vx = Vx XOR Vy
    Xor,
    /// 8xy4 - Vx = Vx + Vy, VF = carry
    Add,
    /// 8xy5 - Vx = Vx - Vy, VF = NOT borrow
    Sub,
    /// 8xy6 - Vx = Vx SHR 1, VF = shifted out bit
    ShiftRight,
    /// 8xy7 - Vx = Vy - Vx, VF = NOT borrow
    SubReverse,
    /// 8xyE - Vx = Vx SHL 1, VF = shifted out bit
    ShiftLeft,
}

impl Instruction {
    /// Selects the instruction an opcode encodes.
    ///
    /// Arms are matched top to bottom, so families sharing a leading nibble
    /// are told apart by their trailing nibbles before the catch-all.
    pub fn decode(opcode: Opcode) -> Self {
        let Opcode {
            raw, x, y, n, nn, nnn, ..
        } = opcode;

        match (opcode.f.get(), x.get(), y.get(), n.get()) {
            (0x0, 0x0, 0xE, 0x0) => Instruction::ClearDisplay,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x1, _, _, _) => Instruction::Jump { nnn },
            (0x2, _, _, _) => Instruction::Call { nnn },
            (0x3, _, _, _) => Instruction::SkipRegEqualImm { x, nn },
            (0x4, _, _, _) => Instruction::SkipRegNotEqualImm { x, nn },
            (0x5, _, _, 0x0) => Instruction::SkipRegEqualReg { x, y },
            (0x6, _, _, _) => Instruction::SetRegImm { x, nn },
            (0x7, _, _, _) => Instruction::AddRegImm { x, nn },
            (0x8, _, _, alu) => Instruction::Alu {
                x,
                y,
                op: match alu {
                    0x0 => AluOp::Set,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::ShiftRight,
                    0x7 => AluOp::SubReverse,
                    0xE => AluOp::ShiftLeft,
                    _ => return Instruction::Unknown(raw),
                },
            },
            (0x9, _, _, 0x0) => Instruction::SkipRegNotEqualReg { x, y },
            (0xA, _, _, _) => Instruction::SetIndexImm { nnn },
            (0xB, _, _, _) => Instruction::JumpWithOffset { x, nnn },
            (0xC, _, _, _) => Instruction::Random { x, nn },
            (0xD, _, _, _) => Instruction::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Instruction::SkipIfPressed { x },
            (0xE, _, 0xA, 0x1) => Instruction::SkipIfNotPressed { x },
            (0xF, _, 0x0, 0x7) => Instruction::ReadDelayTimer { x },
            (0xF, _, 0x0, 0xA) => Instruction::WaitForKey { x },
            (0xF, _, 0x1, 0x5) => Instruction::SetDelayTimer { x },
            (0xF, _, 0x1, 0x8) => Instruction::SetSoundTimer { x },
            (0xF, _, 0x1, 0xE) => Instruction::AddIndexReg { x },
            (0xF, _, 0x2, 0x9) => Instruction::FontChar { x },
            (0xF, _, 0x3, 0x3) => Instruction::Bcd { x },
            (0xF, _, 0x5, 0x5) => Instruction::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Instruction::LoadRegs { x },

            _ => Instruction::Unknown(raw),
        }
    }
}
