use rand::Rng;

use super::{AluOp, Chip8Error, Cpu, CycleResult, Instruction, Keypad};
use crate::{GLYPH_HEIGHT, u4};

/// Highest address reachable with 12 bits; Fx1E flags overflow past it.
const ADDRESS_SPACE_END: u32 = 0x0FFF;

impl Cpu {
    /// Executes one decoded instruction. PC already points past it.
    pub(crate) fn execute(
        &mut self,
        address: u16,
        instruction: Instruction,
        keypad: &dyn Keypad,
    ) -> Result<CycleResult, Chip8Error> {
        match instruction {
            Instruction::ClearDisplay => {
                self.display.clear();
            }
            Instruction::Return => {
                self.registers.pc = self.stack.pop();
            }
            Instruction::Jump { nnn } => {
                self.registers.pc = nnn;
            }
            Instruction::Call { nnn } => {
                self.stack.push(self.registers.pc);
                self.registers.pc = nnn;
            }
            Instruction::SkipRegEqualImm { x, nn } => {
                self.skip_if(self.registers[x] == nn);
            }
            Instruction::SkipRegNotEqualImm { x, nn } => {
                self.skip_if(self.registers[x] != nn);
            }
            Instruction::SkipRegEqualReg { x, y } => {
                self.skip_if(self.registers[x] == self.registers[y]);
            }
            Instruction::SkipRegNotEqualReg { x, y } => {
                self.skip_if(self.registers[x] != self.registers[y]);
            }
            Instruction::SetRegImm { x, nn } => {
                self.registers[x] = nn;
            }
            Instruction::AddRegImm { x, nn } => {
                self.registers[x] = self.registers[x].wrapping_add(nn);
            }
            Instruction::Alu { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Instruction::SetIndexImm { nnn } => {
                self.registers.i = nnn;
            }
            Instruction::JumpWithOffset { x, nnn } => {
                let offset = if self.quirks.jump_uses_vx {
                    self.registers[x]
                } else {
                    self.registers.v[0]
                };
                self.registers.pc = nnn.wrapping_add(offset.into());
            }
            Instruction::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.registers[x] = rand_byte & nn;
            }
            Instruction::Draw { x, y, n } => {
                self.execute_draw(x, y, n);
            }
            Instruction::SkipIfPressed { x } => {
                let key = u4::truncate(self.registers[x]);
                self.skip_if(keypad.is_key_down(key));
            }
            Instruction::SkipIfNotPressed { x } => {
                let key = u4::truncate(self.registers[x]);
                self.skip_if(!keypad.is_key_down(key));
            }
            Instruction::ReadDelayTimer { x } => {
                self.registers[x] = u8::try_from(self.delay_timer.value()).unwrap_or(u8::MAX);
            }
            Instruction::WaitForKey { x } => {
                return Ok(self.execute_wait_for_key(address, x, keypad));
            }
            Instruction::SetDelayTimer { x } => {
                self.delay_timer.set_value(self.registers[x].into());
            }
            Instruction::SetSoundTimer { x } => {
                self.sound_timer = self.registers[x];
            }
            Instruction::AddIndexReg { x } => {
                let vx = self.registers[x];
                let sum = u32::from(self.registers.i) + u32::from(vx);
                self.registers.i = self.registers.i.wrapping_add(vx.into());
                // Only ever sets VF; a sum in range leaves it untouched
                if self.quirks.add_index_sets_overflow && sum > ADDRESS_SPACE_END {
                    self.registers.set_flag(true);
                }
            }
            Instruction::FontChar { x } => {
                let digit = u16::from(self.registers[x] & 0x0F);
                self.registers.i = self.font_address.wrapping_add(digit * GLYPH_HEIGHT);
            }
            Instruction::Bcd { x } => {
                let value = self.registers[x];
                let addr = self.index_address(0);
                self.memory
                    .write(addr, &[value / 100, (value / 10) % 10, value % 10]);
            }
            Instruction::StoreRegs { x } => {
                for reg in 0..=usize::from(x) {
                    if self.quirks.store_load_increments_index {
                        let addr = self.index_address(0);
                        self.memory.write(addr, &[self.registers.v[reg]]);
                        self.registers.i = self.registers.i.wrapping_add(1);
                    } else {
                        let addr = self.index_address(reg);
                        self.memory.write(addr, &[self.registers.v[reg]]);
                    }
                }
            }
            Instruction::LoadRegs { x } => {
                for reg in 0..=usize::from(x) {
                    if self.quirks.store_load_increments_index {
                        self.registers.v[reg] = self.memory.read(self.index_address(0));
                        self.registers.i = self.registers.i.wrapping_add(1);
                    } else {
                        self.registers.v[reg] = self.memory.read(self.index_address(reg));
                    }
                }
            }
            Instruction::Unknown(opcode) => {
                return Err(Chip8Error::UnknownOpcode { opcode, address });
            }
        };

        Ok(CycleResult::Continue)
    }

    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        let vx = self.registers[x];
        let vy = self.registers[y];

        // VF is written last so it wins when x is VF
        match op {
            AluOp::Set => self.registers[x] = vy,
            AluOp::Or => {
                self.registers[x] = vx | vy;
                self.reset_flag_after_logic();
            }
            AluOp::And => {
                self.registers[x] = vx & vy;
                self.reset_flag_after_logic();
            }
            AluOp::Xor => {
                self.registers[x] = vx ^ vy;
                self.reset_flag_after_logic();
            }
            AluOp::Add => {
                let (res, overflow) = vx.overflowing_add(vy);
                self.registers[x] = res;
                self.registers.set_flag(overflow);
            }
            AluOp::Sub => {
                let (res, borrow) = vx.overflowing_sub(vy);
                self.registers[x] = res;
                self.registers.set_flag(!borrow);
            }
            AluOp::SubReverse => {
                let (res, borrow) = vy.overflowing_sub(vx);
                self.registers[x] = res;
                self.registers.set_flag(!borrow);
            }
            AluOp::ShiftRight => {
                let source = self.shift_source(vx, vy);
                self.registers[x] = source >> 1;
                self.registers.set_flag(source & 0x01 != 0);
            }
            AluOp::ShiftLeft => {
                let source = self.shift_source(vx, vy);
                self.registers[x] = source << 1;
                self.registers.set_flag(source & 0x80 != 0);
            }
        }
    }

    fn shift_source(&self, vx: u8, vy: u8) -> u8 {
        if self.quirks.assign_before_shift { vy } else { vx }
    }

    fn reset_flag_after_logic(&mut self) {
        if self.quirks.logic_resets_flag {
            self.registers.set_flag(false);
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) {
        let sprite: Vec<u8> = (0..usize::from(n))
            .map(|row| self.memory.read(self.index_address(row)))
            .collect();

        let collision = self.display.draw(
            self.registers[x].into(),
            self.registers[y].into(),
            &sprite,
        );
        self.registers.set_flag(collision);
    }

    fn execute_wait_for_key(&mut self, address: u16, x: u4, keypad: &dyn Keypad) -> CycleResult {
        if let Some(key) = u4::all().find(|&key| keypad.is_key_down(key)) {
            self.registers[x] = key.get();
            return CycleResult::Continue;
        }

        // Repeat this instruction until a key is down
        self.registers.pc = address;
        CycleResult::WaitingForKey
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc = self.registers.pc.wrapping_add(2);
        }
    }

    /// Memory address `I + offset`, without 16-bit wraparound.
    fn index_address(&self, offset: usize) -> usize {
        usize::from(self.registers.i) + offset
    }
}
