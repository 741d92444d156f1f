use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};

use super::{
    Chip8Error, Config, CycleResult, Display, Instruction, Keypad, Memory, Opcode, Quirks,
    Registers, Stack, Timer,
};

/// CHIP-8 instruction engine.
///
/// Owns every piece of machine state: memory, display, stack, registers and
/// both clocks.
pub struct Cpu {
    pub(crate) memory: Memory,
    pub(crate) display: Display,
    pub(crate) stack: Stack,
    pub(crate) registers: Registers,

    /// Delay timer: counts down at its own frequency, readable by Fx07.
    pub(crate) delay_timer: Timer,
    /// Gates how many instructions run per second.
    pub(crate) instruction_timer: Timer,
    /// Set by Fx18; never counts down and produces no sound.
    pub(crate) sound_timer: u8,

    pub(crate) quirks: Quirks,
    pub(crate) font_address: u16,
    pub(crate) rng: StdRng,
}

impl Cpu {
    /// Builds a CPU with cleared state and PC at the program address.
    ///
    /// Fails if `config` does not pass [`Config::validate`].
    pub fn new(config: &Config) -> Result<Self, Chip8Error> {
        config.validate()?;

        let rng = match config.cpu.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            memory: Memory::new(config.memory.size),
            display: Display::new(config.display.width, config.display.height),
            stack: Stack::new(config.cpu.stack_initial_size),
            registers: Registers::new(config.memory.program_address),
            delay_timer: Timer::new(config.cpu.delay_timer_frequency),
            instruction_timer: Timer::new(config.cpu.instruction_frequency),
            sound_timer: 0,
            quirks: config.cpu.quirks,
            font_address: config.memory.font_address,
            rng,
        })
    }

    /// Feeds `delta` to both clocks and runs one instruction if the
    /// instruction clock stepped.
    ///
    /// Returns `Ok(None)` when no instruction was due.
    pub fn tick(
        &mut self,
        delta: Duration,
        keypad: &dyn Keypad,
    ) -> Result<Option<CycleResult>, Chip8Error> {
        self.delay_timer.tick(delta);

        if !self.instruction_timer.tick(delta) {
            return Ok(None);
        }

        self.cycle(keypad).map(Some)
    }

    /// Executes a single CPU cycle (fetch, decode, execute).
    pub fn cycle(&mut self, keypad: &dyn Keypad) -> Result<CycleResult, Chip8Error> {
        let address = self.registers.pc;
        let opcode = self.fetch();
        let instruction = Instruction::decode(opcode);

        log::trace!("{address:03X}: {opcode:04X} {instruction:?}");

        self.execute(address, instruction, keypad)
    }

    /// Reads the big-endian opcode at PC and advances PC past it.
    ///
    /// PC wraps around the end of memory, so fetching the last byte pairs it
    /// with the byte at address 0.
    pub(crate) fn fetch(&mut self) -> Opcode {
        let size = self.memory.len();
        let pc = usize::from(self.registers.pc) % size;

        let high = self.memory.read(pc);
        let low = self.memory.read((pc + 1) % size);
        self.registers.pc = ((pc + 2) % size) as u16;

        Opcode::decode(u16::from_be_bytes([high, low]))
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn delay_timer(&self) -> &Timer {
        &self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }
}
