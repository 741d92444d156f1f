use super::Chip8Error;

/// Compatibility flags selecting between historically divergent opcode behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quirks {
    /// 8xy6/8xyE shift Vy into Vx instead of shifting Vx in place.
    pub assign_before_shift: bool,
    /// Bnnn jumps to nnn + Vx instead of nnn + V0.
    pub jump_uses_vx: bool,
    /// Fx1E sets VF when I + Vx leaves the 12-bit address space.
    pub add_index_sets_overflow: bool,
    /// Fx55/Fx65 leave I at I + x + 1.
    pub store_load_increments_index: bool,
    /// 8xy1/8xy2/8xy3 reset VF to 0.
    pub logic_resets_flag: bool,
}

impl Quirks {
    /// Original COSMAC VIP interpreter.
    pub const fn cosmac_vip() -> Self {
        Self {
            assign_before_shift: false,
            jump_uses_vx: false,
            add_index_sets_overflow: false,
            store_load_increments_index: true,
            logic_resets_flag: false,
        }
    }

    /// CHIP-48 / SUPER-CHIP era interpreters that most modern ROMs target.
    pub const fn modern() -> Self {
        Self {
            assign_before_shift: false,
            jump_uses_vx: true,
            add_index_sets_overflow: true,
            store_load_increments_index: false,
            logic_resets_flag: false,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Self::cosmac_vip()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Size of RAM in bytes.
    pub size: usize,
    /// Address the program image is loaded at and execution starts from.
    pub program_address: u16,
    /// Address the font image is loaded at.
    pub font_address: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuConfig {
    /// Backing capacity the call stack starts with.
    pub stack_initial_size: usize,
    /// Instructions executed per second.
    pub instruction_frequency: u32,
    pub delay_timer_frequency: u32,
    pub quirks: Quirks,
    /// Seed for Cxnn; `None` seeds from the OS.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    /// Frames offered to the renderer per second.
    pub frequency: u32,
}

/// Emulator configuration, resolved once before construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub memory: MemoryConfig,
    pub cpu: CpuConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Base config for a CHIP-8 system (COSMAC VIP).
    pub fn chip8() -> Self {
        Self {
            memory: MemoryConfig {
                size: 4096,
                program_address: 0x200,
                font_address: 0x50,
            },
            cpu: CpuConfig {
                stack_initial_size: 32,
                instruction_frequency: 700,
                delay_timer_frequency: 60,
                quirks: Quirks::cosmac_vip(),
                seed: None,
            },
            display: DisplayConfig {
                width: 64,
                height: 32,
                frequency: 60,
            },
        }
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.cpu.quirks = quirks;
        self
    }

    pub fn validate(&self) -> Result<(), Chip8Error> {
        if self.memory.size == 0 || self.memory.size > 0x10000 {
            return Err(Chip8Error::InvalidConfig(
                "memory size must be between 1 and 65536 bytes",
            ));
        }
        if usize::from(self.memory.program_address) >= self.memory.size {
            return Err(Chip8Error::InvalidConfig(
                "program address must be inside memory",
            ));
        }
        if usize::from(self.memory.font_address) >= self.memory.size {
            return Err(Chip8Error::InvalidConfig("font address must be inside memory"));
        }
        if self.cpu.instruction_frequency == 0
            || self.cpu.delay_timer_frequency == 0
            || self.display.frequency == 0
        {
            return Err(Chip8Error::InvalidConfig("frequencies must be non-zero"));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(Chip8Error::InvalidConfig(
                "display dimensions must be non-zero",
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::chip8()
    }
}
