use std::{path::Path, time::Duration};

use super::{Chip8Error, Config, Cpu, CycleResult, Display, Image, KeyState, Memory, Timer};
use crate::{FONT, u4};

/// What happened during one call to [`Emulator::update`].
#[derive(Debug, Default)]
pub struct StepReport {
    /// An instruction was fetched this update.
    pub executed: bool,
    /// Fx0A is waiting for a key.
    pub waiting_for_key: bool,
    /// The instruction fetched this update could not be executed.
    pub fault: Option<Chip8Error>,
    /// A display period has elapsed; see [`Emulator::take_frame`].
    pub frame_due: bool,
}

/// High-level emulator: owns the CPU, the keypad snapshot and the display clock.
pub struct Emulator {
    cpu: Cpu,
    keys: KeyState,
    display_timer: Timer,
    frame_due: bool,
}

impl Emulator {
    /// Builds an emulator with `font` and `program` loaded at their configured addresses.
    ///
    /// Nothing is written unless both images fit.
    pub fn new(config: Config, font: &[u8], program: &[u8]) -> Result<Self, Chip8Error> {
        let mut cpu = Cpu::new(&config)?;
        let font_address = config.memory.font_address;
        let program_address = config.memory.program_address;

        check_fits(&cpu.memory, Image::Font, font_address, font)?;
        check_fits(&cpu.memory, Image::Program, program_address, program)?;

        cpu.memory.write(font_address.into(), font);
        cpu.memory.write(program_address.into(), program);

        log::debug!(
            "Loaded {} byte font at {font_address:#05X} and {} byte program at {program_address:#05X}",
            font.len(),
            program.len(),
        );

        Ok(Self {
            cpu,
            keys: KeyState::default(),
            display_timer: Timer::new(config.display.frequency),
            frame_due: false,
        })
    }

    /// Reads the images from disk, falling back to the built-in font.
    pub fn from_files(
        config: Config,
        font_path: Option<&Path>,
        program_path: &Path,
    ) -> Result<Self, Chip8Error> {
        let font = match font_path {
            Some(path) => read_image(Image::Font, path)?,
            None => FONT.to_vec(),
        };
        let program = read_image(Image::Program, program_path)?;

        Self::new(config, &font, &program)
    }

    /// Advances every clock by `delta`.
    ///
    /// Instruction faults are logged and reported, never propagated, so the
    /// caller's loop stays live across a bad opcode.
    pub fn update(&mut self, delta: Duration) -> StepReport {
        let mut report = StepReport::default();

        match self.cpu.tick(delta, &self.keys) {
            Ok(Some(result)) => {
                report.executed = true;
                report.waiting_for_key = result == CycleResult::WaitingForKey;
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("{err}");
                report.executed = true;
                report.fault = Some(err);
            }
        }

        if self.display_timer.tick(delta) {
            self.frame_due = true;
        }
        report.frame_due = self.frame_due;

        report
    }

    /// Returns the framebuffer if a display period has elapsed since the last
    /// frame and it changed in the meantime.
    pub fn take_frame(&mut self) -> Option<&Display> {
        if !std::mem::take(&mut self.frame_due) {
            return None;
        }

        if self.cpu.display.take_changed() {
            Some(&self.cpu.display)
        } else {
            None
        }
    }

    /// Set the state of a key on the keypad.
    pub fn set_key(&mut self, key: u4, down: bool) {
        self.keys.set(key, down);
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn display(&self) -> &Display {
        &self.cpu.display
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}

fn check_fits(memory: &Memory, what: Image, address: u16, image: &[u8]) -> Result<(), Chip8Error> {
    if memory.fits(address.into(), image.len()) {
        return Ok(());
    }

    Err(Chip8Error::ImageTooLarge {
        what,
        address,
        size: image.len(),
        capacity: memory.len().saturating_sub(address.into()),
    })
}

fn read_image(what: Image, path: &Path) -> Result<Vec<u8>, Chip8Error> {
    std::fs::read(path).map_err(|source| Chip8Error::ReadImage {
        what,
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::chip8();
        config.cpu.seed = Some(1);
        config
    }

    #[test]
    fn loads_font_and_program_at_configured_addresses() {
        let emulator = Emulator::new(config(), &FONT, &[0x12, 0x00]).unwrap();
        let memory = emulator.cpu().memory();

        assert_eq!(&memory.as_slice()[0x50..0x50 + FONT.len()], &FONT);
        assert_eq!(memory.read(0x200), 0x12);
        assert_eq!(memory.read(0x201), 0x00);
        assert_eq!(emulator.cpu().registers().pc, 0x200);
    }

    #[test]
    fn oversized_program_is_rejected() {
        let program = vec![0xAA; 4096 - 0x200 + 1];
        match Emulator::new(config(), &FONT, &program) {
            Err(Chip8Error::ImageTooLarge {
                what: Image::Program,
                size,
                capacity,
                ..
            }) => {
                assert_eq!(size, 4096 - 0x200 + 1);
                assert_eq!(capacity, 4096 - 0x200);
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("oversized program was accepted"),
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = config();
        config.display.frequency = 0;
        assert!(matches!(
            Emulator::new(config, &FONT, &[]),
            Err(Chip8Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_program_file_is_a_read_error() {
        let path = Path::new("/nonexistent/chippy/program.ch8");
        assert!(matches!(
            Emulator::from_files(config(), None, path),
            Err(Chip8Error::ReadImage {
                what: Image::Program,
                ..
            })
        ));
    }

    #[test]
    fn frame_is_offered_once_per_display_period_when_changed() {
        // 00E0, then jump to self
        let mut emulator = Emulator::new(config(), &FONT, &[0x00, 0xE0, 0x12, 0x02]).unwrap();
        let frame_period = Duration::from_secs(1) / 60;

        let report = emulator.update(frame_period);
        assert!(report.executed);
        assert!(report.frame_due);
        assert!(emulator.take_frame().is_some());
        assert!(emulator.take_frame().is_none());

        // Jumping does not touch the display
        emulator.update(frame_period);
        assert!(emulator.take_frame().is_none());
    }

    #[test]
    fn fault_is_reported_and_loop_continues() {
        // Unknown opcode, then 6A07
        let mut emulator = Emulator::new(config(), &FONT, &[0xFF, 0xFF, 0x6A, 0x07]).unwrap();
        let step = Duration::from_secs(1);

        let report = emulator.update(step);
        assert!(matches!(
            report.fault,
            Some(Chip8Error::UnknownOpcode { opcode: 0xFFFF, address: 0x200 })
        ));

        let report = emulator.update(step);
        assert!(report.fault.is_none());
        assert_eq!(emulator.cpu().registers().v[0xA], 0x07);
    }

    #[test]
    fn keys_feed_the_cpu() {
        // F10A: wait for key into V1
        let mut emulator = Emulator::new(config(), &FONT, &[0xF1, 0x0A]).unwrap();
        let step = Duration::from_secs(1);

        assert!(emulator.update(step).waiting_for_key);
        emulator.set_key(u4::new(0xE), true);
        let report = emulator.update(step);
        assert!(!report.waiting_for_key);
        assert_eq!(emulator.cpu().registers().v[1], 0xE);
        assert!(emulator.keys().as_array()[0xE]);
    }
}
