use std::{io, path::PathBuf};

/// Outcome of one instruction cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleResult {
    /// The instruction completed.
    Continue,
    /// Fx0A found no key down and will run again next cycle.
    WaitingForKey,
}

/// Which image a load error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Image {
    Font,
    Program,
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Image::Font => f.write_str("font"),
            Image::Program => f.write_str("program"),
        }
    }
}

/// Error types that can occur during CHIP-8 emulation
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("Unknown opcode {opcode:#06X} at address {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    #[error("{what} image is too large ({size} bytes), {capacity} bytes fit at {address:#05X}")]
    ImageTooLarge {
        what: Image,
        address: u16,
        size: usize,
        capacity: usize,
    },

    #[error("Failed to read {what} image from {}", .path.display())]
    ReadImage {
        what: Image,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
