mod config;
mod cpu;
mod display;
mod emulator;
mod execute;
mod keypad;
mod memory;
mod opcode;
mod registers;
mod stack;
mod timer;
mod types;

pub use config::*;
pub use cpu::*;
pub use display::*;
pub use emulator::*;
pub use keypad::*;
pub use memory::*;
pub use opcode::*;
pub use registers::*;
pub use stack::*;
pub use timer::*;
pub use types::*;
