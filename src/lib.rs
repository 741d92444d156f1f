pub mod emu;
mod font;
mod nibble;

pub use emu::*;
pub use font::*;
pub use nibble::u4;
