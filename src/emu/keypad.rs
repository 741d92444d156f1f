use crate::u4;

/// Input collaborator: an already-polled snapshot of the hex keypad.
pub trait Keypad {
    fn is_key_down(&self, key: u4) -> bool;
}

/// 16-key state, true = down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState([bool; 16]);

impl KeyState {
    pub fn set(&mut self, key: u4, down: bool) {
        self.0[usize::from(key)] = down;
    }

    pub fn as_array(&self) -> &[bool; 16] {
        &self.0
    }
}

impl Keypad for KeyState {
    fn is_key_down(&self, key: u4) -> bool {
        self.0[usize::from(key)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_query() {
        let mut keys = KeyState::default();
        assert!(!keys.is_key_down(u4::new(0xA)));

        keys.set(u4::new(0xA), true);
        assert!(keys.is_key_down(u4::new(0xA)));
        assert!(!keys.is_key_down(u4::new(0xB)));

        keys.set(u4::new(0xA), false);
        assert!(!keys.is_key_down(u4::new(0xA)));
    }
}
