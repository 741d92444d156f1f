/// Call stack of return addresses.
///
/// Starts with a fixed backing capacity and grows past it instead of
/// overflowing. Popping only moves the logical count, stale slots above it
/// are left in place.
pub struct Stack {
    data: Vec<u16>,
    count: usize,
}

impl Stack {
    pub fn new(initial_size: usize) -> Self {
        Self {
            data: vec![0; initial_size],
            count: 0,
        }
    }

    pub fn push(&mut self, value: u16) {
        if self.count >= self.data.len() {
            self.data.push(value);
        } else {
            self.data[self.count] = value;
        }
        self.count += 1;
    }

    /// Pops the top address, or returns 0 without mutating if empty.
    pub fn pop(&mut self) -> u16 {
        if self.count == 0 {
            return 0;
        }
        self.count -= 1;
        self.data[self.count]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Slots allocated so far: the initial size, or the deepest nesting reached.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Live entries, bottom first.
    pub fn as_slice(&self) -> &[u16] {
        &self.data[..self.count]
    }
}
