/// Monochrome framebuffer.
///
/// Sprites are placed at a wrapped origin and then clipped at the right and
/// bottom edges.
pub struct Display {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
    changed: bool,
}

impl Display {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width * height],
            changed: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
        self.changed = true;
    }

    /// XORs `sprite` onto the framebuffer with its top-left corner at
    /// `(x mod width, y mod height)`, one byte per row, MSB leftmost.
    ///
    /// Returns true if any lit pixel was turned off.
    pub fn draw(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        if self.pixels.is_empty() {
            return false;
        }

        let x_pos = x % self.width;
        let y_pos = y % self.height;

        // Don't draw out of bounds
        let row_count = sprite.len().min(self.height - y_pos);
        let col_count = 8usize.min(self.width - x_pos);

        let mut any_erased = false;
        for (row, sprite_byte) in sprite.iter().take(row_count).enumerate() {
            for col in 0..col_count {
                if sprite_byte & (0x80 >> col) != 0 {
                    let pixel = &mut self.pixels[(y_pos + row) * self.width + x_pos + col];

                    *pixel ^= true;

                    if !*pixel {
                        any_erased = true;
                    }
                }
            }
        }

        self.changed = true;
        any_erased
    }

    /// Get the state of a pixel (true = on). Out of range reads as off.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[y * self.width + x]
    }

    /// Iterates over rows, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(self.width.max(1))
    }

    /// Returns whether the framebuffer changed since the last call, and resets the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(display: &Display) -> Vec<(usize, usize)> {
        let mut lit = Vec::new();
        for y in 0..display.height() {
            for x in 0..display.width() {
                if display.pixel(x, y) {
                    lit.push((x, y));
                }
            }
        }
        lit
    }

    #[test]
    fn draw_in_bounds() {
        let mut display = Display::new(10, 10);
        let collision = display.draw(1, 5, &[0b11001100, 0b00110011]);

        assert!(!collision);
        assert_eq!(
            lit(&display),
            vec![
                (1, 5),
                (2, 5),
                (5, 5),
                (6, 5),
                (3, 6),
                (4, 6),
                (7, 6),
                (8, 6)
            ]
        );
    }

    #[test]
    fn origin_wraps_but_sprite_clips() {
        let mut display = Display::new(10, 10);
        display.draw(15, 19, &[0b11001100, 0b00110011]);

        // Origin wraps to (5, 9); columns past x=9 and rows past y=9 are dropped
        assert_eq!(lit(&display), vec![(5, 9), (6, 9), (9, 9)]);
        assert!(!display.pixel(0, 9));
        assert!(!display.pixel(0, 0));
        assert!(!display.pixel(5, 0));
    }

    #[test]
    fn drawing_twice_erases_and_collides() {
        let mut display = Display::new(64, 32);
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0];

        assert!(!display.draw(12, 8, &sprite));
        assert!(!lit(&display).is_empty());

        assert!(display.draw(12, 8, &sprite));
        assert!(lit(&display).is_empty());
    }

    #[test]
    fn partial_overlap_collides() {
        let mut display = Display::new(64, 32);
        display.draw(0, 0, &[0b1000_0000]);
        assert!(display.draw(0, 0, &[0b1100_0000]));
        assert_eq!(lit(&display), vec![(1, 0)]);
    }

    #[test]
    fn clear_turns_everything_off() {
        let mut display = Display::new(10, 10);
        display.draw(1, 5, &[0xFF, 0xFF]);
        display.clear();
        assert!(lit(&display).is_empty());
    }

    #[test]
    fn changed_flag_is_taken_once() {
        let mut display = Display::new(10, 10);
        assert!(!display.take_changed());

        display.draw(0, 0, &[0x80]);
        assert!(display.take_changed());
        assert!(!display.take_changed());

        display.clear();
        assert!(display.take_changed());
    }

    #[test]
    fn rows_match_pixels() {
        let mut display = Display::new(4, 2);
        display.draw(1, 1, &[0b1000_0000]);

        let rows: Vec<Vec<bool>> = display.rows().map(|row| row.to_vec()).collect();
        assert_eq!(
            rows,
            vec![
                vec![false, false, false, false],
                vec![false, true, false, false]
            ]
        );
    }
}
