//! Per-mode LED matrix patterns

use crate::display::LedMatrix;
use crate::error::Result;
use crate::mode::Mode;

/// Number of cells on the LED matrix (8x8)
pub const MATRIX_CELLS: usize = 64;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into the RGB565 layout used by the Sense HAT framebuffer
    pub fn to_rgb565(self) -> u16 {
        let r = (self.r as u16 >> 3) & 0x1F;
        let g = (self.g as u16 >> 2) & 0x3F;
        let b = (self.b as u16 >> 3) & 0x1F;
        (r << 11) | (g << 5) | b
    }
}

/// Full-matrix image, row-major from the top-left cell
pub type Pattern = [Rgb; MATRIX_CELLS];

const R: Rgb = Rgb::new(255, 0, 0);
const B: Rgb = Rgb::new(0, 0, 255);
const C: Rgb = Rgb::new(0, 255, 255);
const P: Rgb = Rgb::new(255, 0, 255);
const Y: Rgb = Rgb::new(255, 255, 0);
const O: Rgb = Rgb::new(0, 0, 0);

/// All cells off
pub const BLANK: Pattern = [O; MATRIX_CELLS];

// Pick
#[rustfmt::skip]
const PICK: Pattern = [
    O, B, O, O, C, C, C, O,
    B, O, B, O, O, C, O, O,
    B, B, O, O, O, C, O, O,
    B, O, O, O, C, C, C, O,
    O, P, P, O, Y, O, O, O,
    P, O, O, O, Y, O, Y, O,
    P, O, O, O, Y, Y, O, O,
    O, P, P, O, Y, O, Y, O,
];

// Key
#[rustfmt::skip]
const KEY: Pattern = [
    O, O, O, O, O, O, O, O,
    O, O, O, O, O, Y, Y, O,
    O, O, O, O, Y, O, O, Y,
    Y, Y, Y, Y, Y, O, O, Y,
    Y, O, Y, O, Y, O, O, Y,
    Y, O, Y, O, O, Y, Y, O,
    O, O, O, O, O, O, O, O,
    O, O, O, O, O, O, O, O,
];

// Key crossed out
#[rustfmt::skip]
const NO_KEY: Pattern = [
    R, O, O, O, O, O, O, R,
    O, R, O, O, O, Y, R, O,
    O, O, R, O, Y, R, O, Y,
    Y, Y, Y, R, R, O, O, Y,
    Y, O, Y, R, R, O, O, Y,
    Y, O, R, O, O, R, Y, O,
    O, R, O, O, O, O, R, O,
    R, O, O, O, O, O, O, R,
];

/// Pattern shown while `mode` is active
pub fn pattern_for(mode: Mode) -> &'static Pattern {
    match mode {
        Mode::Pick => &PICK,
        Mode::Key => &KEY,
        Mode::NoKey => &NO_KEY,
    }
}

/// Show the pattern for `mode` on the matrix in a single write
pub fn render<D: LedMatrix + ?Sized>(display: &mut D, mode: Mode) -> Result<()> {
    display.set_pixels(pattern_for(mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingMatrix {
        frames: Vec<Pattern>,
    }

    impl LedMatrix for RecordingMatrix {
        fn set_pixels(&mut self, pattern: &Pattern) -> Result<()> {
            self.frames.push(*pattern);
            Ok(())
        }

        fn clear(&mut self) -> Result<()> {
            self.frames.push(BLANK);
            Ok(())
        }
    }

    #[test]
    fn test_each_mode_has_distinct_pattern() {
        assert_ne!(pattern_for(Mode::Pick), pattern_for(Mode::Key));
        assert_ne!(pattern_for(Mode::Key), pattern_for(Mode::NoKey));
        assert_ne!(pattern_for(Mode::Pick), pattern_for(Mode::NoKey));
        for mode in Mode::ALL {
            assert_ne!(pattern_for(mode), &BLANK);
        }
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut matrix = RecordingMatrix::default();
        for _ in 0..3 {
            render(&mut matrix, Mode::Key).unwrap();
        }
        assert_eq!(matrix.frames.len(), 3);
        assert!(matrix.frames.iter().all(|f| f == pattern_for(Mode::Key)));
    }

    #[test]
    fn test_render_follows_mode() {
        let mut matrix = RecordingMatrix::default();
        render(&mut matrix, Mode::Pick).unwrap();
        render(&mut matrix, Mode::NoKey).unwrap();
        assert_eq!(&matrix.frames[0], pattern_for(Mode::Pick));
        assert_eq!(&matrix.frames[1], pattern_for(Mode::NoKey));
    }

    #[test]
    fn test_rgb565_packing() {
        assert_eq!(Rgb::new(255, 0, 0).to_rgb565(), 0xF800);
        assert_eq!(Rgb::new(0, 255, 0).to_rgb565(), 0x07E0);
        assert_eq!(Rgb::new(0, 0, 255).to_rgb565(), 0x001F);
        assert_eq!(Rgb::new(255, 255, 255).to_rgb565(), 0xFFFF);
        assert_eq!(Rgb::default().to_rgb565(), 0);
    }
}
