/// Number of pixel rows in every dot-matrix glyph.
pub const GLYPH_HEIGHT: u32 = 7;

/// Column-major bitmap for a single character.
///
/// Each entry of `columns` is one vertical slice of the glyph; bit `i` set means the pixel at
/// row `i` (counting from the top) is lit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    columns: &'static [u8],
    thicken_at_unit_scale: bool,
}

impl Glyph {
    pub const fn new(columns: &'static [u8]) -> Self {
        Self { columns, thicken_at_unit_scale: false }
    }

    /// Glyph whose lit pixels are drawn as 2x2 blocks when rendered at scale 1.
    pub const fn thickened(columns: &'static [u8]) -> Self {
        Self { columns, thicken_at_unit_scale: true }
    }

    pub fn width(&self) -> u32 {
        self.columns.len() as u32
    }

    pub fn columns(&self) -> &[u8] {
        self.columns
    }

    pub fn thicken_at_unit_scale(&self) -> bool {
        self.thicken_at_unit_scale
    }

    pub fn is_lit(&self, column: u32, row: u32) -> bool {
        if row >= GLYPH_HEIGHT {
            return false;
        }
        self.columns.get(column as usize).map_or(false, |bits| (bits >> row) & 1 == 1)
    }
}

/// Immutable character to glyph table.
#[derive(Debug)]
pub struct Font {
    glyphs: &'static [(char, Glyph)],
}

impl Font {
    pub const fn new(glyphs: &'static [(char, Glyph)]) -> Self {
        Self { glyphs }
    }

    /// The built-in 7 pixel high dot-matrix font.
    pub fn dot_matrix() -> &'static Font {
        &DOT_MATRIX
    }

    /// Looks up a glyph. Lookups are exact; callers uppercase text before asking.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.iter().find(|(key, _)| *key == ch).map(|(_, glyph)| glyph)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.glyph(ch).is_some()
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.iter().map(|(ch, _)| *ch)
    }
}

static DOT_MATRIX: Font = Font::new(&[
    (' ', Glyph::new(&[0x00, 0x00, 0x00])),
    ('A', Glyph::new(&[0x7E, 0x11, 0x11, 0x11, 0x7E])),
    ('B', Glyph::new(&[0x7F, 0x49, 0x49, 0x49, 0x36])),
    ('C', Glyph::new(&[0x3E, 0x41, 0x41, 0x41, 0x22])),
    ('D', Glyph::new(&[0x7F, 0x41, 0x41, 0x22, 0x1C])),
    ('E', Glyph::new(&[0x7F, 0x49, 0x49, 0x49, 0x41])),
    ('F', Glyph::new(&[0x7F, 0x09, 0x09, 0x09, 0x01])),
    ('G', Glyph::new(&[0x3E, 0x41, 0x49, 0x49, 0x7A])),
    ('H', Glyph::new(&[0x7F, 0x08, 0x08, 0x08, 0x7F])),
    ('I', Glyph::new(&[0x41, 0x7F, 0x41])),
    ('J', Glyph::new(&[0x20, 0x40, 0x41, 0x3F, 0x01])),
    ('K', Glyph::new(&[0x7F, 0x08, 0x14, 0x22, 0x41])),
    ('L', Glyph::new(&[0x7F, 0x40, 0x40, 0x40, 0x40])),
    ('M', Glyph::new(&[0x7F, 0x02, 0x0C, 0x02, 0x7F])),
    ('N', Glyph::new(&[0x7F, 0x04, 0x08, 0x10, 0x7F])),
    ('O', Glyph::new(&[0x3E, 0x41, 0x41, 0x41, 0x3E])),
    ('P', Glyph::new(&[0x7F, 0x09, 0x09, 0x09, 0x06])),
    ('Q', Glyph::new(&[0x3E, 0x41, 0x51, 0x21, 0x5E])),
    ('R', Glyph::new(&[0x7F, 0x09, 0x19, 0x29, 0x46])),
    ('S', Glyph::new(&[0x46, 0x49, 0x49, 0x49, 0x31])),
    ('T', Glyph::new(&[0x01, 0x01, 0x7F, 0x01, 0x01])),
    ('U', Glyph::new(&[0x3F, 0x40, 0x40, 0x40, 0x3F])),
    ('V', Glyph::new(&[0x1F, 0x20, 0x40, 0x20, 0x1F])),
    ('W', Glyph::new(&[0x3F, 0x40, 0x38, 0x40, 0x3F])),
    ('X', Glyph::new(&[0x63, 0x14, 0x08, 0x14, 0x63])),
    ('Y', Glyph::new(&[0x07, 0x08, 0x70, 0x08, 0x07])),
    ('Z', Glyph::new(&[0x61, 0x51, 0x49, 0x45, 0x43])),
    ('0', Glyph::new(&[0x3E, 0x51, 0x49, 0x45, 0x3E])),
    ('1', Glyph::new(&[0x42, 0x7F, 0x40])),
    ('2', Glyph::new(&[0x42, 0x61, 0x51, 0x49, 0x46])),
    ('3', Glyph::new(&[0x21, 0x41, 0x45, 0x4B, 0x31])),
    ('4', Glyph::new(&[0x18, 0x14, 0x12, 0x7F, 0x10])),
    ('5', Glyph::new(&[0x27, 0x45, 0x45, 0x45, 0x39])),
    ('6', Glyph::new(&[0x3C, 0x4A, 0x49, 0x49, 0x30])),
    ('7', Glyph::new(&[0x01, 0x71, 0x09, 0x05, 0x03])),
    ('8', Glyph::new(&[0x36, 0x49, 0x49, 0x49, 0x36])),
    ('9', Glyph::new(&[0x06, 0x49, 0x49, 0x29, 0x1E])),
    (':', Glyph::thickened(&[0x24])),
    ('.', Glyph::new(&[0x40])),
    (',', Glyph::new(&[0x40, 0x20])),
    ('-', Glyph::new(&[0x08, 0x08, 0x08])),
    ('+', Glyph::new(&[0x08, 0x08, 0x3E, 0x08, 0x08])),
    ('/', Glyph::new(&[0x20, 0x10, 0x08, 0x04, 0x02])),
    ('\'', Glyph::new(&[0x03])),
    ('!', Glyph::new(&[0x5F])),
    ('?', Glyph::new(&[0x02, 0x01, 0x51, 0x09, 0x06])),
    ('&', Glyph::new(&[0x36, 0x49, 0x55, 0x22, 0x50])),
    ('(', Glyph::new(&[0x1C, 0x22, 0x41])),
    (')', Glyph::new(&[0x41, 0x22, 0x1C])),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_glyph_has_columns() {
        let font = Font::dot_matrix();
        for ch in font.chars() {
            let glyph = font.glyph(ch).unwrap();
            assert!(glyph.width() >= 1, "glyph {ch:?} has no columns");
            assert!(glyph.columns().iter().all(|bits| bits >> GLYPH_HEIGHT == 0));
        }
    }

    #[test]
    fn covers_uppercase_and_digits() {
        let font = Font::dot_matrix();
        for ch in ('A'..='Z').chain('0'..='9') {
            assert!(font.contains(ch), "missing {ch:?}");
        }
        assert!(!font.contains('a'));
        assert!(!font.contains('~'));
    }

    #[test]
    fn only_colon_is_thickened() {
        let font = Font::dot_matrix();
        let thickened: Vec<char> =
            font.chars().filter(|ch| font.glyph(*ch).unwrap().thicken_at_unit_scale()).collect();
        assert_eq!(thickened, vec![':']);
    }

    #[test]
    fn bit_zero_is_top_row() {
        let glyph = Font::dot_matrix().glyph('T').unwrap();
        assert!(glyph.is_lit(0, 0));
        assert!(!glyph.is_lit(0, 1));
        assert!(glyph.is_lit(2, 6));
        assert!(!glyph.is_lit(2, 7));
        assert!(!glyph.is_lit(9, 0));
    }
}
