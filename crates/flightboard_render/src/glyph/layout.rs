use super::font::{Font, Glyph};
use super::grid::{HorizontalClip, PixelGrid};

/// Lays out strings left to right with a one column gap between glyphs.
#[derive(Clone, Copy, Debug)]
pub struct TextLayout<'f> {
    font: &'f Font,
}

impl Default for TextLayout<'static> {
    fn default() -> Self {
        Self::new(Font::dot_matrix())
    }
}

impl<'f> TextLayout<'f> {
    pub fn new(font: &'f Font) -> Self {
        Self { font }
    }

    /// Rendered width of `text` in pixels, without a trailing gap.
    ///
    /// Matching is case-insensitive and characters missing from the font take no space.
    pub fn measure(&self, text: &str, scale: u32) -> u32 {
        text.to_uppercase()
            .chars()
            .filter_map(|ch| self.font.glyph(ch))
            .map(|glyph| advance(glyph, scale))
            .fold(0, u32::saturating_add)
            .saturating_sub(scale)
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn draw(
        &self,
        grid: &mut PixelGrid,
        text: &str,
        x: i32,
        y: i32,
        scale: u32,
        clip: HorizontalClip,
    ) {
        let mut cursor = i64::from(x);
        for ch in text.to_uppercase().chars() {
            let Some(glyph) = self.font.glyph(ch) else {
                continue;
            };
            match i32::try_from(cursor) {
                Ok(origin) => grid.plot(glyph, origin, y, scale, clip),
                Err(_) if cursor > 0 => break,
                Err(_) => {},
            }
            cursor += i64::from(advance(glyph, scale));
        }
    }
}

/// Horizontal distance from one glyph to the next, gap included.
fn advance(glyph: &Glyph, scale: u32) -> u32 {
    (glyph.width() + 1).saturating_mul(scale)
}
