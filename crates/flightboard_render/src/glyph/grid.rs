use std::ops::Range;

use super::font::{Glyph, GLYPH_HEIGHT};

/// Optional half-open horizontal window `[start, end)` that rasterized pixels must fall in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HorizontalClip {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl HorizontalClip {
    pub const NONE: Self = Self { start: None, end: None };

    pub fn contains(&self, x: i32) -> bool {
        self.start.map_or(true, |start| x >= start) && self.end.map_or(true, |end| x < end)
    }
}

impl From<Range<i32>> for HorizontalClip {
    fn from(range: Range<i32>) -> Self {
        Self { start: Some(range.start), end: Some(range.end) }
    }
}

/// Fixed-size monochrome canvas that text is composed on before coloring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self { width, height, cells: vec![false; len] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(false, |idx| self.cells[idx])
    }

    /// Lights a cell. Coordinates outside the grid are ignored.
    pub fn set(&mut self, x: i32, y: i32) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = true;
        }
    }

    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.cells.chunks(self.width.max(1) as usize)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Rasterizes `glyph` with its top-left corner at `(origin_x, origin_y)`.
    ///
    /// Every lit glyph pixel becomes a `scale x scale` block. Cells that land outside the grid
    /// or outside `clip` are dropped, which is what lets scrolled text run off the panel. A
    /// thickened glyph drawn at scale 1 lights a 2x2 block per pixel instead.
    pub fn plot(
        &mut self,
        glyph: &Glyph,
        origin_x: i32,
        origin_y: i32,
        scale: u32,
        clip: HorizontalClip,
    ) {
        let scale = i64::from(scale);
        let size = if scale == 1 && glyph.thicken_at_unit_scale() { 2 } else { scale };

        for column in 0..glyph.width() {
            for row in 0..GLYPH_HEIGHT {
                if !glyph.is_lit(column, row) {
                    continue;
                }

                let base_x = i64::from(origin_x) + i64::from(column) * scale;
                let base_y = i64::from(origin_y) + i64::from(row) * scale;
                for y in visible_span(base_y, size, self.height) {
                    for x in visible_span(base_x, size, self.width) {
                        self.set_clipped(x, y, clip);
                    }
                }
            }
        }
    }

    fn set_clipped(&mut self, x: i32, y: i32, clip: HorizontalClip) {
        if clip.contains(x) {
            self.set(x, y);
        }
    }
}

/// Part of `[start, start + len)` that falls inside `[0, limit)`.
fn visible_span(start: i64, len: i64, limit: u32) -> Range<i32> {
    let limit = i64::from(limit).min(i64::from(i32::MAX));
    let end = start.saturating_add(len).clamp(0, limit);
    start.clamp(0, limit) as i32..end as i32
}
