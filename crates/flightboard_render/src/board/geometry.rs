use crate::glyph::grid::HorizontalClip;

/// Fixed three-row layout of the arrival board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelGeometry {
    pub width: u32,
    pub height: u32,
    /// Blank columns kept on the left and right edges.
    pub margin: i32,
    /// Top edge of the header, city and aircraft rows.
    pub rows: [i32; 3],
    /// Blank pixels between the end of a scrolling line and its repeat.
    pub scroll_gap: i32,
    pub scale: u32,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self { width: 64, height: 32, margin: 2, rows: [1, 14, 24], scroll_gap: 20, scale: 1 }
    }
}

impl PanelGeometry {
    /// Width available to a line between the two margins.
    pub fn text_width(&self) -> u32 {
        (self.width as i64 - 2 * self.margin as i64).max(0) as u32
    }

    /// Columns a scrolling line may occupy.
    pub fn scroll_clip(&self) -> HorizontalClip {
        HorizontalClip::from(self.margin..self.width as i32 - self.margin)
    }

    /// Left edge for text of `text_width` pixels pushed against the right margin.
    pub fn right_aligned_x(&self, text_width: u32) -> i32 {
        self.width as i32 - text_width as i32 - self.margin
    }

    pub fn overflows(&self, text_width: u32) -> bool {
        text_width > self.text_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_panel() {
        let geometry = PanelGeometry::default();
        assert_eq!(geometry.text_width(), 60);
        assert_eq!(geometry.scroll_clip(), HorizontalClip::from(2..62));
        assert_eq!(geometry.right_aligned_x(29), 33);
        assert!(!geometry.overflows(60));
        assert!(geometry.overflows(61));
    }

    #[test]
    fn oversized_margin_leaves_no_room() {
        let geometry = PanelGeometry { width: 8, margin: 5, ..PanelGeometry::default() };
        assert_eq!(geometry.text_width(), 0);
        assert!(geometry.overflows(1));
        assert!(!geometry.overflows(0));
    }
}
