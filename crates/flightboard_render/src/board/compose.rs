use image::Rgb;
use log::debug;

use super::geometry::PanelGeometry;
use super::message::FlightMessage;
use crate::glyph::gradient::ArrivalGradient;
use crate::glyph::grid::{HorizontalClip, PixelGrid};
use crate::glyph::layout::TextLayout;
use crate::glyph::series::{AnimationSequence, Frame};

/// A body line (city or aircraft) and whether it needs to scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyLine<'a> {
    pub text: &'a str,
    pub y: i32,
    pub width: u32,
    pub scrolls: bool,
}

/// Turns flight messages into panel frames.
#[derive(Clone, Copy, Debug)]
pub struct FrameComposer<'f> {
    layout: TextLayout<'f>,
    geometry: PanelGeometry,
    gradient: ArrivalGradient,
}

impl Default for FrameComposer<'static> {
    fn default() -> Self {
        Self::new(TextLayout::default(), PanelGeometry::default(), ArrivalGradient::default())
    }
}

impl<'f> FrameComposer<'f> {
    pub fn new(layout: TextLayout<'f>, geometry: PanelGeometry, gradient: ArrivalGradient) -> Self {
        Self { layout, geometry, gradient }
    }

    pub fn layout(&self) -> &TextLayout<'f> {
        &self.layout
    }

    /// Renders `message` as a single still frame, or as one frame per scroll step when the city
    /// or aircraft line is wider than the panel.
    pub fn compose(&self, message: &FlightMessage) -> AnimationSequence {
        let color = self.gradient.color(message.delay_secs);
        let lines = self.body_lines(message);
        let mut grid = PixelGrid::new(self.geometry.width, self.geometry.height);

        let Some(longest) = lines.iter().filter(|line| line.scrolls).map(|line| line.width).max()
        else {
            self.draw_header(&mut grid, message);
            for line in &lines {
                self.draw_still(&mut grid, line);
            }
            return AnimationSequence::single(Frame::from_grid(&grid, color));
        };

        let frame_count = longest as usize + self.geometry.width as usize;
        debug!(
            "composing {} scroll frames for {} (longest line {}px)",
            frame_count, message.flight_number, longest
        );

        let frames = (0..frame_count)
            .map(|offset| {
                grid.clear();
                self.draw_header(&mut grid, message);
                for line in &lines {
                    if line.scrolls {
                        self.draw_scrolled(&mut grid, line, offset as i32);
                    } else {
                        self.draw_still(&mut grid, line);
                    }
                }
                Frame::from_grid(&grid, color)
            })
            .collect();

        AnimationSequence::new(frames).unwrap_or_else(|| self.blank())
    }

    /// Measures the city and aircraft lines and flags the ones that overflow.
    pub fn body_lines<'m>(&self, message: &'m FlightMessage) -> [BodyLine<'m>; 2] {
        let [_, city_y, aircraft_y] = self.geometry.rows;
        [self.body_line(&message.city, city_y), self.body_line(&message.aircraft, aircraft_y)]
    }

    /// Number of frames `message` composes to.
    pub fn frame_count(&self, message: &FlightMessage) -> usize {
        self.body_lines(message)
            .iter()
            .filter(|line| line.scrolls)
            .map(|line| line.width as usize + self.geometry.width as usize)
            .max()
            .unwrap_or(1)
    }

    pub fn color(&self, message: &FlightMessage) -> Rgb<u8> {
        self.gradient.color(message.delay_secs)
    }

    fn body_line<'m>(&self, text: &'m str, y: i32) -> BodyLine<'m> {
        let width = self.layout.measure(text, self.geometry.scale);
        BodyLine { text, y, width, scrolls: self.geometry.overflows(width) }
    }

    fn draw_header(&self, grid: &mut PixelGrid, message: &FlightMessage) {
        let geometry = &self.geometry;
        let y = geometry.rows[0];

        self.layout.draw(
            grid,
            &message.origin_code,
            geometry.margin,
            y,
            geometry.scale,
            HorizontalClip::NONE,
        );

        let label_width = self.layout.measure(&message.flight_number, geometry.scale);
        self.layout.draw(
            grid,
            &message.flight_number,
            geometry.right_aligned_x(label_width),
            y,
            geometry.scale,
            HorizontalClip::NONE,
        );
    }

    fn draw_still(&self, grid: &mut PixelGrid, line: &BodyLine<'_>) {
        let geometry = &self.geometry;
        self.layout.draw(
            grid,
            line.text,
            geometry.margin,
            line.y,
            geometry.scale,
            HorizontalClip::NONE,
        );
    }

    /// Draws the line shifted left by `offset` plus a trailing copy so the text wraps around.
    fn draw_scrolled(&self, grid: &mut PixelGrid, line: &BodyLine<'_>, offset: i32) {
        let geometry = &self.geometry;
        let clip = geometry.scroll_clip();
        let x = geometry.margin - offset;
        let repeat_x = x + line.width as i32 + geometry.scroll_gap;

        self.layout.draw(grid, line.text, x, line.y, geometry.scale, clip);
        self.layout.draw(grid, line.text, repeat_x, line.y, geometry.scale, clip);
    }

    fn blank(&self) -> AnimationSequence {
        AnimationSequence::single(Frame::blank(self.geometry.width, self.geometry.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::gradient::YELLOW;

    fn lit_colors(frame: &Frame) -> Vec<Rgb<u8>> {
        frame.image().pixels().copied().filter(|px| *px != Rgb([0, 0, 0])).collect()
    }

    #[test]
    fn short_message_is_one_frame() {
        let composer = FrameComposer::default();
        let message = FlightMessage::new("LHR", "BA123", "PARIS", "A320", 0);
        let sequence = composer.compose(&message);

        assert_eq!(sequence.len(), 1);
        assert_eq!(composer.frame_count(&message), 1);
        let colors = lit_colors(sequence.first());
        assert!(!colors.is_empty());
        assert!(colors.iter().all(|px| *px == YELLOW));
    }

    #[test]
    fn header_label_is_right_aligned() {
        let composer = FrameComposer::default();
        let message = FlightMessage::new("", "BA123", "", "", 0);
        let frame = composer.compose(&message).into_frames().remove(0);

        let label_width = composer.layout().measure("BA123", 1);
        let rightmost = (0..64).rev().find(|x| (0..8).any(|y| frame.is_lit(*x, y))).unwrap();
        let leftmost = (0..64).find(|x| (0..8).any(|y| frame.is_lit(*x, y))).unwrap();
        assert_eq!(rightmost, 61);
        assert_eq!(leftmost, 64 - label_width - 2);
    }

    #[test]
    fn wide_city_scrolls_with_static_header() {
        let composer = FrameComposer::default();
        let message = FlightMessage::new("LHR", "BA123", "LOS ANGELES", "B737", -1800);
        let sequence = composer.compose(&message);

        let city_width = composer.layout().measure("LOS ANGELES", 1);
        assert!(city_width > 60);
        assert_eq!(sequence.len(), city_width as usize + 64);
        assert_eq!(composer.frame_count(&message), sequence.len());

        let header = sequence.first().band(0, 14);
        for frame in sequence.iter() {
            assert_eq!(frame.band(0, 14), header);
        }

        let color = composer.color(&message);
        assert_eq!(color, Rgb([127, 255, 0]));
        for frame in sequence.iter() {
            assert!(lit_colors(frame).iter().all(|px| *px == color));
        }
    }

    #[test]
    fn still_line_stays_put_while_other_scrolls() {
        let composer = FrameComposer::default();
        let message = FlightMessage::new("LHR", "BA123", "LOS ANGELES", "B737", 0);
        let sequence = composer.compose(&message);

        let aircraft = sequence.first().band(24, 32);
        assert!(aircraft.iter().any(|px| *px != Rgb([0, 0, 0])));
        for frame in sequence.iter() {
            assert_eq!(frame.band(24, 32), aircraft);
        }
        assert_ne!(
            sequence.frame(0).unwrap().band(14, 21),
            sequence.frame(5).unwrap().band(14, 21)
        );
    }

    #[test]
    fn longest_scrolling_line_sets_frame_count() {
        let composer = FrameComposer::default();
        let message = FlightMessage::new(
            "SFO",
            "UA901",
            "SAN FRANCISCO",
            "BOEING 787-9 DREAMLINER",
            600,
        );
        let layout = composer.layout();
        let city = layout.measure(&message.city, 1);
        let aircraft = layout.measure(&message.aircraft, 1);
        assert!(aircraft > city && city > 60);

        let sequence = composer.compose(&message);
        assert_eq!(sequence.len(), aircraft as usize + 64);
    }

    #[test]
    fn scrolling_text_stays_inside_margins() {
        let composer = FrameComposer::default();
        let message = FlightMessage::new("LHR", "BA123", "LOS ANGELES", "BOEING 777-300ER", 0);
        let sequence = composer.compose(&message);

        for frame in sequence.iter() {
            for y in 0..32 {
                for x in [0, 1, 62, 63] {
                    assert!(!frame.is_lit(x, y), "pixel ({x}, {y}) lit in margin");
                }
            }
        }
    }

    #[test]
    fn scroll_starts_at_margin() {
        let composer = FrameComposer::default();
        let message = FlightMessage::new("LHR", "BA123", "LOS ANGELES", "B737", 0);
        let first = composer.compose(&message).into_frames().remove(0);

        let mut expected = PixelGrid::new(64, 32);
        composer.layout().draw(&mut expected, "LOS ANGELES", 2, 14, 1, HorizontalClip::from(2..62));
        let expected = Frame::from_grid(&expected, YELLOW);
        assert_eq!(first.band(14, 21), expected.band(14, 21));
    }

    #[test]
    fn empty_fields_give_blank_still() {
        let composer = FrameComposer::default();
        let sequence = composer.compose(&FlightMessage::default());
        assert_eq!(sequence.len(), 1);
        assert!(lit_colors(sequence.first()).is_empty());
    }

    #[test]
    fn geometry_is_respected() {
        let geometry =
            PanelGeometry { width: 32, height: 16, rows: [0, 8, 8], ..Default::default() };
        let composer =
            FrameComposer::new(TextLayout::default(), geometry, ArrivalGradient::default());
        let sequence = composer.compose(&FlightMessage::new("A", "B", "ABCDEF", "", 0));

        assert_eq!(sequence.first().dimensions(), (32, 16));
        assert_eq!(sequence.len(), composer.layout().measure("ABCDEF", 1) as usize + 32);
    }
}
