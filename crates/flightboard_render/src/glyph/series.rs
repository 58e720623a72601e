use image::{Rgb, RgbImage};

use super::grid::PixelGrid;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// One fully rendered panel image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Colors every lit grid cell with `on_color`, leaving the rest black.
    pub fn from_grid(grid: &PixelGrid, on_color: Rgb<u8>) -> Self {
        let image = RgbImage::from_fn(grid.width(), grid.height(), |x, y| {
            if grid.get(x as i32, y as i32) { on_color } else { BLACK }
        });
        Self { image }
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self { image: RgbImage::new(width, height) }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }

    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y) != BLACK
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Pixels of rows `[top, bottom)`, row-major.
    pub fn band(&self, top: u32, bottom: u32) -> Vec<Rgb<u8>> {
        let bottom = bottom.min(self.height());
        (top..bottom)
            .flat_map(|y| (0..self.width()).map(move |x| (x, y)))
            .map(|(x, y)| self.pixel(x, y))
            .collect()
    }

    /// Text preview with `#` for lit pixels and `.` for dark ones.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.height()).map(move |y| {
            (0..self.width()).map(|x| if self.is_lit(x, y) { '#' } else { '.' }).collect()
        })
    }
}

/// Non-empty ordered list of frames. One frame is a still image, more are looped in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationSequence {
    frames: Vec<Frame>,
}

impl AnimationSequence {
    /// Returns `None` for an empty list, which callers treat as a blank panel.
    pub fn new(frames: Vec<Frame>) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self { frames })
    }

    pub fn single(frame: Frame) -> Self {
        Self { frames: vec![frame] }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_static(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    /// Index that follows `index`, wrapping to the start.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.frames.len()
    }
}

impl From<Frame> for AnimationSequence {
    fn from(frame: Frame) -> Self {
        Self::single(frame)
    }
}
