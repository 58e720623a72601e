use image::Rgb;

use crate::glyph::series::Frame;
use crate::DisplayError;

/// Exclusive handle to a pixel panel with an off-screen buffer.
///
/// Frames are staged off screen and only reach the device on `present`, so composing or
/// encoding a frame never shows through. How atomic `present` itself is depends on the device.
pub trait Panel: Send + 'static {
    fn size(&self) -> (u32, u32);

    /// Draws `frame` into the off-screen buffer. `None` stages an all-black buffer.
    fn stage(&mut self, frame: Option<&Frame>) -> Result<(), DisplayError>;

    /// Copies the off-screen buffer to the device in one write.
    ///
    /// This is a copy rather than a page flip: a device that scans out while the copy is in
    /// flight can show the old frame above the new one for a single refresh.
    fn present(&mut self) -> Result<(), DisplayError>;

    fn blank(&mut self) -> Result<(), DisplayError> {
        self.stage(None)?;
        self.present()
    }

    fn check_size(&self, frame: &Frame) -> Result<(), DisplayError> {
        let (width, height) = self.size();
        if frame.dimensions() != (width, height) {
            return Err(DisplayError::PanelSize {
                width,
                height,
                frame_width: frame.width(),
                frame_height: frame.height(),
            });
        }
        Ok(())
    }
}

/// Order in which the panel expects the color channels of each pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

impl ChannelOrder {
    pub fn apply(self, color: Rgb<u8>) -> [u8; 3] {
        let [r, g, b] = color.0;
        match self {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Rbg => [r, b, g],
            ChannelOrder::Grb => [g, r, b],
            ChannelOrder::Gbr => [g, b, r],
            ChannelOrder::Brg => [b, r, g],
            ChannelOrder::Bgr => [b, g, r],
        }
    }
}

/// Memory layout of one pixel in the device buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelFormat {
    #[default]
    Rgb565,
    Xrgb8888,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Xrgb8888 => 4,
        }
    }

    /// Writes one pixel, little-endian, into `out`.
    pub fn encode(self, [r, g, b]: [u8; 3], out: &mut [u8]) {
        match self {
            PixelFormat::Rgb565 => {
                let mut rgb565: u16 = (r as u16 & 0b1111_1000) << 8;
                rgb565 |= (g as u16 & 0b1111_1100) << 3;
                rgb565 |= (b as u16) >> 3;
                out[..2].copy_from_slice(&rgb565.to_le_bytes());
            },
            PixelFormat::Xrgb8888 => {
                let xrgb = u32::from_be_bytes([0, r, g, b]);
                out[..4].copy_from_slice(&xrgb.to_le_bytes());
            },
        }
    }
}

/// Per-pixel color adjustments applied on the way to the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorTuning {
    /// Percentage in `0..=100`.
    pub brightness: u8,
    pub channel_order: ChannelOrder,
}

impl Default for ColorTuning {
    fn default() -> Self {
        Self { brightness: 100, channel_order: ChannelOrder::Rgb }
    }
}

impl ColorTuning {
    pub fn apply(&self, color: Rgb<u8>) -> [u8; 3] {
        let brightness = u16::from(self.brightness.min(100));
        let scaled = color.0.map(|channel| (u16::from(channel) * brightness / 100) as u8);
        self.channel_order.apply(Rgb(scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_orders() {
        let color = Rgb([1, 2, 3]);
        assert_eq!(ChannelOrder::Rgb.apply(color), [1, 2, 3]);
        assert_eq!(ChannelOrder::Rbg.apply(color), [1, 3, 2]);
        assert_eq!(ChannelOrder::Bgr.apply(color), [3, 2, 1]);
        assert_eq!(ChannelOrder::Gbr.apply(color), [2, 3, 1]);
    }

    #[test]
    fn rgb565_packing() {
        let mut out = [0u8; 2];
        PixelFormat::Rgb565.encode([255, 0, 0], &mut out);
        assert_eq!(u16::from_le_bytes(out), 0b1111_1000_0000_0000);
        PixelFormat::Rgb565.encode([0, 255, 0], &mut out);
        assert_eq!(u16::from_le_bytes(out), 0b0000_0111_1110_0000);
        PixelFormat::Rgb565.encode([255, 255, 255], &mut out);
        assert_eq!(u16::from_le_bytes(out), 0xFFFF);
    }

    #[test]
    fn xrgb8888_is_bgrx_in_memory() {
        let mut out = [0u8; 4];
        PixelFormat::Xrgb8888.encode([10, 20, 30], &mut out);
        assert_eq!(out, [30, 20, 10, 0]);
    }

    #[test]
    fn brightness_scales_before_reordering() {
        let tuning = ColorTuning { brightness: 50, channel_order: ChannelOrder::Rbg };
        assert_eq!(tuning.apply(Rgb([200, 100, 0])), [100, 0, 50]);
        assert_eq!(ColorTuning::default().apply(Rgb([7, 8, 9])), [7, 8, 9]);
    }
}
