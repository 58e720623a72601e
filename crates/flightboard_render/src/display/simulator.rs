use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame as GifFrame, ImageOutputFormat, RgbImage};
use log::info;

use super::{DisplaySink, ShowMetadata};
use crate::glyph::series::{Frame, BLACK};
use crate::DisplayError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulatorSettings {
    pub output_dir: PathBuf,
    pub file_prefix: String,
    /// Diameter of one simulated LED in output pixels.
    pub dot_size: u32,
    /// Spacing between neighbouring LEDs in output pixels.
    pub dot_gap: u32,
    pub frame_delay: Duration,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("simulated_displays"),
            file_prefix: "flight_display".into(),
            dot_size: 4,
            dot_gap: 1,
            frame_delay: Duration::from_millis(100),
        }
    }
}

/// Stand-in for the panel that writes each published sequence to disk.
///
/// A still frame becomes a PNG and an animation becomes a looping GIF.
#[derive(Debug)]
pub struct SimulatorSink {
    settings: SimulatorSettings,
    last_artifact: Option<PathBuf>,
}

impl SimulatorSink {
    pub fn new(settings: SimulatorSettings) -> Result<Self, DisplayError> {
        fs::create_dir_all(&settings.output_dir)?;
        info!("simulator active, images will be saved in {}", settings.output_dir.display());
        Ok(Self { settings, last_artifact: None })
    }

    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    /// Path of the most recently written image.
    pub fn last_artifact(&self) -> Option<&Path> {
        self.last_artifact.as_deref()
    }

    pub fn artifact_path(&self, metadata: &ShowMetadata, animated: bool) -> PathBuf {
        let label = sanitize_label(metadata.label().unwrap_or("unknown"));
        let extension = if animated { "gif" } else { "png" };
        self.settings.output_dir.join(format!("{}_{label}.{extension}", self.settings.file_prefix))
    }

    /// Upscales `frame` so every lit pixel is drawn as a round LED.
    pub fn render_dots(&self, frame: &Frame) -> RgbImage {
        let dot = self.settings.dot_size.max(1);
        let cell = dot + self.settings.dot_gap;
        let width = (frame.width() * cell).saturating_sub(self.settings.dot_gap);
        let height = (frame.height() * cell).saturating_sub(self.settings.dot_gap);

        let center = (dot as f32 - 1.0) / 2.0;
        let radius_sq = (dot as f32 / 2.0).powi(2);
        let mask: Vec<bool> = (0..dot * dot)
            .map(|idx| {
                let dx = (idx % dot) as f32 - center;
                let dy = (idx / dot) as f32 - center;
                dx * dx + dy * dy <= radius_sq
            })
            .collect();

        let mut out = RgbImage::new(width, height);
        for (x, y, pixel) in frame.image().enumerate_pixels() {
            if *pixel == BLACK {
                continue;
            }
            for (idx, _) in mask.iter().enumerate().filter(|(_, inside)| **inside) {
                let idx = idx as u32;
                out.put_pixel(x * cell + idx % dot, y * cell + idx / dot, *pixel);
            }
        }
        out
    }

    fn write_still(&self, frame: &Frame, path: &Path) -> Result<(), DisplayError> {
        let mut bytes = Cursor::new(Vec::new());
        self.render_dots(frame).write_to(&mut bytes, ImageOutputFormat::Png)?;
        fs::write(path, bytes.into_inner())?;
        Ok(())
    }

    fn write_animation(&self, frames: &[Frame], path: &Path) -> Result<(), DisplayError> {
        let delay_ms = self.settings.frame_delay.as_millis().min(u32::MAX as u128) as u32;
        let delay = Delay::from_numer_denom_ms(delay_ms, 1);

        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder.set_repeat(Repeat::Infinite)?;
            encoder.encode_frames(frames.iter().map(|frame| {
                let rgba = DynamicImage::ImageRgb8(self.render_dots(frame)).into_rgba8();
                GifFrame::from_parts(rgba, 0, 0, delay)
            }))?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl DisplaySink for SimulatorSink {
    fn start(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn show(&mut self, frames: Vec<Frame>, metadata: &ShowMetadata) -> Result<(), DisplayError> {
        let path = match frames.as_slice() {
            [] => return self.clear(),
            [frame] => {
                let path = self.artifact_path(metadata, false);
                self.write_still(frame, &path)?;
                info!("saved image to {}", path.display());
                path
            },
            frames => {
                let path = self.artifact_path(metadata, true);
                self.write_animation(frames, &path)?;
                info!("saved {} frame animation to {}", frames.len(), path.display());
                path
            },
        };

        self.last_artifact = Some(path);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        info!("simulator: clearing display (no action needed)");
        Ok(())
    }
}

/// Replaces anything that is not ASCII alphanumeric, `-` or `_` with `-`.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, GenericImageView, Rgb};

    use super::*;
    use crate::glyph::grid::PixelGrid;

    fn sink(dir: &Path) -> SimulatorSink {
        let settings =
            SimulatorSettings { output_dir: dir.join("out"), ..SimulatorSettings::default() };
        SimulatorSink::new(settings).unwrap()
    }

    fn frame_with_pixel(x: i32, y: i32) -> Frame {
        let mut grid = PixelGrid::new(64, 32);
        grid.set(x, y);
        Frame::from_grid(&grid, Rgb([255, 255, 0]))
    }

    #[test]
    fn labels_are_made_path_safe() {
        assert_eq!(sanitize_label("BA/123"), "BA-123");
        assert_eq!(sanitize_label("../x y"), "---x-y");
        assert_eq!(sanitize_label("EZY_12-A"), "EZY_12-A");
    }

    #[test]
    fn dots_are_round_and_spaced() {
        let dir = tempfile::tempdir().unwrap();
        let sink = sink(dir.path());
        let image = sink.render_dots(&frame_with_pixel(1, 0));

        assert_eq!(image.dimensions(), (64 * 5 - 1, 32 * 5 - 1));
        // Corners of the 4x4 dot stay dark, the middle is lit.
        assert_eq!(*image.get_pixel(5, 0), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(6, 1), Rgb([255, 255, 0]));
        assert_eq!(*image.get_pixel(7, 2), Rgb([255, 255, 0]));
        assert_eq!(*image.get_pixel(8, 3), Rgb([0, 0, 0]));
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn still_frame_is_written_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(dir.path());
        sink.show(vec![frame_with_pixel(0, 0)], &ShowMetadata::with_label("BA/123")).unwrap();

        let path = sink.last_artifact().unwrap().to_path_buf();
        assert_eq!(path, dir.path().join("out").join("flight_display_BA-123.png"));
        let image = image::open(&path).unwrap();
        assert_eq!(image.dimensions(), (319, 159));
    }

    #[test]
    fn animation_is_written_as_looping_gif() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(dir.path());
        let frames = vec![frame_with_pixel(0, 0), frame_with_pixel(1, 0), frame_with_pixel(2, 0)];
        sink.show(frames, &ShowMetadata::default()).unwrap();

        let path = sink.last_artifact().unwrap().to_path_buf();
        assert_eq!(path.file_name().unwrap(), "flight_display_unknown.gif");

        let decoder = GifDecoder::new(File::open(&path).unwrap()).unwrap();
        let frames = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(frames.len(), 3);
        for frame in &frames {
            assert_eq!(Duration::from(frame.delay()), Duration::from_millis(100));
        }
    }

    #[cfg(unix)]
    #[test]
    fn failed_writes_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(dir.path());
        for extension in ["png", "gif"] {
            let target = sink.output_dir().join(format!("flight_display_BA1.{extension}"));
            std::os::unix::fs::symlink("/dev/full", target).unwrap();
        }
        let metadata = ShowMetadata::with_label("BA1");

        let still = sink.show(vec![frame_with_pixel(0, 0)], &metadata);
        assert!(matches!(still, Err(DisplayError::Io(_))), "{still:?}");

        let frames = vec![frame_with_pixel(0, 0), frame_with_pixel(1, 0)];
        let animation = sink.show(frames, &metadata);
        assert!(matches!(animation, Err(DisplayError::Io(_))), "{animation:?}");
        assert!(sink.last_artifact().is_none());
    }

    #[test]
    fn empty_show_clears_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = sink(dir.path());
        sink.start().unwrap();
        sink.show(Vec::new(), &ShowMetadata::default()).unwrap();
        sink.clear().unwrap();
        sink.stop().unwrap();

        assert!(sink.last_artifact().is_none());
        assert_eq!(fs::read_dir(sink.output_dir()).unwrap().count(), 0);
    }
}
