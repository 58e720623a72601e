use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::panel::{ColorTuning, Panel, PixelFormat};
use crate::glyph::series::Frame;
use crate::DisplayError;

pub const DEFAULT_DEVICE: &str = "/dev/fb0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramebufferSettings {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub tuning: ColorTuning,
}

impl Default for FramebufferSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DEVICE),
            width: 64,
            height: 32,
            pixel_format: PixelFormat::Rgb565,
            tuning: ColorTuning { brightness: 50, ..ColorTuning::default() },
        }
    }
}

/// Panel backed by a Linux framebuffer device (or any writable file laid out like one).
#[derive(Debug)]
pub struct FramebufferPanel {
    device: File,
    settings: FramebufferSettings,
    back: Vec<u8>,
}

impl FramebufferPanel {
    /// Opens the device for writing. Failure here means there is no display to drive.
    pub fn open(settings: &FramebufferSettings) -> Result<Self, DisplayError> {
        let device = OpenOptions::new().write(true).open(&settings.path).map_err(|source| {
            DisplayError::DeviceUnavailable { path: settings.path.clone(), source }
        })?;

        let len = settings.width as usize
            * settings.height as usize
            * settings.pixel_format.bytes_per_pixel();
        debug!(
            "opened framebuffer {} ({}x{}, {:?})",
            settings.path.display(),
            settings.width,
            settings.height,
            settings.pixel_format
        );

        Ok(Self { device, settings: settings.clone(), back: vec![0; len] })
    }

    /// Whether a writable device exists at `path`.
    pub fn probe(path: &Path) -> bool {
        OpenOptions::new().write(true).open(path).is_ok()
    }

    pub fn path(&self) -> &Path {
        &self.settings.path
    }
}

impl Panel for FramebufferPanel {
    fn size(&self) -> (u32, u32) {
        (self.settings.width, self.settings.height)
    }

    fn stage(&mut self, frame: Option<&Frame>) -> Result<(), DisplayError> {
        let Some(frame) = frame else {
            self.back.fill(0);
            return Ok(());
        };

        self.check_size(frame)?;

        let format = self.settings.pixel_format;
        let tuning = self.settings.tuning;
        let chunks = self.back.chunks_exact_mut(format.bytes_per_pixel());
        for (out, pixel) in chunks.zip(frame.image().pixels()) {
            format.encode(tuning.apply(*pixel), out);
        }
        Ok(())
    }

    // One write to the device file; fbdev panning is not used.
    fn present(&mut self) -> Result<(), DisplayError> {
        self.device.seek(SeekFrom::Start(0))?;
        self.device.write_all(&self.back)?;
        self.device.flush()?;
        Ok(())
    }
}
