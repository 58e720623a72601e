use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use flightboard_render::{
    ArrivalGradient, ChannelOrder, ColorTuning, DisplayBackend, DisplaySettings, FlightMessage,
    FramebufferSettings, PanelGeometry, PixelFormat, PlayerTiming, SimulatorSettings,
    DEFAULT_DEVICE,
};
use serde::Deserialize;

/// Largest glyph scale accepted from a config file.
pub const MAX_SCALE: u32 = 16;

/// Contents of the board configuration file. Every section is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    pub panel: PanelConfig,
    pub player: PlayerConfig,
    pub gradient: GradientConfig,
    pub display: DisplayConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    pub width: u32,
    pub height: u32,
    pub margin: i32,
    pub rows: [i32; 3],
    pub scroll_gap: i32,
    pub scale: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let geometry = PanelGeometry::default();
        Self {
            width: geometry.width,
            height: geometry.height,
            margin: geometry.margin,
            rows: geometry.rows,
            scroll_gap: geometry.scroll_gap,
            scale: geometry.scale,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    pub idle_hold_ms: u64,
    pub static_hold_ms: u64,
    pub frame_hold_ms: u64,
    pub queue_depth: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { idle_hold_ms: 100, static_hold_ms: 500, frame_hold_ms: 100, queue_depth: 8 }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GradientConfig {
    pub early_span_secs: f64,
    pub late_span_secs: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        let gradient = ArrivalGradient::default();
        Self { early_span_secs: gradient.early_span_secs, late_span_secs: gradient.late_span_secs }
    }
}

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    #[default]
    Auto,
    Matrix,
    Simulator,
}

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormatChoice {
    #[default]
    Rgb565,
    Xrgb8888,
}

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrderChoice {
    #[default]
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub backend: BackendChoice,
    pub device: PathBuf,
    pub pixel_format: PixelFormatChoice,
    pub channel_order: ChannelOrderChoice,
    /// Percentage in `0..=100`.
    pub brightness: u8,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub dot_size: u32,
    pub dot_gap: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let simulator = SimulatorSettings::default();
        Self {
            backend: BackendChoice::Auto,
            device: PathBuf::from(DEFAULT_DEVICE),
            pixel_format: PixelFormatChoice::Rgb565,
            channel_order: ChannelOrderChoice::Rgb,
            brightness: 50,
            output_dir: simulator.output_dir,
            file_prefix: simulator.file_prefix,
            dot_size: simulator.dot_size,
            dot_gap: simulator.dot_gap,
        }
    }
}

impl BoardConfig {
    /// Reads `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        Self::parse(&text).with_context(|| format!("invalid config {:?}", path))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        let scale = config.panel.scale;
        ensure!(
            (1..=MAX_SCALE).contains(&scale),
            "panel scale must be between 1 and {MAX_SCALE}, got {scale}"
        );
        Ok(config)
    }

    pub fn geometry(&self) -> PanelGeometry {
        let panel = &self.panel;
        PanelGeometry {
            width: panel.width,
            height: panel.height,
            margin: panel.margin,
            rows: panel.rows,
            scroll_gap: panel.scroll_gap,
            scale: panel.scale.clamp(1, MAX_SCALE),
        }
    }

    pub fn timing(&self) -> PlayerTiming {
        let player = &self.player;
        PlayerTiming {
            idle_hold: Duration::from_millis(player.idle_hold_ms),
            static_hold: Duration::from_millis(player.static_hold_ms),
            frame_hold: Duration::from_millis(player.frame_hold_ms),
            queue_depth: player.queue_depth.max(1),
        }
    }

    pub fn gradient(&self) -> ArrivalGradient {
        ArrivalGradient {
            early_span_secs: self.gradient.early_span_secs,
            late_span_secs: self.gradient.late_span_secs,
        }
    }

    pub fn display_settings(&self) -> DisplaySettings {
        let display = &self.display;
        DisplaySettings {
            backend: display.backend.into(),
            framebuffer: FramebufferSettings {
                path: display.device.clone(),
                width: self.panel.width,
                height: self.panel.height,
                pixel_format: display.pixel_format.into(),
                tuning: ColorTuning {
                    brightness: display.brightness.min(100),
                    channel_order: display.channel_order.into(),
                },
            },
            simulator: SimulatorSettings {
                output_dir: display.output_dir.clone(),
                file_prefix: display.file_prefix.clone(),
                dot_size: display.dot_size,
                dot_gap: display.dot_gap,
                ..SimulatorSettings::default()
            },
        }
    }
}

impl From<BackendChoice> for DisplayBackend {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Auto => DisplayBackend::Auto,
            BackendChoice::Matrix => DisplayBackend::Matrix,
            BackendChoice::Simulator => DisplayBackend::Simulator,
        }
    }
}

impl From<PixelFormatChoice> for PixelFormat {
    fn from(choice: PixelFormatChoice) -> Self {
        match choice {
            PixelFormatChoice::Rgb565 => PixelFormat::Rgb565,
            PixelFormatChoice::Xrgb8888 => PixelFormat::Xrgb8888,
        }
    }
}

impl From<ChannelOrderChoice> for ChannelOrder {
    fn from(choice: ChannelOrderChoice) -> Self {
        match choice {
            ChannelOrderChoice::Rgb => ChannelOrder::Rgb,
            ChannelOrderChoice::Rbg => ChannelOrder::Rbg,
            ChannelOrderChoice::Grb => ChannelOrder::Grb,
            ChannelOrderChoice::Gbr => ChannelOrder::Gbr,
            ChannelOrderChoice::Brg => ChannelOrder::Brg,
            ChannelOrderChoice::Bgr => ChannelOrder::Bgr,
        }
    }
}

/// One message as stored in a message file.
///
/// The delay is taken from `delay_secs` when present, otherwise from the difference between
/// `estimated` and `scheduled` arrival timestamps.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MessageFile {
    pub origin_code: String,
    pub flight_number: String,
    pub city: String,
    pub aircraft: String,
    pub delay_secs: Option<i64>,
    pub scheduled: Option<i64>,
    pub estimated: Option<i64>,
}

impl MessageFile {
    pub fn load(path: &Path) -> Result<FlightMessage> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read message {:?}", path))?;
        let file: MessageFile =
            toml::from_str(&text).with_context(|| format!("invalid message {:?}", path))?;
        Ok(file.into_message())
    }

    pub fn into_message(self) -> FlightMessage {
        match (self.delay_secs, self.scheduled, self.estimated) {
            (None, Some(scheduled), Some(estimated)) => FlightMessage::from_times(
                self.origin_code,
                self.flight_number,
                self.city,
                self.aircraft,
                scheduled,
                estimated,
            ),
            (delay_secs, _, _) => FlightMessage::new(
                self.origin_code,
                self.flight_number,
                self.city,
                self.aircraft,
                delay_secs.unwrap_or(0),
            ),
        }
    }
}
