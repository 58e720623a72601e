mod board;
mod display;
mod glyph;

use std::path::PathBuf;

pub use board::{
    compose::{BodyLine, FrameComposer},
    geometry::PanelGeometry,
    message::FlightMessage,
};
pub use display::{
    framebuffer::{FramebufferPanel, FramebufferSettings, DEFAULT_DEVICE},
    matrix::MatrixSink,
    open_display,
    panel::{ChannelOrder, ColorTuning, Panel, PixelFormat},
    player::{DisplayCommand, FramePlayer, PlayerMode, PlayerReport, PlayerState, PlayerTiming},
    simulator::{sanitize_label, SimulatorSettings, SimulatorSink},
    DisplayBackend, DisplaySettings, DisplaySink, ShowMetadata, LABEL_KEY,
};
pub use glyph::{
    font::{Font, Glyph, GLYPH_HEIGHT},
    gradient::{status_color, ArrivalGradient, GREEN, RED, YELLOW},
    grid::{HorizontalClip, PixelGrid},
    layout::TextLayout,
    series::{AnimationSequence, Frame, BLACK},
};

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("display i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("display device {} unavailable: {source}", .path.display())]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("frame is {frame_width}x{frame_height} but the panel is {width}x{height}")]
    PanelSize { width: u32, height: u32, frame_width: u32, frame_height: u32 },
    #[error("display has not been started")]
    NotStarted,
    #[error("display was stopped and no longer owns a panel")]
    Released,
    #[error("frame player is no longer running")]
    PlayerGone,
    #[error("frame player panicked")]
    WorkerPanicked,
}
