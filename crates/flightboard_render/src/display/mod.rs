pub mod framebuffer;
pub mod matrix;
pub mod panel;
pub mod player;
pub mod simulator;

use std::collections::BTreeMap;

use log::info;

use crate::glyph::series::Frame;
use crate::DisplayError;
use framebuffer::{FramebufferPanel, FramebufferSettings};
use matrix::MatrixSink;
use player::PlayerTiming;
use simulator::{SimulatorSettings, SimulatorSink};

/// Key under which [`ShowMetadata`] stores the label used to name simulator output.
pub const LABEL_KEY: &str = "label";

/// Where composed frames end up.
///
/// Implementations are interchangeable: the producer only ever starts the sink, publishes
/// sequences or clears it, and finally stops it.
pub trait DisplaySink: Send {
    /// Begins background rendering. Calling it again while running is a no-op.
    fn start(&mut self) -> Result<(), DisplayError>;

    /// Stops rendering and blocks until the panel has been blanked and released.
    fn stop(&mut self) -> Result<(), DisplayError>;

    /// Publishes a new sequence. An empty list clears the display.
    fn show(&mut self, frames: Vec<Frame>, metadata: &ShowMetadata) -> Result<(), DisplayError>;

    fn clear(&mut self) -> Result<(), DisplayError>;
}

/// Free-form annotations sent along with a published sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShowMetadata {
    entries: BTreeMap<String, String>,
}

impl ShowMetadata {
    pub fn with_label(label: impl Into<String>) -> Self {
        let mut metadata = Self::default();
        metadata.insert(LABEL_KEY, label);
        metadata
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.get(LABEL_KEY).filter(|label| !label.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayBackend {
    /// Use the framebuffer when one can be opened, the simulator otherwise.
    #[default]
    Auto,
    Matrix,
    Simulator,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplaySettings {
    pub backend: DisplayBackend,
    pub framebuffer: FramebufferSettings,
    pub simulator: SimulatorSettings,
}

/// Builds the sink selected by `settings.backend`.
pub fn open_display(
    settings: &DisplaySettings,
    timing: PlayerTiming,
) -> Result<Box<dyn DisplaySink>, DisplayError> {
    let use_matrix = match settings.backend {
        DisplayBackend::Matrix => true,
        DisplayBackend::Simulator => false,
        DisplayBackend::Auto => FramebufferPanel::probe(&settings.framebuffer.path),
    };

    if use_matrix {
        let panel = FramebufferPanel::open(&settings.framebuffer)?;
        info!("driving panel at {}", panel.path().display());
        Ok(Box::new(MatrixSink::new(panel, timing)))
    } else {
        info!("no panel selected, using file-based simulator");
        Ok(Box::new(SimulatorSink::new(settings.simulator.clone())?))
    }
}
