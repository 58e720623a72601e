use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use parking_lot::Mutex;

use super::panel::Panel;
use super::player::{DisplayCommand, FramePlayer, PlayerReport, PlayerTiming};
use super::{DisplaySink, ShowMetadata};
use crate::glyph::series::{AnimationSequence, Frame};
use crate::DisplayError;

/// Sink that hands frames to a background [`FramePlayer`] driving a hardware panel.
pub struct MatrixSink<P: Panel> {
    /// Held until `start` moves it onto the player thread.
    panel: Option<P>,
    size: (u32, u32),
    timing: PlayerTiming,
    commands: Option<SyncSender<DisplayCommand>>,
    worker: Option<JoinHandle<Result<(), DisplayError>>>,
    report: Arc<Mutex<PlayerReport>>,
}

impl<P: Panel> MatrixSink<P> {
    pub fn new(panel: P, timing: PlayerTiming) -> Self {
        let size = panel.size();
        Self {
            panel: Some(panel),
            size,
            timing,
            commands: None,
            worker: None,
            report: Arc::new(Mutex::new(PlayerReport::default())),
        }
    }

    pub fn report(&self) -> PlayerReport {
        *self.report.lock()
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().map_or(false, |worker| !worker.is_finished())
    }

    fn send(&self, command: DisplayCommand) -> Result<(), DisplayError> {
        let commands = self.commands.as_ref().ok_or(DisplayError::NotStarted)?;
        commands.send(command).map_err(|_| DisplayError::PlayerGone)
    }

    fn check_frames(&self, frames: &[Frame]) -> Result<(), DisplayError> {
        let (width, height) = self.size;
        match frames.iter().find(|frame| frame.dimensions() != self.size) {
            Some(frame) => Err(DisplayError::PanelSize {
                width,
                height,
                frame_width: frame.width(),
                frame_height: frame.height(),
            }),
            None => Ok(()),
        }
    }
}

impl<P: Panel> DisplaySink for MatrixSink<P> {
    fn start(&mut self) -> Result<(), DisplayError> {
        if self.worker.is_some() {
            return Ok(());
        }

        let panel = self.panel.take().ok_or(DisplayError::Released)?;
        let (sender, receiver) = mpsc::sync_channel(self.timing.queue_depth.max(1));
        let player = FramePlayer::new(panel, receiver, self.timing, self.report.clone());
        let worker =
            thread::Builder::new().name("frame-player".into()).spawn(move || player.run())?;

        info!("started frame player for {}x{} panel", self.size.0, self.size.1);
        self.commands = Some(sender);
        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DisplayError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        info!("stopping frame player");
        if let Some(commands) = self.commands.take() {
            // The player may already have exited on an error; join reports it.
            let _ = commands.send(DisplayCommand::Shutdown);
        }

        match worker.join() {
            Ok(result) => result,
            Err(_) => Err(DisplayError::WorkerPanicked),
        }
    }

    fn show(&mut self, frames: Vec<Frame>, _metadata: &ShowMetadata) -> Result<(), DisplayError> {
        self.check_frames(&frames)?;
        match AnimationSequence::new(frames) {
            Some(sequence) => self.send(DisplayCommand::Show(sequence)),
            None => self.clear(),
        }
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.send(DisplayCommand::Clear)
    }
}

impl<P: Panel> Drop for MatrixSink<P> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(err) = self.stop() {
                warn!("frame player did not stop cleanly: {err}");
            }
        }
    }
}
