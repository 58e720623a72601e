use std::ops::{Deref, DerefMut};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};
use parking_lot::Mutex;

use super::panel::Panel;
use crate::glyph::series::{AnimationSequence, Frame};
use crate::DisplayError;

/// Message from the producer to the frame player.
#[derive(Clone, Debug)]
pub enum DisplayCommand {
    Show(AnimationSequence),
    Clear,
    Shutdown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerMode {
    /// Nothing published; the panel is kept black.
    #[default]
    Idle,
    /// A single frame is held.
    Static,
    /// A multi-frame sequence is looped.
    Animating,
}

/// How long the player holds each state before polling for commands again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerTiming {
    pub idle_hold: Duration,
    pub static_hold: Duration,
    /// Time each animation frame stays up; this sets the scroll speed.
    pub frame_hold: Duration,
    /// Capacity of the command queue.
    pub queue_depth: usize,
}

impl Default for PlayerTiming {
    fn default() -> Self {
        Self {
            idle_hold: Duration::from_millis(100),
            static_hold: Duration::from_millis(500),
            frame_hold: Duration::from_millis(100),
            queue_depth: 8,
        }
    }
}

/// The sequence being played and the position within it.
#[derive(Clone, Debug, Default)]
pub struct PlayerState {
    sequence: Option<AnimationSequence>,
    frame_index: usize,
}

impl PlayerState {
    pub fn mode(&self) -> PlayerMode {
        match &self.sequence {
            None => PlayerMode::Idle,
            Some(sequence) if sequence.is_static() => PlayerMode::Static,
            Some(_) => PlayerMode::Animating,
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Replaces whatever is playing and rewinds to the first frame.
    pub fn publish(&mut self, sequence: Option<AnimationSequence>) {
        self.sequence = sequence;
        self.frame_index = 0;
    }

    pub fn current(&self) -> Option<&Frame> {
        self.sequence.as_ref().and_then(|sequence| sequence.frame(self.frame_index))
    }

    pub fn advance(&mut self) {
        if let Some(sequence) = &self.sequence {
            self.frame_index = sequence.next_index(self.frame_index);
        }
    }

    pub fn hold(&self, timing: &PlayerTiming) -> Duration {
        match self.mode() {
            PlayerMode::Idle => timing.idle_hold,
            PlayerMode::Static => timing.static_hold,
            PlayerMode::Animating => timing.frame_hold,
        }
    }
}

/// Snapshot of the player, published after every rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerReport {
    pub running: bool,
    pub mode: PlayerMode,
    /// Index of the frame most recently presented.
    pub frame_index: usize,
    pub frames_presented: u64,
}

enum Poll {
    Continue,
    Shutdown,
}

/// Worker that owns the panel and plays the last published sequence on its own clock.
pub struct FramePlayer<P: Panel> {
    panel: P,
    commands: Receiver<DisplayCommand>,
    timing: PlayerTiming,
    report: Arc<Mutex<PlayerReport>>,
}

impl<P: Panel> FramePlayer<P> {
    pub fn new(
        panel: P,
        commands: Receiver<DisplayCommand>,
        timing: PlayerTiming,
        report: Arc<Mutex<PlayerReport>>,
    ) -> Self {
        Self { panel, commands, timing, report }
    }

    /// Plays until a shutdown command arrives or the producer goes away.
    ///
    /// The panel is blanked on every way out of this function, unwinding included.
    pub fn run(self) -> Result<(), DisplayError> {
        let FramePlayer { panel, commands, timing, report } = self;
        let mut panel = BlankOnExit(panel);
        let mut state = PlayerState::default();
        let mut frames_presented = 0;

        *report.lock() = PlayerReport { running: true, ..PlayerReport::default() };
        debug!("frame player started");

        let result = loop {
            if let Poll::Shutdown = drain(&commands, &mut state) {
                break Ok(());
            }

            if let Err(err) = render(&mut *panel, &state) {
                error!("frame player failed to render: {err}");
                break Err(err);
            }

            frames_presented += 1;
            *report.lock() = PlayerReport {
                running: true,
                mode: state.mode(),
                frame_index: state.frame_index(),
                frames_presented,
            };

            let hold = state.hold(&timing);
            state.advance();
            thread::sleep(hold);
        };

        drop(panel);
        report.lock().running = false;
        debug!("frame player stopped after {frames_presented} frames");
        result
    }
}

/// Applies every queued command, keeping only the effect of the latest one.
fn drain(commands: &Receiver<DisplayCommand>, state: &mut PlayerState) -> Poll {
    let mut latest = None;
    loop {
        match commands.try_recv() {
            Ok(DisplayCommand::Shutdown) => return Poll::Shutdown,
            Ok(command) => latest = Some(command),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                warn!("display command channel closed without shutdown");
                return Poll::Shutdown;
            },
        }
    }

    match latest {
        Some(DisplayCommand::Show(sequence)) => {
            debug!("playing {} frame sequence", sequence.len());
            state.publish(Some(sequence));
        },
        Some(DisplayCommand::Clear) => {
            debug!("clearing panel");
            state.publish(None);
        },
        Some(DisplayCommand::Shutdown) | None => {},
    }

    Poll::Continue
}

fn render<P: Panel>(panel: &mut P, state: &PlayerState) -> Result<(), DisplayError> {
    panel.stage(state.current())?;
    panel.present()
}

/// Blanks the wrapped panel when dropped.
struct BlankOnExit<P: Panel>(P);

impl<P: Panel> Deref for BlankOnExit<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.0
    }
}

impl<P: Panel> DerefMut for BlankOnExit<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.0
    }
}

impl<P: Panel> Drop for BlankOnExit<P> {
    fn drop(&mut self) {
        if let Err(err) = self.0.blank() {
            warn!("failed to blank panel on exit: {err}");
        }
    }
}
