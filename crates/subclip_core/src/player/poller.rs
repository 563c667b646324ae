//! Background polling loop for a [`PlaybackSession`].
//!
//! The session is moved into a tokio task that samples the controller on a
//! fixed interval and publishes [`OverlayFrame`]s through a `watch`
//! channel. Commands arrive over an `mpsc` channel and are applied between
//! ticks, so the session is only ever touched by one task.
//!
//! Dropping the [`PollerHandle`] aborts the task.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::controller::{PlaybackController, PlayerError};
use super::session::{OverlayFrame, PlaybackSession, PlayerCommand};

/// Queued commands beyond this make `send` wait.
const COMMAND_BUFFER: usize = 32;

/// Handle to a running poller.
pub struct PollerHandle<C> {
    commands: Option<mpsc::Sender<PlayerCommand>>,
    frames: watch::Receiver<OverlayFrame>,
    task: Option<JoinHandle<PlaybackSession<C>>>,
}

/// Start polling `session` every `period`.
///
/// Must be called from within a tokio runtime. A zero period is raised to
/// one millisecond.
pub fn spawn_poller<C>(mut session: PlaybackSession<C>, period: Duration) -> PollerHandle<C>
where
    C: PlaybackController + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (frame_tx, frame_rx) = watch::channel(session.tick());

    tracing::debug!("[Poller] Starting with {}ms interval", period.as_millis());
    let task = tokio::spawn(run(session, period, command_rx, frame_tx));

    PollerHandle {
        commands: Some(command_tx),
        frames: frame_rx,
        task: Some(task),
    }
}

async fn run<C: PlaybackController>(
    mut session: PlaybackSession<C>,
    period: Duration,
    mut commands: mpsc::Receiver<PlayerCommand>,
    frames: watch::Sender<OverlayFrame>,
) -> PlaybackSession<C> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => publish(&frames, session.tick()),
            command = commands.recv() => match command {
                Some(command) => {
                    if let Err(e) = session.apply(command) {
                        tracing::warn!("[Poller] Command failed: {}", e);
                    }
                    // Reflect the change without waiting for the next tick
                    publish(&frames, session.tick());
                }
                None => break,
            },
        }
    }

    tracing::debug!("[Poller] Stopped");
    session
}

fn publish(frames: &watch::Sender<OverlayFrame>, frame: OverlayFrame) {
    frames.send_if_modified(|current| {
        if *current == frame {
            false
        } else {
            *current = frame;
            true
        }
    });
}

impl<C> PollerHandle<C> {
    /// Queue a command for the session.
    pub async fn send(&self, command: PlayerCommand) -> Result<(), PlayerError> {
        let sender = self.commands.as_ref().ok_or(PlayerError::SessionClosed)?;
        sender
            .send(command)
            .await
            .map_err(|_| PlayerError::SessionClosed)
    }

    /// A receiver that observes every published frame.
    pub fn frames(&self) -> watch::Receiver<OverlayFrame> {
        self.frames.clone()
    }

    /// The most recently published frame.
    pub fn latest(&self) -> OverlayFrame {
        self.frames.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Abort the polling task immediately. The session is dropped.
    pub fn stop(&mut self) {
        self.commands = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop after applying already queued commands and return the session.
    ///
    /// Returns `None` if the task was already stopped or panicked.
    pub async fn shutdown(mut self) -> Option<PlaybackSession<C>> {
        self.commands = None;
        let task = self.task.take()?;
        match task.await {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!("[Poller] Task ended abnormally: {}", e);
                None
            }
        }
    }
}

impl<C> Drop for PollerHandle<C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
