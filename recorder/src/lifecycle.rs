use std::fmt;
use std::future::Future;

use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;

use crate::capture::FrameSource;
use crate::detect::traits::BackgroundModel;
use crate::recorder::{Recorder, RecorderError, RecorderStats};
use crate::writer::FrameSink;

/// Process-level state. A fatal loop error ends the process without passing
/// through `Stopping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Starting => "STARTING",
            Phase::Running => "RUNNING",
            Phase::Stopping => "STOPPING",
            Phase::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

pub fn transition(from: Phase, to: Phase) {
    info!(%from, %to, "lifecycle transition");
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Recorder(#[from] RecorderError),
    #[error("recording task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Sending half of the single-slot stop channel.
pub struct StopHandle {
    tx: mpsc::Sender<()>,
}

impl StopHandle {
    /// Ask the loop to stop. Returns `false` if a request is already pending
    /// or the loop is gone; extra requests are dropped, never queued.
    pub fn request(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

pub fn stop_channel() -> (StopHandle, mpsc::Receiver<()>) {
    let (tx, rx) = mpsc::channel(1);
    (StopHandle { tx }, rx)
}

/// SIGINT and SIGTERM listeners, registered up front so a failure to install
/// them surfaces before recording starts.
pub struct TerminationSignals {
    interrupt: Signal,
    terminate: Signal,
}

impl TerminationSignals {
    pub fn register() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Resolves with the name of the first signal received.
    pub async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

/// Run the recorder on its own task and stop it when `shutdown` resolves.
///
/// `shutdown` runs on a second task and, when it resolves, sends exactly one
/// stop request. The caller is blocked until the recording task completes.
pub async fn run_until_shutdown<S, W, M, F>(
    recorder: Recorder<S, W, M>,
    shutdown: F,
) -> Result<RecorderStats, LifecycleError>
where
    S: FrameSource + 'static,
    W: FrameSink + 'static,
    M: BackgroundModel + 'static,
    F: Future<Output = &'static str> + Send + 'static,
{
    let (stop, stop_rx) = stop_channel();

    let recording = tokio::spawn(recorder.run(stop_rx));
    transition(Phase::Starting, Phase::Running);

    let watcher = tokio::spawn(async move {
        let reason = shutdown.await;
        info!(reason, "termination requested");
        transition(Phase::Running, Phase::Stopping);
        stop.request();
    });

    let outcome = recording.await;
    watcher.abort();

    let stats = outcome??;
    transition(Phase::Stopping, Phase::Stopped);
    Ok(stats)
}
