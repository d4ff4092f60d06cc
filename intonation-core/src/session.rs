//! # Scoring Session
//!
//! Runs a [`ScoringEngine`] on a dedicated thread, fed by two independent
//! producer channels. The thread is the single consumer: every event is
//! processed to completion before the next is taken, so the engine never sees
//! concurrent mutation.
//!
//! ## Architecture
//! - **Producers**: the playback cursor sends `ExpectedNoteEvent`s, the pitch
//!   estimator sends `DetectedPitchEvent`s, each on its own channel
//! - **Scoring Thread**: `crossbeam_channel::select!` over both inputs plus a
//!   shutdown channel
//! - **Snapshots**: after every event the current score and readout are pushed
//!   to the presentation layer without blocking
//!
//! Order across the two channels is not preserved. Live producers are paced by
//! playback and audio, which is enough; a producer replaying a recording must
//! wait for each event's snapshot before sending the next.

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::{
    LiveReadout,
    events::{DetectedPitchEvent, ExpectedNoteEvent},
    scorer::{Credit, ScoreState, ScoringEngine},
};

/// The two inbound event streams, handed to the session explicitly.
#[derive(Debug)]
pub struct SessionInputs {
    pub expected: Receiver<ExpectedNoteEvent>,
    pub detected: Receiver<DetectedPitchEvent>,
}

/// State published after each processed event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub score: ScoreState,
    pub readout: LiveReadout,
    /// Credit awarded by this event, if any.
    pub credit: Option<Credit>,
}

pub struct Session;

impl Session {
    /// Starts the scoring thread.
    ///
    /// # Arguments
    /// * `engine` - The engine to drive; its score carries over
    /// * `inputs` - Receivers for the expected-note and detected-pitch streams
    /// * `snapshots` - Where to publish a `Snapshot` after each event. Sends
    ///   never block: if a bounded channel is full the snapshot is dropped
    ///
    /// # Returns
    /// * `Ok(SessionHandle)` - Handle used to stop or join the thread
    /// * `Err(e)` - The thread could not be spawned
    pub fn spawn(
        engine: ScoringEngine,
        inputs: SessionInputs,
        snapshots: Sender<Snapshot>,
    ) -> Result<SessionHandle> {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let thread_handle = thread::Builder::new()
            .name("scoring".into())
            .spawn(move || run(engine, inputs, shutdown_rx, snapshots))
            .map_err(|e| anyhow!("Failed to spawn scoring thread: {}", e))?;

        log::info!("Scoring session started");
        Ok(SessionHandle {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        })
    }
}

/// Handle to a running scoring thread.
#[derive(Debug)]
pub struct SessionHandle {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<ScoringEngine>>,
}

impl SessionHandle {
    /// Signals shutdown and waits for the thread. Pending targets and the
    /// stability window are discarded; the score is returned intact.
    pub fn stop(mut self) -> Result<ScoringEngine> {
        // The thread may already have exited on its own
        let _ = self.shutdown_tx.try_send(());
        self.finish()
    }

    /// Waits for both producers to disconnect, then returns the engine.
    pub fn join(mut self) -> Result<ScoringEngine> {
        self.finish()
    }

    fn finish(&mut self) -> Result<ScoringEngine> {
        let handle = self
            .thread_handle
            .take()
            .ok_or_else(|| anyhow!("Scoring thread already joined"))?;
        let mut engine = handle
            .join()
            .map_err(|_| anyhow!("Scoring thread panicked"))?;
        engine.stop();
        Ok(engine)
    }
}

fn run(
    mut engine: ScoringEngine,
    inputs: SessionInputs,
    shutdown_rx: Receiver<()>,
    snapshots: Sender<Snapshot>,
) -> ScoringEngine {
    let SessionInputs {
        mut expected,
        mut detected,
    } = inputs;
    let mut expected_open = true;
    let mut detected_open = true;

    while expected_open || detected_open {
        let snapshot = crossbeam_channel::select! {
            recv(expected) -> msg => match msg {
                Ok(event) => {
                    engine.on_expected(&event);
                    Some(Snapshot {
                        score: engine.score(),
                        readout: engine.live_readout(),
                        credit: None,
                    })
                }
                Err(_) => {
                    log::debug!("Expected-note producer disconnected");
                    expected = crossbeam_channel::never();
                    expected_open = false;
                    None
                }
            },
            recv(detected) -> msg => match msg {
                Ok(event) => {
                    let outcome = engine.on_detected(&event);
                    Some(Snapshot {
                        score: engine.score(),
                        readout: outcome.readout,
                        credit: outcome.credit,
                    })
                }
                Err(_) => {
                    log::debug!("Detected-pitch producer disconnected");
                    detected = crossbeam_channel::never();
                    detected_open = false;
                    None
                }
            },
            recv(shutdown_rx) -> _ => {
                log::info!("Scoring session received shutdown signal");
                break;
            },
        };

        if let Some(snapshot) = snapshot {
            if let Err(e) = snapshots.try_send(snapshot) {
                log::debug!("Snapshot dropped: {}", e);
            }
        }
    }

    log::info!("Scoring session finished");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerConfig;

    #[test]
    fn join_returns_after_producers_hang_up() {
        let engine = ScoringEngine::new(ScorerConfig::default()).unwrap();
        let (expected_tx, expected_rx) = crossbeam_channel::unbounded();
        let (detected_tx, detected_rx) = crossbeam_channel::unbounded::<DetectedPitchEvent>();
        let (snapshot_tx, snapshot_rx) = crossbeam_channel::unbounded();

        let handle = Session::spawn(
            engine,
            SessionInputs {
                expected: expected_rx,
                detected: detected_rx,
            },
            snapshot_tx,
        )
        .unwrap();

        expected_tx.send(ExpectedNoteEvent::new(0.0, vec![60.0])).unwrap();
        drop(expected_tx);
        drop(detected_tx);

        let engine = handle.join().unwrap();
        assert_eq!(engine.score().total, 1);
        assert!(engine.pending().is_empty());
        assert_eq!(snapshot_rx.iter().count(), 1);
    }
}
