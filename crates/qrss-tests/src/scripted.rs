//! An intake that plays a fixed recording and logs when it was used.
//!
//! All samples are queued up front and the stream closes immediately; the
//! feeder then holds the session open for the requested duration. This
//! keeps the spectral worker idle while a paused test clock advances.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use qrss_cli::clock::Clock;
use qrss_intake::{Capture, Intake, IntakeError, SampleStream};
use qrss_spec::Band;

/// Packet size used when queueing the recording.
const PACKET: usize = 512;

/// One use of the intake, in wall-clock time since the epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened {
    pub label: String,
    pub opened_at: Duration,
    /// When the feeder finished; `None` while still recording.
    pub closed_at: Option<Duration>,
}

/// Replays `samples` for every session.
pub struct ScriptedIntake {
    samples: Arc<Vec<i16>>,
    clock: Arc<dyn Clock>,
    log: Arc<Mutex<Vec<Opened>>>,
}

impl ScriptedIntake {
    pub fn new(samples: Vec<i16>, clock: Arc<dyn Clock>) -> Self {
        Self {
            samples: Arc::new(samples),
            clock,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every session opened so far, in order.
    pub fn opened(&self) -> Vec<Opened> {
        self.log.lock().expect("intake log poisoned").clone()
    }

    /// Sessions opened for one band.
    pub fn opened_for(&self, label: &str) -> Vec<Opened> {
        self.opened()
            .into_iter()
            .filter(|o| o.label == label)
            .collect()
    }
}

impl Intake for ScriptedIntake {
    fn open(&self, band: &Band, duration: Duration) -> Result<Capture, IntakeError> {
        let slot = {
            let mut log = self.log.lock().expect("intake log poisoned");
            log.push(Opened {
                label: band.label.clone(),
                opened_at: self.clock.now(),
                closed_at: None,
            });
            log.len() - 1
        };

        let packets = self.samples.len().div_ceil(PACKET);
        let (tx, stream) = SampleStream::channel(packets.max(1));
        for chunk in self.samples.chunks(PACKET) {
            // Capacity covers the whole recording.
            let _ = tx.try_send(chunk.to_vec());
        }
        drop(tx);

        let log = Arc::clone(&self.log);
        let clock = Arc::clone(&self.clock);
        let sent = self.samples.len() as u64;
        let feeder = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(entry) = log.lock().expect("intake log poisoned").get_mut(slot) {
                entry.closed_at = Some(clock.now());
            }
            Ok(sent)
        });
        Ok(Capture { stream, feeder })
    }
}
