//! KiwiSDR audio intake over WebSocket.
//!
//! One connection per recording session: connect, tune, then forward every
//! `SND` frame's samples into the session's queue until the recording
//! window closes.

pub mod protocol;

use std::pin::Pin;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::{SinkExt, StreamExt};
use qrss_spec::{Band, GrabConfig};
use tokio::sync::mpsc;
use tokio::time::{Instant, Sleep};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::IntakeError;
use crate::stream::{Capture, SampleStream, SAMPLE_QUEUE_PACKETS};
use crate::Intake;

pub use protocol::{ServerFrame, SoundFrame, TuningOptions};

/// Interval between keepalive commands.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// Audio intake from a KiwiSDR receiver.
#[derive(Debug, Clone)]
pub struct KiwiIntake {
    port: u16,
    options: TuningOptions,
}

impl KiwiIntake {
    pub fn new(port: u16, options: TuningOptions) -> Self {
        Self { port, options }
    }

    pub fn from_config(config: &GrabConfig) -> Self {
        Self::new(
            config.port,
            TuningOptions {
                agc: config.agc,
                manual_gain: config.manual_gain,
                identify: config.identify.clone(),
            },
        )
    }

    /// Sound stream URL for `band`; `stamp` is any per-connection number.
    pub fn url(&self, band: &Band, stamp: u64) -> String {
        format!("ws://{}:{}/{}/SND", band.host, self.port, stamp)
    }
}

impl Intake for KiwiIntake {
    fn open(&self, band: &Band, duration: Duration) -> Result<Capture, IntakeError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let url = self.url(band, stamp);
        let commands = protocol::setup_commands(band, &self.options);
        let (tx, stream) = SampleStream::channel(SAMPLE_QUEUE_PACKETS);
        let label = band.label.clone();

        let feeder = tokio::spawn(async move {
            let result = stream_sound(&url, commands, tx, duration).await;
            match &result {
                Ok(samples) => tracing::info!(band = %label, samples, "receiver stream closed"),
                Err(e) => tracing::warn!(band = %label, error = %e, "receiver stream failed"),
            }
            result
        });

        Ok(Capture { stream, feeder })
    }
}

async fn stream_sound(
    url: &str,
    commands: Vec<String>,
    tx: mpsc::Sender<Vec<i16>>,
    duration: Duration,
) -> Result<u64, IntakeError> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|source| IntakeError::Connect {
            url: url.to_string(),
            source,
        })?;
    tracing::debug!(url, "connected");
    let (mut write, mut read) = ws.split();

    for command in commands {
        write.send(Message::Text(command)).await?;
    }

    let deadline = tokio::time::sleep_until(Instant::now() + duration);
    tokio::pin!(deadline);
    let mut keepalive =
        tokio::time::interval_at(Instant::now() + KEEPALIVE_INTERVAL, KEEPALIVE_INTERVAL);
    let mut delivered = 0u64;

    loop {
        let payload = tokio::select! {
            _ = &mut deadline => break,
            _ = keepalive.tick() => {
                write.send(Message::Text(protocol::KEEPALIVE_COMMAND.to_string())).await?;
                continue;
            }
            msg = read.next() => match msg {
                None | Some(Ok(Message::Close(_))) => {
                    tracing::debug!(url, "receiver closed the connection");
                    break;
                }
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Binary(data))) => data,
                Some(Ok(Message::Text(text))) => text.into_bytes(),
                Some(Ok(_)) => continue,
            },
        };

        match protocol::parse_frame(&payload)? {
            ServerFrame::Sound(frame) => {
                let count = frame.samples.len() as u64;
                match hand_off(&tx, frame.samples, deadline.as_mut()).await {
                    Handoff::Delivered => delivered += count,
                    Handoff::ConsumerGone => {
                        tracing::debug!(url, "sample consumer gone");
                        break;
                    }
                    Handoff::WindowClosed => break,
                }
            }
            ServerFrame::Message(params) => {
                if let Some(reply) = protocol::answer_message(&params)? {
                    write.send(Message::Text(reply)).await?;
                }
            }
            ServerFrame::Other(tag) => tracing::trace!(%tag, "ignoring frame"),
        }
    }

    let _ = write.send(Message::Close(None)).await;
    Ok(delivered)
}

/// Result of queueing one packet for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handoff {
    Delivered,
    ConsumerGone,
    WindowClosed,
}

/// Queue `samples`, giving up when the recording window closes first.
///
/// A stalled consumer leaves the queue full; the deadline still bounds the
/// wait.
async fn hand_off(
    tx: &mpsc::Sender<Vec<i16>>,
    samples: Vec<i16>,
    deadline: Pin<&mut Sleep>,
) -> Handoff {
    tokio::select! {
        biased;
        _ = deadline => Handoff::WindowClosed,
        sent = tx.send(samples) => match sent {
            Ok(()) => Handoff::Delivered,
            Err(_) => Handoff::ConsumerGone,
        },
    }
}
