//! Generated sample sources for dry runs and tests.
//!
//! Both intakes deliver `rate × duration` samples paced against the tokio
//! clock and close the stream once the full duration has elapsed.

use std::f64::consts::TAU;
use std::time::Duration;

use qrss_spec::Band;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::error::IntakeError;
use crate::stream::{Capture, SampleStream, SAMPLE_QUEUE_PACKETS};
use crate::Intake;

/// Samples per generated packet, the size of one KiwiSDR `SND` frame.
pub const PACKET_SAMPLES: u64 = 512;

/// Intake that produces digital silence.
#[derive(Debug, Clone, Copy)]
pub struct SilenceIntake {
    rate: u32,
}

impl SilenceIntake {
    pub fn new(rate: u32) -> Self {
        Self { rate }
    }
}

impl Intake for SilenceIntake {
    fn open(&self, _band: &Band, duration: Duration) -> Result<Capture, IntakeError> {
        Ok(spawn_generator(self.rate, duration, |_| 0))
    }
}

/// Intake that produces a steady sine at the band's center offset.
#[derive(Debug, Clone, Copy)]
pub struct ToneIntake {
    rate: u32,
    amplitude: f64,
}

impl ToneIntake {
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            amplitude: 8000.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude.clamp(0.0, i16::MAX as f64);
        self
    }
}

impl Intake for ToneIntake {
    fn open(&self, band: &Band, duration: Duration) -> Result<Capture, IntakeError> {
        let step = TAU * band.center_hz as f64 / self.rate as f64;
        let amplitude = self.amplitude;
        Ok(spawn_generator(self.rate, duration, move |n| {
            (amplitude * (step * n as f64).sin()) as i16
        }))
    }
}

fn spawn_generator<F>(rate: u32, duration: Duration, sample_at: F) -> Capture
where
    F: FnMut(u64) -> i16 + Send + 'static,
{
    let (tx, stream) = SampleStream::channel(SAMPLE_QUEUE_PACKETS);
    let feeder = tokio::spawn(generate(tx, rate, duration, sample_at));
    Capture { stream, feeder }
}

async fn generate<F>(
    tx: mpsc::Sender<Vec<i16>>,
    rate: u32,
    duration: Duration,
    mut sample_at: F,
) -> Result<u64, IntakeError>
where
    F: FnMut(u64) -> i16,
{
    let start = Instant::now();
    let total = (rate as f64 * duration.as_secs_f64()) as u64;
    let mut sent = 0u64;

    while sent < total {
        let n = PACKET_SAMPLES.min(total - sent);
        let packet: Vec<i16> = (sent..sent + n).map(&mut sample_at).collect();
        if tx.send(packet).await.is_err() {
            break;
        }
        sent += n;
        // Deadlines are absolute, so a late wakeup does not stretch the run.
        let due = Duration::from_secs_f64(sent as f64 / rate as f64);
        tokio::time::sleep_until(start + due).await;
    }
    tokio::time::sleep_until(start + duration).await;
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qrss_backend_spectrum::SampleSource;

    fn band() -> Band {
        Band {
            label: "test".to_string(),
            host: "localhost".to_string(),
            base_hz: 10_138_700,
            center_hz: 1000,
            bandwidth_hz: 200,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_paces_to_the_duration() {
        let (tx, mut rx) = mpsc::channel(SAMPLE_QUEUE_PACKETS);
        let start = Instant::now();
        let feeder = tokio::spawn(generate(tx, 1000, Duration::from_secs(3), |_| 0));

        let mut received = Vec::new();
        while let Some(packet) = rx.recv().await {
            assert!(packet.len() as u64 <= PACKET_SAMPLES);
            received.extend(packet);
        }
        assert_eq!(feeder.await.unwrap().unwrap(), 3000);
        assert_eq!(received.len(), 3000);
        assert!(received.iter().all(|&s| s == 0));
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tone_at_band_center() {
        // 1000 Hz at 8000 Hz: eight samples per cycle.
        let Capture { mut stream, feeder } = ToneIntake::new(8000)
            .open(&band(), Duration::from_millis(10))
            .unwrap();
        let reader = tokio::task::spawn_blocking(move || {
            let mut buf = [0.0; 300];
            let mut all = Vec::new();
            loop {
                let n = stream.read(&mut buf);
                if n == 0 {
                    break all;
                }
                all.extend_from_slice(&buf[..n]);
            }
        });

        assert_eq!(feeder.await.unwrap().unwrap(), 80);
        let samples = reader.await.unwrap();
        assert_eq!(samples.len(), 80);
        assert_eq!(samples[0], 0.0);
        assert!((samples[2] - 8000.0).abs() <= 1.0);
        assert!((samples[6] + 8000.0).abs() <= 1.0);
        assert!((samples[10] - samples[2]).abs() <= 1.0);
    }
}
