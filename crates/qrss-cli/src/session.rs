//! One recording session: receive, analyze, render, store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use qrss_backend_spectrum::{spawn_pipeline, PipelineHandle, SpectrumError};
use qrss_backend_waterfall::png::encode_with_hash;
use qrss_backend_waterfall::{PngConfig, PngError, RenderError, WaterfallRenderer};
use qrss_intake::{Capture, Intake, IntakeError};
use qrss_spec::{Band, ContrastPolicy, GrabConfig, ImprintFields, ImprintTemplate, TransformConfig};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::Instrument;

use crate::spool::{write_session_image, SpoolEntry, SpoolError};

/// Capacity of the column queue between the spectral worker and the
/// renderer.
pub const COLUMN_QUEUE: usize = 16;

/// Why a session produced no image.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("intake: {0}")]
    Intake(#[from] IntakeError),

    #[error("spectrum: {0}")]
    Spectrum(#[from] SpectrumError),

    #[error("render: {0}")]
    Render(#[from] RenderError),

    #[error("png: {0}")]
    Png(#[from] PngError),

    #[error("spool: {0}")]
    Spool(#[from] SpoolError),

    #[error("task failed: {0}")]
    Join(#[from] JoinError),
}

/// Everything a band's sessions share.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub band: Band,
    pub transform: TransformConfig,
    pub contrast: ContrastPolicy,
    pub imprint: ImprintTemplate,
    pub imprint_scale: u32,
    pub spool: PathBuf,
    pub png: PngConfig,
}

impl SessionPlan {
    pub fn new(config: &GrabConfig, band: &Band) -> Self {
        Self {
            band: band.clone(),
            transform: config.transform_for(band),
            contrast: config.contrast,
            imprint: config.imprint.clone(),
            imprint_scale: config.imprint_scale,
            spool: config.spool.clone(),
            png: PngConfig::default(),
        }
    }

    /// Imprint text for the session starting at `timestamp`.
    pub fn imprint_for(&self, timestamp: &str) -> String {
        self.imprint.render(&ImprintFields {
            label: &self.band.label,
            timestamp,
            center_hz: self.band.mid_hz(),
            half_bw_hz: self.band.half_bw_hz(),
        })
    }
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    Written(SpoolEntry),
    /// No audio arrived; no image was written.
    Empty,
    Failed(SessionError),
}

#[derive(Debug)]
pub struct SessionReport {
    pub timestamp: String,
    pub columns: usize,
    pub outcome: SessionOutcome,
}

/// A single capture window for one band.
pub struct RecordingSession {
    plan: Arc<SessionPlan>,
    timestamp: String,
    duration: Duration,
    intake: Arc<dyn Intake>,
}

impl RecordingSession {
    pub fn new(
        plan: Arc<SessionPlan>,
        timestamp: String,
        duration: Duration,
        intake: Arc<dyn Intake>,
    ) -> Self {
        Self {
            plan,
            timestamp,
            duration,
            intake,
        }
    }

    /// Record, render and store.
    ///
    /// `recording_done` fires (or is dropped) as soon as the intake is
    /// finished, before rendering starts.
    pub async fn run(self, recording_done: oneshot::Sender<()>) -> SessionReport {
        let span = tracing::info_span!(
            "session",
            band = %self.plan.band.label,
            timestamp = %self.timestamp
        );
        async move {
            let mut columns = 0;
            let outcome = match self.execute(recording_done, &mut columns).await {
                Ok(Some(entry)) => SessionOutcome::Written(entry),
                Ok(None) => {
                    tracing::info!("no audio received, skipping image");
                    SessionOutcome::Empty
                }
                Err(e) => {
                    tracing::warn!(error = %e, "session failed");
                    SessionOutcome::Failed(e)
                }
            };
            SessionReport {
                timestamp: self.timestamp,
                columns,
                outcome,
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        recording_done: oneshot::Sender<()>,
        columns: &mut usize,
    ) -> Result<Option<SpoolEntry>, SessionError> {
        tracing::info!(seconds = self.duration.as_secs(), "recording");
        let Capture { stream, feeder } = self.intake.open(&self.plan.band, self.duration)?;
        let PipelineHandle {
            columns: mut column_rx,
            worker,
        } = spawn_pipeline(&self.plan.transform, stream, COLUMN_QUEUE)?;

        let mut renderer = WaterfallRenderer::new(self.plan.contrast)
            .with_imprint_scale(self.plan.imprint_scale);

        let recording = async move {
            let fed = feeder.await;
            let _ = recording_done.send(());
            fed
        };
        let collecting = async {
            let mut rejected = None;
            while let Some(column) = column_rx.recv().await {
                if rejected.is_none() {
                    if let Err(e) = renderer.push(column) {
                        rejected = Some(e);
                    }
                }
            }
            rejected
        };
        let (fed, rejected) = tokio::join!(recording, collecting);

        *columns = worker.await?;
        tracing::debug!(columns = *columns, "analysis finished");
        if let Some(e) = rejected {
            return Err(e.into());
        }
        match fed? {
            Ok(samples) => tracing::debug!(samples, "intake finished"),
            Err(e) if renderer.is_empty() => return Err(e.into()),
            Err(e) => tracing::warn!(error = %e, "intake ended early, rendering what arrived"),
        }

        let plan = Arc::clone(&self.plan);
        let timestamp = self.timestamp.clone();
        let stored = tokio::task::spawn_blocking(move || -> Result<_, SessionError> {
            let raster = match renderer.render(&plan.imprint_for(&timestamp)) {
                Ok(raster) => raster,
                Err(RenderError::EmptyWaterfall) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            let (png, hash) = encode_with_hash(&raster, &plan.png)?;
            let entry = write_session_image(&plan.spool, &plan.band, &timestamp, &png, hash)?;
            Ok(Some(entry))
        })
        .await??;

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> GrabConfig {
        GrabConfig {
            bands: qrss_spec::parse_bands("W6REK-30m:sybil.yak.net:10138700:1000:200").unwrap(),
            fft_bits: 10,
            ..GrabConfig::default()
        }
    }

    #[test]
    fn test_imprint_uses_absolute_center() {
        let config = config();
        let plan = SessionPlan::new(&config, &config.bands[0]);
        assert_eq!(
            plan.imprint_for("2024-05-06--07-08-00"),
            "W6REK-30m 2024-05-06--07-08-00 10139700+-100"
        );
        assert_eq!(plan.transform.fft_bits, 10);
    }
}
