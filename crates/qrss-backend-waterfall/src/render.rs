//! Column accumulation and waterfall painting.

use qrss_backend_spectrum::MagnitudeColumn;
use qrss_spec::ContrastPolicy;
use thiserror::Error;

use crate::contrast::ContrastMap;
use crate::font::{draw_text, INK};
use crate::raster::Raster;
use crate::stats::Statistics;

/// Errors that can occur while building a waterfall.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No columns were pushed; there is nothing to draw.
    #[error("no magnitude columns to render")]
    EmptyWaterfall,

    /// A column's height differs from the first column's.
    #[error("column {index} has {found} bins, expected {expected}")]
    RaggedColumn {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// A column has no bins at all.
    #[error("column {index} is empty")]
    EmptyColumn { index: usize },
}

/// Collects one session's columns and paints them.
///
/// Statistics are updated as columns arrive, but pixels are only produced
/// by [`render`](Self::render), once every column is known.
#[derive(Debug, Clone)]
pub struct WaterfallRenderer {
    policy: ContrastPolicy,
    imprint_scale: u32,
    columns: Vec<MagnitudeColumn>,
    stats: Statistics,
}

impl WaterfallRenderer {
    pub fn new(policy: ContrastPolicy) -> Self {
        Self {
            policy,
            imprint_scale: 1,
            columns: Vec::new(),
            stats: Statistics::new(),
        }
    }

    /// Set the pixel scale of imprint glyphs.
    pub fn with_imprint_scale(mut self, scale: u32) -> Self {
        self.imprint_scale = scale.max(1);
        self
    }

    pub fn policy(&self) -> ContrastPolicy {
        self.policy
    }

    /// Number of columns collected so far.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Append the next column in time order.
    pub fn push(&mut self, column: MagnitudeColumn) -> Result<(), RenderError> {
        let index = self.columns.len();
        if column.is_empty() {
            return Err(RenderError::EmptyColumn { index });
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(RenderError::RaggedColumn {
                    index,
                    expected: first.len(),
                    found: column.len(),
                });
            }
        }
        self.stats.extend(&column);
        self.columns.push(column);
        Ok(())
    }

    /// Paint every collected column and burn `imprint` into the corner.
    ///
    /// Column `x` becomes image column `x`; bin 0 (lowest frequency) is
    /// drawn on the bottom row.
    pub fn render(&self, imprint: &str) -> Result<Raster, RenderError> {
        let Some(first) = self.columns.first() else {
            return Err(RenderError::EmptyWaterfall);
        };
        let width = self.columns.len() as u32;
        let height = first.len() as u32;

        let map = ContrastMap::resolve(self.policy, &self.stats);
        tracing::debug!(
            min = self.stats.min,
            mean = self.stats.mean(),
            max = self.stats.max,
            sigma = self.stats.std_dev(),
            width,
            height,
            ?map,
            "rendering waterfall"
        );

        let mut raster = Raster::new(width, height, [0, 0, 0]);
        for (x, column) in self.columns.iter().enumerate() {
            for (bin, &value) in column.iter().enumerate() {
                raster.set(x as u32, height - 1 - bin as u32, map.pixel(value));
            }
        }
        draw_text(&mut raster, imprint, self.imprint_scale, INK);
        Ok(raster)
    }
}
