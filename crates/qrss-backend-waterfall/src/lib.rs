//! QRSS Waterfall Rendering Backend
//!
//! Collects the magnitude columns of one recording session and paints
//! them into a 16-bit RGB raster:
//!
//! - x is time (one pixel per column), y is frequency with the lowest bin
//!   on the bottom row
//! - contrast comes from global statistics over every value, so rendering
//!   only starts after the column stream is exhausted
//! - two contrast policies are available, see
//!   [`ContrastPolicy`](qrss_spec::ContrastPolicy)
//! - a 5x7 bitmap font burns an identifying imprint into the corner
//!
//! Rendering is deterministic: the same columns and imprint give the same
//! pixels, and [`png::write_png`] uses fixed encoder settings so the PNG
//! bytes match as well.
//!
//! # Example
//!
//! ```
//! use qrss_backend_spectrum::MagnitudeColumn;
//! use qrss_backend_waterfall::WaterfallRenderer;
//! use qrss_spec::ContrastPolicy;
//!
//! let mut renderer = WaterfallRenderer::new(ContrastPolicy::Midpoint);
//! for t in 0..50 {
//!     let column: Vec<f64> = (0..20).map(|f| ((t * f) % 7) as f64).collect();
//!     renderer.push(MagnitudeColumn::from(column)).unwrap();
//! }
//! let raster = renderer.render("W6REK 20m").unwrap();
//! assert_eq!((raster.width, raster.height), (50, 20));
//! ```

pub mod contrast;
pub mod font;
pub mod png;
pub mod raster;
pub mod render;
pub mod stats;

pub use contrast::{ContrastMap, MAX_INTENSITY};
pub use png::{PngConfig, PngError};
pub use raster::{Raster, Rgb16};
pub use render::{RenderError, WaterfallRenderer};
pub use stats::Statistics;
