//! QRSS grabber configuration types.
//!
//! This crate holds everything that is decided before a recording starts:
//! the per-band identity parsed from `label:host:base:center:bw` tuples,
//! the immutable [`TransformConfig`] that drives one spectral pipeline, the
//! global [`GrabConfig`] knobs and the imprint template.
//!
//! All validation happens here so that the scheduler never starts with a
//! configuration the pipeline would later reject.
//!
//! # Example
//!
//! ```
//! use qrss_spec::{parse_bands, GrabConfig};
//!
//! let bands = parse_bands("W6REK-20m:sybil.yak.net:14096000:850:300").unwrap();
//! let config = GrabConfig { bands, ..GrabConfig::default() };
//! config.validate().unwrap();
//!
//! let transform = config.transform_for(&config.bands[0]);
//! let region = transform.region().unwrap();
//! assert!(region.lo < region.hi);
//! ```

pub mod band;
pub mod error;
pub mod grab;
pub mod imprint;
pub mod transform;

pub use band::{parse_band, parse_bands, Band};
pub use error::ConfigError;
pub use grab::{ContrastPolicy, GrabConfig};
pub use imprint::{ImprintFields, ImprintTemplate, DEFAULT_IMPRINT};
pub use transform::{MagnitudePolicy, Region, TransformConfig, MAX_FFT_BITS, MIN_FFT_BITS};
