//! Extraction of leakage-current versus temperature curves from two
//! independently sampled series.
//!
//! The temperature series of a sensor is scanned for plateaus, which are
//! merged, split into a rising and a falling branch, and used as windows
//! over the sensor's current series. The averaged currents are filtered into
//! the final [Curve]:
//! ```rust
//! # use it_curve::{ChannelPipeline, PipelineParameters, TimeSeries};
//! # let temperature = TimeSeries::default();
//! # let current = TimeSeries::default();
//! let pipeline = ChannelPipeline::new(PipelineParameters::default());
//! match pipeline.run(&temperature, &current) {
//!     Ok(outcome) => println!("{} curve points", outcome.curve.points.len()),
//!     Err(e) => println!("{e}"),
//! }
//! ```
pub mod branch;
pub mod correlation;
pub mod curve;
pub mod error;
pub mod pipeline;
pub mod plateau;
pub mod series;

pub use branch::{Branch, BranchKind, BranchSplit, split_branches};
pub use correlation::{AlignedPoint, CorrelationParameters, Correlator, Window};
pub use curve::{Curve, CurveFilter, CurveParameters, Polarity, Removed};
pub use error::{CurveError, CurveResult};
pub use pipeline::{ChannelOutcome, ChannelPipeline, PipelineParameters};
pub use plateau::{
    MergeParameters, OscillationMerger, Plateau, PlateauFilter, PlateauParameters, PlateauScan,
};
pub use series::{Sample, TimeSeries, TimeSeriesStore};
