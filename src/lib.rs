//! # fcsframe - Flow Cytometry Event Frames
//!
//! `fcsframe` reads Flow Cytometry Standard (FCS) files into a columnar
//! [`Frame`](frame::Frame) of events, and provides the analysis primitives
//! built on it: display transforms, spillover compensation, hierarchical
//! gating and summary statistics.
//!
//! ## Key Features
//!
//! - **FCS 2.0 / 3.0 / 3.1 / 3.2 parsing**: integer, float and double list-mode
//!   data in either byte order, supplemental TEXT, offsets past 99,999,999 bytes.
//!
//! - **Display transforms**: linear, logarithmic and Logicle scaling with an
//!   exact inverse.
//!
//! - **Compensation**: spillover matrices from `$SPILLOVER` / `SPILL`, applied
//!   to a copy or in place, and undone again.
//!
//! - **Gating**: rectangle and polygon gates arranged in a parent/child
//!   hierarchy, evaluated into per-event bit masks.
//!
//! - **Statistics**: mean, median, stdev, CV, percentiles, counts and
//!   frequency of parent, with labels for display.
//!
//! - **Persistence and export**: a compact binary frame message and FCS 3.1
//!   output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fcsframe::prelude::*;
//!
//! let mut frame = FcsReader::default().read_path("sample.fcs")?;
//! compensate_in_place(&mut frame)?;
//!
//! let lymphocytes = Subset::new(
//!     "Lymphocytes",
//!     "FSC-A",
//!     "SSC-A",
//!     Geometry::rectangle(20_000.0, 0.0, 120_000.0, 60_000.0)?,
//! );
//! let id = lymphocytes.id();
//! frame.add_subset(lymphocytes)?;
//!
//! let spec = StatSpec::new(Statistic::Median).dimension("CD3 FITC").subset(id);
//! println!("{} = {}", spec.label(&frame), evaluate(&spec, &frame)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): batch file reading, large gate evaluation and batch
//!   statistics run on `rayon`
//! - `colorized_output` (default): coloured validation reports

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod compensation;
pub mod fcs;
pub mod frame;
pub mod gating;
pub mod ident;
pub mod persist;
pub mod stats;
pub mod transform;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::compensation::{
        compensate, compensate_in_place, CompensationError, Compensator, SpilloverMatrix,
    };
    pub use crate::fcs::{read_batch, scan_directory, FcsError, FcsReader, FcsWriter, ReaderConfig};
    pub use crate::frame::{Amplification, Dimension, Frame, FrameError};
    pub use crate::gating::{effective_mask, ChartAxes, EventMask, GateError, Geometry, Subset};
    pub use crate::ident::Id;
    pub use crate::persist::{load, save, PersistError};
    pub use crate::stats::{evaluate, evaluate_batch, StatError, StatSpec, Statistic};
    pub use crate::transform::{LogicleParams, Transform, TransformError};
    pub use crate::validator::{validate_fcs_file, ValidationReport};
}
