#![cfg_attr(not(test), no_std)]

//! Heart rate and SpO2 extraction from a streaming red/IR photoplethysmogram.
//!
//! Each call consumes one sample and runs: sliding mean, depth-2 register,
//! hysteresis peak/valley detection on IR then RED, beat tracking on IR
//! peaks, and ratio-of-ratios SpO2 on channel valleys. Memory is fixed and
//! no call ever fails; degenerate or implausible input yields an
//! [`Outcome::Unchanged`] with a reason.

pub mod beat;
pub mod extremum;
pub mod oximeter;
pub mod outcome;
pub mod preprocess;
pub mod spo2;
pub mod thresholds;

pub use beat::{BeatOutcome, BeatTracker};
pub use extremum::{Channel, ChannelRegister, ChannelState, Extremum, ExtremumKind};
pub use oximeter::{IrUpdate, PulseOximeter, RedUpdate};
pub use outcome::{Degenerate, Outcome, Reading, Reason, Rejection};
pub use preprocess::{RawSample, Sample, SamplePreprocessor, DEFAULT_WINDOW};
pub use spo2::{AcDc, Spo2Estimator, Spo2Outcome};
pub use thresholds::{Calibration, Thresholds};

/// Capacity of the bpm and SpO2 rolling histories.
pub const HISTORY_LEN: usize = 10;
