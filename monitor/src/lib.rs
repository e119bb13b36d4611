//! Measurement session around the `pulseox` core: presence gating, alarm
//! evaluation and telemetry batching, plus a synthetic signal source.

pub mod alarm;
pub mod config;
pub mod error;
pub mod presence;
pub mod session;
pub mod synth;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};
pub use session::{RawReading, Session, SessionEvent};
