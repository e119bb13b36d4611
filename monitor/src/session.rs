use chrono::NaiveDateTime;
use pulseox::{Outcome, PulseOximeter, RawSample, Reason};

use crate::{
    alarm::AlarmLimits,
    presence::{Presence, PresenceDetector},
    telemetry::{Record, TelemetryBatch},
    Config, Result,
};

/// One poll of the sensor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RawReading {
    pub red: u32,
    pub ir: u32,
    pub elapsed_ms: u32,
    pub temperature: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Nothing on the sensor.
    Idle,
    Settling,
    Measuring(Outcome),
    /// `batch` is the encoded telemetry document when this record filled it.
    Published {
        record: Record,
        batch: Option<String>,
    },
}

/// One measurement session: presence gating in front of the oximeter and
/// alarm evaluation plus batching behind it.
pub struct Session {
    oximeter: PulseOximeter,
    presence: PresenceDetector,
    alarms: AlarmLimits,
    batch: TelemetryBatch,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            oximeter: PulseOximeter::new(config.thresholds),
            presence: PresenceDetector::new(config.presence),
            alarms: config.alarms,
            batch: TelemetryBatch::new(config.batch_size),
        }
    }

    pub fn feed(
        &mut self,
        reading: RawReading,
        wall_clock: Option<NaiveDateTime>,
    ) -> Result<SessionEvent> {
        match self.presence.update(reading.ir) {
            Presence::Absent => return Ok(SessionEvent::Idle),
            Presence::Settling => {
                self.oximeter.reset();
                return Ok(SessionEvent::Settling);
            }
            Presence::Arrived => {
                log::info!("contact at {}ms, starting measurement", reading.elapsed_ms);
                self.oximeter.reset();
                self.batch.clear();
            }
            Presence::Present => {}
        }

        let outcome = self.oximeter.add_raw(RawSample {
            red: reading.red,
            ir: reading.ir,
            elapsed_ms: reading.elapsed_ms,
        });
        if outcome.reason() == Some(Reason::SignalLost) {
            self.batch.clear();
        }
        let r = outcome.reading();
        if !outcome.new_value() || r.bpm == 0 || r.spo2 == 0.0 {
            return Ok(SessionEvent::Measuring(outcome));
        }

        let runtime_ms = self
            .oximeter
            .beats()
            .last_beat_ms()
            .unwrap_or(reading.elapsed_ms);
        let alarms = self.alarms.evaluate(r.bpm, r.spo2, reading.temperature);
        if !alarms.is_empty() {
            log::warn!("alarm {} at {} bpm, spo2 {}", alarms, r.bpm, r.spo2);
        }
        let record = Record::new(
            wall_clock,
            runtime_ms,
            r.bpm,
            r.spo2,
            reading.temperature,
            alarms,
        );
        let batch = self.batch.push(&record)?;
        Ok(SessionEvent::Published { record, batch })
    }

    pub fn oximeter(&self) -> &PulseOximeter {
        &self.oximeter
    }

    pub fn pending(&self) -> usize {
        self.batch.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ir: u32) -> RawReading {
        RawReading {
            red: ir * 4 / 5,
            ir,
            elapsed_ms: 0,
            temperature: 36.6,
        }
    }

    #[test]
    fn gates_on_presence() {
        let mut s = Session::new(&Config::default());
        assert_eq!(s.feed(reading(1_000), None).unwrap(), SessionEvent::Idle);
        assert_eq!(s.feed(reading(50_000), None).unwrap(), SessionEvent::Settling);
        assert!(matches!(
            s.feed(reading(100_000), None).unwrap(),
            SessionEvent::Measuring(_)
        ));
        assert_eq!(s.pending(), 0);
    }
}
