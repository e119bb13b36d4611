use chrono::NaiveDateTime;

use crate::{alarm::Alarms, Result};

const NO_DATE: &str = "----------";
const NO_CLOCK: &str = "--------";

/// One published measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// `dd.mm.yyyy`
    pub date: String,
    /// `hh:mm:ss`
    pub clock: String,
    /// Session time of the beat that produced the reading.
    pub runtime_ms: u32,
    pub bpm: u16,
    pub spo2: f32,
    pub temperature: f32,
    pub alarms: Alarms,
}

impl Record {
    pub fn new(
        wall_clock: Option<NaiveDateTime>,
        runtime_ms: u32,
        bpm: u16,
        spo2: f32,
        temperature: f32,
        alarms: Alarms,
    ) -> Self {
        let (date, clock) = match wall_clock {
            Some(t) => (
                t.format("%d.%m.%Y").to_string(),
                t.format("%H:%M:%S").to_string(),
            ),
            None => (NO_DATE.to_owned(), NO_CLOCK.to_owned()),
        };
        Self {
            date,
            clock,
            runtime_ms,
            bpm,
            spo2,
            temperature: (temperature * 100.0).round() / 100.0,
            alarms,
        }
    }
}

/// Records laid out column-wise. Encodes as a JSON array of seven parallel
/// arrays: dates, clock times, runtimes, bpm, SpO2, temperatures, alarm tags.
#[derive(Debug, Default)]
pub struct TelemetryBatch {
    batch_size: usize,
    dates: Vec<String>,
    clocks: Vec<String>,
    runtimes: Vec<u32>,
    bpms: Vec<u16>,
    spo2s: Vec<f32>,
    temperatures: Vec<f32>,
    alarms: Vec<String>,
}

impl TelemetryBatch {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            ..Default::default()
        }
    }

    /// Returns the encoded batch and starts a new one once it is full.
    pub fn push(&mut self, r: &Record) -> Result<Option<String>> {
        self.dates.push(r.date.clone());
        self.clocks.push(r.clock.clone());
        self.runtimes.push(r.runtime_ms);
        self.bpms.push(r.bpm);
        self.spo2s.push(r.spo2);
        self.temperatures.push(r.temperature);
        self.alarms.push(r.alarms.tag());

        if self.len() < self.batch_size {
            return Ok(None);
        }
        let doc = self.encode()?;
        self.clear();
        Ok(Some(doc))
    }

    pub fn encode(&self) -> Result<String> {
        let columns = (
            &self.dates,
            &self.clocks,
            &self.runtimes,
            &self.bpms,
            &self.spo2s,
            &self.temperatures,
            &self.alarms,
        );
        Ok(serde_json::to_string(&columns)?)
    }

    pub fn clear(&mut self) {
        self.dates.clear();
        self.clocks.clear();
        self.runtimes.clear();
        self.bpms.clear();
        self.spo2s.clear();
        self.temperatures.clear();
        self.alarms.clear();
    }

    pub fn len(&self) -> usize {
        self.bpms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bpms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(bpm: u16) -> Record {
        let t = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        let alarms = crate::alarm::AlarmLimits::default().evaluate(bpm, 97.5, 36.614);
        Record::new(Some(t), 1234, bpm, 97.5, 36.614, alarms)
    }

    #[test]
    fn record_formatting() {
        let r = record(70);
        assert_eq!(r.date, "07.03.2024");
        assert_eq!(r.clock, "09:05:01");
        assert_eq!(r.temperature, 36.61);

        let r = Record::new(None, 0, 70, 97.0, 36.0, Alarms::default());
        assert_eq!(r.date, "----------");
        assert_eq!(r.clock, "--------");
    }

    #[test]
    fn batch_wire_format() {
        let mut b = TelemetryBatch::new(2);
        assert_eq!(b.push(&record(70)).unwrap(), None);
        let doc = b.push(&record(45)).unwrap().unwrap();
        assert!(b.is_empty());

        assert_eq!(
            doc,
            r#"[["07.03.2024","07.03.2024"],["09:05:01","09:05:01"],[1234,1234],[70,45],[97.5,97.5],[36.61,36.61],["-","HR_TOO_LOW"]]"#
        );
    }

    #[test]
    fn full_batch_of_ten() {
        let mut b = TelemetryBatch::new(10);
        let mut docs = Vec::new();
        for i in 0..25 {
            if let Some(doc) = b.push(&record(60 + i)).unwrap() {
                docs.push(doc);
            }
        }
        assert_eq!(docs.len(), 2);
        assert_eq!(b.len(), 5);

        let v: serde_json::Value = serde_json::from_str(&docs[1]).unwrap();
        let columns = v.as_array().unwrap();
        assert_eq!(columns.len(), 7);
        assert!(columns.iter().all(|c| c.as_array().unwrap().len() == 10));
        assert_eq!(columns[3][0], 70);
    }
}
