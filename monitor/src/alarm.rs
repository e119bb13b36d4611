use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmLimits {
    pub hr_min: u16,
    pub hr_max: u16,
    pub spo2_min: f32,
    pub temperature_max: f32,
}

impl Default for AlarmLimits {
    fn default() -> Self {
        Self {
            hr_min: 50,
            hr_max: 90,
            spo2_min: 93.0,
            temperature_max: 37.0,
        }
    }
}

impl AlarmLimits {
    pub fn evaluate(&self, bpm: u16, spo2: f32, temperature: f32) -> Alarms {
        let hr_too_low = bpm < self.hr_min;
        Alarms {
            hr_too_low,
            hr_too_high: !hr_too_low && bpm > self.hr_max,
            spo2_too_low: spo2 < self.spo2_min,
            temp_too_high: temperature > self.temperature_max,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Alarms {
    pub hr_too_low: bool,
    pub hr_too_high: bool,
    pub spo2_too_low: bool,
    pub temp_too_high: bool,
}

impl Alarms {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.hr_too_low, "HR_TOO_LOW"),
            (self.hr_too_high, "HR_TOO_HIGH"),
            (self.spo2_too_low, "SPO2_TOO_LOW"),
            (self.temp_too_high, "TEMP_TOO_HIGH"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
    }

    /// Wire form: `-` when empty, names joined by `|` otherwise.
    pub fn tag(&self) -> String {
        if self.is_empty() {
            "-".to_owned()
        } else {
            self.names().collect::<Vec<_>>().join("|")
        }
    }
}

impl fmt::Display for Alarms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}
