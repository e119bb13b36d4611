use serde::{Deserialize, Serialize};

/// Raw IR levels separating "nothing on the sensor" from skin contact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceThresholds {
    pub absent_max: u32,
    pub present_min: u32,
}

impl Default for PresenceThresholds {
    fn default() -> Self {
        Self {
            absent_max: 30_000,
            present_min: 70_000,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    Absent,
    /// Something is near the sensor but not firmly in contact.
    Settling,
    /// First contact reading after any non-contact reading.
    Arrived,
    Present,
}

pub struct PresenceDetector {
    thresholds: PresenceThresholds,
    present: bool,
}

impl PresenceDetector {
    pub fn new(thresholds: PresenceThresholds) -> Self {
        Self {
            thresholds,
            present: false,
        }
    }

    pub fn update(&mut self, ir: u32) -> Presence {
        let was_present = self.present;
        self.present = false;
        if ir <= self.thresholds.absent_max {
            Presence::Absent
        } else if ir < self.thresholds.present_min {
            Presence::Settling
        } else {
            self.present = true;
            if was_present {
                Presence::Present
            } else {
                Presence::Arrived
            }
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }
}
