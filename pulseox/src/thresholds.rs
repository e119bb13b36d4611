/// Linear empirical calibration: `spo2 = offset - slope * r`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    pub offset: f32,
    pub slope: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            offset: 104.0,
            slope: 17.0,
        }
    }
}

impl Calibration {
    pub fn spo2(&self, r: f32) -> f32 {
        self.offset - self.slope * r
    }
}

/// Tunable acceptance constants. They were chosen empirically and may need
/// recalibration per sensor and skin tone.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Thresholds {
    pub ir_min_retrace: f32,
    pub red_min_retrace: f32,

    /// Open interval of accepted peak-to-trough swings on IR.
    pub min_swing: f32,
    pub max_swing: f32,

    /// Below this smoothed rate every beat is accepted.
    pub warmup_bpm: f32,
    pub agreement_bpm: f32,
    pub learning_beats: u32,

    pub signal_loss_ms: u32,
    /// Signal loss is only declared with strictly more beats than this.
    pub signal_loss_min_beats: u32,

    /// Open interval of publishable SpO2 values.
    pub spo2_min: f32,
    pub spo2_max: f32,
    pub calibration: Calibration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ir_min_retrace: 2.0,
            red_min_retrace: 2.0,
            min_swing: 0.0,
            max_swing: 1500.0,
            warmup_bpm: 50.0,
            agreement_bpm: 20.0,
            learning_beats: 10,
            signal_loss_ms: 3000,
            signal_loss_min_beats: 2,
            spo2_min: 60.0,
            spo2_max: 100.0,
            calibration: Calibration::default(),
        }
    }
}
