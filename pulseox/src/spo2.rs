use util::RingBuffer;

use crate::{
    extremum::Extremum,
    outcome::{Degenerate, Rejection},
    Thresholds, HISTORY_LEN,
};

/// Baseline under a peak: the line through the two most recent minima,
/// `(previous, current)`, evaluated at `time_ms`.
pub fn baseline(minima: (Extremum, Extremum), time_ms: u32) -> Result<f32, Degenerate> {
    let (prev, cur) = minima;
    let dt = cur.time_ms as i64 - prev.time_ms as i64;
    if dt == 0 {
        return Err(Degenerate::FlatBaseline);
    }
    let slope = (cur.value - prev.value) / dt as f32;
    let offset = (time_ms as i64 - prev.time_ms as i64) as f32;
    Ok(prev.value + slope * offset)
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AcDc {
    pub ac: f32,
    pub dc: f32,
    pub ratio: f32,
}

impl AcDc {
    pub fn new(peak: Extremum, minima: (Extremum, Extremum)) -> Result<Self, Degenerate> {
        let dc = baseline(minima, peak.time_ms)?;
        if dc == 0.0 {
            return Err(Degenerate::ZeroBaseline);
        }
        let ac = peak.value - dc;
        Ok(Self {
            ac,
            dc,
            ratio: ac / dc,
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Spo2Outcome {
    Accepted { spo2: f32, raw: f32 },
    Rejected(Rejection),
    Degenerate(Degenerate),
}

/// Ratio-of-ratios SpO2 with a rolling mean over plausible values.
pub struct Spo2Estimator {
    thresholds: Thresholds,
    ir: Option<AcDc>,
    red: Option<AcDc>,
    r_factor: f32,
    history: RingBuffer<HISTORY_LEN, f32>,
    spo2: f32,
}

impl Spo2Estimator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            ir: None,
            red: None,
            r_factor: 0.0,
            history: Default::default(),
            spo2: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds);
    }

    pub fn update_ir(&mut self, ir: AcDc) {
        self.ir = Some(ir);
    }

    /// `ir` is the latest IR decomposition known when the RED minimum was
    /// confirmed.
    pub fn on_red(&mut self, red: AcDc, ir: Option<AcDc>) -> Spo2Outcome {
        self.red = Some(red);
        let Some(ir) = ir else {
            return Spo2Outcome::Degenerate(Degenerate::MissingIrRatio);
        };
        if ir.ratio == 0.0 {
            return Spo2Outcome::Degenerate(Degenerate::ZeroIrRatio);
        }
        let r = red.ratio / ir.ratio;
        self.r_factor = r;
        self.accept(self.thresholds.calibration.spo2(r))
    }

    fn accept(&mut self, raw: f32) -> Spo2Outcome {
        let t = &self.thresholds;
        if !(t.spo2_min < raw && raw < t.spo2_max) {
            log::trace!("spo2 {} outside plausible range", raw);
            return Spo2Outcome::Rejected(Rejection::Spo2OutOfRange);
        }
        self.history.add(raw);
        if let Some(mean) = self.history.mean() {
            self.spo2 = libm::roundf(mean * 100.0) / 100.0;
        }
        log::debug!("spo2 {} (raw {}, r {})", self.spo2, raw, self.r_factor);
        Spo2Outcome::Accepted {
            spo2: self.spo2,
            raw,
        }
    }

    pub fn spo2(&self) -> f32 {
        self.spo2
    }

    pub fn r_factor(&self) -> f32 {
        self.r_factor
    }

    pub fn ir(&self) -> Option<AcDc> {
        self.ir
    }

    pub fn red(&self) -> Option<AcDc> {
        self.red
    }

    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }
}
