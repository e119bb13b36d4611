use core::f32::consts::TAU;

use crate::session::RawReading;

/// Noise-free sinusoidal red/IR pulse for tests and offline runs.
#[derive(Clone, Debug)]
pub struct SyntheticPpg {
    bpm: f32,
    sample_period_ms: u32,
    elapsed_ms: u32,
    ir_dc: f32,
    ir_ac: f32,
    red_dc: f32,
    red_ac: f32,
    /// Amplitude of a slow (0.1 Hz) baseline drift, in counts.
    wander: f32,
    temperature: f32,
}

impl SyntheticPpg {
    pub fn new(bpm: f32) -> Self {
        Self {
            bpm,
            sample_period_ms: 50,
            elapsed_ms: 0,
            ir_dc: 100_000.0,
            ir_ac: 400.0,
            red_dc: 80_000.0,
            red_ac: 250.0,
            wander: 0.0,
            temperature: 36.6,
        }
    }

    /// Picks the red amplitude so the ratio of ratios maps to `spo2` on the
    /// default calibration curve.
    pub fn with_spo2(mut self, spo2: f32) -> Self {
        let r = (104.0 - spo2) / 17.0;
        let ir_ratio = 2.0 * self.ir_ac / (self.ir_dc - self.ir_ac);
        let red_ratio = r * ir_ratio;
        self.red_ac = red_ratio * self.red_dc / (2.0 + red_ratio);
        self
    }

    pub fn with_wander(mut self, amplitude: f32) -> Self {
        self.wander = amplitude;
        self
    }

    pub fn with_ir_level(mut self, dc: f32, ac: f32) -> Self {
        self.ir_dc = dc;
        self.ir_ac = ac;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn starting_at(mut self, elapsed_ms: u32) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn sample_period_ms(&self) -> u32 {
        self.sample_period_ms
    }

    pub fn next_reading(&mut self) -> RawReading {
        let ms = self.elapsed_ms as f32;
        self.elapsed_ms += self.sample_period_ms;

        let beat = ms * self.bpm / (60.0 * 1000.0);
        let pulse = (beat * TAU).sin();
        let drift = (ms / 10_000.0 * TAU).sin() * self.wander;

        let level = |dc: f32, ac: f32| (dc + drift + pulse * ac).round().max(0.0) as u32;
        RawReading {
            red: level(self.red_dc, self.red_ac),
            ir: level(self.ir_dc, self.ir_ac),
            elapsed_ms: ms as u32,
            temperature: self.temperature,
        }
    }
}

impl Iterator for SyntheticPpg {
    type Item = RawReading;

    fn next(&mut self) -> Option<RawReading> {
        Some(self.next_reading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_spacing_and_levels() {
        let readings = SyntheticPpg::new(75.0).take(32).collect::<Vec<_>>();
        assert_eq!(readings[0].elapsed_ms, 0);
        assert_eq!(readings[31].elapsed_ms, 31 * 50);
        // 75 bpm at 50ms is exactly 16 samples per beat.
        assert_eq!(readings[4].ir, 100_400);
        assert_eq!(readings[20].ir, 100_400);
        assert_eq!(readings[12].ir, 99_600);
        assert!(readings.iter().all(|r| r.red < r.ir));
    }

    #[test]
    fn spo2_sets_red_amplitude() {
        let s = SyntheticPpg::new(60.0).with_spo2(104.0);
        assert_eq!(s.red_ac, 0.0);
        let s = SyntheticPpg::new(60.0).with_spo2(95.0);
        assert!(s.red_ac > 0.0 && s.red_ac < s.ir_ac);
    }
}
