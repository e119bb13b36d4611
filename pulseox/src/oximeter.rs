use crate::{
    beat::{BeatOutcome, BeatTracker},
    extremum::{Channel, ChannelRegister, ChannelState, ExtremumKind},
    outcome::{Degenerate, Outcome, Reading, Reason},
    preprocess::{RawSample, Sample, SamplePreprocessor, DEFAULT_WINDOW},
    spo2::{AcDc, Spo2Estimator, Spo2Outcome},
    Thresholds,
};

/// Result of the IR pass, handed to the RED pass of the same cycle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IrUpdate {
    pub extremum: Option<ExtremumKind>,
    pub beat: Option<BeatOutcome>,
    pub ratio: Option<Result<AcDc, Degenerate>>,
    pub beat_in_progress: bool,
    /// Latest IR decomposition, possibly from an earlier cycle.
    pub ir_ratio: Option<AcDc>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RedUpdate {
    pub extremum: Option<ExtremumKind>,
    pub spo2: Option<Spo2Outcome>,
}

/// Online heart rate and SpO2 extraction for one physiological stream.
pub struct PulseOximeter<const N: usize = DEFAULT_WINDOW> {
    thresholds: Thresholds,
    preprocessor: SamplePreprocessor<N>,
    register: ChannelRegister,
    ir: ChannelState,
    red: ChannelState,
    beats: BeatTracker,
    spo2: Spo2Estimator,
}

impl Default for PulseOximeter {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl<const N: usize> PulseOximeter<N> {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            preprocessor: Default::default(),
            register: Default::default(),
            ir: ChannelState::new(thresholds.ir_min_retrace),
            red: ChannelState::new(thresholds.red_min_retrace),
            beats: BeatTracker::new(thresholds),
            spo2: Spo2Estimator::new(thresholds),
        }
    }

    /// Equivalent to a fresh instance with the same thresholds.
    pub fn reset(&mut self) {
        log::info!("resetting after {} beats", self.beats.beats());
        self.preprocessor.reset();
        self.register.reset();
        self.ir.reset();
        self.red.reset();
        self.beats.reset();
        self.spo2.reset();
    }

    /// Smooths one raw reading and processes it once the window is full.
    pub fn add_raw(&mut self, raw: RawSample) -> Outcome {
        match self.preprocessor.push(raw) {
            Some(s) => self.process(s),
            None => self.unchanged(Reason::Warmup),
        }
    }

    /// Processes one already smoothed sample.
    pub fn process(&mut self, s: Sample) -> Outcome {
        self.register.advance(s);
        let (Some(current), Some(previous)) = (self.register.current(), self.register.previous())
        else {
            return self.unchanged(Reason::Warmup);
        };

        let ir = self.process_ir(current, previous);
        if ir.beat == Some(BeatOutcome::SignalLost) {
            self.reset();
            return self.unchanged(Reason::SignalLost);
        }
        let red = self.process_red(current, previous, &ir);

        self.conclude(&ir, &red)
    }

    fn process_ir(&mut self, current: Sample, previous: Sample) -> IrUpdate {
        let extremum = self.ir.update(current.ir, previous.ir, previous.elapsed_ms);

        let mut beat = None;
        let mut ratio = None;
        match extremum {
            Some(ExtremumKind::Maximum) => {
                if let Some(peak) = self.ir.local_max() {
                    beat = Some(self.beats.on_peak(peak, self.ir.local_min()));
                }
            }
            Some(ExtremumKind::Minimum) if self.beats.beat_in_progress() => {
                ratio = self.channel_ratio(Channel::Ir);
                if let Some(Ok(r)) = ratio {
                    self.spo2.update_ir(r);
                }
            }
            _ => {}
        }

        IrUpdate {
            extremum,
            beat,
            ratio,
            beat_in_progress: self.beats.beat_in_progress(),
            ir_ratio: self.spo2.ir(),
        }
    }

    fn process_red(&mut self, current: Sample, previous: Sample, ir: &IrUpdate) -> RedUpdate {
        let extremum = self.red.update(current.red, previous.red, previous.elapsed_ms);

        // A degenerate IR decomposition voids this cycle's SpO2.
        let ir_degenerate = matches!(ir.ratio, Some(Err(_)));
        let mut spo2 = None;
        if extremum == Some(ExtremumKind::Minimum) && ir.beat_in_progress && !ir_degenerate {
            spo2 = match self.channel_ratio(Channel::Red) {
                None => None,
                Some(Err(d)) => Some(Spo2Outcome::Degenerate(d)),
                Some(Ok(red)) => {
                    let o = self.spo2.on_red(red, ir.ir_ratio);
                    if matches!(o, Spo2Outcome::Accepted { .. }) {
                        self.beats.consume_beat();
                    }
                    Some(o)
                }
            };
        }

        RedUpdate { extremum, spo2 }
    }

    /// `None` until the channel has two true minima under a known peak.
    fn channel_ratio(&self, c: Channel) -> Option<Result<AcDc, Degenerate>> {
        let state = self.channel(c);
        let minima = state.minima()?;
        let peak = state.local_max()?;
        Some(AcDc::new(peak, minima))
    }

    fn conclude(&self, ir: &IrUpdate, red: &RedUpdate) -> Outcome {
        let reason = match (red.spo2, ir.beat, ir.ratio) {
            (Some(Spo2Outcome::Accepted { .. }), _, _) => return Outcome::Updated(self.reading()),
            (Some(Spo2Outcome::Rejected(r)), _, _) => Reason::Rejected(r),
            (Some(Spo2Outcome::Degenerate(d)), _, _) => Reason::Degenerate(d),
            (None, Some(BeatOutcome::First), _) => Reason::FirstBeat,
            (None, Some(BeatOutcome::Accepted { .. }), _) => Reason::BeatAccepted,
            (None, Some(BeatOutcome::Rejected(r)), _) => Reason::Rejected(r),
            (None, _, Some(Err(d))) => Reason::Degenerate(d),
            _ => Reason::Idle,
        };
        self.unchanged(reason)
    }

    fn unchanged(&self, reason: Reason) -> Outcome {
        Outcome::Unchanged {
            reading: self.reading(),
            reason,
        }
    }

    pub fn reading(&self) -> Reading {
        Reading {
            bpm: self.beats.bpm(),
            spo2: self.spo2.spo2(),
        }
    }

    pub fn channel(&self, c: Channel) -> &ChannelState {
        match c {
            Channel::Ir => &self.ir,
            Channel::Red => &self.red,
        }
    }

    pub fn beats(&self) -> &BeatTracker {
        &self.beats
    }

    pub fn spo2(&self) -> &Spo2Estimator {
        &self.spo2
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Rejection;

    fn oximeter() -> PulseOximeter {
        PulseOximeter::default()
    }

    /// Piecewise-linear pulse: `rise` samples up, `fall` samples down.
    fn pulse(base: f32, swing: f32, rise: usize, fall: usize) -> Vec<f32> {
        let mut v = Vec::new();
        for i in 0..rise {
            v.push(base + swing * i as f32 / rise as f32);
        }
        for i in 0..fall {
            v.push(base + swing - swing * i as f32 / fall as f32);
        }
        v
    }

    fn feed<const N: usize>(
        ox: &mut PulseOximeter<N>,
        ir: &[f32],
        red: &[f32],
        t0: u32,
        period_ms: u32,
    ) -> Vec<Outcome> {
        ir.iter()
            .zip(red)
            .enumerate()
            .map(|(i, (ir, red))| {
                ox.process(Sample {
                    red: *red,
                    ir: *ir,
                    elapsed_ms: t0 + i as u32 * period_ms,
                })
            })
            .collect()
    }

    /// `beats` pulses of 16 samples at 50ms, i.e. 75 bpm.
    fn signal(beats: usize, ir_swing: f32, red_swing: f32) -> (Vec<f32>, Vec<f32>) {
        let mut ir = Vec::new();
        let mut red = Vec::new();
        for _ in 0..beats {
            ir.extend(pulse(100_000.0, ir_swing, 6, 10));
            red.extend(pulse(80_000.0, red_swing, 6, 10));
        }
        (ir, red)
    }

    #[test]
    fn constant_input_never_beats() {
        let mut ox = oximeter();
        let flat = vec![100_000.0; 200];
        let outcomes = feed(&mut ox, &flat, &flat, 0, 50);
        assert!(outcomes.iter().all(|o| !o.new_value()));
        assert!(outcomes
            .iter()
            .skip(1)
            .all(|o| o.reason() == Some(Reason::Idle)));
        assert_eq!(ox.beats().beats(), 0);
        assert_eq!(ox.reading(), Reading::default());
    }

    #[test]
    fn periodic_signal_converges() {
        let mut ox = oximeter();
        let (ir, red) = signal(20, 800.0, 400.0);
        let outcomes = feed(&mut ox, &ir, &red, 0, 50);

        assert_eq!(ox.reading().bpm, 75);
        let spo2 = ox.reading().spo2;
        assert!(60.0 < spo2 && spo2 < 100.0, "spo2 {}", spo2);
        assert!(outcomes.iter().any(|o| o.new_value()));
        assert!(outcomes
            .iter()
            .any(|o| o.reason() == Some(Reason::BeatAccepted)));
    }

    #[test]
    fn spo2_needs_two_minima() {
        let mut ox = oximeter();
        let (ir, red) = signal(2, 800.0, 400.0);
        let outcomes = feed(&mut ox, &ir, &red, 0, 50);
        assert!(outcomes.iter().all(|o| !o.new_value()));
        assert_eq!(ox.spo2().history().count(), 0);
    }

    #[test]
    fn oversized_swing_is_ignored() {
        let mut ox = oximeter();
        let (ir, red) = signal(10, 5000.0, 400.0);
        let outcomes = feed(&mut ox, &ir, &red, 0, 50);
        assert_eq!(ox.beats().beats(), 0);
        assert!(outcomes
            .iter()
            .any(|o| o.reason() == Some(Reason::Rejected(Rejection::SwingOutOfBounds))));
    }

    #[test]
    fn gap_resets_everything() {
        let mut ox = oximeter();
        let (ir, red) = signal(8, 800.0, 400.0);
        feed(&mut ox, &ir, &red, 0, 50);
        assert!(ox.beats().beats() > 2);

        let last = (ir.len() as u32 - 1) * 50;
        let outcomes = feed(&mut ox, &ir, &red, last + 5000, 50);
        assert!(outcomes
            .iter()
            .any(|o| o.reason() == Some(Reason::SignalLost)));
        assert!(ox.beats().beats() < 8);
    }

    #[test]
    fn reset_is_a_fresh_start() {
        let mut ox = oximeter();
        let (ir, red) = signal(12, 800.0, 400.0);
        feed(&mut ox, &ir, &red, 0, 50);
        assert_ne!(ox.reading(), Reading::default());

        ox.reset();
        assert_eq!(ox.reading(), Reading::default());
        assert_eq!(ox.beats().beats(), 0);
        assert_eq!(ox.beats().history().count(), 0);
        assert_eq!(ox.spo2().history().count(), 0);
        assert_eq!(ox.channel(Channel::Ir).local_max(), None);
        assert!(ox.channel(Channel::Red).minima().is_none());
    }

    #[test]
    fn zero_ir_baseline_skips_spo2() {
        let mut ox = oximeter();
        let (ir, red) = signal(12, 800.0, 400.0);
        feed(&mut ox, &ir, &red, 0, 50);
        let before = ox.reading();
        assert_ne!(before.spo2, 0.0);

        // IR keeps pulsing on a zero baseline, RED is unchanged. IR and RED
        // minima land in the same cycles.
        let mut ir = Vec::new();
        let mut red = Vec::new();
        for _ in 0..6 {
            ir.extend(pulse(0.0, 800.0, 6, 10));
            red.extend(pulse(80_000.0, 400.0, 6, 10));
        }
        let outcomes = feed(&mut ox, &ir, &red, 12 * 16 * 50, 50);

        // The first valley still interpolates against the last normal one.
        let later = &outcomes[2..];
        assert!(later
            .iter()
            .any(|o| o.reason() == Some(Reason::Degenerate(Degenerate::ZeroBaseline))));
        assert!(later.iter().all(|o| !o.new_value()));
        assert!(later
            .iter()
            .all(|o| o.reason() != Some(Reason::Rejected(Rejection::Spo2OutOfRange))));
        assert_eq!(ox.reading().spo2, before.spo2);
    }

    #[test]
    fn implausible_spo2_is_not_published() {
        let mut ox = oximeter();
        let (ir, red) = signal(12, 800.0, 400.0);
        feed(&mut ox, &ir, &red, 0, 50);

        // RED swing of 2000 on 80000 against IR 800 on 100000: r ~ 3.1,
        // spo2 ~ 51.
        let (ir, red) = signal(6, 800.0, 2000.0);
        let outcomes = feed(&mut ox, &ir, &red, 12 * 16 * 50, 50);
        let settled = outcomes[1].reading().spo2;

        let later = &outcomes[2..];
        assert!(later.iter().all(|o| !o.new_value()));
        assert!(later
            .iter()
            .any(|o| o.reason() == Some(Reason::Rejected(Rejection::Spo2OutOfRange))));
        assert_eq!(ox.reading().spo2, settled);
        assert_eq!(ox.reading().bpm, 75);
    }

    #[test]
    fn raw_samples_wait_for_window() {
        let mut ox = PulseOximeter::<5>::new(Thresholds::default());
        for i in 0..5 {
            let o = ox.add_raw(RawSample {
                red: 80_000,
                ir: 100_000,
                elapsed_ms: i * 50,
            });
            assert_eq!(o.reason(), Some(Reason::Warmup));
        }
        let o = ox.add_raw(RawSample {
            red: 80_000,
            ir: 100_000,
            elapsed_ms: 250,
        });
        assert_eq!(o.reason(), Some(Reason::Idle));
        assert_eq!(o.as_tuple(), (false, 0, 0.0));
    }
}
