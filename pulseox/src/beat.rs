use util::{History2, RingBuffer};

use crate::{extremum::Extremum, outcome::Rejection, Thresholds, HISTORY_LEN};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BeatOutcome {
    /// Timing reference only, no interval yet.
    First,
    Accepted { bpm: u16, instant_bpm: f32 },
    Rejected(Rejection),
    SignalLost,
}

/// Turns confirmed IR peaks into a smoothed heart rate.
pub struct BeatTracker {
    thresholds: Thresholds,
    beat_time: History2<Option<u32>>,
    beats: u32,
    instant_bpm: f32,
    bpm: u16,
    history: RingBuffer<HISTORY_LEN, f32>,
    beat_in_progress: bool,
}

impl BeatTracker {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            beat_time: Default::default(),
            beats: 0,
            instant_bpm: 0.0,
            bpm: 0,
            history: Default::default(),
            beat_in_progress: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds);
    }

    /// `trough` is the most recent true minimum of the same channel.
    pub fn on_peak(&mut self, peak: Extremum, trough: Option<Extremum>) -> BeatOutcome {
        let t = &self.thresholds;
        let in_bounds = trough
            .map(|trough| peak.value - trough.value)
            .map_or(false, |swing| t.min_swing < swing && swing < t.max_swing);
        if !in_bounds {
            log::trace!("beat at {}ms: swing out of bounds", peak.time_ms);
            return BeatOutcome::Rejected(Rejection::SwingOutOfBounds);
        }

        let Some(last) = self.beat_time.current else {
            self.beat_time.push(Some(peak.time_ms));
            self.beats += 1;
            return BeatOutcome::First;
        };

        let delta = match peak.time_ms.checked_sub(last) {
            Some(d) if d > 0 => d,
            _ => {
                log::trace!("beat at {}ms: no time since last beat", peak.time_ms);
                return BeatOutcome::Rejected(Rejection::DuplicateTimestamp);
            }
        };

        if delta >= t.signal_loss_ms && self.beats > t.signal_loss_min_beats {
            log::warn!("no beat for {}ms, signal lost", delta);
            return BeatOutcome::SignalLost;
        }

        let instant_bpm = 60_000.0 / delta as f32;
        self.instant_bpm = instant_bpm;

        let smoothed = self.bpm as f32;
        let accept = smoothed < t.warmup_bpm
            || libm::fabsf(instant_bpm - smoothed) < t.agreement_bpm
            || self.beats < t.learning_beats;
        if !accept {
            log::trace!("beat at {}ms: {} bpm is an outlier", peak.time_ms, instant_bpm);
            return BeatOutcome::Rejected(Rejection::Outlier);
        }

        self.beat_time.push(Some(peak.time_ms));
        self.beats += 1;
        self.history.add(instant_bpm);
        self.bpm = self.history.mean().map_or(0, |m| libm::roundf(m) as u16);
        self.beat_in_progress = true;

        log::debug!("beat {}: {} bpm (instant {})", self.beats, self.bpm, instant_bpm);
        BeatOutcome::Accepted {
            bpm: self.bpm,
            instant_bpm,
        }
    }

    /// Clears the beat-in-progress token after an SpO2 update used it.
    pub fn consume_beat(&mut self) {
        self.beat_in_progress = false;
    }

    pub fn beat_in_progress(&self) -> bool {
        self.beat_in_progress
    }

    pub fn beats(&self) -> u32 {
        self.beats
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    pub fn instant_bpm(&self) -> f32 {
        self.instant_bpm
    }

    pub fn last_beat_ms(&self) -> Option<u32> {
        self.beat_time.current
    }

    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }
}
