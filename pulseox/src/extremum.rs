use util::History2;

use crate::preprocess::Sample;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    Ir,
    Red,
}

impl Sample {
    pub fn channel(&self, c: Channel) -> f32 {
        match c {
            Channel::Ir => self.ir,
            Channel::Red => self.red,
        }
    }
}

/// Depth-2 register of smoothed samples shared by both channels.
#[derive(Copy, Clone, Debug, Default)]
pub struct ChannelRegister {
    samples: History2<Option<Sample>>,
}

impl ChannelRegister {
    pub fn advance(&mut self, s: Sample) {
        self.samples.push(Some(s));
    }

    pub fn current(&self) -> Option<Sample> {
        self.samples.current
    }

    pub fn previous(&self) -> Option<Sample> {
        self.samples.previous
    }

    pub fn reset(&mut self) {
        self.samples = Default::default();
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extremum {
    pub value: f32,
    pub time_ms: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExtremumKind {
    Maximum,
    Minimum,
}

/// Per-channel hysteresis peak/valley detector. Maxima and minima strictly
/// alternate: a minimum is only confirmed after an unconsumed maximum.
#[derive(Clone, Debug)]
pub struct ChannelState {
    rising_edge: bool,
    falling_edge: bool,
    running_max: f32,
    running_min: f32,
    last_extremum: Option<ExtremumKind>,
    local_max: History2<Option<Extremum>>,
    local_min: History2<Option<Extremum>>,
    local_max_detected: bool,
    min_retrace: f32,
}

impl ChannelState {
    pub fn new(min_retrace: f32) -> Self {
        Self {
            rising_edge: false,
            falling_edge: false,
            running_max: 0.0,
            running_min: 0.0,
            last_extremum: None,
            local_max: Default::default(),
            local_min: Default::default(),
            local_max_detected: false,
            min_retrace,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.min_retrace);
    }

    /// Feeds the channel's two most recent smoothed values. Returns the kind
    /// of true extremum confirmed at the previous sample, if any.
    pub fn update(
        &mut self,
        current: f32,
        previous: f32,
        previous_time_ms: u32,
    ) -> Option<ExtremumKind> {
        self.detect_edge(current, previous);
        self.last_extremum = self.detect_extremum(current, previous, previous_time_ms);
        self.last_extremum
    }

    fn detect_edge(&mut self, current: f32, previous: f32) {
        if current > previous {
            self.rising_edge = true;
            self.running_max = current;
        } else if current < previous {
            self.falling_edge = true;
            self.running_min = current;
        }
    }

    fn detect_extremum(
        &mut self,
        current: f32,
        previous: f32,
        previous_time_ms: u32,
    ) -> Option<ExtremumKind> {
        if self.rising_edge && previous - current >= self.min_retrace {
            self.local_max.push(Some(Extremum {
                value: self.running_max,
                time_ms: previous_time_ms,
            }));
            self.rising_edge = false;
            self.local_max_detected = true;
            Some(ExtremumKind::Maximum)
        } else if self.rising_edge && previous == self.running_min && self.local_max_detected {
            self.local_min.push(Some(Extremum {
                value: self.running_min,
                time_ms: previous_time_ms,
            }));
            self.local_max_detected = false;
            self.falling_edge = false;
            Some(ExtremumKind::Minimum)
        } else {
            None
        }
    }

    pub fn rising_edge(&self) -> bool {
        self.rising_edge
    }

    pub fn falling_edge(&self) -> bool {
        self.falling_edge
    }

    pub fn last_extremum(&self) -> Option<ExtremumKind> {
        self.last_extremum
    }

    pub fn local_max(&self) -> Option<Extremum> {
        self.local_max.current
    }

    pub fn local_min(&self) -> Option<Extremum> {
        self.local_min.current
    }

    /// The two most recent true minima, `(previous, current)`.
    pub fn minima(&self) -> Option<(Extremum, Extremum)> {
        Some((self.local_min.previous?, self.local_min.current?))
    }
}
