#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Reading {
    pub bpm: u16,
    pub spo2: f32,
}

/// Candidate discarded as physiologically implausible.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    SwingOutOfBounds,
    DuplicateTimestamp,
    Outlier,
    Spo2OutOfRange,
}

/// Computation skipped because it would divide by zero or lacks an operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Degenerate {
    /// Both baseline minima share a timestamp.
    FlatBaseline,
    ZeroBaseline,
    ZeroIrRatio,
    MissingIrRatio,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    Warmup,
    Idle,
    FirstBeat,
    BeatAccepted,
    Rejected(Rejection),
    Degenerate(Degenerate),
    SignalLost,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The smoothed SpO2 was updated this cycle.
    Updated(Reading),
    Unchanged { reading: Reading, reason: Reason },
}

impl Outcome {
    pub fn reading(&self) -> Reading {
        match self {
            Outcome::Updated(r) => *r,
            Outcome::Unchanged { reading, .. } => *reading,
        }
    }

    pub fn new_value(&self) -> bool {
        matches!(self, Outcome::Updated(_))
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            Outcome::Updated(_) => None,
            Outcome::Unchanged { reason, .. } => Some(*reason),
        }
    }

    /// `(new_value, bpm, spo2)`
    pub fn as_tuple(&self) -> (bool, u16, f32) {
        let r = self.reading();
        (self.new_value(), r.bpm, r.spo2)
    }
}
