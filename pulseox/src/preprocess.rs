use util::RingBuffer;

pub const DEFAULT_WINDOW: usize = 5;

/// One reading as delivered by the optical front end.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub red: u32,
    pub ir: u32,
    pub elapsed_ms: u32,
}

/// A smoothed reading. The timestamp is the truncated window mean.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub red: f32,
    pub ir: f32,
    pub elapsed_ms: u32,
}

/// Sliding arithmetic mean over the last `N` raw readings. The sums are
/// kept as exact integers and updated on every add, so averaging is O(1).
pub struct SamplePreprocessor<const N: usize = DEFAULT_WINDOW> {
    window: RingBuffer<N, RawSample>,
    red_sum: u64,
    ir_sum: u64,
    time_sum: u64,
}

impl<const N: usize> Default for SamplePreprocessor<N> {
    fn default() -> Self {
        Self {
            window: Default::default(),
            red_sum: 0,
            ir_sum: 0,
            time_sum: 0,
        }
    }
}

impl<const N: usize> SamplePreprocessor<N> {
    pub fn add(&mut self, s: RawSample) {
        if let Some(old) = self.window.add(s) {
            self.red_sum -= old.red as u64;
            self.ir_sum -= old.ir as u64;
            self.time_sum -= old.elapsed_ms as u64;
        }
        self.red_sum += s.red as u64;
        self.ir_sum += s.ir as u64;
        self.time_sum += s.elapsed_ms as u64;
    }

    /// `None` until the window is full.
    pub fn average(&self) -> Option<Sample> {
        if !self.window.is_full() {
            return None;
        }
        let n = N as u64;
        Some(Sample {
            red: (self.red_sum as f64 / n as f64) as f32,
            ir: (self.ir_sum as f64 / n as f64) as f32,
            elapsed_ms: (self.time_sum / n) as u32,
        })
    }

    pub fn push(&mut self, s: RawSample) -> Option<Sample> {
        self.add(s);
        self.average()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
