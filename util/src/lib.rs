#![cfg_attr(not(test), no_std)]

/// Fixed-capacity FIFO. Adding to a full buffer evicts the oldest value.
pub struct RingBuffer<const N: usize, T> {
    ring_buffer: [T; N],
    next: usize,
    len: usize,
}

impl<const N: usize, T: Default> Default for RingBuffer<N, T> {
    fn default() -> Self {
        Self {
            ring_buffer: core::array::from_fn(|_| Default::default()),
            next: 0,
            len: 0,
        }
    }
}

impl<const N: usize, T> RingBuffer<N, T> {
    pub fn add(&mut self, mut v: T) -> Option<T> {
        let was_full = self.is_full();

        core::mem::swap(&mut self.ring_buffer[self.next], &mut v);
        self.next = (self.next + 1) % N;
        self.len = (self.len + 1).min(N);

        if was_full {
            Some(v)
        } else {
            None
        }
    }

    /// `diff == 1` is the newest value.
    pub fn past_value(&self, diff: usize) -> Option<&T> {
        if diff == 0 || diff > self.len {
            return None;
        }
        let i = (self.next + N - diff) % N;
        Some(&self.ring_buffer[i])
    }

    pub fn newest(&self) -> Option<&T> {
        self.past_value(1)
    }

    pub fn oldest(&self) -> Option<&T> {
        self.past_value(self.len)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let start = (self.next + N - self.len) % N;
        (0..self.len).map(move |i| &self.ring_buffer[(start + i) % N])
    }

    pub fn clear(&mut self) {
        self.next = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> RingBuffer<N, f32> {
    pub fn mean(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let sum: f32 = self.iter().sum();
        Some(sum / self.len as f32)
    }
}

/// The two most recent values of something, addressed by name.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct History2<T> {
    pub current: T,
    pub previous: T,
}

impl<T> History2<T> {
    pub fn push(&mut self, v: T) {
        self.previous = core::mem::replace(&mut self.current, v);
    }
}
