use crate::reading::Reading;
use std::collections::VecDeque;

pub const DEFAULT_WINDOW_CAPACITY: usize = 60;

/// Bounded buffer of the most recent readings; the oldest is evicted once
/// capacity is exceeded.
#[derive(Debug, Clone)]
pub struct ReadingWindow {
    buf: VecDeque<Reading>,
    cap: usize,
    dropped: usize,
}

impl Default for ReadingWindow {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }
}

impl ReadingWindow {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
            dropped: 0,
        }
    }

    pub fn push(&mut self, reading: Reading) {
        if self.cap == 0 {
            self.dropped += 1;
            return;
        }

        if self.buf.len() == self.cap {
            self.buf.pop_front();
            self.dropped += 1;
        }
        self.buf.push_back(reading);
    }

    /// Newest `n` readings, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Reading> {
        let skip = self.buf.len().saturating_sub(n);
        self.buf.iter().skip(skip).copied().collect()
    }

    pub fn to_vec(&self) -> Vec<Reading> {
        self.buf.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.buf.iter()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.buf.back()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
