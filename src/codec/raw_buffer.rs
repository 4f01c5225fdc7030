/// Growable byte buffer with cheap removal from the front.
///
/// Consumed bytes are only skipped over; the backing storage is compacted
/// once the dead prefix outweighs the live bytes, so repeated small appends
/// followed by large discards stay linear.
#[derive(Debug, Default)]
pub struct RawBuffer {
    data: Vec<u8>,
    start: usize,
}

impl RawBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            start: 0,
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.compact();
        self.data.extend_from_slice(bytes);
    }

    /// Live (not yet consumed) bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.start..]
    }

    pub fn len(&self) -> usize {
        self.data.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard `n` bytes from the front (clamped to the live length)
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.len());
        self.start += n;
        if self.start == self.data.len() {
            self.data.clear();
            self.start = 0;
        }
        n
    }

    /// Keep only the last `n` bytes, returning how many were dropped
    pub fn keep_last(&mut self, n: usize) -> usize {
        let excess = self.len().saturating_sub(n);
        self.consume(excess)
    }

    /// Remove and return the first `n` bytes
    pub fn take_front(&mut self, n: usize) -> Vec<u8> {
        let n = n.min(self.len());
        let out = self.data[self.start..self.start + n].to_vec();
        self.consume(n);
        out
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.start = 0;
    }

    /// Position of the first occurrence of `needle` in the live bytes
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        self.as_slice()
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// Allocated storage, consumed prefix included
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    fn compact(&mut self) {
        if self.start > 0 && self.start >= self.len() {
            self.data.drain(..self.start);
            self.start = 0;
        }
    }
}
