//! Response Accumulation Buffer
//!
//! Collects a streamed origin response as a cache candidate, giving up as
//! soon as it can no longer be cached.

use bytes::Bytes;

/// Whether a finished response may go into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Small enough; holds the full response
    Cacheable(Bytes),
    /// Reached the per-object limit
    Oversized { total: usize },
    /// Memory for the buffer could not be reserved
    Unavailable,
    /// The origin sent nothing
    Empty,
}

/// Cache candidate for one response, capped below `limit` bytes.
#[derive(Debug)]
pub struct ResponseBuffer {
    limit: usize,
    total: usize,
    data: Option<Vec<u8>>,
    unavailable: bool,
}

impl ResponseBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            total: 0,
            data: Some(Vec::new()),
            unavailable: false,
        }
    }

    /// Records a chunk that is being forwarded to the client.
    ///
    /// Once the running total reaches the limit the buffer is released and
    /// later chunks are only counted.
    pub fn push(&mut self, chunk: &[u8]) {
        self.total += chunk.len();

        if self.total >= self.limit {
            self.data = None;
            return;
        }

        if let Some(data) = self.data.as_mut() {
            if data.try_reserve(chunk.len()).is_err() {
                self.data = None;
                self.unavailable = true;
                return;
            }
            data.extend_from_slice(chunk);
        }
    }

    /// Bytes seen so far, cached or not.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn finish(self) -> Admission {
        if self.unavailable {
            return Admission::Unavailable;
        }
        if self.total >= self.limit {
            return Admission::Oversized { total: self.total };
        }
        match self.data {
            Some(data) if !data.is_empty() => Admission::Cacheable(Bytes::from(data)),
            _ => Admission::Empty,
        }
    }
}
