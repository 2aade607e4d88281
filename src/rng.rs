//! ISS source as an injected capability, so tests can supply deterministic
//! streams instead of drawing from the OS RNG.

use rand::RngCore;
use std::fmt;

pub trait IssSource: fmt::Debug {
    fn next_u32(&mut self) -> u32;
}

/// `randomconv::u32(rng)` backed by `rand`'s thread-local-seeded `StdRng`.
#[derive(Debug)]
pub struct OsIssSource(rand::rngs::StdRng);

impl OsIssSource {
    pub fn new() -> Self {
        use rand::SeedableRng;
        OsIssSource(rand::rngs::StdRng::from_entropy())
    }
}

impl Default for OsIssSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IssSource for OsIssSource {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}

/// Deterministic source for tests: yields a fixed starting value, then
/// increments by a fixed stride so successive connections still get
/// distinct initial sequence numbers.
#[derive(Debug, Clone, Copy)]
pub struct CountingIssSource {
    next: u32,
    stride: u32,
}

impl CountingIssSource {
    pub fn new(start: u32, stride: u32) -> Self {
        CountingIssSource {
            next: start,
            stride,
        }
    }
}

impl IssSource for CountingIssSource {
    fn next_u32(&mut self) -> u32 {
        let v = self.next;
        self.next = self.next.wrapping_add(self.stride);
        v
    }
}
