//! Opaque timer handles. This core never schedules or fires timers itself --
//! it only records enough information for an external timer wheel to act on.

/// Caller-supplied clock value. Kept as a bare tick count (rather than
/// `std::time::Instant`) so the engine stays a pure function of its inputs:
/// handlers never call `Instant::now()` themselves.
pub type Instant = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Rexmt,
    ConnEst,
    Delack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub started: Instant,
    pub kind: Kind,
    pub shift: u32,
    pub backoff_ms: u64,
}

/// `Timers.timer(now, kind, shift)` from the external-interfaces table.
pub struct Timers;

impl Timers {
    pub fn timer(now: Instant, kind: Kind, shift: u32, backoff_table: &[u64]) -> Timer {
        let backoff_ms = backoff_table
            .get(shift as usize)
            .copied()
            .unwrap_or_else(|| *backoff_table.last().unwrap_or(&1000));

        Timer {
            started: now,
            kind,
            shift,
            backoff_ms,
        }
    }
}
