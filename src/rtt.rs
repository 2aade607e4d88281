//! RTT estimator inputs (Jacobson/Karels), extracted from
//! `maminrayej-handshake`'s `TCB::compute_rto` into a pure function over
//! `RttInfo`.

use std::cmp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RttInfo {
    pub srtt_ms: u64,
    pub rttvar_ms: u64,
    pub rto_ms: u64,
    pub measured: bool,
}

const MIN_RTO_MS: u64 = 1000;

/// `update_rtt(span, t_rttinf) -> t_rttinf`.
pub fn update_rtt(span_ms: u64, info: RttInfo) -> RttInfo {
    let (srtt_ms, rttvar_ms) = if !info.measured {
        (span_ms, span_ms / 2)
    } else {
        let rttvar = ((1.0 - 0.25) * info.rttvar_ms as f64
            + 0.25 * (info.srtt_ms as i64 - span_ms as i64).unsigned_abs() as f64)
            as u64;
        let srtt = ((1.0 - 0.125) * info.srtt_ms as f64 + 0.125 * span_ms as f64) as u64;
        (srtt, rttvar)
    };

    let rto_ms = cmp::max(srtt_ms + cmp::max(100, 4 * rttvar_ms), MIN_RTO_MS);

    RttInfo {
        srtt_ms,
        rttvar_ms,
        rto_ms,
        measured: true,
    }
}
