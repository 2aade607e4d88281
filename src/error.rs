//! The two internal dispositions that govern the receive path, plus the
//! outer error type for the ambient wire layer.

/// Short-circuiting result threaded through every sub-step of a handler.
/// `Drop` discards the segment with no reply and no state change; `Reset`
/// drops the connection and replies with `dropwithreset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Disposition {
    #[error("drop: {0}")]
    Drop(&'static str),
    #[error("reset: {0}")]
    Reset(&'static str),
}

pub type Outcome<T> = Result<T, Disposition>;

/// Errors from the ambient decode/encode layer -- never produced by the
/// pure engine itself.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("malformed segment: {0}")]
    Malformed(String),

    #[error("checksum mismatch")]
    BadChecksum,

    #[error("martian source address")]
    Martian,

    #[error("port {0} already bound")]
    PortInUse(u16),
}
