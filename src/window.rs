//! `in_window`: RFC 793-bis §3.3 segment acceptance table.
//!
//! Ground: `maminrayej-handshake`'s `TCB::is_segment_valid` implements the
//! same four cases over raw `u32`s; this version is the same arithmetic
//! lifted onto `SeqNum` and the decoupled `Segment`/`ControlBlock` types.

use crate::cb::ControlBlock;
use crate::segment::Segment;
use crate::seq::SeqNum;

pub fn in_window(cb: &ControlBlock, seg: &Segment) -> bool {
    let len = seg.len();
    let rcv_wnd = cb.rcv_wnd;
    let rcv_nxt = cb.rcv_nxt;

    match (len, rcv_wnd) {
        (0, 0) => seg.seq.equal(rcv_nxt),
        (0, w) if w > 0 => in_half_open_window(rcv_nxt, seg.seq, rcv_wnd),
        (l, 0) if l > 0 => false,
        (l, w) if l > 0 && w > 0 => {
            let last = seg.seq + (len - 1);
            in_half_open_window(rcv_nxt, seg.seq, rcv_wnd) || in_half_open_window(rcv_nxt, last, rcv_wnd)
        }
        _ => false,
    }
}

/// `rcv_nxt <= x < rcv_nxt + rcv_wnd`, modular. Ground: the
/// `is_between_wrapped(rcv_nxt.wrapping_sub(1), seg_seq, rcv_nxt + rcv_wnd)`
/// idiom used throughout `is_segment_valid`.
fn in_half_open_window(rcv_nxt: SeqNum, x: SeqNum, rcv_wnd: u32) -> bool {
    SeqNum::strictly_between(rcv_nxt.add_i32(-1), x, rcv_nxt + rcv_wnd)
}
