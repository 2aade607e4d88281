//! Decoded input shape and the pure reply constructors (`make_syn_ack`,
//! `make_ack`, `dropwithreset`), treated as pure constructors rather than
//! side-effecting I/O.

use crate::cb::ControlBlock;
use crate::flags::FlagSet;
use crate::seq::SeqNum;
use crate::state::ConnectionId;

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub seq: SeqNum,
    pub ack: SeqNum,
    pub window: u16,
    pub flags: FlagSet,
    pub payload: Vec<u8>,
    pub src_port: u16,
    pub dst_port: u16,
    pub mss: Option<u16>,
    pub ws: Option<u8>,
}

impl Segment {
    pub fn len(&self) -> u32 {
        self.payload.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

fn empty_reply(id: &ConnectionId, seq: SeqNum, ack: SeqNum, window: u16, flags: FlagSet) -> Segment {
    Segment {
        seq,
        ack,
        window,
        flags,
        payload: Vec::new(),
        src_port: id.local_port,
        dst_port: id.remote_port,
        mss: None,
        ws: None,
    }
}

/// `make_syn_ack(cb, id) -> segment`: the SYN|ACK sent out of
/// `handle_noconn` upon an acceptable passive-open SYN.
pub fn make_syn_ack(cb: &ControlBlock, id: &ConnectionId) -> Segment {
    let mut seg = empty_reply(
        id,
        cb.iss,
        cb.rcv_nxt,
        window_for_advertisement(cb),
        FlagSet::SYN | FlagSet::ACK,
    );
    seg.mss = Some(cb.t_advmss);
    if cb.tf_doing_ws {
        seg.ws = Some(cb.request_r_scale);
    }
    seg
}

/// `make_ack(cb, fin_piggyback, id) -> segment`.
pub fn make_ack(cb: &ControlBlock, fin_piggyback: bool, id: &ConnectionId) -> Segment {
    let mut flags = FlagSet::ACK;
    if fin_piggyback {
        flags |= FlagSet::FIN;
    }
    empty_reply(id, cb.snd_nxt, cb.rcv_nxt, window_for_advertisement(cb), flags)
}

/// `dropwithreset(seg) -> segment`, a stateless RST-generation routine that
/// itself suppresses RST-in-response-to-RST. Takes the *offending* segment
/// (not a control block, since by construction there may be no connection)
/// and the id under which it arrived so the reply can be addressed back.
pub fn dropwithreset(seg: &Segment, id: &ConnectionId) -> Option<Segment> {
    if seg.flags.mem(FlagSet::RST) {
        return None;
    }

    let (seq, ack) = if seg.flags.mem(FlagSet::ACK) {
        (seg.ack, None)
    } else {
        (SeqNum(0), Some(seg.seq + seg.len()))
    };

    let mut flags = FlagSet::RST;
    let ack_num = match ack {
        Some(a) => {
            flags |= FlagSet::ACK;
            a
        }
        None => SeqNum(0),
    };

    Some(empty_reply(id, seq, ack_num, 0, flags))
}

fn window_for_advertisement(cb: &ControlBlock) -> u16 {
    let scaled = cb.rcv_wnd >> cb.snd_scale;
    std::cmp::min(scaled, u16::MAX as u32) as u16
}
