//! The `deliver_in_3` pipeline for data-transfer and close-dance states:
//! `topstuff` / `ackstuff` / `datastuff` / `ststuff`.

use tracing::{trace, warn};

use crate::flags::FlagSet;
use crate::segment::{dropwithreset, make_ack, Segment};
use crate::state::{ConnectionId, Engine, TcpState};
use crate::window::in_window;

fn flag_shape_allowed(flags: FlagSet) -> bool {
    const ALLOWED: [FlagSet; 8] = [
        FlagSet::empty(),
        FlagSet::ACK,
        FlagSet::FIN,
        FlagSet::FIN.union(FlagSet::ACK),
        FlagSet::PSH,
        FlagSet::PSH.union(FlagSet::ACK),
        FlagSet::FIN.union(FlagSet::PSH),
        FlagSet::FIN.union(FlagSet::PSH).union(FlagSet::ACK),
    ];
    ALLOWED.iter().any(|s| flags.exact(*s))
}

/// State transition table, keyed by `(from, rcvd_fin, ourfinisacked)`.
fn next_state(from: TcpState, fin: bool, fin_acked: bool) -> TcpState {
    use TcpState::*;
    match (from, fin, fin_acked) {
        (Established, false, _) => Established,
        (Established, true, _) => CloseWait,
        (CloseWait, _, _) => CloseWait,
        (FinWait1, false, false) => FinWait1,
        (FinWait1, false, true) => FinWait2,
        (FinWait1, true, false) => Closing,
        (FinWait1, true, true) => TimeWait,
        (FinWait2, false, _) => FinWait2,
        (FinWait2, true, _) => TimeWait,
        (Closing, false, false) => Closing,
        (Closing, false, true) => TimeWait,
        (Closing, true, false) => Closing,
        (Closing, true, true) => TimeWait,
        (LastAck, _, _) => LastAck,
        (TimeWait, _, _) => TimeWait,
        (SynSent, _, _) | (SynReceived, _, _) => from,
    }
}

pub fn handle_established(
    mut engine: Engine,
    _now: u64,
    id: ConnectionId,
    seg: Segment,
) -> (Engine, Option<Segment>) {
    let Some(conn) = engine.connections.get(&id) else {
        return (engine, None);
    };
    let mut cb = conn.cb.clone();
    let tcp_state = conn.tcp_state;
    let mut cantrcvmore = conn.cantrcvmore;

    if !in_window(&cb, &seg) {
        trace!(?id, "deliver_in_3: segment out of window, dropping");
        return (engine, None);
    }

    if !flag_shape_allowed(seg.flags) {
        warn!(?id, flags = ?seg.flags, "deliver_in_3: illegal flag shape, resetting");
        engine.connections.remove(&id);
        return (engine, dropwithreset(&seg, &id));
    }

    // topstuff
    let window_opened = cb.rcv_wnd == 0 && seg.window > 0;
    let _ = window_opened; // consumed by the output stage, not this core

    // ackstuff
    let mut fin_acked = false;
    if seg.flags.mem(FlagSet::ACK) {
        cb.snd_una = cb.snd_una.max(seg.ack);
        fin_acked = seg.ack.equal(cb.snd_nxt.incr());
    }

    // datastuff
    let rcv_nxt_before = cb.rcv_nxt;
    let (rcv_nxt_after, fin, ack_needed) = if seg.seq.equal(cb.rcv_nxt) {
        let nxt = seg.seq + seg.len();
        if seg.flags.mem(FlagSet::FIN) {
            (nxt.incr(), true, true)
        } else {
            let ack_needed = nxt.greater(rcv_nxt_before);
            (nxt, false, ack_needed)
        }
    } else {
        (rcv_nxt_before, false, false)
    };
    cb.rcv_nxt = rcv_nxt_after;
    // Peer's advertised window is stored without re-applying our own
    // snd_scale.
    cb.rcv_wnd = seg.window as u32;

    if fin {
        cantrcvmore = true;
    }

    let new_state = next_state(tcp_state, fin, fin_acked);

    if ack_needed {
        cb.last_ack_sent = cb.rcv_nxt;
    }

    // This path only ever acknowledges what arrived; it never originates our
    // own FIN (that happens when the application closes, outside this pure
    // receive path), so the reply never piggybacks FIN here.
    let reply = if ack_needed {
        Some(make_ack(&cb, false, &id))
    } else {
        None
    };

    if let Some(conn) = engine.connections.get_mut(&id) {
        conn.cb = cb;
        conn.tcp_state = new_state;
        conn.cantrcvmore = cantrcvmore;
    }

    (engine, reply)
}
