//! Completing a passive open: `deliver_in_3c_3d`.

use tracing::{trace, warn};

use crate::flags::FlagSet;
use crate::segment::{dropwithreset, Segment};
use crate::state::{ConnectionId, Engine, TcpState};

pub fn handle_syn_received(
    mut engine: Engine,
    _now: u64,
    id: ConnectionId,
    seg: Segment,
) -> (Engine, Option<Segment>) {
    let Some(conn) = engine.connections.get(&id) else {
        return (engine, None);
    };
    let cb = conn.cb.clone();

    if !seg.seq.equal(cb.rcv_nxt) {
        trace!(?id, "deliver_in_3c_3d: seq mismatch, dropping");
        return (engine, None);
    }

    if !seg.flags.only(FlagSet::ACK) {
        warn!(?id, "deliver_in_3c_3d: expected bare ACK, resetting");
        engine.connections.remove(&id);
        return (engine, dropwithreset(&seg, &id));
    }

    if !seg.ack.equal(cb.snd_nxt) {
        warn!(?id, "deliver_in_3c_3d: ack doesn't match snd_nxt, resetting");
        engine.connections.remove(&id);
        return (engine, dropwithreset(&seg, &id));
    }

    let conn = engine.connections.get_mut(&id).unwrap();
    conn.cb.snd_una = seg.ack;
    conn.cb.snd_wl1 = seg.seq;
    conn.cb.snd_wl2 = seg.ack;
    conn.tcp_state = TcpState::Established;

    (engine, None)
}
