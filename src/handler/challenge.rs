//! RFC 5961 challenge-ACK responses for in-window RST/SYN segments:
//! `deliver_in_7`, `deliver_in_8`.

use tracing::{trace, warn};

use crate::segment::{dropwithreset, make_ack, Segment};
use crate::state::{ConnectionId, Engine};

/// In-window RST. Accepted (connection dropped) only if it lands exactly on
/// `rcv_nxt`; otherwise it's challenged rather than trusted.
pub fn deliver_in_7(mut engine: Engine, id: ConnectionId, seg: Segment) -> (Engine, Option<Segment>) {
    let Some(conn) = engine.connections.get(&id) else {
        return (engine, None);
    };

    if conn.cb.rcv_nxt.equal(seg.seq) {
        warn!(?id, "deliver_in_7: in-sequence RST accepted, dropping connection");
        engine.connections.remove(&id);
        return (engine, dropwithreset(&seg, &id));
    }

    trace!(?id, "deliver_in_7: off-sequence RST, sending challenge ACK");
    let reply = make_ack(&conn.cb, false, &id);
    (engine, Some(reply))
}

/// In-window SYN on a synchronized connection: always a challenge ACK, never
/// a state change.
pub fn deliver_in_8(engine: Engine, id: ConnectionId) -> (Engine, Option<Segment>) {
    let Some(conn) = engine.connections.get(&id) else {
        return (engine, None);
    };
    trace!(?id, "deliver_in_8: in-window SYN, sending challenge ACK");
    let reply = make_ack(&conn.cb, false, &id);
    (engine, Some(reply))
}
