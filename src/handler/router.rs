//! `handle_conn`: dispatch over an existing connection's FSM state.

use crate::flags::FlagSet;
use crate::handler::challenge::{deliver_in_7, deliver_in_8};
use crate::handler::established::handle_established;
use crate::handler::syn_received::handle_syn_received;
use crate::handler::syn_sent::handle_syn_sent;
use crate::segment::Segment;
use crate::state::{ConnectionId, Engine, TcpState};
use crate::window::in_window;

pub fn handle_conn(
    engine: Engine,
    now: u64,
    id: ConnectionId,
    seg: Segment,
) -> (Engine, Option<Segment>) {
    let Some(state) = engine.connections.get(&id).map(|c| c.tcp_state) else {
        return (engine, None);
    };

    match state {
        TcpState::SynSent => handle_syn_sent(engine, now, id, seg),
        TcpState::SynReceived => handle_syn_received(engine, now, id, seg),
        _ => {
            let cb = &engine.connections[&id].cb;
            if !in_window(cb, &seg) {
                return (engine, None);
            }

            if seg.flags.mem(FlagSet::RST) {
                deliver_in_7(engine, id, seg)
            } else if seg.flags.mem(FlagSet::SYN) {
                deliver_in_8(engine, id)
            } else {
                handle_established(engine, now, id, seg)
            }
        }
    }
}
