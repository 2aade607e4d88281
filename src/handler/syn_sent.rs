//! Active-open completion: `deliver_in_2`, `deliver_in_2a`, `deliver_in_2b`.

use tracing::{debug, trace};

use crate::bufsize::calculate_buf_sizes;
use crate::cb::scale_window;
use crate::flags::FlagSet;
use crate::rtt::update_rtt;
use crate::segment::{make_ack, Segment};
use crate::seq::SeqNum;
use crate::state::{ConnState, ConnectionId, Engine, TcpState};

pub fn handle_syn_sent(
    mut engine: Engine,
    now: u64,
    id: ConnectionId,
    seg: Segment,
) -> (Engine, Option<Segment>) {
    let syn_ack = seg.flags.exact(FlagSet::SYN | FlagSet::ACK);
    let syn_only = seg.flags.only(FlagSet::SYN);

    match (syn_ack, syn_only) {
        (true, false) => deliver_in_2(engine, now, id, seg),
        (false, true) => deliver_in_2b(engine, id),
        (false, false) => deliver_in_2a(engine, id, seg),
        (true, true) => unreachable!("SYN|ACK and bare SYN are mutually exclusive flag shapes"),
    }
}

fn deliver_in_2(
    mut engine: Engine,
    now: u64,
    id: ConnectionId,
    seg: Segment,
) -> (Engine, Option<Segment>) {
    let Some(conn) = engine.connections.get(&id).cloned() else {
        return (engine, None);
    };
    let mut cb = conn.cb;

    if !seg.ack.equal(cb.snd_nxt) {
        trace!(?id, "deliver_in_2: ack doesn't match snd_nxt, dropping");
        return (engine, None);
    }

    if let Some(ws) = seg.ws {
        cb.tf_doing_ws = true;
        cb.rcv_scale = cb.request_r_scale;
        cb.snd_scale = ws;
    }

    let (rcvbufsize, sndbufsize, t_maxseg, snd_cwnd) = calculate_buf_sizes(
        cb.t_advmss,
        seg.mss,
        None,
        engine.cfg.so_rcvbuf,
        engine.cfg.so_sndbuf,
    );
    cb.t_maxseg = t_maxseg;
    cb.snd_cwnd = snd_cwnd;

    let rcv_wnd = crate::bufsize::calculate_bsd_rcv_wnd(&ConnState {
        cb: cb.clone(),
        tcp_state: conn.tcp_state,
        rcvbufsize,
        sndbufsize,
        cantrcvmore: conn.cantrcvmore,
    });

    if let Some((ts0, seq0)) = cb.t_rttseg {
        if seg.ack.greater(seq0) {
            cb.t_rttinf = update_rtt(now.saturating_sub(ts0), cb.t_rttinf);
            cb.t_softerror = None;
            cb.t_rttseg = None;
        }
    }

    if seg.ack.equal(cb.snd_max) {
        cb.tt_rexmt = None;
    }

    let rcv_nxt = seg.seq.incr();

    cb.t_idletime = now;
    cb.tt_conn_est = None;
    cb.tt_delack = None;
    cb.snd_una = cb.iss.incr();
    cb.snd_wl1 = seg.seq.incr();
    cb.snd_wl2 = seg.ack;
    cb.irs = seg.seq;
    cb.rcv_nxt = rcv_nxt;
    cb.last_ack_sent = rcv_nxt;
    cb.rcv_wnd = rcv_wnd;
    cb.rcv_adv = rcv_nxt + scale_window(rcv_wnd, cb.rcv_scale);
    cb.tf_rxwin0sent = rcv_wnd == 0;

    let reply = make_ack(&cb, false, &id);

    engine.connections.insert(
        id,
        ConnState {
            cb,
            tcp_state: TcpState::Established,
            rcvbufsize,
            sndbufsize,
            cantrcvmore: conn.cantrcvmore,
        },
    );

    debug!(?id, "deliver_in_2: active open completed -> Established");
    (engine, Some(reply))
}

/// Stale reset-bearing segment from a prior incarnation: the connection is
/// silently removed, whatever the segment's exact shape.
fn deliver_in_2a(mut engine: Engine, id: ConnectionId, seg: Segment) -> (Engine, Option<Segment>) {
    let expected = seg.flags.exact(FlagSet::ACK | FlagSet::RST)
        && engine
            .connections
            .get(&id)
            .map(|c| seg.ack.equal(c.cb.snd_nxt))
            .unwrap_or(false);

    trace!(?id, expected, "deliver_in_2a: silently dropping connection");
    engine.connections.remove(&id);
    (engine, None)
}

/// Simultaneous open. Out of scope here -- treated as a protocol abort:
/// no state change, no reply.
fn deliver_in_2b(engine: Engine, id: ConnectionId) -> (Engine, Option<Segment>) {
    trace!(?id, "deliver_in_2b: simultaneous open unsupported, dropping");
    (engine, None)
}
