//! Passive open / martian / RST-generation for segments that don't match an
//! existing connection.

use tracing::{debug, trace};

use crate::bufsize::{calculate_buf_sizes, tcp_mssopt};
use crate::cb::ControlBlock;
use crate::flags::FlagSet;
use crate::rtt::RttInfo;
use crate::segment::{dropwithreset, make_syn_ack, Segment};
use crate::state::{ConnState, ConnectionId, Engine, TcpState};
use crate::timer::{Kind as TimerKind, Timers};

pub fn handle_noconn(
    mut engine: Engine,
    now: u64,
    id: ConnectionId,
    seg: Segment,
) -> (Engine, Option<Segment>) {
    let acceptable = engine.listeners.contains(&id.local_port) && seg.flags.only(FlagSet::SYN);

    if !acceptable {
        trace!(?id, "handle_noconn: unacceptable segment, sending reset");
        let reply = dropwithreset(&seg, &id);
        return (engine, reply);
    }

    let advmss = tcp_mssopt(&id);
    let (rcvbufsize, sndbufsize, t_maxseg, snd_cwnd) = calculate_buf_sizes(
        advmss,
        seg.mss,
        None,
        engine.cfg.so_rcvbuf,
        engine.cfg.so_sndbuf,
    );
    let rcv_wnd = rcvbufsize;

    let (tf_doing_ws, snd_scale, rcv_scale, request_r_scale) = match seg.ws {
        Some(x) if x <= engine.cfg.tcp_maxwinscale => (true, x, engine.cfg.scale, engine.cfg.scale),
        _ => (false, 0, 0, 0),
    };

    let iss = crate::seq::SeqNum(engine.rng.next_u32());
    let ack = seg.seq.incr();

    let cb = ControlBlock {
        iss,
        irs: seg.seq,
        snd_una: iss,
        snd_nxt: iss.incr(),
        snd_max: iss.incr(),
        snd_wl1: crate::seq::SeqNum(0),
        snd_wl2: crate::seq::SeqNum(0),
        snd_cwnd,
        t_maxseg,
        t_advmss: advmss,
        rcv_nxt: ack,
        rcv_wnd,
        rcv_adv: ack + rcv_wnd,
        rcv_scale,
        snd_scale,
        request_r_scale,
        tf_doing_ws,
        tf_rxwin0sent: rcv_wnd == 0,
        last_ack_sent: ack,
        tt_rexmt: Some(Timers::timer(now, TimerKind::Rexmt, 0, &engine.cfg.tcp_backoff)),
        tt_conn_est: None,
        tt_delack: None,
        t_idletime: now,
        t_rttseg: Some((now, iss)),
        t_rttinf: RttInfo::default(),
        t_softerror: None,
    };

    let reply = make_syn_ack(&cb, &id);

    engine.connections.insert(
        id,
        ConnState {
            cb,
            tcp_state: TcpState::SynReceived,
            rcvbufsize,
            sndbufsize,
            cantrcvmore: false,
        },
    );

    debug!(?id, "handle_noconn: passive open -> SynReceived");
    (engine, Some(reply))
}
