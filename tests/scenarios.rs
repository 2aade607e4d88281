//! End-to-end coverage of the engine driven only through its public
//! `handle` entry point and wire encoding -- no handler internals.

use std::net::Ipv4Addr;

use tcp_engine::cb::ControlBlock;
use tcp_engine::cfg::EngineConfig;
use tcp_engine::flags::FlagSet;
use tcp_engine::rng::CountingIssSource;
use tcp_engine::rtt::RttInfo;
use tcp_engine::segment::Segment;
use tcp_engine::seq::SeqNum;
use tcp_engine::wire::encode_and_checksum;
use tcp_engine::{handle, ConnState, ConnectionId, Engine, Event, TcpState};

const LOCAL: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const REMOTE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

fn bare_engine() -> Engine {
    Engine::new(EngineConfig::default(), Box::new(CountingIssSource::new(9000, 1)))
}

fn bytes(seg: &Segment) -> Vec<u8> {
    encode_and_checksum(REMOTE, LOCAL, seg)
}

fn id(local_port: u16, remote_port: u16) -> ConnectionId {
    ConnectionId::new(LOCAL, local_port, REMOTE, remote_port)
}

fn only_reply(events: Vec<Event>) -> Option<Segment> {
    assert!(events.len() <= 1);
    events.into_iter().next().map(|Event::Data(_, bytes)| {
        tcp_engine::wire::decode_and_validate(REMOTE, &bytes).unwrap().0
    })
}

#[test]
fn passive_open_creates_syn_received() {
    let mut engine = bare_engine();
    engine.listen(80);

    let syn = Segment {
        seq: SeqNum(1000),
        ack: SeqNum(0),
        window: 8192,
        flags: FlagSet::SYN,
        payload: vec![],
        src_port: 4000,
        dst_port: 80,
        mss: None,
        ws: None,
    };

    let (engine, events) = handle(engine, 0, LOCAL, &bytes(&syn));
    let conn = engine.connections.get(&id(80, 4000)).unwrap();
    assert_eq!(conn.tcp_state, TcpState::SynReceived);
    assert_eq!(conn.cb.irs, SeqNum(1000));
    assert_eq!(conn.cb.rcv_nxt, SeqNum(1001));

    let reply = only_reply(events).unwrap();
    assert!(reply.flags.mem(FlagSet::SYN) && reply.flags.mem(FlagSet::ACK));
    assert_eq!(reply.seq, conn.cb.iss);
    assert_eq!(reply.ack, SeqNum(1001));
}

#[test]
fn non_syn_to_listener_gets_reset() {
    let mut engine = bare_engine();
    engine.listen(80);

    let ack = Segment {
        seq: SeqNum(5),
        ack: SeqNum(9),
        window: 0,
        flags: FlagSet::ACK,
        payload: vec![],
        src_port: 4000,
        dst_port: 80,
        mss: None,
        ws: None,
    };

    let (engine, events) = handle(engine, 0, LOCAL, &bytes(&ack));
    assert!(engine.connections.is_empty());
    let reply = only_reply(events).unwrap();
    assert!(reply.flags.mem(FlagSet::RST));
}

fn syn_sent_cb(iss: u32) -> ControlBlock {
    ControlBlock {
        iss: SeqNum(iss),
        irs: SeqNum(0),
        snd_una: SeqNum(iss),
        snd_nxt: SeqNum(iss + 1),
        snd_max: SeqNum(iss + 1),
        snd_wl1: SeqNum(0),
        snd_wl2: SeqNum(0),
        snd_cwnd: 0,
        t_maxseg: 536,
        t_advmss: 536,
        rcv_nxt: SeqNum(0),
        rcv_wnd: 64240,
        rcv_adv: SeqNum(0),
        rcv_scale: 0,
        snd_scale: 0,
        request_r_scale: 0,
        tf_doing_ws: false,
        tf_rxwin0sent: false,
        last_ack_sent: SeqNum(0),
        tt_rexmt: None,
        tt_conn_est: None,
        tt_delack: None,
        t_idletime: 0,
        t_rttseg: Some((0, SeqNum(iss))),
        t_rttinf: RttInfo::default(),
        t_softerror: None,
    }
}

fn engine_with_syn_sent(iss: u32) -> Engine {
    let mut engine = bare_engine();
    engine.connections.insert(
        id(4000, 80),
        ConnState {
            cb: syn_sent_cb(iss),
            tcp_state: TcpState::SynSent,
            rcvbufsize: 64240,
            sndbufsize: 64240,
            cantrcvmore: false,
        },
    );
    engine
}

#[test]
fn active_open_completion() {
    let engine = engine_with_syn_sent(500);
    let synack = Segment {
        seq: SeqNum(2000),
        ack: SeqNum(501),
        window: 8192,
        flags: FlagSet::SYN | FlagSet::ACK,
        payload: vec![],
        src_port: 80,
        dst_port: 4000,
        mss: Some(1460),
        ws: None,
    };

    let (engine, events) = handle(engine, 10, LOCAL, &bytes(&synack));
    let conn = engine.connections.get(&id(4000, 80)).unwrap();
    assert_eq!(conn.tcp_state, TcpState::Established);
    assert_eq!(conn.cb.irs, SeqNum(2000));
    assert_eq!(conn.cb.rcv_nxt, SeqNum(2001));
    assert_eq!(conn.cb.snd_una, SeqNum(501));

    let reply = only_reply(events).unwrap();
    assert_eq!(reply.seq, SeqNum(501));
    assert_eq!(reply.ack, SeqNum(2001));
}

#[test]
fn bad_ack_in_syn_sent_drops() {
    let engine = engine_with_syn_sent(500);
    let synack = Segment {
        seq: SeqNum(2000),
        ack: SeqNum(999),
        window: 8192,
        flags: FlagSet::SYN | FlagSet::ACK,
        payload: vec![],
        src_port: 80,
        dst_port: 4000,
        mss: None,
        ws: None,
    };

    let (engine, events) = handle(engine, 10, LOCAL, &bytes(&synack));
    assert!(events.is_empty());
    assert_eq!(engine.connections.get(&id(4000, 80)).unwrap().tcp_state, TcpState::SynSent);
}

fn established_cb() -> ControlBlock {
    ControlBlock {
        iss: SeqNum(500),
        irs: SeqNum(2000),
        snd_una: SeqNum(501),
        snd_nxt: SeqNum(501),
        snd_max: SeqNum(501),
        snd_wl1: SeqNum(2000),
        snd_wl2: SeqNum(501),
        snd_cwnd: 0,
        t_maxseg: 536,
        t_advmss: 536,
        rcv_nxt: SeqNum(3000),
        rcv_wnd: 8192,
        rcv_adv: SeqNum(3000) + 8192,
        rcv_scale: 0,
        snd_scale: 0,
        request_r_scale: 0,
        tf_doing_ws: false,
        tf_rxwin0sent: false,
        last_ack_sent: SeqNum(3000),
        tt_rexmt: None,
        tt_conn_est: None,
        tt_delack: None,
        t_idletime: 0,
        t_rttseg: None,
        t_rttinf: RttInfo::default(),
        t_softerror: None,
    }
}

fn engine_established_with(rcv_wnd: u32) -> Engine {
    let mut engine = bare_engine();
    let mut cb = established_cb();
    cb.rcv_wnd = rcv_wnd;
    engine.connections.insert(
        id(80, 4000),
        ConnState {
            cb,
            tcp_state: TcpState::Established,
            rcvbufsize: rcv_wnd,
            sndbufsize: 8192,
            cantrcvmore: false,
        },
    );
    engine
}

#[test]
fn in_order_data_plus_fin_from_established() {
    let engine = engine_established_with(8192);
    let finseg = Segment {
        seq: SeqNum(3000),
        ack: SeqNum(501),
        window: 8192,
        flags: FlagSet::FIN | FlagSet::PSH | FlagSet::ACK,
        payload: vec![0u8; 10],
        src_port: 4000,
        dst_port: 80,
        mss: None,
        ws: None,
    };

    let (engine, events) = handle(engine, 0, LOCAL, &bytes(&finseg));
    let conn = engine.connections.get(&id(80, 4000)).unwrap();
    assert_eq!(conn.tcp_state, TcpState::CloseWait);
    assert_eq!(conn.cb.rcv_nxt, SeqNum(3011));
    assert!(conn.cantrcvmore);

    let reply = only_reply(events).unwrap();
    assert_eq!(reply.ack, SeqNum(3011));
    assert!(!reply.flags.mem(FlagSet::FIN));
}

#[test]
fn valid_rst_in_established_removes_connection() {
    let engine = engine_established_with(8192);
    let rst = Segment {
        seq: SeqNum(3000),
        ack: SeqNum(0),
        window: 0,
        flags: FlagSet::RST,
        payload: vec![],
        src_port: 4000,
        dst_port: 80,
        mss: None,
        ws: None,
    };

    let (engine, events) = handle(engine, 0, LOCAL, &bytes(&rst));
    assert!(engine.connections.get(&id(80, 4000)).is_none());
    // dropwithreset suppresses RST-for-RST -- no observable reply.
    assert!(events.is_empty());
}

#[test]
fn out_of_window_segment_drops() {
    let engine = engine_established_with(100);
    let seg = Segment {
        seq: SeqNum(9000),
        ack: SeqNum(501),
        window: 100,
        flags: FlagSet::ACK,
        payload: vec![0u8; 20],
        src_port: 4000,
        dst_port: 80,
        mss: None,
        ws: None,
    };

    let (engine, events) = handle(engine, 0, LOCAL, &bytes(&seg));
    assert!(events.is_empty());
    assert_eq!(engine.connections.get(&id(80, 4000)).unwrap().cb.rcv_nxt, SeqNum(3000));
}

#[test]
fn syn_in_established_window_gets_challenge_ack() {
    let engine = engine_established_with(8192);
    let seg = Segment {
        seq: SeqNum(3000),
        ack: SeqNum(501),
        window: 8192,
        flags: FlagSet::SYN,
        payload: vec![],
        src_port: 4000,
        dst_port: 80,
        mss: None,
        ws: None,
    };

    let (engine, events) = handle(engine, 0, LOCAL, &bytes(&seg));
    assert_eq!(engine.connections.get(&id(80, 4000)).unwrap().tcp_state, TcpState::Established);
    let reply = only_reply(events).unwrap();
    assert!(reply.flags.only(FlagSet::ACK));
}
