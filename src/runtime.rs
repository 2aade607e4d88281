//! Ambient caller-side wrapper serializing calls into [`engine::handle`] per
//! connection. Not part of the pure core -- demonstrates that whatever
//! drives the engine must serialize writes per `ConnectionId`. Ground:
//! `Manager`/`Arc<Mutex<Manager>>` in `maminrayej-handshake/src/lib.rs`,
//! minus the `Condvar`-based blocking socket API, which has no counterpart
//! in this pure-core rewrite.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use crate::cb::ControlBlock;
use crate::engine::{handle, Event};
use crate::flags::FlagSet;
use crate::rtt::RttInfo;
use crate::segment::Segment;
use crate::seq::SeqNum;
use crate::state::{ConnState, ConnectionId, Engine, TcpState};
use crate::timer::{Kind as TimerKind, Timers};

#[derive(Clone)]
pub struct Runtime {
    engine: Arc<Mutex<Engine>>,
}

impl Runtime {
    pub fn new(engine: Engine) -> Self {
        Runtime {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn listen(&self, port: u16) {
        self.engine.lock().unwrap().listen(port);
    }

    pub fn unlisten(&self, port: u16) {
        self.engine.lock().unwrap().unlisten(port);
    }

    /// Feed one inbound datagram through the engine and collect whatever
    /// reply datagrams it produces. `now` is supplied by the caller's clock
    /// -- this wrapper never reads the system clock itself.
    pub fn deliver(&self, now: u64, local_ip: Ipv4Addr, bytes: &[u8]) -> Vec<Event> {
        let mut guard = self.engine.lock().unwrap();
        let engine = std::mem::replace(&mut *guard, placeholder());
        let (engine, events) = handle(engine, now, local_ip, bytes);
        *guard = engine;
        events
    }

    /// Active open: the engine's core never drives this itself, since
    /// initiating a connection is an external lifecycle event, so the
    /// caller seeds a `Syn_sent` connection and gets back the initial SYN
    /// segment to send.
    pub fn connect(&self, now: u64, id: ConnectionId, iss: u32) -> Segment {
        let mut guard = self.engine.lock().unwrap();
        let cfg = guard.cfg.clone();

        let cb = ControlBlock {
            iss: SeqNum(iss),
            irs: SeqNum(0),
            snd_una: SeqNum(iss),
            snd_nxt: SeqNum(iss),
            snd_max: SeqNum(iss),
            snd_wl1: SeqNum(0),
            snd_wl2: SeqNum(0),
            snd_cwnd: 4 * crate::cfg::FALLBACK_MSS as u32,
            t_maxseg: crate::cfg::FALLBACK_MSS,
            t_advmss: crate::cfg::FALLBACK_MSS,
            rcv_nxt: SeqNum(0),
            rcv_wnd: cfg.so_rcvbuf,
            rcv_adv: SeqNum(0),
            rcv_scale: 0,
            snd_scale: 0,
            request_r_scale: cfg.scale,
            tf_doing_ws: false,
            tf_rxwin0sent: cfg.so_rcvbuf == 0,
            last_ack_sent: SeqNum(0),
            tt_rexmt: Some(Timers::timer(now, TimerKind::Rexmt, 0, &cfg.tcp_backoff)),
            tt_conn_est: None,
            tt_delack: None,
            t_idletime: now,
            t_rttseg: Some((now, SeqNum(iss))),
            t_rttinf: RttInfo::default(),
            t_softerror: None,
        };

        let syn = Segment {
            seq: SeqNum(iss),
            ack: SeqNum(0),
            window: cfg.so_rcvbuf as u16,
            flags: FlagSet::SYN,
            payload: vec![],
            src_port: id.local_port,
            dst_port: id.remote_port,
            mss: Some(crate::cfg::FALLBACK_MSS),
            ws: Some(cfg.scale),
        };

        guard.connections.insert(
            id,
            ConnState {
                cb,
                tcp_state: TcpState::SynSent,
                rcvbufsize: cfg.so_rcvbuf,
                sndbufsize: cfg.so_sndbuf,
                cantrcvmore: false,
            },
        );

        syn
    }
}

fn placeholder() -> Engine {
    Engine::new(crate::cfg::EngineConfig::default(), Box::new(crate::rng::OsIssSource::new()))
}
