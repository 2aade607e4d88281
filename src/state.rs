//! Connection identity, the per-connection wrapper around `ControlBlock`,
//! and the top-level engine state `t` (listeners, connections, rng).

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use crate::cb::ControlBlock;
use crate::cfg::EngineConfig;
use crate::rng::IssSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId {
    pub local_ip: Ipv4Addr,
    pub local_port: u16,
    pub remote_ip: Ipv4Addr,
    pub remote_port: u16,
}

impl ConnectionId {
    pub fn new(local_ip: Ipv4Addr, local_port: u16, remote_ip: Ipv4Addr, remote_port: u16) -> Self {
        ConnectionId {
            local_ip,
            local_port,
            remote_ip,
            remote_port,
        }
    }
}

/// FSM states this engine represents as an explicit enum. `Listen` is
/// membership in `Engine::listeners`, not a variant, and `Closed` is the
/// absence of a connection-map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpState {
    SynSent,
    SynReceived,
    Established,
    CloseWait,
    FinWait1,
    FinWait2,
    Closing,
    LastAck,
    TimeWait,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnState {
    pub cb: ControlBlock,
    pub tcp_state: TcpState,
    pub rcvbufsize: u32,
    pub sndbufsize: u32,
    pub cantrcvmore: bool,
}

/// Top-level engine state: listener port set, connection map, and the
/// ISS-drawing capability. Exclusive owner of the connection map --
/// handlers consume an `Engine` and return a new one rather than mutating
/// through a shared reference.
#[derive(Debug)]
pub struct Engine {
    pub listeners: HashSet<u16>,
    pub connections: HashMap<ConnectionId, ConnState>,
    pub rng: Box<dyn IssSource + Send>,
    pub cfg: EngineConfig,
}

impl Engine {
    pub fn new(cfg: EngineConfig, rng: Box<dyn IssSource + Send>) -> Self {
        Engine {
            listeners: HashSet::new(),
            connections: HashMap::new(),
            rng,
            cfg,
        }
    }

    pub fn listen(&mut self, port: u16) {
        self.listeners.insert(port);
    }

    pub fn unlisten(&mut self, port: u16) {
        self.listeners.remove(&port);
    }
}
