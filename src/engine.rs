//! Top-level `handle`: decode, look up the connection, route, and encode any
//! reply.

use std::net::Ipv4Addr;

use tracing::trace;

use crate::handler::noconn::handle_noconn;
use crate::handler::router::handle_conn;
use crate::state::Engine;
use crate::wire::{decode_and_validate, encode_and_checksum};

/// Outbound effect: a datagram addressed to `Ipv4Addr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Data(Ipv4Addr, Vec<u8>),
}

pub fn handle(mut engine: Engine, now: u64, local_ip: Ipv4Addr, bytes: &[u8]) -> (Engine, Vec<Event>) {
    let (seg, id) = match decode_and_validate(local_ip, bytes) {
        Ok(ok) => ok,
        Err(e) => {
            trace!(error = %e, "handle: dropping undecodable datagram");
            return (engine, Vec::new());
        }
    };

    let remote_ip = id.remote_ip;
    let (engine, reply) = if engine.connections.contains_key(&id) {
        handle_conn(engine, now, id, seg)
    } else {
        handle_noconn(engine, now, id, seg)
    };

    let events = match reply {
        Some(reply_seg) => {
            let bytes = encode_and_checksum(local_ip, remote_ip, &reply_seg);
            vec![Event::Data(remote_ip, bytes)]
        }
        None => Vec::new(),
    };

    (engine, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::EngineConfig;
    use crate::rng::CountingIssSource;
    use crate::wire::encode_and_checksum;
    use crate::flags::FlagSet;
    use crate::segment::Segment;
    use crate::seq::SeqNum;

    fn engine() -> Engine {
        let mut e = Engine::new(EngineConfig::default(), Box::new(CountingIssSource::new(9000, 1)));
        e.listen(80);
        e
    }

    #[test]
    fn passive_open_end_to_end_through_bytes() {
        let local = Ipv4Addr::new(10, 0, 0, 1);
        let remote = Ipv4Addr::new(10, 0, 0, 2);

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
        let bytes = encode_and_checksum(remote, local, &syn);

        let (engine, events) = handle(engine(), 0, local, &bytes);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Data(dst, _) => assert_eq!(*dst, remote),
        }
        assert_eq!(engine.connections.len(), 1);
    }

    #[test]
    fn undecodable_bytes_produce_no_events_and_no_state_change() {
        let local = Ipv4Addr::new(10, 0, 0, 1);
        let (engine, events) = handle(engine(), 0, local, &[0u8; 3]);
        assert!(events.is_empty());
        assert!(engine.connections.is_empty());
    }
}
