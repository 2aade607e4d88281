//! Demo: actively open a connection to `server` over the same UDP loopback
//! transport, driving the engine by hand since active-open seeding is an
//! external lifecycle event, not something the core does.

use std::net::{Ipv4Addr, UdpSocket};
use std::str::FromStr;

use tcp_engine::cfg::EngineConfig;
use tcp_engine::rng::{IssSource, OsIssSource};
use tcp_engine::runtime::Runtime;
use tcp_engine::wire::encode_and_checksum;
use tcp_engine::{ConnectionId, Engine, Event};

fn main() {
    tracing_subscriber::fmt::init();

    let local_ip = Ipv4Addr::from_str("10.10.10.11").unwrap();
    let remote_ip = Ipv4Addr::from_str("10.10.10.10").unwrap();
    let local_port = 34343;
    let remote_port = 9090;

    let sock = UdpSocket::bind("127.0.0.1:0").expect("bind demo transport socket");
    sock.connect("127.0.0.1:9090").expect("connect demo transport socket");

    let mut iss_source = OsIssSource::new();
    let iss = iss_source.next_u32();

    let rt = Runtime::new(Engine::new(EngineConfig::default(), Box::new(iss_source)));
    let id = ConnectionId::new(local_ip, local_port, remote_ip, remote_port);

    let syn = rt.connect(0, id, iss);
    let syn_bytes = encode_and_checksum(local_ip, remote_ip, &syn);

    println!(">>> Sending SYN, iss={iss}");
    sock.send(&syn_bytes).expect("send SYN over demo transport socket");

    let mut buf = [0u8; 1500];
    let n = sock.recv(&mut buf).expect("recv reply over demo transport socket");
    let events = rt.deliver(1, local_ip, &buf[..n]);

    for event in events {
        let Event::Data(_dst, bytes) = event;
        sock.send(&bytes).expect("send final ACK over demo transport socket");
    }

    println!(">>> Handshake complete");
}
