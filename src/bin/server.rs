//! Demo: listen on a port and print every reply the engine produces for
//! inbound segments arriving over a UDP loopback transport (standing in for
//! a real NIC/TUN device, which is out of scope for this engine).

use std::net::{Ipv4Addr, UdpSocket};
use std::str::FromStr;

use tcp_engine::cfg::EngineConfig;
use tcp_engine::rng::OsIssSource;
use tcp_engine::runtime::Runtime;
use tcp_engine::{Engine, Event};

fn main() {
    tracing_subscriber::fmt::init();

    let local_ip = Ipv4Addr::from_str("10.10.10.10").unwrap();
    let sock = UdpSocket::bind("127.0.0.1:9090").expect("bind demo transport socket");

    let rt = Runtime::new(Engine::new(EngineConfig::default(), Box::new(OsIssSource::new())));
    rt.listen(9090);

    println!(">>> Listening on {}:9090", local_ip);

    let mut tick: u64 = 0;
    let mut buf = [0u8; 1500];
    loop {
        let (n, from) = sock.recv_from(&mut buf).expect("recv from demo transport socket");
        tick += 1;

        let events = rt.deliver(tick, local_ip, &buf[..n]);
        for event in events {
            let Event::Data(_dst, bytes) = event;
            sock.send_to(&bytes, from).expect("send reply over demo transport socket");
        }
    }
}
