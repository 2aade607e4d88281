//! Segment decode/encode and checksum validation. The only module that
//! touches wire bytes directly; everything downstream works on `Segment`
//! values. Ground: `Ipv4HeaderSlice`/`TcpHeaderSlice` parsing inline in
//! `maminrayej-handshake`'s `segment_loop`, and the header construction in
//! `tcp/ioutil.rs`'s `generate_reset`/`generate_synack`.

use std::net::Ipv4Addr;

use etherparse::{Ipv4Header, Ipv4HeaderSlice, TcpHeader, TcpHeaderSlice, TcpOptionElement};

use crate::error::EngineError;
use crate::flags::FlagSet;
use crate::segment::Segment;
use crate::seq::SeqNum;
use crate::state::ConnectionId;

/// Parse an IPv4+TCP datagram into a `Segment` plus the `ConnectionId` it
/// belongs to. Rejects bad checksums and martian (multicast/broadcast)
/// addresses; option parsing is limited to MSS and window scale.
pub fn decode_and_validate(
    local_ip: Ipv4Addr,
    bytes: &[u8],
) -> Result<(Segment, ConnectionId), EngineError> {
    let ip4h = Ipv4HeaderSlice::from_slice(bytes)
        .map_err(|e| EngineError::Malformed(e.to_string()))?;

    if ip4h.destination_addr() != local_ip {
        return Err(EngineError::Martian);
    }
    if ip4h.destination_addr().is_multicast() || ip4h.destination_addr().is_broadcast() {
        return Err(EngineError::Martian);
    }

    let ihl = (ip4h.ihl() * 4) as usize;
    let tcph = TcpHeaderSlice::from_slice(&bytes[ihl..])
        .map_err(|e| EngineError::Malformed(e.to_string()))?;

    let data_start = ihl + (tcph.data_offset() as usize * 4);
    let payload = bytes[data_start..].to_vec();

    // Re-derive the expected checksum rather than trust the wire value,
    // same check `generate_reset`/`generate_synack` rely on producing.
    let owned_tcph = tcph.to_header();
    let expected = owned_tcph
        .calc_checksum_ipv4(&ip4h.to_header(), &payload)
        .map_err(|e| EngineError::Malformed(e.to_string()))?;
    if expected != tcph.checksum() {
        return Err(EngineError::BadChecksum);
    }

    let mut mss = None;
    let mut ws = None;
    for opt in tcph.options_iterator().flatten() {
        match opt {
            TcpOptionElement::MaximumSegmentSize(v) => mss = Some(v),
            TcpOptionElement::WindowScale(v) => ws = Some(v),
            _ => {}
        }
    }

    let mut flags = FlagSet::empty();
    if tcph.syn() {
        flags |= FlagSet::SYN;
    }
    if tcph.ack() {
        flags |= FlagSet::ACK;
    }
    if tcph.fin() {
        flags |= FlagSet::FIN;
    }
    if tcph.psh() {
        flags |= FlagSet::PSH;
    }
    if tcph.rst() {
        flags |= FlagSet::RST;
    }
    if tcph.urg() {
        flags |= FlagSet::URG;
    }

    let seg = Segment {
        seq: SeqNum(tcph.sequence_number()),
        ack: SeqNum(tcph.acknowledgment_number()),
        window: tcph.window_size(),
        flags,
        payload,
        src_port: tcph.source_port(),
        dst_port: tcph.destination_port(),
        mss,
        ws,
    };

    let id = ConnectionId::new(
        ip4h.destination_addr(),
        tcph.destination_port(),
        ip4h.source_addr(),
        tcph.source_port(),
    );

    Ok((seg, id))
}

/// Inverse of `decode_and_validate`: serialize a reply `Segment` addressed
/// from `local_ip` to `remote_ip`, with a correct IPv4/TCP checksum.
pub fn encode_and_checksum(local_ip: Ipv4Addr, remote_ip: Ipv4Addr, seg: &Segment) -> Vec<u8> {
    let mut tcph = TcpHeader::new(seg.src_port, seg.dst_port, seg.seq.0, seg.window);
    tcph.acknowledgment_number = seg.ack.0;
    tcph.syn = seg.flags.mem(FlagSet::SYN);
    tcph.ack = seg.flags.mem(FlagSet::ACK);
    tcph.fin = seg.flags.mem(FlagSet::FIN);
    tcph.psh = seg.flags.mem(FlagSet::PSH);
    tcph.rst = seg.flags.mem(FlagSet::RST);
    tcph.urg = seg.flags.mem(FlagSet::URG);

    let ip4h = Ipv4Header::new(
        tcph.header_len() + seg.payload.len() as u16,
        64,
        etherparse::IpNumber::TCP,
        local_ip.octets(),
        remote_ip.octets(),
    );

    tcph.checksum = tcph
        .calc_checksum_ipv4(&ip4h, &seg.payload)
        .expect("payload within checksum size limits");

    let mut out = Vec::with_capacity(ip4h.header_len() + tcph.header_len() as usize + seg.payload.len());
    ip4h.write(&mut out).expect("fixed-size IPv4 header write never fails");
    tcph.write(&mut out).expect("fixed-size TCP header write never fails");
    out.extend_from_slice(&seg.payload);
    out
}
