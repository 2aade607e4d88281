//! Per-connection control block: the mutable record every handler reads and
//! rewrites. Field names follow the BSD `tcpcb` naming convention used
//! throughout `maminrayej-handshake/src/tcp/tcb.rs` for its `snd`/`rcv`
//! spaces.

use crate::rtt::RttInfo;
use crate::seq::SeqNum;
use crate::timer::{Instant, Timer};

#[derive(Debug, Clone, PartialEq)]
pub struct ControlBlock {
    pub iss: SeqNum,
    pub irs: SeqNum,

    pub snd_una: SeqNum,
    pub snd_nxt: SeqNum,
    pub snd_max: SeqNum,
    pub snd_wl1: SeqNum,
    pub snd_wl2: SeqNum,

    pub snd_cwnd: u32,
    pub t_maxseg: u16,
    pub t_advmss: u16,

    pub rcv_nxt: SeqNum,
    pub rcv_wnd: u32,
    pub rcv_adv: SeqNum,

    pub rcv_scale: u8,
    pub snd_scale: u8,
    pub request_r_scale: u8,
    pub tf_doing_ws: bool,

    pub tf_rxwin0sent: bool,
    pub last_ack_sent: SeqNum,

    pub tt_rexmt: Option<Timer>,
    pub tt_conn_est: Option<Timer>,
    pub tt_delack: Option<Timer>,
    pub t_idletime: Instant,

    pub t_rttseg: Option<(Instant, SeqNum)>,
    pub t_rttinf: RttInfo,
    pub t_softerror: Option<&'static str>,
}

impl ControlBlock {
    /// `snd_una <= snd_nxt <= snd_max` (sequence-order, modular).
    pub fn send_sequence_ordered(&self) -> bool {
        self.snd_una.less_equal(self.snd_nxt) && self.snd_nxt.less_equal(self.snd_max)
    }

    /// `tf_rxwin0sent <=> (last advertised rcv_wnd == 0)`.
    pub fn rxwin0_flag_consistent(&self) -> bool {
        self.tf_rxwin0sent == (self.rcv_wnd == 0)
    }

    /// Advance the advertised right edge, keeping `rcv_adv >= rcv_nxt +
    /// rcv_wnd` and the `tf_rxwin0sent` flag in sync with it.
    pub fn advance_rcv_adv(&mut self) {
        let scaled = scale_window(self.rcv_wnd, self.rcv_scale);
        self.rcv_adv = self.rcv_adv.max(self.rcv_nxt + scaled);
        self.tf_rxwin0sent = self.rcv_wnd == 0;
    }
}

/// `min(rcv_wnd >> rcv_scale, tcp_maxwin) << rcv_scale`, the window-scale
/// clamp applied before advancing `rcv_adv`.
pub fn scale_window(rcv_wnd: u32, rcv_scale: u8) -> u32 {
    const TCP_MAXWIN: u32 = 65_535;
    let shifted = rcv_wnd >> rcv_scale;
    std::cmp::min(shifted, TCP_MAXWIN) << rcv_scale
}
