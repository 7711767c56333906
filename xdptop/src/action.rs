//! The fixed set of XDP verdicts the stats map is keyed by.

use std::fmt;

use crate::error::StatsError;

/// One of the five verdicts an XDP program can return for a packet. The map
/// slot layout is fixed by the kernel-side program, so the set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum XdpAction {
    Aborted = 0,
    Drop = 1,
    Pass = 2,
    Tx = 3,
    Redirect = 4,
}

impl XdpAction {
    /// Number of slots in the stats map.
    pub const COUNT: usize = 5;

    /// All actions in slot order.
    pub const ALL: [XdpAction; Self::COUNT] = [
        XdpAction::Aborted,
        XdpAction::Drop,
        XdpAction::Pass,
        XdpAction::Tx,
        XdpAction::Redirect,
    ];

    /// Map slot key for this action.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Looks up the action for a raw slot index, erroring on anything
    /// outside 0..=4 instead of panicking.
    pub fn from_index(index: u32) -> Result<Self, StatsError> {
        match index {
            0 => Ok(XdpAction::Aborted),
            1 => Ok(XdpAction::Drop),
            2 => Ok(XdpAction::Pass),
            3 => Ok(XdpAction::Tx),
            4 => Ok(XdpAction::Redirect),
            other => Err(StatsError::InvalidAction(other)),
        }
    }

    /// Display name as reported by the kernel-side program.
    pub fn name(self) -> &'static str {
        match self {
            XdpAction::Aborted => "XDP_ABORT",
            XdpAction::Drop => "XDP_DROP",
            XdpAction::Pass => "XDP_PASS",
            XdpAction::Tx => "XDP_TX",
            XdpAction::Redirect => "XDP_REDIRECT",
        }
    }
}

impl fmt::Display for XdpAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
