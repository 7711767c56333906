//! Error taxonomy for map access, record decoding, and slot lookup.

use std::path::PathBuf;

use thiserror::Error;

use crate::action::XdpAction;

type Source = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StatsError {
    /// The pinned map could not be opened, or is not usable as a per-CPU
    /// array of stats records. Raised before any terminal state is entered.
    #[error("cannot open pinned stats map at {path}")]
    OpenMap {
        path: PathBuf,
        #[source]
        source: Source,
    },

    /// A per-slot lookup failed mid-collection.
    #[error("failed to read counters for {action}")]
    ReadSlot {
        action: XdpAction,
        #[source]
        source: Source,
    },

    /// A per-CPU record did not have the expected 16-byte layout.
    #[error("counter record for {action} is {len} bytes, expected 16")]
    Decode { action: XdpAction, len: usize },

    /// A slot index outside the fixed 0..=4 domain. This is a bug in the
    /// caller, not a runtime condition to recover from.
    #[error("{0} is not a valid XDP action index (expected 0..=4)")]
    InvalidAction(u32),
}
