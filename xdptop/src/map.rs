//! Read-only access to the pinned per-CPU stats map via aya.

use std::path::Path;

use aya::maps::{Map, MapData, MapInfo, MapType, PerCpuArray};

use crate::action::XdpAction;
use crate::error::StatsError;

/// Name the kernel-side program pins the stats map under.
pub const STATS_MAP_NAME: &str = "xdp_stats_map";

/// Default bpffs directory holding the pinned map.
pub const DEFAULT_PIN_DIR: &str = "/sys/fs/bpf";

/// Cumulative packet/byte counts for one slot as maintained by one CPU.
///
/// Wire layout is two little-endian u64s, packets first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterPair {
    pub packets: u64,
    pub bytes: u64,
}

impl CounterPair {
    /// Encoded size of one per-CPU record in the map value.
    pub const WIRE_LEN: usize = 16;

    /// Decodes one per-CPU record, rejecting anything that is not exactly
    /// [`Self::WIRE_LEN`] bytes.
    pub fn decode(action: XdpAction, buf: &[u8]) -> Result<Self, StatsError> {
        if buf.len() != Self::WIRE_LEN {
            return Err(StatsError::Decode {
                action,
                len: buf.len(),
            });
        }
        let mut packets = [0u8; 8];
        let mut bytes = [0u8; 8];
        packets.copy_from_slice(&buf[..8]);
        bytes.copy_from_slice(&buf[8..]);
        Ok(Self {
            packets: u64::from_le_bytes(packets),
            bytes: u64::from_le_bytes(bytes),
        })
    }

    /// Component-wise sum, saturating rather than wrapping on overflow.
    pub fn saturating_add(self, other: Self) -> Self {
        Self {
            packets: self.packets.saturating_add(other.packets),
            bytes: self.bytes.saturating_add(other.bytes),
        }
    }
}

/// Read-only view of the counter table: one decoded record per possible CPU
/// for a given slot. Implementations never mutate the table.
pub trait CounterSource {
    fn read_per_cpu(&self, action: XdpAction) -> Result<Vec<CounterPair>, StatsError>;
}

/// Map metadata captured at open time for the verbose startup banner.
#[derive(Clone, Debug)]
pub struct MapMetadata {
    pub map_type: String,
    pub id: u32,
    pub name: String,
    pub key_size: u32,
    pub value_size: u32,
    pub max_entries: u32,
}

type RawRecord = [u8; CounterPair::WIRE_LEN];

/// The externally-owned stats map, opened from its bpffs pin path.
pub struct PinnedStatsMap {
    counters: PerCpuArray<MapData, RawRecord>,
    metadata: MapMetadata,
}

impl PinnedStatsMap {
    /// Opens the pinned map and validates that it is a per-CPU array whose
    /// value layout matches [`CounterPair::WIRE_LEN`]. Any mismatch fails
    /// here, before the dashboard loop starts.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StatsError> {
        let path = path.as_ref();
        let open_err = |source: aya::maps::MapError| StatsError::OpenMap {
            path: path.to_path_buf(),
            source: source.into(),
        };

        let info = MapInfo::from_pin(path).map_err(open_err)?;
        let map_type = info.map_type().map_err(open_err)?;
        if !matches!(map_type, MapType::PerCpuArray) {
            return Err(StatsError::OpenMap {
                path: path.to_path_buf(),
                source: format!("expected a per-CPU array map, found {map_type:?}").into(),
            });
        }
        let metadata = MapMetadata {
            map_type: format!("{map_type:?}"),
            id: info.id(),
            name: info.name_as_str().unwrap_or_default().to_string(),
            key_size: info.key_size(),
            value_size: info.value_size(),
            max_entries: info.max_entries(),
        };

        let data = MapData::from_pin(path).map_err(open_err)?;
        let counters = PerCpuArray::try_from(Map::PerCpuArray(data)).map_err(open_err)?;

        Ok(Self { counters, metadata })
    }

    pub fn metadata(&self) -> &MapMetadata {
        &self.metadata
    }
}

impl CounterSource for PinnedStatsMap {
    fn read_per_cpu(&self, action: XdpAction) -> Result<Vec<CounterPair>, StatsError> {
        let values = self
            .counters
            .get(&action.index(), 0)
            .map_err(|source| StatsError::ReadSlot {
                action,
                source: source.into(),
            })?;
        values
            .iter()
            .map(|raw| CounterPair::decode(action, raw))
            .collect()
    }
}
