//! Snapshot collection and delta-based rate math over the counter table.

use std::time::Instant;

use crate::action::XdpAction;
use crate::error::StatsError;
use crate::map::{CounterPair, CounterSource};

/// Cross-CPU totals for one slot at one instant.
#[derive(Clone, Copy, Debug)]
pub struct SlotSnapshot {
    pub taken_at: Instant,
    pub total: CounterPair,
}

/// One sampling pass over all five slots. Produced whole or not at all; a
/// failure on any slot aborts the pass so callers never see a half-updated
/// snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot {
    pub slots: [SlotSnapshot; XdpAction::COUNT],
}

impl Snapshot {
    pub fn slot(&self, action: XdpAction) -> &SlotSnapshot {
        &self.slots[action.index() as usize]
    }
}

/// Reads every slot, summing the per-CPU records into one total per slot.
/// Timestamps are recorded immediately before each slot's read.
pub fn collect(source: &impl CounterSource) -> Result<Snapshot, StatsError> {
    let placeholder = SlotSnapshot {
        taken_at: Instant::now(),
        total: CounterPair::default(),
    };
    let mut slots = [placeholder; XdpAction::COUNT];
    for action in XdpAction::ALL {
        let taken_at = Instant::now();
        let per_cpu = source.read_per_cpu(action)?;
        let total = per_cpu
            .into_iter()
            .fold(CounterPair::default(), CounterPair::saturating_add);
        slots[action.index() as usize] = SlotSnapshot { taken_at, total };
    }
    Ok(Snapshot { slots })
}

/// Per-slot throughput derived from one (previous, current) snapshot pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateRecord {
    /// Cumulative totals at the current snapshot.
    pub total: CounterPair,
    pub packets_per_sec: f64,
    pub bits_per_sec: f64,
    pub period_secs: f64,
}

/// Computes rates for all slots. A non-positive period yields zero rates,
/// and a counter that went backwards (external program restarted) reads as
/// a zero delta rather than an unsigned underflow.
pub fn compute_rates(
    previous: &Snapshot,
    current: &Snapshot,
) -> [RateRecord; XdpAction::COUNT] {
    std::array::from_fn(|i| {
        let prev = &previous.slots[i];
        let curr = &current.slots[i];
        let period_secs = curr.taken_at.duration_since(prev.taken_at).as_secs_f64();
        let packet_delta = curr.total.packets.saturating_sub(prev.total.packets);
        let byte_delta = curr.total.bytes.saturating_sub(prev.total.bytes);
        let (packets_per_sec, bits_per_sec) = if period_secs > 0.0 {
            (
                packet_delta as f64 / period_secs,
                byte_delta as f64 * 8.0 / period_secs,
            )
        } else {
            (0.0, 0.0)
        };
        RateRecord {
            total: curr.total,
            packets_per_sec,
            bits_per_sec,
            period_secs,
        }
    })
}

/// Scales a bit rate for display: Kbit/s below 1000, Mbit/s from 1000 up.
pub fn format_bit_rate(bits_per_sec: f64) -> String {
    let kbps = bits_per_sec / 1000.0;
    if kbps < 1000.0 {
        format!("{kbps:6.0} Kbits/s")
    } else {
        format!("{:6.0} Mbits/s", kbps / 1000.0)
    }
}

/// Scales a cumulative byte total for display: KB below 1024 KB, MB from
/// there up, truncating rather than rounding.
pub fn format_total_bytes(bytes: u64) -> String {
    let kbs = bytes / 1024;
    if kbs < 1024 {
        format!("{kbs} KBs")
    } else {
        format!("{} MBs", kbs / 1024)
    }
}

/// Packet rate display, plain packets per second.
pub fn format_packet_rate(packets_per_sec: f64) -> String {
    format!("{packets_per_sec:10.0} pps")
}

/// Sampling period display, seconds with six decimals.
pub fn format_period(period_secs: f64) -> String {
    format!("{period_secs:.6}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct FixedSource {
        per_cpu: Vec<CounterPair>,
    }

    impl CounterSource for FixedSource {
        fn read_per_cpu(&self, _action: XdpAction) -> Result<Vec<CounterPair>, StatsError> {
            Ok(self.per_cpu.clone())
        }
    }

    fn snapshot_at(taken_at: Instant, packets: u64, bytes: u64) -> Snapshot {
        let slot = SlotSnapshot {
            taken_at,
            total: CounterPair { packets, bytes },
        };
        Snapshot {
            slots: [slot; XdpAction::COUNT],
        }
    }

    #[test]
    fn collect_sums_per_cpu_values_in_any_order() {
        let forward = FixedSource {
            per_cpu: vec![
                CounterPair {
                    packets: 2,
                    bytes: 20,
                },
                CounterPair {
                    packets: 3,
                    bytes: 30,
                },
            ],
        };
        let reversed = FixedSource {
            per_cpu: forward.per_cpu.iter().rev().copied().collect(),
        };

        let a = collect(&forward).unwrap();
        let b = collect(&reversed).unwrap();
        for action in XdpAction::ALL {
            let expected = CounterPair {
                packets: 5,
                bytes: 50,
            };
            assert_eq!(a.slot(action).total, expected);
            assert_eq!(b.slot(action).total, expected);
        }
    }

    #[test]
    fn rates_match_delta_over_period() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let prev = snapshot_at(t0, 100, 1000);
        let curr = snapshot_at(t1, 150, 2000);

        let rates = compute_rates(&prev, &curr);
        for rate in rates {
            assert!((rate.packets_per_sec - 50.0).abs() < 1e-9);
            assert!((rate.bits_per_sec - 8000.0).abs() < 1e-9);
            assert!((rate.period_secs - 1.0).abs() < 1e-9);
            assert_eq!(format_bit_rate(rate.bits_per_sec).trim_start(), "8 Kbits/s");
        }
    }

    #[test]
    fn fractional_period_scales_rates() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(500);
        let prev = snapshot_at(t0, 0, 0);
        let curr = snapshot_at(t1, 25, 500);

        let rates = compute_rates(&prev, &curr);
        assert!((rates[0].packets_per_sec - 50.0).abs() < 1e-6);
        assert!((rates[0].bits_per_sec - 8000.0).abs() < 1e-6);
    }

    #[test]
    fn counter_reset_reads_as_zero_rate() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let prev = snapshot_at(t0, 1_000_000, 9_000_000);
        let curr = snapshot_at(t1, 10, 100);

        let rates = compute_rates(&prev, &curr);
        for rate in rates {
            assert_eq!(rate.packets_per_sec, 0.0);
            assert_eq!(rate.bits_per_sec, 0.0);
            assert!(rate.packets_per_sec >= 0.0);
        }
    }

    #[test]
    fn zero_period_yields_zero_rates() {
        let t0 = Instant::now();
        let prev = snapshot_at(t0, 100, 1000);
        let curr = snapshot_at(t0, 200, 2000);

        let rates = compute_rates(&prev, &curr);
        for rate in rates {
            assert_eq!(rate.packets_per_sec, 0.0);
            assert_eq!(rate.bits_per_sec, 0.0);
            assert!(rate.packets_per_sec.is_finite());
            assert!(rate.bits_per_sec.is_finite());
        }
    }

    #[test]
    fn bit_rate_threshold_is_inclusive_at_one_thousand() {
        assert_eq!(format_bit_rate(999_000.0).trim_start(), "999 Kbits/s");
        assert_eq!(format_bit_rate(1_000_000.0).trim_start(), "1 Mbits/s");
    }

    #[test]
    fn byte_totals_truncate_to_unit_boundaries() {
        assert_eq!(format_total_bytes(1023), "0 KBs");
        assert_eq!(format_total_bytes(1024), "1 KBs");
        assert_eq!(format_total_bytes(1024 * 1024), "1 MBs");
        assert_eq!(format_total_bytes(2 * 1024 * 1024 - 1), "1 MBs");
    }
}
