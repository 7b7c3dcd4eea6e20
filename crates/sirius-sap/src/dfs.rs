//! Non-occupancy list (NOL) for the DFS channels of the current domain.
//!
//! Entry lifecycle: `Usable`/`Available` --radar--> `Unavailable`, and back
//! to `Available` once the non-occupancy period has elapsed. Expiry is lazy:
//! entries flip when they are next queried.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::channel::{bonded_channels, BondingState};
use crate::error::{Result, SapError};
use crate::regulatory::{RegulatoryDomain, MAX_DFS_CHANNELS};

/// Standard channel availability check
pub const DEFAULT_CAC: Duration = Duration::from_secs(60);
/// ETSI weather radar channels (120/124/128)
pub const DEFAULT_WEATHER_CAC: Duration = Duration::from_secs(600);
/// Non-occupancy period after radar
pub const DEFAULT_NON_OCCUPANCY: Duration = Duration::from_secs(30 * 60);
/// Non-occupancy period on ETSI weather radar channels
pub const DEFAULT_WEATHER_NON_OCCUPANCY: Duration = Duration::from_secs(60 * 60);

/// CAC and non-occupancy periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfsTiming {
    pub cac: Duration,
    pub weather_cac: Duration,
    pub non_occupancy: Duration,
    pub weather_non_occupancy: Duration,
}

impl Default for DfsTiming {
    fn default() -> Self {
        Self {
            cac: DEFAULT_CAC,
            weather_cac: DEFAULT_WEATHER_CAC,
            non_occupancy: DEFAULT_NON_OCCUPANCY,
            weather_non_occupancy: DEFAULT_WEATHER_NON_OCCUPANCY,
        }
    }
}

/// Availability of one DFS channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NolState {
    /// Never hit by radar since the table was built
    Usable,
    /// Hit by radar, non-occupancy period over
    Available,
    /// In the non-occupancy period
    Unavailable { radar_found_at: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NolEntry {
    pub channel: u8,
    pub state: NolState,
}

impl NolEntry {
    pub fn radar_found_at(&self) -> Option<Instant> {
        match self.state {
            NolState::Unavailable { radar_found_at } => Some(radar_found_at),
            _ => None,
        }
    }
}

/// Exported NOL state, as carried in NOL get/set notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NolRecordState {
    Usable,
    Available,
    Unavailable,
}

/// One exported NOL entry. Radar time is relative so the record survives
/// a process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NolRecord {
    pub channel: u8,
    pub state: NolRecordState,
    /// Milliseconds since radar was found, for `Unavailable` entries
    pub radar_age_ms: Option<u64>,
}

/// NOL table plus the timing rules for the current domain
#[derive(Debug, Clone)]
pub struct DfsTracker {
    timing: DfsTiming,
    entries: Vec<NolEntry>,
    weather: Vec<u8>,
}

impl DfsTracker {
    pub fn new(timing: DfsTiming) -> Self {
        Self {
            timing,
            entries: Vec::new(),
            weather: Vec::new(),
        }
    }

    pub fn timing(&self) -> &DfsTiming {
        &self.timing
    }

    /// (Re)build the table for every DFS channel of `domain`, all `Usable`.
    pub fn init_nol(&mut self, domain: &RegulatoryDomain) -> Result<()> {
        let dfs = domain.dfs_channels();
        if dfs.len() > MAX_DFS_CHANNELS {
            return Err(SapError::TableOverflow {
                table: "NOL table",
                count: dfs.len(),
                max: MAX_DFS_CHANNELS,
            });
        }

        self.weather = dfs
            .iter()
            .copied()
            .filter(|c| domain.is_weather_channel(*c))
            .collect();
        self.entries = dfs
            .into_iter()
            .map(|channel| NolEntry {
                channel,
                state: NolState::Usable,
            })
            .collect();

        debug!(
            target: "dfs",
            country = domain.country(),
            region = %domain.region(),
            "NOL initialised with {} DFS channels",
            self.entries.len()
        );
        Ok(())
    }

    /// Apply externally stored state. Records for channels outside the
    /// table are skipped; returns how many were applied.
    pub fn seed(&mut self, records: &[NolRecord], now: Instant) -> usize {
        let mut applied = 0;
        for record in records {
            let Some(entry) = self.entries.iter_mut().find(|e| e.channel == record.channel) else {
                debug!(target: "dfs", channel = record.channel, "stored NOL record for unknown channel");
                continue;
            };
            entry.state = match record.state {
                NolRecordState::Usable => NolState::Usable,
                NolRecordState::Available => NolState::Available,
                NolRecordState::Unavailable => {
                    let age = Duration::from_millis(record.radar_age_ms.unwrap_or(0));
                    NolState::Unavailable {
                        radar_found_at: now.checked_sub(age).unwrap_or(now),
                    }
                }
            };
            applied += 1;
        }
        applied
    }

    /// Mark channels as hit by radar at `now`.
    ///
    /// Already unavailable channels keep their original timestamp. Returns
    /// the channels whose state actually changed.
    pub fn mark_unavailable(&mut self, channels: &[u8], now: Instant) -> Vec<u8> {
        let mut marked = Vec::new();
        for &channel in channels {
            let Some(entry) = self.entries.iter_mut().find(|e| e.channel == channel) else {
                warn!(target: "dfs", channel, "radar reported on a non-DFS channel");
                continue;
            };
            if matches!(entry.state, NolState::Unavailable { .. }) {
                continue;
            }
            entry.state = NolState::Unavailable { radar_found_at: now };
            marked.push(channel);
        }
        if !marked.is_empty() {
            info!(target: "dfs", channels = ?marked, "channels added to NOL");
        }
        marked
    }

    /// Non-occupancy period that applies to `channel`
    pub fn non_occupancy_period(&self, channel: u8) -> Duration {
        if self.weather.contains(&channel) {
            self.timing.weather_non_occupancy
        } else {
            self.timing.non_occupancy
        }
    }

    /// CAC duration for a set of sub-channels: the weather period if any
    /// of them is a weather channel.
    pub fn cac_duration(&self, channels: &[u8]) -> Duration {
        if channels.iter().any(|c| self.weather.contains(c)) {
            self.timing.weather_cac
        } else {
            self.timing.cac
        }
    }

    pub fn is_dfs(&self, channel: u8) -> bool {
        self.entries.iter().any(|e| e.channel == channel)
    }

    /// Flip an expired entry to `Available`; true if the entry is usable.
    fn refresh(entry: &mut NolEntry, nop: Duration, now: Instant) -> bool {
        match entry.state {
            NolState::Unavailable { radar_found_at } => {
                if now.saturating_duration_since(radar_found_at) >= nop {
                    info!(target: "dfs", channel = entry.channel, "non-occupancy period over");
                    entry.state = NolState::Available;
                    true
                } else {
                    false
                }
            }
            NolState::Usable | NolState::Available => true,
        }
    }

    /// True only if every sub-channel of `channel` under `bonding` is free.
    /// Channels without an entry (non-DFS) are always free.
    pub fn is_available(&mut self, channel: u8, bonding: BondingState, now: Instant) -> bool {
        let subs = bonded_channels(channel, bonding);
        let mut available = true;
        for sub in subs {
            let nop = self.non_occupancy_period(sub);
            if let Some(entry) = self.entries.iter_mut().find(|e| e.channel == sub) {
                available &= Self::refresh(entry, nop, now);
            }
        }
        available
    }

    /// Channels currently in their non-occupancy period
    pub fn unavailable_channels(&mut self, now: Instant) -> Vec<u8> {
        let mut out = Vec::new();
        for i in 0..self.entries.len() {
            let nop = self.non_occupancy_period(self.entries[i].channel);
            if !Self::refresh(&mut self.entries[i], nop, now) {
                out.push(self.entries[i].channel);
            }
        }
        out
    }

    pub fn entries(&self) -> &[NolEntry] {
        &self.entries
    }

    pub fn entry(&self, channel: u8) -> Option<&NolEntry> {
        self.entries.iter().find(|e| e.channel == channel)
    }

    /// Export the table for a NOL-set notification
    pub fn records(&self, now: Instant) -> Vec<NolRecord> {
        self.entries
            .iter()
            .map(|e| match e.state {
                NolState::Usable => NolRecord {
                    channel: e.channel,
                    state: NolRecordState::Usable,
                    radar_age_ms: None,
                },
                NolState::Available => NolRecord {
                    channel: e.channel,
                    state: NolRecordState::Available,
                    radar_age_ms: None,
                },
                NolState::Unavailable { radar_found_at } => NolRecord {
                    channel: e.channel,
                    state: NolRecordState::Unavailable,
                    radar_age_ms: Some(now.saturating_duration_since(radar_found_at).as_millis() as u64),
                },
            })
            .collect()
    }

    /// Forget all radar history
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.state = NolState::Usable;
        }
    }
}

impl Default for DfsTracker {
    fn default() -> Self {
        Self::new(DfsTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(country: &str) -> DfsTracker {
        let mut t = DfsTracker::default();
        t.init_nol(&RegulatoryDomain::for_country(country).unwrap()).unwrap();
        t
    }

    #[test]
    fn test_init_nol() {
        let t = tracker("US");
        assert_eq!(t.entries().len(), 16);
        assert!(t.entries().iter().all(|e| e.state == NolState::Usable));
        assert!(t.is_dfs(100));
        assert!(!t.is_dfs(36));
    }

    #[test]
    fn test_nop_boundary() {
        let mut t = tracker("US");
        let t0 = Instant::now();
        t.mark_unavailable(&[52], t0);

        let just_before = t0 + DEFAULT_NON_OCCUPANCY - Duration::from_millis(1);
        assert!(!t.is_available(52, BondingState::None, just_before));
        assert!(t.entry(52).unwrap().radar_found_at().is_some());

        assert!(t.is_available(52, BondingState::None, t0 + DEFAULT_NON_OCCUPANCY));
        assert_eq!(t.entry(52).unwrap().state, NolState::Available);
    }

    #[test]
    fn test_weather_nop_is_longer() {
        let mut t = tracker("DE");
        let t0 = Instant::now();
        t.mark_unavailable(&[120, 100], t0);

        let after_std = t0 + DEFAULT_NON_OCCUPANCY;
        assert!(t.is_available(100, BondingState::None, after_std));
        assert!(!t.is_available(120, BondingState::None, after_std));
        assert!(t.is_available(120, BondingState::None, t0 + DEFAULT_WEATHER_NON_OCCUPANCY));

        assert_eq!(t.cac_duration(&[116, 120]), DEFAULT_WEATHER_CAC);
        assert_eq!(t.cac_duration(&[100, 104]), DEFAULT_CAC);
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut t = tracker("US");
        let t0 = Instant::now();
        assert_eq!(t.mark_unavailable(&[56], t0), vec![56]);
        assert!(t.mark_unavailable(&[56], t0 + Duration::from_secs(300)).is_empty());
        assert_eq!(t.entry(56).unwrap().radar_found_at(), Some(t0));
    }

    #[test]
    fn test_bonded_availability() {
        let mut t = tracker("US");
        let now = Instant::now();
        t.mark_unavailable(&[60], now);
        assert!(!t.is_available(52, BondingState::Vht80LowLow, now));
        assert!(t.is_available(52, BondingState::Ht40Lower, now));
        // Non-DFS channels have no entry
        assert!(t.is_available(36, BondingState::Vht80LowLow, now));
        assert_eq!(t.unavailable_channels(now), vec![60]);
    }

    #[test]
    fn test_records_round_trip_through_seed() {
        let mut t = tracker("US");
        let t0 = Instant::now();
        t.mark_unavailable(&[100], t0);
        let later = t0 + Duration::from_secs(600);
        let records = t.records(later);
        let rec = records.iter().find(|r| r.channel == 100).unwrap();
        assert_eq!(rec.state, NolRecordState::Unavailable);
        assert_eq!(rec.radar_age_ms, Some(600_000));

        let mut fresh = tracker("US");
        assert_eq!(fresh.seed(&records, later), records.len());
        // 20 more minutes clears it in the seeded table too
        assert!(!fresh.is_available(100, BondingState::None, later + Duration::from_secs(1199)));
        assert!(fresh.is_available(100, BondingState::None, later + Duration::from_secs(1200)));
    }

    #[test]
    fn test_reset() {
        let mut t = tracker("US");
        t.mark_unavailable(&[52, 56], Instant::now());
        t.reset();
        assert!(t.unavailable_channels(Instant::now()).is_empty());
    }
}
