//! Automatic channel selection (ACS).
//!
//! Candidates are the domain's channels minus policy, NOL, range and
//! avoid-list exclusions. The leakage filter and bonding grouping then run
//! per width, stepping 80 -> 40 -> 20 MHz until some group survives.

use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::channel::{
    bonded_channels, vht80_block, BondingState, ChannelWidth, OperatingChannel, WifiBand,
    VHT80_BLOCK_STARTS,
};
use crate::dfs::DfsTracker;
use crate::leakage;
use crate::regulatory::{DfsRegion, RegulatoryDomain};

/// Per-session ACS settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcsConfig {
    pub start_channel: u8,
    pub end_channel: u8,
    /// Explicit channel list. Empty means every channel in the range.
    pub channel_list: Vec<u8>,
    pub prefer_non_dfs: bool,
}

impl Default for AcsConfig {
    fn default() -> Self {
        Self {
            start_channel: 1,
            end_channel: 165,
            channel_list: Vec::new(),
            prefer_non_dfs: false,
        }
    }
}

impl AcsConfig {
    pub fn range(start_channel: u8, end_channel: u8) -> Self {
        Self {
            start_channel,
            end_channel,
            ..Self::default()
        }
    }

    pub fn contains(&self, channel: u8) -> bool {
        (self.start_channel..=self.end_channel).contains(&channel)
            && (self.channel_list.is_empty() || self.channel_list.contains(&channel))
    }
}

/// Controller-wide selection policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// MKK only: exclude W53 (52-64)
    pub japan_w53_disabled: bool,
    /// MKK only: exclude indoor-only channels
    pub outdoor: bool,
    pub prefer_non_dfs: bool,
    /// Channels flagged by multi-channel concurrency avoidance
    pub avoid_channels: Vec<u8>,
}

/// Picks a channel for one session against the shared regulatory state
pub struct ChannelSelector<'a> {
    domain: &'a RegulatoryDomain,
    nol: &'a mut DfsTracker,
    policy: &'a SelectionPolicy,
}

impl<'a> ChannelSelector<'a> {
    pub fn new(
        domain: &'a RegulatoryDomain,
        nol: &'a mut DfsTracker,
        policy: &'a SelectionPolicy,
    ) -> Self {
        Self {
            domain,
            nol,
            policy,
        }
    }

    fn japan_excluded(&self, channel: u8) -> bool {
        if self.domain.region() != DfsRegion::Mkk {
            return false;
        }
        (self.policy.japan_w53_disabled && (52..=64).contains(&channel))
            || (self.policy.outdoor && self.domain.is_indoor_only(channel))
    }

    /// Channels passing every per-channel filter, in domain order.
    pub fn candidates(&mut self, acs: &AcsConfig, now: Instant) -> Vec<u8> {
        let mut out = Vec::new();
        for reg in self.domain.channels() {
            let ch = reg.channel;
            if self.japan_excluded(ch) {
                continue;
            }
            if !acs.contains(ch) || self.policy.avoid_channels.contains(&ch) {
                continue;
            }
            if !self.nol.is_available(ch, BondingState::None, now) {
                continue;
            }
            out.push(ch);
        }
        out
    }

    /// Run the full selection. `ceiling` is the widest width to try.
    ///
    /// The random index is a PRNG byte plus `tick`, modulo the pool size.
    /// `None` means every candidate was eliminated.
    pub fn select<R: Rng + ?Sized>(
        &mut self,
        acs: &AcsConfig,
        ceiling: ChannelWidth,
        rng: &mut R,
        tick: u64,
        now: Instant,
    ) -> Option<OperatingChannel> {
        let base = self.candidates(acs, now);
        if base.is_empty() {
            warn!(
                target: "acs",
                start = acs.start_channel,
                end = acs.end_channel,
                "no candidate channel in range"
            );
            return None;
        }
        let nol = self.nol.unavailable_channels(now);

        let mut width = ceiling;
        let available = loop {
            let mut working = base.clone();
            leakage::filter_candidates(width, &nol, &mut working);
            let grouped = group_by_bonding(&working, width);
            if !grouped.is_empty() {
                break grouped;
            }
            match width.downgrade() {
                Some(narrower) => {
                    debug!(
                        target: "acs",
                        "no {} MHz group available, falling back to {} MHz",
                        width.mhz(),
                        narrower.mhz()
                    );
                    width = narrower;
                }
                None => {
                    warn!(target: "acs", ?nol, "all candidate channels eliminated");
                    return None;
                }
            }
        };

        let non_dfs: Vec<u8> = available
            .iter()
            .copied()
            .filter(|c| !self.domain.is_dfs(*c))
            .collect();
        let prefer_non_dfs = acs.prefer_non_dfs || self.policy.prefer_non_dfs;
        let pool = if prefer_non_dfs && !non_dfs.is_empty() {
            &non_dfs
        } else {
            &available
        };

        let index = (u64::from(rng.gen::<u8>()).wrapping_add(tick) % pool.len() as u64) as usize;
        let selected = OperatingChannel::resolve(pool[index], width);
        info!(
            target: "acs",
            channel = selected.channel,
            width = selected.width.mhz(),
            center = selected.center(),
            pool = pool.len(),
            "channel selected"
        );
        Some(selected)
    }
}

/// Keep only channels whose whole bonding group is present.
///
/// 5 GHz groups are tracked in a bitmap with one nibble per 80 MHz block;
/// a 40 MHz group needs its half of the nibble, an 80 MHz group all of it.
pub fn group_by_bonding(candidates: &[u8], width: ChannelWidth) -> Vec<u8> {
    if width == ChannelWidth::Mhz20 {
        return candidates.to_vec();
    }

    let mut bitmap = [0u8; VHT80_BLOCK_STARTS.len()];
    for c in candidates {
        if let Some((block, pos)) = vht80_block(*c) {
            bitmap[block] |= 1 << pos;
        }
    }

    candidates
        .iter()
        .copied()
        .filter(|c| match (WifiBand::of(*c), vht80_block(*c)) {
            (WifiBand::Band5GHz, Some((block, pos))) => {
                let mask = match width {
                    ChannelWidth::Mhz80 => 0b1111,
                    _ if pos < 2 => 0b0011,
                    _ => 0b1100,
                };
                bitmap[block] & mask == mask
            }
            (WifiBand::Band2_4GHz, _) if width == ChannelWidth::Mhz40 => {
                match BondingState::for_channel(*c, width) {
                    Some(bonding) => bonded_channels(*c, bonding)
                        .iter()
                        .all(|sub| candidates.contains(sub)),
                    None => false,
                }
            }
            _ => false,
        })
        .collect()
}
