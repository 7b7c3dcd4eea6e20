//! Channel numbers, widths and bonding arithmetic.
//!
//! Channel bonding is described by where the primary 20 MHz channel sits
//! inside its 40 or 80 MHz block. The expansion to sub-channels is plain
//! offset arithmetic on 5 GHz channel numbers (steps of 4).

use serde::{Deserialize, Serialize};

/// WiFi frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WifiBand {
    /// 2.4 GHz band (channels 1-14)
    Band2_4GHz,
    /// 5 GHz band (channels 36-165)
    Band5GHz,
}

impl WifiBand {
    pub fn of(channel: u8) -> Self {
        if channel <= 14 {
            WifiBand::Band2_4GHz
        } else {
            WifiBand::Band5GHz
        }
    }
}

/// Centre frequency of a 20 MHz channel in MHz
pub fn channel_to_frequency(channel: u8) -> u16 {
    match channel {
        1..=13 => 2407 + (channel as u16) * 5,
        14 => 2484,
        _ => 5000 + (channel as u16) * 5,
    }
}

/// First channel of each 80 MHz block in the 5 GHz band
pub const VHT80_BLOCK_STARTS: [u8; 6] = [36, 52, 100, 116, 132, 149];

/// Index into [`VHT80_BLOCK_STARTS`] and the position (0..4) of `channel` in it.
pub fn vht80_block(channel: u8) -> Option<(usize, u8)> {
    VHT80_BLOCK_STARTS.iter().enumerate().find_map(|(i, start)| {
        let offset = channel.checked_sub(*start)?;
        (offset % 4 == 0 && offset <= 12).then_some((i, offset / 4))
    })
}

/// Operating channel width
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChannelWidth {
    Mhz20,
    Mhz40,
    Mhz80,
}

impl ChannelWidth {
    /// Next step down the fallback ladder
    pub fn downgrade(self) -> Option<ChannelWidth> {
        match self {
            ChannelWidth::Mhz80 => Some(ChannelWidth::Mhz40),
            ChannelWidth::Mhz40 => Some(ChannelWidth::Mhz20),
            ChannelWidth::Mhz20 => None,
        }
    }

    pub fn mhz(self) -> u16 {
        match self {
            ChannelWidth::Mhz20 => 20,
            ChannelWidth::Mhz40 => 40,
            ChannelWidth::Mhz80 => 80,
        }
    }

    /// Number of 20 MHz sub-channels
    pub fn sub_channels(self) -> usize {
        match self {
            ChannelWidth::Mhz20 => 1,
            ChannelWidth::Mhz40 => 2,
            ChannelWidth::Mhz80 => 4,
        }
    }
}

/// Where the primary channel sits inside its bonded block.
///
/// For the 80 MHz variants the first word is the primary's position inside
/// its 40 MHz half, the second which half it is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondingState {
    /// 20 MHz, no bonding
    None,
    /// Primary is the lower channel: {ch, ch+4}
    Ht40Lower,
    /// Primary is the upper channel: {ch-4, ch}
    Ht40Upper,
    /// {ch, ch+4, ch+8, ch+12}
    Vht80LowLow,
    /// {ch-4, ch, ch+4, ch+8}
    Vht80HighLow,
    /// {ch-8, ch-4, ch, ch+4}
    Vht80LowHigh,
    /// {ch-12, ch-8, ch-4, ch}
    Vht80HighHigh,
}

impl BondingState {
    /// Bonding for `channel` at `width`, or `None` if the channel cannot
    /// bond at that width.
    pub fn for_channel(channel: u8, width: ChannelWidth) -> Option<BondingState> {
        match (width, WifiBand::of(channel)) {
            (ChannelWidth::Mhz20, _) => Some(BondingState::None),
            (ChannelWidth::Mhz40, WifiBand::Band2_4GHz) => {
                if (1..=7).contains(&channel) {
                    Some(BondingState::Ht40Lower)
                } else if (8..=13).contains(&channel) {
                    Some(BondingState::Ht40Upper)
                } else {
                    None
                }
            }
            (ChannelWidth::Mhz40, WifiBand::Band5GHz) => {
                let (_, pos) = vht80_block(channel)?;
                Some(if pos % 2 == 0 {
                    BondingState::Ht40Lower
                } else {
                    BondingState::Ht40Upper
                })
            }
            (ChannelWidth::Mhz80, WifiBand::Band2_4GHz) => None,
            (ChannelWidth::Mhz80, WifiBand::Band5GHz) => {
                let (_, pos) = vht80_block(channel)?;
                Some(match pos {
                    0 => BondingState::Vht80LowLow,
                    1 => BondingState::Vht80HighLow,
                    2 => BondingState::Vht80LowHigh,
                    _ => BondingState::Vht80HighHigh,
                })
            }
        }
    }

    pub fn width(self) -> ChannelWidth {
        match self {
            BondingState::None => ChannelWidth::Mhz20,
            BondingState::Ht40Lower | BondingState::Ht40Upper => ChannelWidth::Mhz40,
            _ => ChannelWidth::Mhz80,
        }
    }

    /// Offsets of every sub-channel relative to the primary
    fn offsets(self) -> &'static [i16] {
        match self {
            BondingState::None => &[0],
            BondingState::Ht40Lower => &[0, 4],
            BondingState::Ht40Upper => &[-4, 0],
            BondingState::Vht80LowLow => &[0, 4, 8, 12],
            BondingState::Vht80HighLow => &[-4, 0, 4, 8],
            BondingState::Vht80LowHigh => &[-8, -4, 0, 4],
            BondingState::Vht80HighHigh => &[-12, -8, -4, 0],
        }
    }
}

/// Every 20 MHz channel covered by `channel` under `bonding`, ascending.
/// Offsets that fall outside the channel number space are dropped.
pub fn bonded_channels(channel: u8, bonding: BondingState) -> Vec<u8> {
    bonding
        .offsets()
        .iter()
        .filter_map(|off| u8::try_from(channel as i16 + off).ok())
        .filter(|ch| *ch != 0)
        .collect()
}

/// Centre channel of the bonded block (segment 0)
pub fn center_channel(channel: u8, bonding: BondingState) -> u8 {
    let subs = bonded_channels(channel, bonding);
    match (subs.first(), subs.last()) {
        (Some(lo), Some(hi)) => lo + (hi - lo) / 2,
        _ => channel,
    }
}

/// Secondary 20 MHz channel for 40/80 MHz operation
pub fn secondary_channel(channel: u8, bonding: BondingState) -> Option<u8> {
    match bonding {
        BondingState::None => None,
        BondingState::Ht40Lower | BondingState::Vht80LowLow | BondingState::Vht80LowHigh => {
            Some(channel + 4)
        }
        _ => channel.checked_sub(4),
    }
}

/// Channel plus bonding, as programmed into the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatingChannel {
    pub channel: u8,
    pub width: ChannelWidth,
    pub bonding: BondingState,
}

impl OperatingChannel {
    /// Resolve the bonding for `channel`, stepping the width down until the
    /// channel can bond.
    pub fn resolve(channel: u8, width: ChannelWidth) -> OperatingChannel {
        let mut width = width;
        loop {
            if let Some(bonding) = BondingState::for_channel(channel, width) {
                return OperatingChannel {
                    channel,
                    width,
                    bonding,
                };
            }
            match width.downgrade() {
                Some(w) => width = w,
                None => {
                    return OperatingChannel {
                        channel,
                        width: ChannelWidth::Mhz20,
                        bonding: BondingState::None,
                    }
                }
            }
        }
    }

    pub fn sub_channels(&self) -> Vec<u8> {
        bonded_channels(self.channel, self.bonding)
    }

    pub fn center(&self) -> u8 {
        center_channel(self.channel, self.bonding)
    }

    pub fn frequency(&self) -> u16 {
        channel_to_frequency(self.channel)
    }

    pub fn overlaps(&self, channels: &[u8]) -> bool {
        self.sub_channels().iter().any(|c| channels.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequencies() {
        assert_eq!(channel_to_frequency(1), 2412);
        assert_eq!(channel_to_frequency(14), 2484);
        assert_eq!(channel_to_frequency(36), 5180);
        assert_eq!(channel_to_frequency(165), 5825);
    }

    #[test]
    fn test_bonding_expansion() {
        assert_eq!(bonded_channels(36, BondingState::None), vec![36]);
        assert_eq!(bonded_channels(36, BondingState::Ht40Lower), vec![36, 40]);
        assert_eq!(bonded_channels(40, BondingState::Ht40Upper), vec![36, 40]);
        assert_eq!(
            bonded_channels(36, BondingState::Vht80LowLow),
            vec![36, 40, 44, 48]
        );
        assert_eq!(
            bonded_channels(44, BondingState::Vht80LowHigh),
            vec![36, 40, 44, 48]
        );
        assert_eq!(
            bonded_channels(64, BondingState::Vht80HighHigh),
            vec![52, 56, 60, 64]
        );
    }

    #[test]
    fn test_bonding_for_channel() {
        assert_eq!(
            BondingState::for_channel(48, ChannelWidth::Mhz80),
            Some(BondingState::Vht80HighHigh)
        );
        assert_eq!(
            BondingState::for_channel(44, ChannelWidth::Mhz40),
            Some(BondingState::Ht40Lower)
        );
        assert_eq!(
            BondingState::for_channel(6, ChannelWidth::Mhz40),
            Some(BondingState::Ht40Lower)
        );
        assert_eq!(
            BondingState::for_channel(11, ChannelWidth::Mhz40),
            Some(BondingState::Ht40Upper)
        );
        assert_eq!(BondingState::for_channel(165, ChannelWidth::Mhz80), None);
        assert_eq!(BondingState::for_channel(6, ChannelWidth::Mhz80), None);
    }

    #[test]
    fn test_centre_and_resolve() {
        assert_eq!(center_channel(36, BondingState::Vht80LowLow), 42);
        assert_eq!(center_channel(149, BondingState::Ht40Lower), 151);
        assert_eq!(secondary_channel(44, BondingState::Vht80LowHigh), Some(48));

        let op = OperatingChannel::resolve(165, ChannelWidth::Mhz80);
        assert_eq!(op.width, ChannelWidth::Mhz20);
        assert_eq!(op.sub_channels(), vec![165]);
        assert!(OperatingChannel::resolve(52, ChannelWidth::Mhz80).overlaps(&[60]));
    }
}
