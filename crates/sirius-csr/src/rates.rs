//! Locally supported rate table used to vet a BSS's basic rate set.

use serde::{Deserialize, Serialize};

/// Basic-rate flag in a supported rates element octet
pub const BASIC_RATE_MASK: u8 = 0x80;

/// BSS membership selector: HT PHY required
pub const SELECTOR_HT_PHY: u8 = 127;
/// BSS membership selector: VHT PHY required
pub const SELECTOR_VHT_PHY: u8 = 126;
/// BSS membership selector: SAE hash-to-element only
pub const SELECTOR_SAE_H2E: u8 = 123;

/// Local PHY features that gate parts of the rate table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateFeatures {
    /// Extended selector support (SAE hash-to-element)
    pub esf: bool,
    /// 40/80 MHz channel bonding
    pub channel_bonding: bool,
    /// HT/VHT multi-stream PHY
    pub mimo: bool,
}

impl RateFeatures {
    pub const NONE: RateFeatures = RateFeatures {
        esf: false,
        channel_bonding: false,
        mimo: false,
    };

    pub const ALL: RateFeatures = RateFeatures {
        esf: true,
        channel_bonding: true,
        mimo: true,
    };

    fn covers(&self, needs: &RateFeatures) -> bool {
        (!needs.esf || self.esf)
            && (!needs.channel_bonding || self.channel_bonding)
            && (!needs.mimo || self.mimo)
    }
}

struct RateEntry {
    /// Rate in 500 kbps units, or a membership selector
    rate: u8,
    needs: RateFeatures,
}

const fn legacy(rate: u8) -> RateEntry {
    RateEntry {
        rate,
        needs: RateFeatures::NONE,
    }
}

static SUPPORTED_RATES: &[RateEntry] = &[
    // 802.11b DSSS/CCK
    legacy(2),
    legacy(4),
    legacy(11),
    legacy(22),
    // 802.11a/g OFDM
    legacy(12),
    legacy(18),
    legacy(24),
    legacy(36),
    legacy(48),
    legacy(72),
    legacy(96),
    legacy(108),
    RateEntry {
        rate: SELECTOR_HT_PHY,
        needs: RateFeatures {
            esf: false,
            channel_bonding: false,
            mimo: true,
        },
    },
    RateEntry {
        rate: SELECTOR_VHT_PHY,
        needs: RateFeatures {
            esf: false,
            channel_bonding: true,
            mimo: true,
        },
    },
    RateEntry {
        rate: SELECTOR_SAE_H2E,
        needs: RateFeatures {
            esf: true,
            channel_bonding: false,
            mimo: false,
        },
    },
];

/// True if the rate (basic flag stripped) is usable with `features`.
pub fn is_rate_supported(rate: u8, features: RateFeatures) -> bool {
    let rate = rate & !BASIC_RATE_MASK;
    SUPPORTED_RATES
        .iter()
        .any(|e| e.rate == rate && features.covers(&e.needs))
}

/// Every basic rate the BSS advertises must be supported locally.
/// Non-basic rates never cause a rejection.
pub fn basic_rates_supported(rates: &[u8], features: RateFeatures) -> bool {
    rates
        .iter()
        .filter(|r| *r & BASIC_RATE_MASK != 0)
        .all(|r| is_rate_supported(*r, features))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_rates() {
        // 1, 2, 5.5, 11 basic; 6..54 optional
        let rates = [0x82, 0x84, 0x8B, 0x96, 0x0C, 0x12, 0x18, 0x24];
        assert!(basic_rates_supported(&rates, RateFeatures::NONE));

        // 40 Mbps (0x50) is not a real rate; as a basic rate it vetoes
        assert!(!basic_rates_supported(&[0x82, 0xD0], RateFeatures::ALL));
        // Unknown optional rate is fine
        assert!(basic_rates_supported(&[0x82, 0x50], RateFeatures::NONE));
    }

    #[test]
    fn test_membership_selectors() {
        let ht_only = [0x8C, BASIC_RATE_MASK | SELECTOR_HT_PHY];
        assert!(!basic_rates_supported(&ht_only, RateFeatures::NONE));
        let mimo = RateFeatures {
            mimo: true,
            ..RateFeatures::NONE
        };
        assert!(basic_rates_supported(&ht_only, mimo));

        let vht_only = [BASIC_RATE_MASK | SELECTOR_VHT_PHY];
        assert!(!basic_rates_supported(&vht_only, mimo));
        assert!(basic_rates_supported(&vht_only, RateFeatures::ALL));
    }
}
