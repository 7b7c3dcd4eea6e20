//! Matcher-wide settings that are not part of any single filter.

use serde::{Deserialize, Serialize};

use crate::mac::MacAddress;
use crate::rates::RateFeatures;

/// WMM policy applied when matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QosMode {
    #[default]
    Auto,
    /// Only join BSSs that advertise WMM/QoS
    QbssOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrConfig {
    /// 802.11d: honour the country element. Off means the country check is skipped.
    pub dot11d: bool,
    pub qos_mode: QosMode,
    pub rate_features: RateFeatures,
    /// Operator avoid-list. A listed BSSID is never matched.
    pub blacklist: Vec<MacAddress>,
}

impl Default for CsrConfig {
    fn default() -> Self {
        Self {
            dot11d: true,
            qos_mode: QosMode::Auto,
            rate_features: RateFeatures::ALL,
            blacklist: Vec::new(),
        }
    }
}
