//! Scan result descriptors and the filter used to accept or reject them.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{CsrConfig, QosMode};
use crate::error::{CsrError, Result};
use crate::ie::{self, BssSecurity};
use crate::mac::MacAddress;
use crate::negotiate::{negotiate, NegotiatedSecurity};
use crate::oui::WFA_OUI;
use crate::profile::SecurityProfile;
use crate::rates::basic_rates_supported;

/// Maximum SSID length in octets
pub const MAX_SSID_LEN: usize = 32;

/// SSID octets. Not necessarily UTF-8.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ssid(Vec<u8>);

impl Ssid {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > MAX_SSID_LEN {
            return Err(CsrError::InvalidSsid(format!(
                "{} octets exceeds {}",
                bytes.len(),
                MAX_SSID_LEN
            )));
        }
        Ok(Self(bytes))
    }

    /// The zero-length SSID, which matches any network in a filter
    pub fn wildcard() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty()
    }

    /// Hidden networks beacon an empty or all-null SSID
    pub fn is_hidden(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl TryFrom<&str> for Ssid {
    type Error = CsrError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s.as_bytes())
    }
}

impl fmt::Debug for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ssid({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Capability information field of a beacon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfo(pub u16);

impl CapabilityInfo {
    pub const ESS: u16 = 0x0001;
    pub const IBSS: u16 = 0x0002;
    pub const PRIVACY: u16 = 0x0010;
    pub const SHORT_PREAMBLE: u16 = 0x0020;
    pub const SPECTRUM_MGMT: u16 = 0x0100;
    pub const QOS: u16 = 0x0200;

    pub fn ess(&self) -> bool {
        self.0 & Self::ESS != 0
    }

    pub fn ibss(&self) -> bool {
        self.0 & Self::IBSS != 0
    }

    pub fn privacy(&self) -> bool {
        self.0 & Self::PRIVACY != 0
    }

    pub fn qos(&self) -> bool {
        self.0 & Self::QOS != 0
    }
}

/// PHY mode bit set. The empty set means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhyModes(pub u8);

impl PhyModes {
    pub const ANY: PhyModes = PhyModes(0);
    pub const A: PhyModes = PhyModes(0x01);
    pub const B: PhyModes = PhyModes(0x02);
    pub const G: PhyModes = PhyModes(0x04);
    pub const N: PhyModes = PhyModes(0x08);
    pub const AC: PhyModes = PhyModes(0x10);

    pub fn union(self, other: PhyModes) -> PhyModes {
        PhyModes(self.0 | other.0)
    }

    pub fn intersects(&self, other: PhyModes) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_any(&self) -> bool {
        self.0 == 0
    }
}

/// 802.11r mobility domain element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilityDomain {
    pub mdid: u16,
    pub ft_over_ds: bool,
}

/// One scanned BSS. Immutable once built from a scan result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BssDescriptor {
    pub bssid: MacAddress,
    pub ssid: Ssid,
    pub channel: u8,
    pub capability: CapabilityInfo,
    pub beacon_interval: u16,
    /// Supported and extended rates, basic flag included
    pub rates: Vec<u8>,
    pub ht: bool,
    pub vht: bool,
    pub wmm: bool,
    pub wps: bool,
    /// P2P element present
    pub p2p: bool,
    pub p2p_device_address: Option<MacAddress>,
    pub security: BssSecurity,
    /// First two octets of the country string
    pub country: Option<[u8; 2]>,
    pub mobility_domain: Option<MobilityDomain>,
    pub ies: Vec<u8>,
}

impl BssDescriptor {
    /// Build a descriptor from the fixed fields and the raw IE blob.
    pub fn from_ies(
        bssid: MacAddress,
        channel: u8,
        capability: CapabilityInfo,
        beacon_interval: u16,
        ies: Vec<u8>,
    ) -> Result<Self> {
        let mut bss = Self {
            bssid,
            ssid: Ssid::wildcard(),
            channel,
            capability,
            beacon_interval,
            rates: Vec::new(),
            ht: false,
            vht: false,
            wmm: false,
            wps: false,
            p2p: false,
            p2p_device_address: None,
            security: BssSecurity::from_ies(capability.privacy(), &ies),
            country: None,
            mobility_domain: None,
            ies: Vec::new(),
        };

        for element in ie::elements(&ies) {
            match element.id {
                ie::EID_SSID => bss.ssid = Ssid::new(element.body)?,
                ie::EID_SUPPORTED_RATES | ie::EID_EXTENDED_RATES => {
                    bss.rates.extend_from_slice(element.body)
                }
                ie::EID_COUNTRY if element.body.len() >= 2 => {
                    bss.country = Some([element.body[0], element.body[1]]);
                }
                ie::EID_HT_CAPABILITIES => bss.ht = true,
                ie::EID_VHT_CAPABILITIES => bss.vht = true,
                ie::EID_MOBILITY_DOMAIN if element.body.len() >= 3 => {
                    bss.mobility_domain = Some(MobilityDomain {
                        mdid: u16::from_le_bytes([element.body[0], element.body[1]]),
                        ft_over_ds: element.body[2] & 0x01 != 0,
                    });
                }
                ie::EID_VENDOR => {
                    let body = element.body;
                    if ie::is_wpa_vendor(body, 0x02) {
                        bss.wmm = true;
                    } else if ie::is_wpa_vendor(body, 0x04) {
                        bss.wps = true;
                    } else if body.len() >= 4 && body[..3] == WFA_OUI && body[3] == 0x09 {
                        bss.p2p = true;
                        bss.p2p_device_address = p2p_device_address(&body[4..]);
                    }
                }
                _ => {}
            }
        }

        bss.ies = ies;
        Ok(bss)
    }

    /// PHY modes implied by the band, rates and capability elements.
    /// VHT implies HT.
    pub fn phy_modes(&self) -> PhyModes {
        let mut modes = if self.channel <= 14 {
            let ofdm = self
                .rates
                .iter()
                .any(|r| matches!(r & 0x7F, 12 | 18 | 24 | 36 | 48 | 72 | 96 | 108));
            if ofdm {
                PhyModes::B.union(PhyModes::G)
            } else {
                PhyModes::B
            }
        } else {
            PhyModes::A
        };
        if self.ht || self.vht {
            modes = modes.union(PhyModes::N);
        }
        if self.vht {
            modes = modes.union(PhyModes::AC);
        }
        modes
    }
}

/// Device address from the P2P Device ID (3) or Device Info (13) attribute.
fn p2p_device_address(mut attrs: &[u8]) -> Option<MacAddress> {
    while attrs.len() >= 3 {
        let id = attrs[0];
        let len = u16::from_le_bytes([attrs[1], attrs[2]]) as usize;
        let body = attrs.get(3..3 + len)?;
        if (id == 3 || id == 13) && body.len() >= 6 {
            return MacAddress::from_slice(&body[..6]).ok();
        }
        attrs = &attrs[3 + len..];
    }
    None
}

/// Which BSS types a filter accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BssTypeFilter {
    #[default]
    Infrastructure,
    Ibss,
    Any,
}

/// Per-attempt criteria a scanned BSS must satisfy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFilter {
    /// Acceptable SSIDs. Empty, or a wildcard entry, accepts any.
    pub ssids: Vec<Ssid>,
    /// Hidden BSSs are only accepted when this is false
    pub ssid_required: bool,
    /// Acceptable BSSIDs. Empty, or a zero/broadcast entry, accepts any.
    pub bssids: Vec<MacAddress>,
    /// Empty accepts any channel
    pub channels: Vec<u8>,
    pub phy_modes: PhyModes,
    pub bss_type: BssTypeFilter,
    pub security: SecurityProfile,
    pub country: Option<[u8; 2]>,
    /// Only accept BSSs carrying a P2P element
    pub p2p_only: bool,
    /// WPS and OSEN association attempts skip security negotiation
    pub wps: bool,
    pub osen: bool,
    pub mobility_domain: Option<u16>,
}

/// Outcome of a successful match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BssMatch {
    /// `None` when security negotiation was skipped (WPS/OSEN)
    pub security: Option<NegotiatedSecurity>,
}

macro_rules! reject {
    ($bss:expr, $why:expr) => {{
        trace!(target: "csr", bssid = %$bss.bssid, reason = $why, "BSS rejected");
        return None;
    }};
}

/// Apply `filter` to `bss`, short-circuiting on the first failing check.
pub fn match_bss(bss: &BssDescriptor, filter: &ScanFilter, config: &CsrConfig) -> Option<BssMatch> {
    if filter.p2p_only && !bss.p2p {
        reject!(bss, "not a P2P result");
    }
    if config.blacklist.contains(&bss.bssid) {
        reject!(bss, "blacklisted");
    }
    if !ssid_matches(&bss.ssid, filter) {
        reject!(bss, "ssid");
    }
    if !bssid_matches(bss, filter) {
        reject!(bss, "bssid");
    }
    if !filter.channels.is_empty() && !filter.channels.contains(&bss.channel) {
        reject!(bss, "channel");
    }
    if !filter.phy_modes.is_any() && !filter.phy_modes.intersects(bss.phy_modes()) {
        reject!(bss, "phy mode");
    }

    let security = if filter.wps || filter.osen {
        None
    } else {
        match negotiate(&filter.security, &bss.security) {
            Some(n) => Some(n),
            None => reject!(bss, "security"),
        }
    };

    let type_ok = match filter.bss_type {
        BssTypeFilter::Infrastructure => bss.capability.ess(),
        BssTypeFilter::Ibss => bss.capability.ibss(),
        BssTypeFilter::Any => bss.capability.ess() || bss.capability.ibss(),
    };
    if !type_ok {
        reject!(bss, "bss type");
    }
    if !basic_rates_supported(&bss.rates, config.rate_features) {
        reject!(bss, "basic rates");
    }
    if config.qos_mode == QosMode::QbssOnly && !(bss.wmm || bss.capability.qos()) {
        reject!(bss, "not a QBSS");
    }
    if !country_matches(bss, filter, config) {
        reject!(bss, "country");
    }
    if !mobility_domain_matches(bss, filter) {
        reject!(bss, "mobility domain");
    }

    Some(BssMatch { security })
}

/// Boolean form of [`match_bss`]
pub fn matches(bss: &BssDescriptor, filter: &ScanFilter, config: &CsrConfig) -> bool {
    match_bss(bss, filter, config).is_some()
}

fn ssid_matches(ssid: &Ssid, filter: &ScanFilter) -> bool {
    if filter.ssids.is_empty() || filter.ssids.iter().any(Ssid::is_wildcard) {
        return true;
    }
    if ssid.is_hidden() {
        return !filter.ssid_required;
    }
    filter.ssids.iter().any(|s| s == ssid)
}

fn bssid_matches(bss: &BssDescriptor, filter: &ScanFilter) -> bool {
    if filter.bssids.is_empty() || filter.bssids.iter().any(MacAddress::is_wildcard) {
        return true;
    }
    filter.bssids.iter().any(|b| {
        *b == bss.bssid || (filter.p2p_only && bss.p2p_device_address.as_ref() == Some(b))
    })
}

/// A BSS without a country element is accepted.
fn country_matches(bss: &BssDescriptor, filter: &ScanFilter, config: &CsrConfig) -> bool {
    if !config.dot11d {
        return true;
    }
    match (filter.country, bss.country) {
        (Some(wanted), Some(found)) => wanted.eq_ignore_ascii_case(&found),
        _ => true,
    }
}

/// Only enforced for fast-transition profiles.
fn mobility_domain_matches(bss: &BssDescriptor, filter: &ScanFilter) -> bool {
    let Some(mdid) = filter.mobility_domain else {
        return true;
    };
    if !filter.security.auth_types.iter().any(|a| a.is_fast_transition()) {
        return true;
    }
    bss.mobility_domain.map(|m| m.mdid) == Some(mdid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ie::tests::{rsn_body, tlv};
    use crate::mac::MacAddress;
    use crate::profile::{AuthType, EncryptionType};

    const BSSID: MacAddress = MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    fn ies(ssid: &[u8], extra: &[Vec<u8>]) -> Vec<u8> {
        let mut out = tlv(ie::EID_SSID, ssid);
        out.extend(tlv(ie::EID_SUPPORTED_RATES, &[0x8C, 0x12, 0x98, 0x24]));
        for e in extra {
            out.extend_from_slice(e);
        }
        out
    }

    fn open_bss(ssid: &[u8], channel: u8) -> BssDescriptor {
        BssDescriptor::from_ies(
            BSSID,
            channel,
            CapabilityInfo(CapabilityInfo::ESS),
            100,
            ies(ssid, &[]),
        )
        .unwrap()
    }

    fn rsn_bss(extra: &[Vec<u8>]) -> BssDescriptor {
        let mut all = vec![tlv(ie::EID_RSN, &rsn_body(0x04, &[0x04], &[0x02, 0x04], 0))];
        all.extend_from_slice(extra);
        BssDescriptor::from_ies(
            BSSID,
            36,
            CapabilityInfo(CapabilityInfo::ESS | CapabilityInfo::PRIVACY),
            100,
            ies(b"corp", &all),
        )
        .unwrap()
    }

    fn ssid(s: &str) -> Ssid {
        Ssid::try_from(s).unwrap()
    }

    #[test]
    fn test_descriptor_from_ies() {
        let bss = rsn_bss(&[
            tlv(ie::EID_COUNTRY, b"DE "),
            tlv(ie::EID_HT_CAPABILITIES, &[0; 26]),
            tlv(ie::EID_MOBILITY_DOMAIN, &[0x34, 0x12, 0x01]),
            tlv(ie::EID_VENDOR, &[0x00, 0x50, 0xF2, 0x02, 0x01, 0x01]),
        ]);
        assert_eq!(bss.ssid, ssid("corp"));
        assert_eq!(bss.country, Some(*b"DE"));
        assert!(bss.ht && bss.wmm && !bss.vht);
        assert_eq!(bss.mobility_domain.map(|m| m.mdid), Some(0x1234));
        assert!(bss.security.rsn.is_some());
        assert!(bss.phy_modes().intersects(PhyModes::N));
        assert!(!bss.phy_modes().intersects(PhyModes::AC));
    }

    #[test]
    fn test_ssid_rules() {
        let cfg = CsrConfig::default();
        let mut filter = ScanFilter {
            ssids: vec![ssid("home")],
            security: SecurityProfile::open(),
            ..ScanFilter::default()
        };
        assert!(matches(&open_bss(b"home", 6), &filter, &cfg));
        assert!(!matches(&open_bss(b"other", 6), &filter, &cfg));

        // Hidden BSS only when the SSID is not required
        assert!(matches(&open_bss(&[0, 0, 0], 6), &filter, &cfg));
        filter.ssid_required = true;
        assert!(!matches(&open_bss(b"", 6), &filter, &cfg));

        filter.ssids.push(Ssid::wildcard());
        assert!(matches(&open_bss(b"other", 6), &filter, &cfg));
    }

    #[test]
    fn test_blacklist_is_a_veto() {
        let cfg = CsrConfig {
            blacklist: vec![BSSID],
            ..CsrConfig::default()
        };
        let filter = ScanFilter {
            bssids: vec![BSSID],
            ..ScanFilter::default()
        };
        assert!(!matches(&open_bss(b"home", 6), &filter, &cfg));
    }

    #[test]
    fn test_bssid_and_channel() {
        let cfg = CsrConfig::default();
        let mut filter = ScanFilter {
            bssids: vec![MacAddress::BROADCAST],
            channels: vec![1, 6, 11],
            ..ScanFilter::default()
        };
        assert!(matches(&open_bss(b"x", 6), &filter, &cfg));
        assert!(!matches(&open_bss(b"x", 36), &filter, &cfg));

        filter.bssids = vec![MacAddress::new([2, 0, 0, 0, 0, 1])];
        assert!(!matches(&open_bss(b"x", 6), &filter, &cfg));
    }

    #[test]
    fn test_phy_mode() {
        let cfg = CsrConfig::default();
        let filter = ScanFilter {
            phy_modes: PhyModes::N,
            ..ScanFilter::default()
        };
        assert!(!matches(&open_bss(b"legacy", 6), &filter, &cfg));

        let vht = rsn_bss(&[tlv(ie::EID_VHT_CAPABILITIES, &[0; 12])]);
        let filter = ScanFilter {
            phy_modes: PhyModes::N,
            security: SecurityProfile::rsn_psk(),
            ..ScanFilter::default()
        };
        assert!(matches(&vht, &filter, &cfg));
    }

    #[test]
    fn test_security_and_wps_skip() {
        let cfg = CsrConfig::default();
        let bss = rsn_bss(&[]);
        let mut filter = ScanFilter::default();
        assert!(!matches(&bss, &filter, &cfg));

        filter.wps = true;
        let m = match_bss(&bss, &filter, &cfg).unwrap();
        assert!(m.security.is_none());

        filter.wps = false;
        filter.security = SecurityProfile::rsn_psk();
        let m = match_bss(&bss, &filter, &cfg).unwrap();
        assert_eq!(m.security.unwrap().auth_type, AuthType::RsnPsk);
    }

    #[test]
    fn test_bss_type_and_qos() {
        let mut cfg = CsrConfig::default();
        let filter = ScanFilter {
            bss_type: BssTypeFilter::Ibss,
            ..ScanFilter::default()
        };
        assert!(!matches(&open_bss(b"x", 6), &filter, &cfg));

        cfg.qos_mode = QosMode::QbssOnly;
        assert!(!matches(&open_bss(b"x", 6), &ScanFilter::default(), &cfg));
    }

    #[test]
    fn test_basic_rates_veto() {
        let cfg = CsrConfig::default();
        let mut raw = tlv(ie::EID_SSID, b"x");
        raw.extend(tlv(ie::EID_SUPPORTED_RATES, &[0x82, 0xD0]));
        let bss = BssDescriptor::from_ies(BSSID, 6, CapabilityInfo(CapabilityInfo::ESS), 100, raw)
            .unwrap();
        assert!(!matches(&bss, &ScanFilter::default(), &cfg));
    }

    #[test]
    fn test_country_depends_on_dot11d() {
        let bss = rsn_bss(&[tlv(ie::EID_COUNTRY, b"DE ")]);
        let filter = ScanFilter {
            security: SecurityProfile::rsn_psk(),
            country: Some(*b"us"),
            ..ScanFilter::default()
        };
        let mut cfg = CsrConfig::default();
        assert!(!matches(&bss, &filter, &cfg));
        cfg.dot11d = false;
        assert!(matches(&bss, &filter, &cfg));

        let filter = ScanFilter {
            country: Some(*b"de"),
            ..filter
        };
        assert!(matches(&bss, &filter, &CsrConfig::default()));
    }

    #[test]
    fn test_mobility_domain_for_ft_only() {
        let cfg = CsrConfig::default();
        let bss = rsn_bss(&[tlv(ie::EID_MOBILITY_DOMAIN, &[0x34, 0x12, 0x00])]);
        let mut filter = ScanFilter {
            security: SecurityProfile {
                auth_types: vec![AuthType::FtRsnPsk],
                unicast: EncryptionType::AesCcmp,
                multicast: vec![],
                mfp: None,
            },
            mobility_domain: Some(0x1234),
            ..ScanFilter::default()
        };
        assert!(matches(&bss, &filter, &cfg));

        filter.mobility_domain = Some(0x9999);
        assert!(!matches(&bss, &filter, &cfg));

        // Non-FT profile ignores the mobility domain
        filter.security = SecurityProfile::rsn_psk();
        assert!(matches(&bss, &filter, &cfg));
    }

    #[test]
    fn test_p2p_device_address() {
        let dev = [0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
        let mut p2p = vec![0x50, 0x6F, 0x9A, 0x09, 3, 6, 0];
        p2p.extend_from_slice(&dev);
        let bss = BssDescriptor::from_ies(
            BSSID,
            6,
            CapabilityInfo(CapabilityInfo::ESS),
            100,
            ies(b"DIRECT-xy", &[tlv(ie::EID_VENDOR, &p2p)]),
        )
        .unwrap();
        assert!(bss.p2p);

        let filter = ScanFilter {
            p2p_only: true,
            bssids: vec![MacAddress::new(dev)],
            ..ScanFilter::default()
        };
        assert!(matches(&bss, &filter, &CsrConfig::default()));
        assert!(!matches(&open_bss(b"DIRECT-xy", 6), &filter, &CsrConfig::default()));
    }
}
