//! Decoding of the security information elements carried in beacons and
//! probe responses: RSN (tag 48), vendor WPA (tag 221, 00-50-F2 type 1)
//! and WAPI (tag 68).

use serde::{Deserialize, Serialize};

use crate::error::{CsrError, Result};
use crate::oui::{cipher_oui, CipherIndex, Oui, SuiteFamily, WPA_OUI};

pub const EID_SSID: u8 = 0;
pub const EID_SUPPORTED_RATES: u8 = 1;
pub const EID_COUNTRY: u8 = 7;
pub const EID_HT_CAPABILITIES: u8 = 45;
pub const EID_RSN: u8 = 48;
pub const EID_EXTENDED_RATES: u8 = 50;
pub const EID_MOBILITY_DOMAIN: u8 = 54;
pub const EID_WAPI: u8 = 68;
pub const EID_VHT_CAPABILITIES: u8 = 191;
pub const EID_VENDOR: u8 = 221;

/// A raw element borrowed from an IE blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub id: u8,
    pub body: &'a [u8],
}

/// Iterator over the TLV elements of a beacon/probe response body.
///
/// Stops at the first element whose length runs past the buffer.
pub fn elements(ies: &[u8]) -> impl Iterator<Item = Element<'_>> {
    let mut rest = ies;
    std::iter::from_fn(move || {
        if rest.len() < 2 {
            return None;
        }
        let id = rest[0];
        let len = rest[1] as usize;
        if rest.len() < 2 + len {
            return None;
        }
        let body = &rest[2..2 + len];
        rest = &rest[2 + len..];
        Some(Element { id, body })
    })
}

/// RSN capabilities field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsnCapabilities(pub u16);

impl RsnCapabilities {
    pub fn preauth(&self) -> bool {
        self.0 & 0x0001 != 0
    }

    pub fn no_pairwise(&self) -> bool {
        self.0 & 0x0002 != 0
    }

    /// PTKSA replay counter field (bits 2-3)
    pub fn ptksa_replay_counter(&self) -> u8 {
        ((self.0 >> 2) & 0x3) as u8
    }

    /// GTKSA replay counter field (bits 4-5)
    pub fn gtksa_replay_counter(&self) -> u8 {
        ((self.0 >> 4) & 0x3) as u8
    }

    /// Management frame protection required (MFPR, bit 6)
    pub fn mfp_required(&self) -> bool {
        self.0 & 0x0040 != 0
    }

    /// Management frame protection capable (MFPC, bit 7)
    pub fn mfp_capable(&self) -> bool {
        self.0 & 0x0080 != 0
    }
}

/// Decoded RSN element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsnElement {
    pub version: u16,
    pub group_cipher: Oui,
    pub pairwise_ciphers: Vec<Oui>,
    pub akm_suites: Vec<Oui>,
    pub capabilities: RsnCapabilities,
    pub pmkids: Vec<[u8; 16]>,
    pub group_mgmt_cipher: Option<Oui>,
}

/// Decoded vendor WPA element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpaElement {
    pub version: u16,
    pub multicast_cipher: Oui,
    pub unicast_ciphers: Vec<Oui>,
    pub auth_suites: Vec<Oui>,
}

/// Decoded WAPI element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WapiElement {
    pub version: u16,
    pub akm_suites: Vec<Oui>,
    pub unicast_ciphers: Vec<Oui>,
    pub multicast_cipher: Oui,
    pub capabilities: u16,
}

struct Reader<'a> {
    what: &'static str,
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(what: &'static str, bytes: &'a [u8]) -> Self {
        Self {
            what,
            bytes,
            offset: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize, field: &str) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CsrError::parse(self.what, format!("{} truncated", field)));
        }
        let out = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    fn u16(&mut self, field: &str) -> Result<u16> {
        let b = self.take(2, field)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn suite(&mut self, field: &str) -> Result<Oui> {
        let b = self.take(4, field)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    fn suite_list(&mut self, field: &str) -> Result<Vec<Oui>> {
        let count = self.u16(field)? as usize;
        if self.remaining() < 4 * count {
            return Err(CsrError::parse(self.what, format!("{} list truncated", field)));
        }
        (0..count).map(|_| self.suite(field)).collect()
    }
}

/// Strip a leading `tag, len` header if present and check its length.
fn element_body<'a>(what: &'static str, tag: u8, bytes: &'a [u8], min_body: usize) -> Result<&'a [u8]> {
    if bytes.len() >= 2 && bytes[0] == tag && bytes.len() >= 2 + min_body {
        let len = bytes[1] as usize;
        if bytes.len() < len + 2 {
            return Err(CsrError::parse(what, "length exceeds buffer"));
        }
        return Ok(&bytes[2..2 + len]);
    }
    Ok(bytes)
}

/// Parse an RSN element, with or without its `48, len` header.
///
/// Trailing optional fields follow 802.11: a missing pairwise list means
/// CCMP, a missing AKM list means 802.1X.
pub fn parse_rsn_ie(bytes: &[u8]) -> Result<RsnElement> {
    const WHAT: &str = "RSN IE";
    let body = element_body(WHAT, EID_RSN, bytes, 2)?;
    let mut r = Reader::new(WHAT, body);

    let version = r.u16("version")?;
    if version != 1 {
        return Err(CsrError::parse(WHAT, format!("unsupported RSN version {}", version)));
    }

    let ccmp = cipher_oui(SuiteFamily::Rsn, CipherIndex::Ccmp).unwrap_or([0x00, 0x0F, 0xAC, 0x04]);
    let group_cipher = if r.remaining() == 0 { ccmp } else { r.suite("group cipher")? };
    let pairwise_ciphers = if r.remaining() == 0 {
        vec![ccmp]
    } else {
        r.suite_list("pairwise")?
    };
    let akm_suites = if r.remaining() == 0 {
        vec![[0x00, 0x0F, 0xAC, 0x01]]
    } else {
        r.suite_list("AKM")?
    };
    let capabilities = if r.remaining() >= 2 {
        RsnCapabilities(r.u16("capabilities")?)
    } else {
        RsnCapabilities::default()
    };

    let mut pmkids = Vec::new();
    if r.remaining() >= 2 {
        let count = r.u16("PMKID count")? as usize;
        for _ in 0..count {
            let id = r.take(16, "PMKID")?;
            let mut pmkid = [0u8; 16];
            pmkid.copy_from_slice(id);
            pmkids.push(pmkid);
        }
    }
    let group_mgmt_cipher = if r.remaining() >= 4 {
        Some(r.suite("group management cipher")?)
    } else {
        None
    };

    Ok(RsnElement {
        version,
        group_cipher,
        pairwise_ciphers,
        akm_suites,
        capabilities,
        pmkids,
        group_mgmt_cipher,
    })
}

/// True if a vendor element body carries the WPA OUI with the given type.
pub fn is_wpa_vendor(body: &[u8], vendor_type: u8) -> bool {
    body.len() >= 4 && body[..3] == WPA_OUI && body[3] == vendor_type
}

/// Parse a WPA vendor element, with or without its `221, len` header.
pub fn parse_wpa_ie(bytes: &[u8]) -> Result<WpaElement> {
    const WHAT: &str = "WPA IE";
    let body = element_body(WHAT, EID_VENDOR, bytes, 4)?;
    if !is_wpa_vendor(body, 0x01) {
        return Err(CsrError::parse(WHAT, "missing 00-50-F2 type 1 header"));
    }
    let mut r = Reader::new(WHAT, &body[4..]);

    let version = r.u16("version")?;
    if version != 1 {
        return Err(CsrError::parse(WHAT, format!("unsupported WPA version {}", version)));
    }
    let tkip = [0x00, 0x50, 0xF2, 0x02];
    let multicast_cipher = if r.remaining() == 0 { tkip } else { r.suite("multicast cipher")? };
    let unicast_ciphers = if r.remaining() == 0 {
        vec![tkip]
    } else {
        r.suite_list("unicast")?
    };
    let auth_suites = if r.remaining() == 0 {
        vec![[0x00, 0x50, 0xF2, 0x01]]
    } else {
        r.suite_list("auth")?
    };

    Ok(WpaElement {
        version,
        multicast_cipher,
        unicast_ciphers,
        auth_suites,
    })
}

/// Parse a WAPI element, with or without its `68, len` header.
pub fn parse_wapi_ie(bytes: &[u8]) -> Result<WapiElement> {
    const WHAT: &str = "WAPI IE";
    let body = element_body(WHAT, EID_WAPI, bytes, 2)?;
    let mut r = Reader::new(WHAT, body);

    let version = r.u16("version")?;
    if version != 1 {
        return Err(CsrError::parse(WHAT, format!("unsupported WAPI version {}", version)));
    }
    let akm_suites = r.suite_list("AKM")?;
    let unicast_ciphers = r.suite_list("unicast")?;
    let multicast_cipher = r.suite("multicast cipher")?;
    let capabilities = if r.remaining() >= 2 { r.u16("capabilities")? } else { 0 };

    Ok(WapiElement {
        version,
        akm_suites,
        unicast_ciphers,
        multicast_cipher,
        capabilities,
    })
}

/// Security-relevant view of a BSS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BssSecurity {
    /// Privacy bit of the capability information field
    pub privacy: bool,
    pub rsn: Option<RsnElement>,
    pub wpa: Option<WpaElement>,
    pub wapi: Option<WapiElement>,
}

impl BssSecurity {
    /// Collect the security elements from an IE blob.
    ///
    /// A malformed element is dropped with a debug log rather than failing
    /// the whole descriptor: the BSS then simply does not offer that family.
    pub fn from_ies(privacy: bool, ies: &[u8]) -> Self {
        let mut security = Self {
            privacy,
            ..Self::default()
        };
        for element in elements(ies) {
            match element.id {
                EID_RSN if security.rsn.is_none() => match parse_rsn_ie(element.body) {
                    Ok(rsn) => security.rsn = Some(rsn),
                    Err(e) => tracing::debug!(target: "csr", "ignoring RSN element: {}", e),
                },
                EID_WAPI if security.wapi.is_none() => match parse_wapi_ie(element.body) {
                    Ok(wapi) => security.wapi = Some(wapi),
                    Err(e) => tracing::debug!(target: "csr", "ignoring WAPI element: {}", e),
                },
                EID_VENDOR if security.wpa.is_none() && is_wpa_vendor(element.body, 0x01) => {
                    match parse_wpa_ie(element.body) {
                        Ok(wpa) => security.wpa = Some(wpa),
                        Err(e) => tracing::debug!(target: "csr", "ignoring WPA element: {}", e),
                    }
                }
                _ => {}
            }
        }
        security
    }

    /// No RSN, WPA or WAPI element at all
    pub fn is_legacy(&self) -> bool {
        self.rsn.is_none() && self.wpa.is_none() && self.wapi.is_none()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// RSN element body: CCMP group, given pairwise and AKM suite types.
    pub(crate) fn rsn_body(group: u8, pairwise: &[u8], akms: &[u8], caps: u16) -> Vec<u8> {
        let mut ie = Vec::new();
        ie.extend_from_slice(&1u16.to_le_bytes());
        ie.extend_from_slice(&[0x00, 0x0F, 0xAC, group]);
        ie.extend_from_slice(&(pairwise.len() as u16).to_le_bytes());
        for p in pairwise {
            ie.extend_from_slice(&[0x00, 0x0F, 0xAC, *p]);
        }
        ie.extend_from_slice(&(akms.len() as u16).to_le_bytes());
        for a in akms {
            ie.extend_from_slice(&[0x00, 0x0F, 0xAC, *a]);
        }
        ie.extend_from_slice(&caps.to_le_bytes());
        ie
    }

    pub(crate) fn wpa_body(multicast: u8, unicast: &[u8], auth: &[u8]) -> Vec<u8> {
        let mut ie = vec![0x00, 0x50, 0xF2, 0x01];
        ie.extend_from_slice(&1u16.to_le_bytes());
        ie.extend_from_slice(&[0x00, 0x50, 0xF2, multicast]);
        ie.extend_from_slice(&(unicast.len() as u16).to_le_bytes());
        for u in unicast {
            ie.extend_from_slice(&[0x00, 0x50, 0xF2, *u]);
        }
        ie.extend_from_slice(&(auth.len() as u16).to_le_bytes());
        for a in auth {
            ie.extend_from_slice(&[0x00, 0x50, 0xF2, *a]);
        }
        ie
    }

    pub(crate) fn tlv(id: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![id, body.len() as u8];
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_parse_rsn_psk_ccmp() {
        let body = rsn_body(0x04, &[0x04, 0x02], &[0x02], 0x0080);
        let rsn = parse_rsn_ie(&tlv(EID_RSN, &body)).unwrap();
        assert_eq!(rsn.group_cipher, [0x00, 0x0F, 0xAC, 0x04]);
        assert_eq!(rsn.pairwise_ciphers.len(), 2);
        assert_eq!(rsn.akm_suites, vec![[0x00, 0x0F, 0xAC, 0x02]]);
        assert!(rsn.capabilities.mfp_capable());
        assert!(!rsn.capabilities.mfp_required());
        assert!(rsn.group_mgmt_cipher.is_none());

        // Same element without the header
        assert_eq!(parse_rsn_ie(&body).unwrap(), rsn);
    }

    #[test]
    fn test_rsn_defaults_for_short_element() {
        let rsn = parse_rsn_ie(&1u16.to_le_bytes()).unwrap();
        assert_eq!(rsn.pairwise_ciphers, vec![[0x00, 0x0F, 0xAC, 0x04]]);
        assert_eq!(rsn.akm_suites, vec![[0x00, 0x0F, 0xAC, 0x01]]);
    }

    #[test]
    fn test_rsn_rejects_bad_input() {
        assert!(parse_rsn_ie(&[0x02, 0x00]).is_err());
        let mut body = rsn_body(0x04, &[0x04], &[0x02], 0);
        body.truncate(10);
        assert!(parse_rsn_ie(&body).unwrap_err().is_parse());
    }

    #[test]
    fn test_parse_wpa() {
        let body = wpa_body(0x02, &[0x02, 0x04], &[0x02]);
        let wpa = parse_wpa_ie(&body).unwrap();
        assert_eq!(wpa.multicast_cipher, [0x00, 0x50, 0xF2, 0x02]);
        assert_eq!(wpa.unicast_ciphers.len(), 2);
        assert!(parse_wpa_ie(&[0x00, 0x50, 0xF2, 0x04, 0x01, 0x00]).is_err());
    }

    #[test]
    fn test_parse_wapi() {
        let mut body = Vec::new();
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&[0x00, 0x14, 0x72, 0x02]);
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&[0x00, 0x14, 0x72, 0x01]);
        body.extend_from_slice(&[0x00, 0x14, 0x72, 0x01]);
        body.extend_from_slice(&0u16.to_le_bytes());
        let wapi = parse_wapi_ie(&body).unwrap();
        assert_eq!(wapi.akm_suites, vec![[0x00, 0x14, 0x72, 0x02]]);
        assert_eq!(wapi.multicast_cipher, [0x00, 0x14, 0x72, 0x01]);
    }

    #[test]
    fn test_security_from_ies() {
        let mut ies = tlv(EID_SSID, b"lab");
        ies.extend(tlv(EID_RSN, &rsn_body(0x04, &[0x04], &[0x02], 0)));
        ies.extend(tlv(EID_VENDOR, &wpa_body(0x02, &[0x02], &[0x02])));
        // Malformed WAPI element is skipped
        ies.extend(tlv(EID_WAPI, &[0x05, 0x00]));

        let sec = BssSecurity::from_ies(true, &ies);
        assert!(sec.rsn.is_some());
        assert!(sec.wpa.is_some());
        assert!(sec.wapi.is_none());
        assert!(!sec.is_legacy());
    }

    #[test]
    fn test_element_walk_stops_on_overrun() {
        let ies = [0x00, 0x03, b'a', b'b', b'c', 0x01, 0x08, 0x82];
        let ids: Vec<u8> = elements(&ies).map(|e| e.id).collect();
        assert_eq!(ids, vec![0x00]);
    }
}
