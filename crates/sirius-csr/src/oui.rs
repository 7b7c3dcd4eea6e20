//! Suite selector tables.
//!
//! Every cipher and AKM suite is identified on the air by a 4-byte selector
//! (3-byte OUI plus a suite type). The three security element families use
//! different OUIs for the same logical suite, so lookups go through one
//! table per family indexed by the logical cipher or AKM.

use serde::{Deserialize, Serialize};

/// 4-byte suite selector (OUI + suite type)
pub type Oui = [u8; 4];

/// IEEE 802.11 RSN OUI
pub const RSN_OUI: [u8; 3] = [0x00, 0x0F, 0xAC];
/// Microsoft OUI used by the pre-standard WPA element
pub const WPA_OUI: [u8; 3] = [0x00, 0x50, 0xF2];
/// WAPI (GB 15629.11) OUI
pub const WAPI_OUI: [u8; 3] = [0x00, 0x14, 0x72];
/// Cisco OUI, carries CCKM in both RSN and WPA elements
pub const CCKM_OUI: [u8; 3] = [0x00, 0x40, 0x96];
/// Wi-Fi Alliance OUI, carries the OSEN AKM
pub const WFA_OUI: [u8; 3] = [0x50, 0x6F, 0x9A];

const fn sel(oui: [u8; 3], suite: u8) -> Oui {
    [oui[0], oui[1], oui[2], suite]
}

/// Security element family a selector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuiteFamily {
    Rsn,
    Wpa,
    Wapi,
}

/// Logical cipher slot.
///
/// The discriminant is the row index into the per-family selector tables.
/// Slot 0 is reserved: it has no selector in any family and never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum CipherIndex {
    Reserved = 0,
    Wep40,
    Wep104,
    Tkip,
    Ccmp,
    Wpi,
    UseGroup,
    Gcmp128,
    Gcmp256,
    Ccmp256,
    BipCmac128,
}

const CIPHER_SLOTS: usize = 11;

static RSN_CIPHERS: [Option<Oui>; CIPHER_SLOTS] = [
    None,
    Some(sel(RSN_OUI, 0x01)),
    Some(sel(RSN_OUI, 0x05)),
    Some(sel(RSN_OUI, 0x02)),
    Some(sel(RSN_OUI, 0x04)),
    None,
    Some(sel(RSN_OUI, 0x00)),
    Some(sel(RSN_OUI, 0x08)),
    Some(sel(RSN_OUI, 0x09)),
    Some(sel(RSN_OUI, 0x0A)),
    Some(sel(RSN_OUI, 0x06)),
];

static WPA_CIPHERS: [Option<Oui>; CIPHER_SLOTS] = [
    None,
    Some(sel(WPA_OUI, 0x01)),
    Some(sel(WPA_OUI, 0x05)),
    Some(sel(WPA_OUI, 0x02)),
    Some(sel(WPA_OUI, 0x04)),
    None,
    Some(sel(WPA_OUI, 0x00)),
    None,
    None,
    None,
    None,
];

static WAPI_CIPHERS: [Option<Oui>; CIPHER_SLOTS] = [
    None,
    None,
    None,
    None,
    None,
    Some(sel(WAPI_OUI, 0x01)),
    None,
    None,
    None,
    None,
    None,
];

fn cipher_table(family: SuiteFamily) -> &'static [Option<Oui>; CIPHER_SLOTS] {
    match family {
        SuiteFamily::Rsn => &RSN_CIPHERS,
        SuiteFamily::Wpa => &WPA_CIPHERS,
        SuiteFamily::Wapi => &WAPI_CIPHERS,
    }
}

/// Selector for a cipher in the given family, `None` if the family has none.
pub fn cipher_oui(family: SuiteFamily, cipher: CipherIndex) -> Option<Oui> {
    cipher_table(family)[cipher as usize]
}

/// Reverse lookup of a cipher selector. Unknown selectors map to `Reserved`.
pub fn cipher_index(family: SuiteFamily, oui: &Oui) -> CipherIndex {
    use CipherIndex::*;
    const ALL: [CipherIndex; CIPHER_SLOTS] = [
        Reserved, Wep40, Wep104, Tkip, Ccmp, Wpi, UseGroup, Gcmp128, Gcmp256, Ccmp256,
        BipCmac128,
    ];
    ALL.into_iter()
        .find(|c| cipher_oui(family, *c).as_ref() == Some(oui))
        .unwrap_or(Reserved)
}

/// Authentication and key management suites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AkmSuite {
    Ieee8021x,
    Psk,
    FtIeee8021x,
    FtPsk,
    Ieee8021xSha256,
    PskSha256,
    Sae,
    FtSae,
    Owe,
    Cckm,
    Osen,
    WapiCert,
    WapiPsk,
}

/// Selector for an AKM in the given family, `None` if the family has none.
pub fn akm_oui(family: SuiteFamily, akm: AkmSuite) -> Option<Oui> {
    use AkmSuite::*;
    match (family, akm) {
        (SuiteFamily::Rsn, Ieee8021x) => Some(sel(RSN_OUI, 0x01)),
        (SuiteFamily::Rsn, Psk) => Some(sel(RSN_OUI, 0x02)),
        (SuiteFamily::Rsn, FtIeee8021x) => Some(sel(RSN_OUI, 0x03)),
        (SuiteFamily::Rsn, FtPsk) => Some(sel(RSN_OUI, 0x04)),
        (SuiteFamily::Rsn, Ieee8021xSha256) => Some(sel(RSN_OUI, 0x05)),
        (SuiteFamily::Rsn, PskSha256) => Some(sel(RSN_OUI, 0x06)),
        (SuiteFamily::Rsn, Sae) => Some(sel(RSN_OUI, 0x08)),
        (SuiteFamily::Rsn, FtSae) => Some(sel(RSN_OUI, 0x09)),
        (SuiteFamily::Rsn, Owe) => Some(sel(RSN_OUI, 0x12)),
        (SuiteFamily::Rsn, Cckm) | (SuiteFamily::Wpa, Cckm) => Some(sel(CCKM_OUI, 0x00)),
        (SuiteFamily::Rsn, Osen) => Some(sel(WFA_OUI, 0x01)),
        (SuiteFamily::Wpa, Ieee8021x) => Some(sel(WPA_OUI, 0x01)),
        (SuiteFamily::Wpa, Psk) => Some(sel(WPA_OUI, 0x02)),
        (SuiteFamily::Wapi, WapiCert) => Some(sel(WAPI_OUI, 0x01)),
        (SuiteFamily::Wapi, WapiPsk) => Some(sel(WAPI_OUI, 0x02)),
        _ => None,
    }
}

/// True if `target` is one of `candidates`.
pub fn oui_match(candidates: &[Oui], target: &Oui) -> bool {
    candidates.iter().any(|c| c == target)
}

/// Look a cipher up in `candidates`, returning the matched selector.
///
/// The reserved slot and ciphers the family cannot express never match.
pub fn match_cipher(family: SuiteFamily, candidates: &[Oui], cipher: CipherIndex) -> Option<Oui> {
    let oui = cipher_oui(family, cipher)?;
    oui_match(candidates, &oui).then_some(oui)
}

/// Look an AKM up in `candidates`, returning the matched selector.
pub fn match_akm(family: SuiteFamily, candidates: &[Oui], akm: AkmSuite) -> Option<Oui> {
    let oui = akm_oui(family, akm)?;
    oui_match(candidates, &oui).then_some(oui)
}
