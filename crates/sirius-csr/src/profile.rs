//! What the local side is willing to use: authentication types, ciphers and
//! management frame protection policy.

use serde::{Deserialize, Serialize};

use crate::oui::CipherIndex;

/// Authentication types a connection profile may allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
    Open,
    SharedKey,
    /// Open or shared key, whichever the AP accepts
    AutoSwitch,
    Wpa,
    WpaPsk,
    CckmWpa,
    Rsn,
    RsnPsk,
    FtRsn,
    FtRsnPsk,
    CckmRsn,
    Rsn8021xSha256,
    RsnPskSha256,
    Sae,
    FtSae,
    Owe,
    Osen,
    WapiCert,
    WapiPsk,
}

impl AuthType {
    /// Fast-transition AKMs, which tie the match to a mobility domain
    pub fn is_fast_transition(&self) -> bool {
        matches!(self, Self::FtRsn | Self::FtRsnPsk | Self::FtSae)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Open | Self::SharedKey | Self::AutoSwitch)
    }
}

/// Encryption types, unicast or multicast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionType {
    None,
    /// WEP with keys configured up front
    Wep40StaticKey,
    Wep104StaticKey,
    /// WEP with keys delivered by 802.1X
    Wep40,
    Wep104,
    Tkip,
    AesCcmp,
    AesCcmp256,
    AesGcmp,
    AesGcmp256,
    Wpi,
}

impl EncryptionType {
    /// Row of the selector tables this cipher maps to
    pub fn cipher_index(&self) -> CipherIndex {
        match self {
            Self::None => CipherIndex::Reserved,
            Self::Wep40 | Self::Wep40StaticKey => CipherIndex::Wep40,
            Self::Wep104 | Self::Wep104StaticKey => CipherIndex::Wep104,
            Self::Tkip => CipherIndex::Tkip,
            Self::AesCcmp => CipherIndex::Ccmp,
            Self::AesCcmp256 => CipherIndex::Ccmp256,
            Self::AesGcmp => CipherIndex::Gcmp128,
            Self::AesGcmp256 => CipherIndex::Gcmp256,
            Self::Wpi => CipherIndex::Wpi,
        }
    }

    /// Map a table row back to the dynamic-key encryption type.
    pub fn from_cipher_index(index: CipherIndex) -> Option<Self> {
        match index {
            CipherIndex::Wep40 => Some(Self::Wep40),
            CipherIndex::Wep104 => Some(Self::Wep104),
            CipherIndex::Tkip => Some(Self::Tkip),
            CipherIndex::Ccmp => Some(Self::AesCcmp),
            CipherIndex::Ccmp256 => Some(Self::AesCcmp256),
            CipherIndex::Gcmp128 => Some(Self::AesGcmp),
            CipherIndex::Gcmp256 => Some(Self::AesGcmp256),
            CipherIndex::Wpi => Some(Self::Wpi),
            CipherIndex::Reserved | CipherIndex::UseGroup | CipherIndex::BipCmac128 => None,
        }
    }

    pub fn is_static_wep(&self) -> bool {
        matches!(self, Self::Wep40StaticKey | Self::Wep104StaticKey)
    }

    pub fn is_dynamic_wep(&self) -> bool {
        matches!(self, Self::Wep40 | Self::Wep104)
    }
}

/// Local management frame protection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfpPolicy {
    pub enabled: bool,
    pub required: bool,
    pub capable: bool,
}

/// Everything the negotiator needs from the connection profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityProfile {
    /// Allowed authentication types, in the caller's order
    pub auth_types: Vec<AuthType>,
    pub unicast: EncryptionType,
    /// Allowed group ciphers. Empty accepts any group cipher the AP offers.
    pub multicast: Vec<EncryptionType>,
    /// `None` skips the PMF compatibility check entirely
    pub mfp: Option<MfpPolicy>,
}

impl SecurityProfile {
    /// Open system, no encryption
    pub fn open() -> Self {
        Self {
            auth_types: vec![AuthType::Open],
            unicast: EncryptionType::None,
            multicast: vec![EncryptionType::None],
            mfp: None,
        }
    }

    /// WPA2-Personal with CCMP
    pub fn rsn_psk() -> Self {
        Self {
            auth_types: vec![AuthType::RsnPsk],
            unicast: EncryptionType::AesCcmp,
            multicast: vec![EncryptionType::AesCcmp],
            mfp: None,
        }
    }
}

impl Default for SecurityProfile {
    fn default() -> Self {
        Self::open()
    }
}
