//! Matching a connection profile against the security a BSS advertises.
//!
//! Each element family (RSN, WPA, WAPI) is tried independently; legacy
//! open and WEP profiles are handled without any element. Every mismatch is
//! a plain `None`: the BSS is excluded, nothing is escalated.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ie::{BssSecurity, RsnCapabilities, RsnElement, WapiElement, WpaElement};
use crate::oui::{cipher_index, match_akm, match_cipher, AkmSuite, CipherIndex, Oui, SuiteFamily};
use crate::profile::{AuthType, EncryptionType, MfpPolicy, SecurityProfile};

/// The parameter set a successful negotiation settles on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiatedSecurity {
    pub auth_type: AuthType,
    pub unicast_cipher: EncryptionType,
    pub multicast_cipher: EncryptionType,
    pub mfp_capable: bool,
    pub mfp_required: bool,
    /// RSN capability bits, present only when RSN was negotiated
    pub rsn_capabilities: Option<RsnCapabilities>,
}

/// AKM precedence for RSN: fast transition, then CCKM, then plain RSN,
/// then the SHA-256 variants and SAE/OWE.
const RSN_AKM_PRECEDENCE: &[(AuthType, AkmSuite)] = &[
    (AuthType::FtRsn, AkmSuite::FtIeee8021x),
    (AuthType::FtRsnPsk, AkmSuite::FtPsk),
    (AuthType::FtSae, AkmSuite::FtSae),
    (AuthType::CckmRsn, AkmSuite::Cckm),
    (AuthType::Rsn, AkmSuite::Ieee8021x),
    (AuthType::RsnPsk, AkmSuite::Psk),
    (AuthType::Rsn8021xSha256, AkmSuite::Ieee8021xSha256),
    (AuthType::RsnPskSha256, AkmSuite::PskSha256),
    (AuthType::Sae, AkmSuite::Sae),
    (AuthType::Owe, AkmSuite::Owe),
    (AuthType::Osen, AkmSuite::Osen),
];

const WPA_AKM_PRECEDENCE: &[(AuthType, AkmSuite)] = &[
    (AuthType::CckmWpa, AkmSuite::Cckm),
    (AuthType::Wpa, AkmSuite::Ieee8021x),
    (AuthType::WpaPsk, AkmSuite::Psk),
];

const WAPI_AKM_PRECEDENCE: &[(AuthType, AkmSuite)] = &[
    (AuthType::WapiCert, AkmSuite::WapiCert),
    (AuthType::WapiPsk, AkmSuite::WapiPsk),
];

/// Negotiate `profile` against `bss`.
///
/// Returns `None` if the BSS is not joinable with this profile.
pub fn negotiate(profile: &SecurityProfile, bss: &BssSecurity) -> Option<NegotiatedSecurity> {
    let result = match profile.unicast {
        EncryptionType::None => negotiate_open(profile, bss),
        EncryptionType::Wep40StaticKey | EncryptionType::Wep104StaticKey => {
            negotiate_static_wep(profile, bss)
        }
        EncryptionType::Wpi => bss
            .wapi
            .as_ref()
            .and_then(|wapi| negotiate_wapi(profile, wapi)),
        _ => {
            // Dynamic WEP is only meaningful on a privacy-enabled BSS
            if profile.unicast.is_dynamic_wep() && !bss.privacy {
                None
            } else {
                bss.rsn
                    .as_ref()
                    .and_then(|rsn| negotiate_rsn(profile, rsn))
                    .or_else(|| bss.wpa.as_ref().and_then(|wpa| negotiate_wpa(profile, wpa)))
            }
        }
    };

    match &result {
        Some(n) => trace!(
            target: "csr",
            auth = ?n.auth_type,
            unicast = ?n.unicast_cipher,
            multicast = ?n.multicast_cipher,
            "security negotiated"
        ),
        None => trace!(target: "csr", unicast = ?profile.unicast, "security mismatch"),
    }
    result
}

/// Open profile: joinable only when the BSS does not set the privacy bit.
fn negotiate_open(profile: &SecurityProfile, bss: &BssSecurity) -> Option<NegotiatedSecurity> {
    if bss.privacy {
        return None;
    }
    let auth_type = legacy_auth(profile)?;
    Some(NegotiatedSecurity {
        auth_type,
        unicast_cipher: EncryptionType::None,
        multicast_cipher: EncryptionType::None,
        mfp_capable: false,
        mfp_required: false,
        rsn_capabilities: None,
    })
}

/// Static WEP: the BSS sets privacy and carries no RSN/WPA element.
fn negotiate_static_wep(profile: &SecurityProfile, bss: &BssSecurity) -> Option<NegotiatedSecurity> {
    if !bss.privacy || bss.rsn.is_some() || bss.wpa.is_some() {
        return None;
    }
    let auth_type = legacy_auth(profile)?;
    let cipher = profile.unicast;
    if !profile.multicast.is_empty() && !profile.multicast.contains(&cipher) {
        return None;
    }
    Some(NegotiatedSecurity {
        auth_type,
        unicast_cipher: cipher,
        multicast_cipher: cipher,
        mfp_capable: false,
        mfp_required: false,
        rsn_capabilities: None,
    })
}

/// First legacy auth type in the caller's list. An empty list means open.
fn legacy_auth(profile: &SecurityProfile) -> Option<AuthType> {
    if profile.auth_types.is_empty() {
        return Some(AuthType::Open);
    }
    profile.auth_types.iter().copied().find(AuthType::is_legacy)
}

/// Unicast match, honouring the "use group cipher" pairwise selector.
fn unicast_matches(family: SuiteFamily, wanted: CipherIndex, pairwise: &[Oui], group: &Oui) -> bool {
    if match_cipher(family, pairwise, wanted).is_some() {
        return true;
    }
    match_cipher(family, pairwise, CipherIndex::UseGroup).is_some()
        && match_cipher(family, std::slice::from_ref(group), wanted).is_some()
}

/// First entry of the caller's multicast list the AP's group cipher matches.
fn multicast_match(
    family: SuiteFamily,
    accepted: &[EncryptionType],
    group: &Oui,
) -> Option<EncryptionType> {
    if accepted.is_empty() {
        return EncryptionType::from_cipher_index(cipher_index(family, group));
    }
    accepted
        .iter()
        .copied()
        .find(|mc| match_cipher(family, std::slice::from_ref(group), mc.cipher_index()).is_some())
}

/// First auth type in caller order with any matching AKM.
fn auth_match(
    family: SuiteFamily,
    precedence: &[(AuthType, AkmSuite)],
    accepted: &[AuthType],
    akms: &[Oui],
) -> Option<AuthType> {
    accepted.iter().copied().find(|auth| {
        precedence
            .iter()
            .filter(|(candidate, _)| candidate == auth)
            .any(|(_, akm)| match_akm(family, akms, *akm).is_some())
    })
}

fn negotiate_rsn(profile: &SecurityProfile, rsn: &RsnElement) -> Option<NegotiatedSecurity> {
    let family = SuiteFamily::Rsn;
    if !unicast_matches(family, profile.unicast.cipher_index(), &rsn.pairwise_ciphers, &rsn.group_cipher) {
        return None;
    }
    let multicast_cipher = multicast_match(family, &profile.multicast, &rsn.group_cipher)?;
    let auth_type = auth_match(family, RSN_AKM_PRECEDENCE, &profile.auth_types, &rsn.akm_suites)?;

    let caps = rsn.capabilities;
    if let Some(policy) = profile.mfp {
        if !mfp_compatible(&policy, caps.mfp_capable(), caps.mfp_required()) {
            trace!(target: "csr", ?policy, caps = caps.0, "PMF policy mismatch");
            return None;
        }
    }

    Some(NegotiatedSecurity {
        auth_type,
        unicast_cipher: profile.unicast,
        multicast_cipher,
        mfp_capable: caps.mfp_capable(),
        mfp_required: caps.mfp_required(),
        rsn_capabilities: Some(caps),
    })
}

fn negotiate_wpa(profile: &SecurityProfile, wpa: &WpaElement) -> Option<NegotiatedSecurity> {
    let family = SuiteFamily::Wpa;
    if !unicast_matches(family, profile.unicast.cipher_index(), &wpa.unicast_ciphers, &wpa.multicast_cipher) {
        return None;
    }
    let multicast_cipher = multicast_match(family, &profile.multicast, &wpa.multicast_cipher)?;
    let auth_type = auth_match(family, WPA_AKM_PRECEDENCE, &profile.auth_types, &wpa.auth_suites)?;

    Some(NegotiatedSecurity {
        auth_type,
        unicast_cipher: profile.unicast,
        multicast_cipher,
        mfp_capable: false,
        mfp_required: false,
        rsn_capabilities: None,
    })
}

fn negotiate_wapi(profile: &SecurityProfile, wapi: &WapiElement) -> Option<NegotiatedSecurity> {
    let family = SuiteFamily::Wapi;
    match_cipher(family, &wapi.unicast_ciphers, CipherIndex::Wpi)?;
    let multicast_cipher = multicast_match(family, &profile.multicast, &wapi.multicast_cipher)?;
    let auth_type = auth_match(family, WAPI_AKM_PRECEDENCE, &profile.auth_types, &wapi.akm_suites)?;

    Some(NegotiatedSecurity {
        auth_type,
        unicast_cipher: EncryptionType::Wpi,
        multicast_cipher,
        mfp_capable: false,
        mfp_required: false,
        rsn_capabilities: None,
    })
}

/// PMF compatibility between the local policy and the AP's MFPC/MFPR bits.
///
/// The third rule rejects a mutually capable pair when PMF is not enabled
/// locally. That is kept as is.
pub fn mfp_compatible(policy: &MfpPolicy, ap_capable: bool, ap_required: bool) -> bool {
    if policy.enabled && policy.required && !ap_capable {
        return false;
    }
    if !policy.capable && ap_required {
        return false;
    }
    if !policy.enabled && policy.capable && ap_capable {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ie::tests::{rsn_body, wpa_body};
    use crate::ie::{parse_rsn_ie, parse_wpa_ie};

    fn rsn_bss(pairwise: &[u8], akms: &[u8], caps: u16) -> BssSecurity {
        BssSecurity {
            privacy: true,
            rsn: Some(parse_rsn_ie(&rsn_body(0x04, pairwise, akms, caps)).unwrap()),
            ..BssSecurity::default()
        }
    }

    fn psk_profile(auth_types: Vec<AuthType>) -> SecurityProfile {
        SecurityProfile {
            auth_types,
            unicast: EncryptionType::AesCcmp,
            multicast: vec![EncryptionType::AesCcmp],
            mfp: None,
        }
    }

    #[test]
    fn test_caller_order_wins_over_ap_order() {
        // AP advertises FT-PSK before PSK
        let bss = rsn_bss(&[0x04], &[0x04, 0x02], 0);
        let profile = psk_profile(vec![AuthType::RsnPsk, AuthType::FtRsnPsk]);
        let n = negotiate(&profile, &bss).unwrap();
        assert_eq!(n.auth_type, AuthType::RsnPsk);

        let profile = psk_profile(vec![AuthType::FtRsnPsk, AuthType::RsnPsk]);
        assert_eq!(negotiate(&profile, &bss).unwrap().auth_type, AuthType::FtRsnPsk);
    }

    #[test]
    fn test_open_requires_privacy_clear() {
        let open = BssSecurity::default();
        let n = negotiate(&SecurityProfile::open(), &open).unwrap();
        assert_eq!(n.unicast_cipher, EncryptionType::None);

        let private = BssSecurity {
            privacy: true,
            ..BssSecurity::default()
        };
        assert!(negotiate(&SecurityProfile::open(), &private).is_none());
    }

    #[test]
    fn test_unicast_and_multicast_mismatch() {
        let bss = rsn_bss(&[0x02], &[0x02], 0);
        assert!(negotiate(&psk_profile(vec![AuthType::RsnPsk]), &bss).is_none());

        // Group cipher CCMP, caller only accepts TKIP multicast
        let bss = rsn_bss(&[0x04], &[0x02], 0);
        let mut profile = psk_profile(vec![AuthType::RsnPsk]);
        profile.multicast = vec![EncryptionType::Tkip];
        assert!(negotiate(&profile, &bss).is_none());

        // Empty list takes whatever group cipher the AP uses
        profile.multicast.clear();
        let n = negotiate(&profile, &bss).unwrap();
        assert_eq!(n.multicast_cipher, EncryptionType::AesCcmp);
    }

    #[test]
    fn test_use_group_cipher_pairwise() {
        let bss = rsn_bss(&[0x00], &[0x02], 0);
        assert!(negotiate(&psk_profile(vec![AuthType::RsnPsk]), &bss).is_some());
    }

    #[test]
    fn test_wpa_fallback() {
        let bss = BssSecurity {
            privacy: true,
            rsn: Some(parse_rsn_ie(&rsn_body(0x04, &[0x04], &[0x01], 0)).unwrap()),
            wpa: Some(parse_wpa_ie(&wpa_body(0x02, &[0x02], &[0x02])).unwrap()),
            wapi: None,
        };
        let profile = SecurityProfile {
            auth_types: vec![AuthType::RsnPsk, AuthType::WpaPsk],
            unicast: EncryptionType::Tkip,
            multicast: vec![EncryptionType::Tkip],
            mfp: None,
        };
        let n = negotiate(&profile, &bss).unwrap();
        assert_eq!(n.auth_type, AuthType::WpaPsk);
        assert!(n.rsn_capabilities.is_none());
    }

    #[test]
    fn test_static_wep() {
        let profile = SecurityProfile {
            auth_types: vec![AuthType::SharedKey],
            unicast: EncryptionType::Wep104StaticKey,
            multicast: vec![],
            mfp: None,
        };
        let wep = BssSecurity {
            privacy: true,
            ..BssSecurity::default()
        };
        assert_eq!(negotiate(&profile, &wep).unwrap().auth_type, AuthType::SharedKey);
        assert!(negotiate(&profile, &rsn_bss(&[0x04], &[0x02], 0)).is_none());
    }

    #[test]
    fn test_pmf_rules() {
        let strict = MfpPolicy {
            enabled: true,
            required: true,
            capable: true,
        };
        assert!(!mfp_compatible(&strict, false, false));
        assert!(mfp_compatible(&strict, true, true));

        let incapable = MfpPolicy::default();
        assert!(!mfp_compatible(&incapable, true, true));
        assert!(mfp_compatible(&incapable, true, false));

        let capable_not_enabled = MfpPolicy {
            enabled: false,
            required: false,
            capable: true,
        };
        assert!(!mfp_compatible(&capable_not_enabled, true, false));
        assert!(mfp_compatible(&capable_not_enabled, false, false));
    }

    #[test]
    fn test_pmf_applied_to_rsn() {
        // MFPC | MFPR
        let bss = rsn_bss(&[0x04], &[0x06], 0x00C0);
        let mut profile = psk_profile(vec![AuthType::RsnPskSha256]);
        let n = negotiate(&profile, &bss).unwrap();
        assert!(n.mfp_required && n.mfp_capable);

        profile.mfp = Some(MfpPolicy::default());
        assert!(negotiate(&profile, &bss).is_none());
    }
}
