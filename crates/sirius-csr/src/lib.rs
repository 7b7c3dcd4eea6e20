//! # sirius-csr
//!
//! Connection/roam utilities shared by the station and SoftAP paths.
//!
//! ## Features
//!
//! - **Suite tables**: RSN, WPA and WAPI cipher/AKM selectors
//! - **Element parsing**: RSN, WPA and WAPI information elements
//! - **Security negotiation**: profile vs. advertised security, PMF policy
//! - **BSS matching**: SSID, BSSID, channel, PHY, rates, country, mobility domain
//!
//! ## Example
//!
//! ```no_run
//! use sirius_csr::{matches, BssDescriptor, CsrConfig, ScanFilter, SecurityProfile};
//!
//! fn usable(bss: &BssDescriptor) -> bool {
//!     let filter = ScanFilter {
//!         security: SecurityProfile::rsn_psk(),
//!         ..ScanFilter::default()
//!     };
//!     matches(bss, &filter, &CsrConfig::default())
//! }
//! ```

#![warn(clippy::all)]

pub mod bss;
pub mod config;
pub mod error;
pub mod ie;
pub mod mac;
pub mod negotiate;
pub mod oui;
pub mod profile;
pub mod rates;

pub use bss::{
    match_bss, matches, BssDescriptor, BssMatch, BssTypeFilter, CapabilityInfo, MobilityDomain,
    PhyModes, ScanFilter, Ssid,
};
pub use config::{CsrConfig, QosMode};
pub use error::{CsrError, Result};
pub use ie::{BssSecurity, RsnCapabilities, RsnElement, WapiElement, WpaElement};
pub use mac::MacAddress;
pub use negotiate::{mfp_compatible, negotiate, NegotiatedSecurity};
pub use oui::{AkmSuite, CipherIndex, Oui, SuiteFamily};
pub use profile::{AuthType, EncryptionType, MfpPolicy, SecurityProfile};
pub use rates::RateFeatures;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
