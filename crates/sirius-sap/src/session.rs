//! Per-interface SoftAP configuration and state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sirius_csr::MacAddress;

use crate::channel::{ChannelWidth, OperatingChannel};
use crate::error::{Result, SapError};
use crate::regulatory::RegulatoryDomain;
use crate::select::AcsConfig;

/// Session handle, unique within one controller
pub type SessionId = u8;

/// SoftAP state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SapState {
    Disconnected,
    ChannelSelect,
    DfsCacWait,
    Starting,
    Started,
    Disconnecting,
}

impl fmt::Display for SapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SapState::Disconnected => "DISCONNECTED",
            SapState::ChannelSelect => "CH_SELECT",
            SapState::DfsCacWait => "DFS_CAC_WAIT",
            SapState::Starting => "STARTING",
            SapState::Started => "STARTED",
            SapState::Disconnecting => "DISCONNECTING",
        };
        f.write_str(name)
    }
}

/// Configured channel: a fixed number or automatic selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelRequest {
    Auto,
    Fixed(u8),
}

/// SoftAP session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// SSID to broadcast
    pub ssid: String,
    pub bssid: MacAddress,
    pub channel: ChannelRequest,
    /// Widest width to operate at; also the fallback ceiling for ACS
    pub width: ChannelWidth,
    pub acs: AcsConfig,
    /// Hide SSID (don't broadcast in beacons)
    pub hidden: bool,
    /// Beacon interval in TU (default: 100)
    pub beacon_interval: u16,
    pub dtim_period: u8,
    /// Maximum number of clients (0 = unlimited)
    pub max_clients: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ssid: "sirius".to_string(),
            bssid: MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
            channel: ChannelRequest::Auto,
            width: ChannelWidth::Mhz20,
            acs: AcsConfig::default(),
            hidden: false,
            beacon_interval: 100,
            dtim_period: 2,
            max_clients: 0,
        }
    }
}

impl SessionConfig {
    /// Validate configuration against the regulatory domain
    pub fn validate(&self, domain: &RegulatoryDomain) -> Result<()> {
        if self.ssid.is_empty() || self.ssid.len() > 32 {
            return Err(SapError::config("SSID must be 1-32 characters"));
        }
        if self.bssid.is_multicast() || self.bssid.is_zero() {
            return Err(SapError::config(format!("BSSID {} is not a unicast address", self.bssid)));
        }
        if self.beacon_interval < 15 {
            return Err(SapError::config("Beacon interval must be at least 15 TU"));
        }
        if self.dtim_period == 0 {
            return Err(SapError::config("DTIM period must be at least 1"));
        }

        match self.channel {
            ChannelRequest::Fixed(channel) => {
                if !domain.contains(channel) {
                    return Err(SapError::invalid_channel(
                        channel,
                        format!("not allowed in {}", domain.country()),
                    ));
                }
            }
            ChannelRequest::Auto => {
                if self.acs.start_channel > self.acs.end_channel {
                    return Err(SapError::config(format!(
                        "ACS range {}-{} is empty",
                        self.acs.start_channel, self.acs.end_channel
                    )));
                }
                if !domain.channels().iter().any(|c| self.acs.contains(c.channel)) {
                    return Err(SapError::config(format!(
                        "ACS range {}-{} has no channel in {}",
                        self.acs.start_channel,
                        self.acs.end_channel,
                        domain.country()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Live state of one SoftAP session
#[derive(Debug, Clone)]
pub struct SapContext {
    pub(crate) id: SessionId,
    pub(crate) config: SessionConfig,
    pub(crate) state: SapState,
    /// Width cached on the first selection, the ceiling for every later one
    pub(crate) original_width: Option<ChannelWidth>,
    pub(crate) operating: Option<OperatingChannel>,
    /// Radar-driven relocation target, set until the switch completes
    pub(crate) pending_change: Option<OperatingChannel>,
    pub(crate) cac_start_notified: bool,
    pub(crate) cac_end_notified: bool,
    pub(crate) control_open: bool,
    pub(crate) stations: BTreeMap<MacAddress, u16>,
}

impl SapContext {
    pub(crate) fn new(id: SessionId, config: SessionConfig) -> Self {
        Self {
            id,
            config,
            state: SapState::Disconnected,
            original_width: None,
            operating: None,
            pending_change: None,
            cac_start_notified: false,
            cac_end_notified: false,
            control_open: false,
            stations: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SapState {
        self.state
    }

    pub fn operating(&self) -> Option<OperatingChannel> {
        self.operating
    }

    pub fn original_width(&self) -> Option<ChannelWidth> {
        self.original_width
    }

    pub fn pending_change(&self) -> Option<OperatingChannel> {
        self.pending_change
    }

    /// Associated stations and their AIDs
    pub fn stations(&self) -> &BTreeMap<MacAddress, u16> {
        &self.stations
    }

    /// Sub-channels in use, empty when not on a channel
    pub fn occupied_channels(&self) -> Vec<u8> {
        self.operating.map(|op| op.sub_channels()).unwrap_or_default()
    }

    /// Clear everything that belongs to one start/stop cycle
    pub(crate) fn reset_run(&mut self) {
        self.operating = None;
        self.pending_change = None;
        self.cac_start_notified = false;
        self.cac_end_notified = false;
        self.stations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_config() {
        let us = RegulatoryDomain::for_country("US").unwrap();
        assert!(SessionConfig::default().validate(&us).is_ok());

        let bad_ssid = SessionConfig {
            ssid: String::new(),
            ..SessionConfig::default()
        };
        assert!(bad_ssid.validate(&us).is_err());

        let ch13 = SessionConfig {
            channel: ChannelRequest::Fixed(13),
            ..SessionConfig::default()
        };
        assert!(matches!(
            ch13.validate(&us),
            Err(SapError::InvalidChannel { channel: 13, .. })
        ));

        let empty_range = SessionConfig {
            acs: AcsConfig::range(170, 180),
            ..SessionConfig::default()
        };
        assert!(empty_range.validate(&us).is_err());

        let multicast = SessionConfig {
            bssid: MacAddress::BROADCAST,
            ..SessionConfig::default()
        };
        assert!(multicast.validate(&us).is_err());
    }

    #[test]
    fn test_state_names() {
        assert_eq!(SapState::DfsCacWait.to_string(), "DFS_CAC_WAIT");
        assert_eq!(SapState::ChannelSelect.to_string(), "CH_SELECT");
    }
}
