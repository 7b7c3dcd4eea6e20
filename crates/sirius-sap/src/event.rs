//! Inputs to the state machine and notifications out of it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sirius_csr::{BssDescriptor, MacAddress};

use crate::channel::{ChannelWidth, OperatingChannel};
use crate::dfs::NolRecord;

/// Events driving a session's state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SapEvent {
    StartRequest,
    /// Enter CAC directly on a known channel (another session already chose it)
    CacStartRequest { target: OperatingChannel },
    ScanComplete {
        success: bool,
        results: Vec<BssDescriptor>,
    },
    ChannelSelectionFailed,
    StartSuccess,
    StartFailure { status: u16 },
    StopRequest,
    CacTimerExpired,
    RadarDetected { channels: Vec<u8> },
    /// The channel switch announcement has been transmitted
    CsaTxComplete,
    ChannelChangeRequest { target: OperatingChannel },
    OperatingChannelChanged { channel: OperatingChannel },
    /// The BSS has stopped and the interface can be torn down
    ReadyForConnections,
    StationAssociated {
        mac: MacAddress,
        aid: u16,
        ies: Vec<u8>,
    },
    StationDisassociated { mac: MacAddress, reason: u16 },
}

impl SapEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SapEvent::StartRequest => "start-request",
            SapEvent::CacStartRequest { .. } => "cac-start-request",
            SapEvent::ScanComplete { .. } => "scan-complete",
            SapEvent::ChannelSelectionFailed => "channel-selection-failed",
            SapEvent::StartSuccess => "start-success",
            SapEvent::StartFailure { .. } => "start-failure",
            SapEvent::StopRequest => "stop-request",
            SapEvent::CacTimerExpired => "cac-timer-expired",
            SapEvent::RadarDetected { .. } => "radar-detected",
            SapEvent::CsaTxComplete => "csa-tx-complete",
            SapEvent::ChannelChangeRequest { .. } => "channel-change-request",
            SapEvent::OperatingChannelChanged { .. } => "operating-channel-changed",
            SapEvent::ReadyForConnections => "ready-for-connections",
            SapEvent::StationAssociated { .. } => "station-associated",
            SapEvent::StationDisassociated { .. } => "station-disassociated",
        }
    }
}

/// Status carried in start/stop completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SapStatus {
    Success,
    Failure,
}

/// Notifications delivered to the application layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SapNotification {
    StartBssComplete {
        status: SapStatus,
        bssid: MacAddress,
        channel: Option<OperatingChannel>,
    },
    StopBssComplete { status: SapStatus },
    AssocIndication {
        mac: MacAddress,
        aid: u16,
        ies: Vec<u8>,
    },
    Disassociated { mac: MacAddress, reason: u16 },
    DfsCacStart {
        channel: OperatingChannel,
        duration: Duration,
    },
    DfsCacEnd { channel: OperatingChannel },
    RadarDetected { channels: Vec<u8> },
    NoChannelAvailable,
    AcsChannelSelected {
        primary: u8,
        secondary: Option<u8>,
        width: ChannelWidth,
        center: u8,
    },
    ChannelChanged { channel: OperatingChannel },
    ChannelSwitchAnnounced { target: OperatingChannel },
    /// Ask the application for its stored NOL
    NolGet,
    /// The NOL changed; the application may persist it
    NolSet { records: Vec<NolRecord> },
}

impl SapNotification {
    pub fn kind(&self) -> &'static str {
        match self {
            SapNotification::StartBssComplete { .. } => "start-bss-complete",
            SapNotification::StopBssComplete { .. } => "stop-bss-complete",
            SapNotification::AssocIndication { .. } => "assoc-indication",
            SapNotification::Disassociated { .. } => "disassociated",
            SapNotification::DfsCacStart { .. } => "dfs-cac-start",
            SapNotification::DfsCacEnd { .. } => "dfs-cac-end",
            SapNotification::RadarDetected { .. } => "radar-detected",
            SapNotification::NoChannelAvailable => "no-channel-available",
            SapNotification::AcsChannelSelected { .. } => "acs-channel-selected",
            SapNotification::ChannelChanged { .. } => "channel-changed",
            SapNotification::ChannelSwitchAnnounced { .. } => "channel-switch-announced",
            SapNotification::NolGet => "nol-get",
            SapNotification::NolSet { .. } => "nol-set",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BondingState;

    #[test]
    fn test_notification_json_shape() {
        let n = SapNotification::DfsCacStart {
            channel: OperatingChannel {
                channel: 52,
                width: ChannelWidth::Mhz20,
                bonding: BondingState::None,
            },
            duration: Duration::from_secs(60),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["DfsCacStart"]["channel"]["channel"], 52);
        assert_eq!(json["DfsCacStart"]["duration"]["secs"], 60);
        let back: SapNotification = serde_json::from_value(json).unwrap();
        assert_eq!(back, n);
    }
}
