//! Seams to the layers around the state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sirius_csr::MacAddress;

use crate::channel::OperatingChannel;
use crate::dfs::NolRecord;
use crate::error::Result;
use crate::event::SapNotification;
use crate::session::SessionId;

/// Application-layer receiver of SoftAP notifications
pub trait EventSink: Send {
    fn notify(&mut self, session: SessionId, notification: SapNotification);

    /// NOL state persisted by the application, used to seed the table
    fn stored_nol(&mut self) -> Vec<NolRecord> {
        Vec::new()
    }
}

/// Active or passive probing on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanKind {
    Active,
    /// Required on DFS channels: no transmission before CAC
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanChannel {
    pub channel: u8,
    pub kind: ScanKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub channels: Vec<ScanChannel>,
}

/// Parameters of a start-BSS command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartBssParams {
    pub ssid: String,
    pub bssid: MacAddress,
    pub channel: OperatingChannel,
    pub hidden: bool,
    pub beacon_interval: u16,
    pub dtim_period: u8,
    pub max_clients: u32,
    /// At least one sub-channel is DFS
    pub dfs: bool,
}

/// Commands issued to the lower MAC/firmware layer.
///
/// Completions come back later as `SapEvent`s. An `Err` here means the
/// command was not accepted at all.
pub trait LowerLayer: Send {
    fn open_session(&mut self, session: SessionId) -> Result<()>;
    fn close_session(&mut self, session: SessionId) -> Result<()>;
    fn request_scan(&mut self, session: SessionId, request: &ScanRequest) -> Result<()>;
    fn start_bss(&mut self, session: SessionId, params: &StartBssParams) -> Result<()>;
    fn stop_bss(&mut self, session: SessionId) -> Result<()>;
    fn change_channel(&mut self, session: SessionId, target: &OperatingChannel) -> Result<()>;
    fn send_csa(&mut self, session: SessionId, target: &OperatingChannel) -> Result<()>;
    /// Begin beaconing on a BSS that was held silent for its CAC
    fn start_beacon(&mut self, session: SessionId) -> Result<()>;
}

/// The single CAC timer shared by all sessions. Expiry must be delivered
/// back to the controller as a CAC-timer-expired event.
pub trait CacTimer: Send {
    fn arm(&mut self, duration: Duration);
    fn disarm(&mut self);
}
