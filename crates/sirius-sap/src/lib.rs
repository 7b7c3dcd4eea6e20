//! # sirius-sap
//!
//! SoftAP control for one radio: regulatory channel tables, DFS
//! non-occupancy tracking, leakage-aware channel selection and the SAP
//! state machine.
//!
//! ## Features
//!
//! - **Regulatory domains**: FCC, ETSI, MKK, CN, KR and world tables
//! - **DFS**: NOL with lazy expiry, CAC timing including weather channels
//! - **ACS**: NOL/leakage filtering, bonding groups, 80/40/20 MHz fallback
//! - **State machine**: multi-session SoftAP with a shared CAC
//! - **Runtime**: tokio actor with a queued CAC timer
//!
//! ## Example
//!
//! ```no_run
//! use sirius_sap::{SapConfig, SapEvent, SapRuntime, SessionConfig};
//! # use sirius_sap::{EventSink, LowerLayer};
//! # async fn run<S: EventSink + 'static, L: LowerLayer + 'static>(sink: S, lower: L) -> anyhow::Result<()> {
//! let root = std::path::Path::new("/var/lib/sirius");
//! let log_cfg = sirius_logging::read_config(root);
//! let _guards = sirius_logging::init("sirius-sap", root, &log_cfg)?;
//! let _watcher = sirius_logging::spawn_watcher(root)?;
//! sirius_logging::run_retention(root, &log_cfg)?;
//!
//! let config = SapConfig::from_env();
//! let domain = config.regulatory_domain()?;
//! let (runtime, handle) = SapRuntime::new(config, domain, sink, lower)?;
//! runtime.spawn();
//!
//! let id = handle.open_session(SessionConfig::default()).await?;
//! handle.dispatch(id, SapEvent::StartRequest).await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod dfs;
pub mod error;
pub mod event;
pub mod fsm;
pub mod leakage;
pub mod regulatory;
pub mod runtime;
pub mod select;
pub mod session;
pub mod sink;

pub use channel::{
    bonded_channels, center_channel, channel_to_frequency, secondary_channel, BondingState,
    ChannelWidth, OperatingChannel, WifiBand,
};
pub use config::SapConfig;
pub use dfs::{DfsTiming, DfsTracker, NolEntry, NolRecord, NolRecordState, NolState};
pub use error::{Result, SapError};
pub use event::{SapEvent, SapNotification, SapStatus};
pub use fsm::{CacRun, RegulatoryState, SapController};
pub use regulatory::{DfsRegion, RegChannel, RegulatoryDomain};
pub use runtime::{QueuedCacTimer, SapHandle, SapRuntime, SessionSnapshot};
pub use select::{group_by_bonding, AcsConfig, ChannelSelector, SelectionPolicy};
pub use session::{ChannelRequest, SapContext, SapState, SessionConfig, SessionId};
pub use sink::{CacTimer, EventSink, LowerLayer, ScanChannel, ScanKind, ScanRequest, StartBssParams};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
