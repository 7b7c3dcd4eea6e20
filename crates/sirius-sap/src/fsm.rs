//! SoftAP state machine.
//!
//! One `SapController` owns every AP session plus the regulatory state they
//! share (domain, NOL, the single CAC run). Events are queued and processed
//! to completion in FIFO order; handlers that need a follow-up transition
//! push an event back onto the same queue instead of recursing.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::channel::{secondary_channel, OperatingChannel};
use crate::config::SapConfig;
use crate::dfs::DfsTracker;
use crate::error::{Result, SapError};
use crate::event::{SapEvent, SapNotification, SapStatus};
use crate::leakage;
use crate::regulatory::RegulatoryDomain;
use crate::select::ChannelSelector;
use crate::session::{ChannelRequest, SapContext, SapState, SessionConfig, SessionId};
use crate::sink::{CacTimer, EventSink, LowerLayer, ScanChannel, ScanKind, ScanRequest, StartBssParams};

/// Status code carried by a start failure raised inside the controller
const LOCAL_FAILURE_STATUS: u16 = 1;

/// The CAC currently running on the radio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacRun {
    pub channel: u8,
    pub sub_channels: Vec<u8>,
    pub duration: Duration,
    pub started_at: Instant,
}

impl CacRun {
    /// True if `op` can share this run: all of its DFS sub-channels are
    /// being checked already.
    fn covers(&self, op: &OperatingChannel, domain: &RegulatoryDomain) -> bool {
        op.sub_channels()
            .iter()
            .filter(|c| domain.is_dfs(**c))
            .all(|c| self.sub_channels.contains(c))
    }
}

/// Regulatory state shared by every session of one radio
#[derive(Debug, Clone)]
pub struct RegulatoryState {
    domain: RegulatoryDomain,
    nol: DfsTracker,
    nol_initialized: bool,
    cac: Option<CacRun>,
    /// DFS channels whose CAC completed and that have seen no radar since
    cleared: BTreeSet<u8>,
}

impl RegulatoryState {
    fn new(domain: RegulatoryDomain, nol: DfsTracker) -> Self {
        Self {
            domain,
            nol,
            nol_initialized: false,
            cac: None,
            cleared: BTreeSet::new(),
        }
    }

    pub fn domain(&self) -> &RegulatoryDomain {
        &self.domain
    }

    pub fn nol(&self) -> &DfsTracker {
        &self.nol
    }

    pub fn cac(&self) -> Option<&CacRun> {
        self.cac.as_ref()
    }

    pub fn is_cleared(&self, channel: u8) -> bool {
        self.cleared.contains(&channel)
    }
}

/// Drives all SoftAP sessions of one radio.
pub struct SapController<S, L, T> {
    config: SapConfig,
    regulatory: RegulatoryState,
    sessions: BTreeMap<SessionId, SapContext>,
    sink: S,
    lower: L,
    timer: T,
    rng: StdRng,
    epoch: Instant,
    queue: VecDeque<(SessionId, SapEvent)>,
}

impl<S: EventSink, L: LowerLayer, T: CacTimer> SapController<S, L, T> {
    /// Build a controller for the domain named by `config.country`.
    pub fn new(config: SapConfig, sink: S, lower: L, timer: T) -> Result<Self> {
        let domain = config.regulatory_domain()?;
        Self::with_domain(config, domain, sink, lower, timer)
    }

    pub fn with_domain(
        config: SapConfig,
        domain: RegulatoryDomain,
        sink: S,
        lower: L,
        timer: T,
    ) -> Result<Self> {
        config.validate()?;
        domain.validate()?;
        leakage::validate_tables()?;

        // Sizing check only; the table is rebuilt on the first start so the
        // application gets its NOL-get request.
        let mut nol = DfsTracker::new(config.timing);
        nol.init_nol(&domain)?;

        info!(
            target: "sap",
            country = domain.country(),
            region = %domain.region(),
            max_sessions = config.max_sessions,
            "SAP controller ready"
        );
        Ok(Self {
            config,
            regulatory: RegulatoryState::new(domain, nol),
            sessions: BTreeMap::new(),
            sink,
            lower,
            timer,
            rng: StdRng::from_entropy(),
            epoch: Instant::now(),
            queue: VecDeque::new(),
        })
    }

    /// Replace the channel-selection PRNG with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &SapConfig {
        &self.config
    }

    pub fn regulatory(&self) -> &RegulatoryState {
        &self.regulatory
    }

    pub fn session(&self, id: SessionId) -> Option<&SapContext> {
        self.sessions.get(&id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &SapContext> {
        self.sessions.values()
    }

    pub fn state(&self, id: SessionId) -> Option<SapState> {
        self.sessions.get(&id).map(|ctx| ctx.state)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn lower(&self) -> &L {
        &self.lower
    }

    pub fn lower_mut(&mut self) -> &mut L {
        &mut self.lower
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Register a new AP session in `DISCONNECTED`.
    pub fn open_session(&mut self, config: SessionConfig) -> Result<SessionId> {
        if self.sessions.len() >= self.config.max_sessions {
            warn!(target: "sap", max = self.config.max_sessions, "session limit reached");
            return Err(SapError::SessionLimit {
                max: self.config.max_sessions,
            });
        }
        config.validate(&self.regulatory.domain)?;

        let id = (0..=SessionId::MAX)
            .find(|id| !self.sessions.contains_key(id))
            .ok_or(SapError::SessionLimit {
                max: self.config.max_sessions,
            })?;
        info!(target: "sap", session = id, ssid = %config.ssid, "session opened");
        self.sessions.insert(id, SapContext::new(id, config));
        Ok(id)
    }

    /// Forget a session. Only allowed once it is back in `DISCONNECTED`.
    pub fn close_session(&mut self, id: SessionId) -> Result<()> {
        let ctx = self.sessions.get(&id).ok_or_else(|| {
            warn!(target: "sap", session = id, "close on unknown session");
            SapError::invalid_session(id)
        })?;
        if ctx.state != SapState::Disconnected {
            return Err(SapError::SessionBusy {
                session: id,
                state: ctx.state.to_string(),
            });
        }
        self.sessions.remove(&id);
        info!(target: "sap", session = id, "session closed");
        Ok(())
    }

    /// Switch regulatory domain. Resets the NOL and every CAC result.
    pub fn set_regulatory_domain(&mut self, domain: RegulatoryDomain) -> Result<()> {
        domain.validate()?;
        if let Some(busy) = self
            .sessions
            .values()
            .find(|ctx| ctx.state != SapState::Disconnected)
        {
            return Err(SapError::SessionBusy {
                session: busy.id,
                state: busy.state.to_string(),
            });
        }
        let mut nol = DfsTracker::new(self.config.timing);
        nol.init_nol(&domain)?;
        info!(target: "sap", country = domain.country(), "regulatory domain changed");
        self.regulatory = RegulatoryState::new(domain, nol);
        Ok(())
    }

    pub fn dispatch(&mut self, id: SessionId, event: SapEvent) -> Result<()> {
        self.dispatch_at(id, event, Instant::now())
    }

    /// Queue `event` for session `id` and run the queue dry.
    pub fn dispatch_at(&mut self, id: SessionId, event: SapEvent, now: Instant) -> Result<()> {
        if !self.sessions.contains_key(&id) {
            warn!(target: "sap", session = id, event = event.name(), "event for unknown session");
            return Err(SapError::invalid_session(id));
        }
        self.queue.push_back((id, event));
        self.drain(now);
        Ok(())
    }

    /// Deliver an expiry of the shared CAC timer.
    pub fn cac_timer_expired(&mut self, now: Instant) {
        self.on_cac_expired(now);
        self.drain(now);
    }

    fn drain(&mut self, now: Instant) {
        while let Some((id, event)) = self.queue.pop_front() {
            self.handle(id, event, now);
        }
    }

    fn handle(&mut self, id: SessionId, event: SapEvent, now: Instant) {
        let Some(state) = self.state(id) else {
            debug!(target: "sap", session = id, "dropping event for closed session");
            return;
        };
        debug!(target: "sap", session = id, %state, event = event.name(), "handling event");

        match (state, event) {
            (SapState::Disconnected, SapEvent::StartRequest) => self.on_start_request(id, now),
            (SapState::Disconnected, SapEvent::CacStartRequest { target }) => {
                self.on_cac_start_request(id, target, now)
            }
            (SapState::ChannelSelect, SapEvent::ScanComplete { success, results }) => {
                debug!(target: "sap", session = id, bss_count = results.len(), "scan complete");
                self.on_scan_complete(id, success, now)
            }
            (SapState::ChannelSelect, SapEvent::ChannelSelectionFailed)
            | (SapState::ChannelSelect, SapEvent::StopRequest)
            | (SapState::Starting, SapEvent::StopRequest) => self.fail_to_disconnected(id),
            (SapState::Starting, SapEvent::StartFailure { status }) => {
                warn!(target: "sap", session = id, status, "start BSS failed");
                self.fail_to_disconnected(id)
            }
            (SapState::Starting, SapEvent::StartSuccess) => self.on_start_success(id, now),
            (SapState::Starting, SapEvent::OperatingChannelChanged { channel }) => {
                self.on_channel_changed(id, channel, now)
            }
            (SapState::DfsCacWait, SapEvent::CacTimerExpired) => self.on_cac_expired(now),
            (SapState::DfsCacWait, SapEvent::RadarDetected { channels })
            | (SapState::Started, SapEvent::RadarDetected { channels }) => {
                self.on_radar(id, channels, now)
            }
            (SapState::DfsCacWait, SapEvent::StopRequest) => self.on_cac_stop(id),
            (SapState::Started, SapEvent::StopRequest) => self.begin_stop(id),
            (SapState::Started, SapEvent::CsaTxComplete) => self.on_csa_complete(id),
            (SapState::Started, SapEvent::StationAssociated { mac, aid, ies }) => {
                if let Some(ctx) = self.sessions.get_mut(&id) {
                    ctx.stations.insert(mac, aid);
                }
                info!(target: "sap", session = id, %mac, aid, "station associated");
                self.sink
                    .notify(id, SapNotification::AssocIndication { mac, aid, ies });
            }
            (SapState::Started, SapEvent::StationDisassociated { mac, reason }) => {
                if let Some(ctx) = self.sessions.get_mut(&id) {
                    ctx.stations.remove(&mac);
                }
                info!(target: "sap", session = id, %mac, reason, "station disassociated");
                self.sink
                    .notify(id, SapNotification::Disassociated { mac, reason });
            }
            (SapState::Disconnecting, SapEvent::ChannelChangeRequest { target }) => {
                self.on_channel_change_request(id, target)
            }
            (SapState::Disconnecting, event @ SapEvent::OperatingChannelChanged { .. }) => {
                // The switch completes through STARTING even though the
                // session is labelled as disconnecting.
                let pending = self
                    .sessions
                    .get(&id)
                    .and_then(|ctx| ctx.pending_change)
                    .is_some();
                if pending {
                    self.set_state(id, SapState::Starting);
                    self.queue.push_front((id, event));
                } else {
                    debug!(target: "sap", session = id, "channel change without a pending move");
                }
            }
            (SapState::Disconnecting, SapEvent::ReadyForConnections) => self.on_stopped(id),
            (state, event) => {
                debug!(target: "sap", session = id, %state, event = event.name(), "event ignored");
            }
        }
    }

    fn set_state(&mut self, id: SessionId, next: SapState) {
        if let Some(ctx) = self.sessions.get_mut(&id) {
            if ctx.state != next {
                info!(target: "sap", session = id, from = %ctx.state, to = %next, "state change");
                ctx.state = next;
            }
        }
    }

    fn tick(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.epoch).as_millis() as u64
    }

    fn bssid(&self, id: SessionId) -> Option<sirius_csr::MacAddress> {
        self.sessions.get(&id).map(|ctx| ctx.config.bssid)
    }

    fn open_control(&mut self, id: SessionId) -> Result<()> {
        let open = self
            .sessions
            .get(&id)
            .map(|ctx| ctx.control_open)
            .unwrap_or(false);
        if open {
            return Ok(());
        }
        self.lower.open_session(id)?;
        if let Some(ctx) = self.sessions.get_mut(&id) {
            ctx.control_open = true;
        }
        Ok(())
    }

    fn close_control(&mut self, id: SessionId) {
        let Some(ctx) = self.sessions.get_mut(&id) else {
            return;
        };
        if !ctx.control_open {
            return;
        }
        ctx.control_open = false;
        if let Err(err) = self.lower.close_session(id) {
            warn!(target: "sap", session = id, error = %err, "closing control session failed");
        }
    }

    /// Build the NOL on first use and ask the application for stored state.
    fn ensure_nol(&mut self, id: SessionId, now: Instant) -> Result<()> {
        if self.regulatory.nol_initialized {
            return Ok(());
        }
        self.regulatory.nol.init_nol(&self.regulatory.domain)?;
        self.sink.notify(id, SapNotification::NolGet);
        let stored = self.sink.stored_nol();
        if !stored.is_empty() {
            let applied = self.regulatory.nol.seed(&stored, now);
            info!(target: "dfs", applied, "NOL seeded from stored state");
        }
        self.regulatory.nol_initialized = true;
        Ok(())
    }

    fn scan_request(&self, id: SessionId) -> ScanRequest {
        let domain = &self.regulatory.domain;
        let kind = |channel: u8| ScanChannel {
            channel,
            kind: if domain.is_dfs(channel) {
                ScanKind::Passive
            } else {
                ScanKind::Active
            },
        };
        let channels = match self.sessions.get(&id).map(|ctx| &ctx.config) {
            Some(SessionConfig {
                channel: ChannelRequest::Fixed(channel),
                ..
            }) => vec![kind(*channel)],
            Some(config) => domain
                .channels()
                .iter()
                .filter(|c| config.acs.contains(c.channel))
                .map(|c| kind(c.channel))
                .collect(),
            None => Vec::new(),
        };
        ScanRequest { channels }
    }

    fn on_start_request(&mut self, id: SessionId, now: Instant) {
        if let Err(err) = self.open_control(id) {
            warn!(target: "sap", session = id, error = %err, "opening control session failed");
            self.fail_to_disconnected(id);
            return;
        }
        if let Err(err) = self.ensure_nol(id, now) {
            warn!(target: "dfs", session = id, error = %err, "NOL initialisation failed");
            self.fail_to_disconnected(id);
            return;
        }
        self.set_state(id, SapState::ChannelSelect);

        let request = self.scan_request(id);
        if let Err(err) = self.lower.request_scan(id, &request) {
            warn!(target: "sap", session = id, error = %err, "scan request failed");
            self.queue.push_back((id, SapEvent::ChannelSelectionFailed));
        }
    }

    fn on_cac_start_request(&mut self, id: SessionId, target: OperatingChannel, now: Instant) {
        if let Err(err) = self.open_control(id) {
            warn!(target: "sap", session = id, error = %err, "opening control session failed");
            self.fail_to_disconnected(id);
            return;
        }
        if let Err(err) = self.ensure_nol(id, now) {
            warn!(target: "dfs", session = id, error = %err, "NOL initialisation failed");
            self.fail_to_disconnected(id);
            return;
        }
        if !self.channel_usable(&target, now) {
            warn!(
                target: "dfs",
                session = id,
                channel = target.channel,
                "requested CAC channel is barred"
            );
            self.sink.notify(id, SapNotification::NoChannelAvailable);
            self.fail_to_disconnected(id);
            return;
        }
        if let Some(ctx) = self.sessions.get_mut(&id) {
            ctx.original_width.get_or_insert(ctx.config.width);
            ctx.operating = Some(target);
        }
        if !self.needs_cac(&target) {
            self.begin_start_bss(id, target);
            return;
        }

        let Some(params) = self.start_params(id, target) else {
            return;
        };
        if let Err(err) = self.lower.start_bss(id, &params) {
            warn!(target: "sap", session = id, error = %err, "start BSS rejected");
            self.fail_to_disconnected(id);
            return;
        }
        self.start_cac(id, target, now);
    }

    fn on_scan_complete(&mut self, id: SessionId, success: bool, now: Instant) {
        if !success {
            warn!(target: "sap", session = id, "scan failed");
            self.queue.push_back((id, SapEvent::ChannelSelectionFailed));
            return;
        }
        let Some((request, ceiling)) = self.sessions.get_mut(&id).map(|ctx| {
            let ceiling = *ctx.original_width.get_or_insert(ctx.config.width);
            (ctx.config.channel, ceiling)
        }) else {
            return;
        };

        let target = match request {
            ChannelRequest::Fixed(channel) => {
                let op = OperatingChannel::resolve(channel, ceiling);
                if self.channel_usable(&op, now) {
                    Some(op)
                } else {
                    warn!(target: "acs", session = id, channel, "configured channel unusable, running ACS");
                    self.select_for(id, now)
                }
            }
            ChannelRequest::Auto => self.select_for(id, now),
        };

        match target {
            Some(op) => self.begin_start_bss(id, op),
            None => {
                warn!(target: "acs", session = id, "no channel available");
                self.sink.notify(id, SapNotification::NoChannelAvailable);
                self.queue.push_back((id, SapEvent::ChannelSelectionFailed));
            }
        }
    }

    /// Re-check a chosen channel against the NOL and the leakage matrices.
    fn channel_usable(&mut self, op: &OperatingChannel, now: Instant) -> bool {
        let subs = op.sub_channels();
        if !subs.iter().all(|c| self.regulatory.domain.contains(*c)) {
            return false;
        }
        if !self.regulatory.nol.is_available(op.channel, op.bonding, now) {
            return false;
        }
        let nol = self.regulatory.nol.unavailable_channels(now);
        !subs
            .iter()
            .any(|c| leakage::leaks_onto_nol(op.width, &nol, *c))
    }

    fn select_for(&mut self, id: SessionId, now: Instant) -> Option<OperatingChannel> {
        let (acs, ceiling) = self.sessions.get_mut(&id).map(|ctx| {
            let ceiling = *ctx.original_width.get_or_insert(ctx.config.width);
            (ctx.config.acs.clone(), ceiling)
        })?;
        let tick = self.tick(now);

        let mut selector = ChannelSelector::new(
            &self.regulatory.domain,
            &mut self.regulatory.nol,
            &self.config.policy,
        );
        let selected = selector.select(&acs, ceiling, &mut self.rng, tick, now)?;

        self.sink.notify(
            id,
            SapNotification::AcsChannelSelected {
                primary: selected.channel,
                secondary: secondary_channel(selected.channel, selected.bonding),
                width: selected.width,
                center: selected.center(),
            },
        );
        Some(selected)
    }

    fn start_params(&self, id: SessionId, op: OperatingChannel) -> Option<StartBssParams> {
        let ctx = self.sessions.get(&id)?;
        Some(StartBssParams {
            ssid: ctx.config.ssid.clone(),
            bssid: ctx.config.bssid,
            channel: op,
            hidden: ctx.config.hidden,
            beacon_interval: ctx.config.beacon_interval,
            dtim_period: ctx.config.dtim_period,
            max_clients: ctx.config.max_clients,
            dfs: op
                .sub_channels()
                .iter()
                .any(|c| self.regulatory.domain.is_dfs(*c)),
        })
    }

    fn begin_start_bss(&mut self, id: SessionId, op: OperatingChannel) {
        let Some(params) = self.start_params(id, op) else {
            return;
        };
        if let Some(ctx) = self.sessions.get_mut(&id) {
            ctx.operating = Some(op);
        }
        self.set_state(id, SapState::Starting);
        info!(
            target: "sap",
            session = id,
            channel = op.channel,
            width = op.width.mhz(),
            dfs = params.dfs,
            "starting BSS"
        );
        if let Err(err) = self.lower.start_bss(id, &params) {
            warn!(target: "sap", session = id, error = %err, "start BSS rejected");
            self.queue.push_back((
                id,
                SapEvent::StartFailure {
                    status: LOCAL_FAILURE_STATUS,
                },
            ));
        }
    }

    fn needs_cac(&self, op: &OperatingChannel) -> bool {
        if self.config.skip_cac {
            return false;
        }
        op.sub_channels()
            .iter()
            .any(|c| self.regulatory.domain.is_dfs(*c) && !self.regulatory.cleared.contains(c))
    }

    fn on_start_success(&mut self, id: SessionId, now: Instant) {
        let Some(op) = self.sessions.get(&id).and_then(|ctx| ctx.operating) else {
            warn!(target: "sap", session = id, "start success without an operating channel");
            self.fail_to_disconnected(id);
            return;
        };
        if self.needs_cac(&op) {
            self.start_cac(id, op, now);
        } else {
            self.mark_started(id);
        }
    }

    /// Put `id` into `DFS_CAC_WAIT`, arming the shared timer unless a run
    /// on the same channel is already in progress.
    fn start_cac(&mut self, id: SessionId, op: OperatingChannel, now: Instant) {
        let running = self.regulatory.cac.as_ref().map(|run| {
            (
                run.channel,
                run.duration,
                run.covers(&op, &self.regulatory.domain),
            )
        });
        let duration = match running {
            Some((channel, duration, true)) => {
                debug!(target: "dfs", session = id, channel, "joining running CAC");
                duration
            }
            Some((channel, _, false)) => {
                warn!(
                    target: "dfs",
                    session = id,
                    running = channel,
                    requested = op.channel,
                    "CAC already running on another channel"
                );
                let bssid = self.bssid(id).unwrap_or_default();
                self.sink.notify(
                    id,
                    SapNotification::StartBssComplete {
                        status: SapStatus::Failure,
                        bssid,
                        channel: Some(op),
                    },
                );
                self.begin_stop(id);
                return;
            }
            None => {
                let sub_channels = op.sub_channels();
                let duration = self.regulatory.nol.cac_duration(&sub_channels);
                self.timer.arm(duration);
                info!(
                    target: "dfs",
                    session = id,
                    channel = op.channel,
                    secs = duration.as_secs(),
                    "CAC started"
                );
                self.regulatory.cac = Some(CacRun {
                    channel: op.channel,
                    sub_channels,
                    duration,
                    started_at: now,
                });
                duration
            }
        };

        self.set_state(id, SapState::DfsCacWait);
        let notify = match self.sessions.get_mut(&id) {
            Some(ctx) if !ctx.cac_start_notified => {
                ctx.cac_start_notified = true;
                true
            }
            _ => false,
        };
        if notify {
            self.sink.notify(
                id,
                SapNotification::DfsCacStart {
                    channel: op,
                    duration,
                },
            );
        }
    }

    fn mark_started(&mut self, id: SessionId) {
        self.set_state(id, SapState::Started);
        let Some(ctx) = self.sessions.get(&id) else {
            return;
        };
        let (bssid, channel) = (ctx.config.bssid, ctx.operating);
        self.sink.notify(
            id,
            SapNotification::StartBssComplete {
                status: SapStatus::Success,
                bssid,
                channel,
            },
        );
    }

    fn on_cac_expired(&mut self, now: Instant) {
        let Some(run) = self.regulatory.cac.take() else {
            debug!(target: "dfs", "CAC expiry with no CAC running");
            return;
        };
        for c in &run.sub_channels {
            if self.regulatory.domain.is_dfs(*c) {
                self.regulatory.cleared.insert(*c);
            }
        }
        info!(
            target: "dfs",
            channel = run.channel,
            elapsed_ms = now.saturating_duration_since(run.started_at).as_millis() as u64,
            "CAC complete"
        );

        let waiting: Vec<(SessionId, OperatingChannel)> = self
            .sessions
            .values()
            .filter(|ctx| ctx.state == SapState::DfsCacWait)
            .filter_map(|ctx| ctx.operating.map(|op| (ctx.id, op)))
            .filter(|(_, op)| op.overlaps(&run.sub_channels))
            .collect();

        for (id, op) in waiting {
            let notify = match self.sessions.get_mut(&id) {
                Some(ctx) if !ctx.cac_end_notified => {
                    ctx.cac_end_notified = true;
                    true
                }
                _ => false,
            };
            if notify {
                self.sink
                    .notify(id, SapNotification::DfsCacEnd { channel: op });
            }
            if let Err(err) = self.lower.start_beacon(id) {
                warn!(target: "sap", session = id, error = %err, "start beacon failed");
                self.begin_stop(id);
                continue;
            }
            self.mark_started(id);
        }
    }

    fn on_radar(&mut self, id: SessionId, channels: Vec<u8>, now: Instant) {
        let channels = if channels.is_empty() {
            self.sessions
                .get(&id)
                .map(|ctx| ctx.occupied_channels())
                .unwrap_or_default()
        } else {
            channels
        };
        warn!(target: "dfs", session = id, ?channels, "radar detected");

        self.regulatory.nol.mark_unavailable(&channels, now);
        for c in &channels {
            self.regulatory.cleared.remove(c);
        }
        let records = self.regulatory.nol.records(now);
        self.sink.notify(id, SapNotification::NolSet { records });

        let affected: Vec<(SessionId, SapState)> = self
            .sessions
            .values()
            .filter(|ctx| matches!(ctx.state, SapState::DfsCacWait | SapState::Started))
            .filter(|ctx| ctx.operating.map_or(false, |op| op.overlaps(&channels)))
            .map(|ctx| (ctx.id, ctx.state))
            .collect();

        if affected.is_empty() {
            debug!(target: "dfs", session = id, "radar does not touch any operating channel");
            self.sink
                .notify(id, SapNotification::RadarDetected { channels });
            return;
        }
        // Every affected session hears about the radar before any of them
        // moves.
        for (sid, _) in &affected {
            self.sink.notify(
                *sid,
                SapNotification::RadarDetected {
                    channels: channels.clone(),
                },
            );
        }

        let cac_hit = self
            .regulatory
            .cac
            .as_ref()
            .map_or(false, |run| run.sub_channels.iter().any(|c| channels.contains(c)));
        if cac_hit {
            self.regulatory.cac = None;
            self.timer.disarm();
            info!(target: "dfs", "CAC aborted by radar");
        }

        let mut shared: Option<OperatingChannel> = None;
        for (sid, state) in affected {
            let target = match shared {
                Some(t) if self.fits(sid, &t) => Some(t),
                _ => self.select_for(sid, now),
            };
            let Some(target) = target else {
                warn!(target: "acs", session = sid, "no channel to move to after radar");
                self.sink.notify(sid, SapNotification::NoChannelAvailable);
                self.begin_stop(sid);
                continue;
            };
            shared.get_or_insert(target);
            if let Some(ctx) = self.sessions.get_mut(&sid) {
                ctx.pending_change = Some(target);
            }

            match state {
                SapState::Started => match self.lower.send_csa(sid, &target) {
                    Ok(()) => self
                        .sink
                        .notify(sid, SapNotification::ChannelSwitchAnnounced { target }),
                    Err(err) => {
                        warn!(target: "sap", session = sid, error = %err, "CSA failed, switching directly");
                        self.set_state(sid, SapState::Disconnecting);
                        self.queue
                            .push_back((sid, SapEvent::ChannelChangeRequest { target }));
                    }
                },
                _ => {
                    self.set_state(sid, SapState::Disconnecting);
                    self.queue
                        .push_back((sid, SapEvent::ChannelChangeRequest { target }));
                }
            }
        }
    }

    /// True if another session's radar target is usable by `id` as well
    fn fits(&self, id: SessionId, target: &OperatingChannel) -> bool {
        let Some(ctx) = self.sessions.get(&id) else {
            return false;
        };
        let ceiling = ctx.original_width.unwrap_or(ctx.config.width);
        target.width.mhz() <= ceiling.mhz()
            && target
                .sub_channels()
                .iter()
                .all(|c| ctx.config.acs.contains(*c))
    }

    /// Cancel the session's part in the CAC. The shared timer keeps running
    /// while any other session is still waiting on it; sessions already
    /// beaconing do not hold it.
    fn on_cac_stop(&mut self, id: SessionId) {
        let others_waiting = self
            .sessions
            .values()
            .any(|ctx| ctx.id != id && ctx.state == SapState::DfsCacWait);
        if !others_waiting && self.regulatory.cac.take().is_some() {
            self.timer.disarm();
            info!(target: "dfs", session = id, "CAC cancelled");
        }
        self.begin_stop(id);
    }

    fn on_csa_complete(&mut self, id: SessionId) {
        let Some(target) = self.sessions.get(&id).and_then(|ctx| ctx.pending_change) else {
            debug!(target: "sap", session = id, "CSA complete without a pending move");
            return;
        };
        self.set_state(id, SapState::Disconnecting);
        self.queue
            .push_back((id, SapEvent::ChannelChangeRequest { target }));
    }

    fn on_channel_change_request(&mut self, id: SessionId, target: OperatingChannel) {
        info!(target: "sap", session = id, channel = target.channel, width = target.width.mhz(), "changing channel");
        if let Err(err) = self.lower.change_channel(id, &target) {
            warn!(target: "sap", session = id, error = %err, "channel change rejected");
            if let Some(ctx) = self.sessions.get_mut(&id) {
                ctx.pending_change = None;
            }
            self.begin_stop(id);
        }
    }

    fn on_channel_changed(&mut self, id: SessionId, channel: OperatingChannel, now: Instant) {
        let Some(ctx) = self.sessions.get_mut(&id) else {
            return;
        };
        if ctx.pending_change.take().is_none() {
            // Plain confirmation of the channel the BSS is starting on.
            ctx.operating = Some(channel);
            return;
        }
        ctx.operating = Some(channel);
        ctx.cac_start_notified = false;
        ctx.cac_end_notified = false;
        self.sink
            .notify(id, SapNotification::ChannelChanged { channel });

        if self.needs_cac(&channel) {
            self.start_cac(id, channel, now);
        } else {
            self.set_state(id, SapState::Started);
        }
    }

    fn begin_stop(&mut self, id: SessionId) {
        self.set_state(id, SapState::Disconnecting);
        if let Err(err) = self.lower.stop_bss(id) {
            warn!(target: "sap", session = id, error = %err, "stop BSS rejected, tearing down");
            self.queue.push_back((id, SapEvent::ReadyForConnections));
        }
    }

    /// Forget the CAC result for channels only `id` was occupying. Nothing
    /// monitors a channel once its last BSS is gone.
    fn release_cleared(&mut self, id: SessionId) {
        let Some(own) = self.sessions.get(&id).map(|ctx| ctx.occupied_channels()) else {
            return;
        };
        let released: Vec<u8> = own
            .into_iter()
            .filter(|c| self.regulatory.cleared.contains(c))
            .filter(|c| {
                !self
                    .sessions
                    .values()
                    .any(|ctx| ctx.id != id && ctx.occupied_channels().contains(c))
            })
            .collect();
        if released.is_empty() {
            return;
        }
        for c in &released {
            self.regulatory.cleared.remove(c);
        }
        debug!(target: "dfs", session = id, channels = ?released, "CAC clearance released");
    }

    fn on_stopped(&mut self, id: SessionId) {
        self.close_control(id);
        self.release_cleared(id);
        if let Some(ctx) = self.sessions.get_mut(&id) {
            ctx.reset_run();
        }
        self.set_state(id, SapState::Disconnected);
        self.sink.notify(
            id,
            SapNotification::StopBssComplete {
                status: SapStatus::Success,
            },
        );
    }

    /// Failure exit of a start attempt: notify, close the control session
    /// and return to `DISCONNECTED`.
    fn fail_to_disconnected(&mut self, id: SessionId) {
        let Some(ctx) = self.sessions.get(&id) else {
            return;
        };
        let (bssid, channel) = (ctx.config.bssid, ctx.operating);
        self.sink.notify(
            id,
            SapNotification::StartBssComplete {
                status: SapStatus::Failure,
                bssid,
                channel,
            },
        );
        self.close_control(id);
        self.release_cleared(id);
        if let Some(ctx) = self.sessions.get_mut(&id) {
            ctx.reset_run();
        }
        self.set_state(id, SapState::Disconnected);
    }
}
